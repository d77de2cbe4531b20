use openhouse_core::contract::EntityKind;
use openhouse_core::validation::ValidationError;

use crate::adapters::document_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Missing UUID in URL path")]
    MissingUuid,
    #[error("{0}")]
    MalformedBody(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    InvalidReference(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    pub fn missing_reference(kind: EntityKind) -> Self {
        Self::InvalidReference(format!("Specified {} does not exist", kind.label()))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingUuid
            | Self::MalformedBody(_)
            | Self::Validation(_)
            | Self::InvalidReference(_) => 400,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed => 405,
            Self::Store(_) | Self::Serialization(_) => 500,
        }
    }

    /// Appends the create-batch position to payload errors; other errors
    /// pass through unchanged.
    pub fn at_index(self, kind: EntityKind, index: usize) -> Self {
        match self {
            Self::Validation(error) => Self::Validation(error.at_index(kind, index)),
            Self::InvalidReference(message) => Self::InvalidReference(format!(
                "{message} for {} with index {index}",
                kind.label()
            )),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(HandlerError::MissingUuid.status_code(), 400);
        assert_eq!(
            HandlerError::NotFound("Area does not exist".to_string()).status_code(),
            404
        );
        assert_eq!(HandlerError::MethodNotAllowed.status_code(), 405);
        assert_eq!(
            HandlerError::Store(StoreError::Backend("testError".to_string())).status_code(),
            500
        );
    }

    #[test]
    fn reference_errors_carry_batch_index() {
        let error = HandlerError::missing_reference(EntityKind::OpenHouse).at_index(EntityKind::Event, 3);
        assert_eq!(
            error.to_string(),
            "Specified open house does not exist for event with index 3"
        );
    }

    #[test]
    fn store_errors_ignore_batch_index() {
        let error = HandlerError::Store(StoreError::Backend("testError".to_string()))
            .at_index(EntityKind::Area, 1);
        assert_eq!(error.to_string(), "testError");
    }
}
