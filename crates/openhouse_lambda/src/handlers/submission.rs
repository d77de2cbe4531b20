use serde::Serialize;
use serde_json::Value;

use openhouse_core::validation::Schema;

use super::error::HandlerError;

/// A create payload: either a single object or an array of them. Results
/// are returned in the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    elements: Vec<Value>,
    batch: bool,
}

impl Submission {
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Array(elements) => Self {
                elements,
                batch: true,
            },
            single => Self {
                elements: vec![single],
                batch: false,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.elements.iter().enumerate()
    }

    /// Validates element `index`, tagging failures with its position.
    pub fn validate<T: Schema>(index: usize, element: &Value) -> Result<T, HandlerError> {
        T::validate(element).map_err(|error| HandlerError::from(error.at_index(T::KIND, index)))
    }

    pub fn shape<R: Serialize>(&self, created: Vec<R>) -> Result<Value, HandlerError> {
        let value = if self.batch {
            serde_json::to_value(created)?
        } else {
            serde_json::to_value(created.into_iter().next())?
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use openhouse_core::contract::Area;
    use serde_json::json;

    use super::*;

    #[test]
    fn single_object_round_trips_as_object() {
        let submission = Submission::from_body(json!({"name": "A", "color": "#000"}));

        assert_eq!(submission.len(), 1);
        let shaped = submission
            .shape(vec![json!({"uuid": "a"})])
            .expect("shape should serialize");
        assert_eq!(shaped, json!({"uuid": "a"}));
    }

    #[test]
    fn arrays_keep_array_shape_and_order() {
        let submission = Submission::from_body(json!([{"n": 1}, {"n": 2}]));

        let indexes: Vec<usize> = submission.elements().map(|(index, _)| index).collect();
        assert_eq!(indexes, vec![0, 1]);
        let shaped = submission
            .shape(vec![json!(1), json!(2)])
            .expect("shape should serialize");
        assert_eq!(shaped, json!([1, 2]));
    }

    #[test]
    fn validation_failures_name_the_index() {
        let error = Submission::validate::<Area>(2, &json!({"name": "A"}))
            .expect_err("missing color should fail");

        assert_eq!(error.status_code(), 400);
        assert_eq!(error.to_string(), "\"color\" is required for area with index 2");
    }
}
