use async_trait::async_trait;
use openhouse_core::contract::EntityKind;
use serde::Deserialize;

use crate::adapters::document_store::StoreError;

/// Foreign keys of a dependent record, as needed to find cascade targets.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DependentLinks {
    pub uuid: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub open_house: Option<String>,
}

impl DependentLinks {
    pub fn references(&self, parent: EntityKind, uuid: &str) -> bool {
        let link = match parent {
            EntityKind::Area => &self.area,
            EntityKind::Building => &self.building,
            EntityKind::OpenHouse => &self.open_house,
            EntityKind::Eatery | EntityKind::Event => return false,
        };
        link.as_deref() == Some(uuid)
    }
}

/// Event operations shared by every handler whose deletes cascade to events.
#[async_trait]
pub trait EventCascade: Send + Sync {
    async fn scan_event_links(&self) -> Result<Vec<DependentLinks>, StoreError>;

    /// Deletes the events together with their attendee counters.
    async fn delete_events(&self, uuids: &[String]) -> Result<(), StoreError>;
}

pub fn referencing(dependents: Vec<DependentLinks>, parent: EntityKind, uuid: &str) -> Vec<String> {
    dependents
        .into_iter()
        .filter(|dependent| dependent.references(parent, uuid))
        .map(|dependent| dependent.uuid)
        .collect()
}

/// Deletes every event pointing at `uuid` through the `parent` link.
/// Returns the number of deleted events; nothing is written when none match.
pub async fn cascade_events<S: EventCascade + ?Sized>(
    store: &S,
    parent: EntityKind,
    uuid: &str,
) -> Result<usize, StoreError> {
    let doomed = referencing(store.scan_event_links().await?, parent, uuid);
    if doomed.is_empty() {
        return Ok(0);
    }

    store.delete_events(&doomed).await?;
    tracing::info!(
        parent = parent.label(),
        parent_uuid = uuid,
        deleted = doomed.len(),
        "cascaded event deletes"
    );
    Ok(doomed.len())
}
