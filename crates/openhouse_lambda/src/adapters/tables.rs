use async_trait::async_trait;
use openhouse_core::contract::{
    Area, AttendeeCounter, Building, Eatery, EntityKind, Event, OpenHouse, Record,
    ATTENDEES_ATTRIBUTE,
};
use openhouse_core::tables::{TableKind, TableNames};

use super::document_store::{DocumentStore, StoreError};
use super::table::Table;
use crate::handlers::areas::AreaStore;
use crate::handlers::attendees::{AttendeeStore, CounterKind};
use crate::handlers::buildings::BuildingStore;
use crate::handlers::cascade::{DependentLinks, EventCascade};
use crate::handlers::eateries::EateryStore;
use crate::handlers::events::EventStore;
use crate::handlers::open_houses::OpenHouseStore;
use crate::handlers::references::RecordLookup;

/// A document store bound to the deployed table names. Implements every
/// handler's store trait.
#[derive(Debug)]
pub struct StoreTables<D> {
    store: D,
    names: TableNames,
}

impl<D: DocumentStore> StoreTables<D> {
    pub fn new(store: D, names: TableNames) -> Self {
        Self { store, names }
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    pub fn table(&self, kind: TableKind) -> Table<'_, D> {
        Table::new(&self.store, self.names.get(kind))
    }
}

fn entity_table(kind: EntityKind) -> TableKind {
    match kind {
        EntityKind::Area => TableKind::Areas,
        EntityKind::Building => TableKind::Buildings,
        EntityKind::Eatery => TableKind::Eateries,
        EntityKind::Event => TableKind::Events,
        EntityKind::OpenHouse => TableKind::OpenHouses,
    }
}

#[async_trait]
impl<D: DocumentStore> RecordLookup for StoreTables<D> {
    async fn record_exists(&self, kind: EntityKind, uuid: &str) -> Result<bool, StoreError> {
        self.table(entity_table(kind)).exists(uuid).await
    }
}

#[async_trait]
impl<D: DocumentStore> EventCascade for StoreTables<D> {
    async fn scan_event_links(&self) -> Result<Vec<DependentLinks>, StoreError> {
        self.table(TableKind::Events).scan().await
    }

    async fn delete_events(&self, uuids: &[String]) -> Result<(), StoreError> {
        self.table(TableKind::Events).delete_all(uuids).await?;
        self.table(TableKind::EventAttendees).delete_all(uuids).await
    }
}

#[async_trait]
impl<D: DocumentStore> AreaStore for StoreTables<D> {
    async fn scan_areas(&self) -> Result<Vec<Record<Area>>, StoreError> {
        self.table(TableKind::Areas).scan().await
    }

    async fn create_areas(&self, areas: &[Record<Area>]) -> Result<(), StoreError> {
        self.table(TableKind::Areas).put_all(areas).await
    }

    async fn put_area(&self, area: &Record<Area>) -> Result<(), StoreError> {
        self.table(TableKind::Areas).put(area).await
    }

    async fn delete_area(&self, uuid: &str) -> Result<(), StoreError> {
        self.table(TableKind::Areas).delete(uuid).await
    }
}

#[async_trait]
impl<D: DocumentStore> BuildingStore for StoreTables<D> {
    async fn scan_buildings(&self) -> Result<Vec<Record<Building>>, StoreError> {
        self.table(TableKind::Buildings).scan().await
    }

    async fn create_buildings(&self, buildings: &[Record<Building>]) -> Result<(), StoreError> {
        self.table(TableKind::Buildings).put_all(buildings).await
    }

    async fn put_building(&self, building: &Record<Building>) -> Result<(), StoreError> {
        self.table(TableKind::Buildings).put(building).await
    }

    async fn delete_building(&self, uuid: &str) -> Result<(), StoreError> {
        self.table(TableKind::Buildings).delete(uuid).await
    }

    async fn scan_eatery_links(&self) -> Result<Vec<DependentLinks>, StoreError> {
        self.table(TableKind::Eateries).scan().await
    }

    async fn delete_eateries(&self, uuids: &[String]) -> Result<(), StoreError> {
        self.table(TableKind::Eateries).delete_all(uuids).await
    }
}

#[async_trait]
impl<D: DocumentStore> EateryStore for StoreTables<D> {
    async fn scan_eateries(&self) -> Result<Vec<Record<Eatery>>, StoreError> {
        self.table(TableKind::Eateries).scan().await
    }

    async fn create_eateries(&self, eateries: &[Record<Eatery>]) -> Result<(), StoreError> {
        self.table(TableKind::Eateries).put_all(eateries).await
    }

    async fn put_eatery(&self, eatery: &Record<Eatery>) -> Result<(), StoreError> {
        self.table(TableKind::Eateries).put(eatery).await
    }

    async fn delete_eatery(&self, uuid: &str) -> Result<(), StoreError> {
        self.table(TableKind::Eateries).delete(uuid).await
    }
}

fn event_to_storage(record: &Record<Event>) -> Record<Event> {
    Record::new(record.uuid.clone(), record.fields.clone().to_storage())
}

#[async_trait]
impl<D: DocumentStore> EventStore for StoreTables<D> {
    async fn scan_events(&self) -> Result<Vec<Record<Event>>, StoreError> {
        let stored: Vec<Record<Event>> = self.table(TableKind::Events).scan().await?;
        Ok(stored
            .into_iter()
            .map(|record| Record::new(record.uuid, record.fields.from_storage()))
            .collect())
    }

    async fn get_event_attendees(&self, uuids: &[String]) -> Result<Vec<AttendeeCounter>, StoreError> {
        self.table(TableKind::EventAttendees).get_all(uuids).await
    }

    async fn create_events(&self, events: &[Record<Event>]) -> Result<(), StoreError> {
        let stored: Vec<Record<Event>> = events.iter().map(event_to_storage).collect();
        self.table(TableKind::Events).put_all(&stored).await
    }

    async fn create_event_attendees(&self, counters: &[AttendeeCounter]) -> Result<(), StoreError> {
        self.table(TableKind::EventAttendees).put_all(counters).await
    }

    async fn put_event(&self, event: &Record<Event>) -> Result<(), StoreError> {
        self.table(TableKind::Events)
            .put(&event_to_storage(event))
            .await
    }

    async fn delete_event(&self, uuid: &str) -> Result<(), StoreError> {
        self.table(TableKind::Events).delete(uuid).await
    }

    async fn delete_event_attendees(&self, uuid: &str) -> Result<(), StoreError> {
        self.table(TableKind::EventAttendees).delete(uuid).await
    }
}

#[async_trait]
impl<D: DocumentStore> OpenHouseStore for StoreTables<D> {
    async fn scan_open_houses(&self) -> Result<Vec<Record<OpenHouse>>, StoreError> {
        self.table(TableKind::OpenHouses).scan().await
    }

    async fn get_open_house_attendees(
        &self,
        uuids: &[String],
    ) -> Result<Vec<AttendeeCounter>, StoreError> {
        self.table(TableKind::OpenHouseAttendees).get_all(uuids).await
    }

    async fn create_open_houses(&self, open_houses: &[Record<OpenHouse>]) -> Result<(), StoreError> {
        self.table(TableKind::OpenHouses).put_all(open_houses).await
    }

    async fn create_open_house_attendees(
        &self,
        counters: &[AttendeeCounter],
    ) -> Result<(), StoreError> {
        self.table(TableKind::OpenHouseAttendees)
            .put_all(counters)
            .await
    }

    async fn put_open_house(&self, open_house: &Record<OpenHouse>) -> Result<(), StoreError> {
        self.table(TableKind::OpenHouses).put(open_house).await
    }

    async fn delete_open_house(&self, uuid: &str) -> Result<(), StoreError> {
        self.table(TableKind::OpenHouses).delete(uuid).await
    }

    async fn delete_open_house_attendees(&self, uuid: &str) -> Result<(), StoreError> {
        self.table(TableKind::OpenHouseAttendees).delete(uuid).await
    }
}

#[async_trait]
impl<D: DocumentStore> AttendeeStore for StoreTables<D> {
    async fn attendees_exist(&self, kind: CounterKind, uuid: &str) -> Result<bool, StoreError> {
        self.table(kind.table()).exists(uuid).await
    }

    async fn increment_attendees(&self, kind: CounterKind, uuid: &str) -> Result<(), StoreError> {
        self.store
            .increment(self.names.get(kind.table()), uuid, ATTENDEES_ATTRIBUTE)
            .await
    }

    async fn decrement_attendees(&self, kind: CounterKind, uuid: &str) -> Result<(), StoreError> {
        self.store
            .decrement_above_zero(self.names.get(kind.table()), uuid, ATTENDEES_ATTRIBUTE)
            .await
    }
}
