#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Areas,
    Buildings,
    Eateries,
    Events,
    EventAttendees,
    OpenHouses,
    OpenHouseAttendees,
}

impl TableKind {
    pub const ALL: [Self; 7] = [
        Self::Areas,
        Self::Buildings,
        Self::Eateries,
        Self::Events,
        Self::EventAttendees,
        Self::OpenHouses,
        Self::OpenHouseAttendees,
    ];

    /// Environment variable holding the deployed table name.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Areas => "AREAS_TABLE",
            Self::Buildings => "BUILDINGS_TABLE",
            Self::Eateries => "EATERIES_TABLE",
            Self::Events => "EVENTS_TABLE",
            Self::EventAttendees => "EVENT_ATTENDEES_TABLE",
            Self::OpenHouses => "OPEN_HOUSES_TABLE",
            Self::OpenHouseAttendees => "OPEN_HOUSE_ATTENDEES_TABLE",
        }
    }

    /// Name used by the local table setup when no override is configured.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Areas => "OpenHouse-Areas",
            Self::Buildings => "OpenHouse-Buildings",
            Self::Eateries => "OpenHouse-Eateries",
            Self::Events => "OpenHouse-Events",
            Self::EventAttendees => "OpenHouse-EventAttendees",
            Self::OpenHouses => "OpenHouse-OpenHouses",
            Self::OpenHouseAttendees => "OpenHouse-OpenHouseAttendees",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub areas: String,
    pub buildings: String,
    pub eateries: String,
    pub events: String,
    pub event_attendees: String,
    pub open_houses: String,
    pub open_house_attendees: String,
}

impl TableNames {
    /// Resolves every table name through `lookup`, falling back to the
    /// default name for missing or blank values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |kind: TableKind| {
            lookup(kind.env_var())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| kind.default_name().to_string())
        };

        Self {
            areas: resolve(TableKind::Areas),
            buildings: resolve(TableKind::Buildings),
            eateries: resolve(TableKind::Eateries),
            events: resolve(TableKind::Events),
            event_attendees: resolve(TableKind::EventAttendees),
            open_houses: resolve(TableKind::OpenHouses),
            open_house_attendees: resolve(TableKind::OpenHouseAttendees),
        }
    }

    pub fn get(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Areas => &self.areas,
            TableKind::Buildings => &self.buildings,
            TableKind::Eateries => &self.eateries,
            TableKind::Events => &self.events,
            TableKind::EventAttendees => &self.event_attendees,
            TableKind::OpenHouses => &self.open_houses,
            TableKind::OpenHouseAttendees => &self.open_house_attendees,
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
