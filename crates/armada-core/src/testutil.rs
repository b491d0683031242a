//! Minimal record type for exercising the query pipeline in unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::record::{FieldValue, Record};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Probe {
    pub id: String,
    pub name: String,
    pub status: String,
    pub max_distance: f64,
    pub crew_count: u32,
    pub launch_date: DateTime<Utc>,
}

impl Record for Probe {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(FieldValue::Text(self.name.clone())),
            "status" => Some(FieldValue::Text(self.status.clone())),
            "max_distance" => Some(FieldValue::Number(self.max_distance)),
            "crew_count" => Some(FieldValue::Number(f64::from(self.crew_count))),
            "launch_date" => Some(FieldValue::Timestamp(self.launch_date)),
            _ => None,
        }
    }

    fn field_names() -> &'static [&'static str] {
        &["name", "status", "max_distance", "crew_count", "launch_date"]
    }
}

/// Probe with the id equal to its name.
pub(crate) fn probe(name: &str, status: &str, max_distance: f64) -> Probe {
    Probe {
        id: name.to_string(),
        name: name.to_string(),
        status: status.to_string(),
        max_distance,
        crew_count: 10,
        launch_date: Utc.with_ymd_and_hms(2005, 1, 1, 0, 0, 0).unwrap(),
    }
}
