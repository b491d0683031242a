//! Ready-made `Starship` record and fleet generator, so tests and demos
//! have a realistic dataset without defining their own record type.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use armada_core::{FieldValue, Record};

use crate::backend::InMemoryBackend;
use crate::config::SimConfig;
use crate::rng::SimRng;

const SHIP_NAMES: &[&str] = &[
    "Enterprise",
    "Voyager",
    "Nostromo",
    "Rocinante",
    "Galactica",
    "Prometheus",
    "Odyssey",
    "Icarus",
    "Serenity",
    "Bebop",
    "Event Horizon",
    "Red Dwarf",
    "Heart of Gold",
    "Normandy",
    "Sulaco",
    "Discovery One",
];

const SHIP_MODELS: &[&str] = &[
    "Explorer",
    "Freighter",
    "Cruiser",
    "Shuttle",
    "Interceptor",
    "Research Vessel",
];

/// Generated launch dates fall between 2000-01-01 and 2024-01-01 UTC.
const LAUNCH_WINDOW_SECS: (i64, i64) = (946_684_800, 1_704_067_200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipStatus {
    Active,
    Inactive,
}

impl ShipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShipStatus::Active => "active",
            ShipStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for ShipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Starship {
    pub id: Uuid,
    pub name: String,
    pub model: String,
    pub crew_count: u32,
    pub max_crew: u32,
    pub launch_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub registry_code: String,
    pub status: ShipStatus,
    pub max_distance: f64,
}

impl Record for Starship {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(FieldValue::Text(self.name.clone())),
            "model" => Some(FieldValue::Text(self.model.clone())),
            "status" => Some(FieldValue::Text(self.status.as_str().to_string())),
            "crew_count" => Some(FieldValue::Number(f64::from(self.crew_count))),
            "max_crew" => Some(FieldValue::Number(f64::from(self.max_crew))),
            "max_distance" => Some(FieldValue::Number(self.max_distance)),
            "launch_date" => Some(FieldValue::Timestamp(self.launch_date)),
            "last_updated" => Some(FieldValue::Timestamp(self.last_updated)),
            "registry_code" => Some(FieldValue::Text(self.registry_code.clone())),
            _ => None,
        }
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "name",
            "model",
            "status",
            "crew_count",
            "max_crew",
            "max_distance",
            "launch_date",
            "last_updated",
            "registry_code",
        ]
    }
}

/// Factory for one ship, suitable for [`InMemoryBackend::generate`].
///
/// Names cycle through the pool by index; everything else is drawn from
/// the RNG, so a seeded dataset is fully reproducible.
pub fn starship(index: usize, rng: &mut SimRng) -> Starship {
    let crew_count = rng.int_in(2, 23) as u32;
    let launch_secs = rng.int_in(LAUNCH_WINDOW_SECS.0, LAUNCH_WINDOW_SECS.1);
    let launch_date = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(launch_secs);

    let mut id_bytes = [0u8; 16];
    for byte in &mut id_bytes {
        *byte = rng.int_in(0, 255) as u8;
    }

    Starship {
        id: uuid::Builder::from_random_bytes(id_bytes).into_uuid(),
        name: SHIP_NAMES[index % SHIP_NAMES.len()].to_string(),
        model: rng.pick(SHIP_MODELS).to_string(),
        crew_count,
        max_crew: rng.int_in(i64::from(crew_count), 100) as u32,
        launch_date,
        last_updated: launch_date,
        registry_code: (0..10)
            .map(|_| char::from(b'0' + rng.int_in(0, 9) as u8))
            .collect(),
        status: *rng.pick(&[ShipStatus::Active, ShipStatus::Inactive]),
        max_distance: (rng.f64_in(0.0, 20.0) * 10.0).round() / 10.0,
    }
}

/// A full fleet per the given config.
pub fn starship_fleet(config: &SimConfig) -> Vec<Starship> {
    let mut rng = SimRng::new(config.seed);
    crate::generator::generate(config.count, &mut rng, starship)
}

/// Backend over a generated fleet, with the config's delay profile.
pub fn starship_backend(config: &SimConfig) -> InMemoryBackend<Starship> {
    InMemoryBackend::generate(config.seed, config.count, starship).with_delay(config.delay())
}
