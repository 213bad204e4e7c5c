//! Shelter and pet records as held by the table store.

use chrono::{DateTime, Utc};

/// A stored shelter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelterData {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub rank: Option<i32>,
    pub foster_program: Option<bool>,
    pub created_at: DateTime<Utc>,
    /// `None` until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// A stored pet row. `shelter_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetData {
    pub id: i64,
    pub shelter_id: i64,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub adoptable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}
