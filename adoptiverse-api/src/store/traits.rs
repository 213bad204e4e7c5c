//! DataStore trait definitions.
//!
//! These traits are the row-level boundary between the resource managers and
//! the storage backend. Upsert, merge and validation rules live above this
//! layer, so SQLite and in-memory backends are interchangeable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::{PetData, ShelterData};

use super::error::Result;

// =============================================================================
// Row DTOs
// =============================================================================

/// Row to insert into the shelters table. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewShelter {
    pub name: String,
    pub city: String,
    pub rank: Option<i32>,
    pub foster_program: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Row to insert into the pets table. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPet {
    pub shelter_id: i64,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub adoptable: bool,
    pub created_at: DateTime<Utc>,
}

/// Result of deleting a shelter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteShelterResult {
    pub pets_deleted: u64,
}

// =============================================================================
// Table Traits
// =============================================================================

/// Store trait for the shelters table.
#[async_trait]
pub trait ShelterTable: Send + Sync {
    /// List all shelters in id order.
    async fn list_shelters(&self) -> Result<Vec<ShelterData>>;

    /// Get a shelter by ID.
    async fn get_shelter(&self, id: i64) -> Result<Option<ShelterData>>;

    /// Insert a shelter under a fresh, never reused id.
    async fn insert_shelter(&self, row: NewShelter) -> Result<ShelterData>;

    /// Write every mutable column of `shelter` back to its row.
    ///
    /// Fails with `NotFound` if the row no longer exists.
    async fn update_shelter(&self, shelter: &ShelterData) -> Result<ShelterData>;

    /// Delete a shelter together with every pet that references it.
    ///
    /// Both removals commit atomically. Fails with `NotFound` if the shelter
    /// does not exist.
    async fn delete_shelter(&self, id: i64) -> Result<DeleteShelterResult>;
}

/// Store trait for the pets table.
#[async_trait]
pub trait PetTable: Send + Sync {
    /// List the pets of one shelter, ordered by id ascending.
    async fn list_pets(&self, shelter_id: i64) -> Result<Vec<PetData>>;

    /// Get a pet by ID, regardless of shelter.
    async fn get_pet(&self, id: i64) -> Result<Option<PetData>>;

    /// Insert a pet. Fails with `NotFound` if `shelter_id` has no shelter.
    async fn insert_pet(&self, row: NewPet) -> Result<PetData>;

    /// Write the mutable columns of `pet` back to its row. `shelter_id` is
    /// never rewritten.
    async fn update_pet(&self, pet: &PetData) -> Result<PetData>;

    /// Delete a pet by ID.
    async fn delete_pet(&self, id: i64) -> Result<()>;
}

// =============================================================================
// Composite DataStore Trait
// =============================================================================

/// Composite data store trait combining both tables.
///
/// This is the trait the resource managers are written against.
pub trait DataStore: ShelterTable + PetTable + Send + Sync {}

impl<T> DataStore for T where T: ShelterTable + PetTable + Send + Sync {}
