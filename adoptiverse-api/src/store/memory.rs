//! In-memory DataStore used for development mode and tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::model::{PetData, ShelterData};

use super::error::{Result, StoreError};
use super::traits::{DeleteShelterResult, NewPet, NewShelter, PetTable, ShelterTable};

#[derive(Debug, Default)]
struct Tables {
    shelters: BTreeMap<i64, ShelterData>,
    pets: BTreeMap<i64, PetData>,
    /// Highest id ever handed out; ids are never reused after deletion.
    last_shelter_id: i64,
    last_pet_id: i64,
}

/// Ephemeral store backed by ordered maps behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShelterTable for MemoryStore {
    async fn list_shelters(&self) -> Result<Vec<ShelterData>> {
        let tables = self.tables.read().await;
        Ok(tables.shelters.values().cloned().collect())
    }

    async fn get_shelter(&self, id: i64) -> Result<Option<ShelterData>> {
        let tables = self.tables.read().await;
        Ok(tables.shelters.get(&id).cloned())
    }

    async fn insert_shelter(&self, row: NewShelter) -> Result<ShelterData> {
        let mut tables = self.tables.write().await;
        tables.last_shelter_id += 1;
        let shelter = ShelterData {
            id: tables.last_shelter_id,
            name: row.name,
            city: row.city,
            rank: row.rank,
            foster_program: row.foster_program,
            created_at: row.created_at,
            updated_at: None,
        };
        tables.shelters.insert(shelter.id, shelter.clone());
        Ok(shelter)
    }

    async fn update_shelter(&self, shelter: &ShelterData) -> Result<ShelterData> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .shelters
            .get_mut(&shelter.id)
            .ok_or_else(|| StoreError::shelter_not_found(shelter.id))?;
        stored.name = shelter.name.clone();
        stored.city = shelter.city.clone();
        stored.rank = shelter.rank;
        stored.foster_program = shelter.foster_program;
        stored.updated_at = shelter.updated_at;
        Ok(stored.clone())
    }

    async fn delete_shelter(&self, id: i64) -> Result<DeleteShelterResult> {
        let mut tables = self.tables.write().await;
        if tables.shelters.remove(&id).is_none() {
            return Err(StoreError::shelter_not_found(id));
        }

        let before = tables.pets.len();
        tables.pets.retain(|_, pet| pet.shelter_id != id);
        let pets_deleted = (before - tables.pets.len()) as u64;

        Ok(DeleteShelterResult { pets_deleted })
    }
}

#[async_trait]
impl PetTable for MemoryStore {
    async fn list_pets(&self, shelter_id: i64) -> Result<Vec<PetData>> {
        let tables = self.tables.read().await;
        Ok(tables
            .pets
            .values()
            .filter(|p| p.shelter_id == shelter_id)
            .cloned()
            .collect())
    }

    async fn get_pet(&self, id: i64) -> Result<Option<PetData>> {
        let tables = self.tables.read().await;
        Ok(tables.pets.get(&id).cloned())
    }

    async fn insert_pet(&self, row: NewPet) -> Result<PetData> {
        let mut tables = self.tables.write().await;
        if !tables.shelters.contains_key(&row.shelter_id) {
            return Err(StoreError::shelter_not_found(row.shelter_id));
        }

        tables.last_pet_id += 1;
        let pet = PetData {
            id: tables.last_pet_id,
            shelter_id: row.shelter_id,
            name: row.name,
            breed: row.breed,
            age: row.age,
            adoptable: row.adoptable,
            created_at: row.created_at,
            updated_at: None,
        };
        tables.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }

    async fn update_pet(&self, pet: &PetData) -> Result<PetData> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .pets
            .get_mut(&pet.id)
            .ok_or_else(|| StoreError::pet_not_found(pet.id))?;
        stored.name = pet.name.clone();
        stored.breed = pet.breed.clone();
        stored.age = pet.age;
        stored.adoptable = pet.adoptable;
        stored.updated_at = pet.updated_at;
        Ok(stored.clone())
    }

    async fn delete_pet(&self, id: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.pets.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::pet_not_found(id)),
        }
    }
}
