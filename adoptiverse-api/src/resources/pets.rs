use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::model::PetData;
use crate::store::{DataStore, Event, NewPet, PetTable, Result, StoreError};

use super::{Upserted, publish, require_shelter, required, required_text};

/// Pet fields accepted on create and upsert. `None` means "not supplied".
///
/// Any shelter id in a request body is ignored; the path decides the shelter.
#[derive(Debug, Clone, Default)]
pub struct PetInput {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub adoptable: Option<bool>,
}

/// How `PetStore::upsert` finds the pet it is about to overwrite.
///
/// Reads, lists and deletes are always scoped to the shelter in the path.
/// Updates historically matched any pet by id, even one that belongs to a
/// different shelter, and clients may rely on that. `Global` keeps that
/// behavior; `Scoped` treats a pet from another shelter as absent and creates
/// a new one instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PetUpdateLookup {
    #[default]
    Global,
    Scoped,
}

/// Resource manager for pets. Every operation is gated on the parent shelter.
#[derive(Clone)]
pub struct PetStore {
    store: Arc<dyn DataStore>,
    events: broadcast::Sender<Event>,
    update_lookup: PetUpdateLookup,
}

impl PetStore {
    pub fn new(
        store: Arc<dyn DataStore>,
        events: broadcast::Sender<Event>,
        update_lookup: PetUpdateLookup,
    ) -> Self {
        Self {
            store,
            events,
            update_lookup,
        }
    }

    /// Pets of one shelter, ordered by id.
    /// Fail with `NotFound` unless the shelter exists. Every pet operation
    /// runs this before looking at the pet itself.
    pub async fn require_shelter(&self, shelter_id: i64) -> Result<()> {
        require_shelter(self.store.as_ref(), shelter_id).await.map(|_| ())
    }

    pub async fn list_by_shelter(&self, shelter_id: i64) -> Result<Vec<PetData>> {
        require_shelter(self.store.as_ref(), shelter_id).await?;
        self.store.list_pets(shelter_id).await
    }

    /// A pet id that exists under a different shelter is `NotFound` here.
    pub async fn get(&self, shelter_id: i64, pet_id: i64) -> Result<PetData> {
        require_shelter(self.store.as_ref(), shelter_id).await?;
        self.find_in_shelter(shelter_id, pet_id)
            .await?
            .ok_or_else(|| StoreError::pet_not_found(pet_id))
    }

    pub async fn create(&self, shelter_id: i64, input: PetInput) -> Result<PetData> {
        require_shelter(self.store.as_ref(), shelter_id).await?;
        self.insert(shelter_id, input).await
    }

    /// Create-or-overwrite keyed by `pet_id`.
    ///
    /// Unlike shelters, an existing pet is not merged: `name`, `breed`, `age`
    /// and `adoptable` must all be supplied and are written as given, empty
    /// strings and zeroes included. A missing pet is created under a new id in
    /// `shelter_id`.
    pub async fn upsert(
        &self,
        shelter_id: i64,
        pet_id: i64,
        input: PetInput,
    ) -> Result<Upserted<PetData>> {
        require_shelter(self.store.as_ref(), shelter_id).await?;

        let existing = match self.update_lookup {
            PetUpdateLookup::Global => self.store.get_pet(pet_id).await?,
            PetUpdateLookup::Scoped => self.find_in_shelter(shelter_id, pet_id).await?,
        };
        let Some(existing) = existing else {
            return self.insert(shelter_id, input).await.map(Upserted::Created);
        };

        let overwritten = PetData {
            name: required("name", input.name)?,
            breed: required("breed", input.breed)?,
            age: required("age", input.age)?,
            adoptable: required("adoptable", input.adoptable)?,
            updated_at: Some(Utc::now()),
            ..existing.clone()
        };

        let pet = self.store.update_pet(&overwritten).await?;
        debug!(pet_id = pet.id, shelter_id = pet.shelter_id, "Updated pet");
        publish(
            &self.events,
            Event::PetUpdated {
                id: pet.id,
                old: existing,
                new: pet.clone(),
            },
        );
        Ok(Upserted::Updated(pet))
    }

    /// Delete a pet of this shelter. Returns the shelter's remaining pets.
    pub async fn delete(&self, shelter_id: i64, pet_id: i64) -> Result<Vec<PetData>> {
        require_shelter(self.store.as_ref(), shelter_id).await?;
        if self.find_in_shelter(shelter_id, pet_id).await?.is_none() {
            return Err(StoreError::pet_not_found(pet_id));
        }

        self.store.delete_pet(pet_id).await?;
        debug!(pet_id, shelter_id, "Deleted pet");
        publish(
            &self.events,
            Event::PetDeleted {
                id: pet_id,
                shelter_id,
            },
        );
        self.store.list_pets(shelter_id).await
    }

    async fn find_in_shelter(&self, shelter_id: i64, pet_id: i64) -> Result<Option<PetData>> {
        Ok(self
            .store
            .get_pet(pet_id)
            .await?
            .filter(|p| p.shelter_id == shelter_id))
    }

    /// Validate and insert under `shelter_id`. The caller has checked the
    /// shelter exists.
    async fn insert(&self, shelter_id: i64, input: PetInput) -> Result<PetData> {
        let row = NewPet {
            shelter_id,
            name: required_text("name", input.name)?,
            breed: required_text("breed", input.breed)?,
            age: required("age", input.age)?,
            adoptable: required("adoptable", input.adoptable)?,
            created_at: Utc::now(),
        };

        let pet = self.store.insert_pet(row).await?;
        debug!(pet_id = pet.id, shelter_id, name = %pet.name, "Created pet");
        publish(&self.events, Event::PetCreated(pet.clone()));
        Ok(pet)
    }
}
