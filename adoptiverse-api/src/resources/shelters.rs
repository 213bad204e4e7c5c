use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::model::ShelterData;
use crate::store::{DataStore, Event, NewShelter, Result, ShelterTable};

use super::{Upserted, non_blank, publish, require_shelter, required_text};

/// Shelter fields accepted on create and upsert. `None` means "not supplied".
#[derive(Debug, Clone, Default)]
pub struct ShelterInput {
    pub name: Option<String>,
    pub city: Option<String>,
    pub rank: Option<i32>,
    pub foster_program: Option<bool>,
}

/// Resource manager for shelters.
#[derive(Clone)]
pub struct ShelterStore {
    store: Arc<dyn DataStore>,
    events: broadcast::Sender<Event>,
}

impl ShelterStore {
    pub fn new(store: Arc<dyn DataStore>, events: broadcast::Sender<Event>) -> Self {
        Self { store, events }
    }

    /// All shelters in creation order.
    pub async fn list(&self) -> Result<Vec<ShelterData>> {
        self.store.list_shelters().await
    }

    pub async fn get(&self, id: i64) -> Result<ShelterData> {
        require_shelter(self.store.as_ref(), id).await
    }

    /// Create a shelter. `name` and `city` are required.
    pub async fn create(&self, input: ShelterInput) -> Result<ShelterData> {
        let row = NewShelter {
            name: required_text("name", input.name)?,
            city: required_text("city", input.city)?,
            rank: input.rank,
            foster_program: input.foster_program,
            created_at: Utc::now(),
        };

        let shelter = self.store.insert_shelter(row).await?;
        debug!(shelter_id = shelter.id, name = %shelter.name, "Created shelter");
        publish(&self.events, Event::ShelterCreated(shelter.clone()));
        Ok(shelter)
    }

    /// Create-or-merge keyed by `id`.
    ///
    /// A missing shelter is created under a newly assigned id; the requested
    /// id is not honored. An existing shelter takes every field that is
    /// present in `input` and keeps the rest.
    pub async fn upsert(&self, id: i64, input: ShelterInput) -> Result<Upserted<ShelterData>> {
        let Some(existing) = self.store.get_shelter(id).await? else {
            return self.create(input).await.map(Upserted::Created);
        };

        let mut merged = existing.clone();
        if let Some(foster_program) = input.foster_program {
            merged.foster_program = Some(foster_program);
        }
        if let Some(rank) = input.rank {
            merged.rank = Some(rank);
        }
        if let Some(city) = input.city {
            merged.city = non_blank("city", city)?;
        }
        if let Some(name) = input.name {
            merged.name = non_blank("name", name)?;
        }
        merged.updated_at = Some(Utc::now());

        let shelter = self.store.update_shelter(&merged).await?;
        debug!(shelter_id = shelter.id, "Updated shelter");
        publish(
            &self.events,
            Event::ShelterUpdated {
                id,
                old: existing,
                new: shelter.clone(),
            },
        );
        Ok(Upserted::Updated(shelter))
    }

    /// Delete a shelter and its pets. Returns the shelters that remain.
    pub async fn delete(&self, id: i64) -> Result<Vec<ShelterData>> {
        let result = self.store.delete_shelter(id).await?;
        debug!(
            shelter_id = id,
            pets_deleted = result.pets_deleted,
            "Deleted shelter"
        );
        publish(
            &self.events,
            Event::ShelterDeleted {
                id,
                pets_deleted: result.pets_deleted,
            },
        );
        self.store.list_shelters().await
    }
}
