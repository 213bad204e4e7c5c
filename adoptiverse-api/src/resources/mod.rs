//! Resource managers for shelters and their pets.
//!
//! The managers own the write semantics: when a write creates or mutates a
//! record, which fields are merged or replaced, and the parent existence gate
//! in front of every pet operation. Storage goes through [`DataStore`].

mod pets;
mod shelters;

pub use pets::{PetInput, PetStore, PetUpdateLookup};
pub use shelters::{ShelterInput, ShelterStore};

use tokio::sync::broadcast;

use crate::model::ShelterData;
use crate::store::{DataStore, Event, Result, ShelterTable, StoreError};

/// Outcome of an upsert: which branch was taken and the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted<T> {
    Created(T),
    Updated(T),
}

impl<T> Upserted<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Upserted::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Upserted::Created(v) | Upserted::Updated(v) => v,
        }
    }
}

/// Resolve a shelter or fail with `NotFound`.
async fn require_shelter(store: &dyn DataStore, id: i64) -> Result<ShelterData> {
    store
        .get_shelter(id)
        .await?
        .ok_or_else(|| StoreError::shelter_not_found(id))
}

/// A required field must be present.
fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| StoreError::Validation(format!("{} is required", field)))
}

/// A text field, when given, must not be blank.
fn non_blank(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{} must not be empty", field)));
    }
    Ok(value)
}

fn required_text(field: &str, value: Option<String>) -> Result<String> {
    non_blank(field, required(field, value)?)
}

/// Send an event; having no subscribers is fine.
fn publish(events: &broadcast::Sender<Event>, event: Event) {
    let _ = events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("name", Some("Jet".into())).unwrap(), "Jet");
        assert!(matches!(
            required_text("name", None),
            Err(StoreError::Validation(msg)) if msg.contains("name")
        ));
        assert!(matches!(
            required_text("name", Some("   ".into())),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_upserted_accessors() {
        let created = Upserted::Created(1);
        assert!(created.is_created());
        assert_eq!(created.into_inner(), 1);
        assert!(!Upserted::Updated(2).is_created());
    }
}
