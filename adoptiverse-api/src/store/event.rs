//! Events emitted by resource changes.

use crate::model::{PetData, ShelterData};

/// Events emitted when state changes occur.
///
/// These events are dispatched via a broadcast channel to subscribers.
/// They are only emitted after the change has been committed to the store.
#[derive(Debug, Clone)]
pub enum Event {
    // Shelter events
    /// A new shelter was created.
    ShelterCreated(ShelterData),
    /// A shelter was merge-updated.
    ShelterUpdated {
        id: i64,
        old: ShelterData,
        new: ShelterData,
    },
    /// A shelter and all of its pets were deleted.
    ShelterDeleted { id: i64, pets_deleted: u64 },

    // Pet events
    /// A new pet was created.
    PetCreated(PetData),
    /// A pet was overwritten.
    PetUpdated { id: i64, old: PetData, new: PetData },
    /// A pet was deleted.
    PetDeleted { id: i64, shelter_id: i64 },
}
