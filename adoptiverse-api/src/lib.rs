pub mod audit;
pub mod model;
pub mod resources;
pub mod rest;
pub mod store;

pub use audit::ApiAuditLogger;
pub use resources::{PetStore, PetUpdateLookup, ShelterStore, Upserted};
pub use store::{DataStore, Event, MemoryStore, SqliteStore, StoreError};
