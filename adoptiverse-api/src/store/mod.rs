pub mod error;
pub mod event;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use event::Event;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::*;
