use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::store::Event;

/// Audit trail for resource changes, written as `tracing` records under the
/// `audit` target.
pub struct ApiAuditLogger {
    enabled: bool,
}

impl ApiAuditLogger {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn new_noop() -> Self {
        Self { enabled: false }
    }

    // Shelter events
    pub fn shelter_created(&self, shelter_id: i64, shelter_name: &str) {
        if self.enabled {
            info!(target: "audit", shelter_id, "Shelter created: {}", shelter_name);
        }
    }

    pub fn shelter_updated(&self, shelter_id: i64) {
        if self.enabled {
            info!(target: "audit", shelter_id, "Shelter updated");
        }
    }

    pub fn shelter_deleted(&self, shelter_id: i64, pets_deleted: u64) {
        if self.enabled {
            info!(
                target: "audit",
                shelter_id,
                pets_deleted,
                "Shelter deleted with {} pets",
                pets_deleted
            );
        }
    }

    // Pet events
    pub fn pet_created(&self, pet_id: i64, shelter_id: i64, pet_name: &str) {
        if self.enabled {
            info!(target: "audit", pet_id, shelter_id, "Pet created: {}", pet_name);
        }
    }

    pub fn pet_updated(&self, pet_id: i64, shelter_id: i64) {
        if self.enabled {
            info!(target: "audit", pet_id, shelter_id, "Pet updated");
        }
    }

    pub fn pet_deleted(&self, pet_id: i64, shelter_id: i64) {
        if self.enabled {
            info!(target: "audit", pet_id, shelter_id, "Pet deleted");
        }
    }

    /// Record a single change event.
    pub fn record(&self, event: &Event) {
        match event {
            Event::ShelterCreated(shelter) => self.shelter_created(shelter.id, &shelter.name),
            Event::ShelterUpdated { id, .. } => self.shelter_updated(*id),
            Event::ShelterDeleted { id, pets_deleted } => self.shelter_deleted(*id, *pets_deleted),
            Event::PetCreated(pet) => self.pet_created(pet.id, pet.shelter_id, &pet.name),
            Event::PetUpdated { id, new, .. } => self.pet_updated(*id, new.shelter_id),
            Event::PetDeleted { id, shelter_id } => self.pet_deleted(*id, *shelter_id),
        }
    }

    /// Consume change events until every sender is gone.
    pub fn start_event_listener(
        self: Arc<Self>,
        mut events: broadcast::Receiver<Event>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Started audit event listener");

            loop {
                match events.recv().await {
                    Ok(event) => self.record(&event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Audit listener fell behind, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            info!("Audit event listener stopped");
        })
    }
}

impl Default for ApiAuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShelterData;
    use chrono::Utc;

    #[tokio::test]
    async fn test_noop_logger_doesnt_panic() {
        let logger = ApiAuditLogger::new_noop();

        logger.shelter_created(1, "Happy Paws");
        logger.shelter_updated(1);
        logger.shelter_deleted(1, 2);
        logger.pet_created(5, 1, "Jet");
        logger.pet_updated(5, 1);
        logger.pet_deleted(5, 1);
    }

    #[tokio::test]
    async fn test_listener_stops_when_senders_dropped() {
        let (tx, rx) = broadcast::channel(8);
        let handle = Arc::new(ApiAuditLogger::new()).start_event_listener(rx);

        tx.send(Event::ShelterCreated(ShelterData {
            id: 1,
            name: "Happy Paws".to_string(),
            city: "San Francisco".to_string(),
            rank: Some(1),
            foster_program: Some(true),
            created_at: Utc::now(),
            updated_at: None,
        }))
        .unwrap();
        tx.send(Event::ShelterDeleted {
            id: 1,
            pets_deleted: 0,
        })
        .unwrap();
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("listener did not stop")
            .unwrap();
    }
}
