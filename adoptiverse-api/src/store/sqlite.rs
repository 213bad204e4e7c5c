//! SQLite-backed DataStore.

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::model::{PetData, ShelterData};

use super::error::{Result, StoreError};
use super::traits::{DeleteShelterResult, NewPet, NewShelter, PetTable, ShelterTable};

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "adoptiverse.db";

/// Durable store for shelters and pets.
///
/// Foreign keys are enabled on every connection so that deleting a shelter
/// cascades to its pets inside SQLite itself.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database in `data_dir` and apply migrations.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let db_path = data_dir.join(DATABASE_FILE);
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        debug!(path = %db_path.display(), "Opened SQLite store");
        Self::migrate(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

fn shelter_from_row(r: &SqliteRow) -> Result<ShelterData> {
    Ok(ShelterData {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        city: r.try_get("city")?,
        rank: r.try_get("rank")?,
        foster_program: r.try_get("foster_program")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn pet_from_row(r: &SqliteRow) -> Result<PetData> {
    Ok(PetData {
        id: r.try_get("id")?,
        shelter_id: r.try_get("shelter_id")?,
        name: r.try_get("name")?,
        breed: r.try_get("breed")?,
        age: r.try_get("age")?,
        adoptable: r.try_get("adoptable")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation())
}

#[async_trait]
impl ShelterTable for SqliteStore {
    async fn list_shelters(&self) -> Result<Vec<ShelterData>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, city, rank, foster_program, created_at, updated_at
            FROM shelters ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(shelter_from_row).collect()
    }

    async fn get_shelter(&self, id: i64) -> Result<Option<ShelterData>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, city, rank, foster_program, created_at, updated_at
            FROM shelters WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(shelter_from_row).transpose()
    }

    async fn insert_shelter(&self, row: NewShelter) -> Result<ShelterData> {
        let result = sqlx::query(
            r#"
            INSERT INTO shelters (name, city, rank, foster_program, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&row.name)
        .bind(&row.city)
        .bind(row.rank)
        .bind(row.foster_program)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(ShelterData {
            id: result.last_insert_rowid(),
            name: row.name,
            city: row.city,
            rank: row.rank,
            foster_program: row.foster_program,
            created_at: row.created_at,
            updated_at: None,
        })
    }

    async fn update_shelter(&self, shelter: &ShelterData) -> Result<ShelterData> {
        let result = sqlx::query(
            r#"
            UPDATE shelters
            SET name = ?, city = ?, rank = ?, foster_program = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&shelter.name)
        .bind(&shelter.city)
        .bind(shelter.rank)
        .bind(shelter.foster_program)
        .bind(shelter.updated_at)
        .bind(shelter.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::shelter_not_found(shelter.id));
        }
        Ok(shelter.clone())
    }

    async fn delete_shelter(&self, id: i64) -> Result<DeleteShelterResult> {
        let mut tx = self.pool.begin().await?;

        let pets_deleted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pets WHERE shelter_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        // Pets go with the shelter through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM shelters WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::shelter_not_found(id));
        }

        tx.commit().await?;
        Ok(DeleteShelterResult {
            pets_deleted: pets_deleted as u64,
        })
    }
}

#[async_trait]
impl PetTable for SqliteStore {
    async fn list_pets(&self, shelter_id: i64) -> Result<Vec<PetData>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shelter_id, name, breed, age, adoptable, created_at, updated_at
            FROM pets WHERE shelter_id = ? ORDER BY id
            "#,
        )
        .bind(shelter_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(pet_from_row).collect()
    }

    async fn get_pet(&self, id: i64) -> Result<Option<PetData>> {
        let row = sqlx::query(
            r#"
            SELECT id, shelter_id, name, breed, age, adoptable, created_at, updated_at
            FROM pets WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(pet_from_row).transpose()
    }

    async fn insert_pet(&self, row: NewPet) -> Result<PetData> {
        let result = sqlx::query(
            r#"
            INSERT INTO pets (shelter_id, name, breed, age, adoptable, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(row.shelter_id)
        .bind(&row.name)
        .bind(&row.breed)
        .bind(row.age)
        .bind(row.adoptable)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::shelter_not_found(row.shelter_id)
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(PetData {
            id: result.last_insert_rowid(),
            shelter_id: row.shelter_id,
            name: row.name,
            breed: row.breed,
            age: row.age,
            adoptable: row.adoptable,
            created_at: row.created_at,
            updated_at: None,
        })
    }

    async fn update_pet(&self, pet: &PetData) -> Result<PetData> {
        let result = sqlx::query(
            r#"
            UPDATE pets
            SET name = ?, breed = ?, age = ?, adoptable = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&pet.name)
        .bind(&pet.breed)
        .bind(pet.age)
        .bind(pet.adoptable)
        .bind(pet.updated_at)
        .bind(pet.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::pet_not_found(pet.id));
        }

        // shelter_id is not part of the UPDATE; read it back from the row.
        self.get_pet(pet.id)
            .await?
            .ok_or_else(|| StoreError::pet_not_found(pet.id))
    }

    async fn delete_pet(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM pets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::pet_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn new_shelter(name: &str) -> NewShelter {
        NewShelter {
            name: name.to_string(),
            city: "Denver".to_string(),
            rank: Some(3),
            foster_program: Some(false),
            created_at: Utc.with_ymd_and_hms(2023, 8, 29, 12, 0, 0).unwrap(),
        }
    }

    fn new_pet(shelter_id: i64, name: &str) -> NewPet {
        NewPet {
            shelter_id,
            name: name.to_string(),
            breed: "Lab".to_string(),
            age: 3,
            adoptable: true,
            created_at: Utc.with_ymd_and_hms(2023, 8, 30, 9, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_shelter() {
        let store = SqliteStore::in_memory().await.unwrap();
        let created = store.insert_shelter(new_shelter("Happy Paws")).await.unwrap();

        let fetched = store.get_shelter(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.updated_at, None);
        assert_eq!(fetched.foster_program, Some(false));
    }

    #[tokio::test]
    async fn test_nullable_shelter_columns_round_trip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut row = new_shelter("No Rank");
        row.rank = None;
        row.foster_program = None;
        let created = store.insert_shelter(row).await.unwrap();

        let fetched = store.get_shelter(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.rank, None);
        assert_eq!(fetched.foster_program, None);
    }

    #[tokio::test]
    async fn test_update_shelter_not_found() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut ghost = store.insert_shelter(new_shelter("Ghost")).await.unwrap();
        ghost.id = 500;

        let err = store.update_shelter(&ghost).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_shelter_cascades_to_pets() {
        let store = SqliteStore::in_memory().await.unwrap();
        let shelter = store.insert_shelter(new_shelter("A")).await.unwrap();
        let pet = store.insert_pet(new_pet(shelter.id, "Jet")).await.unwrap();
        store.insert_pet(new_pet(shelter.id, "Rex")).await.unwrap();

        let result = store.delete_shelter(shelter.id).await.unwrap();
        assert_eq!(result.pets_deleted, 2);
        assert!(store.get_pet(pet.id).await.unwrap().is_none());
        assert!(store.list_pets(shelter.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_shelter_not_found() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store.delete_shelter(1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_pet_unknown_shelter() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store.insert_pet(new_pet(77, "Jet")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_pet_keeps_shelter_id() {
        let store = SqliteStore::in_memory().await.unwrap();
        let shelter = store.insert_shelter(new_shelter("A")).await.unwrap();
        let mut pet = store.insert_pet(new_pet(shelter.id, "Jet")).await.unwrap();

        pet.shelter_id = 999;
        pet.age = 4;
        pet.updated_at = Some(Utc::now());
        let updated = store.update_pet(&pet).await.unwrap();

        assert_eq!(updated.shelter_id, shelter.id);
        assert_eq!(updated.age, 4);
        assert_eq!(updated.updated_at, pet.updated_at);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = SqliteStore::in_memory().await.unwrap();
        let first = store.insert_shelter(new_shelter("A")).await.unwrap();
        store.delete_shelter(first.id).await.unwrap();

        let second = store.insert_shelter(new_shelter("B")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let shelter_id = {
            let store = SqliteStore::open(dir.path()).await.unwrap();
            let shelter = store.insert_shelter(new_shelter("Durable")).await.unwrap();
            store.insert_pet(new_pet(shelter.id, "Jet")).await.unwrap();
            store.pool.close().await;
            shelter.id
        };

        let store = SqliteStore::open(dir.path()).await.unwrap();
        let shelter = store.get_shelter(shelter_id).await.unwrap().unwrap();
        assert_eq!(shelter.name, "Durable");
        assert_eq!(store.list_pets(shelter_id).await.unwrap().len(), 1);
    }
}
