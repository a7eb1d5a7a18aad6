//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use aidoctor_core::domain::{
    sort_samples_by_date, MedicalCondition, MedicineGraph, User, UserCredentials,
};
use aidoctor_core::ports::{DatabaseService, PortError, PortResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps an insert failure, turning a unique-constraint violation on the
/// email column into a `Conflict`.
fn map_user_insert_error(e: sqlx::Error) -> PortError {
    match &e {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            PortError::Conflict("Email already registered".to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: String,
    email: String,
    name: String,
    phone: String,
    country: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            country: self.country,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: String,
    email: String,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct ConditionRecord {
    id: String,
    user_id: String,
    title: String,
    description: String,
    diagnosis_date: Option<NaiveDate>,
    medications: String,
}
impl ConditionRecord {
    fn to_domain(self) -> PortResult<MedicalCondition> {
        let medications: Vec<String> = serde_json::from_str(&self.medications)
            .map_err(|e| PortError::Unexpected(format!("Corrupt medications column: {}", e)))?;
        Ok(MedicalCondition {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            diagnosis_date: self.diagnosis_date,
            medications,
        })
    }
}

#[derive(FromRow)]
struct GraphRecord {
    id: String,
    name: String,
    data: String,
    user_id: String,
}
impl GraphRecord {
    fn to_domain(self) -> PortResult<MedicineGraph> {
        let mut data: Vec<Value> = serde_json::from_str(&self.data)
            .map_err(|e| PortError::Unexpected(format!("Corrupt graph data column: {}", e)))?;
        // The sort is not assumed persisted; re-sort at read time.
        sort_samples_by_date(&mut data);
        Ok(MedicineGraph {
            id: self.id,
            name: self.name,
            data,
            user_id: self.user_id,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, user: &User, password_hash: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, phone, country) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.country)
        .execute(&self.pool)
        .await
        .map_err(map_user_insert_error)?;
        Ok(())
    }

    async fn find_credentials_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(CredentialsRecord::to_domain))
    }

    async fn find_user_by_id(&self, user_id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, phone, country FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        phone: &str,
        country: &str,
    ) -> PortResult<User> {
        sqlx::query("UPDATE users SET name = ?, phone = ?, country = ? WHERE id = ?")
            .bind(name)
            .bind(phone)
            .bind(country)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.find_user_by_id(user_id)
            .await?
            .ok_or(PortError::Unauthorized)
    }

    async fn list_conditions(&self, user_id: &str) -> PortResult<Vec<MedicalCondition>> {
        let records = sqlx::query_as::<_, ConditionRecord>(
            "SELECT id, user_id, title, description, diagnosis_date, medications \
             FROM medical_conditions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(ConditionRecord::to_domain).collect()
    }

    async fn create_condition(&self, condition: &MedicalCondition) -> PortResult<()> {
        let medications = serde_json::to_string(&condition.medications)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        sqlx::query(
            "INSERT INTO medical_conditions (id, user_id, title, description, diagnosis_date, medications) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&condition.id)
        .bind(&condition.user_id)
        .bind(&condition.title)
        .bind(&condition.description)
        .bind(condition.diagnosis_date)
        .bind(medications)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn delete_condition(&self, user_id: &str, condition_id: &str) -> PortResult<()> {
        // Ownership is part of the lookup predicate, so another user's
        // condition id is indistinguishable from a nonexistent one.
        let result = sqlx::query("DELETE FROM medical_conditions WHERE id = ? AND user_id = ?")
            .bind(condition_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Condition not found".to_string()));
        }
        Ok(())
    }

    async fn replace_graphs(&self, user_id: &str, graphs: &[MedicineGraph]) -> PortResult<()> {
        // Delete-all then insert-many must not leave a mixed old/new state,
        // so the whole replacement runs in one transaction.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query("DELETE FROM medicine_graphs WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        for graph in graphs {
            let mut data = graph.data.clone();
            sort_samples_by_date(&mut data);
            let data_json = serde_json::to_string(&data)
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

            sqlx::query("INSERT INTO medicine_graphs (id, name, data, user_id) VALUES (?, ?, ?, ?)")
                .bind(&graph.id)
                .bind(&graph.name)
                .bind(data_json)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn list_graphs(&self, user_id: &str) -> PortResult<Vec<MedicineGraph>> {
        let records = sqlx::query_as::<_, GraphRecord>(
            "SELECT id, name, data, user_id FROM medicine_graphs WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(GraphRecord::to_domain).collect()
    }
}

//=========================================================================================
// Tests (in-memory SQLite)
//=========================================================================================
