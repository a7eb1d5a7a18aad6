//! crates/aidoctor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{MedicalCondition, MedicineGraph, User, UserCredentials};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The requested record does not exist, or is not owned by the caller.
    /// The two cases are deliberately indistinguishable.
    #[error("{0}")]
    NotFound(String),
    /// A uniqueness constraint was violated (duplicate email on signup).
    #[error("{0}")]
    Conflict(String),
    /// Login failed. The message is identical whether the email is unknown
    /// or the password is wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// The request carried no valid session credential.
    #[error("Not authenticated")]
    Unauthorized,
    /// The request body was malformed (e.g. a bad date string).
    #[error("{0}")]
    Validation(String),
    /// The external completion provider failed or timed out.
    #[error("{0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(&self, user: &User, password_hash: &str) -> PortResult<()>;

    async fn find_credentials_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    async fn find_user_by_id(&self, user_id: &str) -> PortResult<Option<User>>;

    /// Overwrites the three mutable profile fields and returns the updated user.
    async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        phone: &str,
        country: &str,
    ) -> PortResult<User>;

    // --- Medical Conditions ---
    async fn list_conditions(&self, user_id: &str) -> PortResult<Vec<MedicalCondition>>;

    async fn create_condition(&self, condition: &MedicalCondition) -> PortResult<()>;

    /// Deletes a condition matched on both id and owner. A non-owned id
    /// fails with `NotFound`, exactly like a nonexistent one.
    async fn delete_condition(&self, user_id: &str, condition_id: &str) -> PortResult<()>;

    // --- Medicine Graphs ---
    /// Atomically replaces the caller's entire graph set.
    async fn replace_graphs(&self, user_id: &str, graphs: &[MedicineGraph]) -> PortResult<()>;

    async fn list_graphs(&self, user_id: &str) -> PortResult<Vec<MedicineGraph>>;
}

#[async_trait]
pub trait ConsultationService: Send + Sync {
    /// Produces a free-text consultation for the given patient details.
    async fn consult(
        &self,
        symptom: &str,
        sex: &str,
        age: &str,
        country: &str,
    ) -> PortResult<String>;
}
