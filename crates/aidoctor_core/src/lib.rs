pub mod domain;
pub mod ports;

pub use domain::{MedicalCondition, MedicineGraph, User, UserCredentials};
pub use ports::{ConsultationService, DatabaseService, PortError, PortResult};
