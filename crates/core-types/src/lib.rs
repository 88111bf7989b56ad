pub mod enums;
pub mod error;
pub mod seed;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::Operation;
pub use error::CoreError;
pub use structs::{Doctor, DoctorWithPatients, Patient, PatientWithDoctors, TableCounts, Treatment};
