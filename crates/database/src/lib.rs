//! # Clinic Database Crate
//!
//! This crate is the persistence gateway for doctors, patients and the
//! `treatments` association between them. It hides all SQL behind two types:
//!
//! - `DbRepository`: holds the connection pool, answers read-only queries and
//!   hands out units of work.
//! - `UnitOfWork`: one transaction. Staged inserts and deletes become visible
//!   together on `commit`, and are rolled back if it is dropped first.
//!
//! ## Public API
//!
//! - `connect` / `connect_in_memory`: build the connection pool.
//! - `run_migrations`: create the `Doctors`, `Patients` and `treatments` tables.
//! - `DbError`: the error kinds the store can surface.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod unit_of_work;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_in_memory, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
pub use unit_of_work::UnitOfWork;
