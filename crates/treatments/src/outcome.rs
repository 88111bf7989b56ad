use core_types::{Doctor, DoctorWithPatients, Patient, PatientWithDoctors, Treatment};
use serde::Serialize;

/// Everything written by one `create`.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub doctors: Vec<Doctor>,
    pub patients: Vec<Patient>,
    pub treatments: Vec<Treatment>,
}

impl SeedReport {
    pub fn rows_written(&self) -> usize {
        self.doctors.len() + self.patients.len() + self.treatments.len()
    }
}

/// Both sides of the many-to-many relation, as fetched by `read`.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub doctors: Vec<DoctorWithPatients>,
    pub patients: Vec<PatientWithDoctors>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOutcome {
    /// A new treatment row was written.
    Attached(Treatment),
    /// The pair was already linked; nothing changed.
    AlreadyAttached(Treatment),
    /// The named patient or doctor does not exist.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeleteOutcome {
    Detached(Treatment),
    /// The named patient or doctor does not exist.
    Skipped,
}

/// The result of any operation, for callers that dispatch by [`core_types::Operation`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", content = "result")]
pub enum OperationOutcome {
    Create(SeedReport),
    Read(Roster),
    Update(UpdateOutcome),
    Delete(DeleteOutcome),
    VerifyFinalTreatments(Vec<PatientWithDoctors>),
}
