use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A row from the `Doctors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    /// Store-assigned, never changes once written.
    pub id: i64,
    pub name: String,
}

/// A row from the `Patients` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: i64,
    pub name: String,
}

/// A row from the `treatments` join table, linking one doctor to one patient.
/// The pair is the primary key, so a given doctor/patient link exists at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct Treatment {
    pub doctor_id: i64,
    pub patient_id: i64,
}

/// A doctor together with every patient linked to it through `treatments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorWithPatients {
    pub doctor: Doctor,
    pub patients: Vec<Patient>,
}

/// A patient together with every doctor linked to it through `treatments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientWithDoctors {
    pub patient: Patient,
    pub doctors: Vec<Doctor>,
}

impl PatientWithDoctors {
    pub fn is_treated_by(&self, doctor_name: &str) -> bool {
        self.doctors.iter().any(|d| d.name == doctor_name)
    }
}

impl DoctorWithPatients {
    pub fn treats(&self, patient_name: &str) -> bool {
        self.patients.iter().any(|p| p.name == patient_name)
    }
}

/// Row counts for the three tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub doctors: i64,
    pub patients: i64,
    pub treatments: i64,
}

impl TableCounts {
    pub fn total(&self) -> i64 {
        self.doctors + self.patients + self.treatments
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

impl fmt::Display for DoctorWithPatients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "doctor #{} {} treats [{}]",
            self.doctor.id,
            self.doctor.name,
            join_names(self.patients.iter().map(|p| p.name.as_str()))
        )
    }
}

impl fmt::Display for PatientWithDoctors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patient #{} {} treated by [{}]",
            self.patient.id,
            self.patient.name,
            join_names(self.doctors.iter().map(|d| d.name.as_str()))
        )
    }
}
