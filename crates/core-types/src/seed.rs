//! Fixed names used by the demo operations.
//!
//! `create` writes the seed set below; `update` and `delete` look their
//! targets up by these names rather than by id.

pub const DOCTOR_1: &str = "Doctor1";
pub const DOCTOR_2: &str = "Doctor2";
pub const PATIENT_1: &str = "Patient1";
pub const PATIENT_2: &str = "Patient2";
pub const PATIENT_3: &str = "Patient3";

pub const SEED_DOCTORS: [&str; 2] = [DOCTOR_1, DOCTOR_2];
pub const SEED_PATIENTS: [&str; 3] = [PATIENT_1, PATIENT_2, PATIENT_3];

/// (patient, doctor) links written by `create`.
///
/// Patient3 is linked to Doctor2 so that a fresh `create` followed by
/// `delete` has a link to remove.
pub const SEED_TREATMENTS: [(&str, &str); 4] = [
    (PATIENT_1, DOCTOR_1),
    (PATIENT_1, DOCTOR_2),
    (PATIENT_2, DOCTOR_2),
    (PATIENT_3, DOCTOR_2),
];

/// (patient, doctor) pair linked by `update`.
pub const UPDATE_TARGET: (&str, &str) = (PATIENT_2, DOCTOR_1);

/// (patient, doctor) pair unlinked by `delete`.
pub const DELETE_TARGET: (&str, &str) = (PATIENT_3, DOCTOR_2);

/// Rows written by a single `create`: doctors + patients + treatments.
pub const SEED_ROW_COUNT: usize = SEED_DOCTORS.len() + SEED_PATIENTS.len() + SEED_TREATMENTS.len();
