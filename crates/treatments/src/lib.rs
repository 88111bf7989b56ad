//! The five operations over doctors, patients and their treatments.
//!
//! Every write runs in its own [`database::UnitOfWork`]; nothing is shared
//! between calls except the connection pool.

use core_types::seed::{
    DELETE_TARGET, SEED_DOCTORS, SEED_PATIENTS, SEED_TREATMENTS, UPDATE_TARGET,
};
use core_types::{Operation, PatientWithDoctors, Treatment};
use database::DbRepository;
use std::collections::HashMap;

pub mod error;
pub mod outcome;

pub use error::ServiceError;
pub use outcome::{DeleteOutcome, OperationOutcome, Roster, SeedReport, UpdateOutcome};

#[derive(Debug, Clone)]
pub struct TreatmentService {
    repo: DbRepository,
}

impl TreatmentService {
    pub fn new(repo: DbRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &DbRepository {
        &self.repo
    }

    /// Runs `op` and wraps its result.
    pub async fn invoke(&self, op: Operation) -> Result<OperationOutcome, ServiceError> {
        let outcome = match op {
            Operation::Create => OperationOutcome::Create(self.create().await?),
            Operation::Read => OperationOutcome::Read(self.read().await?),
            Operation::Update => OperationOutcome::Update(self.update().await?),
            Operation::Delete => OperationOutcome::Delete(self.delete().await?),
            Operation::VerifyFinalTreatments => {
                OperationOutcome::VerifyFinalTreatments(self.verify_final_treatments().await?)
            }
        };
        Ok(outcome)
    }

    /// Writes the demo set: two doctors, three patients and four treatments,
    /// all in one unit of work.
    ///
    /// Not idempotent. Each call appends a fresh copy of the whole set.
    pub async fn create(&self) -> Result<SeedReport, ServiceError> {
        let mut uow = self.repo.begin().await?;

        let mut doctors = Vec::with_capacity(SEED_DOCTORS.len());
        for name in SEED_DOCTORS {
            doctors.push(uow.add_doctor(name).await?);
        }
        let mut patients = Vec::with_capacity(SEED_PATIENTS.len());
        for name in SEED_PATIENTS {
            patients.push(uow.add_patient(name).await?);
        }

        let doctor_ids: HashMap<&str, i64> = doctors.iter().map(|d| (d.name.as_str(), d.id)).collect();
        let patient_ids: HashMap<&str, i64> = patients.iter().map(|p| (p.name.as_str(), p.id)).collect();

        let mut treatments = Vec::with_capacity(SEED_TREATMENTS.len());
        for (patient_name, doctor_name) in SEED_TREATMENTS {
            let (Some(&doctor_id), Some(&patient_id)) =
                (doctor_ids.get(doctor_name), patient_ids.get(patient_name))
            else {
                return Err(ServiceError::NotFound(format!(
                    "seed link {patient_name} -> {doctor_name} names an unseeded entity"
                )));
            };
            uow.attach(doctor_id, patient_id).await?;
            treatments.push(Treatment { doctor_id, patient_id });
        }

        uow.commit().await?;

        let report = SeedReport { doctors, patients, treatments };
        tracing::info!(rows = report.rows_written(), "Seed set created.");
        Ok(report)
    }

    /// Fetches both sides of the relation and writes them to the log.
    pub async fn read(&self) -> Result<Roster, ServiceError> {
        let doctors = self.repo.get_doctors_with_patients().await?;
        tracing::info!(count = doctors.len(), "Doctors and their patients:");
        for doctor in &doctors {
            tracing::info!("{doctor}");
        }

        let patients = self.repo.get_patients_with_doctors().await?;
        tracing::info!(count = patients.len(), "Patients and their doctors:");
        for patient in &patients {
            tracing::info!("{patient}");
        }

        Ok(Roster { doctors, patients })
    }

    /// Links Patient2 to Doctor1.
    ///
    /// Missing entities are tolerated (`Skipped`), and re-linking an existing
    /// pair is a no-op (`AlreadyAttached`).
    pub async fn update(&self) -> Result<UpdateOutcome, ServiceError> {
        let (patient_name, doctor_name) = UPDATE_TARGET;
        let mut uow = self.repo.begin().await?;

        let patient = uow.find_patient_by_name(patient_name).await?;
        let doctor = uow.find_doctor_by_name(doctor_name).await?;
        let (Some(patient), Some(doctor)) = (patient, doctor) else {
            tracing::warn!(patient = patient_name, doctor = doctor_name, "Update skipped, entity missing.");
            return Ok(UpdateOutcome::Skipped);
        };

        let treatment = Treatment { doctor_id: doctor.id, patient_id: patient.id };
        if !uow.attach(doctor.id, patient.id).await? {
            uow.rollback().await?;
            tracing::info!(?treatment, "Treatment already present.");
            return Ok(UpdateOutcome::AlreadyAttached(treatment));
        }
        uow.commit().await?;

        tracing::info!(?treatment, patient = patient_name, doctor = doctor_name, "Treatment added.");
        Ok(UpdateOutcome::Attached(treatment))
    }

    /// Unlinks Patient3 from Doctor2.
    ///
    /// Missing entities are tolerated (`Skipped`). When both exist but are not
    /// linked the call fails with [`ServiceError::NotFound`].
    pub async fn delete(&self) -> Result<DeleteOutcome, ServiceError> {
        let (patient_name, doctor_name) = DELETE_TARGET;
        let mut uow = self.repo.begin().await?;

        let patient = uow.find_patient_by_name(patient_name).await?;
        let doctor = uow.find_doctor_by_name(doctor_name).await?;
        let (Some(patient), Some(doctor)) = (patient, doctor) else {
            tracing::warn!(patient = patient_name, doctor = doctor_name, "Delete skipped, entity missing.");
            return Ok(DeleteOutcome::Skipped);
        };

        uow.detach(doctor.id, patient.id).await?;
        uow.commit().await?;

        let treatment = Treatment { doctor_id: doctor.id, patient_id: patient.id };
        tracing::info!(?treatment, patient = patient_name, doctor = doctor_name, "Treatment removed.");
        Ok(DeleteOutcome::Detached(treatment))
    }

    /// Fetches every patient with its doctors and writes them to the log.
    pub async fn verify_final_treatments(&self) -> Result<Vec<PatientWithDoctors>, ServiceError> {
        let patients = self.repo.get_patients_with_doctors().await?;
        tracing::info!(count = patients.len(), "Final patients and their doctors:");
        for patient in &patients {
            tracing::info!("{patient}");
        }
        Ok(patients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::seed::{DOCTOR_1, DOCTOR_2, PATIENT_2, PATIENT_3, SEED_ROW_COUNT};
    use database::{connect_in_memory, run_migrations};

    async fn service() -> TreatmentService {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        TreatmentService::new(DbRepository::new(pool))
    }

    async fn patient_view(service: &TreatmentService, name: &str) -> PatientWithDoctors {
        service
            .read()
            .await
            .unwrap()
            .patients
            .into_iter()
            .find(|p| p.patient.name == name)
            .unwrap()
    }

    #[tokio::test]
    async fn create_writes_nine_rows_per_call() {
        let service = service().await;
        for calls in 1..=3 {
            let report = service.create().await.unwrap();
            assert_eq!(report.rows_written(), SEED_ROW_COUNT);

            let counts = service.repository().counts().await.unwrap();
            assert_eq!(counts.total(), (calls * SEED_ROW_COUNT) as i64);
            assert_eq!(counts.treatments, calls as i64 * 4);
        }
    }

    #[tokio::test]
    async fn create_wires_the_fixed_links() {
        let service = service().await;
        service.create().await.unwrap();

        let roster = service.read().await.unwrap();
        let lines: Vec<String> = roster.patients.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "patient #1 Patient1 treated by [Doctor1, Doctor2]",
                "patient #2 Patient2 treated by [Doctor2]",
                "patient #3 Patient3 treated by [Doctor2]",
            ]
        );
        assert!(roster.doctors[1].treats(PATIENT_3));
    }

    #[tokio::test]
    async fn update_attaches_once() {
        let service = service().await;
        service.create().await.unwrap();

        assert!(matches!(service.update().await.unwrap(), UpdateOutcome::Attached(_)));
        assert!(matches!(service.update().await.unwrap(), UpdateOutcome::AlreadyAttached(_)));

        assert_eq!(service.repository().counts().await.unwrap().treatments, 5);
        assert!(patient_view(&service, PATIENT_2).await.is_treated_by(DOCTOR_1));
    }

    #[tokio::test]
    async fn update_without_entities_is_a_tolerated_no_op() {
        let service = service().await;
        assert_eq!(service.update().await.unwrap(), UpdateOutcome::Skipped);
        assert_eq!(service.repository().counts().await.unwrap().total(), 0);
    }

    #[tokio::test]
    async fn update_with_one_entity_missing_is_skipped() {
        let service = service().await;
        let repo = service.repository();

        let mut uow = repo.begin().await.unwrap();
        uow.add_patient(PATIENT_2).await.unwrap();
        let other = uow.add_doctor(DOCTOR_2).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(service.update().await.unwrap(), UpdateOutcome::Skipped);

        let mut uow = repo.begin().await.unwrap();
        let patient = uow.find_patient_by_name(PATIENT_2).await.unwrap().unwrap();
        uow.attach(other.id, patient.id).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(service.update().await.unwrap(), UpdateOutcome::Skipped);
        assert_eq!(repo.counts().await.unwrap().treatments, 1);
    }

    #[tokio::test]
    async fn update_with_only_the_doctor_present_is_skipped() {
        let service = service().await;
        let mut uow = service.repository().begin().await.unwrap();
        uow.add_doctor(DOCTOR_1).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(service.update().await.unwrap(), UpdateOutcome::Skipped);
        assert_eq!(service.repository().counts().await.unwrap().treatments, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_and_creates_on_a_file_store_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let settings = configuration::DatabaseSettings {
            url: format!("sqlite://{}", dir.path().join("clinic.sqlite").display()),
            max_connections: 10,
            acquire_timeout_secs: 5,
        };
        let pool = database::connect(&settings).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let service = TreatmentService::new(DbRepository::new(pool));
        for _ in 0..3 {
            service.create().await.unwrap();
        }

        let mut handles = Vec::new();
        for i in 0..40 {
            let service = service.clone();
            let op = if i % 2 == 0 { Operation::Update } else { Operation::Create };
            handles.push(tokio::spawn(async move { service.invoke(op).await }));
        }

        let mut failures = 0;
        for handle in handles {
            if handle.await.unwrap().is_err() {
                failures += 1;
            }
        }
        assert_eq!(failures, 0);

        let counts = service.repository().counts().await.unwrap();
        assert_eq!(counts.doctors, 23 * 2);
        assert_eq!(counts.patients, 23 * 3);
        // Every create adds four links; the updates add exactly one between them.
        assert_eq!(counts.treatments, 23 * 4 + 1);
    }

    #[tokio::test]
    async fn delete_detaches_then_fails_on_repeat() {
        let service = service().await;
        service.create().await.unwrap();

        assert!(matches!(service.delete().await.unwrap(), DeleteOutcome::Detached(_)));
        assert!(!patient_view(&service, PATIENT_3).await.is_treated_by(DOCTOR_2));

        let err = service.delete().await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
        assert_eq!(err.kind(), "not_found");
        assert_eq!(service.repository().counts().await.unwrap().treatments, 3);
    }

    #[tokio::test]
    async fn delete_without_entities_is_skipped() {
        let service = service().await;
        assert_eq!(service.delete().await.unwrap(), DeleteOutcome::Skipped);
    }

    #[tokio::test]
    async fn lookups_use_the_first_seed_set() {
        let service = service().await;
        let first = service.create().await.unwrap();
        service.create().await.unwrap();

        let UpdateOutcome::Attached(treatment) = service.update().await.unwrap() else {
            panic!("expected a new treatment");
        };
        assert_eq!(treatment.doctor_id, first.doctors[0].id);
        assert_eq!(treatment.patient_id, first.patients[1].id);
    }

    #[tokio::test]
    async fn full_sequence_succeeds_on_a_fresh_store() {
        let service = service().await;
        for op in Operation::ALL {
            service.invoke(op).await.unwrap();
        }

        let patients = service.verify_final_treatments().await.unwrap();
        assert!(patients[1].is_treated_by(DOCTOR_1));
        assert!(patients[2].doctors.is_empty());
    }
}
