use crate::error::DbError;
use crate::unit_of_work::UnitOfWork;
use core_types::{Doctor, DoctorWithPatients, Patient, PatientWithDoctors, TableCounts, Treatment};
use sqlx::sqlite::SqlitePool;
use std::collections::HashMap;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// Cloning is cheap (the pool is reference counted). Writes go through a
/// [`UnitOfWork`] obtained from [`DbRepository::begin`]; each caller gets its
/// own, so concurrent requests never share staged changes.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

// A treatment row joined with the entity on the other side of it.
type LinkedRow = (i64, i64, String);

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a new transaction-backed unit of work.
    ///
    /// Starts with `BEGIN IMMEDIATE` so the write lock is taken up front. A
    /// second writer then waits out the busy timeout instead of failing with
    /// `SQLITE_BUSY` when it tries to upgrade a read transaction.
    pub async fn begin(&self) -> Result<UnitOfWork, DbError> {
        let tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(UnitOfWork::new(tx))
    }

    pub async fn get_all_doctors(&self) -> Result<Vec<Doctor>, DbError> {
        let doctors = sqlx::query_as::<_, Doctor>("SELECT id, name FROM Doctors ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(doctors)
    }

    pub async fn get_all_patients(&self) -> Result<Vec<Patient>, DbError> {
        let patients = sqlx::query_as::<_, Patient>("SELECT id, name FROM Patients ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(patients)
    }

    pub async fn get_all_treatments(&self) -> Result<Vec<Treatment>, DbError> {
        let treatments = sqlx::query_as::<_, Treatment>(
            "SELECT doctor_id, patient_id FROM treatments ORDER BY doctor_id, patient_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(treatments)
    }

    /// Every doctor with the patients linked to it, ordered by id.
    pub async fn get_doctors_with_patients(&self) -> Result<Vec<DoctorWithPatients>, DbError> {
        let doctors = self.get_all_doctors().await?;
        let rows = sqlx::query_as::<_, LinkedRow>(
            r#"
            SELECT t.doctor_id, p.id, p.name
            FROM treatments AS t
            JOIN Patients AS p ON p.id = t.patient_id
            ORDER BY t.doctor_id, p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_doctor = group_links(rows, |id, name| Patient { id, name });
        Ok(doctors
            .into_iter()
            .map(|doctor| {
                let patients = by_doctor.remove(&doctor.id).unwrap_or_default();
                DoctorWithPatients { doctor, patients }
            })
            .collect())
    }

    /// Every patient with the doctors linked to it, ordered by id.
    pub async fn get_patients_with_doctors(&self) -> Result<Vec<PatientWithDoctors>, DbError> {
        let patients = self.get_all_patients().await?;
        let rows = sqlx::query_as::<_, LinkedRow>(
            r#"
            SELECT t.patient_id, d.id, d.name
            FROM treatments AS t
            JOIN Doctors AS d ON d.id = t.doctor_id
            ORDER BY t.patient_id, d.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_patient = group_links(rows, |id, name| Doctor { id, name });
        Ok(patients
            .into_iter()
            .map(|patient| {
                let doctors = by_patient.remove(&patient.id).unwrap_or_default();
                PatientWithDoctors { patient, doctors }
            })
            .collect())
    }

    pub async fn counts(&self) -> Result<TableCounts, DbError> {
        let (doctors, patients, treatments) = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM Doctors),
                (SELECT COUNT(*) FROM Patients),
                (SELECT COUNT(*) FROM treatments)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(TableCounts { doctors, patients, treatments })
    }
}

/// Groups `(owner_id, other_id, other_name)` rows by owner, keeping row order.
fn group_links<T>(rows: Vec<LinkedRow>, build: impl Fn(i64, String) -> T) -> HashMap<i64, Vec<T>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for (owner_id, id, name) in rows {
        grouped.entry(owner_id).or_default().push(build(id, name));
    }
    grouped
}
