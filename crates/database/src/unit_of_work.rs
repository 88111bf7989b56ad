use crate::error::DbError;
use core_types::{Doctor, Patient};
use sqlx::{Sqlite, Transaction};

/// A single transaction over the doctor/patient graph.
///
/// Nothing staged here is visible to other connections until [`commit`]
/// succeeds. Dropping the value without committing rolls everything back, so
/// an early `?` return can never leave half a change behind.
///
/// [`commit`]: UnitOfWork::commit
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    pub async fn add_doctor(&mut self, name: &str) -> Result<Doctor, DbError> {
        let result = sqlx::query("INSERT INTO Doctors (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *self.tx)
            .await?;
        Ok(Doctor { id: result.last_insert_rowid(), name: name.to_string() })
    }

    pub async fn add_patient(&mut self, name: &str) -> Result<Patient, DbError> {
        let result = sqlx::query("INSERT INTO Patients (name) VALUES (?1)")
            .bind(name)
            .execute(&mut *self.tx)
            .await?;
        Ok(Patient { id: result.last_insert_rowid(), name: name.to_string() })
    }

    /// First doctor with exactly this name. Names are not unique; the lowest id wins.
    pub async fn find_doctor_by_name(&mut self, name: &str) -> Result<Option<Doctor>, DbError> {
        let doctor = sqlx::query_as::<_, Doctor>(
            "SELECT id, name FROM Doctors WHERE name = ?1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(doctor)
    }

    /// First patient with exactly this name. Names are not unique; the lowest id wins.
    pub async fn find_patient_by_name(&mut self, name: &str) -> Result<Option<Patient>, DbError> {
        let patient = sqlx::query_as::<_, Patient>(
            "SELECT id, name FROM Patients WHERE name = ?1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(patient)
    }

    /// Links a doctor and a patient.
    ///
    /// Uses `ON CONFLICT DO NOTHING` to be idempotent: returns `true` when a
    /// new row was written and `false` when the pair was already linked.
    /// Unknown ids still fail with a foreign key violation.
    pub async fn attach(&mut self, doctor_id: i64, patient_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO treatments (doctor_id, patient_id)
            VALUES (?1, ?2)
            ON CONFLICT (doctor_id, patient_id) DO NOTHING
            "#,
        )
        .bind(doctor_id)
        .bind(patient_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes the link between a doctor and a patient.
    /// Fails with [`DbError::NotFound`] if they are not linked.
    pub async fn detach(&mut self, doctor_id: i64, patient_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM treatments WHERE doctor_id = ?1 AND patient_id = ?2")
            .bind(doctor_id)
            .bind(patient_id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!(
                "no treatment links doctor {doctor_id} and patient {patient_id}"
            )));
        }
        Ok(())
    }

    pub async fn is_attached(&mut self, doctor_id: i64, patient_id: i64) -> Result<bool, DbError> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM treatments WHERE doctor_id = ?1 AND patient_id = ?2 LIMIT 1",
        )
        .bind(doctor_id)
        .bind(patient_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(found.is_some())
    }

    /// Makes every staged change durable at once.
    pub async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        tracing::debug!("Unit of work committed.");
        Ok(())
    }

    /// Discards every staged change. Equivalent to dropping the unit of work,
    /// but surfaces errors from the rollback itself.
    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        tracing::debug!("Unit of work rolled back.");
        Ok(())
    }
}
