//! Patient routes.

use serde_json::Value;
use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::Patient;

impl ApiClient {
    /// List the patients of the logged-in user's practice.
    pub async fn patients(&self) -> Result<Vec<Patient>, ApiError> {
        let empresa = self.empresa_id()?;
        let data = self
            .get_data(&format!("/patient/empresa/{}", urlencoding::encode(&empresa)))
            .await?;
        patient_list(data)
    }

    /// List every patient the backend knows about, across practices.
    pub async fn all_patients(&self) -> Result<Vec<Patient>, ApiError> {
        patient_list(self.get_data("/patient").await?)
    }

    /// Register a new patient in the practice.
    pub async fn create_patient(&self, patient: &Patient) -> Result<Value, ApiError> {
        let created = self.post_data("/patient/", patient).await?;
        info!(patient = %patient.id_cedula, "Patient created");
        Ok(created)
    }

    /// Update an existing patient record.
    pub async fn update_patient(&self, patient: &Patient) -> Result<Value, ApiError> {
        let updated = self.patch_data("/patient", patient).await?;
        info!(patient = %patient.id_cedula, "Patient updated");
        Ok(updated)
    }

    /// Delete a patient by cedula.
    pub async fn delete_patient(&self, cedula: &str) -> Result<(), ApiError> {
        self.delete_data(&format!("/patient/{}", urlencoding::encode(cedula)))
            .await?;
        info!(patient = %cedula, "Patient deleted");
        Ok(())
    }
}

/// An absent `data` on list routes means "no patients yet", not a failure.
fn patient_list(data: Value) -> Result<Vec<Patient>, ApiError> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patient_list_null_is_empty() {
        assert!(patient_list(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_patient_list_parses_records() {
        let data = json!([
            {"id_cedula": "1-1111-1111", "nombre": "Ana", "apellidos": "Mora"},
            {"id_cedula": "2-2222-2222", "nombre": "Luis", "apellidos": "Rojas"},
        ]);
        let patients = patient_list(data).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].nombre.as_deref(), Some("Ana"));
    }
}
