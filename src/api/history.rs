//! Medical-history routes (backend route `/mh`).

use serde_json::Value;
use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::MedicalHistory;

impl ApiClient {
    /// Fetch a patient's medical history.
    pub async fn medical_history(&self, cedula: &str) -> Result<MedicalHistory, ApiError> {
        let data = self
            .get_data(&format!("/mh/{}", urlencoding::encode(cedula)))
            .await?;
        // Some backend builds wrap the single record in an array.
        let record = match data {
            Value::Array(mut items) if !items.is_empty() => items.remove(0),
            other => other,
        };
        Self::decode(record)
    }

    /// Create a medical-history record; app and apf are mandatory.
    pub async fn create_history(&self, history: &MedicalHistory) -> Result<Value, ApiError> {
        let created = self.post_data("/mh", history).await?;
        info!(patient = %history.id_cedula, "Medical history created");
        Ok(created)
    }

    /// Update a medical-history record.
    pub async fn update_history(&self, history: &MedicalHistory) -> Result<Value, ApiError> {
        let updated = self.patch_data("/mh", history).await?;
        info!(patient = %history.id_cedula, "Medical history updated");
        Ok(updated)
    }

    /// Delete a patient's medical history.
    pub async fn delete_history(&self, cedula: &str) -> Result<(), ApiError> {
        self.delete_data(&format!("/mh/{}", urlencoding::encode(cedula)))
            .await?;
        info!(patient = %cedula, "Medical history deleted");
        Ok(())
    }
}
