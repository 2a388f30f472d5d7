//! Consultation routes.

use serde_json::{json, Value};
use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::Consultation;

impl ApiClient {
    /// List the practice's consultations.
    pub async fn consultations(&self) -> Result<Vec<Consultation>, ApiError> {
        let empresa = self.empresa_id()?;
        let data = self
            .get_data(&format!(
                "/consultation/empresa/{}",
                urlencoding::encode(&empresa)
            ))
            .await?;
        if data.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(data)?)
    }

    /// A patient's consultations as raw records.
    ///
    /// The report generator consumes these untyped because the backend owns
    /// the schema; a patient without consultations (absent data or a 404)
    /// comes back as an empty list.
    pub async fn consultations_raw(&self, cedula: &str) -> Result<Vec<Value>, ApiError> {
        let data = match self
            .get_data(&format!("/consultation/{}", urlencoding::encode(cedula)))
            .await
        {
            Err(ApiError::NotFound) => return Ok(Vec::new()),
            other => other?,
        };
        match data {
            Value::Null => Ok(Vec::new()),
            Value::Array(rows) => Ok(rows),
            other => Ok(vec![other]),
        }
    }

    /// Create a consultation; the practice id is filled in from the session.
    pub async fn create_consultation(&self, consultation: &Consultation) -> Result<Value, ApiError> {
        let mut body = serde_json::to_value(consultation)?;
        body["id_empresa"] = self.session()?.user.id_empresa.clone();
        let created = self.post_data("/consultation", &body).await?;
        info!(patient = %consultation.id_cedula, "Consultation created");
        Ok(created)
    }

    /// Update a consultation record in full.
    pub async fn update_consultation(&self, consultation: &Consultation) -> Result<Value, ApiError> {
        let updated = self.patch_data("/consultation", consultation).await?;
        info!(patient = %consultation.id_cedula, "Consultation updated");
        Ok(updated)
    }

    /// Close a consultation (sets estado to 1).
    pub async fn close_consultation(&self, id_consulta: &str) -> Result<(), ApiError> {
        self.patch_data(
            &format!("/consultation/{}", urlencoding::encode(id_consulta)),
            &json!({ "estado": 1 }),
        )
        .await?;
        info!(consultation = %id_consulta, "Consultation closed");
        Ok(())
    }
}
