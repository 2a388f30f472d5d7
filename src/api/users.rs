//! User-profile and dependent-account routes.

use serde_json::Value;
use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::User;

impl ApiClient {
    /// Update the logged-in user's profile fields.
    pub async fn update_profile(&self, profile: &Value) -> Result<Value, ApiError> {
        let updated = self.patch_data("/user", profile).await?;
        info!("Profile updated");
        Ok(updated)
    }

    /// List the practice's dependent accounts.
    pub async fn dependents(&self) -> Result<Vec<User>, ApiError> {
        let empresa = self.empresa_id()?;
        let data = self
            .get_data(&format!(
                "/user/dependientes/{}",
                urlencoding::encode(&empresa)
            ))
            .await?;
        if data.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(data)?)
    }

    /// Create a dependent account (rol "D") under the practice.
    ///
    /// The backend enforces the dependent limit and reports it through the
    /// envelope, which surfaces here as a backend error.
    pub async fn create_dependent(&self, cedula: &str, password: &str, extra: &Value) -> Result<Value, ApiError> {
        let empresa = self.empresa_id()?;

        let mut body = match extra {
            Value::Object(map) => Value::Object(map.clone()),
            Value::Null => Value::Object(serde_json::Map::new()),
            other => {
                return Err(ApiError::Validation(format!(
                    "Extra dependent fields must be a JSON object, got: {}",
                    other
                )))
            }
        };
        body["id_cedula"] = Value::String(cedula.to_string());
        body["contrasena"] = Value::String(password.to_string());
        body["id_empresa"] = Value::String(empresa);
        body["rol"] = Value::String("D".to_string());

        let created = self.post_data("/user", &body).await?;
        info!(dependent = %cedula, "Dependent created");
        Ok(created)
    }

    /// Delete a dependent account.
    pub async fn delete_dependent(&self, cedula: &str) -> Result<(), ApiError> {
        self.delete_data(&format!("/user/delete/adm/{}", urlencoding::encode(cedula)))
            .await?;
        info!(dependent = %cedula, "Dependent deleted");
        Ok(())
    }
}
