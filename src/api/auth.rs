//! Authentication routes.

use serde_json::json;
use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::LoginData;
use crate::session::Session;

impl ApiClient {
    /// Log in with cedula and password.
    ///
    /// The backend answers 403 while another session is active for the same
    /// user; that case gets its own error so the caller can suggest logging
    /// out first.
    pub async fn login(&self, cedula: &str, password: &str) -> Result<Session, ApiError> {
        let body = json!({
            "id_cedula": cedula,
            "contrasena": password,
        });

        let data = match self.post_data("/auth/login", &body).await {
            Err(ApiError::AccessDenied(_)) => return Err(ApiError::SessionActive),
            other => other?,
        };

        let login: LoginData = Self::decode(data)?;
        info!(user = %login.user.id_cedula, "Logged in");

        Ok(Session {
            token: login.token,
            user: login.user,
        })
    }

    /// Log out the current session on the backend.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session()?;
        self.post_data("/auth/logout", &json!({})).await?;
        info!("Logged out");
        Ok(())
    }

    /// Change a user's password.
    pub async fn change_password(&self, cedula: &str, password: &str) -> Result<(), ApiError> {
        let body = json!({
            "id_cedula": cedula,
            "contrasena": password,
        });
        self.patch_data("/auth/change-password", &body).await?;
        info!(user = %cedula, "Password changed");
        Ok(())
    }
}
