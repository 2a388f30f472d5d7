//! Persisted login session.
//!
//! The backend issues a bearer token at login and refuses a second login
//! while one is active, so the token and the logged-in user are kept on disk
//! between invocations, the way the original client kept them in its local
//! storage.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;
use crate::models::User;

/// A stored login session: bearer token plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    /// Get the path to the session file
    fn session_file_path() -> Option<PathBuf> {
        Config::default_config_dir()
            .ok()
            .map(|d| d.join("session.json"))
    }

    /// Save the session to disk for persistence across invocations
    pub fn save_to_file(&self) -> Result<(), std::io::Error> {
        if let Some(path) = Self::session_file_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            std::fs::write(&path, json)?;
            tracing::debug!("Saved session to {:?}", path);
        }
        Ok(())
    }

    /// Load the session from disk
    pub fn load_from_file() -> Option<Self> {
        let path = Self::session_file_path()?;
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(session) => {
                    tracing::debug!(
                        "Loaded saved session for {:?}",
                        session.user.id_cedula
                    );
                    Some(session)
                }
                Err(e) => {
                    tracing::warn!("Failed to parse saved session: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read session file: {}", e);
                None
            }
        }
    }

    /// Delete the saved session file
    pub fn delete_file() {
        if let Some(path) = Self::session_file_path() {
            if path.exists() {
                let _ = std::fs::remove_file(&path);
                tracing::debug!("Deleted session file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_roundtrip_json() {
        let session = Session {
            token: "abc.def.ghi".to_string(),
            user: serde_json::from_value(json!({
                "id_cedula": "1-1111-1111",
                "id_empresa": 4,
                "nombre": "Laura",
                "apellidos": "Chaves",
                "rol": "A"
            }))
            .unwrap(),
        };

        let text = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&text).unwrap();
        assert_eq!(back.token, "abc.def.ghi");
        assert_eq!(back.user.empresa_id(), "4");
    }
}
