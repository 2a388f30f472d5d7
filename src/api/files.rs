//! Patient file attachment routes.
//!
//! Uploads go through a multipart form with up to three attachment parts
//! named `image1`..`image3`, plus the patient/practice fields, matching the
//! form the backend's upload handler expects.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::info;

use super::{ApiClient, ApiError};

/// Most attachments the upload route accepts in one request.
pub const MAX_UPLOAD_FILES: usize = 3;

impl ApiClient {
    /// Upload up to three files for a patient.
    pub async fn upload_files(
        &self,
        cedula: &str,
        fecha: &str,
        detalle: &str,
        paths: &[PathBuf],
    ) -> Result<Value, ApiError> {
        if paths.is_empty() || paths.len() > MAX_UPLOAD_FILES {
            return Err(ApiError::Validation(format!(
                "Provide between 1 and {} files",
                MAX_UPLOAD_FILES
            )));
        }

        let mut form = Form::new()
            .text("id_empresa", self.empresa_id()?)
            .text("id_cedula", cedula.to_string())
            .text("fecha", fecha.to_string())
            .text("detalle", detalle.to_string());

        for (idx, path) in paths.iter().enumerate() {
            form = form.part(format!("image{}", idx + 1), file_part(path).await?);
        }

        let data = self.post_multipart("/api/files/upload", form).await?;
        info!(patient = %cedula, files = paths.len(), "Files uploaded");
        Ok(data)
    }

    /// List a patient's stored files.
    pub async fn patient_files(&self, cedula: &str) -> Result<Vec<Value>, ApiError> {
        let data = self
            .get_data(&format!("/api/files/patient/{}", urlencoding::encode(cedula)))
            .await?;
        match data {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items),
            other => Ok(vec![other]),
        }
    }

    /// Delete a stored file by registry id.
    pub async fn delete_file(&self, id_registro: &str) -> Result<(), ApiError> {
        self.delete_data(&format!("/api/files/{}", urlencoding::encode(id_registro)))
            .await?;
        info!(file = %id_registro, "File deleted");
        Ok(())
    }
}

async fn file_part(path: &Path) -> Result<Part, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(Part::bytes(bytes).file_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client() -> ApiClient {
        ApiClient::new(&Config::default(), None).unwrap()
    }

    #[tokio::test]
    async fn test_upload_rejects_zero_files() {
        let result = client().upload_files("1-1111-1111", "2024-03-01", "x", &[]).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_upload_rejects_too_many_files() {
        let paths: Vec<PathBuf> = (0..4).map(|i| PathBuf::from(format!("f{}.png", i))).collect();
        let result = client().upload_files("1-1111-1111", "2024-03-01", "x", &paths).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_file_part_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"png-bytes").unwrap();
        assert!(file_part(&path).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_part_missing_file() {
        let result = file_part(Path::new("/nonexistent/scan.png")).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
