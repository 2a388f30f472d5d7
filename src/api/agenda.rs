//! Agenda/appointment routes (backend route `/diary`).

use serde_json::Value;
use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::Appointment;

impl ApiClient {
    /// List all appointments.
    pub async fn appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        let data = self.get_data("/diary").await?;
        if data.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(data)?)
    }

    /// Create an appointment; practice and user ids come from the session.
    pub async fn create_appointment(&self, appointment: &Appointment) -> Result<Value, ApiError> {
        let session = self.session()?;
        let mut body = serde_json::to_value(appointment)?;
        body["id_empresa"] = session.user.id_empresa.clone();
        body["id_cedula_usuario"] = Value::String(session.user.id_cedula.clone());

        let created = self.post_data("/diary", &body).await?;
        info!(
            patient = %appointment.id_cedula_paciente,
            fecha = %appointment.fecha,
            "Appointment created"
        );
        Ok(created)
    }

    /// Delete an appointment by id.
    pub async fn delete_appointment(&self, id: &str) -> Result<(), ApiError> {
        self.delete_data(&format!("/diary/{}", urlencoding::encode(id)))
            .await?;
        info!(appointment = %id, "Appointment deleted");
        Ok(())
    }
}
