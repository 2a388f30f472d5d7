//! Backend-relayed notification mails.
//!
//! The backend owns the SMTP side; the client only posts
//! `{ email, reason }` bodies to the `/sendEmail/*` routes.

use serde_json::json;
use tracing::info;

use super::{ApiClient, ApiError};

/// The mail categories the backend can relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    /// Appointment confirmation for a patient.
    Appointment,
    /// Support request from a user.
    Support,
    /// Account-creation request.
    CreateUser,
    /// Password-reset request.
    ResetPassword,
}

impl MailKind {
    pub fn route(&self) -> &'static str {
        match self {
            Self::Appointment => "/sendEmail/cita",
            Self::Support => "/sendEmail/support",
            Self::CreateUser => "/sendEmail/createUser",
            Self::ResetPassword => "/sendEmail/resetPassword",
        }
    }
}

impl ApiClient {
    /// Ask the backend to send a notification mail.
    pub async fn send_mail(&self, kind: MailKind, email: &str, reason: &str) -> Result<(), ApiError> {
        let body = json!({
            "email": email,
            "reason": reason,
        });
        self.post_data(kind.route(), &body).await?;
        info!(kind = ?kind, email = %email, "Mail relayed");
        Ok(())
    }
}

/// Compose the appointment-confirmation text the way the agenda screen did.
pub fn appointment_mail_body(
    patient_name: &str,
    assigned_by: &str,
    fecha: &str,
    hora_inicio: &str,
    hora_final: &str,
) -> String {
    format!(
        "Confirmación de Cita:\n\
         - Paciente: {}\n\
         - Asignado por: {}\n\
         - Fecha: {}\n\
         - Horario: {} - {}",
        patient_name, assigned_by, fecha, hora_inicio, hora_final
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_routes() {
        assert_eq!(MailKind::Appointment.route(), "/sendEmail/cita");
        assert_eq!(MailKind::Support.route(), "/sendEmail/support");
        assert_eq!(MailKind::CreateUser.route(), "/sendEmail/createUser");
        assert_eq!(MailKind::ResetPassword.route(), "/sendEmail/resetPassword");
    }

    #[test]
    fn test_appointment_body_mentions_schedule() {
        let body = appointment_mail_body("Ana Mora", "Laura Chaves", "2024-03-01", "09:00", "09:30");
        assert!(body.contains("Ana Mora"));
        assert!(body.contains("2024-03-01"));
        assert!(body.contains("09:00 - 09:30"));
    }
}
