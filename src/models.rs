//! Backend payload models.
//!
//! The backend wraps every response in `{ "code": ..., "data": ... }` and is
//! loose about types (`code` arrives as `"200"` or `200` depending on the
//! route). Typed structs cover the fields the CLI works with; everything else
//! a record may carry survives round trips through the `extra` flatten maps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope shared by all routes.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// True when `code` is absent or reads as 200, in either representation.
    pub fn code_is_ok(&self) -> bool {
        match &self.code {
            None => true,
            Some(Value::Number(n)) => n.as_u64() == Some(200),
            Some(Value::String(s)) => s == "200",
            _ => false,
        }
    }

    /// The envelope code rendered for error messages.
    pub fn code_text(&self) -> String {
        match &self.code {
            None => "missing".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// A practice user (professional or dependent account).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id_cedula: String,
    pub id_empresa: Value,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    /// "D" marks a dependent account.
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl User {
    /// Practice identifier as the path-segment text the routes expect.
    pub fn empresa_id(&self) -> String {
        match &self.id_empresa {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_dependent(&self) -> bool {
        self.rol
            .as_deref()
            .map(|r| r.trim().eq_ignore_ascii_case("d"))
            .unwrap_or(false)
    }
}

/// Payload returned by `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub user: User,
    pub token: String,
}

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id_cedula: String,
    #[serde(default)]
    pub tipo_cedula: Option<String>,
    #[serde(default)]
    pub id_empresa: Option<Value>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellidos: Option<String>,
    #[serde(default)]
    pub conocido_como: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub telefono_emergencia: Option<String>,
    #[serde(default)]
    pub residencia: Option<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A consultation as created/updated through the forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    #[serde(default)]
    pub id_consulta: Option<Value>,
    pub id_cedula: String,
    #[serde(default)]
    pub id_empresa: Option<Value>,
    pub tipoconsulta: String,
    #[serde(default)]
    pub valoracion: Option<String>,
    #[serde(default)]
    pub presion_arterial: Option<String>,
    #[serde(default)]
    pub frecuencia_cardiaca: Option<String>,
    #[serde(default)]
    pub saturacion_oxigeno: Option<String>,
    #[serde(default)]
    pub glicemia: Option<String>,
    #[serde(default)]
    pub frecuencia_respiratoria: Option<String>,
    #[serde(default)]
    pub plan_tratamiento: Option<String>,
    pub fecha_consulta: String,
    #[serde(default)]
    pub monto_consulta: Option<String>,
    #[serde(default)]
    pub estado: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A patient's medical-history record (route `/mh`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub id_cedula: String,
    #[serde(default)]
    pub id_empresa: Option<Value>,
    /// Personal pathological history.
    pub app: String,
    /// Family pathological history.
    pub apf: String,
    #[serde(default)]
    pub aqx: Option<String>,
    #[serde(default)]
    pub tx: Option<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// An agenda appointment (route `/diary`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub id_empresa: Option<Value>,
    #[serde(default)]
    pub id_cedula_usuario: Option<String>,
    pub id_cedula_paciente: String,
    pub fecha: String,
    pub hora_inicio: String,
    pub hora_final: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_code_variants() {
        let numeric: Envelope<Value> = serde_json::from_value(json!({"code": 200, "data": []})).unwrap();
        assert!(numeric.code_is_ok());

        let string: Envelope<Value> = serde_json::from_value(json!({"code": "200", "data": []})).unwrap();
        assert!(string.code_is_ok());

        let error: Envelope<Value> = serde_json::from_value(json!({"code": "500", "data": "limit reached"})).unwrap();
        assert!(!error.code_is_ok());
        assert_eq!(error.code_text(), "500");

        let bare: Envelope<Value> = serde_json::from_value(json!({"data": {}})).unwrap();
        assert!(bare.code_is_ok());
    }

    #[test]
    fn test_user_empresa_id_type_drift() {
        let as_number: User = serde_json::from_value(json!({
            "id_cedula": "1-1111-1111", "id_empresa": 7
        }))
        .unwrap();
        assert_eq!(as_number.empresa_id(), "7");

        let as_string: User = serde_json::from_value(json!({
            "id_cedula": "1-1111-1111", "id_empresa": "7"
        }))
        .unwrap();
        assert_eq!(as_string.empresa_id(), "7");
    }

    #[test]
    fn test_user_dependent_role() {
        let dep: User = serde_json::from_value(json!({
            "id_cedula": "2", "id_empresa": 1, "rol": " d "
        }))
        .unwrap();
        assert!(dep.is_dependent());

        let admin: User = serde_json::from_value(json!({
            "id_cedula": "2", "id_empresa": 1, "rol": "A"
        }))
        .unwrap();
        assert!(!admin.is_dependent());
    }

    #[test]
    fn test_patient_extra_fields_survive() {
        let patient: Patient = serde_json::from_value(json!({
            "id_cedula": "1-2222-3333",
            "nombre": "Ana",
            "apellidos": "Mora",
            "grupo_sanguineo": "O+"
        }))
        .unwrap();
        assert_eq!(patient.extra.get("grupo_sanguineo"), Some(&json!("O+")));

        let back = serde_json::to_value(&patient).unwrap();
        assert_eq!(back["grupo_sanguineo"], json!("O+"));
    }

    #[test]
    fn test_consultation_deserialize() {
        let consultation: Consultation = serde_json::from_value(json!({
            "id_consulta": 12,
            "id_cedula": "1-2222-3333",
            "tipoconsulta": "General",
            "fecha_consulta": "2024-03-01T00:00:00.000Z",
            "monto_consulta": "100.00"
        }))
        .unwrap();
        assert_eq!(consultation.tipoconsulta, "General");
        assert!(consultation.valoracion.is_none());
    }
}
