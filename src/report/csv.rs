//! CSV assembly for the report generator.
//!
//! Two row schemes exist, mirroring the backend payloads:
//! - per-patient consultation reports use a fixed, explicit field list and
//!   substitute an empty cell for anything a record is missing;
//! - monthly detail reports take their columns from the first detail row's
//!   key order and require every later row to carry exactly the same keys.
//!
//! Cells are quoted only when they contain a delimiter, quote or newline.

use serde_json::Value;

use super::ReportError;

/// Explicit projection for per-patient consultation rows.
///
/// The backend owns the consultation schema; this list pins the column set
/// so that schema drift on the server cannot misalign the output.
pub const CONSULTATION_FIELDS: [&str; 12] = [
    "id_consulta",
    "id_cedula",
    "tipoconsulta",
    "valoracion",
    "presion_arterial",
    "frecuencia_cardiaca",
    "saturacion_oxigeno",
    "glicemia",
    "frecuencia_respiratoria",
    "plan_tratamiento",
    "fecha_consulta",
    "monto_consulta",
];

/// Quote a cell when it would otherwise break the row structure.
pub fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Coerce a JSON value to cell text.
///
/// Null and missing become the empty cell; scalars use their display form;
/// nested arrays/objects are emitted as their compact JSON text (quoting
/// then keeps the row intact).
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(boolean)) => boolean.to_string(),
        Some(other) => other.to_string(),
    }
}

fn join_row<I: IntoIterator<Item = String>>(cells: I) -> String {
    cells
        .into_iter()
        .map(|c| csv_escape(&c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build the per-patient consultation CSV.
///
/// One data row per input record, in input order, projected onto
/// [`CONSULTATION_FIELDS`]. An empty input is a "nothing to report" error,
/// not an empty file.
pub fn build_consultations(rows: &[Value]) -> Result<String, ReportError> {
    if rows.is_empty() {
        return Err(ReportError::EmptyResult);
    }

    let header = join_row(CONSULTATION_FIELDS.iter().map(|f| f.to_string()));

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header);
    for row in rows {
        let obj = row.as_object();
        let line = join_row(
            CONSULTATION_FIELDS
                .iter()
                .map(|field| cell_text(obj.and_then(|o| o.get(*field)))),
        );
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

/// Unwrap the aggregate object, peeling a one-element outer array if the
/// backend returned one. An empty array or null payload is "nothing to
/// report".
pub fn unwrap_aggregate(payload: &Value) -> Result<&Value, ReportError> {
    let aggregate = match payload {
        Value::Array(items) => items.first().ok_or(ReportError::EmptyResult)?,
        other => other,
    };
    if aggregate.is_null() {
        return Err(ReportError::EmptyResult);
    }
    Ok(aggregate)
}

/// Build the monthly report CSV from the aggregate object.
///
/// With a non-empty `detalles` array the columns come from the first detail
/// row's key order plus the two fixed total columns, followed by one trailing
/// totals line. Without `detalles` the output is a single four-column summary
/// row. The backend sometimes wraps the aggregate in a one-element array;
/// that wrapper is unwrapped here.
pub fn build_monthly(payload: &Value) -> Result<String, ReportError> {
    let aggregate = unwrap_aggregate(payload)?;

    let total_consultas = cell_text(aggregate.get("total_consultas"));
    let monto_total = cell_text(aggregate.get("monto_total_mensual"));

    let detalles = aggregate.get("detalles").and_then(|d| d.as_array());
    match detalles {
        Some(details) if !details.is_empty() => {
            let first = details[0]
                .as_object()
                .ok_or(ReportError::SchemaMismatch { row: 0 })?;
            let keys: Vec<&String> = first.keys().collect();

            let mut header_cells: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
            header_cells.push("Total Consultas".to_string());
            header_cells.push("Monto Total Mensual".to_string());

            let mut lines = Vec::with_capacity(details.len() + 2);
            lines.push(join_row(header_cells.into_iter()));

            for (idx, item) in details.iter().enumerate() {
                let obj = item
                    .as_object()
                    .ok_or(ReportError::SchemaMismatch { row: idx })?;
                // All rows must carry exactly the first row's key set.
                if obj.len() != first.len() || !keys.iter().all(|k| obj.contains_key(*k)) {
                    return Err(ReportError::SchemaMismatch { row: idx });
                }
                lines.push(join_row(keys.iter().map(|k| cell_text(obj.get(*k)))));
            }

            lines.push(format!(
                "Total Consultas:,{},Monto Total Mensual:,{}",
                csv_escape(&total_consultas),
                csv_escape(&monto_total)
            ));

            Ok(lines.join("\n"))
        }
        _ => {
            let anio = cell_text(aggregate.get("anio"));
            let mes = cell_text(aggregate.get("mes"));
            Ok(format!(
                "anio,mes,total_consultas,monto_total_mensual\n{},{},{},{}",
                csv_escape(&anio),
                csv_escape(&mes),
                csv_escape(&total_consultas),
                csv_escape(&monto_total)
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_escape_plain() {
        assert_eq!(csv_escape("abc"), "abc");
        assert_eq!(csv_escape(""), "");
    }

    #[test]
    fn test_csv_escape_special() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_cell_text_coercion() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("x"))), "x");
        assert_eq!(cell_text(Some(&json!(42))), "42");
        assert_eq!(cell_text(Some(&json!(true))), "true");
        assert_eq!(cell_text(Some(&json!([1, 2]))), "[1,2]");
    }

    #[test]
    fn test_consultations_header_and_rows() {
        let rows = vec![
            json!({"id_consulta": 1, "tipoconsulta": "General", "monto_consulta": "100"}),
            json!({"id_consulta": 2, "tipoconsulta": "Curaciones", "monto_consulta": "50"}),
        ];
        let csv = build_consultations(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split(',').count(), CONSULTATION_FIELDS.len());
        assert!(lines[0].starts_with("id_consulta,id_cedula,tipoconsulta"));
        // Missing fields project to empty cells, preserving column count.
        assert_eq!(lines[1].split(',').count(), CONSULTATION_FIELDS.len());
        assert!(lines[1].starts_with("1,,General"));
        assert!(lines[2].starts_with("2,,Curaciones"));
    }

    #[test]
    fn test_consultations_input_order_preserved() {
        let rows = vec![
            json!({"id_consulta": "b"}),
            json!({"id_consulta": "a"}),
            json!({"id_consulta": "c"}),
        ];
        let csv = build_consultations(&rows).unwrap();
        let ids: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_consultations_empty_is_error() {
        assert!(matches!(
            build_consultations(&[]),
            Err(ReportError::EmptyResult)
        ));
    }

    #[test]
    fn test_monthly_with_details() {
        let payload = json!([{
            "anio": 2024,
            "mes": 3,
            "total_consultas": 7,
            "monto_total_mensual": "350.00",
            "detalles": [
                {"tipoconsulta": "General", "cantidad": 5, "monto": "250.00"},
                {"tipoconsulta": "Curaciones", "cantidad": 2, "monto": "100.00"},
            ]
        }]);
        let csv = build_monthly(&payload).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        // N detail rows + trailing totals line after the header.
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "tipoconsulta,cantidad,monto,Total Consultas,Monto Total Mensual"
        );
        assert_eq!(lines[1], "General,5,250.00");
        assert_eq!(lines[2], "Curaciones,2,100.00");
        assert_eq!(lines[3], "Total Consultas:,7,Monto Total Mensual:,350.00");
    }

    #[test]
    fn test_monthly_without_details() {
        let payload = json!({
            "anio": 2024,
            "mes": 3,
            "total_consultas": 7,
            "monto_total_mensual": "350.00"
        });
        let csv = build_monthly(&payload).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "anio,mes,total_consultas,monto_total_mensual");
        assert_eq!(lines[1], "2024,3,7,350.00");
        assert_eq!(lines[1].split(',').count(), 4);
    }

    #[test]
    fn test_monthly_empty_array_is_empty_result() {
        assert!(matches!(
            build_monthly(&json!([])),
            Err(ReportError::EmptyResult)
        ));
    }

    #[test]
    fn test_monthly_schema_mismatch_rejected() {
        let payload = json!({
            "anio": 2024,
            "mes": 1,
            "total_consultas": 2,
            "monto_total_mensual": "80.00",
            "detalles": [
                {"tipoconsulta": "General", "cantidad": 1},
                {"tipoconsulta": "General", "monto": "40.00"},
            ]
        });
        assert!(matches!(
            build_monthly(&payload),
            Err(ReportError::SchemaMismatch { row: 1 })
        ));
    }

    #[test]
    fn test_idempotent_output() {
        let rows = vec![json!({"id_consulta": 1, "monto_consulta": "9,99"})];
        let a = build_consultations(&rows).unwrap();
        let b = build_consultations(&rows).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\"9,99\""));
    }
}
