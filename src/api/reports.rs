//! Monthly report routes.

use serde_json::Value;
use tracing::debug;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch the monthly aggregate for the practice.
    ///
    /// `detailed` selects the grouped-by-consultation-type route. The raw
    /// payload is returned untyped; the report generator owns its shape
    /// (including the optional one-element array wrapper).
    pub async fn monthly_report(
        &self,
        year: &str,
        month: u32,
        detailed: bool,
    ) -> Result<Value, ApiError> {
        let empresa = self.empresa_id()?;
        let path = if detailed {
            format!(
                "/report/agrupado/{}/{}/{}",
                urlencoding::encode(year),
                month,
                urlencoding::encode(&empresa)
            )
        } else {
            format!(
                "/report/{}/{}/{}",
                urlencoding::encode(year),
                month,
                urlencoding::encode(&empresa)
            )
        };
        debug!(year, month, detailed, "Fetching monthly report");
        self.get_data(&path).await
    }
}
