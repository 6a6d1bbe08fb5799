//! # Tax Service Client
//!
//! Thin HTTP client for the external tax-calculation service used during
//! payroll close. Deployments mount the service under different path
//! prefixes, so the client probes a fixed list of candidate paths and uses
//! the first one that answers 200.

use locumdesk_core::{
    errors::{LocumError, LocumResult},
    models::payroll::{TaxCalcRequest, TaxCalcResponse},
};
use std::time::Duration;

/// Candidate mount points, tried in order. Probing stops at the first 200.
pub fn candidate_urls(base_url: &str, tax_year: i32) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    vec![
        format!("{base}/internal/payroll/calc-tax-ytd?year={tax_year}"),
        format!("{base}/api/internal/payroll/calc-tax-ytd?year={tax_year}"),
        format!("{base}/users/internal/payroll/calc-tax-ytd?year={tax_year}"),
        format!("{base}/api/users/internal/payroll/calc-tax-ytd?year={tax_year}"),
    ]
}

/// Exactly 200. A misrouted mount can answer with another 2xx code.
pub fn accepted(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::OK
}

/// Client for the tax calculation RPC.
///
/// Holds a pooled [`reqwest::Client`] with a per-request timeout; cheap to
/// clone and share through [`crate::ApiState`].
#[derive(Debug, Clone)]
pub struct TaxClient {
    base_url: String,
    internal_key: String,
    client: reqwest::Client,
}

impl TaxClient {
    pub fn new(base_url: &str, internal_key: &str, timeout_secs: u64) -> LocumResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LocumError::Upstream(format!("failed to build http client: {e}")))?;

        Ok(Self {
            base_url: base_url.to_string(),
            internal_key: internal_key.to_string(),
            client,
        })
    }

    /// Calls the tax service with the updated YTD snapshot.
    ///
    /// Each candidate path gets exactly one attempt; a non-200 answer or a
    /// transport error moves on to the next. Exhausting the list is an
    /// upstream failure, which aborts the payroll close.
    pub async fn calc_tax_ytd(
        &self,
        tax_year: i32,
        request: &TaxCalcRequest,
    ) -> LocumResult<TaxCalcResponse> {
        let mut last_failure = String::new();

        for url in candidate_urls(&self.base_url, tax_year) {
            let result = self
                .client
                .post(&url)
                .header("x-internal-key", &self.internal_key)
                .json(request)
                .send()
                .await;

            match result {
                Ok(response) if accepted(response.status()) => {
                    return response.json::<TaxCalcResponse>().await.map_err(|e| {
                        LocumError::Upstream(format!("tax service returned invalid body: {e}"))
                    });
                }
                Ok(response) => {
                    last_failure = format!("{url} -> {}", response.status());
                    tracing::debug!("Tax service candidate rejected: {last_failure}");
                }
                Err(e) => {
                    last_failure = format!("{url} -> {e}");
                    tracing::debug!("Tax service candidate unreachable: {last_failure}");
                }
            }
        }

        Err(LocumError::Upstream(format!(
            "tax service unreachable on all candidate paths (last: {last_failure})"
        )))
    }
}
