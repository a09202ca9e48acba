use crate::error::AppError;
use crate::models::TopProviderResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

/// 10 requests per minute, matching the documented query budget
const TOP_PROVIDERS_CAPACITY: u32 = 10;
const TOP_PROVIDERS_REFILL_PER_SEC: f64 = 10.0 / 60.0;

#[derive(Debug, Deserialize)]
pub struct TopProvidersQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// GET /top-providers?limit=N
///
/// Returns providers ranked by estimated total net fees. Totals are
/// upper bounds on the true aggregates; order can be imprecise for
/// providers whose totals are close together.
pub async fn top_providers(
    State(state): State<AppState>,
    Query(query): Query<TopProvidersQuery>,
) -> Result<Json<Vec<TopProviderResponse>>, AppError> {
    state.rate_limiter.check_rate_limit(
        "top_providers",
        TOP_PROVIDERS_CAPACITY,
        TOP_PROVIDERS_REFILL_PER_SEC,
    )?;

    let entries = state.aggregator.top(query.limit)?;

    Ok(Json(
        entries
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| TopProviderResponse {
                rank: idx + 1,
                provider_npi: entry.provider_npi,
                total_net_fees: format!("{:.2}", entry.estimated_total),
                claim_count: entry.claim_count,
            })
            .collect(),
    ))
}
