use crate::error::AppError;
use crate::models::{ClaimCreateRequest, ClaimResponse};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use types::errors::ClaimError;
use types::ids::ClaimId;

/// POST /claims
///
/// Normalizes and validates the submitted lines, computes net fees,
/// stores the claim, and records each line's (NPI, net fee) into the
/// provider rankings.
pub async fn create_claim(
    State(state): State<AppState>,
    Json(payload): Json<ClaimCreateRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    // Early duplicate check so obviously repeated submissions fail fast;
    // the store's insert re-checks atomically.
    if let Some(external_id) = &payload.external_claim_id {
        if state.store.get_by_external_id(external_id).is_some() {
            return Err(ClaimError::Store(types::errors::StoreError::DuplicateExternalId {
                external_id: external_id.clone(),
            })
            .into());
        }
    }

    let processed = state
        .processor
        .process(payload.external_claim_id.clone(), &payload.lines)
        .map_err(AppError::from)?;

    for warning in &processed.warnings {
        tracing::warn!(claim_id = %processed.claim.claim_id, "{warning}");
    }

    state.store.insert(processed.claim.clone())?;

    // Validation already guaranteed non-empty NPIs and non-negative fees,
    // so these records cannot fail
    for (line, net_fee) in processed.lines.iter().zip(&processed.line_net_fees) {
        state.aggregator.record(&line.provider_npi, *net_fee)?;
    }

    tracing::info!(
        claim_id = %processed.claim.claim_id,
        provider_npi = %processed.claim.provider_npi,
        net_fee = %processed.claim.net_fee,
        lines = processed.claim.line_count,
        "claim processed"
    );

    Ok(Json(ClaimResponse::from_claim(
        &processed.claim,
        processed.warnings,
    )))
}

/// GET /claims/{id}
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, AppError> {
    let uuid: Uuid = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("'{id}' is not a valid claim id")))?;

    let claim = state.store.get(&ClaimId::from_uuid(uuid))?;
    Ok(Json(ClaimResponse::from_claim(&claim, Vec::new())))
}
