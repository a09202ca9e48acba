use std::sync::Arc;

use claims_engine::ClaimProcessor;
use provider_stats::{AggregatorConfig, FeeAggregator};
use types::errors::AggregationError;

use crate::rate_limit::RateLimiter;
use crate::store::ClaimStore;

/// Shared application state, constructed once at startup and injected
/// into handlers. The aggregator and store live for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<ClaimProcessor>,
    pub aggregator: Arc<FeeAggregator>,
    pub store: Arc<ClaimStore>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: AggregatorConfig) -> Result<Self, AggregationError> {
        Ok(Self {
            processor: Arc::new(ClaimProcessor::new()),
            aggregator: Arc::new(FeeAggregator::new(config)?),
            store: Arc::new(ClaimStore::new()),
            rate_limiter: Arc::new(RateLimiter::new()),
        })
    }
}
