use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use types::claim::Claim;
use types::errors::StoreError;
use types::ids::ClaimId;

/// In-memory claim store.
///
/// Process-lifetime storage for serving claim lookups and duplicate
/// detection; durable persistence is an external system. The external-id
/// index is the authority for duplicates, so insertion claims the index
/// entry before the claim becomes visible.
pub struct ClaimStore {
    claims: DashMap<ClaimId, Claim>,
    external_index: DashMap<String, ClaimId>,
}

impl ClaimStore {
    pub fn new() -> Self {
        Self {
            claims: DashMap::new(),
            external_index: DashMap::new(),
        }
    }

    /// Inserts a processed claim, rejecting duplicate external ids.
    pub fn insert(&self, claim: Claim) -> Result<(), StoreError> {
        if let Some(external_id) = &claim.external_claim_id {
            match self.external_index.entry(external_id.clone()) {
                Entry::Occupied(_) => {
                    return Err(StoreError::DuplicateExternalId {
                        external_id: external_id.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(claim.claim_id);
                }
            }
        }
        self.claims.insert(claim.claim_id, claim);
        Ok(())
    }

    /// Fetches a claim by id.
    pub fn get(&self, claim_id: &ClaimId) -> Result<Claim, StoreError> {
        self.claims
            .get(claim_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                claim_id: claim_id.to_string(),
            })
    }

    /// Looks up a claim by its caller-supplied external id.
    pub fn get_by_external_id(&self, external_id: &str) -> Option<Claim> {
        let claim_id = *self.external_index.get(external_id)?;
        self.claims.get(&claim_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl Default for ClaimStore {
    fn default() -> Self {
        Self::new()
    }
}
