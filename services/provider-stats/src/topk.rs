//! Bounded top-K candidate tracking
//!
//! Keeps at most `capacity` providers believed to be the current leaders
//! by estimated total. Admission and eviction consult the sketch's fresh
//! estimate after each update, so no per-provider state is kept for the
//! long tail.
//!
//! Known approximation gap: a provider outside the candidate set whose
//! true total silently grows past a member is not re-admitted until its
//! own next claim arrives. This is inherent to pairing a sketch with a
//! bounded candidate set; a full re-scan would defeat the fixed-memory
//! design.

use types::errors::AggregationError;

/// One tracked candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub provider_npi: String,
    /// Sketch estimate (cents) as of the last observe or snapshot refresh
    pub estimated_cents: u64,
    /// Claims observed while this provider has been a candidate
    pub claim_count: u64,
    /// Admission sequence number, for stable tie-breaks
    seq: u64,
}

/// Fixed-capacity tracker of the highest-estimate providers.
#[derive(Debug, Clone)]
pub struct TopProviders {
    capacity: usize,
    candidates: Vec<Candidate>,
    /// Monotone counter assigning first-seen order to admissions
    next_seq: u64,
}

impl TopProviders {
    /// Creates a tracker holding at most `capacity` candidates.
    pub fn new(capacity: usize) -> Result<Self, AggregationError> {
        if capacity == 0 {
            return Err(AggregationError::InvalidArgument {
                reason: "top-K capacity must be greater than zero".to_string(),
            });
        }
        Ok(Self {
            capacity,
            candidates: Vec::with_capacity(capacity),
            next_seq: 0,
        })
    }

    /// Returns the maximum number of tracked candidates.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of providers currently tracked.
    pub fn tracked(&self) -> usize {
        self.candidates.len()
    }

    /// Records a fresh estimate for a provider after its sketch update.
    ///
    /// Tracked providers are updated in place. Untracked providers are
    /// admitted while capacity remains, and afterwards only when their
    /// estimate strictly exceeds the current minimum, which is evicted.
    pub fn observe(&mut self, provider_npi: &str, estimated_cents: u64) {
        if let Some(existing) = self
            .candidates
            .iter_mut()
            .find(|c| c.provider_npi == provider_npi)
        {
            existing.estimated_cents = estimated_cents;
            existing.claim_count += 1;
            return;
        }

        if self.candidates.len() < self.capacity {
            self.admit(provider_npi, estimated_cents);
            return;
        }

        let min_idx = self.min_index();
        if estimated_cents > self.candidates[min_idx].estimated_cents {
            self.candidates.swap_remove(min_idx);
            self.admit(provider_npi, estimated_cents);
        }
    }

    /// Returns up to `n` candidates ordered by estimate descending,
    /// first-seen ascending on ties.
    ///
    /// `refresh` re-reads each candidate's current estimate (typically
    /// from the sketch) before ordering, since other providers' updates
    /// can shift relative rankings between observes.
    pub fn snapshot<F>(&mut self, n: usize, mut refresh: F) -> Vec<Candidate>
    where
        F: FnMut(&str) -> u64,
    {
        for candidate in &mut self.candidates {
            // Monotone counters: the refreshed value can only be >= the
            // value recorded at observe time
            candidate.estimated_cents = refresh(&candidate.provider_npi);
        }

        let mut ordered = self.candidates.clone();
        ordered.sort_by(|a, b| {
            b.estimated_cents
                .cmp(&a.estimated_cents)
                .then(a.seq.cmp(&b.seq))
        });
        ordered.truncate(n.min(self.capacity));
        ordered
    }

    fn admit(&mut self, provider_npi: &str, estimated_cents: u64) {
        self.candidates.push(Candidate {
            provider_npi: provider_npi.to_string(),
            estimated_cents,
            claim_count: 1,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Index of the eviction victim: smallest estimate, latest-admitted
    /// on ties so earlier candidates are kept.
    fn min_index(&self) -> usize {
        let mut min_idx = 0;
        for (idx, candidate) in self.candidates.iter().enumerate().skip(1) {
            let min = &self.candidates[min_idx];
            if candidate.estimated_cents < min.estimated_cents
                || (candidate.estimated_cents == min.estimated_cents && candidate.seq > min.seq)
            {
                min_idx = idx;
            }
        }
        min_idx
    }
}
