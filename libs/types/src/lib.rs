//! Types library for the claims processing service
//!
//! This library provides all core type definitions used across the claims
//! pipeline, ensuring type safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (ClaimId, ProviderNpi)
//! - `money`: Currency parsing and fixed-point conversion helpers
//! - `claim`: Claim and claim line types
//! - `errors`: Error taxonomy

// Public modules
pub mod claim;
pub mod errors;
pub mod ids;
pub mod money;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::claim::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::money::*;
}
