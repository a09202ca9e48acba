pub mod claims;
pub mod providers;
