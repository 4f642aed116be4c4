//! The collection of implemented algorithms.

pub mod trust_region;

pub use trust_region::TrustRegion;
