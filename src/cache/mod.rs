//! Content-addressed reuse of compiled assets
//!
//! The digest of the asset source directories is the cache key. It is
//! stored in the assets layer metadata after a successful build; a later
//! build with the same digest relinks the layer instead of recompiling.

pub mod checksum;

pub use checksum::{Calculator, ChecksumCalculator};
