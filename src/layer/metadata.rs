//! Persisted layer record
//!
//! The host keeps `<layers>/<name>.toml` between builds. The `[metadata]`
//! table is opaque to the host; the assets build stores its
//! [`BuildMetadata`] there.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Metadata key holding the digest of the last successful build
pub const CACHE_SHA_KEY: &str = "cache_sha";

/// Metadata key holding the timestamp of the last successful build
pub const BUILT_AT_KEY: &str = "built_at";

/// On-disk form of a layer record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerRecord {
    /// Layer is exported into the application image
    pub launch: bool,

    /// Layer is visible to later build steps
    pub build: bool,

    /// Layer is restored on the next build
    pub cache: bool,

    /// Opaque key-value metadata
    pub metadata: toml::Table,
}

/// Record of the last successful asset build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
    /// Digest of the sources that produced the layer contents
    pub cache_sha: String,

    /// When the layer contents were produced (RFC 3339, nanoseconds)
    pub built_at: String,
}

impl BuildMetadata {
    /// Create a record for a build that finished at `built_at`
    pub fn new(cache_sha: impl Into<String>, built_at: DateTime<Utc>) -> Self {
        Self {
            cache_sha: cache_sha.into(),
            built_at: format_timestamp(built_at),
        }
    }

    /// Read the record back from a metadata table
    ///
    /// Returns `None` unless `cache_sha` is present as a string.
    pub fn from_table(table: &toml::Table) -> Option<Self> {
        let cache_sha = table.get(CACHE_SHA_KEY)?.as_str()?.to_string();
        let built_at = table
            .get(BUILT_AT_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Some(Self {
            cache_sha,
            built_at,
        })
    }

    /// Write the record into a metadata table, keeping unrelated keys
    pub fn merge_into(&self, table: &mut toml::Table) {
        table.insert(
            CACHE_SHA_KEY.to_string(),
            toml::Value::String(self.cache_sha.clone()),
        );
        table.insert(
            BUILT_AT_KEY.to_string(),
            toml::Value::String(self.built_at.clone()),
        );
    }
}

/// Fixed high-precision timestamp format (`2026-10-19T10:00:00.000000001Z`)
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
