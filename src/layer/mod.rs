//! Assets layer
//!
//! The layer is the persistent side of the cache: a directory the host keeps
//! across builds, a small record describing what produced its contents, and
//! the symlinks that make it appear inside the working tree.

pub mod isolation;
pub mod metadata;
pub mod store;

pub use isolation::{DirectoryIsolator, IsolationMapping, MappedPath, SymlinkIsolator};
pub use metadata::{BuildMetadata, LayerRecord};
pub use store::{Layer, LayerStore};

/// Name of the layer holding compiled assets
pub const ASSETS_LAYER: &str = "assets";
