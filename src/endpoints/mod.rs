//! Endpoint registry: versioned mapping from operation name to URL path.
//!
//! The tables are static data. The only mutable piece is the active version,
//! which lives in a [`VersionSelector`] owned by each dispatcher rather than
//! in process-wide state.

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::RegistryError;
use crate::schema::ApiVersion;

mod v1;

/// Tag of the default (and currently only) supported API version.
pub const DEFAULT_API_VERSION: &str = "v1";

const SUPPORTED_VERSIONS: &[&str] = &[DEFAULT_API_VERSION];

/// Immutable mapping from operation name to URL path for one API version.
#[derive(Debug)]
pub struct EndpointTable {
    entries: &'static [(&'static str, &'static str)],
}

impl EndpointTable {
    const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Looks up the path fragment for `operation`.
    #[must_use]
    pub fn path(&self, operation: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == operation)
            .map(|(_, path)| *path)
    }

    /// Returns the table's own `'static` spelling of `operation`.
    #[must_use]
    pub fn operation_name(&self, operation: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == operation)
            .map(|(name, _)| *name)
    }

    /// Iterates over `(operation, path)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of operations in the table.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table has no operations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the versions this client understands, default first.
#[must_use]
pub const fn supported_versions() -> &'static [&'static str] {
    SUPPORTED_VERSIONS
}

/// Returns `true` when `version` is one of [`supported_versions`].
#[must_use]
pub fn is_supported(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// Returns the full endpoint table for `version`.
///
/// # Errors
///
/// Returns [`RegistryError::VersionNotAvailable`] for unknown versions.
pub fn endpoint_table(version: &str) -> Result<&'static EndpointTable, RegistryError> {
    match version {
        DEFAULT_API_VERSION => Ok(&v1::TABLE),
        _ => Err(RegistryError::VersionNotAvailable),
    }
}

/// Holds the active API version for one dispatcher.
#[derive(Debug)]
pub struct VersionSelector {
    active: RwLock<ApiVersion>,
}

impl Default for VersionSelector {
    fn default() -> Self {
        Self {
            active: RwLock::new(ApiVersion::from(DEFAULT_API_VERSION)),
        }
    }
}

impl VersionSelector {
    /// Creates a selector with `version` active.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::VersionNotAvailable`] when `version` is not
    /// supported.
    pub fn new(version: &str) -> Result<Self, RegistryError> {
        if !is_supported(version) {
            return Err(RegistryError::VersionNotAvailable);
        }
        Ok(Self {
            active: RwLock::new(ApiVersion::from(version)),
        })
    }

    /// Returns the active version.
    #[must_use]
    pub fn active(&self) -> ApiVersion {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Switches the active version. Setting the already active version is a
    /// no-op; an unsupported version leaves the current one in place.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::VersionNotAvailable`] when `version` is not
    /// supported.
    pub fn set_active(&self, version: &str) -> Result<(), RegistryError> {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if *active == version {
            return Ok(());
        }
        if !is_supported(version) {
            return Err(RegistryError::VersionNotAvailable);
        }
        debug!(from = active.as_str(), to = version, "switching platform API version");
        *active = ApiVersion::from(version);
        Ok(())
    }

    /// Resolves `operation` against the active version's table.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::VersionNotAvailable`] when the active version
    /// has no table, or [`RegistryError::EndpointNotAvailable`] when the
    /// operation is unknown.
    pub fn resolve_path(&self, operation: &str) -> Result<&'static str, RegistryError> {
        let version = self.active();
        endpoint_table(&version)?
            .path(operation)
            .ok_or(RegistryError::EndpointNotAvailable)
    }
}
