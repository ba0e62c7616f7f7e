//! Serialization policy for a [`SerializerRegistry`](crate::SerializerRegistry).

use serde::{Deserialize, Serialize};

/// Policy applied by every peek that goes through a registry.
///
/// The default allows conversion through serialization only where a peek
/// asks for it with [`PeekFlags::allow_serialization`](crate::PeekFlags::allow_serialization),
/// or where the source data is plain bytes.
///
/// # Examples
///
/// ```
/// use wirechunk::RegistryConfig;
///
/// let config = RegistryConfig::default().with_implicit_serialization(true);
/// assert!(config.implicit_serialization);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Permit every typed peek to convert structured data by serializing
    /// and re-parsing it.
    pub implicit_serialization: bool,
}

impl RegistryConfig {
    /// Return a copy with implicit serialization set to `enabled`.
    #[must_use]
    pub const fn with_implicit_serialization(mut self, enabled: bool) -> Self {
        self.implicit_serialization = enabled;
        self
    }
}
