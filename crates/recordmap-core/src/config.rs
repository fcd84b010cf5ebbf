//! Client configuration
//!
//! Session-wide switches layered over the per-kind settings of each
//! [`ModelDef`](crate::ModelDef). Loadable from RON through
//! `recordmap-script`.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Client`](crate::Client)
///
/// # Example
///
/// ```
/// use recordmap_core::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert!(config.identity_map());
///
/// let config = ClientConfig::default().with_identity_map(false);
/// assert!(!config.identity_map());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Route cached kinds through the identity map
    ///
    /// When `false`, every kind behaves as if it had opted out.
    #[serde(default = "default_identity_map")]
    identity_map: bool,
    /// Treat every kind as strict: undeclared payload fields are dropped
    #[serde(default)]
    strict_attributes: bool,
}

fn default_identity_map() -> bool {
    true
}

impl ClientConfig {
    /// Whether identity-mapped kinds are cached
    pub fn identity_map(&self) -> bool {
        self.identity_map
    }

    /// Whether undeclared payload fields are dropped for every kind
    pub fn strict_attributes(&self) -> bool {
        self.strict_attributes
    }

    /// Enable or disable the identity map for the whole session
    pub fn with_identity_map(mut self, enabled: bool) -> Self {
        self.identity_map = enabled;
        self
    }

    /// Drop undeclared fields for every kind
    pub fn with_strict_attributes(mut self, strict: bool) -> Self {
        self.strict_attributes = strict;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            identity_map: true,
            strict_attributes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.identity_map());
        assert!(!config.strict_attributes());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::default()
            .with_identity_map(false)
            .with_strict_attributes(true);
        assert!(!config.identity_map());
        assert!(config.strict_attributes());
    }
}
