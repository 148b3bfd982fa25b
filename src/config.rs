//! Runtime configuration
//!
//! Read once from the environment and handed to [`crate::CatalogContext`];
//! resolvers never consult the environment themselves.

use serde::Deserialize;

/// Catalog service configuration
///
/// | Variable | Default |
/// | --- | --- |
/// | `IS_PRODUCTION` | `true` |
/// | `MAX_QUERY_DEPTH` | `15` |
/// | `MAX_QUERY_COMPLEXITY` | `1000` |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Suppresses logging of request arguments and error detail
    #[serde(default = "default_is_production")]
    pub is_production: bool,

    #[serde(default = "default_max_query_depth")]
    pub max_query_depth: Option<usize>,

    #[serde(default = "default_max_query_complexity")]
    pub max_query_complexity: Option<usize>,
}

fn default_is_production() -> bool {
    true
}

fn default_max_query_depth() -> Option<usize> {
    Some(15)
}

fn default_max_query_complexity() -> Option<usize> {
    Some(1000)
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            is_production: default_is_production(),
            max_query_depth: default_max_query_depth(),
            max_query_complexity: default_max_query_complexity(),
        }
    }
}

impl CatalogConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    /// Non-production settings with diagnostic logging enabled
    pub fn development() -> Self {
        Self {
            is_production: false,
            ..Self::default()
        }
    }
}
