//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: RESOURCE_ACTIONS_, nested keys separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/resource-actions/{service_name}/config.toml
//! 4. System directory: /etc/resource-actions/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

const ENV_PREFIX: &str = "RESOURCE_ACTIONS_";
const CONFIG_DIR_PREFIX: &str = "resource-actions";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Request and document field naming used by the CRUD actions
    #[serde(default)]
    pub conventions: Conventions,
}

/// Service-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

/// Request field names the built-in CRUD actions read their inputs from
///
/// Document-side names (identifier and last-updated fields) belong to the
/// bound store; see [`DocumentStore::id_field`](crate::store::DocumentStore::id_field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conventions {
    /// Payload field holding a full document (create)
    #[serde(default = "default_document_field")]
    pub document_field: String,

    /// Payload field holding a filter expression (read)
    #[serde(default = "default_filter_field")]
    pub filter_field: String,

    /// Payload field holding a partial document (update)
    #[serde(default = "default_patch_field")]
    pub patch_field: String,

    /// Path parameter holding the target identifier (update, delete)
    #[serde(default = "default_id_param")]
    pub id_param: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            document_field: default_document_field(),
            filter_field: default_filter_field(),
            patch_field: default_patch_field(),
            id_param: default_id_param(),
        }
    }
}

fn default_service_name() -> String {
    "resource-actions".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_document_field() -> String {
    "document".to_string()
}

fn default_filter_field() -> String {
    "filter".to_string()
}

fn default_patch_field() -> String {
    "partialDocument".to_string()
}

fn default_id_param() -> String {
    "id".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(default_service_name);

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // lowest priority first so later merges win
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Bypasses the search path; environment variables still override.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Candidate config file paths, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(CONFIG_DIR_PREFIX)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.name, "resource-actions");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.conventions.document_field, "document");
        assert_eq!(config.conventions.filter_field, "filter");
        assert_eq!(config.conventions.patch_field, "partialDocument");
        assert_eq!(config.conventions.id_param, "id");
    }

    // Loader tests run inside `figment::Jail`, which serializes them and
    // restores the working directory and environment afterwards.

    #[test]
    fn test_load_from_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "posts.toml",
                r#"
[service]
name = "posts-api"

[conventions]
patch_field = "patch"
"#,
            )?;

            let config = Config::load_from("posts.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.service.name, "posts-api");
            assert_eq!(config.service.log_level, "info");
            assert_eq!(config.conventions.patch_field, "patch");
            assert_eq!(config.conventions.document_field, "document");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("posts.toml", "[conventions]\npatch_field = \"patch\"\n")?;
            jail.set_env("RESOURCE_ACTIONS_CONVENTIONS__PATCH_FIELD", "delta");
            jail.set_env("RESOURCE_ACTIONS_SERVICE__LOG_LEVEL", "debug");

            let config = Config::load_from("posts.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.conventions.patch_field, "delta");
            assert_eq!(config.service.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_load_for_service_search_order() {
        Jail::expect_with(|jail| {
            let xdg_home = jail.directory().join("xdg");
            jail.create_dir("xdg/resource-actions/posts-api")?;
            jail.create_file(
                "xdg/resource-actions/posts-api/config.toml",
                "[conventions]\npatch_field = \"from-xdg\"\nfilter_field = \"where\"\n",
            )?;
            jail.create_file("config.toml", "[conventions]\npatch_field = \"from-cwd\"\n")?;
            jail.set_env("XDG_CONFIG_HOME", xdg_home.display());

            let config = Config::load_for_service("posts-api").map_err(|e| e.to_string())?;
            assert_eq!(config.conventions.patch_field, "from-cwd");
            assert_eq!(config.conventions.filter_field, "where");

            jail.set_env("RESOURCE_ACTIONS_CONVENTIONS__PATCH_FIELD", "from-env");
            let config = Config::load_for_service("posts-api").map_err(|e| e.to_string())?;
            assert_eq!(config.conventions.patch_field, "from-env");
            assert_eq!(config.conventions.filter_field, "where");
            Ok(())
        });
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from("absent.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.conventions, Conventions::default());
            Ok(())
        });
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file("broken.toml", "[service\nname = ")?;

            let err = Config::load_from("broken.toml").unwrap_err();
            assert!(matches!(err, crate::error::Error::Config(_)));
            Ok(())
        });
    }
}
