//! Catalog configuration loading with environment variable overrides.
//!
//! The configuration is read from a TOML file with [Figment]. `CATALOG_CONFIG_*` environment
//! variables are merged on top and always win; double underscores separate nested keys. Every
//! key has a default, so a missing file yields the default configuration.

use std::path::Path;

use bundle_identity::{BundleIdentity, PartitionFormat};
use figment::{
    Figment,
    providers::{Env, Format as _, Toml},
};
use object_number::{AssignmentClass, DatasetNumber};
use partition_store::{PartitionRecordStore, Partitions, TableResolver};

/// Prefix of environment variables that override file values
pub const ENV_PREFIX: &str = "CATALOG_CONFIG_";

/// Load a [`CatalogConfig`] from a TOML file with env-var overrides.
#[tracing::instrument(err)]
pub fn load(config_path: &Path) -> Result<CatalogConfig, LoadConfigError> {
    Figment::new()
        .merge(Toml::file(config_path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|err| LoadConfigError(Box::new(err)))
}

/// Catalog configuration as deserialized from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct CatalogConfig {
    /// Class of newly generated dataset numbers (default: `self`)
    #[serde(default)]
    pub assignment_class: AssignmentClass,
    /// Format of partitions created without one (default: `db`)
    #[serde(default)]
    pub default_format: PartitionFormat,
    /// Log filter directive for the catalog crates, e.g. `debug`
    #[serde(default)]
    pub log: Option<String>,
}

impl CatalogConfig {
    /// Draw a new dataset number in the configured assignment class.
    pub fn new_dataset_number(&self) -> DatasetNumber {
        DatasetNumber::generate(self.assignment_class)
    }

    /// Initialize logging, with `log` as the level of the catalog crates unless `CATALOG_LOG`
    /// is set.
    pub fn init_logging(&self) {
        monitoring::logging::init_with_default_level(self.log.as_deref());
    }

    /// The partitions of `bundle`, created in `default_format` unless a request names one.
    pub fn partitions<S, R>(&self, bundle: BundleIdentity, store: S, tables: R) -> Partitions<S, R>
    where
        S: PartitionRecordStore,
        R: TableResolver,
    {
        Partitions::new(bundle, store, tables).with_default_format(self.default_format)
    }
}

/// Error when loading configuration from a TOML file.
#[derive(Debug, thiserror::Error)]
#[error("Failed to load configuration file")]
pub struct LoadConfigError(#[source] pub Box<figment::Error>);
