use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Crate configuration: where file-backed stores live and the namespace
/// conventions new stores open with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub separator: String,
    pub nested_marker: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("prefstore-data"),
            separator: ".".to_string(),
            nested_marker: "__".to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from defaults, an optional `prefstore` config
    /// file, and environment variables with prefix "PREFSTORE_".
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&StoreConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("prefstore").required(false));

        // Add environment variables with prefix "PREFSTORE_"
        config =
            config.add_source(config::Environment::with_prefix("PREFSTORE").prefix_separator("_"));

        let config = config.build()?;
        let store_config: StoreConfig = config.try_deserialize()?;

        Ok(store_config)
    }

    /// The file a store of the given name persists to.
    pub fn store_path(&self, store_name: &str) -> PathBuf {
        self.data_dir.join(format!("{store_name}.json"))
    }
}
