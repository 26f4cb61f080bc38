//! Client side feature flags.
//!
//! Flags start from built-in defaults, are overridden by the config file and
//! finally by whatever the user toggled, which is persisted in local storage
//! under [`FEATURE_FLAGS_KEY`].

use std::collections::BTreeMap;
use std::sync::Arc;

use pacsweb_config::FeaturesConfig;
use pacsweb_utils::LocalStorage;

use crate::error::{CoreError, CoreResult};

/// Local storage key for persisted flag values
pub const FEATURE_FLAGS_KEY: &str = "FEATURE_FLAGS";

/// Send the token to the exchange rate fetcher as a query parameter
pub const TOKEN_IN_EXCHANGE_FETCHER: &str = "TOKEN_IN_EXCHANGE_FETCHER";

/// Use the v2 exchange rate data endpoint
pub const FETCH_EXCHANGERATE_ENDPOINT_V2: &str = "FETCH_EXCHANGERATE_ENDPOINT_V2";

/// Flags known to the client and their default values
pub fn default_flags() -> BTreeMap<String, bool> {
    BTreeMap::from([
        (TOKEN_IN_EXCHANGE_FETCHER.to_string(), false),
        (FETCH_EXCHANGERATE_ENDPOINT_V2.to_string(), false),
    ])
}

pub struct FeatureFlags {
    defaults: BTreeMap<String, bool>,
    storage: Arc<dyn LocalStorage>,
}

impl FeatureFlags {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            defaults: default_flags(),
            storage,
        }
    }

    /// Defaults overridden by the `features.flags` section of the config
    pub fn from_config(config: &FeaturesConfig, storage: Arc<dyn LocalStorage>) -> Self {
        let mut flags = Self::new(storage);
        flags
            .defaults
            .extend(config.flags.iter().map(|(k, v)| (k.clone(), *v)));
        flags
    }

    fn stored(&self) -> CoreResult<BTreeMap<String, bool>> {
        match self.storage.get_item(FEATURE_FLAGS_KEY)? {
            None => Ok(BTreeMap::new()),
            Some(raw) => serde_json::from_str(&raw).or_else(|e| {
                log::warn!("Ignoring unreadable feature flags in storage: {}", e);
                Ok(BTreeMap::new())
            }),
        }
    }

    fn store(&self, name: &str, value: bool) -> CoreResult<()> {
        let mut stored = self.stored()?;
        stored.insert(name.to_string(), value);
        let raw = serde_json::to_string(&stored).map_err(|e| CoreError::InvalidFormat {
            message: e.to_string(),
        })?;
        self.storage.set_item(FEATURE_FLAGS_KEY, &raw)?;
        Ok(())
    }

    /// Every flag with its effective value
    pub fn all(&self) -> CoreResult<BTreeMap<String, bool>> {
        let mut flags = self.defaults.clone();
        flags.extend(self.stored()?);
        Ok(flags)
    }

    /// Effective value of a flag, unknown flags are inactive
    pub fn is_active(&self, name: &str) -> CoreResult<bool> {
        Ok(self.all()?.get(name).copied().unwrap_or(false))
    }

    pub fn set_active(&self, name: &str) -> CoreResult<()> {
        log::info!("Activating feature flag {}", name);
        self.store(name, true)
    }

    pub fn set_inactive(&self, name: &str) -> CoreResult<()> {
        log::info!("Deactivating feature flag {}", name);
        self.store(name, false)
    }

    /// Drops persisted overrides, going back to the defaults
    pub fn reset(&self) -> CoreResult<()> {
        self.storage.remove_item(FEATURE_FLAGS_KEY)?;
        Ok(())
    }
}
