//! Layered configuration loading
//!
//! Priority (lowest to highest): serialized defaults → YAML file → environment.
//! Environment keys are prefixed and use `__` for nesting, e.g.
//! `CALCSRV_SERVICE__PORT=7000` sets `service.port`.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Build the figment for `T` without extracting it
fn figment_for<T>(file: Option<&Path>, env_prefix: &str) -> Figment
where
    T: Serialize + Default,
{
    let mut figment = Figment::new().merge(Serialized::defaults(T::default()));

    if let Some(path) = file {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
        } else {
            debug!("Configuration file {} not found, skipping", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment.merge(Env::prefixed(env_prefix).split("__"))
}

/// Load configuration of type `T`
pub fn load_config<T>(file: Option<&Path>, env_prefix: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    Ok(figment_for::<T>(file, env_prefix).extract()?)
}
