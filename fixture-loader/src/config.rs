use std::path::PathBuf;

use shared::config::{env_or, env_parse, ConfigResult};
use shared::database::DatabaseConfig;

use crate::reconcile::MissingKeyPolicy;

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub seed_dir: PathBuf,
    pub on_missing_key: MissingKeyPolicy,
    pub database: DatabaseConfig,
}

impl LoaderConfig {
    /// `SEED_DIR` (default `seeds`), `SEED_ON_MISSING_KEY` (default
    /// `insertOnly`) and the database settings.
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            seed_dir: PathBuf::from(env_or("SEED_DIR", "seeds")),
            on_missing_key: env_parse("SEED_ON_MISSING_KEY", MissingKeyPolicy::default())?,
            database: DatabaseConfig::from_env()?,
        })
    }
}
