use anyhow::{Context, Result};
use rps_core::LedgerConfig;
use rps_game::GameConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub game: GameConfig,
}

impl CliConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Read `config.json` from `data_dir`, writing the defaults on first run.
    pub async fn load_or_create(data_dir: &Path) -> Result<Self> {
        let path = Self::path(data_dir);

        let config = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            let config = Self::default();
            tokio::fs::write(&path, serde_json::to_string_pretty(&config)?).await?;
            tracing::info!("Wrote default config to {}", path.display());
            config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.ledger.validate()?;
        self.game.validate()?;
        Ok(())
    }
}
