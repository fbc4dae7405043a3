use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::filter::EventSort;
use crate::wallet::DEFAULT_WALLET_SEED;

/// Settings shared by the project file (`.midan/config.toml`) and the user
/// file (`<config_dir>/midan/config.toml`). Project values win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidanConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the persisted blobs.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Seed of the mock wallet address.
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Sort applied when the location does not name one. Unset keeps the
    /// catalogue order.
    #[serde(default)]
    pub default_sort: Option<String>,
}

impl MidanConfig {
    /// Overlay `other` on top of `self`, field by field.
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        Self {
            output: other.output.or(self.output),
            storage: StorageConfig {
                dir: other.storage.dir.or(self.storage.dir),
            },
            wallet: WalletConfig {
                seed: other.wallet.seed.or(self.wallet.seed),
            },
            events: EventsConfig {
                default_sort: other.events.default_sort.or(self.events.default_sort),
            },
        }
    }

    #[must_use]
    pub fn wallet_seed(&self) -> &str {
        self.wallet.seed.as_deref().unwrap_or(DEFAULT_WALLET_SEED)
    }

    /// The configured default sort; an unknown name counts as unset.
    #[must_use]
    pub fn default_sort(&self) -> Option<EventSort> {
        self.events.default_sort.as_deref()?.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub config: MidanConfig,
    pub resolved_output: String,
    pub data_dir: PathBuf,
}

fn load_file(path: &Path) -> Result<MidanConfig> {
    if !path.exists() {
        return Ok(MidanConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<MidanConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<MidanConfig> {
    load_file(&project_root.join(".midan/config.toml"))
}

/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<MidanConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(MidanConfig::default());
    };
    load_file(&config_dir.join("midan/config.toml"))
}

/// Flags that take part in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub format: Option<String>,
    pub json: bool,
    pub data_dir: Option<PathBuf>,
}

/// # Errors
///
/// Returns an error if either config file cannot be read or parsed.
pub fn resolve_config(project_root: &Path, cli: &CliOverrides) -> Result<EffectiveConfig> {
    let config = load_user_config()?.merged_with(load_project_config(project_root)?);

    let resolved_output = resolve_output(
        cli.format.as_deref(),
        cli.json,
        env::var("FORMAT").ok(),
        config.output.as_deref(),
    );
    let data_dir = resolve_data_dir(
        cli.data_dir.as_deref(),
        env::var_os("MIDAN_DATA_DIR").map(PathBuf::from),
        &config,
    );

    Ok(EffectiveConfig {
        config,
        resolved_output,
        data_dir,
    })
}

/// `--format` > `--json` > `FORMAT` > config `output` > TTY default.
fn resolve_output(
    cli_format: Option<&str>,
    cli_json: bool,
    env_format: Option<String>,
    config_output: Option<&str>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if let Some(mode) = cli_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = config_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

/// `--data-dir` > `MIDAN_DATA_DIR` > config `storage.dir` > platform data dir.
fn resolve_data_dir(
    cli_dir: Option<&Path>,
    env_dir: Option<PathBuf>,
    config: &MidanConfig,
) -> PathBuf {
    if let Some(dir) = cli_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    if let Some(dir) = &config.storage.dir {
        return dir.clone();
    }
    dirs::data_dir().map_or_else(|| PathBuf::from(".midan/data"), |d| d.join("midan"))
}
