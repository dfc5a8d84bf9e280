use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use quotaboard_core::layout::DEFAULT_MAX_COLUMNS;
use quotaboard_core::{OverrideRegistry, ProviderDisplay};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Terminal dashboard for provider usage, cost and quotas"
)]
pub struct Config {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot document (JSON), re-read on every refresh
    #[arg(short, long, global = true)]
    pub snapshots: Option<PathBuf>,

    /// Refresh interval in milliseconds
    #[arg(short, long, global = true)]
    pub refresh_ms: Option<u64>,

    /// Only show accounts whose account or provider id contains this text
    #[arg(short, long, global = true)]
    pub filter: Option<String>,

    /// Maximum number of tile columns
    #[arg(long, global = true)]
    pub columns: Option<usize>,

    /// Disable colors
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print a single frame to stdout and exit
    Render {
        /// Frame width in columns
        #[arg(long, default_value_t = 120)]
        width: usize,
        /// Frame height in lines
        #[arg(long, default_value_t = 40)]
        height: usize,
        /// Render the analytics report instead of the tiles
        #[arg(long)]
        analytics: bool,
    },
    /// Run with generated demo accounts (no snapshot file needed)
    Demo,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// View shown when the dashboard starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartView {
    #[default]
    Tiles,
    Analytics,
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Refresh interval in milliseconds
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    /// Snapshot document to watch
    #[serde(default)]
    pub snapshots: Option<PathBuf>,

    /// Account/provider filter applied on start
    #[serde(default)]
    pub filter: String,

    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,

    /// Provider display overrides, merged over the built-in ones
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderDisplay>,
}

fn default_refresh_ms() -> u64 {
    2000
}

/// UI-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Enable color output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Maximum number of tile columns
    #[serde(default = "default_max_columns")]
    pub max_columns: usize,

    #[serde(default)]
    pub start_view: StartView,
}

fn default_color() -> bool {
    true
}

fn default_max_columns() -> usize {
    DEFAULT_MAX_COLUMNS
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            color: default_color(),
            max_columns: default_max_columns(),
            start_view: StartView::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
            snapshots: None,
            filter: String::new(),
            ui: UiSettings::default(),
            providers: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must exist
        if let Some(p) = path {
            if !p.exists() {
                bail!("Config file not found: {:?}", p);
            }
            return Self::load_from(p);
        }

        for path in Self::default_paths().iter() {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    /// Config locations searched when no path is given, in order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("quotaboard/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/quotaboard/config.toml")),
            dirs::home_dir().map(|p| p.join(".quotaboard.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(refresh_ms) = cli.refresh_ms {
            self.refresh_ms = refresh_ms;
        }
        if let Some(snapshots) = &cli.snapshots {
            self.snapshots = Some(snapshots.clone());
        }
        if let Some(filter) = &cli.filter {
            self.filter = filter.clone();
        }
        if let Some(columns) = cli.columns {
            self.ui.max_columns = columns;
        }
        if cli.no_color {
            self.ui.color = false;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Clamps the refresh interval and the column limit to usable ranges.
    pub fn validate(&mut self) {
        const MIN_REFRESH_MS: u64 = 100;
        const MAX_REFRESH_MS: u64 = 3_600_000;
        const MAX_COLUMNS: usize = 8;

        self.refresh_ms = self.refresh_ms.clamp(MIN_REFRESH_MS, MAX_REFRESH_MS);
        self.ui.max_columns = self.ui.max_columns.clamp(1, MAX_COLUMNS);
        self.filter = self.filter.trim().to_string();
    }

    /// Built-in display overrides with the configured providers merged on top
    pub fn registry(&self) -> Result<OverrideRegistry> {
        OverrideRegistry::builtin()
            .with_overrides(self.providers.clone())
            .context("Invalid provider display overrides")
    }
}
