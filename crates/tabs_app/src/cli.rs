use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tabs_core::Key;

use crate::config::{AppConfig, LogTarget};

/// Boot the product tab widgets of a saved storefront page, fetch their
/// recommendations, replay interactions and write out the result.
#[derive(Debug, Parser)]
#[command(name = "tabs_app", version, about)]
pub struct Cli {
    /// Page markup to load.
    pub input: PathBuf,

    /// RON config file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Origin for root-relative recommendation URLs.
    #[arg(long, value_name = "URL")]
    pub origin: Option<String>,

    /// Write the resulting markup here.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Click the element with this id once widgets are visible. Repeatable.
    #[arg(long = "click", value_name = "ID")]
    pub clicks: Vec<String>,

    /// Press an arrow key on the focused tab, after all clicks. Repeatable.
    #[arg(long = "key", value_enum, value_name = "DIR")]
    pub keys: Vec<ArrowKey>,

    /// Upper bound on waiting for fetches, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub wait_ms: Option<u64>,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArrowKey {
    Left,
    Right,
}

impl From<ArrowKey> for Key {
    fn from(key: ArrowKey) -> Self {
        match key {
            ArrowKey::Left => Key::ArrowLeft,
            ArrowKey::Right => Key::ArrowRight,
        }
    }
}

impl Cli {
    /// Flags win over the config file.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(origin) = &self.origin {
            config.origin = Some(origin.clone());
        }
        if let Some(wait_ms) = self.wait_ms {
            config.settle_wait_ms = wait_ms;
        }
        if let Some(target) = self.log {
            config.log.target = target;
        }
    }
}
