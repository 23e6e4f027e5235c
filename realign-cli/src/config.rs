use anyhow::{Context, Result};
use realign_core::{ComputeOptions, DisplayZone, LightPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_realign_home;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplaySection,
    pub light: LightSection,
    pub limits: LimitsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisplaySection {
    /// "target" or "home"
    pub zone: DisplayZone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSection {
    pub wake_offset_minutes: i64,
    pub pre_sleep_buffer_minutes: i64,
    pub fallback_offset_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_range_days: i64,
}

impl Default for LightSection {
    fn default() -> Self {
        let policy = LightPolicy::default();
        Self {
            wake_offset_minutes: policy.wake_offset_minutes,
            pre_sleep_buffer_minutes: policy.pre_sleep_buffer_minutes,
            fallback_offset_minutes: policy.fallback_offset_minutes,
        }
    }
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_range_days: ComputeOptions::default().max_range_days,
        }
    }
}

impl Config {
    /// Engine options from config, with an optional display override from the CLI.
    pub fn compute_options(&self, display: Option<DisplayZone>) -> ComputeOptions {
        ComputeOptions {
            display: display.unwrap_or(self.display.zone),
            light: LightPolicy {
                wake_offset_minutes: self.light.wake_offset_minutes,
                pre_sleep_buffer_minutes: self.light.pre_sleep_buffer_minutes,
                fallback_offset_minutes: self.light.fallback_offset_minutes,
            },
            max_range_days: self.limits.max_range_days,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_realign_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
