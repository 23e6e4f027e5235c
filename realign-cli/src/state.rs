use anyhow::{Context, Result};
use realign_core::CorePlan;
use std::fs;
use std::path::{Path, PathBuf};

pub fn realign_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".realign"))
}

pub fn ensure_realign_home() -> Result<PathBuf> {
    let dir = realign_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn read_plan(path: &Path) -> Result<CorePlan> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse plan {}", path.display()))
}
