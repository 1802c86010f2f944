//! `leasehub config` – show where the config lives and what is in effect.

use anyhow::Result;
use leasehub_core::config::{self, LeasehubConfig};
use leasehub_core::logging;

pub fn run_config(cfg: &LeasehubConfig) -> Result<()> {
    println!("config file: {}", config::config_path()?.display());
    if let Ok(path) = logging::log_path() {
        println!("log file:    {}", path.display());
    }
    println!();
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
