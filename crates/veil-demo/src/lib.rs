//! veil-demo: scripted transition scenarios over the sim host.
//!
//! Each scenario drives a controller the way a view layer would (render,
//! reconcile mounts, commit, settle) and narrates the class timeline through
//! `tracing`. Scenario and timing come from `veil.toml` / `VEIL_*` variables.

use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use veil_config::VeilConfig;
use veil_transition::{ClassPrefix, SwitchTiming, set_default_safety_timeout};

mod multi_stage;
mod swap;
mod toggle;

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = VeilConfig::load();
    if let Some(ms) = config.engine.safety_timeout_ms {
        set_default_safety_timeout(Duration::from_millis(ms));
    }

    match config.demo.scenario.as_deref() {
        Some("toggle") => toggle::run(&config),
        Some("multi-stage") => multi_stage::run(&config),
        _ => swap::run(&config),
    }
}

fn timing_from(config: &VeilConfig) -> SwitchTiming {
    match config.demo.timing.as_deref() {
        Some("enter-first") => SwitchTiming::EnterFirst,
        Some("exit-first") => SwitchTiming::ExitFirst,
        _ => SwitchTiming::Simultaneous,
    }
}

fn prefix_from(config: &VeilConfig) -> ClassPrefix {
    match &config.engine.class_prefix {
        Some(prefix) => ClassPrefix::Prefix(prefix.clone()),
        None => ClassPrefix::Default,
    }
}
