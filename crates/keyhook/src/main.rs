//! keyhook: print configured messages on system-wide key and mouse presses.
//!
//! Installs low-level keyboard and mouse hooks, runs the message loop on the
//! main thread, and writes the message of every configured binding that
//! fires to stdout. Without a config file the demonstration bindings are
//! used (Ctrl + A, K and the right mouse button).
//!
//! # Usage
//!
//! ```text
//! keyhook [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Config file [default: platform config dir]
//!   --no-keyboard         Do not install the keyboard hook
//!   --no-mouse            Do not install the mouse hook
//!   --log-level <FILTER>  tracing filter, e.g. `debug` [env: KEYHOOK_LOG]
//! ```
//!
//! `RUST_LOG` overrides both `--log-level` and the config's `[logging]` level.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use keyhook::infrastructure::storage::config::{self, HookConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// System-wide keyboard and mouse hook listener.
#[derive(Debug, Parser)]
#[command(
    name = "keyhook",
    about = "Prints configured messages on system-wide key and mouse presses",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, env = "KEYHOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Skip the keyboard hook even if the config enables it.
    #[arg(long)]
    no_keyboard: bool,

    /// Skip the mouse hook even if the config enables it.
    #[arg(long)]
    no_mouse: bool,

    /// Log filter directive; falls back to the config's `[logging] level`.
    #[arg(long, env = "KEYHOOK_LOG")]
    log_level: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = match cli.config.clone() {
        Some(path) => path,
        None => config::config_file_path().context("could not locate a config file; pass --config")?,
    };
    let cfg = config::load_config_from(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| cfg.logging.level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    info!(config = %path.display(), bindings = cfg.bindings.len(), "keyhook starting");
    if cfg.bindings.is_empty() {
        warn!("no bindings configured; events are received but nothing is printed");
    }

    let keyboard = cfg.hooks.keyboard && !cli.no_keyboard;
    let mouse = cfg.hooks.mouse && !cli.no_mouse;
    run(cfg, keyboard, mouse)
}

#[cfg(target_os = "windows")]
fn run(cfg: HookConfig, keyboard: bool, mouse: bool) -> anyhow::Result<()> {
    use keyhook::application::bindings::BindingHandler;
    use keyhook::infrastructure::hook::windows::WindowsHookBackend;
    use keyhook::infrastructure::lifecycle;
    use keyhook::HookSession;

    let mut session = HookSession::new(WindowsHookBackend::new());
    session.set_handler(BindingHandler::new(cfg.bindings, std::io::stdout()));
    session
        .install_kinds(keyboard, mouse)
        .context("failed to install low-level hooks")?;

    let _exit_hook = lifecycle::register_exit_hook(session.quit_handle());

    info!("keyhook ready.  Press Ctrl-C to exit.");
    let exit = session.run().context("hook message loop failed")?;

    info!(?exit, stats = ?session.stats(), "keyhook stopped");
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run(_cfg: HookConfig, _keyboard: bool, _mouse: bool) -> anyhow::Result<()> {
    anyhow::bail!("low-level keyboard and mouse hooks are only supported on Windows")
}
