use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Installs the global subscriber, appending to `lmsquiz.log` in `dir`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or stderr.
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init(dir: &Path, default_level: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("lmsquiz.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let default: LevelFilter = default_level.parse().unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();

    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    // A second init (tests, embedding) keeps the first subscriber.
    if tracing_subscriber::registry().with(layer).with(filter).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(path)
}
