use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::io::Write;

/// Installs the process-wide logger.
///
/// The default filter is `info` (`debug` with `verbose`), and `RUST_LOG`
/// still overrides it. When `log_file` is given, records are appended to
/// that file instead of stderr.
///
/// # Arguments
///
/// * `verbose` - Raise the default filter to `debug`.
/// * `log_file` - Optional host path of the log file.
///
/// # Returns
///
/// Result<(), anyhow::Error> if the log file cannot be opened.
pub fn init(verbose: bool, log_file: Option<&str>) -> Result<()> {
    let default_filter = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));

    builder.format(|buf, record| {
        let timestamp = buf.timestamp();
        writeln!(
            buf,
            "[{}] [{}] {}",
            timestamp,
            record.level(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .context("Failed to install the logger")?;
    Ok(())
}
