//! Per-run log file setup.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// Logs go to `<log_dir>/<YYYYMMDD_HHMMSS>_log.txt` so they never interleave
/// with the terminal screen. When the file cannot be created, logs go to
/// stderr instead. The filter comes from `RUST_LOG` (default `info`).
///
/// # Returns
/// Path of the log file, or `None` when logging to stderr.
pub fn init_logging(log_dir: &Path) -> Option<PathBuf> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match open_run_log(log_dir) {
        Ok((file, path)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            tracing::info!(stage = "logging", action = "file_created", log_file = %path.display());
            Some(path)
        }
        Err(error) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .try_init();
            tracing::warn!(stage = "logging", action = "file_created", %error, "falling back to stderr");
            None
        }
    }
}

/// Compact UTC timestamp used in log file names.
pub fn timestamp_compact_utc(now: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn open_run_log(log_dir: &Path) -> std::io::Result<(File, PathBuf)> {
    std::fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!(
        "{}_log.txt",
        timestamp_compact_utc(OffsetDateTime::now_utc())
    ));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn compact_timestamp_is_sortable() {
        assert_eq!(
            timestamp_compact_utc(datetime!(2025-03-04 05:06:07 UTC)),
            "20250304_050607"
        );
    }
}
