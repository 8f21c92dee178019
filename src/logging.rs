use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Where diagnostic log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Non-interactive commands log to stderr
    Stderr,
    /// The TUI owns the terminal, so it logs to a file
    File(PathBuf),
}

/// Level used when neither `RUST_LOG` nor `-v` says otherwise
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the `log` facade.
///
/// `RUST_LOG` filters are honoured (`RUST_LOG=gitpanel=trace`); `-v` raises
/// the default to debug. Calling this twice is harmless.
pub fn init_logger(target: LogTarget, verbose: bool) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level(verbose));

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{:5}] {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    match target {
        LogTarget::Stderr => {
            builder.target(env_logger::Target::Stderr);
        }
        LogTarget::File(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    // Already initialized in tests or on re-entry
    builder.try_init().ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), LevelFilter::Info);
        assert_eq!(default_level(true), LevelFilter::Debug);
    }

    #[test]
    fn test_file_target_creates_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("gitpanel.log");

        init_logger(LogTarget::File(path.clone()), false).unwrap();
        assert!(path.exists());
    }
}
