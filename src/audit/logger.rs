use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::git::PipelineReport;

const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;

/// Append-only history of every git step the panel executed.
///
/// One line per step: `[time] [user] [repo] [pipeline] [exit:N] git ...`.
/// Steps skipped after an abort are recorded as `[skipped]`.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// History at `~/.config/gitpanel/history.log`
    pub fn new() -> io::Result<Self> {
        let dir = Config::config_dir().map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))?;
        Self::with_path(dir.join("history.log"))
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { log_path })
    }

    /// Append every step of a finished pipeline
    pub fn record(&self, repo_path: &Path, report: &PipelineReport) -> io::Result<()> {
        self.rotate_if_needed()?;

        let prefix = format!(
            "[{}] [{}] [{}] [{}]",
            Utc::now().to_rfc3339(),
            std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            repo_path.display(),
            report.name
        );

        let mut entries = String::new();
        for outcome in &report.outcomes {
            entries.push_str(&format!(
                "{} [exit:{}] {}\n",
                prefix, outcome.output.exit_code, outcome.command
            ));
        }
        for command in &report.skipped {
            entries.push_str(&format!("{} [skipped] {}\n", prefix, command));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(entries.as_bytes())?;
        file.flush()
    }

    /// Move a full history aside to `history.log.1`, replacing an older backup
    fn rotate_if_needed(&self) -> io::Result<()> {
        match fs::metadata(&self.log_path) {
            Ok(meta) if meta.len() > ROTATE_AT_BYTES => {
                fs::rename(&self.log_path, self.log_path.with_extension("log.1"))
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
