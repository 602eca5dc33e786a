//! Process-wide logging for the `burn-session` tool
//!
//! Logs go to the terminal and to a file at
//! `<data local dir>/burn-session/logs/burn-session.log`.
//! Per-session logs are separate; see `BurnSession::session_start`.

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "burn-session.log";

/// Log files larger than this are moved aside on startup
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Get the log directory path
pub fn get_log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("burn-session").join("logs"))
}

/// Get the current log file path
pub fn get_log_file_path() -> Option<PathBuf> {
    get_log_directory().map(|d| d.join(LOG_FILE_NAME))
}

/// Move `path` to `<path>.old` if it exceeds `limit` bytes
///
/// Returns true if the file was rotated.
fn rotate_if_larger(path: &Path, limit: u64) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if metadata.len() <= limit {
        return false;
    }
    let mut backup = path.as_os_str().to_owned();
    backup.push(".old");
    fs::rename(path, PathBuf::from(backup)).is_ok()
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

/// Initialize the logging system
///
/// The terminal shows `terminal_level` and above, the file captures debug
/// and above. Returns the path to the log file on success.
pub fn init_logging(terminal_level: LevelFilter) -> Option<PathBuf> {
    let log_dir = match get_log_directory() {
        Some(d) => d,
        None => {
            eprintln!("Warning: Could not determine log directory");
            init_terminal_only(terminal_level);
            return None;
        }
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_only(terminal_level);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_larger(&log_path, MAX_LOG_BYTES);

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only(terminal_level);
            return None;
        }
    };

    let config = log_config();
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(terminal_level, config.clone(), TerminalMode::Stderr, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Debug, config, log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::debug!("=== burn-session started ===");
    log::debug!("Log file: {}", log_path.display());

    Some(log_path)
}

/// Terminal-only logging, when the log file cannot be used
fn init_terminal_only(terminal_level: LevelFilter) {
    let term_logger = TermLogger::new(
        terminal_level,
        log_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    let _ = CombinedLogger::init(vec![term_logger]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_path_is_inside_log_directory() {
        let dir = get_log_directory().unwrap();
        let file = get_log_file_path().unwrap();

        assert!(file.starts_with(&dir));
        assert!(dir.to_string_lossy().contains("burn-session"));
        assert!(file.to_string_lossy().ends_with(LOG_FILE_NAME));
    }

    #[test]
    fn test_rotate_large_log() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(LOG_FILE_NAME);

        fs::write(&path, vec![b'x'; 100]).unwrap();
        assert!(!rotate_if_larger(&path, 100));
        assert!(path.exists());

        fs::write(&path, vec![b'x'; 101]).unwrap();
        assert!(rotate_if_larger(&path, 100));
        assert!(!path.exists());
        assert!(temp_dir.path().join("burn-session.log.old").exists());
    }

    #[test]
    fn test_rotate_missing_log() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!rotate_if_larger(&temp_dir.path().join("absent.log"), 0));
    }
}
