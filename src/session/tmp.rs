//! Scratch files and the session log
//!
//! Scratch paths handed out by a session are registered and removed,
//! recursively, when the session is dropped. So is a session log the
//! session created itself; a log at a path given by the caller is kept.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

use super::BurnSession;
use crate::core::{default_image_suffix, format_flags, format_media, get_toc_path, ImageFormat, SessionError};

const TMP_PREFIX: &str = "burn-session-";

/// Create a kept temporary file in `dir`
fn create_tmp_file(dir: &Path, suffix: &str) -> Result<(File, PathBuf), SessionError> {
    let file = Builder::new()
        .prefix(TMP_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| SessionError::from_io(dir, &e))?;
    file.keep().map_err(|e| SessionError::from_io(dir, &e.error))
}

impl BurnSession {
    /// Directory for scratch files; `None` means the system default
    pub fn set_tmpdir(&mut self, tmpdir: Option<PathBuf>) -> Result<(), SessionError> {
        if let Some(dir) = &tmpdir {
            if !dir.is_absolute() {
                return Err(SessionError::RelativeTmpDir(dir.clone()));
            }
        }
        self.tmpdir = tmpdir;
        Ok(())
    }

    pub fn get_tmpdir(&self) -> Option<&Path> {
        self.tmpdir.as_deref()
    }

    fn scratch_dir(&self) -> PathBuf {
        self.tmpdir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn register_tmp_path(&mut self, path: PathBuf) {
        log::debug!("Registered scratch path {}", path.display());
        self.tmp_paths.push(path);
    }

    /// Paths removed when the session is dropped
    pub fn tmp_paths(&self) -> &[PathBuf] {
        &self.tmp_paths
    }

    /// Create an empty scratch file
    pub fn get_tmp_file(&mut self, suffix: Option<&str>) -> Result<PathBuf, SessionError> {
        let (_, path) = create_tmp_file(&self.scratch_dir(), suffix.unwrap_or(""))?;
        self.register_tmp_path(path.clone());
        Ok(path)
    }

    /// Create an empty scratch directory
    pub fn get_tmp_dir(&mut self) -> Result<PathBuf, SessionError> {
        let parent = self.scratch_dir();
        let dir = Builder::new()
            .prefix(TMP_PREFIX)
            .tempdir_in(&parent)
            .map_err(|e| SessionError::from_io(&parent, &e))?;
        let path = dir.keep();
        self.register_tmp_path(path.clone());
        Ok(path)
    }

    /// Reserve a scratch image, plus its toc path for formats that have one
    ///
    /// The toc is not created, only registered for removal.
    pub fn get_tmp_image(&mut self, format: ImageFormat) -> Result<(PathBuf, Option<PathBuf>), SessionError> {
        let image = self.get_tmp_file(Some(default_image_suffix(format)))?;
        let toc = get_toc_path(format, &image);
        if let Some(toc) = &toc {
            self.register_tmp_path(toc.clone());
        }
        Ok((image, toc))
    }

    pub(super) fn remove_tmp_paths(&mut self) {
        for path in self.tmp_paths.drain(..) {
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => log::debug!("Removed scratch path {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }

    /// Use `path` for the next session log instead of a temporary file
    pub fn set_log_path(&mut self, path: Option<PathBuf>) {
        self.log_path = path;
    }

    pub fn get_log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    fn open_log(&mut self) -> Result<File, SessionError> {
        if let Some(path) = &self.log_path {
            return OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| SessionError::from_io(path, &e));
        }

        let (file, path) = match create_tmp_file(&self.scratch_dir(), ".log") {
            Ok(created) => created,
            Err(e) => {
                log::warn!("Session log falls back to the system temp directory: {}", e);
                create_tmp_file(&std::env::temp_dir(), ".log")?
            }
        };
        self.register_tmp_path(path.clone());
        self.log_path = Some(path);
        Ok(file)
    }

    /// Open the session log and write a snapshot of the session
    pub fn session_start(&mut self) -> Result<(), SessionError> {
        self.session_stop();
        let file = self.open_log()?;
        self.session_log = Some(file);

        if let Some(path) = &self.log_path {
            log::info!("Session log: {}", path.display());
        }

        self.log(format!("Session started {}", chrono::Local::now().to_rfc3339()));
        self.log(format!("Session input type: {}", self.get_input_type()));
        self.log(format!("Session flags: {}", format_flags(self.get_flags())));

        if self.is_dest_file() {
            self.log(format!(
                "Output format: {}",
                self.get_output_format().display_text()
            ));
            if let Ok((image, toc)) = self.get_output() {
                self.log(format!("Image: {}", image.display()));
                if let Some(toc) = toc {
                    self.log(format!("Toc: {}", toc.display()));
                }
            }
        } else {
            self.log(format!("Media type: {}", format_media(self.get_dest_media())));
            self.log(format!("Speed: {} bytes/s", self.get_rate()));
            self.log(format!("Number of copies: {}", self.get_num_copies()));
        }
        Ok(())
    }

    /// Close the session log
    pub fn session_stop(&mut self) {
        if let Some(mut file) = self.session_log.take() {
            if let Err(e) = file.flush() {
                log::warn!("Failed to flush session log: {}", e);
            }
        }
    }

    /// Append a line to the session log
    ///
    /// Text after the first invalid UTF-8 sequence is dropped. Does nothing
    /// when the log is closed or the message is empty.
    pub fn log(&mut self, message: impl AsRef<[u8]>) {
        let Some(file) = self.session_log.as_mut() else {
            return;
        };

        let bytes = message.as_ref();
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
        };
        if text.is_empty() {
            return;
        }

        log::debug!("[session] {}", text);
        if let Err(e) = writeln!(file, "{}", text) {
            log::warn!("Failed to write session log: {}", e);
        }
    }
}
