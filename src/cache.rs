use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Log written while the TUI owns the terminal
pub const LOG_FILE: &str = "materiality.log";

/// Registry of known cache files
const CACHE_FILES: &[&str] = &[LOG_FILE];

/// Manages cache directory and cache file operations
#[derive(Clone)]
pub struct CacheManager {
    pub(crate) cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a new CacheManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| eyre!("Could not determine cache directory"))?
            .join(app_name);

        Ok(Self { cache_dir })
    }

    /// Create a CacheManager rooted at `cache_dir` (for testing)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get path to a specific cache file
    pub fn cache_file(&self, filename: &str) -> PathBuf {
        self.cache_dir.join(filename)
    }

    /// Ensure the cache directory exists
    pub fn ensure_cache_dir(&self) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    /// Open the log file for appending, creating the directory if needed
    pub fn open_log(&self) -> Result<File> {
        self.ensure_cache_dir()?;
        let path = self.cache_file(LOG_FILE);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| eyre!("Could not open log file {}: {}", path.display(), e))
    }

    /// Clear a specific cache file
    pub fn clear_file(&self, filename: &str) -> Result<()> {
        let file_path = self.cache_file(filename);
        if file_path.exists() {
            fs::remove_file(&file_path)?;
        }
        Ok(())
    }

    /// Clear all registered cache files
    pub fn clear_all(&self) -> Result<()> {
        for filename in CACHE_FILES {
            let file_path = self.cache_file(filename);
            if file_path.exists() {
                if let Err(e) = fs::remove_file(&file_path) {
                    eprintln!("Warning: Could not remove cache file {}: {}", filename, e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_open_log_creates_dir_and_appends() {
        let temp = TempDir::new().unwrap();
        let cache = CacheManager::with_dir(temp.path().join("nested"));
        writeln!(cache.open_log().unwrap(), "first").unwrap();
        writeln!(cache.open_log().unwrap(), "second").unwrap();
        let text = fs::read_to_string(cache.cache_file(LOG_FILE)).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }

    #[test]
    fn test_clear_all_removes_log() {
        let temp = TempDir::new().unwrap();
        let cache = CacheManager::with_dir(temp.path().to_path_buf());
        cache.open_log().unwrap();
        assert!(cache.cache_file(LOG_FILE).exists());
        cache.clear_all().unwrap();
        assert!(!cache.cache_file(LOG_FILE).exists());
        // Clearing again is a no-op
        cache.clear_all().unwrap();
    }
}
