use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::{Error, Result};

const TEMP_FILE_SUFFIX: &str = ".tmp";

// Read/write access to the single durable record holding the prize pool.
pub trait RecordStore: Send + Sync {
    // Returns None when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;

    // Replaces the stored record.
    fn write(&self, contents: &str) -> Result<()>;
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.path.display(), TEMP_FILE_SUFFIX))
    }
}

impl RecordStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == IoErrorKind::NotFound => {
                debug!("No prize data at {}", self.path.display());
                Ok(None)
            }
            Err(err) => Err(Error::from(err)),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

// Keeps the record in memory. Can be switched into a failing mode to
// simulate a broken disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        MemoryStore {
            contents: Mutex::new(Some(contents.to_string())),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl RecordStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents.lock()?.clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            let message = "The memory store is in failing mode.".to_string();
            return Err(Error::PersistenceFailure(message));
        }

        *self.contents.lock()? = Some(contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::process;

    use crate::error::Error;
    use crate::persistence::{JsonFileStore, MemoryStore, RecordStore};

    #[test]
    fn test_file_store_returns_none_for_missing_file() {
        let path = env::temp_dir().join(format!("prize-draw-missing-{}.json", process::id()));
        let store = JsonFileStore::new(&path);

        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn test_file_store_write_then_read() {
        let dir = env::temp_dir().join(format!("prize-draw-store-{}", process::id()));
        let path = dir.join("nested").join("prizes_data.json");
        let store = JsonFileStore::new(&path);

        store.write("{}").unwrap();
        store.write("{\"A\": {\"participants\": [], \"winners\": 1}}").unwrap();

        assert_eq!(
            store.read().unwrap(),
            Some("{\"A\": {\"participants\": [], \"winners\": 1}}".to_string())
        );
        assert_eq!(store.temp_path().exists(), false);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_memory_store_failing_mode() {
        let store = MemoryStore::with_contents("{}");
        store.set_failing(true);

        let result = store.write("[]");
        assert_eq!(
            result.unwrap_err(),
            Error::PersistenceFailure("The memory store is in failing mode.".to_string())
        );
        assert_eq!(store.read().unwrap(), Some("{}".to_string()));
    }
}
