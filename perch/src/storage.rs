use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use perch_sections::{SectionStorage, SectionsError};
use serde_json::Value;

pub(crate) const SETTINGS_FILE: &str = "settings.json";
pub(crate) const SECTIONS_FILE: &str = "sections.json";

/// `~/.config/perch`, or a directory under the system temp dir when `HOME`
/// is not set.
pub(crate) fn default_config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return Path::new(&home).join(".config").join("perch");
    }

    std::env::temp_dir().join("perch")
}

/// Sections persisted as a JSON array in a single file.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl SectionStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Value>, SectionsError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            },
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<Vec<Value>>(&data) {
            Ok(records) => Ok(records),
            Err(err) => {
                log::warn!(
                    "ignoring unreadable sections file {}: {err}",
                    self.path.display()
                );
                Ok(Vec::new())
            },
        }
    }

    fn save(&self, records: &[Value]) -> Result<(), SectionsError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let payload = serde_json::to_string_pretty(records)?;
        write_atomic(&self.path, payload.as_bytes())?;
        Ok(())
    }
}

/// Write through a sibling temp file so readers never see a partial file.
pub(crate) fn write_atomic(path: &Path, payload: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, payload)?;
    fs::rename(tmp_path, path)
}
