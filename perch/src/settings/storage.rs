use std::fs;
use std::path::Path;

use super::errors::SettingsError;
use super::model::SettingsData;

/// How `settings.json` was resolved.
#[derive(Debug, Clone)]
pub(crate) enum SettingsLoadStatus {
    Loaded,
    Missing,
    Invalid(String),
}

/// Read settings, falling back to defaults when the file is absent or not
/// valid JSON. Only IO failures other than "not found" are errors.
pub(crate) fn load_settings_from_path(
    path: &Path,
) -> Result<(SettingsData, SettingsLoadStatus), SettingsError> {
    let data = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok((SettingsData::default(), SettingsLoadStatus::Missing));
        },
        Err(err) => return Err(SettingsError::io(path, err)),
    };

    match serde_json::from_str::<serde_json::Value>(&data) {
        Ok(value) => {
            Ok((SettingsData::from_json(&value), SettingsLoadStatus::Loaded))
        },
        Err(err) => Ok((
            SettingsData::default(),
            SettingsLoadStatus::Invalid(format!("{err}")),
        )),
    }
}

pub(crate) fn save_settings_to_path(
    path: &Path,
    settings: &SettingsData,
) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|err| SettingsError::io(dir, err))?;
    }

    let payload = serde_json::to_string_pretty(settings)?;
    crate::storage::write_atomic(path, payload.as_bytes())
        .map_err(|err| SettingsError::io(path, err))
}
