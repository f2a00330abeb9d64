mod errors;
mod model;
mod storage;

pub(crate) use model::SettingsData;
pub(crate) use storage::{
    SettingsLoadStatus, load_settings_from_path, save_settings_to_path,
};
