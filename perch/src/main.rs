mod cli;
mod driver;
mod settings;
mod storage;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use perch_sections::{SectionStore, SystemClock};

use crate::cli::{Cli, Command};
use crate::settings::{
    SettingsData, SettingsLoadStatus, load_settings_from_path,
    save_settings_to_path,
};
use crate::storage::{
    JsonFileStorage, SECTIONS_FILE, SETTINGS_FILE, default_config_dir,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);
    let settings_path = config_dir.join(SETTINGS_FILE);

    let (settings, status) = match load_settings_from_path(&settings_path) {
        Ok(loaded) => loaded,
        Err(err) => (
            SettingsData::default(),
            SettingsLoadStatus::Invalid(err.to_string()),
        ),
    };
    init_logging(settings.log_level());
    report_settings_status(&settings_path, &status);

    if let Command::Config { init } = cli.command {
        if init && matches!(status, SettingsLoadStatus::Missing) {
            save_settings_to_path(&settings_path, &settings).with_context(
                || format!("writing {}", settings_path.display()),
            )?;
            println!("wrote {}", settings_path.display());
        }
        print!("{}", cli::describe_settings(&settings));
        return Ok(());
    }

    let storage = JsonFileStorage::new(config_dir.join(SECTIONS_FILE));
    let sections_path = storage.path().to_path_buf();
    let mut store = SectionStore::new(
        Box::new(storage),
        Arc::new(SystemClock),
        settings.store_options(),
    );
    store.initialize_sections();
    if store.sections().is_empty() {
        bail!("could not load sections from {}", sections_path.display());
    }

    let output = match &cli.command {
        Command::Run => {
            store = run_driver(store, &settings)?;
            String::new()
        },
        command => cli::execute(&mut store, command),
    };

    // Flush now instead of waiting out the debounce.
    store.save_sections();
    if store.needs_save() {
        bail!("could not save sections to {}", sections_path.display());
    }

    print!("{output}");
    Ok(())
}

fn run_driver(
    store: SectionStore,
    settings: &SettingsData,
) -> Result<SectionStore> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let commands = driver::spawn_stdin_commands()
        .context("reading commands from stdin")?;

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::warn!("cannot listen for interrupts: {err}");
            std::future::pending::<()>().await;
        }
    };
    Ok(runtime.block_on(driver::run(
        store,
        settings.cache_options(),
        commands,
        shutdown,
    )))
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level),
    )
    .format_timestamp_millis()
    .init();
}

fn report_settings_status(path: &Path, status: &SettingsLoadStatus) {
    match status {
        SettingsLoadStatus::Loaded => {
            log::debug!("loaded settings from {}", path.display())
        },
        SettingsLoadStatus::Missing => {
            log::debug!("no settings at {}, using defaults", path.display())
        },
        SettingsLoadStatus::Invalid(message) => {
            log::warn!("invalid settings at {}: {message}", path.display())
        },
    }
}
