use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use perch_sections::{SectionName, SectionStore};

use crate::settings::SettingsData;

#[derive(Debug, Parser)]
#[command(
    name = "perch",
    version,
    about = "Show, hide and arrange menu bar sections"
)]
pub(crate) struct Cli {
    /// Directory holding settings.json and sections.json.
    #[arg(long, global = true, value_name = "DIR")]
    pub(crate) config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Print every section with its state.
    Status,
    /// Show the items of a section.
    Show { section: SectionName },
    /// Hide the items of a section.
    Hide { section: SectionName },
    /// Flip a section between shown and hidden.
    Toggle { section: SectionName },
    /// Turn a section's control item on.
    Enable { section: SectionName },
    /// Turn a section's control item off.
    Disable { section: SectionName },
    /// Place a section's control item; omit the position to move it to the
    /// end of the bar.
    Move {
        section: SectionName,
        #[arg(allow_negative_numbers = true, value_parser = parse_position)]
        position: Option<f64>,
    },
    /// Keep running: read commands from stdin, save after changes settle and
    /// refresh item images on a timer.
    Run,
    /// Print the effective settings.
    Config {
        /// Write settings.json with the effective values if it does not exist.
        #[arg(long)]
        init: bool,
    },
}

/// Apply a section command and describe the resulting state.
pub(crate) fn execute(store: &mut SectionStore, command: &Command) -> String {
    match command {
        Command::Status | Command::Run | Command::Config { .. } => {},
        Command::Show { section } => store.show_section(*section),
        Command::Hide { section } => store.hide_section(*section),
        Command::Toggle { section } => store.toggle_section(*section),
        Command::Enable { section } => {
            store.set_section_enabled(*section, true)
        },
        Command::Disable { section } => {
            store.set_section_enabled(*section, false)
        },
        Command::Move { section, position } => {
            if let Some(id) =
                store.section(*section).map(|s| s.control_item().id())
            {
                store.set_position(id, *position);
            }
        },
    }

    describe_sections(store)
}

/// Parse one interactive line such as `toggle hidden`.
pub(crate) fn parse_command_line(line: &str) -> Result<Command, clap::Error> {
    let args = std::iter::once("perch").chain(line.split_whitespace());
    Cli::try_parse_from(args).map(|cli| cli.command)
}

fn parse_position(value: &str) -> Result<f64, String> {
    let position: f64 = value.parse().map_err(|err| format!("{err}"))?;
    if !position.is_finite() {
        return Err(format!("position must be a finite number, got {value}"));
    }

    Ok(position)
}

pub(crate) fn describe_sections(store: &SectionStore) -> String {
    let mut out = String::new();
    for section in store.sections() {
        let item = section.control_item();
        let position = item
            .position()
            .map(|position| format!("{position}"))
            .unwrap_or_else(|| String::from("end"));
        let enabled = if item.is_visible() { "enabled" } else { "disabled" };
        let _ = writeln!(
            out,
            "{:<15} {:<9} {:<18} {position}",
            section.name().title(),
            enabled,
            item.state().to_string(),
        );
    }
    out
}

pub(crate) fn describe_settings(settings: &SettingsData) -> String {
    let store = settings.store_options();
    let cache = settings.cache_options();
    let mut out = String::new();
    let _ = writeln!(out, "position throttle   {:?}", store.position_throttle);
    let _ = writeln!(out, "save debounce       {:?}", store.save_debounce);
    let _ = writeln!(out, "cache refresh       {:?}", cache.refresh_interval);
    let _ = writeln!(out, "composite max alpha {}", cache.composite_max_alpha);
    let _ = writeln!(out, "log level           {}", settings.log_level());
    out
}
