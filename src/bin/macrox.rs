// MacroX CLI
// Inspect key ids and labels, check macro files, and encode or decode shared macros

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use anyhow::{bail, Context};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use macrox_core::transfer;
#[cfg(feature = "cli")]
use macrox_core::{
    canonicalize, display_to_physical, label, Layout, MacroConfig, MacroStore, MemoryStore,
    PlaybackPlan, Settings,
};

/// Macro definition and key label toolbox
#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "macrox")]
#[command(author = "macrox contributors")]
#[command(version)]
#[command(about = "Macro definition and key label toolbox", long_about = None)]
struct Args {
    /// Settings file (default: ~/.config/macrox/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Keyboard layout for labels, overriding the settings file
    #[arg(short, long, value_name = "LAYOUT")]
    layout: Option<Layout>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical storage id of physical key ids
    Canonicalize {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Print the label a key shows on the active layout
    Label {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Resolve a printed label back to a physical id
    Resolve { label: String },
    /// Validate a JSON file of macros as the store would on load
    Check { file: PathBuf },
    /// Print the share blob of one macro from a JSON file
    Export {
        file: PathBuf,
        /// Name of the macro to export (default: the only one in the file)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Decode a share blob and print the macro as JSON
    Import { blob: String },
}

#[cfg(feature = "cli")]
fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load_default().context("loading default settings")?,
    };
    Ok(settings)
}

#[cfg(feature = "cli")]
fn read_macros(path: &Path) -> anyhow::Result<Vec<MacroConfig>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    let macros = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        single => vec![serde_json::from_value(single)?],
    };
    Ok(macros)
}

#[cfg(feature = "cli")]
fn check(path: &Path) -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let mut failures = 0;
    for mut config in read_macros(path)? {
        config.ensure_id();
        match store.save_macro(&config) {
            Ok(()) => {
                let plan = PlaybackPlan::for_macro(&config)?;
                println!(
                    "ok    {:<24} {:<20} {} actions, {:?}",
                    config.name,
                    config.trigger.to_string(),
                    config.actions.len(),
                    plan
                );
            }
            Err(e) => {
                failures += 1;
                println!("error {:<24} {}", config.name, e);
            }
        }
    }
    if failures > 0 {
        bail!("{} macro(s) failed validation", failures);
    }
    println!("{} macro(s) valid", store.len());
    Ok(())
}

#[cfg(feature = "cli")]
fn export(path: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let macros = read_macros(path)?;
    let chosen = match name {
        Some(name) => macros
            .iter()
            .find(|m| m.name.trim().eq_ignore_ascii_case(name.trim())),
        None if macros.len() == 1 => macros.first(),
        None => bail!("{} holds {} macros, pick one with --name", path.display(), macros.len()),
    };
    let Some(config) = chosen else {
        bail!("no macro named {:?} in {}", name.unwrap_or_default(), path.display());
    };
    println!("{}", transfer::encode(config)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn run(args: Args) -> anyhow::Result<()> {
    let settings = load_settings(&args)?;
    let layout = args.layout.unwrap_or_else(|| settings.layout());
    log::debug!("using layout {}", layout);

    match args.command {
        Command::Canonicalize { ids } => {
            for id in ids {
                println!("{} -> {}", id, canonicalize(&id));
            }
        }
        Command::Label { ids } => {
            for id in ids {
                println!("{} -> {}", id, label(&canonicalize(&id), layout));
            }
        }
        Command::Resolve { label } => {
            let physical = display_to_physical(&label, layout);
            println!("{} -> {} ({})", label, physical, canonicalize(&physical));
        }
        Command::Check { file } => check(&file)?,
        Command::Export { file, name } => export(&file, name.as_deref())?,
        Command::Import { blob } => {
            let config = transfer::decode(&blob).context("decoding share blob")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    run(args)
}

// Stub for when the cli feature is not enabled
#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("Error: macrox binary requires the 'cli' feature to be enabled.");
    eprintln!("Please build with: cargo build --release --features cli --bin macrox");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "cli")]
    use super::*;

    #[test]
    #[cfg(feature = "cli")]
    fn test_args_parsing() {
        let args = Args::parse_from(["macrox", "--layout", "azerty", "label", "KeyQ"]);
        assert_eq!(args.layout, Some(Layout::Azerty));
        assert!(!args.verbose);
        assert!(matches!(args.command, Command::Label { ref ids } if ids == &["KeyQ"]));
    }

    #[test]
    #[cfg(feature = "cli")]
    fn test_args_export_with_name() {
        let args = Args::parse_from(["macrox", "-v", "export", "macros.json", "--name", "Combo"]);
        assert!(args.verbose);
        match args.command {
            Command::Export { file, name } => {
                assert_eq!(file, PathBuf::from("macros.json"));
                assert_eq!(name.as_deref(), Some("Combo"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    #[cfg(feature = "cli")]
    fn test_requires_subcommand() {
        assert!(Args::try_parse_from(["macrox"]).is_err());
    }
}
