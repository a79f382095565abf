//! Preset management commands.

use clap::{Args, Subcommand};
use dynamix_config::{
    EngineConfig, Preset, PresetSource, ensure_user_presets_dir, system_presets_dir,
    user_presets_dir,
};
use dynamix_dynamics::{Flavor, presets::FACTORY_PRESETS};

use super::common::{header, library, parse_key_val};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: Option<PresetsCommand>,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory and user presets
    List {
        /// Only presets for this flavor
        #[arg(short, long)]
        flavor: Option<Flavor>,

        /// Show only factory presets
        #[arg(long)]
        factory: bool,
    },

    /// Show the contents of a preset
    Show {
        /// Preset id, name or path
        name: String,
    },

    /// Save a new user preset from parameter values
    Save {
        /// Name for the new preset
        name: String,

        /// Flavor the parameters belong to
        #[arg(short, long, default_value = "modern")]
        flavor: Flavor,

        /// Parameter value, e.g. "ratio=4" (repeatable)
        #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
        param: Vec<(String, f32)>,

        /// Description of the preset
        #[arg(short, long)]
        description: Option<String>,

        /// Overwrite if the preset already exists
        #[arg(long)]
        force: bool,
    },

    /// Copy a preset into the user directory for editing
    Copy {
        /// Preset to copy
        source: String,

        /// New file name (defaults to the source name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Show preset directories
    Paths,
}

pub fn run(args: PresetsArgs, config: &EngineConfig) -> anyhow::Result<()> {
    match args.command.unwrap_or(PresetsCommand::List {
        flavor: None,
        factory: false,
    }) {
        PresetsCommand::List { flavor, factory } => list_presets(config, flavor, factory),
        PresetsCommand::Show { name } => show_preset(config, &name),
        PresetsCommand::Save {
            name,
            flavor,
            param,
            description,
            force,
        } => save_preset(&name, flavor, param, description, force),
        PresetsCommand::Copy { source, name } => copy_preset(config, &source, name.as_deref()),
        PresetsCommand::Paths => show_paths(config),
    }
}

fn list_presets(
    config: &EngineConfig,
    flavor: Option<Flavor>,
    factory_only: bool,
) -> anyhow::Result<()> {
    let flavors: Vec<Flavor> = flavor.map_or_else(|| Flavor::ALL.to_vec(), |f| vec![f]);

    header("Factory Presets");
    for flavor in &flavors {
        println!("  {}:", flavor.name());
        for preset in FACTORY_PRESETS.iter().filter(|p| p.flavor == *flavor) {
            println!("    {:22} {}", preset.id, preset.description);
        }
    }
    println!();

    if factory_only {
        return Ok(());
    }
    header("User Presets");
    let user: Vec<_> = library(config)
        .list()
        .into_iter()
        .filter(|e| matches!(e.source, PresetSource::File(_)) && flavors.contains(&e.flavor))
        .collect();
    if user.is_empty() {
        println!("  (none)");
        println!("  Create one with: dynamix presets save <name> --flavor <flavor> --param k=v");
    }
    for entry in user {
        if let PresetSource::File(path) = &entry.source {
            println!("  {:22} {:10} {}", entry.name, entry.flavor.id(), path.display());
        }
    }
    Ok(())
}

fn show_preset(config: &EngineConfig, name: &str) -> anyhow::Result<()> {
    let (preset, source) = library(config).find(name)?;
    header(&preset.name);
    match &source {
        PresetSource::Factory => println!("  Source: factory"),
        PresetSource::File(path) => println!("  Source: {}", path.display()),
    }
    println!("  Flavor: {}", preset.flavor);
    if let Some(description) = &preset.description {
        println!("  Description: {description}");
    }
    if !preset.tags.is_empty() {
        println!("  Tags: {}", preset.tags.join(", "));
    }
    println!();
    for (id, value) in &preset.params {
        println!("  {id:20} {value}");
    }
    if let Err(err) = preset.validate() {
        println!("\n  warning: {err}");
    }
    Ok(())
}

fn save_preset(
    name: &str,
    flavor: Flavor,
    params: Vec<(String, f32)>,
    description: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let mut preset = Preset::new(name, flavor);
    preset.description = description;
    preset.params = params.into_iter().collect();
    preset.validate()?;

    let path = ensure_user_presets_dir()?.join(format!("{name}.toml"));
    if path.exists() && !force {
        anyhow::bail!("preset '{name}' already exists at {} (use --force)", path.display());
    }
    preset.save(&path)?;
    println!("Saved {}", path.display());
    Ok(())
}

fn copy_preset(config: &EngineConfig, source: &str, name: Option<&str>) -> anyhow::Result<()> {
    let (mut preset, _) = library(config).find(source)?;
    let file_name = name.unwrap_or(source);
    if let Some(name) = name {
        preset.name = name.to_string();
    }
    let path = ensure_user_presets_dir()?.join(format!("{file_name}.toml"));
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    preset.save(&path)?;
    println!("Copied '{source}' to {}", path.display());
    Ok(())
}

fn show_paths(config: &EngineConfig) -> anyhow::Result<()> {
    header("Preset Directories");
    for dir in &config.preset_dirs {
        println!("  Config: {}", dir.display());
    }
    println!("  User:   {}", user_presets_dir().display());
    println!("  System: {}", system_presets_dir().display());
    Ok(())
}
