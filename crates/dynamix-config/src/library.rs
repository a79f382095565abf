//! Preset lookup across factory presets and preset directories.

use std::path::{Path, PathBuf};

use dynamix_dynamics::{Flavor, presets as factory};

use crate::error::ConfigError;
use crate::paths;
use crate::preset::Preset;

/// Where a resolved preset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetSource {
    /// Compiled into the engine.
    Factory,
    /// A `.toml` file found in a preset directory or given as a path.
    File(PathBuf),
}

/// One entry in a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetEntry {
    /// Lookup name: factory id or file stem.
    pub name: String,
    /// Flavour the preset targets.
    pub flavor: Flavor,
    /// Origin.
    pub source: PresetSource,
}

/// Ordered set of preset directories.
///
/// [`find`](Self::find) tries a factory id first, then `<dir>/<name>.toml`
/// for each directory in order, then `name` as a literal path.
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    dirs: Vec<PathBuf>,
}

impl PresetLibrary {
    /// Library with no directories; only factory ids and paths resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configured directories followed by the user and system directories.
    pub fn with_default_dirs(extra: &[PathBuf]) -> Self {
        let mut library = Self::new();
        for dir in extra {
            library.add_dir(dir.clone());
        }
        library.add_dir(paths::user_presets_dir());
        library.add_dir(paths::system_presets_dir());
        library
    }

    /// Append a search directory. Duplicates are ignored.
    pub fn add_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        let dir = dir.into();
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
        self
    }

    /// Search directories in order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Resolve `name` and load it.
    pub fn find(&self, name: &str) -> Result<(Preset, PresetSource), ConfigError> {
        let name = name.trim();
        if let Some(preset) = factory::find(name) {
            return Ok((Preset::from_factory(preset), PresetSource::Factory));
        }

        let file_name = if name.ends_with(".toml") {
            name.to_string()
        } else {
            format!("{name}.toml")
        };
        for dir in &self.dirs {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "preset found in directory");
                return Ok((Preset::load(&candidate)?, PresetSource::File(candidate)));
            }
        }

        let literal = Path::new(name);
        if literal.is_file() {
            return Ok((Preset::load(literal)?, PresetSource::File(literal.to_path_buf())));
        }
        Err(ConfigError::PresetNotFound(name.to_string()))
    }

    /// Factory presets followed by every readable preset file. Files that
    /// fail to parse are skipped with a warning.
    pub fn list(&self) -> Vec<PresetEntry> {
        let mut entries: Vec<PresetEntry> = factory::FACTORY_PRESETS
            .iter()
            .map(|p| PresetEntry {
                name: p.id.to_string(),
                flavor: p.flavor,
                source: PresetSource::Factory,
            })
            .collect();

        for dir in &self.dirs {
            for path in paths::list_presets_in_dir(dir) {
                let Some(name) = paths::preset_name_from_path(&path) else {
                    continue;
                };
                match Preset::load(&path) {
                    Ok(preset) => entries.push(PresetEntry {
                        name,
                        flavor: preset.flavor,
                        source: PresetSource::File(path),
                    }),
                    Err(err) => tracing::warn!(path = %path.display(), %err, "skipping preset"),
                }
            }
        }
        entries
    }
}
