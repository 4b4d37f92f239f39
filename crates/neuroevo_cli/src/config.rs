use anyhow::Context;
use neuroevo_core::EvolutionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Directory holding `config.toml`: `~/.neuroevo`, or `./.neuroevo` when
/// there is no home directory or it cannot be written to.
pub fn neuroevo_data_dir() -> PathBuf {
    let local = PathBuf::from(".neuroevo");
    let preferred = dirs::home_dir().map(|home| home.join(".neuroevo"));
    if preferred.is_none() {
        warn!(dir = %local.display(), "No home directory, using local data dir");
    }

    if let Some(dir) = preferred {
        match fs::create_dir_all(&dir) {
            Ok(()) => return dir,
            Err(e) => warn!(error = %e, dir = %dir.display(), "Data dir not writable, using local"),
        }
    }
    if let Err(e) = fs::create_dir_all(&local) {
        warn!(error = %e, dir = %local.display(), "Could not create local data dir");
    }
    local
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Loop control shared by `evolve` and `train`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_generations")]
    pub generations: u64,
    #[serde(default = "default_epochs")]
    pub epochs: u64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Emit an info line every N generations/epochs
    #[serde(default = "default_log_every")]
    pub log_every: u64,
    /// Stop evolving once the best fitness reaches this value
    #[serde(default)]
    pub target_fitness: Option<f64>,
}

fn default_generations() -> u64 {
    200
}
fn default_epochs() -> u64 {
    5000
}
fn default_seed() -> u64 {
    42
}
fn default_log_every() -> u64 {
    10
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            epochs: default_epochs(),
            seed: default_seed(),
            log_every: default_log_every(),
            target_fitness: None,
        }
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        let mut path = neuroevo_data_dir();
        path.push("config.toml");
        path
    }

    /// Load from `path`, or from the default location. A missing file is
    /// created with defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::get_config_path);

        if !path.exists() {
            let config = Config::default();
            config.save(&path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [evolution]
            population_size = 64

            [evolution.topology]
            hidden_layers = 2
            inputs = 3
            hidden_width = 8
            outputs = 1

            [run]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.evolution.population_size, 64);
        assert_eq!(config.evolution.topology.hidden_layers, 2);
        assert_eq!(config.evolution.crossover_rate, 0.7);
        assert_eq!(config.run.seed, 7);
        assert_eq!(config.run.generations, 200);
        assert_eq!(config.run.target_fitness, None);
    }

    #[test]
    fn test_default_roundtrips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.evolution, EvolutionConfig::default());
        assert_eq!(back.run.epochs, 5000);
    }

    #[test]
    fn test_data_dir_exists() {
        let dir = neuroevo_data_dir();
        assert!(dir.is_dir());
        assert!(Config::get_config_path().starts_with(&dir));
    }
}
