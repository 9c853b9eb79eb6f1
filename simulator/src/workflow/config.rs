use crate::generator::series::GeneratorConfig;
use anyhow::Context;
use lietouscore::prelude::SyncConfig;
use lietouscore::sync::ViewportCommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_tick() -> f64 {
    0.25
}

/// One scripted interaction with the player or the chart controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Continuous playback emitting a time update every `tick` seconds.
    Play {
        from: f64,
        to: f64,
        #[serde(default = "default_tick")]
        tick: f64,
    },
    Seek {
        to: f64,
    },
    Command {
        command: ViewportCommand,
    },
    Fps {
        fps: f64,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

impl ReplayConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading replay config {}", path_ref.display()))?;
        let config: ReplayConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing replay config {}", path_ref.display()))?;
        config
            .sync
            .validate()
            .with_context(|| format!("validating replay config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(chunks: usize, fps: f64, seed: u64) -> Self {
        let generator = GeneratorConfig {
            chunks,
            fps,
            seed,
            ..Default::default()
        };
        let script = default_script(&generator);
        Self {
            sync: SyncConfig {
                default_fps: fps,
                ..Default::default()
            },
            generator,
            script,
        }
    }

    /// Falls back to the default walkthrough when the YAML carries no script.
    pub fn script_or_default(&self) -> Vec<ScriptStep> {
        if self.script.is_empty() {
            default_script(&self.generator)
        } else {
            self.script.clone()
        }
    }
}

/// Plays the whole video once, exercising every chart control along the way.
fn default_script(generator: &GeneratorConfig) -> Vec<ScriptStep> {
    let duration =
        generator.chunks as f64 * f64::from(generator.frames_per_chunk) / generator.fps.max(1.0);
    let midpoint = duration / 2.0;
    vec![
        ScriptStep::Play {
            from: 0.0,
            to: midpoint,
            tick: default_tick(),
        },
        ScriptStep::Command {
            command: ViewportCommand::ZoomIn,
        },
        ScriptStep::Command {
            command: ViewportCommand::ZoomOut,
        },
        ScriptStep::Command {
            command: ViewportCommand::ResetZoom,
        },
        ScriptStep::Command {
            command: ViewportCommand::JumpToCurrent,
        },
        ScriptStep::Seek { to: duration * 0.9 },
        ScriptStep::Play {
            from: duration * 0.9,
            to: duration,
            tick: default_tick(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_builds_default_script() {
        let cfg = ReplayConfig::from_args(60, 30.0, 4);
        assert_eq!(cfg.generator.chunks, 60);
        assert_eq!(cfg.script.len(), 7);
        assert_eq!(
            cfg.script[0],
            ScriptStep::Play {
                from: 0.0,
                to: 30.0,
                tick: 0.25
            }
        );
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"sync:\n  viewport_width: 10.0\n  locator: binary\ngenerator:\n  chunks: 12\n  seed: 3\nscript:\n  - action: play\n    from: 0.0\n    to: 4.0\n  - action: command\n    command: zoom_in\n  - action: seek\n    to: 9.5\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ReplayConfig::load(&path).unwrap();
        assert_eq!(cfg.sync.viewport_width, 10.0);
        assert_eq!(cfg.generator.chunks, 12);
        assert_eq!(cfg.script.len(), 3);
        assert_eq!(
            cfg.script[1],
            ScriptStep::Command {
                command: ViewportCommand::ZoomIn
            }
        );
    }

    #[test]
    fn config_load_rejects_invalid_sync_section() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"sync:\n  viewport_width: 1.0\n").unwrap();
        let path = temp.into_temp_path();
        assert!(ReplayConfig::load(&path).is_err());
    }

    #[test]
    fn empty_script_falls_back_to_walkthrough() {
        let cfg = ReplayConfig {
            sync: SyncConfig::default(),
            generator: GeneratorConfig::default(),
            script: Vec::new(),
        };
        assert_eq!(cfg.script_or_default().len(), 7);
    }
}
