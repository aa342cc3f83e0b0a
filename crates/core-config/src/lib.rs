//! Configuration loading and parsing.
//!
//! Reads `oxmodal.toml` (or an override path supplied by the host):
//!
//! ```toml
//! [editor]
//! tabstop = 8
//!
//! [registers]
//! default = '"'
//!
//! [input]
//! max_count = 999999
//! ```
//!
//! Raw parsed values are kept in `ConfigFile`; `Config` carries the effective
//! (validated / clamped) values. Unknown fields are ignored and a malformed
//! file falls back to defaults.

use anyhow::Result;
use core_keymap::RegisterName;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

const FILE_NAME: &str = "oxmodal.toml";

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tabstop")]
    pub tabstop: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tabstop: Self::default_tabstop(),
        }
    }
}

impl EditorConfig {
    const fn default_tabstop() -> usize {
        8
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistersConfig {
    #[serde(default = "RegistersConfig::default_register")]
    pub default: char,
}

impl Default for RegistersConfig {
    fn default() -> Self {
        Self {
            default: Self::default_register(),
        }
    }
}

impl RegistersConfig {
    const fn default_register() -> char {
        '"'
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// Ceiling for accumulated counts (Vim clamps similarly).
    #[serde(default = "InputConfig::default_max_count")]
    pub max_count: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_count: Self::default_max_count(),
        }
    }
}

impl InputConfig {
    const fn default_max_count() -> u32 {
        999_999
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub registers: RegistersConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Settings the dispatch engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    pub default_register: RegisterName,
    pub max_count: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_register: RegisterName::UNNAMED,
            max_count: InputConfig::default_max_count(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub effective_tabstop: usize,
    pub effective_default_register: RegisterName,
    pub effective_max_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(None, ConfigFile::default())
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxmodal").join(FILE_NAME);
    }
    PathBuf::from(FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config::from_file(Some(content), file)),
        Err(e) => {
            info!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Validate parsed values, logging every adjustment.
    pub fn from_file(raw: Option<String>, file: ConfigFile) -> Self {
        let tabstop = file.editor.tabstop;
        let effective_tabstop = tabstop.max(1);
        if effective_tabstop != tabstop {
            info!(target: "config", raw = tabstop, clamped = effective_tabstop, "tabstop_clamped");
        }

        let requested = file.registers.default;
        let effective_default_register = RegisterName::new(requested).unwrap_or_else(|_| {
            info!(
                target: "config",
                raw = %requested,
                fallback = %RegisterName::UNNAMED.as_char(),
                "default_register_invalid"
            );
            RegisterName::UNNAMED
        });

        let max_count = file.input.max_count;
        let effective_max_count = max_count.max(1);
        if effective_max_count != max_count {
            info!(target: "config", raw = max_count, clamped = effective_max_count, "max_count_clamped");
        }

        Self {
            raw,
            file,
            effective_tabstop,
            effective_default_register,
            effective_max_count,
        }
    }

    pub fn tab_stop(&self) -> usize {
        self.effective_tabstop
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            default_register: self.effective_default_register,
            max_count: self.effective_max_count,
        }
    }
}
