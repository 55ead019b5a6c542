/// External configuration loader.
///
/// Reads the first `config.toml` found in the executable's directory, the
/// CWD, `~/.local/share/endless-faller`, then `/usr/share/endless-faller`.
/// Falls back to sensible defaults if the file is missing or incomplete.
///
/// Only the shell is configurable (frame pacing, seed, logging, gamepad
/// buttons). The game rules themselves are fixed in `domain::rules`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const DEFAULT_LOG_FILE: &str = "endless-faller.log";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    /// Fixed RNG seed for a reproducible layout; `None` = fresh every launch.
    pub seed: Option<u64>,
    /// Where log output goes. `None` = logging disabled.
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub target_fps: u32,
    /// Upper bound on a single frame's `dt`, in seconds.
    pub max_frame_dt: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_target_fps")]
    target_fps: u32,
    #[serde(default = "default_max_frame_dt")]
    max_frame_dt: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_target_fps() -> u32 { 60 }
fn default_max_frame_dt() -> f32 { 0.1 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            target_fps: default_target_fps(),
            max_frame_dt: default_max_frame_dt(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/endless-faller`, (4) `/usr/share/endless-faller`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        let rust_log_set = std::env::var_os("RUST_LOG").is_some();
        Self::from_toml(toml_cfg, rust_log_set)
    }

    fn from_toml(toml_cfg: TomlConfig, rust_log_set: bool) -> Self {
        let log_file = match toml_cfg.general.log_file {
            Some(path) => Some(PathBuf::from(path)),
            None if rust_log_set => Some(PathBuf::from(DEFAULT_LOG_FILE)),
            None => None,
        };

        GameConfig {
            display: DisplayConfig {
                target_fps: toml_cfg.display.target_fps.clamp(1, 240),
                max_frame_dt: if toml_cfg.display.max_frame_dt > 0.0 {
                    toml_cfg.display.max_frame_dt
                } else {
                    default_max_frame_dt()
                },
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            seed: toml_cfg.general.seed,
            log_file,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/endless-faller");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/endless-faller");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            if let Some(cfg) = read_toml(&path) {
                return cfg;
            }
        }
    }
    TomlConfig::default()
}

/// Read one config file. Parse errors fall back to defaults; read errors
/// move on to the next candidate.
fn read_toml(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                eprintln!("Warning: {} parse error: {e}", path.display());
                eprintln!("Using default settings.");
                Some(TomlConfig::default())
            }
        },
        Err(e) => {
            eprintln!("Warning: could not read {}: {e}", path.display());
            None
        }
    }
}
