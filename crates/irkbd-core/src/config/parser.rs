// irkbd Config Parser - TOML with Serde
// Parses configuration from TOML files

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use strum_macros::{Display, EnumIter, EnumString};

use crate::input::IrCode;
use crate::layout::Layout;
use crate::mapping::{KeyMapping, Keymap};
use crate::transform::Timing;
use crate::{Combo, Key, Modifiers};

pub const DEFAULT_INPUT_DEVICE: &str = "/dev/lirc0";
pub const DEFAULT_HIDG_DEVICE: &str = "/dev/hidg0";

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid IR code: {0}")]
    InvalidCode(String),

    #[error("Invalid combo string: {0}")]
    InvalidCombo(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    #[error("Unknown output backend: {0}")]
    UnknownBackend(String),

    #[error("Duplicate IR code: {0}")]
    DuplicateCode(String),

    #[error("Timeout value out of range: {0}")]
    TimeoutOutOfRange(String),
}

/// Where key actions go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum OutputBackend {
    /// Raw boot keyboard reports on a USB HID gadget
    #[default]
    #[strum(serialize = "hidg")]
    Hidg,
    /// Local virtual keyboard via uinput
    #[strum(serialize = "uinput")]
    Uinput,
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Built-in layout name, or "none"
    pub layout: Option<String>,

    /// Reject duplicate codes instead of warning
    #[serde(default)]
    pub strict: bool,

    #[serde(default)]
    pub timing: Timing,

    pub input: Option<InputConfig>,

    pub output: Option<OutputConfig>,

    /// Custom mappings, taking priority over the layout
    #[serde(default)]
    pub mapping: Vec<MappingTomlEntry>,
}

/// Decoder settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// lirc character device
    pub device: Option<PathBuf>,
}

/// Emitter settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// "hidg" or "uinput"
    pub backend: Option<String>,
    /// HID gadget device for the hidg backend
    pub device: Option<PathBuf>,
}

/// One `[[mapping]]` table.
///
/// Either `combo = "Ctrl-Down"`, or `key = "DOWN"` with an optional
/// numeric `modifiers` mask (Ctrl=1, Alt=2, Shift=4, GUI=8).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingTomlEntry {
    pub code: CodeToml,
    pub combo: Option<String>,
    pub key: Option<String>,
    pub modifiers: Option<u8>,
}

/// Scancode as a TOML integer or a string such as "0x800f1422"
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CodeToml {
    Int(i64),
    Str(String),
}

impl CodeToml {
    fn to_code(&self) -> Result<IrCode, ConfigError> {
        match self {
            CodeToml::Int(value) => u32::try_from(*value)
                .map(IrCode)
                .map_err(|_| ConfigError::InvalidCode(value.to_string())),
            CodeToml::Str(s) => s.parse().map_err(ConfigError::InvalidCode),
        }
    }
}

impl MappingTomlEntry {
    fn to_mapping(&self, index: usize) -> Result<KeyMapping, ConfigError> {
        let code = self.code.to_code()?;
        let combo = match (&self.combo, &self.key) {
            (Some(combo), None) => {
                if self.modifiers.is_some() {
                    return Err(ConfigError::InvalidCombo(format!(
                        "mapping {}: use either 'combo' or 'key' with 'modifiers'",
                        index
                    )));
                }
                Combo::from_str(combo)
                    .map_err(|e| ConfigError::InvalidCombo(format!("'{}': {}", combo, e)))?
            }
            (None, Some(key)) => {
                let key = Key::from_str(key)
                    .map_err(|_| ConfigError::InvalidCombo(format!("unknown key '{}'", key)))?;
                let modifiers = Modifiers::from_mask(self.modifiers.unwrap_or(0))
                    .map_err(|e| ConfigError::InvalidModifier(e.to_string()))?;
                Combo::new(modifiers, key)
            }
            _ => {
                return Err(ConfigError::InvalidCombo(format!(
                    "mapping {} ({}) needs exactly one of 'combo' or 'key'",
                    index, code
                )))
            }
        };
        Ok(KeyMapping { code, combo })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Built-in layout beneath the custom mappings
    pub layout: Option<Layout>,
    /// Duplicate custom codes are an error
    pub strict: bool,
    pub timing: Timing,
    /// lirc device to read scancodes from
    pub input_device: PathBuf,
    pub output_backend: OutputBackend,
    /// HID gadget device for the hidg backend
    pub output_device: PathBuf,
    /// Custom mappings in file order
    pub mappings: Vec<KeyMapping>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout: Some(Layout::default()),
            strict: false,
            timing: Timing::default(),
            input_device: PathBuf::from(DEFAULT_INPUT_DEVICE),
            output_backend: OutputBackend::default(),
            output_device: PathBuf::from(DEFAULT_HIDG_DEVICE),
            mappings: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;

        toml_config.to_config()
    }

    /// `$XDG_CONFIG_HOME/irkbd/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("irkbd").join("config.toml"))
    }

    /// Load the default config file, or built-in defaults if there is none
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_path(path)
            }
            _ => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse a layout name as accepted in the config file
    pub fn parse_layout(name: &str) -> Result<Option<Layout>, ConfigError> {
        if name.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        Layout::from_str(name)
            .map(Some)
            .map_err(|_| ConfigError::UnknownLayout(name.to_string()))
    }

    /// Check timing invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.is_valid() {
            return Ok(());
        }
        Err(ConfigError::TimeoutOutOfRange(format!(
            "release_timeout_ms ({}) must be greater than repeat_interval_ms ({}) \
             and poll_interval_ms ({}) at least 1",
            timing.release_timeout_ms, timing.repeat_interval_ms, timing.poll_interval_ms
        )))
    }

    /// Resolve custom mappings and the layout into one keymap.
    ///
    /// Custom mappings come first, so they override layout rows for the
    /// same code. Duplicates among the custom mappings are an error in
    /// strict mode and a warning otherwise.
    pub fn to_keymap(&self) -> Result<Keymap, ConfigError> {
        let name = match (self.layout, self.mappings.is_empty()) {
            (Some(layout), true) => layout.to_string(),
            (Some(layout), false) => format!("{}+custom", layout),
            (None, _) => "custom".to_string(),
        };
        let custom = self.mappings.iter().copied();
        let mut keymap = if self.strict {
            Keymap::from_entries_strict(name, custom)
                .map_err(|dup| ConfigError::DuplicateCode(dup.to_string()))?
        } else {
            Keymap::from_entries(name, custom)
        };

        if let Some(layout) = self.layout {
            keymap.extend_fallback(layout.entries());
        }

        Ok(keymap)
    }
}

impl ConfigToml {
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut config = Config {
            strict: self.strict,
            timing: self.timing,
            ..Config::default()
        };

        if let Some(name) = &self.layout {
            config.layout = Config::parse_layout(name)?;
        }

        if let Some(device) = self.input.as_ref().and_then(|i| i.device.clone()) {
            config.input_device = device;
        }

        if let Some(output) = &self.output {
            if let Some(backend) = &output.backend {
                config.output_backend = OutputBackend::from_str(backend)
                    .map_err(|_| ConfigError::UnknownBackend(backend.clone()))?;
            }
            if let Some(device) = &output.device {
                config.output_device = device.clone();
            }
        }

        config.mappings = self
            .mapping
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.to_mapping(i))
            .collect::<Result<_, _>>()?;

        config.validate()?;
        Ok(config)
    }
}
