// irkbd Config API
// TOML configuration and combo string parsing

pub mod combo_parser;
pub mod parser;

pub use combo_parser::{parse_combo_string, ComboParseError, ParsedCombo};
pub use parser::{
    CodeToml, Config, ConfigError, ConfigToml, MappingTomlEntry, OutputBackend,
    DEFAULT_HIDG_DEVICE, DEFAULT_INPUT_DEVICE,
};
