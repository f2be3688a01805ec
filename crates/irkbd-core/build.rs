use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// (name, USB HID keyboard-page usage, Linux input-event-codes.h code)
const KEYS: &[(&str, u16, u16)] = &[
    ("A", 0x04, 30),
    ("B", 0x05, 48),
    ("C", 0x06, 46),
    ("D", 0x07, 32),
    ("E", 0x08, 18),
    ("F", 0x09, 33),
    ("G", 0x0a, 34),
    ("H", 0x0b, 35),
    ("I", 0x0c, 23),
    ("J", 0x0d, 36),
    ("K", 0x0e, 37),
    ("L", 0x0f, 38),
    ("M", 0x10, 50),
    ("N", 0x11, 49),
    ("O", 0x12, 24),
    ("P", 0x13, 25),
    ("Q", 0x14, 16),
    ("R", 0x15, 19),
    ("S", 0x16, 31),
    ("T", 0x17, 20),
    ("U", 0x18, 22),
    ("V", 0x19, 47),
    ("W", 0x1a, 17),
    ("X", 0x1b, 45),
    ("Y", 0x1c, 21),
    ("Z", 0x1d, 44),
    ("KEY_1", 0x1e, 2),
    ("KEY_2", 0x1f, 3),
    ("KEY_3", 0x20, 4),
    ("KEY_4", 0x21, 5),
    ("KEY_5", 0x22, 6),
    ("KEY_6", 0x23, 7),
    ("KEY_7", 0x24, 8),
    ("KEY_8", 0x25, 9),
    ("KEY_9", 0x26, 10),
    ("KEY_0", 0x27, 11),
    ("ENTER", 0x28, 28),
    ("ESC", 0x29, 1),
    ("BACKSPACE", 0x2a, 14),
    ("TAB", 0x2b, 15),
    ("SPACE", 0x2c, 57),
    ("MINUS", 0x2d, 12),
    ("EQUAL", 0x2e, 13),
    ("LEFT_BRACE", 0x2f, 26),
    ("RIGHT_BRACE", 0x30, 27),
    ("BACKSLASH", 0x31, 43),
    ("SEMICOLON", 0x33, 39),
    ("APOSTROPHE", 0x34, 40),
    ("GRAVE", 0x35, 41),
    ("COMMA", 0x36, 51),
    ("DOT", 0x37, 52),
    ("SLASH", 0x38, 53),
    ("CAPSLOCK", 0x39, 58),
    ("F1", 0x3a, 59),
    ("F2", 0x3b, 60),
    ("F3", 0x3c, 61),
    ("F4", 0x3d, 62),
    ("F5", 0x3e, 63),
    ("F6", 0x3f, 64),
    ("F7", 0x40, 65),
    ("F8", 0x41, 66),
    ("F9", 0x42, 67),
    ("F10", 0x43, 68),
    ("F11", 0x44, 87),
    ("F12", 0x45, 88),
    ("SYSRQ", 0x46, 99),
    ("SCROLLLOCK", 0x47, 70),
    ("PAUSE", 0x48, 119),
    ("INSERT", 0x49, 110),
    ("HOME", 0x4a, 102),
    ("PAGE_UP", 0x4b, 104),
    ("DELETE", 0x4c, 111),
    ("END", 0x4d, 107),
    ("PAGE_DOWN", 0x4e, 109),
    ("RIGHT", 0x4f, 106),
    ("LEFT", 0x50, 105),
    ("DOWN", 0x51, 108),
    ("UP", 0x52, 103),
    ("NUMLOCK", 0x53, 69),
    ("KPSLASH", 0x54, 98),
    ("KPASTERISK", 0x55, 55),
    ("KPMINUS", 0x56, 74),
    ("KPPLUS", 0x57, 78),
    ("KPENTER", 0x58, 96),
    ("KP1", 0x59, 79),
    ("KP2", 0x5a, 80),
    ("KP3", 0x5b, 81),
    ("KP4", 0x5c, 75),
    ("KP5", 0x5d, 76),
    ("KP6", 0x5e, 77),
    ("KP7", 0x5f, 71),
    ("KP8", 0x60, 72),
    ("KP9", 0x61, 73),
    ("KP0", 0x62, 82),
    ("KPDOT", 0x63, 83),
    ("COMPOSE", 0x65, 127),
    ("POWER", 0x66, 116),
    ("F13", 0x68, 183),
    ("F14", 0x69, 184),
    ("F15", 0x6a, 185),
    ("F16", 0x6b, 186),
    ("F17", 0x6c, 187),
    ("F18", 0x6d, 188),
    ("F19", 0x6e, 189),
    ("F20", 0x6f, 190),
    ("F21", 0x70, 191),
    ("F22", 0x71, 192),
    ("F23", 0x72, 193),
    ("F24", 0x73, 194),
    ("MUTE", 0x7f, 113),
    ("VOLUMEUP", 0x80, 115),
    ("VOLUMEDOWN", 0x81, 114),
    ("LEFT_CTRL", 0xe0, 29),
    ("LEFT_SHIFT", 0xe1, 42),
    ("LEFT_ALT", 0xe2, 56),
    ("LEFT_META", 0xe3, 125),
    ("RIGHT_CTRL", 0xe4, 97),
    ("RIGHT_SHIFT", 0xe5, 54),
    ("RIGHT_ALT", 0xe6, 100),
    ("RIGHT_META", 0xe7, 126),
];

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("key_codes.rs");
    let mut f = File::create(&dest_path).unwrap();

    // Generate the Key newtype wrapper
    writeln!(
        f,
        r#"
/// Represents a single keyboard key.
///
/// This is a newtype wrapper around the USB HID usage id on the
/// keyboard/keypad page (0x07), which is what goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

impl Key {{
    /// Get the raw HID usage id
    pub fn code(self) -> u16 {{
        self.0
    }}

    /// Get the name of this key
    pub fn name(self) -> &'static str {{
        key_name(self)
    }}
}}

impl From<u16> for Key {{
    fn from(code: u16) -> Self {{
        Key(code)
    }}
}}

impl From<Key> for u16 {{
    fn from(key: Key) -> Self {{
        key.0
    }}
}}

impl fmt::Display for Key {{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{
        write!(f, "{{}}", self.name())
    }}
}}

impl FromStr for Key {{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {{
        key_from_name(s).ok_or_else(|| format!("Unknown key: {{}}", s))
    }}
}}
"#
    )
    .unwrap();

    writeln!(f, "#[allow(missing_docs)]").unwrap();
    writeln!(f, "impl Key {{").unwrap();
    for (name, usage, _) in KEYS {
        writeln!(f, "    pub const {}: Key = Key({:#04x});", name, usage).unwrap();
    }
    writeln!(f, "}}").unwrap();

    writeln!(
        f,
        "\n/// Every named key as (name, key, Linux evdev code), in usage order.\npub static KEY_TABLE: &[(&str, Key, u16)] = &["
    )
    .unwrap();
    for (name, usage, linux) in KEYS {
        writeln!(f, "    (\"{}\", Key({:#04x}), {}),", name, usage, linux).unwrap();
    }
    writeln!(f, "];").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
