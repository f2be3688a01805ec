// irkbd Built-in Layouts
// Scancode tables for RC6 media-center remotes mapped to Kodi keyboard controls

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::mapping::{KeyMapping, Keymap};
use crate::{Combo, Key, Modifiers};

/// Remote families sharing the RC6 MCE command set under different
/// device addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Remote {
    /// Windows Media Center remote
    #[strum(serialize = "mce")]
    Mce,
    /// Inteset INT422 in its "Kodi/PC" preset (device code 02000)
    #[strum(serialize = "int422")]
    Int422,
}

impl Remote {
    /// Scancode of button 0; every other button is OR'd onto it
    pub const fn base(self) -> u32 {
        match self {
            Remote::Mce => 0x800f_0400,
            Remote::Int422 => 0x800f_1400,
        }
    }

    /// Full scancode of a button on this remote
    pub const fn code(self, button: Button) -> u32 {
        self.base() | button as u32
    }
}

/// Buttons of the MCE command set, valued by their offset from the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[repr(u8)]
pub enum Button {
    Numeric0 = 0x00,
    Numeric1 = 0x01,
    Numeric2 = 0x02,
    Numeric3 = 0x03,
    Numeric4 = 0x04,
    Numeric5 = 0x05,
    Numeric6 = 0x06,
    Numeric7 = 0x07,
    Numeric8 = 0x08,
    Numeric9 = 0x09,
    Delete = 0x0a,
    Enter = 0x0b,
    /// Formerly PC Power
    Sleep = 0x0c,
    /// Windows logo button
    Media = 0x0d,
    Mute = 0x0e,
    Info = 0x0f,
    VolumeUp = 0x10,
    VolumeDown = 0x11,
    ChannelUp = 0x12,
    ChannelDown = 0x13,
    FastForward = 0x14,
    Rewind = 0x15,
    Play = 0x16,
    Record = 0x17,
    Pause = 0x18,
    Stop = 0x19,
    Next = 0x1a,
    Previous = 0x1b,
    Pound = 0x1c,
    Star = 0x1d,
    Up = 0x1e,
    Down = 0x1f,
    Left = 0x20,
    Right = 0x21,
    Ok = 0x22,
    Exit = 0x23,
    Dvd = 0x24,
    /// LiveTV
    Tuner = 0x25,
    /// Guide
    Epg = 0x26,
    Zoom = 0x27,
    PowerOn = 0x29,
    PowerOff = 0x2a,
    /// Visualization
    Mode = 0x32,
    Presentation = 0x33,
    EjectCd = 0x34,
    BrightnessUp = 0x3a,
    Tv = 0x46,
    /// My Music
    Audio = 0x47,
    /// Recorded TV
    Pvr = 0x48,
    Camera = 0x49,
    Video = 0x4a,
    Language = 0x4c,
    Title = 0x4d,
    Print = 0x4e,
    Radio = 0x50,
    /// Caption/Teletext
    Subtitle = 0x5a,
    Red = 0x5b,
    Green = 0x5c,
    Yellow = 0x5d,
    Blue = 0x5e,
    /// TV power
    Power2 = 0x65,
    Messenger = 0x69,
    PlayPause = 0x6e,
    /// Start media application
    Player = 0x6f,
    BrightnessDown = 0x80,
    PlayPause2 = 0x81,
}

/// Which remotes carry a row of a shared table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fit {
    All,
    Int422Only,
}

struct Row {
    button: Button,
    modifiers: Modifiers,
    key: Key,
    fit: Fit,
}

const fn row(button: Button, key: Key) -> Row {
    Row {
        button,
        modifiers: Modifiers::empty(),
        key,
        fit: Fit::All,
    }
}

const fn int422(button: Button, modifiers: Modifiers, key: Key) -> Row {
    Row {
        button,
        modifiers,
        key,
        fit: Fit::Int422Only,
    }
}

/// Kodi keyboard controls, in priority order.
///
/// Record appears twice (B, then Print Screen) and on the INT422 Mode is
/// both Menu and F5 (C, then V); the earlier rows win.
const KODI: &[Row] = &[
    row(Button::Left, Key::LEFT),
    row(Button::Right, Key::RIGHT),
    row(Button::Up, Key::UP),
    row(Button::Down, Key::DOWN),
    row(Button::Ok, Key::ENTER),
    // Fullscreen playback
    row(Button::Enter, Key::TAB),
    // Context menu
    row(Button::Mode, Key::C),
    row(Button::Delete, Key::BACKSPACE),
    row(Button::Exit, Key::ESC),
    row(Button::Epg, Key::E),
    row(Button::Info, Key::I),
    row(Button::Stop, Key::X),
    row(Button::Play, Key::P),
    row(Button::Pause, Key::SPACE),
    row(Button::Record, Key::B),
    row(Button::Rewind, Key::R),
    row(Button::FastForward, Key::F),
    row(Button::Previous, Key::APOSTROPHE),
    row(Button::Next, Key::DOT),
    row(Button::Subtitle, Key::T),
    // Codec info
    row(Button::Blue, Key::O),
    // Toggle watched
    row(Button::Red, Key::W),
    // Shutdown menu
    row(Button::Green, Key::S),
    row(Button::Yellow, Key::DELETE),
    row(Button::Numeric1, Key::KEY_1),
    row(Button::Numeric2, Key::KEY_2),
    row(Button::Numeric3, Key::KEY_3),
    row(Button::Numeric4, Key::KEY_4),
    row(Button::Numeric5, Key::KEY_5),
    row(Button::Numeric6, Key::KEY_6),
    row(Button::Numeric7, Key::KEY_7),
    row(Button::Numeric8, Key::KEY_8),
    row(Button::Numeric9, Key::KEY_9),
    row(Button::Numeric0, Key::KEY_0),
    row(Button::ChannelUp, Key::PAGE_UP),
    row(Button::ChannelDown, Key::PAGE_DOWN),
    // Zoom / aspect ratio
    row(Button::Media, Key::Z),
    row(Button::Mute, Key::MUTE),
    row(Button::VolumeUp, Key::VOLUMEUP),
    row(Button::VolumeDown, Key::VOLUMEDOWN),
    // Audio delay
    int422(Button::Audio, Modifiers::empty(), Key::A),
    // Visualisation settings
    int422(Button::Mode, Modifiers::empty(), Key::V),
    // Choose player
    int422(Button::Player, Modifiers::empty(), Key::Y),
    // Screenshot
    row(Button::Record, Key::SYSRQ),
    // Move subtitles
    int422(Button::BrightnessDown, Modifiers::CTRL, Key::DOWN),
    int422(Button::BrightnessUp, Modifiers::CTRL, Key::UP),
];

/// Named built-in keymaps
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Layout {
    #[strum(serialize = "mce-kodi")]
    MceKodi,
    #[default]
    #[strum(serialize = "int422-kodi")]
    Int422Kodi,
}

impl Layout {
    pub fn remote(self) -> Remote {
        match self {
            Layout::MceKodi => Remote::Mce,
            Layout::Int422Kodi => Remote::Int422,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Layout::MceKodi => "Windows MCE remote, Kodi keyboard controls",
            Layout::Int422Kodi => "Inteset INT422 (Kodi/PC preset), Kodi keyboard controls",
        }
    }

    /// Table rows for this layout, duplicates included, in priority order
    pub fn entries(self) -> Vec<KeyMapping> {
        let remote = self.remote();
        KODI.iter()
            .filter(|r| r.fit == Fit::All || remote == Remote::Int422)
            .map(|r| KeyMapping::new(remote.code(r.button), Combo::new(r.modifiers, r.key)))
            .collect()
    }

    /// Resolved keymap for this layout
    pub fn keymap(self) -> Keymap {
        let mut keymap = Keymap::new(<&'static str>::from(self));
        keymap.extend_fallback(self.entries());
        keymap
    }
}
