use crate::error::{Result, RokuError};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use std::str::FromStr;

/// Key token prefix for literal characters (`Lit_<char>`)
pub const LITERAL_TOKEN: &str = "Lit";

/// Symbolic name of the literal command
pub const LITERAL_COMMAND: &str = "literal";

/// Application id of the channel store
pub const STORE_APP_ID: &str = "11";

/// Characters escaped when a literal character is placed in a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'|')
    .add(b'^')
    .add(b'[')
    .add(b']')
    .add(b'%');

/// Remote-control keys understood by `/keypress/<token>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Home,
    Reverse,
    Forward,
    Play,
    Select,
    Left,
    Right,
    Down,
    Up,
    Back,
    Replay,
    Info,
    Backspace,
    Search,
    Enter,
    // TV only
    ChannelDown,
    ChannelUp,
    Mute,
    Power,
    PowerOn,
    PowerOff,
    VolumeDown,
    VolumeUp,
}

impl Key {
    /// Keys every Roku accepts
    pub const BASE: [Key; 15] = [
        Key::Home,
        Key::Reverse,
        Key::Forward,
        Key::Play,
        Key::Select,
        Key::Left,
        Key::Right,
        Key::Down,
        Key::Up,
        Key::Back,
        Key::Replay,
        Key::Info,
        Key::Backspace,
        Key::Search,
        Key::Enter,
    ];

    /// Keys only Roku TVs accept
    pub const TV: [Key; 8] = [
        Key::ChannelDown,
        Key::ChannelUp,
        Key::Mute,
        Key::Power,
        Key::PowerOn,
        Key::PowerOff,
        Key::VolumeDown,
        Key::VolumeUp,
    ];

    /// Symbolic command name, e.g. `volume_up`
    pub fn name(self) -> &'static str {
        match self {
            Key::Home => "home",
            Key::Reverse => "reverse",
            Key::Forward => "forward",
            Key::Play => "play",
            Key::Select => "select",
            Key::Left => "left",
            Key::Right => "right",
            Key::Down => "down",
            Key::Up => "up",
            Key::Back => "back",
            Key::Replay => "replay",
            Key::Info => "info",
            Key::Backspace => "backspace",
            Key::Search => "search",
            Key::Enter => "enter",
            Key::ChannelDown => "channel_down",
            Key::ChannelUp => "channel_up",
            Key::Mute => "mute",
            Key::Power => "power",
            Key::PowerOn => "power_on",
            Key::PowerOff => "power_off",
            Key::VolumeDown => "volume_down",
            Key::VolumeUp => "volume_up",
        }
    }

    /// Protocol token sent in the keypress path, e.g. `VolumeUp`
    pub fn token(self) -> &'static str {
        match self {
            Key::Home => "Home",
            Key::Reverse => "Rev",
            Key::Forward => "Fwd",
            Key::Play => "Play",
            Key::Select => "Select",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Down => "Down",
            Key::Up => "Up",
            Key::Back => "Back",
            Key::Replay => "InstantReplay",
            Key::Info => "Info",
            Key::Backspace => "Backspace",
            Key::Search => "Search",
            Key::Enter => "Enter",
            Key::ChannelDown => "ChannelDown",
            Key::ChannelUp => "ChannelUp",
            Key::Mute => "VolumeMute",
            Key::Power => "Power",
            Key::PowerOn => "PowerOn",
            Key::PowerOff => "PowerOff",
            Key::VolumeDown => "VolumeDown",
            Key::VolumeUp => "VolumeUp",
        }
    }

    /// Whether the key is only available on TVs
    pub fn is_tv_only(self) -> bool {
        Key::TV.contains(&self)
    }

    /// Keypress path for this key
    pub fn path(self) -> String {
        format!("/keypress/{}", self.token())
    }

    /// Look up a key by its symbolic name
    pub fn from_name(name: &str) -> Option<Key> {
        Key::BASE
            .iter()
            .chain(Key::TV.iter())
            .copied()
            .find(|key| key.name() == name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Motion sensors fed through `/input`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    Acceleration,
    Magnetic,
    Orientation,
    Rotation,
}

impl Sensor {
    pub const ALL: [Sensor; 4] = [
        Sensor::Acceleration,
        Sensor::Magnetic,
        Sensor::Orientation,
        Sensor::Rotation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sensor::Acceleration => "acceleration",
            Sensor::Magnetic => "magnetic",
            Sensor::Orientation => "orientation",
            Sensor::Rotation => "rotation",
        }
    }

    pub fn from_name(name: &str) -> Option<Sensor> {
        Sensor::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// Input parameters for one reading, keyed `<sensor>.x`, `<sensor>.y`, `<sensor>.z`
    pub fn params(self, x: f64, y: f64, z: f64) -> Vec<(String, String)> {
        [("x", x), ("y", y), ("z", z)]
            .into_iter()
            .map(|(axis, value)| (format!("{}.{}", self.name(), axis), value.to_string()))
            .collect()
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A remote-control action resolved from its symbolic name
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Single key press
    Key(Key),
    /// Type a string one character at a time
    Literal(String),
    /// One motion sensor reading
    Sensor { sensor: Sensor, x: f64, y: f64, z: f64 },
}

impl Command {
    /// Resolve a command name and its arguments
    ///
    /// Sensors take exactly three numeric arguments, `literal` takes exactly
    /// one string, every other key takes none. Anything else is rejected
    /// with [`RokuError::UnsupportedCommand`].
    ///
    /// ```
    /// use roku_ecp::{Command, Key, Sensor};
    ///
    /// assert_eq!(Command::parse("home", &[]).unwrap(), Command::Key(Key::Home));
    /// assert_eq!(
    ///     Command::parse("rotation", &["1", "2.5", "-3"]).unwrap(),
    ///     Command::Sensor { sensor: Sensor::Rotation, x: 1.0, y: 2.5, z: -3.0 },
    /// );
    /// assert!(Command::parse("fly", &[]).is_err());
    /// ```
    pub fn parse(name: &str, args: &[&str]) -> Result<Self> {
        if let Some(sensor) = Sensor::from_name(name) {
            let values = args
                .iter()
                .map(|arg| arg.trim().parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    RokuError::UnsupportedCommand(format!("{}: invalid sensor value: {}", name, e))
                })?;
            if let Some(value) = values.iter().find(|v| !v.is_finite()) {
                return Err(RokuError::UnsupportedCommand(format!(
                    "{}: sensor value {} is not finite",
                    name, value
                )));
            }
            return match values.as_slice() {
                [x, y, z] => Ok(Command::Sensor {
                    sensor,
                    x: *x,
                    y: *y,
                    z: *z,
                }),
                _ => Err(RokuError::UnsupportedCommand(format!(
                    "{} takes 3 arguments, got {}",
                    name,
                    values.len()
                ))),
            };
        }

        if name == LITERAL_COMMAND {
            return match args {
                [text] => Ok(Command::Literal((*text).to_string())),
                _ => Err(RokuError::UnsupportedCommand(format!(
                    "{} takes 1 argument, got {}",
                    name,
                    args.len()
                ))),
            };
        }

        let key = Key::from_name(name).ok_or_else(|| {
            RokuError::UnsupportedCommand(format!("{} is not a valid key or sensor", name))
        })?;

        if !args.is_empty() {
            return Err(RokuError::UnsupportedCommand(format!(
                "{} takes no arguments, got {}",
                name,
                args.len()
            )));
        }

        Ok(Command::Key(key))
    }

    /// Symbolic name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::Key(key) => key.name(),
            Command::Literal(_) => LITERAL_COMMAND,
            Command::Sensor { sensor, .. } => sensor.name(),
        }
    }
}

/// Keypress paths for typing `text`, one per character
///
/// Each character is uppercased and escaped for use in a path segment.
pub fn literal_paths(text: &str) -> Vec<String> {
    text.chars()
        .map(|c| {
            let upper: String = c.to_uppercase().collect();
            format!(
                "/keypress/{}_{}",
                LITERAL_TOKEN,
                utf8_percent_encode(&upper, PATH_SEGMENT)
            )
        })
        .collect()
}

/// Touch operations accepted by `touch.0.op`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TouchOp {
    Up,
    #[default]
    Down,
    Press,
    Move,
    Cancel,
}

impl TouchOp {
    pub const ALL: [TouchOp; 5] = [
        TouchOp::Up,
        TouchOp::Down,
        TouchOp::Press,
        TouchOp::Move,
        TouchOp::Cancel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TouchOp::Up => "up",
            TouchOp::Down => "down",
            TouchOp::Press => "press",
            TouchOp::Move => "move",
            TouchOp::Cancel => "cancel",
        }
    }
}

impl FromStr for TouchOp {
    type Err = RokuError;

    fn from_str(s: &str) -> Result<Self> {
        TouchOp::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| RokuError::InvalidArgument(format!("{} is not a valid touch operation", s)))
    }
}

impl fmt::Display for TouchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical inputs of a Roku TV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TvInput {
    Av1,
    Hdmi1,
    Hdmi2,
    Hdmi3,
    Hdmi4,
    Tuner,
}

impl TvInput {
    pub const ALL: [TvInput; 6] = [
        TvInput::Av1,
        TvInput::Hdmi1,
        TvInput::Hdmi2,
        TvInput::Hdmi3,
        TvInput::Hdmi4,
        TvInput::Tuner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TvInput::Av1 => "AV1",
            TvInput::Hdmi1 => "HDMI1",
            TvInput::Hdmi2 => "HDMI2",
            TvInput::Hdmi3 => "HDMI3",
            TvInput::Hdmi4 => "HDMI4",
            TvInput::Tuner => "Tuner",
        }
    }

    /// Keypress path that switches to this input
    pub fn path(self) -> String {
        format!("/keypress/Input{}", self.as_str())
    }
}

impl FromStr for TvInput {
    type Err = RokuError;

    fn from_str(s: &str) -> Result<Self> {
        TvInput::ALL
            .iter()
            .copied()
            .find(|input| input.as_str() == s)
            .ok_or_else(|| RokuError::InvalidArgument(format!("{} is not a valid TV input", s)))
    }
}

impl fmt::Display for TvInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        for key in Key::BASE.iter().chain(Key::TV.iter()) {
            assert_eq!(Key::from_name(key.name()), Some(*key));
        }
        assert_eq!(Key::from_name("fly"), None);
        assert_eq!(Key::from_name("literal"), None);
    }

    #[test]
    fn test_key_tokens() {
        assert_eq!(Key::Reverse.path(), "/keypress/Rev");
        assert_eq!(Key::Replay.token(), "InstantReplay");
        assert_eq!(Key::Mute.token(), "VolumeMute");
        assert!(Key::VolumeUp.is_tv_only());
        assert!(!Key::Home.is_tv_only());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(Command::parse("play", &[]).unwrap(), Command::Key(Key::Play));
        assert_eq!(
            Command::parse("channel_up", &[]).unwrap(),
            Command::Key(Key::ChannelUp)
        );
    }

    #[test]
    fn test_parse_unknown() {
        match Command::parse("fly", &[]) {
            Err(RokuError::UnsupportedCommand(msg)) => assert!(msg.contains("fly")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_argument_mismatch() {
        assert!(matches!(
            Command::parse("home", &["x"]),
            Err(RokuError::UnsupportedCommand(_))
        ));
        assert!(matches!(
            Command::parse("acceleration", &["1", "2"]),
            Err(RokuError::UnsupportedCommand(_))
        ));
        assert!(matches!(
            Command::parse("magnetic", &["1", "two", "3"]),
            Err(RokuError::UnsupportedCommand(_))
        ));
        assert!(matches!(
            Command::parse("literal", &[]),
            Err(RokuError::UnsupportedCommand(_))
        ));
    }

    #[test]
    fn test_parse_sensor_rejects_non_finite() {
        for bad in ["nan", "inf", "-inf"] {
            assert!(matches!(
                Command::parse("acceleration", &["1", bad, "3"]),
                Err(RokuError::UnsupportedCommand(_))
            ));
        }
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(
            Command::parse("literal", &["Hi!"]).unwrap(),
            Command::Literal("Hi!".to_string())
        );
    }

    #[test]
    fn test_sensor_params() {
        let params = Sensor::Orientation.params(1.0, -2.5, 0.0);
        assert_eq!(
            params,
            vec![
                ("orientation.x".to_string(), "1".to_string()),
                ("orientation.y".to_string(), "-2.5".to_string()),
                ("orientation.z".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_literal_paths() {
        assert_eq!(
            literal_paths("Hi!"),
            vec!["/keypress/Lit_H", "/keypress/Lit_I", "/keypress/Lit_!"]
        );
        assert_eq!(literal_paths("a b"), vec!["/keypress/Lit_A", "/keypress/Lit_%20", "/keypress/Lit_B"]);
        assert_eq!(literal_paths("é"), vec!["/keypress/Lit_%C3%89"]);
        assert!(literal_paths("").is_empty());
        // `\` would otherwise be read as a path separator
        assert_eq!(
            literal_paths("\\|^[]"),
            vec![
                "/keypress/Lit_%5C",
                "/keypress/Lit_%7C",
                "/keypress/Lit_%5E",
                "/keypress/Lit_%5B",
                "/keypress/Lit_%5D",
            ]
        );
    }

    #[test]
    fn test_touch_op_parse() {
        assert_eq!("press".parse::<TouchOp>().unwrap(), TouchOp::Press);
        assert!(matches!(
            "spin".parse::<TouchOp>(),
            Err(RokuError::InvalidArgument(_))
        ));
        assert_eq!(TouchOp::default(), TouchOp::Down);
    }

    #[test]
    fn test_tv_input_parse() {
        assert_eq!("HDMI3".parse::<TvInput>().unwrap(), TvInput::Hdmi3);
        assert_eq!(TvInput::Tuner.path(), "/keypress/InputTuner");
        assert!(matches!(
            "HDMI5".parse::<TvInput>(),
            Err(RokuError::InvalidArgument(_))
        ));
    }
}
