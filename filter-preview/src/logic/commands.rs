//! Interactive commands
//!
//! One command per stdin line. Control commands stand in for the mode
//! selector, the intensity sliders and the color picker.

use image_filter::{ColorRange, FilterConfig, FilterMode};
use std::{path::PathBuf, str::FromStr};

pub const HELP: &str = "\
commands:
  mode <none|grayscale|blur|edge|color>
  gray <0.0..1.0>        grayscale intensity
  blur <0..50>           gaussian blur intensity
  threshold <0..255>     edge threshold
  color <red|green|blue|none>
  load <path>            load another image
  next                   load the next image of the input directory
  show                   print the current controls
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mode(FilterMode),
    Gray(f32),
    Blur(u32),
    Threshold(u32),
    Color(Option<ColorRange>),
    Load(PathBuf),
    Next,
    Show,
    Help,
    Quit,
}

impl Command {
    /// Writes a control change into `config`. Returns false for commands
    /// that do not touch the controls.
    pub fn apply_to(&self, config: &mut FilterConfig) -> bool {
        match self {
            Command::Mode(mode) => config.mode = *mode,
            Command::Gray(v) => config.grayscale_intensity = *v,
            Command::Blur(v) => config.blur_intensity = *v,
            Command::Threshold(v) => config.edge_threshold = *v,
            Command::Color(color) => config.color = *color,
            _ => return false,
        }

        true
    }
}

fn arg<'a>(name: &str, arg: Option<&'a str>) -> Result<&'a str, String> {
    arg.ok_or_else(|| format!("`{name}` needs an argument, try `help`"))
}

fn number<T: FromStr>(name: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("`{name}` expects a number, got `{value}`"))
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (line, None),
        };

        match name.to_lowercase().as_str() {
            "mode" => Ok(Command::Mode(arg(name, rest)?.parse()?)),
            "gray" | "grayscale" => Ok(Command::Gray(number(name, arg(name, rest)?)?)),
            "blur" => Ok(Command::Blur(number(name, arg(name, rest)?)?)),
            "threshold" | "edge" => Ok(Command::Threshold(number(name, arg(name, rest)?)?)),
            "color" | "colour" => Ok(Command::Color(ColorRange::parse_selection(
                rest.unwrap_or("none"),
            )?)),
            "load" | "open" => Ok(Command::Load(PathBuf::from(arg(name, rest)?))),
            "next" => Ok(Command::Next),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command `{other}`, try `help`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            "mode edge".parse::<Command>(),
            Ok(Command::Mode(FilterMode::EdgeDetection))
        );
        assert_eq!("gray 0.25".parse::<Command>(), Ok(Command::Gray(0.25)));
        assert_eq!("  BLUR 7 ".parse::<Command>(), Ok(Command::Blur(7)));
        assert_eq!("threshold 0".parse::<Command>(), Ok(Command::Threshold(0)));
        assert_eq!(
            "color green".parse::<Command>(),
            Ok(Command::Color(Some(ColorRange::Green)))
        );
        assert_eq!("color".parse::<Command>(), Ok(Command::Color(None)));
        assert_eq!(
            "load my photos/a.png".parse::<Command>(),
            Ok(Command::Load(PathBuf::from("my photos/a.png")))
        );
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("mode".parse::<Command>().is_err());
        assert!("mode sepia".parse::<Command>().is_err());
        assert!("blur lots".parse::<Command>().is_err());
        assert!("threshold -1".parse::<Command>().is_err());
        assert!("color purple".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn test_apply_to() {
        let mut config = FilterConfig::new();

        assert!(Command::Mode(FilterMode::ColorDetection).apply_to(&mut config));
        assert!(Command::Color(Some(ColorRange::Blue)).apply_to(&mut config));
        assert!(Command::Blur(12).apply_to(&mut config));
        assert!(!Command::Show.apply_to(&mut config));
        assert!(!Command::Next.apply_to(&mut config));

        assert_eq!(config.mode, FilterMode::ColorDetection);
        assert_eq!(config.color, Some(ColorRange::Blue));
        assert_eq!(config.blur_intensity, 12);
    }
}
