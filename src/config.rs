use std::path::PathBuf;

use clap::Parser;

use crate::canvas::Rgb;
use crate::error::{ShowError, ShowResult};

#[derive(Parser, Debug, Clone)]
#[command(name = "skywriter", version)]
#[command(about = "Fireworks that spell out a message, then float it away on balloons")]
pub struct Cli {
    /// Message to spell out. Whitespace is skipped.
    #[arg(default_value = "HAPPY BIRTHDAY!")]
    pub message: String,

    /// Background color as hex (e.g. 1a1b26)
    #[arg(long, value_name = "RRGGBB")]
    pub bg_color: Option<String>,

    /// Canvas units per terminal pixel (a cell is two pixels tall)
    #[arg(long, default_value_t = 8.0)]
    pub scale: f32,

    /// Seed for the random source, for a repeatable show
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ring the terminal bell on every explosion (after the first key press)
    #[arg(long)]
    pub bell: bool,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated settings for one show.
#[derive(Debug, Clone)]
pub struct ShowConfig {
    pub letters: Vec<char>,
    pub bg_color: Rgb,
    pub scale: f32,
    pub seed: Option<u64>,
    pub bell: bool,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            letters: spelled_letters("HAPPY BIRTHDAY!"),
            bg_color: (0, 0, 0),
            scale: 8.0,
            seed: None,
            bell: false,
        }
    }
}

impl ShowConfig {
    pub fn from_cli(cli: &Cli) -> ShowResult<Self> {
        let letters = spelled_letters(&cli.message);
        if letters.is_empty() {
            return Err(ShowError::config("message has no visible characters"));
        }

        let bg_color = match cli.bg_color.as_deref() {
            Some(hex) => parse_hex_color(hex).ok_or_else(|| {
                ShowError::config(format!(
                    "invalid hex color {hex:?}, expected RRGGBB (e.g. 1a1b26)"
                ))
            })?,
            None => (0, 0, 0),
        };

        if !cli.scale.is_finite() || cli.scale <= 0.0 {
            return Err(ShowError::config(format!(
                "scale must be a positive number, got {}",
                cli.scale
            )));
        }

        Ok(Self {
            letters,
            bg_color,
            scale: cli.scale,
            seed: cli.seed,
            bell: cli.bell,
        })
    }
}

/// The characters that get a firework each, in order.
pub fn spelled_letters(message: &str) -> Vec<char> {
    message.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("skywriter").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_spell_happy_birthday() {
        let config = ShowConfig::from_cli(&cli(&[])).unwrap();
        assert_eq!(config.letters.iter().collect::<String>(), "HAPPYBIRTHDAY!");
        assert_eq!(config.bg_color, (0, 0, 0));
        assert_eq!(config.scale, 8.0);
        assert!(!config.bell);
    }

    #[test]
    fn whitespace_is_skipped() {
        assert_eq!(spelled_letters(" H I\t"), vec!['H', 'I']);
    }

    #[test]
    fn blank_message_is_rejected() {
        let err = ShowConfig::from_cli(&cli(&["   "])).unwrap_err();
        assert!(matches!(err, ShowError::Config(_)));
    }

    #[test]
    fn bg_color_accepts_hash_prefix() {
        let config = ShowConfig::from_cli(&cli(&["--bg-color", "#1a1b26"])).unwrap();
        assert_eq!(config.bg_color, (0x1a, 0x1b, 0x26));
    }

    #[test]
    fn malformed_bg_color_is_rejected() {
        assert!(parse_hex_color("12345").is_none());
        assert!(parse_hex_color("zz0000").is_none());
        assert!(ShowConfig::from_cli(&cli(&["--bg-color", "nope"])).is_err());
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        assert!(ShowConfig::from_cli(&cli(&["--scale", "0"])).is_err());
        assert!(ShowConfig::from_cli(&cli(&["--scale=-2"])).is_err());
    }
}
