//! Wire command parsing — `name(arg1,arg2,...)` text into [`Command`].
//!
//! Parsing is pure: no buffer or settings access happens here. Index bounds
//! depend on the live strip length and are checked at dispatch time.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::color::{format_color, parse_color};
use crate::settings::SettingValue;

/// A validated strip command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// `pixel(n,color)` — set one slot.
    Pixel { index: usize, color: u32 },
    /// `stroke(n,m,color)` — set slots `n..=m`.
    Stroke { from: usize, to: usize, color: u32 },
    /// `clear()` — turn every slot off.
    Clear,
    /// `fill(color)` — set every slot.
    Fill { color: u32 },
    /// `settings(key,value)` — rewrite one key of the settings file.
    #[serde(rename = "settings")]
    SetSetting { key: String, value: SettingValue },
    /// `restart()` — exit so the supervisor respawns the process.
    Restart,
}

impl Command {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Pixel { .. } => "pixel",
            Command::Stroke { .. } => "stroke",
            Command::Clear => "clear",
            Command::Fill { .. } => "fill",
            Command::SetSetting { .. } => "settings",
            Command::Restart => "restart",
        }
    }
}

/// Canonical wire form; [`parse`] accepts it back.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pixel { index, color } => {
                write!(f, "pixel({index},{})", format_color(*color))
            }
            Command::Stroke { from, to, color } => {
                write!(f, "stroke({from},{to},{})", format_color(*color))
            }
            Command::Clear => write!(f, "clear()"),
            Command::Fill { color } => write!(f, "fill({})", format_color(*color)),
            Command::SetSetting { key, value } => write!(f, "settings({key},{value})"),
            Command::Restart => write!(f, "restart()"),
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_text(s)
    }
}

/// Reasons a datagram could not be parsed into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Payload is not valid UTF-8.
    NotUtf8,
    /// Payload is empty after whitespace removal.
    Empty,
    /// Missing `(` or closing `)`.
    MalformedSyntax(&'static str),
    /// Name is not one of the known commands (names are case-sensitive).
    UnknownCommand(String),
    /// Known command called with the wrong number of arguments.
    WrongArity {
        command: &'static str,
        expected: usize,
        found: usize,
    },
    /// Index argument is not a non-negative integer.
    InvalidIndex(String),
    /// Color argument is neither `0x` hex nor a decimal integer.
    InvalidColor(String),
    /// Color argument is wider than 24 bits.
    ColorOutOfRange(u64),
    /// `stroke` start is past its end.
    ReversedRange { from: usize, to: usize },
    /// `settings` key is empty.
    EmptyKey,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NotUtf8 => write!(f, "payload is not valid UTF-8"),
            ParseError::Empty => write!(f, "empty command"),
            ParseError::MalformedSyntax(reason) => write!(f, "malformed syntax: {reason}"),
            ParseError::UnknownCommand(name) => write!(f, "unknown command \"{name}\""),
            ParseError::WrongArity {
                command,
                expected,
                found,
            } => write!(
                f,
                "{command}() takes {expected} argument{}, got {found}",
                if *expected == 1 { "" } else { "s" }
            ),
            ParseError::InvalidIndex(s) => write!(f, "invalid index \"{s}\""),
            ParseError::InvalidColor(s) => write!(f, "invalid color \"{s}\""),
            ParseError::ColorOutOfRange(v) => {
                write!(f, "color {v:#X} exceeds 0xFFFFFF")
            }
            ParseError::ReversedRange { from, to } => {
                write!(f, "stroke start {from} is past end {to}")
            }
            ParseError::EmptyKey => write!(f, "settings key is empty"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a raw datagram payload.
pub fn parse(payload: &[u8]) -> Result<Command, ParseError> {
    let text = std::str::from_utf8(payload).map_err(|_| ParseError::NotUtf8)?;
    parse_text(text)
}

/// Parse command text.
///
/// All whitespace is removed first, so `pixel( 3 , 0xFF0000 )` and
/// `pixel(3,0xFF0000)` are equivalent.
pub fn parse_text(text: &str) -> Result<Command, ParseError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ParseError::Empty);
    }
    let Some(body) = compact.strip_suffix(')') else {
        return Err(ParseError::MalformedSyntax("missing closing parenthesis"));
    };
    let Some((name, blob)) = body.split_once('(') else {
        return Err(ParseError::MalformedSyntax("missing opening parenthesis"));
    };
    // Closing paren is already gone, so `clear()` yields no tokens rather
    // than a single empty one.
    let args: Vec<&str> = if blob.is_empty() {
        Vec::new()
    } else {
        blob.split(',').collect()
    };

    match name {
        "pixel" => {
            expect_arity("pixel", &args, 2)?;
            Ok(Command::Pixel {
                index: parse_index(args[0])?,
                color: parse_color(args[1])?,
            })
        }
        "stroke" => {
            expect_arity("stroke", &args, 3)?;
            let from = parse_index(args[0])?;
            let to = parse_index(args[1])?;
            let color = parse_color(args[2])?;
            if from > to {
                return Err(ParseError::ReversedRange { from, to });
            }
            Ok(Command::Stroke { from, to, color })
        }
        "clear" => {
            expect_arity("clear", &args, 0)?;
            Ok(Command::Clear)
        }
        "fill" => {
            expect_arity("fill", &args, 1)?;
            Ok(Command::Fill {
                color: parse_color(args[0])?,
            })
        }
        "settings" => {
            expect_arity("settings", &args, 2)?;
            if args[0].is_empty() {
                return Err(ParseError::EmptyKey);
            }
            Ok(Command::SetSetting {
                key: args[0].to_string(),
                value: SettingValue::from_token(args[1]),
            })
        }
        "restart" => {
            expect_arity("restart", &args, 0)?;
            Ok(Command::Restart)
        }
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn expect_arity(command: &'static str, args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::WrongArity {
            command,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

/// Plain decimal digits only. A value too wide for `usize` can never be in
/// bounds and is reported as an invalid index.
fn parse_index(token: &str) -> Result<usize, ParseError> {
    if !token.bytes().all(|b| b.is_ascii_digit()) || token.is_empty() {
        return Err(ParseError::InvalidIndex(token.to_string()));
    }
    token
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidIndex(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── well-formed commands ──

    #[test]
    fn parse_pixel() {
        assert_eq!(
            parse(b"pixel(2,0xFFFFFF)").unwrap(),
            Command::Pixel {
                index: 2,
                color: 0xFF_FFFF
            }
        );
    }

    #[test]
    fn parse_stroke() {
        assert_eq!(
            parse(b"stroke(2,6,0x00FF00)").unwrap(),
            Command::Stroke {
                from: 2,
                to: 6,
                color: 0x00_FF00
            }
        );
    }

    #[test]
    fn parse_stroke_single_slot() {
        assert_eq!(
            parse_text("stroke(4,4,0x1)").unwrap(),
            Command::Stroke {
                from: 4,
                to: 4,
                color: 1
            }
        );
    }

    #[test]
    fn parse_clear_fill_restart() {
        assert_eq!(parse(b"clear()").unwrap(), Command::Clear);
        assert_eq!(
            parse(b"fill(0xFFFFFF)").unwrap(),
            Command::Fill { color: 0xFF_FFFF }
        );
        assert_eq!(parse(b"restart()").unwrap(), Command::Restart);
    }

    #[test]
    fn parse_settings_integer_value() {
        assert_eq!(
            parse(b"settings(pixel_count,360)").unwrap(),
            Command::SetSetting {
                key: "pixel_count".into(),
                value: SettingValue::Integer(360)
            }
        );
    }

    #[test]
    fn parse_settings_text_value() {
        assert_eq!(
            parse(b"settings(name,porch)").unwrap(),
            Command::SetSetting {
                key: "name".into(),
                value: SettingValue::Text("porch".into())
            }
        );
    }

    #[test]
    fn parse_decimal_color() {
        assert_eq!(
            parse(b"fill(255)").unwrap(),
            Command::Fill { color: 0xFF }
        );
    }

    // ── whitespace ──

    #[test]
    fn whitespace_is_stripped_everywhere() {
        assert_eq!(
            parse(b"  pixel ( 3 ,\t0xFF0000 )\n").unwrap(),
            Command::Pixel {
                index: 3,
                color: 0xFF_0000
            }
        );
    }

    #[test]
    fn trailing_newline_from_netcat() {
        assert_eq!(parse(b"clear()\n").unwrap(), Command::Clear);
    }

    // ── syntax errors ──

    #[test]
    fn missing_closing_paren() {
        assert!(matches!(
            parse(b"pixel(1,0xFF0000"),
            Err(ParseError::MalformedSyntax(_))
        ));
    }

    #[test]
    fn missing_opening_paren() {
        assert!(matches!(
            parse(b"clear)"),
            Err(ParseError::MalformedSyntax(_))
        ));
    }

    #[test]
    fn bare_name_is_malformed() {
        assert!(matches!(
            parse(b"clear"),
            Err(ParseError::MalformedSyntax(_))
        ));
    }

    #[test]
    fn empty_payload() {
        assert_eq!(parse(b""), Err(ParseError::Empty));
        assert_eq!(parse(b" \n "), Err(ParseError::Empty));
    }

    #[test]
    fn invalid_utf8() {
        assert_eq!(parse(&[0xFF, 0xFE, b'(', b')']), Err(ParseError::NotUtf8));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse(b"blink(1)"),
            Err(ParseError::UnknownCommand("blink".into()))
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(
            parse(b"Pixel(1,0x1)"),
            Err(ParseError::UnknownCommand("Pixel".into()))
        );
    }

    // ── arity ──

    #[test]
    fn pixel_wrong_arity() {
        assert_eq!(
            parse(b"pixel(1)"),
            Err(ParseError::WrongArity {
                command: "pixel",
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn clear_with_argument() {
        assert_eq!(
            parse(b"clear(1)"),
            Err(ParseError::WrongArity {
                command: "clear",
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn fill_without_argument() {
        assert_eq!(
            parse(b"fill()"),
            Err(ParseError::WrongArity {
                command: "fill",
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn trailing_comma_is_an_empty_argument() {
        assert_eq!(
            parse(b"pixel(1,)"),
            Err(ParseError::InvalidColor(String::new()))
        );
    }

    // ── argument values ──

    #[test]
    fn non_numeric_color() {
        assert_eq!(
            parse(b"fill(red)"),
            Err(ParseError::InvalidColor("red".into()))
        );
    }

    #[test]
    fn color_wider_than_24_bits() {
        assert_eq!(
            parse(b"fill(0x1FFFFFF)"),
            Err(ParseError::ColorOutOfRange(0x1FF_FFFF))
        );
    }

    #[test]
    fn negative_index() {
        assert_eq!(
            parse(b"pixel(-1,0x1)"),
            Err(ParseError::InvalidIndex("-1".into()))
        );
    }

    #[test]
    fn hex_index_rejected() {
        assert_eq!(
            parse(b"pixel(0x1,0x1)"),
            Err(ParseError::InvalidIndex("0x1".into()))
        );
    }

    #[test]
    fn index_wider_than_usize_is_invalid_index() {
        let huge = "99999999999999999999999999";
        assert_eq!(
            parse(format!("pixel({huge},0x1)").as_bytes()),
            Err(ParseError::InvalidIndex(huge.into()))
        );
        assert!(matches!(
            parse(format!("stroke(0,{huge},0x1)").as_bytes()),
            Err(ParseError::InvalidIndex(_))
        ));
    }

    #[test]
    fn plus_signed_index_rejected() {
        assert_eq!(
            parse(b"pixel(+1,0x1)"),
            Err(ParseError::InvalidIndex("+1".into()))
        );
    }

    #[test]
    fn stroke_reversed_range() {
        assert_eq!(
            parse(b"stroke(6,2,0xFFFFFF)"),
            Err(ParseError::ReversedRange { from: 6, to: 2 })
        );
    }

    #[test]
    fn settings_empty_key() {
        assert_eq!(parse(b"settings(,5)"), Err(ParseError::EmptyKey));
    }

    #[test]
    fn extra_closing_paren_lands_in_last_token() {
        assert_eq!(
            parse(b"fill(0x1))"),
            Err(ParseError::InvalidColor("0x1)".into()))
        );
    }

    // ── canonical form ──

    #[test]
    fn display_is_canonical_wire_form() {
        let cmd = parse(b"stroke( 1 , 3 , 255 )").unwrap();
        assert_eq!(cmd.to_string(), "stroke(1,3,0x0000FF)");
        assert_eq!(Command::Clear.to_string(), "clear()");
    }

    #[test]
    fn display_parses_back() {
        let cmd = Command::SetSetting {
            key: "brightness".into(),
            value: SettingValue::Integer(100),
        };
        assert_eq!(cmd.to_string().parse::<Command>().unwrap(), cmd);
    }

    #[test]
    fn name_matches_wire_name() {
        assert_eq!(Command::Restart.name(), "restart");
        assert_eq!(
            Command::SetSetting {
                key: "k".into(),
                value: SettingValue::Integer(1)
            }
            .name(),
            "settings"
        );
    }

    #[test]
    fn serializes_with_command_tag() {
        let json = serde_json::to_value(Command::Pixel {
            index: 3,
            color: 0xFF_0000,
        })
        .unwrap();
        assert_eq!(json["command"], "pixel");
        assert_eq!(json["index"], 3);
        assert_eq!(json["color"], 0xFF_0000);
    }

    #[test]
    fn settings_serializes_untagged_value() {
        let json = serde_json::to_value(Command::SetSetting {
            key: "brightness".into(),
            value: SettingValue::Integer(100),
        })
        .unwrap();
        assert_eq!(json["command"], "settings");
        assert_eq!(json["value"], 100);
    }

    // ── error messages ──

    #[test]
    fn wrong_arity_message() {
        let e = ParseError::WrongArity {
            command: "fill",
            expected: 1,
            found: 3,
        };
        assert_eq!(e.to_string(), "fill() takes 1 argument, got 3");
    }

    #[test]
    fn out_of_range_message() {
        assert_eq!(
            ParseError::ColorOutOfRange(0x100_0000).to_string(),
            "color 0x1000000 exceeds 0xFFFFFF"
        );
    }
}
