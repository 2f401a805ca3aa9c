//! Color parsing and formatting for strip slots.
//!
//! Slots hold 24-bit `0xRRGGBB` values. On the wire colors are either
//! `0x`-prefixed hexadecimal or plain decimal integers.

use crate::command::ParseError;

/// Largest representable slot color.
pub const MAX_COLOR: u32 = 0xFF_FFFF;

/// Slot value for an unlit pixel.
pub const OFF: u32 = 0x00_0000;

/// Ready flash color.
pub const GREEN: u32 = 0x00_FF00;

/// Error flash color.
pub const RED: u32 = 0xFF_0000;

/// Parse a color token into a 24-bit `0xRRGGBB` value.
///
/// Accepts:
/// - Hex: `"0xFF0000"`, `"0Xff0000"`, `"0x0"`
/// - Decimal: `"16711680"`
pub fn parse_color(s: &str) -> Result<u32, ParseError> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    let val = parsed.map_err(|_| ParseError::InvalidColor(s.to_string()))?;
    if val > u64::from(MAX_COLOR) {
        return Err(ParseError::ColorOutOfRange(val));
    }
    Ok(val as u32)
}

/// Format a slot color as `0xRRGGBB`.
pub fn format_color(val: u32) -> String {
    format!("0x{:06X}", val & MAX_COLOR)
}

/// Split a slot color into its `(r, g, b)` channels.
pub fn channels(val: u32) -> (u8, u8, u8) {
    let r = (val >> 16) & 0xFF;
    let g = (val >> 8) & 0xFF;
    let b = val & 0xFF;
    (r as u8, g as u8, b as u8)
}

/// Scale one channel by a 0–255 brightness, the way ws281x hardware does.
pub fn scale_channel(value: u8, brightness: u8) -> u8 {
    ((u16::from(value) * (u16::from(brightness) + 1)) >> 8) as u8
}
