//! Conversion between normalized colors and CSS hex strings.

use glam::Vec3;
use image::Rgba;

/// Converts a normalized channel to a two-digit lowercase hex byte.
///
/// The value is clamped to `[0, 1]`, scaled by 255 and floored.
pub fn channel_to_hex(value: f32) -> String {
    format!("{:02x}", channel_to_byte(value))
}

pub fn channel_to_byte(value: f32) -> u8 {
    // NaN saturates to zero in the cast.
    (value.clamp(0.0, 1.0) * 255.0).floor() as u8
}

/// `#rrggbb` for a normalized RGB triple.
pub fn rgb_to_hex(color: Vec3) -> String {
    format!(
        "#{}{}{}",
        channel_to_hex(color.x),
        channel_to_hex(color.y),
        channel_to_hex(color.z)
    )
}

/// `#rrggbbaa` for a normalized RGB triple and opacity.
pub fn rgba_to_hex(color: Vec3, alpha: f32) -> String {
    rgb_to_hex(color) + &channel_to_hex(alpha)
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex(value: &str) -> Option<Rgba<u8>> {
    let digits = value.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let byte = |index: usize| u8::from_str_radix(&digits[index..index + 2], 16).ok();
    match digits.len() {
        3 => {
            let mut out = [0u8, 0, 0, 255];
            for (slot, ch) in out.iter_mut().zip(digits.chars()) {
                let nibble = ch.to_digit(16)? as u8;
                *slot = nibble * 17;
            }
            Some(Rgba(out))
        }
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_conversion_stays_within_one_step_of_scaled_input() {
        let steps = [0.0, 0.001, 0.1, 0.25, 0.333, 0.5, 0.66, 0.75, 0.9, 0.999, 1.0];
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let hex = rgb_to_hex(Vec3::new(r, g, b));
                    let parsed = parse_hex(&hex).unwrap();
                    for (channel, input) in [r, g, b].into_iter().enumerate() {
                        let diff = (f32::from(parsed[channel]) - input * 255.0).abs();
                        assert!(diff <= 1.0, "{hex} channel {channel} off by {diff}");
                    }
                }
            }
        }
    }

    #[test]
    fn opacity_outside_unit_range_clamps() {
        assert_eq!(channel_to_hex(-0.3), "00");
        assert_eq!(channel_to_hex(1.7), "ff");
        assert_eq!(channel_to_hex(f32::NAN), "00");
        assert_eq!(rgba_to_hex(Vec3::ONE, 0.0), "#ffffff00");
        assert_eq!(rgba_to_hex(Vec3::new(1.0, 0.5, 0.0), 2.0), "#ff7f00ff");
    }

    #[test]
    fn parse_hex_accepts_short_and_alpha_forms() {
        assert_eq!(parse_hex("#fff"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_hex("#10203040"), Some(Rgba([16, 32, 48, 64])));
        assert_eq!(parse_hex("white"), None);
        assert_eq!(parse_hex("#12345"), None);
    }
}
