//! Numeric color space conversions used by swatches, filters, and the generator.
//!
//! All functions here are pure. HSL conversion goes through [`palette::Hsl`] on
//! `f64` components so that the derived values are reproducible across runs.

use crate::DecodeError;
use palette::{encoding, FromColor, Srgb};
use std::str::FromStr;

/// Titles use light text below this luma
const TITLE_LUMA_THRESHOLD: f64 = 200.0;

/// Body text uses light text below this luma.
///
/// Lower than [`TITLE_LUMA_THRESHOLD`] so body text is dark on light more often.
const BODY_LUMA_THRESHOLD: f64 = 150.0;

/// A color in the HSL color space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
	/// Hue in degrees, in the range `0.0..360.0`
	pub h: f64,
	/// Saturation in the range `0.0..=1.0`
	pub s: f64,
	/// Lightness in the range `0.0..=1.0`
	pub l: f64,
}

/// The color of text drawn on top of a swatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColor {
	/// White text
	Light,
	/// Black text
	Dark,
}

impl TextColor {
	/// The hex code of this text color
	#[must_use]
	pub const fn hex(self) -> &'static str {
		match self {
			TextColor::Light => "#FFF",
			TextColor::Dark => "#000",
		}
	}

	/// Text color for a title drawn on a background with the given luma
	#[must_use]
	pub fn for_title(luma: f64) -> Self {
		if luma < TITLE_LUMA_THRESHOLD {
			TextColor::Light
		} else {
			TextColor::Dark
		}
	}

	/// Text color for body text drawn on a background with the given luma
	#[must_use]
	pub fn for_body(luma: f64) -> Self {
		if luma < BODY_LUMA_THRESHOLD {
			TextColor::Light
		} else {
			TextColor::Dark
		}
	}
}

/// Convert an 8-bit sRGB color to HSL.
///
/// Colors with no chroma (`r == g == b`) have a hue and saturation of `0.0`.
#[must_use]
pub fn rgb_to_hsl(rgb: Srgb<u8>) -> Hsl {
	let hsl = palette::Hsl::<encoding::Srgb, f64>::from_color(rgb.into_format::<f64>());
	let h = hsl.hue.into_positive_degrees();
	Hsl {
		// rounding in into_positive_degrees can land exactly on 360
		h: if h >= 360.0 { 0.0 } else { h },
		s: hsl.saturation,
		l: hsl.lightness,
	}
}

/// Convert an HSL color back to 8-bit sRGB, rounding each channel
#[must_use]
pub fn hsl_to_rgb(hsl: Hsl) -> Srgb<u8> {
	let hsl = palette::Hsl::new_srgb(hsl.h, hsl.s, hsl.l);
	Srgb::<f64>::from_color(hsl).into_format()
}

/// Format an sRGB color as `#RRGGBB` with upper case digits
#[must_use]
pub fn rgb_to_hex(rgb: Srgb<u8>) -> String {
	format!("#{rgb:X}")
}

/// Parse a `#RRGGBB` or `#RGB` hex code. The leading `#` is optional.
///
/// # Errors
/// Returns a [`DecodeError`] if the code has the wrong number of digits
/// or contains a character that is not a hexadecimal digit.
pub fn hex_to_rgb(hex: &str) -> Result<Srgb<u8>, DecodeError> {
	let digits = hex.strip_prefix('#').unwrap_or(hex);

	if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(DecodeError::InvalidDigit(hex.to_owned()));
	}

	if digits.len() != 3 && digits.len() != 6 {
		return Err(DecodeError::InvalidLength(hex.to_owned()));
	}

	Srgb::from_str(digits).map_err(|_| DecodeError::InvalidDigit(hex.to_owned()))
}

/// YIQ luma of an sRGB color in the range `0.0..=255.0`
#[must_use]
pub fn luma(rgb: Srgb<u8>) -> f64 {
	let weighted = 299 * u32::from(rgb.red) + 587 * u32::from(rgb.green) + 114 * u32::from(rgb.blue);
	f64::from(weighted) / 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	fn test_colors() -> Vec<Srgb<u8>> {
		let range = (0..=u8::MAX).step_by(15);
		let mut colors = Vec::new();

		for r in range.clone() {
			for g in range.clone() {
				for b in range.clone() {
					colors.push(Srgb::new(r, g, b));
				}
			}
		}

		colors
	}

	#[test]
	fn hex_round_trips() {
		for color in test_colors() {
			assert_eq!(hex_to_rgb(&rgb_to_hex(color)).unwrap(), color);
		}
	}

	#[test]
	fn hex_is_six_upper_case_digits() {
		assert_eq!(rgb_to_hex(Srgb::new(0, 0, 0)), "#000000");
		assert_eq!(rgb_to_hex(Srgb::new(10, 171, 255)), "#0AABFF");
	}

	#[test]
	fn hex_shorthand_and_missing_prefix() {
		assert_eq!(hex_to_rgb("#FFF").unwrap(), Srgb::new(255, 255, 255));
		assert_eq!(hex_to_rgb("0aabff").unwrap(), Srgb::new(10, 171, 255));
	}

	#[test]
	fn malformed_hex_is_rejected() {
		assert!(matches!(hex_to_rgb("#12345"), Err(DecodeError::InvalidLength(_))));
		assert!(matches!(hex_to_rgb(""), Err(DecodeError::InvalidLength(_))));
		assert!(matches!(hex_to_rgb("#1234567"), Err(DecodeError::InvalidLength(_))));
		assert!(matches!(hex_to_rgb("#12345G"), Err(DecodeError::InvalidDigit(_))));
		assert!(matches!(hex_to_rgb("#+12345"), Err(DecodeError::InvalidDigit(_))));
		assert!(matches!(hex_to_rgb("##123456"), Err(DecodeError::InvalidDigit(_))));
		assert!(matches!(hex_to_rgb("#éé1"), Err(DecodeError::InvalidDigit(_))));
	}

	#[test]
	fn hsl_components_are_in_range() {
		for color in test_colors() {
			let Hsl { h, s, l } = rgb_to_hsl(color);
			assert!((0.0..360.0).contains(&h), "{color:?} => h = {h}");
			assert!((0.0..=1.0).contains(&s), "{color:?} => s = {s}");
			assert!((0.0..=1.0).contains(&l), "{color:?} => l = {l}");
		}
	}

	#[test]
	fn gray_has_no_saturation() {
		for v in (0..=u8::MAX).step_by(5) {
			let hsl = rgb_to_hsl(Srgb::new(v, v, v));
			assert_relative_eq!(hsl.s, 0.0);
			assert_relative_eq!(hsl.h, 0.0);
			assert_relative_eq!(hsl.l, f64::from(v) / 255.0, epsilon = 1e-12);
		}
	}

	#[test]
	fn primary_hues() {
		assert_relative_eq!(rgb_to_hsl(Srgb::new(255, 0, 0)).h, 0.0, epsilon = 1e-9);
		assert_relative_eq!(rgb_to_hsl(Srgb::new(0, 255, 0)).h, 120.0, epsilon = 1e-9);
		assert_relative_eq!(rgb_to_hsl(Srgb::new(0, 0, 255)).h, 240.0, epsilon = 1e-9);

		let red = rgb_to_hsl(Srgb::new(255, 0, 0));
		assert_relative_eq!(red.s, 1.0, epsilon = 1e-12);
		assert_relative_eq!(red.l, 0.5, epsilon = 1e-12);
	}

	#[test]
	fn hsl_round_trips() {
		for color in test_colors() {
			assert_eq!(hsl_to_rgb(rgb_to_hsl(color)), color);
		}
	}

	#[test]
	fn luma_extremes() {
		assert_relative_eq!(luma(Srgb::new(0, 0, 0)), 0.0);
		assert_relative_eq!(luma(Srgb::new(255, 255, 255)), 255.0, epsilon = 1e-9);
		assert_relative_eq!(luma(Srgb::new(255, 0, 0)), 76.245, epsilon = 1e-9);
	}

	#[test]
	fn text_color_thresholds_diverge() {
		assert_eq!(TextColor::for_title(175.0), TextColor::Light);
		assert_eq!(TextColor::for_body(175.0), TextColor::Dark);

		assert_eq!(TextColor::for_title(199.999), TextColor::Light);
		assert_eq!(TextColor::for_title(200.0), TextColor::Dark);
		assert_eq!(TextColor::for_body(149.999), TextColor::Light);
		assert_eq!(TextColor::for_body(150.0), TextColor::Dark);

		assert_eq!(TextColor::Light.hex(), "#FFF");
		assert_eq!(TextColor::Dark.hex(), "#000");
	}
}
