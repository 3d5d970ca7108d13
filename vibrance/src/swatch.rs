//! A representative color of an image together with its population

use crate::{
	color::{self, Hsl, TextColor},
	DecodeError, Filter,
};
use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A representative color and the number of source pixels it stands for.
///
/// Derived values (HSL, hex, luma) are computed once when the swatch is created.
/// Two swatches are equal if and only if their RGB values are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "SwatchRecord", try_from = "SwatchRecord")]
pub struct Swatch {
	/// The sRGB color
	rgb: Srgb<u8>,
	/// Number of source pixels mapped to this color
	population: u32,
	/// `rgb` in HSL
	hsl: Hsl,
	/// `rgb` as `#RRGGBB`
	hex: String,
	/// YIQ luma of `rgb`
	luma: f64,
	/// Whether the generator made this color up instead of finding it in the image
	synthetic: bool,
}

impl Swatch {
	/// Create a swatch for a color found in an image
	#[must_use]
	pub fn new(rgb: Srgb<u8>, population: u32) -> Self {
		Self {
			rgb,
			population,
			hsl: color::rgb_to_hsl(rgb),
			hex: color::rgb_to_hex(rgb),
			luma: color::luma(rgb),
			synthetic: false,
		}
	}

	/// Create a swatch that does not correspond to any pixels of the image.
	///
	/// Synthetic swatches have a population of zero.
	#[must_use]
	pub fn synthetic(rgb: Srgb<u8>) -> Self {
		Self {
			synthetic: true,
			..Self::new(rgb, 0)
		}
	}

	/// The sRGB color
	#[must_use]
	pub const fn rgb(&self) -> Srgb<u8> {
		self.rgb
	}

	/// Red component
	#[must_use]
	pub const fn red(&self) -> u8 {
		self.rgb.red
	}

	/// Green component
	#[must_use]
	pub const fn green(&self) -> u8 {
		self.rgb.green
	}

	/// Blue component
	#[must_use]
	pub const fn blue(&self) -> u8 {
		self.rgb.blue
	}

	/// Number of source pixels represented by this swatch
	#[must_use]
	pub const fn population(&self) -> u32 {
		self.population
	}

	/// The color in HSL
	#[must_use]
	pub const fn hsl(&self) -> Hsl {
		self.hsl
	}

	/// The color as an upper case `#RRGGBB` hex code
	#[must_use]
	pub fn hex(&self) -> &str {
		&self.hex
	}

	/// YIQ luma in `0.0..=255.0`
	#[must_use]
	pub const fn luma(&self) -> f64 {
		self.luma
	}

	/// Color for title text drawn on this swatch
	#[must_use]
	pub fn title_text_color(&self) -> TextColor {
		TextColor::for_title(self.luma)
	}

	/// Color for body text drawn on this swatch
	#[must_use]
	pub fn body_text_color(&self) -> TextColor {
		TextColor::for_body(self.luma)
	}

	/// Whether this swatch was synthesized by the generator rather than found in the image
	#[must_use]
	pub const fn is_synthetic(&self) -> bool {
		self.synthetic
	}

	/// Keep the swatches whose color, at full alpha, passes the filter
	#[must_use]
	pub fn apply_filter(swatches: Vec<Swatch>, filter: &dyn Filter) -> Vec<Swatch> {
		swatches
			.into_iter()
			.filter(|swatch| filter.apply(swatch.red(), swatch.green(), swatch.blue(), u8::MAX))
			.collect()
	}
}

impl PartialEq for Swatch {
	fn eq(&self, other: &Self) -> bool {
		self.rgb == other.rgb
	}
}

impl Eq for Swatch {}

impl Hash for Swatch {
	fn hash<H: Hasher>(&self, state: &mut H) {
		let Srgb { red, green, blue, .. } = self.rgb;
		(red, green, blue).hash(state);
	}
}

/// Serialized form of a [`Swatch`]
#[derive(Serialize, Deserialize)]
struct SwatchRecord {
	/// `#RRGGBB` hex code
	hex: String,
	/// Pixel count
	population: u32,
	/// Only written for synthetic swatches
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	synthetic: bool,
}

impl From<Swatch> for SwatchRecord {
	fn from(swatch: Swatch) -> Self {
		Self {
			hex: swatch.hex,
			population: swatch.population,
			synthetic: swatch.synthetic,
		}
	}
}

impl TryFrom<SwatchRecord> for Swatch {
	type Error = DecodeError;

	fn try_from(record: SwatchRecord) -> Result<Self, Self::Error> {
		let rgb = color::hex_to_rgb(&record.hex)?;
		Ok(Self {
			synthetic: record.synthetic,
			..Self::new(rgb, record.population)
		})
	}
}
