//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	num::{ParseFloatError, ParseIntError},
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};
use vibrance::DefaultFilter;

/// Supported output formats for the palette
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatOutput {
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
	/// The palette serialized as JSON
	Json,
}

/// Ways to colorize the output text
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Available color quantization algorithms
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QuantizerChoice {
	/// Repeatedly split the color cube at the median of its widest channel
	MedianCut,
	/// Seeded k-means clustering with k-means++ initialization
	Kmeans,
}

/// Print the Vibrant, Muted, DarkVibrant, DarkMuted, LightVibrant, and LightMuted swatches of an image.
///
/// Each role is printed on its own line along with the number of pixels the swatch represents.
/// Roles that no color of the image fits are printed as "-".
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hex")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// The maximum number of colors to quantize the image into
	///
	/// Fewer colors make extraction faster, but similar colors get merged together.
	/// The k-means quantizer uses at most 256 colors.
	#[arg(short = 'k', long, default_value_t = 64, value_parser = parse_positive::<usize>)]
	pub color_count: usize,

	/// Divide the width and height of the image by this value before extraction
	///
	/// A quality of 1 keeps every pixel. Ignored if --max-dimension is given.
	#[arg(short, long, default_value_t = 5, value_parser = parse_positive::<u32>)]
	pub quality: u32,

	/// Scale the image down so that its longer side is at most this many pixels
	#[arg(short, long, value_parser = parse_positive::<u32>)]
	pub max_dimension: Option<u32>,

	/// The color quantization algorithm
	#[arg(long, default_value = "median-cut")]
	pub quantizer: QuantizerChoice,

	/// The seed value used for the random number generator of k-means
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// Fill roles that no color fits with colors derived from the filled roles
	///
	/// Derived colors are marked as synthetic and have a population of 0.
	#[arg(long)]
	pub fill_missing: bool,

	/// Ignore pixels with an alpha value below this
	#[arg(long, default_value_t = DefaultFilter::MIN_ALPHA)]
	pub min_alpha: u8,

	/// Ignore pixels with an HSL lightness below this, in the range [0.0, 1.0]
	#[arg(long, default_value_t = DefaultFilter::MIN_LIGHTNESS, value_parser = parse_valid_lightness)]
	pub min_lightness: f64,

	/// Ignore pixels with an HSL lightness above this, in the range [0.0, 1.0]
	#[arg(long, default_value_t = DefaultFilter::MAX_LIGHTNESS, value_parser = parse_valid_lightness)]
	pub max_lightness: f64,

	/// Keep every pixel that is not fully transparent
	///
	/// Overrides --min-alpha, --min-lightness, and --max-lightness.
	#[arg(long)]
	pub no_filter: bool,

	/// The number of threads to use, where 0 lets rayon decide
	#[cfg(feature = "threads")]
	#[arg(short, long, default_value_t = 0)]
	pub threads: u8,

	/// Log each step of the extraction along with its running time
	///
	/// The RUST_LOG environment variable takes precedence over this option.
	#[arg(long)]
	pub verbose: bool,
}

impl Options {
	/// The pixel filter described by the filter options, or `None` if filtering is turned off
	pub fn filter(&self) -> Option<DefaultFilter> {
		(!self.no_filter).then_some(DefaultFilter {
			min_alpha: self.min_alpha,
			min_lightness: self.min_lightness,
			max_lightness: self.max_lightness,
		})
	}
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse an HSL lightness value and ensure it is in `0.0..=1.0`
fn parse_valid_lightness(s: &str) -> Result<f64, String> {
	parse_float_in_range(s, 0.0..=1.0)
}

/// Parse an integer and ensure it is at least 1
fn parse_positive<T>(s: &str) -> Result<T, String>
where
	T: FromStr<Err = ParseIntError> + Display + PartialOrd + From<u8>,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if value >= T::from(1) {
		Ok(value)
	} else {
		Err(format!("{value} must be at least 1"))
	}
}
