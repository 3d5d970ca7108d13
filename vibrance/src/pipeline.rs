//! Ties the stages together: scale, filter pixels, quantize, filter swatches, generate

use crate::{
	scaled_dimensions, CombinedFilter, DefaultFilter, DefaultGenerator, Error, Filter, Generator, ImageSource,
	MedianCut, Palette, Quantizer, Swatch,
};
use palette::Srgba;
use std::{
	fmt::{self, Debug},
	sync::Arc,
	thread::{self, JoinHandle},
};

/// Validated extraction options.
///
/// Built through a [`Builder`] and immutable afterwards.
#[derive(Clone)]
pub struct Options {
	/// Upper bound on the number of quantized swatches
	color_count: usize,
	/// Downsampling divisor used when `max_dimension` is not set
	quality: u32,
	/// Upper bound on the longer side of the scaled image
	max_dimension: Option<u32>,
	/// Reduces the pixels to swatches
	quantizer: Arc<dyn Quantizer>,
	/// Assigns swatches to roles
	generator: Arc<dyn Generator>,
	/// The filters, in the order they were added
	filters: Vec<Arc<dyn Filter>>,
	/// `filters` as a single filter
	combined_filter: CombinedFilter,
}

impl Options {
	/// The default number of quantized swatches
	pub const DEFAULT_COLOR_COUNT: usize = 64;

	/// The default downsampling divisor
	pub const DEFAULT_QUALITY: u32 = 5;

	/// Validate and assemble options
	///
	/// # Errors
	/// Returns [`Error::Configuration`] if `color_count` or `quality` is zero.
	pub fn new(
		color_count: usize,
		quality: u32,
		max_dimension: Option<u32>,
		quantizer: Arc<dyn Quantizer>,
		generator: Arc<dyn Generator>,
		filters: Vec<Arc<dyn Filter>>,
	) -> Result<Self, Error> {
		if color_count == 0 {
			return Err(Error::Configuration("color count must be at least 1".to_owned()));
		}
		if quality == 0 {
			return Err(Error::Configuration("quality must be at least 1".to_owned()));
		}

		let combined_filter = CombinedFilter::new(filters.clone());

		Ok(Self {
			color_count,
			quality,
			max_dimension,
			quantizer,
			generator,
			filters,
			combined_filter,
		})
	}

	/// Upper bound on the number of quantized swatches
	#[must_use]
	pub const fn color_count(&self) -> usize {
		self.color_count
	}

	/// Downsampling divisor used when no maximum dimension is set
	#[must_use]
	pub const fn quality(&self) -> u32 {
		self.quality
	}

	/// Upper bound on the longer side of the scaled image
	#[must_use]
	pub const fn max_dimension(&self) -> Option<u32> {
		self.max_dimension
	}

	/// The filters, in the order they were added
	#[must_use]
	pub fn filters(&self) -> &[Arc<dyn Filter>] {
		&self.filters
	}

	/// All filters combined with logical AND
	#[must_use]
	pub const fn combined_filter(&self) -> &CombinedFilter {
		&self.combined_filter
	}
}

impl Default for Options {
	fn default() -> Self {
		Self {
			color_count: Self::DEFAULT_COLOR_COUNT,
			quality: Self::DEFAULT_QUALITY,
			max_dimension: None,
			quantizer: Arc::new(MedianCut),
			generator: Arc::new(DefaultGenerator::default()),
			filters: vec![Arc::new(DefaultFilter::default())],
			combined_filter: CombinedFilter::new(vec![Arc::new(DefaultFilter::default())]),
		}
	}
}

impl Debug for Options {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Options")
			.field("color_count", &self.color_count)
			.field("quality", &self.quality)
			.field("max_dimension", &self.max_dimension)
			.field("filters", &self.filters.len())
			.finish_non_exhaustive()
	}
}

/// Collects options for a [`Vibrant`] extractor
pub struct Builder<I> {
	/// The image to extract from
	image: I,
	/// See [`Options::color_count`]
	color_count: usize,
	/// See [`Options::quality`]
	quality: u32,
	/// See [`Options::max_dimension`]
	max_dimension: Option<u32>,
	/// See [`Options`]
	quantizer: Arc<dyn Quantizer>,
	/// See [`Options`]
	generator: Arc<dyn Generator>,
	/// See [`Options::filters`]
	filters: Vec<Arc<dyn Filter>>,
}

impl<I: ImageSource> Builder<I> {
	/// Start with the default options
	fn new(image: I) -> Self {
		let Options {
			color_count,
			quality,
			max_dimension,
			quantizer,
			generator,
			filters,
			..
		} = Options::default();

		Self {
			image,
			color_count,
			quality,
			max_dimension,
			quantizer,
			generator,
			filters,
		}
	}

	/// Set the maximum number of quantized swatches
	#[must_use]
	pub fn max_color_count(mut self, color_count: usize) -> Self {
		self.color_count = color_count;
		self
	}

	/// Set the downsampling divisor, where `1` keeps every pixel
	#[must_use]
	pub fn quality(mut self, quality: u32) -> Self {
		self.quality = quality;
		self
	}

	/// Scale the image so that its longer side is at most `max_dimension`.
	///
	/// Takes precedence over [`Builder::quality`].
	#[must_use]
	pub fn max_dimension(mut self, max_dimension: u32) -> Self {
		self.max_dimension = Some(max_dimension);
		self
	}

	/// Set the quantization algorithm
	#[must_use]
	pub fn quantizer(mut self, quantizer: impl Quantizer + 'static) -> Self {
		self.quantizer = Arc::new(quantizer);
		self
	}

	/// Set the palette generation algorithm
	#[must_use]
	pub fn generator(mut self, generator: impl Generator + 'static) -> Self {
		self.generator = Arc::new(generator);
		self
	}

	/// Add a filter after the existing ones
	#[must_use]
	pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
		self.filters.push(Arc::new(filter));
		self
	}

	/// Remove all filters, including the default one
	#[must_use]
	pub fn clear_filters(mut self) -> Self {
		self.filters.clear();
		self
	}

	/// Validate the options and create the extractor
	///
	/// # Errors
	/// Returns [`Error::Configuration`] if the color count or quality is zero.
	pub fn build(self) -> Result<Vibrant<I>, Error> {
		let options = Options::new(
			self.color_count,
			self.quality,
			self.max_dimension,
			self.quantizer,
			self.generator,
			self.filters,
		)?;

		Ok(Vibrant::new(self.image, options))
	}

	/// Build and extract in one step
	///
	/// # Errors
	/// See [`Builder::build`] and [`Vibrant::extract_palette`].
	pub fn extract_palette(self) -> Result<Palette, Error> {
		self.build()?.extract_palette()
	}
}

/// Extracts a [`Palette`] from an image
#[derive(Debug)]
pub struct Vibrant<I> {
	/// The source image
	image: I,
	/// Validated options
	options: Options,
	/// The result of the last extraction
	palette: Option<Palette>,
}

impl<I: ImageSource> Vibrant<I> {
	/// Start configuring an extractor for `image`
	#[must_use]
	pub fn builder(image: I) -> Builder<I> {
		Builder::new(image)
	}

	/// Create an extractor from already validated options
	#[must_use]
	pub const fn new(image: I, options: Options) -> Self {
		Self { image, options, palette: None }
	}

	/// The options this extractor runs with
	#[must_use]
	pub const fn options(&self) -> &Options {
		&self.options
	}

	/// The palette from the last successful [`Vibrant::extract_palette`], if any
	#[must_use]
	pub const fn palette(&self) -> Option<&Palette> {
		self.palette.as_ref()
	}

	/// Run the extraction and remember the result
	///
	/// # Errors
	/// Returns [`Error::InvalidImage`] if the image has a zero dimension
	/// or gives a pixel buffer of the wrong length.
	pub fn extract_palette(&mut self) -> Result<Palette, Error> {
		let palette = extract(&self.image, &self.options)?;
		self.palette = Some(palette.clone());
		Ok(palette)
	}

	/// Run the extraction on a background thread
	///
	/// # Errors
	/// Returns [`Error::Thread`] if the thread could not be started.
	pub fn spawn_extract_palette(self) -> Result<PaletteTask, Error>
	where
		I: Send + 'static,
	{
		let handle = thread::Builder::new()
			.name("vibrance-extract".to_owned())
			.spawn(move || extract(&self.image, &self.options))
			.map_err(|err| Error::Thread(err.to_string()))?;

		Ok(PaletteTask { handle })
	}
}

/// A palette extraction running on a background thread
#[derive(Debug)]
pub struct PaletteTask {
	/// The extraction thread
	handle: JoinHandle<Result<Palette, Error>>,
}

impl PaletteTask {
	/// Whether the extraction has finished
	#[must_use]
	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}

	/// Wait for the extraction to finish.
	///
	/// A panic on the extraction thread is resumed on the calling thread.
	///
	/// # Errors
	/// Returns the same errors as [`Vibrant::extract_palette`].
	pub fn join(self) -> Result<Palette, Error> {
		match self.handle.join() {
			Ok(result) => result,
			Err(panic) => std::panic::resume_unwind(panic),
		}
	}
}

/// Extract a palette from `image` using `options`
///
/// # Errors
/// Returns [`Error::InvalidImage`] if the image has a zero dimension
/// or gives a pixel buffer of the wrong length.
pub fn extract<I: ImageSource>(image: &I, options: &Options) -> Result<Palette, Error> {
	let (width, height) = image.dimensions();
	if width == 0 || height == 0 {
		return Err(Error::InvalidImage(format!("image has no pixels ({width}x{height})")));
	}

	let scaled = scaled_dimensions(width, height, options.quality, options.max_dimension);
	let (mut buffer, (width, height)) = match scaled {
		Some((w, h)) => {
			tracing::debug!(width, height, scaled_width = w, scaled_height = h, "scaled image");
			(image.resize(w, h).to_rgba8(), (w, h))
		}
		None => (image.to_rgba8(), (width, height)),
	};

	let expected = u64::from(width) * u64::from(height) * 4;
	if buffer.len() as u64 != expected {
		return Err(Error::InvalidImage(format!(
			"pixel buffer has {} bytes, expected {expected} for {width}x{height}",
			buffer.len()
		)));
	}

	let pixels: &mut [Srgba<u8>] = palette::cast::from_component_slice_mut(&mut buffer);
	reject_pixels(pixels, &options.combined_filter);

	let swatches = options.quantizer.quantize(pixels, options.color_count);
	let quantized = swatches.len();
	let swatches = Swatch::apply_filter(swatches, &options.combined_filter);
	tracing::debug!(quantized, kept = swatches.len(), "filtered swatches");

	let palette = options.generator.generate(&swatches);
	tracing::debug!(roles = palette.len(), "generated palette");

	Ok(palette)
}

/// Make every pixel the filter rejects fully transparent
#[cfg(not(feature = "threads"))]
fn reject_pixels(pixels: &mut [Srgba<u8>], filter: &CombinedFilter) {
	for pixel in pixels {
		reject_pixel(pixel, filter);
	}
}

/// Make every pixel the filter rejects fully transparent
#[cfg(feature = "threads")]
fn reject_pixels(pixels: &mut [Srgba<u8>], filter: &CombinedFilter) {
	use rayon::prelude::*;

	/// Pixels per parallel task
	const CHUNK_SIZE: usize = 4096;

	pixels.par_chunks_mut(CHUNK_SIZE).for_each(|chunk| {
		for pixel in chunk {
			reject_pixel(pixel, filter);
		}
	});
}

/// Zero the alpha of `pixel` if the filter rejects it
fn reject_pixel(pixel: &mut Srgba<u8>, filter: &CombinedFilter) {
	if pixel.alpha != 0 && !filter.apply(pixel.red, pixel.green, pixel.blue, pixel.alpha) {
		pixel.alpha = 0;
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use crate::{KMeans, Role};
	use image::{DynamicImage, Rgba, RgbaImage};
	use palette::Srgb;

	/// Left half strong red, right half deep blue
	fn two_halves(width: u32, height: u32) -> RgbaImage {
		RgbaImage::from_fn(width, height, |x, _| {
			if x < width / 2 {
				Rgba([230, 25, 25, 255])
			} else {
				Rgba([20, 30, 110, 255])
			}
		})
	}

	#[test]
	fn two_halves_fill_vibrant_and_dark_vibrant() {
		let palette = Vibrant::builder(two_halves(40, 20)).quality(1).extract_palette().unwrap();

		let vibrant = palette.vibrant.as_ref().unwrap();
		assert_eq!(vibrant.rgb(), Srgb::new(230, 25, 25));
		assert_eq!(vibrant.population(), 400);

		let dark_vibrant = palette.dark_vibrant.as_ref().unwrap();
		assert_eq!(dark_vibrant.rgb(), Srgb::new(20, 30, 110));
		assert_eq!(dark_vibrant.population(), 400);

		assert_eq!(palette.len(), 2);
	}

	#[test]
	fn single_color_image() {
		let image = RgbaImage::from_pixel(10, 10, Rgba([230, 25, 25, 255]));
		let palette = Vibrant::builder(image).quality(1).extract_palette().unwrap();

		assert_eq!(palette.len(), 1);
		let (role, swatch) = palette.iter().next().unwrap();
		assert_eq!(role, Role::Vibrant);
		assert_eq!(swatch.population(), 100);
	}

	#[test]
	fn fully_transparent_image_gives_empty_palette() {
		let image = RgbaImage::from_pixel(16, 16, Rgba([230, 25, 25, 0]));
		let palette = Vibrant::builder(image.clone()).extract_palette().unwrap();
		assert!(palette.is_empty());

		let palette = Vibrant::builder(image).clear_filters().extract_palette().unwrap();
		assert!(palette.is_empty());
	}

	#[test]
	fn near_white_and_near_black_are_filtered() {
		let image = RgbaImage::from_fn(20, 10, |x, _| {
			if x < 10 {
				Rgba([252, 252, 252, 255])
			} else {
				Rgba([3, 3, 3, 255])
			}
		});

		let palette = Vibrant::builder(image.clone()).quality(1).extract_palette().unwrap();
		assert!(palette.is_empty());

		let palette = Vibrant::builder(image).quality(1).clear_filters().extract_palette().unwrap();
		assert!(!palette.is_empty());
	}

	#[test]
	fn custom_filter_rejects_pixels_and_swatches() {
		let no_red = |r: u8, _: u8, _: u8, _: u8| r < 200;
		let palette = Vibrant::builder(two_halves(40, 20))
			.quality(1)
			.add_filter(no_red)
			.extract_palette()
			.unwrap();

		assert!(palette.vibrant.is_none());
		assert!(palette.iter().all(|(_, swatch)| swatch.red() < 200));
		assert!(palette.dark_vibrant.is_some());
	}

	#[test]
	fn extraction_is_deterministic() {
		let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(97, 61, |x, y| {
			let channel = |v: u32| u8::try_from(v % 256).unwrap();
			Rgba([channel(x * 7), channel(y * 11), channel((x + y) * 5), 255])
		}));

		for quantizer in [Arc::new(MedianCut) as Arc<dyn Quantizer>, Arc::new(KMeans::default())] {
			let options = Options::new(
				16,
				2,
				None,
				quantizer,
				Arc::new(DefaultGenerator::default()),
				vec![Arc::new(DefaultFilter::default())],
			)
			.unwrap();

			let a = extract(&image, &options).unwrap();
			let b = extract(&image, &options).unwrap();
			assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
		}
	}

	#[test]
	fn spawned_extraction_matches_synchronous() {
		let image = two_halves(64, 32);
		let expected = Vibrant::builder(image.clone()).extract_palette().unwrap();

		let task = Vibrant::builder(image).build().unwrap().spawn_extract_palette().unwrap();
		let palette = task.join().unwrap();

		assert_eq!(palette.to_json().unwrap(), expected.to_json().unwrap());
	}

	#[test]
	#[should_panic(expected = "generator failed")]
	fn join_resumes_a_panic_from_the_task() {
		/// Always panics
		struct Panicking;

		impl Generator for Panicking {
			fn generate(&self, _: &[Swatch]) -> Palette {
				panic!("generator failed");
			}
		}

		let task = Vibrant::builder(two_halves(8, 8))
			.quality(1)
			.generator(Panicking)
			.build()
			.unwrap()
			.spawn_extract_palette()
			.unwrap();

		let _ = task.join();
	}

	#[test]
	fn palette_returns_the_last_result() {
		let mut vibrant = Vibrant::builder(two_halves(8, 8)).quality(1).build().unwrap();
		assert!(vibrant.palette().is_none());

		let palette = vibrant.extract_palette().unwrap();
		assert_eq!(vibrant.palette(), Some(&palette));
	}

	#[test]
	fn zero_dimension_is_invalid() {
		let err = Vibrant::builder(RgbaImage::new(0, 10)).extract_palette().unwrap_err();
		assert!(matches!(err, Error::InvalidImage(_)));

		let err = Vibrant::builder(RgbaImage::new(10, 0)).extract_palette().unwrap_err();
		assert!(matches!(err, Error::InvalidImage(_)));
	}

	#[test]
	fn wrong_buffer_length_is_invalid() {
		/// Reports more pixels than it has
		struct Truncated;

		impl ImageSource for Truncated {
			fn dimensions(&self) -> (u32, u32) {
				(4, 4)
			}

			fn resize(&self, _: u32, _: u32) -> Self {
				Truncated
			}

			fn to_rgba8(&self) -> Vec<u8> {
				vec![255; 10]
			}
		}

		let err = Vibrant::builder(Truncated).quality(1).extract_palette().unwrap_err();
		assert!(matches!(err, Error::InvalidImage(_)));
	}

	#[test]
	fn zero_color_count_or_quality_is_rejected() {
		let image = two_halves(4, 4);

		let err = Vibrant::builder(image.clone()).max_color_count(0).build().unwrap_err();
		assert!(matches!(err, Error::Configuration(_)));

		let err = Vibrant::builder(image).quality(0).build().unwrap_err();
		assert!(matches!(err, Error::Configuration(_)));
	}

	#[test]
	fn builder_options_are_kept() {
		let vibrant = Vibrant::builder(two_halves(4, 4))
			.max_color_count(12)
			.quality(3)
			.max_dimension(50)
			.clear_filters()
			.add_filter(DefaultFilter::default())
			.add_filter(|_: u8, _: u8, _: u8, a: u8| a == 255)
			.build()
			.unwrap();

		let options = vibrant.options();
		assert_eq!(options.color_count(), 12);
		assert_eq!(options.quality(), 3);
		assert_eq!(options.max_dimension(), Some(50));
		assert_eq!(options.filters().len(), 2);
		assert_eq!(options.combined_filter().len(), 2);
	}

	#[test]
	fn custom_generator_is_used() {
		/// Puts the most populous swatch in the muted slot
		struct MostPopulous;

		impl Generator for MostPopulous {
			fn generate(&self, swatches: &[Swatch]) -> Palette {
				Palette {
					muted: swatches.iter().max_by_key(|s| s.population()).cloned(),
					..Palette::default()
				}
			}
		}

		let image = RgbaImage::from_fn(10, 10, |x, _| {
			if x < 7 {
				Rgba([20, 30, 110, 255])
			} else {
				Rgba([230, 25, 25, 255])
			}
		});

		let palette = Vibrant::builder(image)
			.quality(1)
			.generator(MostPopulous)
			.extract_palette()
			.unwrap();

		assert_eq!(palette.muted.unwrap().rgb(), Srgb::new(20, 30, 110));
		assert!(palette.vibrant.is_none());
	}

	#[test]
	fn scaling_reduces_population() {
		let image = RgbaImage::from_pixel(400, 200, Rgba([230, 25, 25, 255]));
		let palette = Vibrant::builder(image).max_dimension(100).extract_palette().unwrap();
		assert_eq!(palette.len(), 1);
		assert_eq!(palette.vibrant.unwrap().population(), 100 * 50);
	}
}
