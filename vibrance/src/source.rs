//! The boundary with image decoding and resampling

use image::{DynamicImage, GenericImageView, RgbaImage};

/// A decoded image that palette extraction can read and scale down.
///
/// Resampling quality is up to the implementation,
/// but the same input must always give the same output.
pub trait ImageSource {
	/// Width and height in pixels
	fn dimensions(&self) -> (u32, u32);

	/// Resample to exactly `width` by `height` pixels
	#[must_use]
	fn resize(&self, width: u32, height: u32) -> Self
	where
		Self: Sized;

	/// Row-major RGBA8 pixels with a length of `width * height * 4`
	fn to_rgba8(&self) -> Vec<u8>;
}

impl ImageSource for DynamicImage {
	fn dimensions(&self) -> (u32, u32) {
		GenericImageView::dimensions(self)
	}

	fn resize(&self, width: u32, height: u32) -> Self {
		self.thumbnail_exact(width, height)
	}

	fn to_rgba8(&self) -> Vec<u8> {
		DynamicImage::to_rgba8(self).into_raw()
	}
}

impl ImageSource for RgbaImage {
	fn dimensions(&self) -> (u32, u32) {
		RgbaImage::dimensions(self)
	}

	fn resize(&self, width: u32, height: u32) -> Self {
		image::imageops::thumbnail(self, width, height)
	}

	fn to_rgba8(&self) -> Vec<u8> {
		self.as_raw().clone()
	}
}

/// The size to scale an image to before extracting its palette, or `None` to keep it as is.
///
/// If `max_dimension` is given, the image is scaled so that its longer side is at most `max_dimension`.
/// Otherwise, both sides are divided by `quality`. Images are never scaled up,
/// and neither side is scaled below one pixel.
#[must_use]
pub fn scaled_dimensions(width: u32, height: u32, quality: u32, max_dimension: Option<u32>) -> Option<(u32, u32)> {
	// ratio as numerator / denominator
	let (numerator, denominator) = match max_dimension {
		Some(max) if max > 0 => (max, u32::max(width, height)),
		_ => (1, quality),
	};

	if numerator >= denominator {
		return None;
	}

	// (side * numerator / denominator) < side, so it fits in a u32
	#[allow(clippy::cast_possible_truncation)]
	let scale = |side: u32| (u64::from(side) * u64::from(numerator) / u64::from(denominator)).max(1) as u32;

	Some((scale(width), scale(height)))
}
