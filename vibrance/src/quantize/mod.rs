//! Reduce a pixel buffer to a bounded set of representative swatches

use crate::Swatch;
use palette::{Srgb, Srgba};
use std::collections::HashMap;

mod kmeans;
mod median_cut;

pub use kmeans::KMeans;
pub use median_cut::MedianCut;

/// A color quantization algorithm.
///
/// Implementations must skip pixels with an alpha of `0`,
/// return at most `color_count` swatches with distinct colors,
/// and give the same output for the same input.
pub trait Quantizer: Send + Sync {
	/// Quantize the pixels into at most `color_count` swatches
	fn quantize(&self, pixels: &[Srgba<u8>], color_count: usize) -> Vec<Swatch>;
}

/// Deduplicated colors from a pixel buffer
#[derive(Debug, Clone, Default)]
pub struct ColorCounts {
	/// Each distinct color, in the order it was first seen
	colors: Vec<Srgb<u8>>,
	/// The number of pixels of each color
	counts: Vec<u32>,
}

impl ColorCounts {
	/// Count the distinct colors of all pixels that are not fully transparent
	#[must_use]
	pub fn from_pixels(pixels: &[Srgba<u8>]) -> Self {
		let mut data = Self::default();

		// Packed Srgb -> data index
		let mut memo: HashMap<u32, u32> = HashMap::new();

		for pixel in pixels.iter().filter(|pixel| pixel.alpha != 0) {
			let key = pack(pixel.color);
			let index = *memo.entry(key).or_insert_with(|| {
				// data.len() < u32::MAX because there are only (2^8)^3 < u32::MAX possible sRGB colors
				#[allow(clippy::cast_possible_truncation)]
				let index = data.colors.len() as u32;

				data.colors.push(pixel.color);
				data.counts.push(0);
				index
			});

			data.counts[index as usize] += 1;
		}

		data
	}

	/// The distinct colors
	#[must_use]
	pub fn colors(&self) -> &[Srgb<u8>] {
		&self.colors
	}

	/// The pixel count for each color
	#[must_use]
	pub fn counts(&self) -> &[u32] {
		&self.counts
	}

	/// The number of distinct colors
	#[must_use]
	pub fn num_colors(&self) -> usize {
		self.colors.len()
	}

	/// The total number of pixels counted
	#[must_use]
	pub fn total(&self) -> u64 {
		self.counts.iter().copied().map(u64::from).sum()
	}

	/// Iterate over each color and its count
	pub fn pairs(&self) -> impl Iterator<Item = (Srgb<u8>, u32)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}
}

/// Pack a color into a `u32` with red in the highest used byte
fn pack(color: Srgb<u8>) -> u32 {
	(u32::from(color.red) << 16) | (u32::from(color.green) << 8) | u32::from(color.blue)
}

/// Turn weighted colors into swatches, merging entries that share the same color.
///
/// The first occurrence of each color decides its position in the output.
fn merge_swatches(colors: impl IntoIterator<Item = (Srgb<u8>, u32)>) -> Vec<Swatch> {
	let mut order: Vec<(Srgb<u8>, u32)> = Vec::new();
	let mut index: HashMap<u32, usize> = HashMap::new();

	for (color, population) in colors {
		match index.get(&pack(color)) {
			Some(&i) => order[i].1 += population,
			None => {
				index.insert(pack(color), order.len());
				order.push((color, population));
			},
		}
	}

	order
		.into_iter()
		.map(|(color, population)| Swatch::new(color, population))
		.collect()
}
