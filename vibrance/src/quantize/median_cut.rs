//! Median cut quantization over the RGB cube

use super::{merge_swatches, pack, ColorCounts, Quantizer};
use crate::Swatch;
use palette::{Srgb, Srgba};

/// Median cut color quantizer.
///
/// Buckets of distinct colors are repeatedly split in two at the weighted median
/// of their widest channel until there are `color_count` buckets or no bucket has
/// more than one distinct color. Each bucket becomes the population weighted mean
/// of its colors.
///
/// Ties are broken deterministically:
/// the most populous bucket is split first (lowest index on ties),
/// and the widest channel is chosen in the order red, green, blue.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianCut;

impl Quantizer for MedianCut {
	fn quantize(&self, pixels: &[Srgba<u8>], color_count: usize) -> Vec<Swatch> {
		let counts = ColorCounts::from_pixels(pixels);
		tracing::debug!(unique_colors = counts.num_colors(), "median cut input");

		if counts.num_colors() == 0 || color_count == 0 {
			return Vec::new();
		}

		let mut entries = counts.pairs().collect::<Vec<_>>();
		let mut buckets = vec![Bucket::new(0, entries.len(), &entries)];

		while buckets.len() < color_count {
			let Some(i) = next_bucket(&buckets) else {
				break;
			};

			let (left, right) = buckets[i].split(&mut entries);
			tracing::trace!(
				bucket = i,
				left = left.population,
				right = right.population,
				"split bucket"
			);
			buckets[i] = left;
			buckets.push(right);
		}

		merge_swatches(buckets.iter().map(|bucket| bucket.average(&entries)))
	}
}

/// A contiguous range of the color entries
#[derive(Debug, Clone, Copy)]
struct Bucket {
	/// First entry index
	start: usize,
	/// One past the last entry index
	end: usize,
	/// Sum of the entry counts
	population: u64,
}

impl Bucket {
	/// Create a bucket for `entries[start..end]`
	fn new(start: usize, end: usize, entries: &[(Srgb<u8>, u32)]) -> Self {
		let population = entries[start..end].iter().map(|&(_, n)| u64::from(n)).sum();
		Self { start, end, population }
	}

	/// Whether this bucket has more than one distinct color
	const fn splittable(&self) -> bool {
		self.end - self.start > 1
	}

	/// The channel with the largest range, as an index in `0..3`
	fn widest_channel(&self, entries: &[(Srgb<u8>, u32)]) -> usize {
		let mut min = [u8::MAX; 3];
		let mut max = [u8::MIN; 3];
		for &(color, _) in &entries[self.start..self.end] {
			for (channel, value) in channels(color).into_iter().enumerate() {
				min[channel] = min[channel].min(value);
				max[channel] = max[channel].max(value);
			}
		}

		let mut widest = 0;
		for channel in 1..3 {
			if max[channel] - min[channel] > max[widest] - min[widest] {
				widest = channel;
			}
		}
		widest
	}

	/// Split this bucket at the weighted median of its widest channel.
	///
	/// Both halves are non-empty. Must only be called on splittable buckets.
	fn split(&self, entries: &mut [(Srgb<u8>, u32)]) -> (Self, Self) {
		debug_assert!(self.splittable());

		let channel = self.widest_channel(entries);
		let slice = &mut entries[self.start..self.end];

		// entries are distinct colors, so the packed value makes the order total
		slice.sort_unstable_by_key(|&(color, _)| (channels(color)[channel], pack(color)));

		let mut cumulative = 0;
		let mut cut = slice.len();
		for (i, &(_, n)) in slice.iter().enumerate() {
			cumulative += u64::from(n);
			if 2 * cumulative >= self.population {
				cut = i + 1;
				break;
			}
		}
		let cut = self.start + cut.clamp(1, slice.len() - 1);

		(Bucket::new(self.start, cut, entries), Bucket::new(cut, self.end, entries))
	}

	/// The population weighted mean color and the population
	fn average(&self, entries: &[(Srgb<u8>, u32)]) -> (Srgb<u8>, u32) {
		let mut sums = [0_u64; 3];
		for &(color, n) in &entries[self.start..self.end] {
			for (sum, value) in sums.iter_mut().zip(channels(color)) {
				*sum += u64::from(value) * u64::from(n);
			}
		}

		let population = self.population.max(1);
		// a rounded mean of u8 values is itself <= u8::MAX
		#[allow(clippy::cast_possible_truncation)]
		let [r, g, b] = sums.map(|sum| ((sum + population / 2) / population) as u8);

		(Srgb::new(r, g, b), u32::try_from(self.population).unwrap_or(u32::MAX))
	}
}

/// The components of a color as an array
const fn channels(color: Srgb<u8>) -> [u8; 3] {
	[color.red, color.green, color.blue]
}

/// The index of the most populous splittable bucket, if any
fn next_bucket(buckets: &[Bucket]) -> Option<usize> {
	let mut best: Option<usize> = None;
	for (i, bucket) in buckets.iter().enumerate() {
		if bucket.splittable() && best.map_or(true, |j| bucket.population > buckets[j].population) {
			best = Some(i);
		}
	}
	best
}
