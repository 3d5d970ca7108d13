//! Predicates that decide which pixels and swatches take part in palette generation

use crate::color::rgb_to_hsl;
use palette::Srgb;
use std::sync::Arc;

/// A predicate over an RGBA color.
///
/// Returning `true` keeps the color. Any `Fn(u8, u8, u8, u8) -> bool` closure is a `Filter`.
pub trait Filter: Send + Sync {
	/// Whether the color should be kept
	fn apply(&self, r: u8, g: u8, b: u8, a: u8) -> bool;
}

impl<F> Filter for F
where
	F: Fn(u8, u8, u8, u8) -> bool + Send + Sync,
{
	fn apply(&self, r: u8, g: u8, b: u8, a: u8) -> bool {
		self(r, g, b, a)
	}
}

/// Rejects near-transparent colors and colors that are close to black or white.
///
/// The thresholds are inclusive bounds on what is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultFilter {
	/// Colors with an alpha below this are rejected
	pub min_alpha: u8,
	/// Colors with an HSL lightness below this are rejected as too dark
	pub min_lightness: f64,
	/// Colors with an HSL lightness above this are rejected as too light
	pub max_lightness: f64,
}

impl DefaultFilter {
	/// The default alpha threshold
	pub const MIN_ALPHA: u8 = 125;
	/// The default dark threshold
	pub const MIN_LIGHTNESS: f64 = 0.05;
	/// The default light threshold
	pub const MAX_LIGHTNESS: f64 = 0.95;
}

impl Default for DefaultFilter {
	fn default() -> Self {
		Self {
			min_alpha: Self::MIN_ALPHA,
			min_lightness: Self::MIN_LIGHTNESS,
			max_lightness: Self::MAX_LIGHTNESS,
		}
	}
}

impl Filter for DefaultFilter {
	fn apply(&self, r: u8, g: u8, b: u8, a: u8) -> bool {
		if a < self.min_alpha {
			return false;
		}

		let l = rgb_to_hsl(Srgb::new(r, g, b)).l;
		self.min_lightness <= l && l <= self.max_lightness
	}
}

/// The logical AND of a list of filters
#[derive(Clone, Default)]
pub struct CombinedFilter {
	/// Filters in the order they are checked
	filters: Vec<Arc<dyn Filter>>,
}

impl CombinedFilter {
	/// Combine the given filters. An empty list accepts every color.
	#[must_use]
	pub fn new(filters: Vec<Arc<dyn Filter>>) -> Self {
		Self { filters }
	}

	/// The number of combined filters
	#[must_use]
	pub fn len(&self) -> usize {
		self.filters.len()
	}

	/// Whether no filters were combined
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.filters.is_empty()
	}
}

impl Filter for CombinedFilter {
	fn apply(&self, r: u8, g: u8, b: u8, a: u8) -> bool {
		self.filters.iter().all(|filter| filter.apply(r, g, b, a))
	}
}

impl std::fmt::Debug for CombinedFilter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CombinedFilter").field("filters", &self.filters.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};

	fn gray(v: u8) -> (u8, u8, u8, u8) {
		(v, v, v, u8::MAX)
	}

	fn keeps(filter: &impl Filter, (r, g, b, a): (u8, u8, u8, u8)) -> bool {
		filter.apply(r, g, b, a)
	}

	#[test]
	fn default_filter_alpha_boundary() {
		let filter = DefaultFilter::default();
		assert!(!keeps(&filter, (200, 30, 30, 0)));
		assert!(!keeps(&filter, (200, 30, 30, 124)));
		assert!(keeps(&filter, (200, 30, 30, 125)));
		assert!(keeps(&filter, (200, 30, 30, 255)));
	}

	#[test]
	fn default_filter_lightness_boundaries() {
		let filter = DefaultFilter::default();
		assert!(!keeps(&filter, gray(0)));
		assert!(!keeps(&filter, gray(12)));
		assert!(keeps(&filter, gray(13)));
		assert!(keeps(&filter, gray(128)));
		assert!(keeps(&filter, gray(242)));
		assert!(!keeps(&filter, gray(243)));
		assert!(!keeps(&filter, gray(255)));
	}

	#[test]
	fn default_filter_uses_lightness_not_saturation() {
		let filter = DefaultFilter::default();
		// fully saturated but almost black
		assert!(!keeps(&filter, (20, 0, 0, 255)));
		// fully saturated mid lightness
		assert!(keeps(&filter, (255, 0, 0, 255)));
	}

	#[test]
	fn default_filter_thresholds_are_configurable() {
		let filter = DefaultFilter {
			min_alpha: 0,
			min_lightness: 0.0,
			max_lightness: 1.0,
		};
		assert!(keeps(&filter, (0, 0, 0, 0)));
		assert!(keeps(&filter, gray(255)));
	}

	#[test]
	fn empty_combination_accepts_everything() {
		let filter = CombinedFilter::new(Vec::new());
		assert!(filter.is_empty());
		assert!(keeps(&filter, (0, 0, 0, 0)));
		assert!(keeps(&filter, gray(255)));
	}

	#[test]
	fn combination_is_logical_and() {
		let no_red = |r: u8, _: u8, _: u8, _: u8| r < 128;
		let no_blue = |_: u8, _: u8, b: u8, _: u8| b < 128;
		let filter = CombinedFilter::new(vec![Arc::new(no_red) as Arc<dyn Filter>, Arc::new(no_blue)]);

		assert_eq!(filter.len(), 2);
		assert!(keeps(&filter, (0, 255, 0, 255)));
		assert!(!keeps(&filter, (255, 0, 0, 255)));
		assert!(!keeps(&filter, (0, 0, 255, 255)));
		assert!(!keeps(&filter, (255, 0, 255, 255)));
	}

	#[test]
	fn combination_short_circuits() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = {
			let calls = Arc::clone(&calls);
			move |_: u8, _: u8, _: u8, _: u8| {
				calls.fetch_add(1, Ordering::Relaxed);
				true
			}
		};
		let reject_all = |_: u8, _: u8, _: u8, _: u8| false;
		let filter = CombinedFilter::new(vec![Arc::new(reject_all) as Arc<dyn Filter>, Arc::new(counter)]);

		assert!(!keeps(&filter, gray(100)));
		assert_eq!(calls.load(Ordering::Relaxed), 0);
	}
}
