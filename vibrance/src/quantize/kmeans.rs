//! Seeded k-means quantization in the RGB cube.
//!
//! This uses the sort-means variant of Lloyd's algorithm:
//! the distances between centers are sorted so that most candidate centers
//! can be skipped when reassigning a color.

use super::{merge_swatches, ColorCounts, Quantizer};
use crate::Swatch;
use palette::{Srgb, Srgba};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// An RGB color with components in `0.0..=1.0`
type Point = [f32; 3];

/// K-means color quantizer.
///
/// Initial centers are chosen with k-means++ from an RNG seeded with `seed`,
/// so the output only depends on the input and these parameters.
///
/// The number of clusters is capped at [`KMeans::MAX_COLORS`],
/// since each iteration keeps a sorted table of all center pairs.
/// At least one iteration always runs, even if `max_iter` is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
	/// Value used to seed the random number generator
	pub seed: u64,
	/// Maximum number of iterations
	pub max_iter: u32,
	/// Stop once the total movement of all centers is at most this value
	pub convergence_threshold: f32,
}

impl Default for KMeans {
	fn default() -> Self {
		Self {
			seed: 0,
			max_iter: 64,
			convergence_threshold: 0.001,
		}
	}
}

impl KMeans {
	/// The maximum number of clusters, regardless of the requested color count
	pub const MAX_COLORS: usize = 256;
}

impl Quantizer for KMeans {
	fn quantize(&self, pixels: &[Srgba<u8>], color_count: usize) -> Vec<Swatch> {
		let counts = ColorCounts::from_pixels(pixels);
		tracing::debug!(unique_colors = counts.num_colors(), "k-means input");

		let k = color_count.min(Self::MAX_COLORS).min(counts.num_colors());
		if k == 0 {
			return Vec::new();
		}

		let colors = counts.colors().iter().map(|&color| to_point(color)).collect::<Vec<_>>();
		let mut state = KmeansState::new(k, colors.len());
		let iterations = kmeans(&colors, counts.counts(), &mut state, k, self);
		tracing::debug!(iterations, "k-means finished");

		merge_swatches(
			state
				.centers
				.centroid
				.iter()
				.zip(&state.centers.count)
				.filter(|&(_, &n)| n > 0)
				.map(|(&centroid, &n)| (to_srgb(centroid), n)),
		)
	}
}

/// Convert an 8-bit color to a [`Point`]
fn to_point(color: Srgb<u8>) -> Point {
	let color = color.into_format::<f32>();
	[color.red, color.green, color.blue]
}

/// Convert a [`Point`] to the nearest 8-bit color
fn to_srgb([r, g, b]: Point) -> Srgb<u8> {
	Srgb::new(r, g, b).into_format()
}

/// Squared euclidean distance
fn squared_distance(x: Point, y: Point) -> f32 {
	let dr = x[0] - y[0];
	let dg = x[1] - y[1];
	let db = x[2] - y[2];
	dr * dr + dg * dg + db * db
}

/// Bookkeeping for each data point
struct PointData {
	/// Center assignment for this data point
	assignment: Vec<u32>,
	/// Weight of each data point used to randomly select starting centroids in k-means++
	weight: Vec<f32>,
}

/// Data for each center
struct CenterData {
	/// The centroid point
	centroid: Vec<Point>,
	/// Vector sum for all data points in this center
	sum: Vec<[f64; 3]>,
	/// Number of pixels in this center
	count: Vec<u32>,
}

/// Holds all the state used by k-means
struct KmeansState {
	/// Data for each center
	centers: CenterData,
	/// One fourth of the squared distance between each pair of centers
	distances: Vec<(u32, f32)>,
	/// Data for each point
	points: PointData,
}

impl KmeansState {
	/// Initialize a new [`KmeansState`] with `k` centers and `n` data points
	fn new(k: usize, n: usize) -> Self {
		Self {
			centers: CenterData {
				centroid: Vec::with_capacity(k),
				sum: vec![[0.0; 3]; k],
				count: vec![0; k],
			},
			distances: vec![(0, 0.0); k * k],
			points: PointData {
				assignment: vec![0; n],
				weight: vec![f32::INFINITY; n],
			},
		}
	}
}

/// Choose the starting centroids using the k-means++ algorithm
fn kmeans_plus_plus(k: usize, rng: &mut impl Rng, colors: &[Point], centroids: &mut Vec<Point>, weights: &mut [f32]) {
	use rand::{
		distributions::{WeightedError::*, WeightedIndex},
		prelude::Distribution,
	};

	// Pick any random first centroid
	centroids.push(colors[rng.gen_range(0..colors.len())]);

	// Pick each next centroid with a weighted probability based off the squared distance to its closest centroid
	for i in 1..k {
		let centroid = centroids[i - 1];
		for (weight, &color) in weights.iter_mut().zip(colors) {
			*weight = f32::min(*weight, squared_distance(color, centroid));
		}

		match WeightedIndex::new(&*weights) {
			Ok(sampler) => centroids.push(colors[sampler.sample(rng)]),
			Err(AllWeightsZero) => return, // all points exactly match a centroid
			Err(InvalidWeight | NoItem | TooMany) => {
				unreachable!("distances are >= 0 and colors.len() is in 1..=2.pow(24)")
			},
		}
	}
}

/// Initializes the center sums and counts based off the initial assignments
fn compute_initial_sums(colors: &[Point], counts: &[u32], centers: &mut CenterData, assignment: &[u32]) {
	for ((color, &n), &center) in colors.iter().zip(counts).zip(assignment) {
		let i = center as usize;
		let nf = f64::from(n);
		for (sum, &c) in centers.sum[i].iter_mut().zip(color) {
			*sum += nf * f64::from(c);
		}
		centers.count[i] += n;
	}
}

/// For each pair of centers, update their distances and sort each center's row by increasing distance
// i and j are < k <= 2.pow(24)
#[allow(clippy::cast_possible_truncation)]
fn update_distances(centroids: &[Point], distances: &mut [(u32, f32)]) {
	let k = centroids.len();
	for i in 0..k {
		let ci = centroids[i];
		distances[i * k + i] = (i as u32, 0.0);
		for j in (i + 1)..k {
			let cj = centroids[j];
			let dist = squared_distance(ci, cj) / 4.0;
			distances[j * k + i] = (i as u32, dist);
			distances[i * k + j] = (j as u32, dist);
		}
	}

	for row in distances.chunks_exact_mut(k) {
		row.sort_by(|(_, x), (_, y)| f32::total_cmp(x, y));
	}
}

/// For each data point, update its assigned center
fn update_assignments(
	colors: &[Point],
	counts: &[u32],
	centers: &mut CenterData,
	distances: &[(u32, f32)],
	points: &mut PointData,
) {
	let k = centers.centroid.len();
	for ((&color, &n), center) in colors.iter().zip(counts).zip(&mut points.assignment) {
		let ci = *center as usize;
		let dist = squared_distance(color, centers.centroid[ci]);

		// Find the closest center
		let mut min_dist = dist;
		let mut min_center = *center;
		for &(other_center, half_dist) in &distances[(ci * k + 1)..((ci + 1) * k)] {
			if dist < half_dist {
				break;
			}

			let other_dist = squared_distance(color, centers.centroid[other_center as usize]);
			if other_dist < min_dist {
				min_dist = other_dist;
				min_center = other_center;
			}
		}

		// Move this point to its new center
		if min_center != *center {
			let nf = f64::from(n);
			let cj = min_center as usize;
			for (channel, &c) in color.iter().enumerate() {
				let moved = nf * f64::from(c);
				centers.sum[ci][channel] -= moved;
				centers.sum[cj][channel] += moved;
			}
			centers.count[ci] -= n;
			centers.count[cj] += n;

			*center = min_center;
		}
	}
}

/// For each center, update its centroid using the vector sums and return the total movement
#[allow(clippy::cast_possible_truncation)]
fn update_centroids(rng: &mut impl Rng, centers: &mut CenterData) -> f32 {
	let mut total_delta = 0.0;
	for ((centroid, &n), sum) in centers.centroid.iter_mut().zip(&centers.count).zip(&centers.sum) {
		let new_centroid = if n == 0 {
			[rng.gen_range(0.0..=1.0), rng.gen_range(0.0..=1.0), rng.gen_range(0.0..=1.0)]
		} else {
			let n = f64::from(n);
			// Sums may need greater precision, but the average can fall back down to a reduced precision
			(*sum).map(|s| (s / n) as f32)
		};

		total_delta += squared_distance(*centroid, new_centroid).sqrt();
		*centroid = new_centroid;
	}

	total_delta
}

/// Run k-means until convergence or `max_iter`, returning the number of iterations
fn kmeans(
	colors: &[Point],
	counts: &[u32],
	KmeansState { centers, distances, points }: &mut KmeansState,
	k: usize,
	params: &KMeans,
) -> u32 {
	let mut rng = Xoshiro256PlusPlus::seed_from_u64(params.seed);
	kmeans_plus_plus(k, &mut rng, colors, &mut centers.centroid, &mut points.weight);

	// k-means++ may stop early if there are fewer distinct points than k
	let k = centers.centroid.len();
	centers.sum.truncate(k);
	centers.count.truncate(k);
	distances.truncate(k * k);

	compute_initial_sums(colors, counts, centers, &points.assignment);

	// centroids must be means of their assigned colors, so run at least once
	let mut iterations = 0;
	loop {
		update_distances(&centers.centroid, distances);
		update_assignments(colors, counts, centers, distances, points);
		let total_delta = update_centroids(&mut rng, centers);
		iterations += 1;
		if iterations >= params.max_iter || total_delta <= params.convergence_threshold {
			break iterations;
		}
	}
}
