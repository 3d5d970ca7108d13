//! Picks one swatch per role by scoring candidates against target saturation and lightness

use crate::{
	color::{hsl_to_rgb, Hsl},
	Palette, Role, Swatch,
};

/// A palette generation algorithm
pub trait Generator: Send + Sync {
	/// Select swatches for the roles of a palette
	fn generate(&self, swatches: &[Swatch]) -> Palette;
}

/// The ideal saturation and lightness of a role along with the ranges it accepts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
	/// Ideal saturation
	pub saturation: f64,
	/// Lowest accepted saturation
	pub min_saturation: f64,
	/// Highest accepted saturation
	pub max_saturation: f64,
	/// Ideal lightness
	pub lightness: f64,
	/// Lowest accepted lightness
	pub min_lightness: f64,
	/// Highest accepted lightness
	pub max_lightness: f64,
}

impl Target {
	/// Whether a color falls inside both accepted ranges
	#[must_use]
	pub fn accepts(&self, hsl: Hsl) -> bool {
		(self.min_saturation..=self.max_saturation).contains(&hsl.s)
			&& (self.min_lightness..=self.max_lightness).contains(&hsl.l)
	}
}

/// Relative importance of each scoring criterion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
	/// Weight of closeness to the target saturation
	pub saturation: f64,
	/// Weight of closeness to the target lightness
	pub lightness: f64,
	/// Weight of the relative population
	pub population: f64,
}

impl Default for Weights {
	fn default() -> Self {
		Self {
			saturation: 3.0,
			lightness: 6.5,
			population: 0.5,
		}
	}
}

/// Generator that scores each swatch against six targets.
///
/// Roles are filled in [`Role::ALL`] order, and a swatch chosen for one role
/// is not considered for the roles after it. Roles without any swatch inside
/// their accepted ranges stay empty unless `fill_missing` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultGenerator {
	/// Saturated, medium lightness
	pub vibrant: Target,
	/// Saturated, dark
	pub dark_vibrant: Target,
	/// Saturated, light
	pub light_vibrant: Target,
	/// Desaturated, medium lightness
	pub muted: Target,
	/// Desaturated, dark
	pub dark_muted: Target,
	/// Desaturated, light
	pub light_muted: Target,
	/// Scoring weights
	pub weights: Weights,
	/// Derive empty roles from a filled role of the same saturation family.
	///
	/// Derived swatches are marked synthetic and have a population of zero.
	pub fill_missing: bool,
}

/// Vibrant saturation range
const VIBRANT: (f64, f64, f64) = (1.0, 0.35, 1.0);
/// Muted saturation range
const MUTED: (f64, f64, f64) = (0.3, 0.0, 0.4);
/// Normal lightness range
const NORMAL: (f64, f64, f64) = (0.5, 0.3, 0.7);
/// Dark lightness range
const DARK: (f64, f64, f64) = (0.26, 0.0, 0.45);
/// Light lightness range
const LIGHT: (f64, f64, f64) = (0.74, 0.55, 1.0);

/// Build a target from (ideal, min, max) saturation and lightness ranges
const fn target(
	(saturation, min_saturation, max_saturation): (f64, f64, f64),
	(lightness, min_lightness, max_lightness): (f64, f64, f64),
) -> Target {
	Target {
		saturation,
		min_saturation,
		max_saturation,
		lightness,
		min_lightness,
		max_lightness,
	}
}

impl Default for DefaultGenerator {
	fn default() -> Self {
		Self {
			vibrant: target(VIBRANT, NORMAL),
			dark_vibrant: target(VIBRANT, DARK),
			light_vibrant: target(VIBRANT, LIGHT),
			muted: target(MUTED, NORMAL),
			dark_muted: target(MUTED, DARK),
			light_muted: target(MUTED, LIGHT),
			weights: Weights::default(),
			fill_missing: false,
		}
	}
}

impl DefaultGenerator {
	/// The target for a role
	#[must_use]
	pub const fn target(&self, role: Role) -> &Target {
		match role {
			Role::Vibrant => &self.vibrant,
			Role::DarkVibrant => &self.dark_vibrant,
			Role::LightVibrant => &self.light_vibrant,
			Role::Muted => &self.muted,
			Role::DarkMuted => &self.dark_muted,
			Role::LightMuted => &self.light_muted,
		}
	}

	/// Score a swatch against a target. Higher is better, the maximum is `1.0`.
	#[must_use]
	pub fn score(&self, target: &Target, hsl: Hsl, population: u32, max_population: u32) -> f64 {
		let Weights { saturation, lightness, population: population_weight } = self.weights;
		let relative_population = if max_population == 0 {
			0.0
		} else {
			f64::from(population) / f64::from(max_population)
		};

		weighted_mean(&[
			(invert_diff(hsl.s, target.saturation), saturation),
			(invert_diff(hsl.l, target.lightness), lightness),
			(relative_population, population_weight),
		])
	}

	/// The best scoring swatch for a role that is not already in the palette
	fn find_best<'a>(
		&self,
		role: Role,
		swatches: &'a [Swatch],
		max_population: u32,
		palette: &Palette,
	) -> Option<&'a Swatch> {
		let target = self.target(role);
		let mut best: Option<(&Swatch, f64)> = None;

		for swatch in swatches {
			if !target.accepts(swatch.hsl()) || palette.contains(swatch) {
				continue;
			}

			let value = self.score(target, swatch.hsl(), swatch.population(), max_population);
			if best.map_or(true, |(_, best_value)| value > best_value) {
				best = Some((swatch, value));
			}
		}

		best.map(|(swatch, _)| swatch)
	}

	/// Fill empty roles by moving a filled role of the same family to the target lightness
	fn fill_missing_roles(&self, palette: &mut Palette) {
		for role in Role::ALL {
			if palette.get(role).is_some() {
				continue;
			}

			let Some(source) = family(role).into_iter().find_map(|other| palette.get(other)) else {
				continue;
			};

			let hsl = Hsl {
				l: self.target(role).lightness,
				..source.hsl()
			};
			let swatch = Swatch::synthetic(hsl_to_rgb(hsl));

			if !palette.contains(&swatch) {
				tracing::debug!(%role, source = source.hex(), hex = swatch.hex(), "synthesized swatch");
				*palette.slot_mut(role) = Some(swatch);
			}
		}
	}
}

impl Generator for DefaultGenerator {
	fn generate(&self, swatches: &[Swatch]) -> Palette {
		let max_population = swatches.iter().map(Swatch::population).max().unwrap_or(0);
		let mut palette = Palette::default();

		for role in Role::ALL {
			let best = self.find_best(role, swatches, max_population, &palette).cloned();
			if let Some(swatch) = &best {
				tracing::debug!(%role, hex = swatch.hex(), population = swatch.population(), "selected swatch");
			}
			*palette.slot_mut(role) = best;
		}

		if self.fill_missing {
			self.fill_missing_roles(&mut palette);
		}

		palette
	}
}

/// Roles sharing the saturation of `role`, in the order they are used as a source
const fn family(role: Role) -> [Role; 3] {
	match role {
		Role::Vibrant | Role::DarkVibrant | Role::LightVibrant => {
			[Role::Vibrant, Role::DarkVibrant, Role::LightVibrant]
		},
		Role::Muted | Role::DarkMuted | Role::LightMuted => [Role::Muted, Role::DarkMuted, Role::LightMuted],
	}
}

/// `1.0` when `value` equals `target`, decreasing linearly with the distance
fn invert_diff(value: f64, target: f64) -> f64 {
	1.0 - (value - target).abs()
}

/// Weighted mean of (value, weight) pairs
#[allow(clippy::float_cmp)]
fn weighted_mean(values: &[(f64, f64)]) -> f64 {
	let (sum, weight_sum) = values
		.iter()
		.fold((0.0, 0.0), |(sum, weight_sum), &(value, weight)| (sum + value * weight, weight_sum + weight));

	if weight_sum == 0.0 {
		0.0
	} else {
		sum / weight_sum
	}
}
