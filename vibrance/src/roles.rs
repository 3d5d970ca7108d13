//! The six palette roles and the palette that holds one swatch per role

use crate::{Error, Swatch};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A perceptual role in a [`Palette`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
	/// Saturated, medium lightness
	Vibrant,
	/// Saturated, dark
	DarkVibrant,
	/// Saturated, light
	LightVibrant,
	/// Desaturated, medium lightness
	Muted,
	/// Desaturated, dark
	DarkMuted,
	/// Desaturated, light
	LightMuted,
}

impl Role {
	/// All roles, in the order the default generator fills them
	pub const ALL: [Role; 6] = [
		Role::Vibrant,
		Role::DarkVibrant,
		Role::LightVibrant,
		Role::Muted,
		Role::DarkMuted,
		Role::LightMuted,
	];

	/// The role's name as it appears in serialized palettes
	#[must_use]
	pub const fn name(self) -> &'static str {
		match self {
			Role::Vibrant => "Vibrant",
			Role::DarkVibrant => "DarkVibrant",
			Role::LightVibrant => "LightVibrant",
			Role::Muted => "Muted",
			Role::DarkMuted => "DarkMuted",
			Role::LightMuted => "LightMuted",
		}
	}
}

impl Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// One optional swatch for each [`Role`].
///
/// A slot is empty when no swatch of the image fit the role.
/// Empty slots are left out when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Palette {
	/// Saturated, medium lightness
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vibrant: Option<Swatch>,
	/// Desaturated, medium lightness
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub muted: Option<Swatch>,
	/// Saturated, dark
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dark_vibrant: Option<Swatch>,
	/// Desaturated, dark
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dark_muted: Option<Swatch>,
	/// Saturated, light
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub light_vibrant: Option<Swatch>,
	/// Desaturated, light
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub light_muted: Option<Swatch>,
}

impl Palette {
	/// The swatch for a role
	#[must_use]
	pub const fn get(&self, role: Role) -> Option<&Swatch> {
		match role {
			Role::Vibrant => self.vibrant.as_ref(),
			Role::DarkVibrant => self.dark_vibrant.as_ref(),
			Role::LightVibrant => self.light_vibrant.as_ref(),
			Role::Muted => self.muted.as_ref(),
			Role::DarkMuted => self.dark_muted.as_ref(),
			Role::LightMuted => self.light_muted.as_ref(),
		}
	}

	/// Mutable access to the slot of a role
	pub fn slot_mut(&mut self, role: Role) -> &mut Option<Swatch> {
		match role {
			Role::Vibrant => &mut self.vibrant,
			Role::DarkVibrant => &mut self.dark_vibrant,
			Role::LightVibrant => &mut self.light_vibrant,
			Role::Muted => &mut self.muted,
			Role::DarkMuted => &mut self.dark_muted,
			Role::LightMuted => &mut self.light_muted,
		}
	}

	/// Iterate over the filled roles in [`Role::ALL`] order
	pub fn iter(&self) -> impl Iterator<Item = (Role, &Swatch)> + '_ {
		Role::ALL
			.into_iter()
			.filter_map(|role| self.get(role).map(|swatch| (role, swatch)))
	}

	/// The number of filled roles
	#[must_use]
	pub fn len(&self) -> usize {
		self.iter().count()
	}

	/// Whether every role is empty
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Whether any filled role holds a swatch equal to `swatch`
	#[must_use]
	pub fn contains(&self, swatch: &Swatch) -> bool {
		self.iter().any(|(_, s)| s == swatch)
	}

	/// Serialize to JSON
	///
	/// # Errors
	/// Returns an error if serialization fails, which does not happen for palettes built by this crate.
	pub fn to_json(&self) -> Result<String, Error> {
		Ok(serde_json::to_string(self)?)
	}

	/// Deserialize from JSON.
	///
	/// # Errors
	/// Returns [`Error::Decode`] if the JSON is malformed or any hex code is invalid.
	pub fn from_json(json: &str) -> Result<Self, Error> {
		Ok(serde_json::from_str(json)?)
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use crate::DecodeError;
	use palette::Srgb;

	fn test_palette() -> Palette {
		Palette {
			vibrant: Some(Swatch::new(Srgb::new(230, 30, 30), 120)),
			dark_muted: Some(Swatch::new(Srgb::new(60, 50, 50), 40)),
			light_vibrant: Some(Swatch::synthetic(Srgb::new(240, 130, 130))),
			..Palette::default()
		}
	}

	#[test]
	fn get_matches_fields() {
		let palette = test_palette();
		assert_eq!(palette.get(Role::Vibrant), palette.vibrant.as_ref());
		assert_eq!(palette.get(Role::DarkMuted), palette.dark_muted.as_ref());
		assert_eq!(palette.get(Role::Muted), None);
	}

	#[test]
	fn iter_yields_filled_roles_in_order() {
		let palette = test_palette();
		let roles = palette.iter().map(|(role, _)| role).collect::<Vec<_>>();
		assert_eq!(roles, vec![Role::Vibrant, Role::LightVibrant, Role::DarkMuted]);
		assert_eq!(palette.len(), 3);
		assert!(!palette.is_empty());
		assert!(Palette::default().is_empty());
	}

	#[test]
	fn slot_mut_fills_roles() {
		let mut palette = Palette::default();
		for role in Role::ALL {
			*palette.slot_mut(role) = Some(Swatch::new(Srgb::new(1, 2, 3), 1));
			assert!(palette.get(role).is_some());
		}
		assert_eq!(palette.len(), 6);
	}

	#[test]
	fn json_uses_role_names_and_skips_empty_roles() {
		let json = test_palette().to_json().unwrap();
		assert_eq!(
			json,
			concat!(
				r##"{"Vibrant":{"hex":"#E61E1E","population":120},"##,
				r##""DarkMuted":{"hex":"#3C3232","population":40},"##,
				r##""LightVibrant":{"hex":"#F08282","population":0,"synthetic":true}}"##,
			)
		);
		assert_eq!(Palette::default().to_json().unwrap(), "{}");
	}

	#[test]
	fn json_round_trips() {
		let palette = test_palette();
		let decoded = Palette::from_json(&palette.to_json().unwrap()).unwrap();
		assert_eq!(decoded, palette);
		for (role, swatch) in palette.iter() {
			let other = decoded.get(role).unwrap();
			assert_eq!(other.population(), swatch.population());
			assert_eq!(other.is_synthetic(), swatch.is_synthetic());
		}
	}

	#[test]
	fn malformed_json_is_a_decode_error() {
		let err = Palette::from_json(r##"{"Vibrant":{"hex":"#E61E1","population":120}}"##).unwrap_err();
		assert!(matches!(err, Error::Decode(DecodeError::Malformed(_))));

		let err = Palette::from_json(r#"{"Vibrant":{"rgb":"[1,2,3]","population":120}}"#).unwrap_err();
		assert!(matches!(err, Error::Decode(_)));

		assert!(Palette::from_json("not json").is_err());
	}

	#[test]
	fn role_names() {
		assert_eq!(Role::DarkVibrant.to_string(), "DarkVibrant");
		assert_eq!(Role::ALL.len(), 6);
	}
}
