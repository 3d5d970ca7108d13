//! Extract a six-role palette of prominent colors from an image.
//!
//! The image is scaled down, pixels are filtered, the remaining colors are
//! quantized into swatches, and one swatch is chosen for each [`Role`]:
//! vibrant, muted, and their dark and light variants.
//!
//! # Examples
//!
//! ## Read an image file and get its palette.
//!
//! ```no_run
//! let image = image::open("some image").unwrap();
//! let palette = vibrance::Vibrant::builder(image).extract_palette().unwrap();
//!
//! if let Some(swatch) = &palette.vibrant {
//! 	println!("{} covers {} pixels", swatch.hex(), swatch.population());
//! }
//! ```
//!
//! ## Use k-means, keep every pixel, and fill the roles that were not found.
//!
//! ```no_run
//! use vibrance::{DefaultGenerator, KMeans, Vibrant};
//!
//! let image = image::open("some image").unwrap();
//! let palette = Vibrant::builder(image)
//! 	.quantizer(KMeans { seed: 42, ..KMeans::default() })
//! 	.generator(DefaultGenerator { fill_missing: true, ..DefaultGenerator::default() })
//! 	.clear_filters()
//! 	.extract_palette()
//! 	.unwrap();
//!
//! for (role, swatch) in palette.iter() {
//! 	println!("{role}: {}", swatch.hex());
//! }
//! ```
//!
//! ## Extract on a background thread.
//!
//! ```no_run
//! let image = image::open("some image").unwrap();
//! let task = vibrance::Vibrant::builder(image)
//! 	.max_dimension(256)
//! 	.build()
//! 	.unwrap()
//! 	.spawn_extract_palette()
//! 	.unwrap();
//!
//! let palette = task.join().unwrap();
//! println!("{}", palette.to_json().unwrap());
//! ```
//!
//! # Options
//!
//! ## Quality and Max Dimension
//!
//! Images are scaled down before anything else.
//! If a max dimension is set, the longer side is scaled down to it.
//! Otherwise, both sides are divided by the quality, which defaults to `5`.
//! A quality of `1` keeps every pixel.
//!
//! ## Color Count
//!
//! The maximum number of swatches the quantizer produces, `64` by default.
//! Fewer swatches make extraction faster but merge more distinct colors together.
//!
//! ## Filters
//!
//! A pixel is kept only if every filter accepts it. By default, a single [`DefaultFilter`]
//! drops mostly transparent, near black, and near white pixels.
//! Filters are applied to the pixels and then again to the quantized swatches.
//!
//! # Determinism
//!
//! The same image and options always give the same palette.
//! This holds with or without the `threads` feature.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

pub mod color;
mod error;
mod filter;
mod generator;
mod pipeline;
pub mod quantize;
mod roles;
mod source;
mod swatch;

pub use error::{DecodeError, Error};
pub use filter::{CombinedFilter, DefaultFilter, Filter};
pub use generator::{DefaultGenerator, Generator, Target, Weights};
pub use pipeline::{extract, Builder, Options, PaletteTask, Vibrant};
pub use quantize::{KMeans, MedianCut, Quantizer};
pub use roles::{Palette, Role};
pub use source::{scaled_dimensions, ImageSource};
pub use swatch::Swatch;
