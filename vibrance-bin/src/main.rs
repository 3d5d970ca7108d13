//! Print the six-role palette of an image.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
	clippy::pedantic,
	clippy::cargo,
	clippy::use_debug,
	clippy::dbg_macro,
	clippy::todo,
	clippy::unimplemented,
	clippy::unwrap_used,
	clippy::unwrap_in_result,
	clippy::unneeded_field_pattern,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::unnecessary_self_imports,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::string_slice,
	missing_docs,
	clippy::missing_docs_in_private_items,
	rustdoc::all,
	clippy::float_cmp_const,
	clippy::lossy_float_literal
)]
#![allow(clippy::doc_markdown, clippy::module_name_repetitions, clippy::missing_panics_doc)]

mod cli;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
	fmt::{self, Display},
	path::Path,
	process::ExitCode,
	time::Instant,
};

use clap::Parser;
use colored::Colorize;
use image::DynamicImage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vibrance::{color::TextColor, DefaultGenerator, KMeans, MedianCut, Palette, Role, Swatch, Vibrant};

/// Record the running time of an expression and log the elapsed time
macro_rules! time {
	($name: literal, $func_call: expr) => {{
		let start = Instant::now();
		let result = $func_call;
		tracing::debug!("{} took {}ms", $name, start.elapsed().as_millis());
		result
	}};
}

/// Error cases for the whole program
#[derive(Debug)]
enum AppError {
	/// Failed to read or decode the image file
	ImageLoad(image::ImageError),
	/// Failed to extract or serialize the palette
	Extract(vibrance::Error),
	/// Failed to create the thread pool
	#[cfg(feature = "threads")]
	ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for AppError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			AppError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
			AppError::Extract(e) => write!(f, "Failed to extract the palette: {e}"),
			#[cfg(feature = "threads")]
			AppError::ThreadPool(e) => write!(f, "Failed to create the thread pool: {e}"),
		}
	}
}

impl From<vibrance::Error> for AppError {
	fn from(e: vibrance::Error) -> Self {
		AppError::Extract(e)
	}
}

fn main() -> ExitCode {
	let options = Options::parse();

	init_tracing(options.verbose);

	let result = run_extract_and_print_palette(&options);

	// Returning Result<_> uses Debug printing instead of Display
	if let Err(e) = result {
		eprintln!("{e}");
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	}
}

/// Log to stderr, at the debug level if `verbose` and otherwise only warnings
fn init_tracing(verbose: bool) {
	let default = if verbose { "vibrance=debug" } else { "warn" };
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
		.with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
		.init();
}

/// Builds a thread pool and then runs `extract_and_print_palette`
#[cfg(feature = "threads")]
fn run_extract_and_print_palette(options: &Options) -> Result<(), AppError> {
	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(usize::from(options.threads))
		.build()
		.map_err(AppError::ThreadPool)?;

	pool.install(|| extract_and_print_palette(options))
}

/// Runs `extract_and_print_palette` on a single thread
#[cfg(not(feature = "threads"))]
fn run_extract_and_print_palette(options: &Options) -> Result<(), AppError> {
	extract_and_print_palette(options)
}

/// Load an image, extract its palette, and print the result using the given options
fn extract_and_print_palette(options: &Options) -> Result<(), AppError> {
	let image = time!("Image loading", load_image(&options.image))?;
	let palette = time!("Palette extraction", extract_palette(image, options))?;

	for line in palette_lines(&palette, options)? {
		println!("{line}");
	}

	Ok(())
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, AppError> {
	image::open(path).map_err(AppError::ImageLoad)
}

/// Run the extraction configured by the command line options
fn extract_palette(image: DynamicImage, options: &Options) -> Result<Palette, vibrance::Error> {
	let mut builder = Vibrant::builder(image)
		.max_color_count(options.color_count)
		.quality(options.quality)
		.generator(DefaultGenerator {
			fill_missing: options.fill_missing,
			..DefaultGenerator::default()
		})
		.clear_filters();

	if let Some(max_dimension) = options.max_dimension {
		builder = builder.max_dimension(max_dimension);
	}

	if let Some(filter) = options.filter() {
		builder = builder.add_filter(filter);
	}

	builder = match options.quantizer {
		QuantizerChoice::MedianCut => builder.quantizer(MedianCut),
		QuantizerChoice::Kmeans => builder.quantizer(KMeans {
			seed: options.seed,
			..KMeans::default()
		}),
	};

	builder.extract_palette()
}

/// The lines to print for a palette, one per role unless the output is JSON
fn palette_lines(palette: &Palette, options: &Options) -> Result<Vec<String>, vibrance::Error> {
	if options.output == FormatOutput::Json {
		return Ok(vec![palette.to_json()?]);
	}

	Ok(Role::ALL
		.into_iter()
		.map(|role| match palette.get(role) {
			Some(swatch) => format!("{role}: {} {}", format_swatch(swatch, options), population(swatch)),
			None => format!("{role}: -"),
		})
		.collect())
}

/// The population of a swatch in parentheses, or a marker for derived swatches
fn population(swatch: &Swatch) -> String {
	if swatch.is_synthetic() {
		"(synthetic)".to_owned()
	} else {
		format!("({})", swatch.population())
	}
}

/// Format and colorize the color of a swatch
fn format_swatch(swatch: &Swatch, options: &Options) -> String {
	let (r, g, b) = (swatch.red(), swatch.green(), swatch.blue());

	let text = match options.output {
		FormatOutput::Swatch => return "   ".on_truecolor(r, g, b).to_string(),
		FormatOutput::Hex | FormatOutput::Json => swatch.hex().to_owned(),
		FormatOutput::Rgb => format!("({r},{g},{b})"),
	};

	match options.colorize {
		Some(ColorizeOutput::Fg) => text.truecolor(r, g, b).to_string(),
		Some(ColorizeOutput::Bg) => {
			let text = match swatch.body_text_color() {
				TextColor::Light => text.truecolor(255, 255, 255),
				TextColor::Dark => text.truecolor(0, 0, 0),
			};
			text.on_truecolor(r, g, b).to_string()
		}
		None => text,
	}
}
