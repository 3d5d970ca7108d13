//! Error types returned by palette extraction and palette decoding

use thiserror::Error;

/// Reasons a hex code or serialized palette could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	/// The hex code did not have 3 or 6 digits after the optional `#`
	#[error("invalid hex code length for {0:?} (expected 3 or 6 digits)")]
	InvalidLength(String),
	/// The hex code contained a character that is not a hexadecimal digit
	#[error("invalid hex digit in {0:?}")]
	InvalidDigit(String),
	/// The serialized palette was not valid JSON or had the wrong shape
	#[error("malformed palette: {0}")]
	Malformed(String),
}

/// Errors that can occur while configuring or running an extraction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// The source image has a zero dimension or an unusable pixel buffer
	#[error("invalid image: {0}")]
	InvalidImage(String),
	/// A hex code or serialized palette could not be decoded
	#[error("decode error: {0}")]
	Decode(#[from] DecodeError),
	/// The extraction options were rejected at construction
	#[error("invalid configuration: {0}")]
	Configuration(String),
	/// The background extraction thread could not be started
	#[error("failed to start extraction thread: {0}")]
	Thread(String),
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Decode(DecodeError::Malformed(err.to_string()))
	}
}
