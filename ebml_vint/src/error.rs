use std::error::Error;
use std::fmt;

/// Alias for `Result<T, VintError>`
pub type Result<T> = std::result::Result<T, VintError>;

/// Errors that can occur while decoding or encoding vints
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VintError {
	/// The requested offset is at or beyond the end of the buffer
	OutOfBounds,
	/// The first byte of a vint has no set bits, so no length can be derived from it
	MalformedLengthMarker,
	/// The declared vint length extends past the end of the buffer
	TruncatedVint,
	/// The value cannot be represented in any supported vint width (up to 8 octets)
	ValueTooLarge,
}

impl fmt::Display for VintError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VintError::OutOfBounds => {
				write!(f, "Offset is at or beyond the end of the buffer")
			},
			VintError::MalformedLengthMarker => {
				write!(f, "First byte of a vint is all zeros, no valid length")
			},
			VintError::TruncatedVint => {
				write!(f, "Declared vint length extends past the end of the buffer")
			},
			VintError::ValueTooLarge => {
				write!(f, "Value does not fit in the maximum vint width of 8 octets")
			},
		}
	}
}

impl Error for VintError {}
