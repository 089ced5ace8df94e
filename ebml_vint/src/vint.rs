use crate::error::{Result, VintError};

use std::fmt::{Debug, Display, Formatter, LowerHex, UpperHex};

use byteorder::{BigEndian, ByteOrder};

// Each octet spends a single bit on the length marker
const USABLE_BITS_PER_BYTE: u32 = 7;
const MAX_OCTET_LENGTH: u8 = 8;

/// An EBML size/data variable-length integer
///
/// A `VInt` is an unsigned integer composed of up to 8 octets, with 7 usable bits
/// per octet. The length marker bits of the first byte are stripped during parsing,
/// leaving a plain magnitude.
///
/// To ensure safe construction of `VInt`s, users must create them through the
/// `TryFrom` implementation or [`VInt::parse`].
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct VInt(pub(crate) u64);

impl VInt {
	/// The maximum value that can be represented by a `VInt`
	pub const MAX: u64 = u64::MAX >> MAX_OCTET_LENGTH;
	/// A `VInt` with a value of 0
	pub const ZERO: Self = Self(0);
	/// An unknown-sized `VInt`
	///
	/// Since EBML is built for streaming, elements can specify that their data length
	/// is unknown. On the wire this appears as a size field with every data bit set to
	/// one; internally it is held out-of-band so it never collides with a real value.
	///
	/// See [`Self::is_unknown()`]
	pub const UNKNOWN: Self = Self(1 << 63);

	/// Gets the inner value of the `VInt`
	///
	/// # Examples
	///
	/// ```rust
	/// use ebml_vint::VInt;
	///
	/// # fn main() -> ebml_vint::Result<()> {
	/// let vint = VInt::try_from(2)?;
	/// assert_eq!(vint.value(), 2);
	/// # Ok(()) }
	/// ```
	#[inline]
	pub fn value(self) -> u64 {
		self.0
	}

	/// Whether this `VInt` represents an unknown size
	#[inline]
	pub fn is_unknown(self) -> bool {
		self == Self::UNKNOWN
	}

	/// Parse a size-flavor `VInt` from `buf`, starting at `offset`
	///
	/// The marker bits of the first byte are masked off before the value is composed
	/// big-endian across the remaining bytes. A field whose data bits are all ones
	/// parses to [`VInt::UNKNOWN`].
	///
	/// Returns the `VInt` and the number of bytes consumed.
	///
	/// # Errors
	///
	/// * [`VintError::OutOfBounds`] if `offset` is at or beyond the end of `buf`
	/// * [`VintError::MalformedLengthMarker`] if the first byte is all zeros
	/// * [`VintError::TruncatedVint`] if the declared length overruns `buf`
	///
	/// # Examples
	///
	/// ```rust
	/// use ebml_vint::VInt;
	///
	/// # fn main() -> ebml_vint::Result<()> {
	/// let (vint, bytes_read) = VInt::parse(&[0b1000_0010], 0)?;
	/// assert_eq!(vint.value(), 2);
	/// assert_eq!(bytes_read, 1);
	///
	/// // A first byte of zero declares no valid length
	/// assert!(VInt::parse(&[0b0000_0000], 0).is_err());
	/// # Ok(()) }
	/// ```
	pub fn parse(buf: &[u8], offset: usize) -> Result<(Self, u8)> {
		let (val, length) = parse_vint(buf, offset, false)?;

		// Special case for unknown VInts (all data bits set to one)
		if val + 1 == 1u64 << (USABLE_BITS_PER_BYTE * u32::from(length)) {
			return Ok((Self::UNKNOWN, length));
		}

		Ok((Self(val), length))
	}

	/// Represents the length of the `VInt` in octets
	///
	/// NOTE: The value returned will always be <= 8
	///
	/// # Examples
	///
	/// ```rust
	/// use ebml_vint::VInt;
	///
	/// # fn main() -> ebml_vint::Result<()> {
	/// // Anything <= 126 will fit into a single octet
	/// let vint = VInt::try_from(100)?;
	/// assert_eq!(vint.octet_length(), 1);
	///
	/// // A larger number will need more
	/// let vint = VInt::try_from(500_000)?;
	/// assert_eq!(vint.octet_length(), 3);
	/// # Ok(()) }
	/// ```
	#[inline]
	pub fn octet_length(self) -> u8 {
		octet_length(self.0)
	}

	/// Converts the `VInt` into a byte Vec
	///
	/// `min_length` can be used to specify the minimum number of octets the number
	/// should occupy, e.g. to re-encode a field at the width it was read with.
	///
	/// A value whose data bits would come out all ones is written one octet wider,
	/// since the all-ones pattern is reserved for [`VInt::UNKNOWN`].
	///
	/// # Errors
	///
	/// * [`VintError::ValueTooLarge`] if no width of <= 8 octets suffices
	///
	/// # Examples
	///
	/// ```rust
	/// use ebml_vint::VInt;
	///
	/// # fn main() -> ebml_vint::Result<()> {
	/// let vint = VInt::try_from(10)?;
	/// let bytes = vint.as_bytes(None)?;
	///
	/// assert_eq!(bytes, &[0b1000_1010]);
	/// # Ok(()) }
	/// ```
	pub fn as_bytes(self, min_length: Option<u8>) -> Result<Vec<u8>> {
		let unknown = self.is_unknown();

		let value = if unknown { 0 } else { self.0 };
		if value > Self::MAX {
			return Err(VintError::ValueTooLarge);
		}

		let mut octets = std::cmp::max(octet_length(value), min_length.unwrap_or(0));
		if octets > MAX_OCTET_LENGTH {
			return Err(VintError::ValueTooLarge);
		}

		// A real value must never produce the all-ones pattern, which reads
		// back as an unknown size
		if !unknown && value + 1 == 1u64 << (u32::from(octets) * USABLE_BITS_PER_BYTE) {
			octets += 1;
			if octets > MAX_OCTET_LENGTH {
				return Err(VintError::ValueTooLarge);
			}
		}

		let data_bits = u32::from(octets) * USABLE_BITS_PER_BYTE;

		// All VINT_DATA bits set to one
		let value = if unknown {
			(1u64 << data_bits) - 1
		} else {
			value
		};

		// Fold the octet length marker into the high bits
		let value = value | 1u64 << data_bits;

		let mut buf = vec![0; usize::from(octets)];
		BigEndian::write_uint(&mut buf, value, usize::from(octets));
		Ok(buf)
	}
}

impl TryFrom<u64> for VInt {
	type Error = VintError;

	fn try_from(value: u64) -> Result<Self> {
		if value > Self::MAX {
			return Err(VintError::ValueTooLarge);
		}

		Ok(Self(value))
	}
}

impl PartialEq<u64> for VInt {
	fn eq(&self, other: &u64) -> bool {
		self.0 == *other
	}
}

impl Display for VInt {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Debug for VInt {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let mut debug = f.debug_tuple("VInt");
		if self.is_unknown() {
			debug.field(&"<unknown>");
		} else {
			debug.field(&self.0);
		}
		debug.finish()
	}
}

/// An EBML element ID
///
/// An `ElementId` is a vint, but with the following conditions:
///
/// * The `VINT_MARKER` is retained after parsing, so IDs of different octet lengths
///   never compare equal even when their stripped magnitudes coincide
/// * When encoding, the octet length is derived from the marker bit already present
///   in the value
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ElementId(pub(crate) u64);

impl ElementId {
	/// Parse an `ElementId` from `buf`, starting at `offset`
	///
	/// An element ID is parsed similarly to a normal vint, but the `VINT_MARKER`
	/// is retained.
	///
	/// Returns the `ElementId` and the number of bytes consumed.
	///
	/// # Errors
	///
	/// * [`VintError::OutOfBounds`] if `offset` is at or beyond the end of `buf`
	/// * [`VintError::MalformedLengthMarker`] if the first byte is all zeros
	/// * [`VintError::TruncatedVint`] if the declared length overruns `buf`
	///
	/// # Examples
	///
	/// ```rust
	/// use ebml_vint::ElementId;
	///
	/// # fn main() -> ebml_vint::Result<()> {
	/// // Parse the EBML header element ID
	/// let (id, bytes_read) = ElementId::parse(&[0x1A, 0x45, 0xDF, 0xA3], 0)?;
	/// assert_eq!(id, 0x1A45DFA3);
	/// assert_eq!(bytes_read, 4);
	/// # Ok(()) }
	/// ```
	pub fn parse(buf: &[u8], offset: usize) -> Result<(Self, u8)> {
		let (val, bytes_read) = parse_vint(buf, offset, true)?;
		Ok((Self(val), bytes_read))
	}

	/// Get the inner value of the `ElementId`
	pub fn value(self) -> u64 {
		self.0
	}

	/// Converts the `ElementId` into a byte Vec
	///
	/// The value is written verbatim, marker bits included; the octet length is the
	/// position of the marker bit.
	///
	/// # Errors
	///
	/// * [`VintError::MalformedLengthMarker`] if the value embeds no valid marker bit
	/// * [`VintError::ValueTooLarge`] if the marker position implies a length > 8
	///
	/// # Examples
	///
	/// ```rust
	/// use ebml_vint::ElementId;
	///
	/// const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
	///
	/// # fn main() -> ebml_vint::Result<()> {
	/// let (id, _bytes_read) = ElementId::parse(&EBML_MAGIC, 0)?;
	/// let bytes = id.as_bytes()?;
	///
	/// assert_eq!(bytes, &EBML_MAGIC);
	/// # Ok(()) }
	/// ```
	pub fn as_bytes(self) -> Result<Vec<u8>> {
		if self.0 == 0 {
			return Err(VintError::MalformedLengthMarker);
		}

		// For an ID of length N, the marker sits at bit 7 * N of the whole value
		let marker_bit = self.0.ilog2();
		if marker_bit == 0 || marker_bit % USABLE_BITS_PER_BYTE != 0 {
			return Err(VintError::MalformedLengthMarker);
		}

		let octets = (marker_bit / USABLE_BITS_PER_BYTE) as u8;
		if octets > MAX_OCTET_LENGTH {
			return Err(VintError::ValueTooLarge);
		}

		let mut buf = vec![0; usize::from(octets)];
		BigEndian::write_uint(&mut buf, self.0, usize::from(octets));
		Ok(buf)
	}
}

impl PartialEq<u64> for ElementId {
	fn eq(&self, other: &u64) -> bool {
		self.0 == *other
	}
}

impl LowerHex for ElementId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		LowerHex::fmt(&self.0, f)
	}
}

impl UpperHex for ElementId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		UpperHex::fmt(&self.0, f)
	}
}

impl Debug for ElementId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "ElementId({:#X})", self.0)
	}
}

fn parse_vint(buf: &[u8], offset: usize, retain_marker: bool) -> Result<(u64, u8)> {
	let Some(&first) = buf.get(offset) else {
		return Err(VintError::OutOfBounds);
	};

	let length = verify_length(first)?;
	let end = offset + usize::from(length);
	if end > buf.len() {
		return Err(VintError::TruncatedVint);
	}

	let mut val = BigEndian::read_uint(&buf[offset..end], usize::from(length));
	if !retain_marker {
		// The marker is the highest set bit of the first byte, which lands at
		// bit 7 * length of the composed value
		val ^= 1u64 << (USABLE_BITS_PER_BYTE * u32::from(length));
	}

	Ok((val, length))
}

// Verify that the octet length is nonzero and <= 8
fn verify_length(first_byte: u8) -> Result<u8> {
	// A value of 0b0000_0000 indicates either an invalid VInt, or one with an octet length > 8
	if first_byte == 0b0000_0000 {
		return Err(VintError::MalformedLengthMarker);
	}

	Ok(MAX_OCTET_LENGTH - first_byte.ilog2() as u8)
}

fn octet_length(mut value: u64) -> u8 {
	let mut octets = 0;
	loop {
		octets += 1;

		value >>= USABLE_BITS_PER_BYTE;
		if value == 0 {
			break;
		}
	}

	octets
}

#[cfg(test)]
mod tests {
	use crate::error::VintError;
	use crate::vint::{ElementId, VInt};

	const VALID_REPRESENTATIONS_OF_2: [&[u8]; 8] = [
		&[0b1000_0010],
		&[0b0100_0000, 0b0000_0010],
		&[0b0010_0000, 0b0000_0000, 0b0000_0010],
		&[0b0001_0000, 0b0000_0000, 0b0000_0000, 0b0000_0010],
		&[0b0000_1000, 0b0000_0000, 0b0000_0000, 0b0000_0000, 0b0010],
		&[
			0b0000_0100,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0010,
		],
		&[
			0b0000_0010,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0010,
		],
		&[
			0b0000_0001,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0000,
			0b0000_0010,
		],
	];

	#[test_log::test]
	fn bytes_to_vint() {
		// Overlong encodings are accepted on decode
		for representation in VALID_REPRESENTATIONS_OF_2 {
			let (vint, bytes_read) = VInt::parse(representation, 0).unwrap();
			assert_eq!(vint.value(), 2);
			assert_eq!(usize::from(bytes_read), representation.len());
		}
	}

	#[test_log::test]
	fn vint_to_bytes() {
		for representation in VALID_REPRESENTATIONS_OF_2 {
			let (vint, _bytes_read) = VInt::parse(representation, 0).unwrap();
			assert_eq!(
				vint.as_bytes(Some(representation.len() as u8)).unwrap(),
				representation
			);
		}
	}

	#[test_log::test]
	fn length_marker_per_octet_count() {
		for length in 1u8..=8 {
			let mut buf = vec![0u8; usize::from(length)];
			buf[0] = 0x80 >> (length - 1);

			let (vint, bytes_read) = VInt::parse(&buf, 0).unwrap();
			assert_eq!(bytes_read, length);
			assert_eq!(vint.value(), 0);
		}
	}

	#[test_log::test]
	fn zero_first_byte_is_malformed() {
		assert_eq!(
			VInt::parse(&[0b0000_0000], 0),
			Err(VintError::MalformedLengthMarker)
		);
		assert_eq!(
			ElementId::parse(&[0b0000_0000, 0xFF], 0),
			Err(VintError::MalformedLengthMarker)
		);
	}

	#[test_log::test]
	fn truncated_vints() {
		// Declares 2 octets, only 1 available
		assert_eq!(VInt::parse(&[0b0100_0000], 0), Err(VintError::TruncatedVint));
		// Declares 8 octets, only 3 available
		assert_eq!(
			VInt::parse(&[0b0000_0001, 0xFF, 0xFF], 0),
			Err(VintError::TruncatedVint)
		);
		// Same rules at a nonzero offset
		assert_eq!(
			VInt::parse(&[0x81, 0b0010_0000, 0x00], 1),
			Err(VintError::TruncatedVint)
		);
	}

	#[test_log::test]
	fn out_of_bounds_offsets() {
		assert_eq!(VInt::parse(&[], 0), Err(VintError::OutOfBounds));
		assert_eq!(VInt::parse(&[0x81], 1), Err(VintError::OutOfBounds));
		assert_eq!(ElementId::parse(&[0x81], 2), Err(VintError::OutOfBounds));
	}

	#[test_log::test]
	fn unknown_size_sentinel() {
		// All data bits set to one, at any width, means "size unknown"
		let (vint, bytes_read) = VInt::parse(&[0xFF], 0).unwrap();
		assert!(vint.is_unknown());
		assert_eq!(bytes_read, 1);

		let (vint, bytes_read) = VInt::parse(&[0b0111_1111, 0xFF], 0).unwrap();
		assert!(vint.is_unknown());
		assert_eq!(bytes_read, 2);

		assert_eq!(VInt::UNKNOWN.as_bytes(None).unwrap(), &[0xFF]);
		assert_eq!(VInt::UNKNOWN.as_bytes(Some(2)).unwrap(), &[0b0111_1111, 0xFF]);
	}

	#[test_log::test]
	fn large_integers_should_fail() {
		assert!(VInt::try_from(u64::MAX).is_err());

		let mut acc = 1000;
		for _ in 0..16 {
			assert!(VInt::try_from(u64::MAX - acc).is_err());
			acc *= 10;
		}
	}

	#[test_log::test]
	fn maximum_possible_representable_vint() {
		assert!(VInt::try_from(u64::MAX >> 8).is_ok());
	}

	#[test_log::test]
	fn octet_lengths() {
		let n = u64::MAX >> 8;
		for i in 1u8..=7 {
			assert_eq!(VInt::try_from(n >> (i * 7)).unwrap().octet_length(), 8 - i);
		}
	}

	#[test_log::test]
	fn round_trip() {
		// Values picked to cover every octet length, including the all-ones
		// boundaries that must widen to avoid the unknown-size pattern
		let values = [
			0u64,
			1,
			2,
			100,
			126,
			127,
			128,
			500_000,
			(1 << 14) - 1,
			(1 << 21) - 2,
			(1 << 21) - 1,
			(1 << 28) + 1,
			(1 << 35) | 0xBEEF,
			(1 << 49) - 5,
			(1 << 49) - 1,
			(u64::MAX >> 8) - 1,
		];

		for value in values {
			let vint = VInt::try_from(value).unwrap();
			let bytes = vint.as_bytes(None).unwrap();
			let (parsed, bytes_read) = VInt::parse(&bytes, 0).unwrap();

			assert_eq!(parsed.value(), value);
			assert_eq!(usize::from(bytes_read), bytes.len());
		}
	}

	#[test_log::test]
	fn all_ones_boundary_values_widen() {
		// 127, 2^14 - 1, ... have every data bit set at their minimal width,
		// which is the unknown-size pattern; encoding takes one extra octet
		for octets in 1u8..=7 {
			let value = (1u64 << (octets * 7)) - 1;

			let vint = VInt::try_from(value).unwrap();
			let bytes = vint.as_bytes(None).unwrap();
			assert_eq!(bytes.len(), usize::from(octets) + 1);

			let (parsed, bytes_read) = VInt::parse(&bytes, 0).unwrap();
			assert!(!parsed.is_unknown());
			assert_eq!(parsed.value(), value);
			assert_eq!(usize::from(bytes_read), bytes.len());
		}

		// The 8-octet all-ones value has nowhere left to widen
		assert_eq!(
			VInt::try_from(VInt::MAX).unwrap().as_bytes(None),
			Err(VintError::ValueTooLarge)
		);
	}

	#[test_log::test]
	fn id_retains_marker_bits() {
		const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

		let (id, bytes_read) = ElementId::parse(&EBML_MAGIC, 0).unwrap();
		assert_eq!(id, 0x1A45DFA3);
		assert_eq!(bytes_read, 4);
		assert_eq!(id.as_bytes().unwrap(), &EBML_MAGIC);
		assert_eq!(format!("{id:x}"), "1a45dfa3");
		assert_eq!(format!("{id:X}"), "1A45DFA3");

		// A 1-octet ID keeps its marker too
		let (id, bytes_read) = ElementId::parse(&[0xBF], 0).unwrap();
		assert_eq!(id, 0xBF);
		assert_eq!(bytes_read, 1);
	}

	#[test_log::test]
	fn id_without_marker_cannot_encode() {
		// 0x40 has its highest bit below any valid marker position
		assert_eq!(
			ElementId(0x40).as_bytes(),
			Err(VintError::MalformedLengthMarker)
		);
		assert_eq!(ElementId(0).as_bytes(), Err(VintError::MalformedLengthMarker));
	}

	#[test_log::test]
	fn min_length_padding() {
		let vint = VInt::try_from(4).unwrap();
		assert_eq!(vint.as_bytes(None).unwrap(), &[0b1000_0100]);
		assert_eq!(
			vint.as_bytes(Some(3)).unwrap(),
			&[0b0010_0000, 0b0000_0000, 0b0000_0100]
		);
		assert_eq!(vint.as_bytes(Some(9)), Err(VintError::ValueTooLarge));
	}
}
