use crate::error::Result;
use crate::vint::{ElementId, VInt};

/// The ID+Size pair prefixing every EBML element's payload
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ElementHeader {
	/// The element's ID, marker bits retained
	pub id: ElementId,
	/// The size of the element's data
	///
	/// May be [`VInt::UNKNOWN`] for elements whose length is not known up front.
	pub size: VInt,
}

impl ElementHeader {
	/// Parse an element header from `buf`, starting at `offset`
	///
	/// The ID is parsed first, then the size immediately after it. Returns the
	/// header and the total number of bytes consumed by the two fields.
	///
	/// # Errors
	///
	/// Whichever error the failing sub-parse produced, at that parse's own offset.
	///
	/// # Examples
	///
	/// ```rust
	/// use ebml_vint::ElementHeader;
	///
	/// # fn main() -> ebml_vint::Result<()> {
	/// // The EBML master element ID, followed by a 1-octet size of 4
	/// let buf = [0x1A, 0x45, 0xDF, 0xA3, 0x84];
	///
	/// let (header, consumed) = ElementHeader::parse(&buf, 0)?;
	/// assert_eq!(header.id, 0x1A45DFA3);
	/// assert_eq!(header.size.value(), 4);
	/// assert_eq!(consumed, 5);
	/// # Ok(()) }
	/// ```
	pub fn parse(buf: &[u8], offset: usize) -> Result<(Self, u8)> {
		let (id, id_length) = ElementId::parse(buf, offset)?;
		let (size, size_length) = VInt::parse(buf, offset + usize::from(id_length))?;

		Ok((Self { id, size }, id_length + size_length))
	}
}
