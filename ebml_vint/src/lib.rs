//! A simple EBML variable-length integer codec
//!
//! EBML (the binary container format Matroska and WebM are built on) encodes
//! both element IDs and element sizes as *vints*: self-describing unsigned
//! integers whose first byte declares, through the position of its highest
//! set bit, how many octets the whole number occupies.
//!
//! The two flavors share the same length marker but differ in what happens
//! to it after parsing:
//!
//! * [`ElementId`] keeps the marker bits as part of the value, so IDs of
//!   different widths can never collide.
//! * [`VInt`] strips the marker bits, yielding a plain magnitude. A size
//!   whose data bits are all ones decodes to the [`VInt::UNKNOWN`] sentinel.
//!
//! [`ElementHeader`] composes the two into the ID+Size pair that prefixes
//! every EBML element.
//!
//! # Examples
//!
//! ```rust
//! use ebml_vint::{EBML_ID, ElementHeader};
//!
//! # fn main() -> ebml_vint::Result<()> {
//! // The start of every Matroska/WebM file: the EBML master element
//! let buf = [0x1A, 0x45, 0xDF, 0xA3, 0x84];
//!
//! let (header, consumed) = ElementHeader::parse(&buf, 0)?;
//! assert_eq!(header.id, EBML_ID);
//! assert_eq!(header.size.value(), 4);
//! assert_eq!(consumed, 5);
//! # Ok(()) }
//! ```

mod error;
mod header;
mod vint;

pub use error::{Result, VintError};
pub use header::ElementHeader;
pub use vint::{ElementId, VInt};

/// The ID of the EBML master element
///
/// This is the magic number opening every Matroska/WebM file.
pub const EBML_ID: ElementId = ElementId(0x1A45_DFA3);
