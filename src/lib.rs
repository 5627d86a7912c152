/***************************************************************************************************
 * Copyright (c) 2023, 2024 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * packbor module definition
 *
 * A memory efficient deserializer for packed CBOR (RFC8949 + draft-ietf-cbor-packed).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/

// Default configuration
#![no_std]
#![warn(missing_docs)]

//! # PACKBOR
//!
//! The `packbor` crate provides a streaming decoder for CBOR
//! [RFC 8949](https://datatracker.ietf.org/doc/rfc8949/) extended with the packed
//! representation of
//! [draft-ietf-cbor-packed](https://datatracker.ietf.org/doc/draft-ietf-cbor-packed/):
//! repeated sub-items are replaced by short references into packing tables, and the decoder
//! substitutes them transparently, so every accessor behaves as if it were reading the fully
//! unpacked document.
//!
//! The decoder exposes a cursor-style API over an in-memory, immutable byte buffer and yields
//! typed values without allocation. It requires neither the Rust standard library nor an
//! allocator, and both recursion depth and the set of simultaneously active packing tables
//! are bounded at build time, which makes the worst-case cost of decoding an untrusted
//! document predictable.
//!
//! ## Features
//!
//! - All CBOR primitive types: positive and negative integers, `bstr`, `tstr` (UTF-8
//!   validated), tags, simple values, and (with the `float` feature) half, single and double
//!   precision floats with exact half-to-single widening.
//! - Definite and indefinite length arrays and maps, walked through paired
//!   [`decoder::Decoder::enter_array`] / [`decoder::Decoder::enter_map`] and
//!   [`decoder::Decoder::leave_container`] calls.
//! - Packed CBOR: packing tables (tag 113), short and long form shared item references,
//!   nested and chained references, and externally supplied initial tables.
//! - Map lookup by text key, raw sub-item extraction and bounded deep skip.
//!
//! ## Examples
//!
//! Decoding a plain map (the cursor never allocates; strings are borrowed from the input):
//!
//! ```
//! use packbor::decoder::Decoder;
//! use packbor::error::CBORError;
//!
//! fn main() -> Result<(), CBORError> {
//!     // {"a": 1, "b": 2}
//!     let buf: &[u8] = &[0xA2, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02];
//!
//!     let dec = Decoder::new(buf);
//!     let map = dec.enter_map()?;
//!     let mut value = map.get_key_tstr("b")?;
//!     assert_eq!(value.get_uint8()?, 2);
//!     Ok(())
//! }
//! ```
//!
//! Decoding a packed document. Tag 113 wraps `[[42], [ref(0)]]`: a one-entry packing table
//! and a rump array whose only element is a reference to entry 0. The decoder presents it
//! as `[42]`:
//!
//! ```
//! use packbor::decoder::Decoder;
//! use packbor::error::CBORError;
//!
//! fn main() -> Result<(), CBORError> {
//!     let buf: &[u8] = &[0xD8, 0x71, 0x82, 0x81, 0x18, 0x2A, 0x81, 0xE0];
//!
//!     let mut dec = Decoder::new_packed(buf);
//!     let mut arr = dec.enter_array()?;
//!     assert_eq!(arr.get_uint8()?, 42);
//!     assert!(arr.at_end());
//!     dec.leave_container(&arr)?;
//!     assert!(dec.at_end());
//!     Ok(())
//! }
//! ```
//!
//! The same buffer decoded with [`decoder::Decoder::new`] yields the literal tag and its
//! payload, references included, which is what a re-packer or a diagnostic tool wants.

// Pull in std if we are testing or if it is defined as feature (because we run tests on a
// platform supporting I/O and full feature set.
#[cfg(any(feature = "std", test))]
extern crate std;

// If we are really building no_std, pull in core as well. It is aliased as std so that "use"
// statements are always the same
#[cfg(all(not(feature = "std"), not(test)))]
extern crate core as std;

#[cfg(feature = "float")]
extern crate half;

pub(crate) mod constants;
pub(crate) mod container;
pub(crate) mod decode;
pub(crate) mod packed;
pub(crate) mod skip;

/// The `error` module contains error definitions used throughout `packbor`.
pub mod error;

/// The `decoder` module exports the decoding cursor, the major type of a decoded item, and
/// the build-time decoding bounds.
pub mod decoder {
    pub use super::constants::{
        PACKED_NESTED_TABLES_MAX, RECURSION_MAX, TAG_PACKED_REF_SHARED, TAG_PACKED_TABLE,
    };
    pub use super::decode::{Decoder, MajorType};
}
