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
 * packbor CBOR Error API
 *
 * A memory efficient deserializer for packed CBOR (RFC8949 + draft-ietf-cbor-packed).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use std::result;

#[cfg(any(feature = "std", test))]
use thiserror::Error;

/// An alias for Result<T, CBORError> used throughout this crate.
pub type Result<T> = result::Result<T, CBORError>;

/// `CBORError` provides information about errors decoding CBOR items and resolving packed
/// CBOR references.
#[cfg_attr(any(feature = "std", test), derive(Copy, Clone, Error, Debug, PartialEq, Eq))]
#[cfg_attr(all(not(feature = "std"), not(test)), derive(Copy, Clone, Debug, PartialEq, Eq))]
pub enum CBORError {
    /// No item of the requested kind was found. This is a control-flow result rather than a
    /// decoding failure: a map key is absent, or no packed item applies at the current position.
    #[cfg_attr(any(feature = "std", test), error("Requested item not found - this is usually recoverable"))]
    NotFound,
    /// The buffer has no further bytes where an item (or the rest of an item) was expected.
    #[cfg_attr(any(feature = "std", test), error("Buffer insufficient to process the next item"))]
    End,
    /// The item at the cursor does not have the requested major type, or carries a reserved
    /// additional-information encoding.
    #[cfg_attr(any(feature = "std", test), error("Did not match expected CBOR type"))]
    InvalidType,
    /// The embedded argument is wider than the accessor's declared maximum.
    #[cfg_attr(any(feature = "std", test), error("Overflow in number conversion"))]
    Overflow,
    /// The recursion limit was reached while walking nested items or packed references.
    #[cfg_attr(any(feature = "std", test), error("Recursion limit reached"))]
    Recursion,
    /// A packing table definition or a reference is not well-formed.
    #[cfg_attr(any(feature = "std", test), error("Malformed packed CBOR item"))]
    PackedFormat,
    /// The maximum number of simultaneously active packing tables was exhausted.
    #[cfg_attr(any(feature = "std", test), error("Active packing table limit exhausted"))]
    PackedMemory,
    /// A shared-item reference does not resolve within the active packing tables.
    #[cfg_attr(any(feature = "std", test), error("Undefined shared item reference"))]
    PackedUndefinedReference,
    /// A tstr input contains an invalid UTF8 sequence.
    #[cfg_attr(any(feature = "std", test), error("A tstr contains an invalid UTF8 sequence"))]
    Utf8Error,
}
