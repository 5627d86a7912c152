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
 * packbor CBOR Decoder
 *
 * A memory efficient deserializer for packed CBOR (RFC8949 + draft-ietf-cbor-packed).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
/// # Low-level packed CBOR decoding functions
///
/// This module contains the cursor type and the typed item accessors. A [`Decoder`] is
/// constructed over a byte slice and keeps track of the current parse position, the container
/// item count and the set of active packing tables. Every accessor first resolves packed CBOR
/// at the cursor position, so callers observe the document as if it had been unpacked.
use crate::constants::*;
use crate::error::{CBORError, Result};
use crate::packed;

use bitflags::bitflags;

use std::convert::TryInto;
use std::str::from_utf8;

#[cfg(feature = "float")]
use half::f16;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

bitflags! {
    /// State bits carried by a [`Decoder`] cursor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Flags: u8 {
        /// The cursor walks the body of an array or map.
        const CONTAINER = 0b0000_0001;
        /// The container carries no item count and is terminated by a break byte.
        const INDEFINITE = 0b0000_0010;
        /// Packed CBOR items are recognized and resolved through this cursor.
        const PACKED = 0b0000_0100;
        /// The cursor was materialized from a shared item reference and does not
        /// advance within its parent's byte stream.
        const SHARED = 0b0000_1000;
    }
}

/// The major type of a CBOR item: the top three bits of its initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorType {
    /// Major type 0: positive integers
    UInt,
    /// Major type 1: negative integers
    NInt,
    /// Major type 2: byte strings
    Bstr,
    /// Major type 3: UTF-8 text strings
    Tstr,
    /// Major type 4: arrays
    Array,
    /// Major type 5: maps
    Map,
    /// Major type 6: tagged items
    Tag,
    /// Major type 7: floats and simple values
    Float,
}

impl MajorType {
    pub(crate) fn from_initial(byte: u8) -> MajorType {
        match byte >> MT_SHIFT {
            0 => MajorType::UInt,
            1 => MajorType::NInt,
            2 => MajorType::Bstr,
            3 => MajorType::Tstr,
            4 => MajorType::Array,
            5 => MajorType::Map,
            6 => MajorType::Tag,
            _ => MajorType::Float,
        }
    }

    /// The major type as a bit pattern on the initial byte, with zero AI bits.
    pub(crate) fn bits(self) -> u8 {
        (self as u8) << MT_SHIFT
    }
}

/// A decoding cursor over a CBOR buffer. The buffer has lifetime `'buf`, which must be longer
/// than any borrow from the buffer itself, including the active packing tables.
///
/// The cursor is a few words plus the inline table array and is freely copied: container entry
/// and packed resolution both produce derived cursors over the same buffer.
///
/// ## Example
/// ```
/// use packbor::decoder::Decoder;
/// use packbor::error::CBORError;
///
/// fn main() -> Result<(), CBORError> {
///     let buf: &[u8] = &[0x18, 0x2A];
///     let mut dec = Decoder::new(buf);
///     assert_eq!(dec.get_uint8()?, 42);
///     assert!(dec.at_end());
///     Ok(())
/// }
/// ```
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Decoder<'buf> {
    /// Window over the underlying data buffer; the window end is the cursor's end of input.
    pub(crate) buf: &'buf [u8],
    /// Offset within `buf` of the initial byte of the next item to decode.
    pub(crate) index: usize,
    /// Items left to read in a definite length container. Maps count keys and values
    /// individually. Meaningless outside containers.
    pub(crate) remaining: u64,
    pub(crate) flags: Flags,
    /// Active packing tables, outermost first. Each entry spans one CBOR array literal.
    pub(crate) tables: [Option<&'buf [u8]>; PACKED_NESTED_TABLES_MAX],
    pub(crate) num_active_tables: u8,
}

impl<'buf> Decoder<'buf> {
    /// Construct a decoder over `buf` with packed CBOR support disabled. Packing tags and
    /// references decode as the plain tags and simple values they are encoded as.
    #[cfg_attr(feature = "trace", trace)]
    pub fn new(buf: &'buf [u8]) -> Decoder<'buf> {
        Decoder {
            buf,
            index: 0,
            remaining: 0,
            flags: Flags::empty(),
            tables: [None; PACKED_NESTED_TABLES_MAX],
            num_active_tables: 0,
        }
    }

    /// Construct a decoder over `buf` with packed CBOR support enabled.
    #[cfg_attr(feature = "trace", trace)]
    pub fn new_packed(buf: &'buf [u8]) -> Decoder<'buf> {
        let mut value = Decoder::new(buf);
        value.flags = Flags::PACKED;
        value
    }

    /// Construct a packed decoder with an externally supplied initial packing table.
    ///
    /// `table` must span a single CBOR array literal; its elements become addressable from
    /// `buf` as references `0..` before any table the document itself defines.
    #[cfg_attr(feature = "trace", trace)]
    pub fn new_packed_with_table(buf: &'buf [u8], table: &'buf [u8]) -> Decoder<'buf> {
        let mut value = Decoder::new_packed(buf);
        value.tables[0] = Some(table);
        value.num_active_tables = 1;
        value
    }

    #[inline]
    pub(crate) fn over_end(&self) -> bool {
        self.index >= self.buf.len()
    }

    #[inline]
    pub(crate) fn packed_enabled(&self) -> bool {
        self.flags.contains(Flags::PACKED)
    }

    /// Advance past one consumed item: `n` bytes forward, one container slot down.
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        self.index += n;
        self.remaining = self.remaining.wrapping_sub(1);
    }

    /// Advance without consuming an item (tag heads, packed wrappers).
    #[inline]
    pub(crate) fn advance_bytes(&mut self, n: usize) {
        self.index += n;
    }

    /// The major type of the raw byte at the cursor, without packed resolution.
    pub(crate) fn item_major(&self) -> Result<MajorType> {
        if self.at_end() {
            return Err(CBORError::End);
        }
        Ok(MajorType::from_initial(self.buf[self.index]))
    }

    /// The AI bits of the initial byte at the cursor. Caller must know the cursor is in bounds.
    #[inline]
    pub(crate) fn initial_info(&self) -> u8 {
        self.buf[self.index] & AI_MASK
    }

    /// Decode the argument embedded in the item head at the cursor.
    ///
    /// On success, returns the fully assembled unsigned argument and the head length in bytes.
    /// The cursor is not advanced, so a type mismatch probe is non-destructive. `max` bounds
    /// the accepted argument width (one of the `PAYLOAD_*` constants); a wider encoding fails
    /// with `Overflow`. Reserved AI values and indefinite length heads fail with `InvalidType`.
    pub(crate) fn head_value(&self, max: u8, major: MajorType) -> Result<(u64, usize)> {
        if self.item_major()? != major {
            return Err(CBORError::InvalidType);
        }
        let ai = self.initial_info();
        if ai <= PAYLOAD_AI_BITS {
            return Ok((ai as u64, 1));
        }
        if ai > PAYLOAD_EIGHT_BYTES {
            return Err(CBORError::InvalidType);
        }
        if ai > max {
            return Err(CBORError::Overflow);
        }
        let bytes = 1usize << (ai - PAYLOAD_ONE_BYTE);
        let start = self.index + 1;
        // An argument ending exactly at the window end is legal.
        if start + bytes > self.buf.len() {
            return Err(CBORError::End);
        }
        let arg = &self.buf[start..start + bytes];
        let value = match ai {
            PAYLOAD_ONE_BYTE => arg[0] as u64,
            PAYLOAD_TWO_BYTES => {
                u16::from_be_bytes(arg.try_into().map_err(|_| CBORError::End)?) as u64
            }
            PAYLOAD_FOUR_BYTES => {
                u32::from_be_bytes(arg.try_into().map_err(|_| CBORError::End)?) as u64
            }
            _ => u64::from_be_bytes(arg.try_into().map_err(|_| CBORError::End)?),
        };
        Ok((value, 1 + bytes))
    }

    /// Run `f` on the packed resolution of the cursor: on the substituted item's cursor if a
    /// packed item was found and consumed, on `self` unchanged otherwise.
    pub(crate) fn with_resolved<T>(
        &mut self,
        f: impl FnOnce(&mut Decoder<'buf>) -> Result<T>,
    ) -> Result<T> {
        if let Some(mut followed) = packed::resolve(self, RECURSION_MAX)? {
            f(&mut followed)
        } else {
            f(self)
        }
    }

    /// Consume the single byte `val`, failing with `InvalidType` on anything else.
    fn value_match_exact(&mut self, val: u8) -> Result<()> {
        if self.over_end() {
            Err(CBORError::End)
        } else if self.buf[self.index] == val {
            self.advance(1);
            Ok(())
        } else {
            Err(CBORError::InvalidType)
        }
    }

    /// Return the major type of the item at the cursor, after packed resolution.
    ///
    /// Never advances and never mutates, even on failure.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_type(&self) -> Result<MajorType> {
        let mut probe = *self;
        match packed::resolve(&mut probe, RECURSION_MAX - 1)? {
            Some(followed) => followed.item_major(),
            None => probe.item_major(),
        }
    }

    fn get_and_advance_uint(&mut self, max: u8) -> Result<u64> {
        self.with_resolved(|c| {
            let (value, len) = c.head_value(max, MajorType::UInt)?;
            c.advance(len);
            Ok(value)
        })
    }

    /// Read a positive integer encoded on at most one argument byte.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_uint8(&mut self) -> Result<u8> {
        self.get_and_advance_uint(PAYLOAD_ONE_BYTE).map(|v| v as u8)
    }

    /// Read a positive integer encoded on at most two argument bytes.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_uint16(&mut self) -> Result<u16> {
        self.get_and_advance_uint(PAYLOAD_TWO_BYTES)
            .map(|v| v as u16)
    }

    /// Read a positive integer encoded on at most four argument bytes.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_uint32(&mut self) -> Result<u32> {
        self.get_and_advance_uint(PAYLOAD_FOUR_BYTES)
            .map(|v| v as u32)
    }

    /// Read a positive integer encoded on at most eight argument bytes.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_uint64(&mut self) -> Result<u64> {
        self.get_and_advance_uint(PAYLOAD_EIGHT_BYTES)
    }

    fn get_and_advance_int(&mut self, max: u8, bound: u64) -> Result<i64> {
        self.with_resolved(|c| {
            let major = match c.item_major()? {
                m @ MajorType::UInt | m @ MajorType::NInt => m,
                _ => return Err(CBORError::InvalidType),
            };
            let (value, len) = c.head_value(max, major)?;
            if value > bound {
                return Err(CBORError::Overflow);
            }
            c.advance(len);
            if major == MajorType::NInt {
                Ok(-(value as i64) - 1)
            } else {
                Ok(value as i64)
            }
        })
    }

    /// Read a positive or negative integer in the value range of `i8`.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_int8(&mut self) -> Result<i8> {
        self.get_and_advance_int(PAYLOAD_ONE_BYTE, i8::MAX as u64)
            .map(|v| v as i8)
    }

    /// Read a positive or negative integer in the value range of `i16`.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_int16(&mut self) -> Result<i16> {
        self.get_and_advance_int(PAYLOAD_TWO_BYTES, i16::MAX as u64)
            .map(|v| v as i16)
    }

    /// Read a positive or negative integer in the value range of `i32`.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_int32(&mut self) -> Result<i32> {
        self.get_and_advance_int(PAYLOAD_FOUR_BYTES, i32::MAX as u64)
            .map(|v| v as i32)
    }

    /// Read a positive or negative integer in the value range of `i64`.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_int64(&mut self) -> Result<i64> {
        self.get_and_advance_int(PAYLOAD_EIGHT_BYTES, i64::MAX as u64)
    }

    /// Read a definite length string payload at the cursor, without packed resolution.
    pub(crate) fn read_string(&mut self, major: MajorType) -> Result<&'buf [u8]> {
        let (len64, head) = self.head_value(PAYLOAD_SIZE_T, major)?;
        let len = len64 as usize;
        let start = self.index + head;
        let end = start.checked_add(len).ok_or(CBORError::End)?;
        if end > self.buf.len() {
            return Err(CBORError::End);
        }
        let bytes = &self.buf[start..end];
        self.advance(head + len);
        Ok(bytes)
    }

    fn get_string(&mut self, major: MajorType) -> Result<&'buf [u8]> {
        self.with_resolved(|c| c.read_string(major))
    }

    /// Read a definite length byte string as a borrowed slice.
    ///
    /// Indefinite length strings are not synthesized: the initial byte of one fails with
    /// `InvalidType` and the caller must walk the chunks with the container primitives.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_bstr(&mut self) -> Result<&'buf [u8]> {
        self.get_string(MajorType::Bstr)
    }

    /// Read a definite length text string as a borrowed `str`, validating UTF-8.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_tstr(&mut self) -> Result<&'buf str> {
        let bytes = self.get_string(MajorType::Tstr)?;
        from_utf8(bytes).map_err(|_| CBORError::Utf8Error)
    }

    /// Read a tag value, advancing past the tag head only. The tagged item is left at the
    /// cursor for the caller to decode.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_tag(&mut self) -> Result<u32> {
        self.with_resolved(|c| {
            let (tag, len) = c.head_value(PAYLOAD_FOUR_BYTES, MajorType::Tag)?;
            c.advance_bytes(len);
            Ok(tag as u32)
        })
    }

    /// Consume a null item.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_null(&mut self) -> Result<()> {
        self.with_resolved(|c| c.value_match_exact(MT_FLOAT_BITS | SIMPLE_NULL))
    }

    /// Consume an undefined item.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_undefined(&mut self) -> Result<()> {
        self.with_resolved(|c| c.value_match_exact(MT_FLOAT_BITS | SIMPLE_UNDEFINED))
    }

    /// Consume a boolean item.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_bool(&mut self) -> Result<bool> {
        self.with_resolved(|c| {
            if c.value_match_exact(MT_FLOAT_BITS | SIMPLE_FALSE).is_ok() {
                Ok(false)
            } else {
                c.value_match_exact(MT_FLOAT_BITS | SIMPLE_TRUE).map(|_| true)
            }
        })
    }

    /// Read a simple value encoded on the AI bits or a single argument byte.
    ///
    /// Floats and the indefinite length break are rejected with `InvalidType`. On a packed
    /// cursor, simple values 0..=15 are shared item references and resolve before this
    /// accessor sees them.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_simple(&mut self) -> Result<u8> {
        let res = self.with_resolved(|c| {
            let (value, len) = c.head_value(PAYLOAD_ONE_BYTE, MajorType::Float)?;
            c.advance(len);
            Ok(value as u8)
        });
        match res {
            // A wider argument means a float encoding, not an oversized simple value.
            Err(CBORError::Overflow) => Err(CBORError::InvalidType),
            other => other,
        }
    }

    #[cfg(feature = "float")]
    fn decode_half_float(&mut self) -> Result<f32> {
        let (bits, len) = self.head_value(PAYLOAD_TWO_BYTES, MajorType::Float)?;
        if len != 3 {
            return Err(CBORError::InvalidType);
        }
        self.advance(len);
        Ok(f16::from_bits(bits as u16).to_f32())
    }

    #[cfg(feature = "float")]
    fn decode_float(&mut self) -> Result<f32> {
        let (bits, len) = self.head_value(PAYLOAD_FOUR_BYTES, MajorType::Float)?;
        if len != 5 {
            return Err(CBORError::InvalidType);
        }
        self.advance(len);
        Ok(f32::from_bits(bits as u32))
    }

    #[cfg(feature = "float")]
    fn decode_double(&mut self) -> Result<f64> {
        let (bits, len) = self.head_value(PAYLOAD_EIGHT_BYTES, MajorType::Float)?;
        if len != 9 {
            return Err(CBORError::InvalidType);
        }
        self.advance(len);
        Ok(f64::from_bits(bits))
    }

    /// Read a half or single precision float as `f32`. Half precision values are widened
    /// exactly, including subnormals, infinities and NaN.
    #[cfg(feature = "float")]
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_float(&mut self) -> Result<f32> {
        self.with_resolved(|c| c.decode_half_float().or_else(|_| c.decode_float()))
    }

    /// Read a half, single or double precision float as `f64`.
    #[cfg(feature = "float")]
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_double(&mut self) -> Result<f64> {
        self.with_resolved(|c| {
            match c.decode_half_float().or_else(|_| c.decode_float()) {
                Ok(value) => Ok(value as f64),
                Err(_) => c.decode_double(),
            }
        })
    }

    /// Read a decimal fraction, tag 4 over `[exponent, mantissa]`, both within `i32`.
    ///
    /// An item that is not a decimal fraction reports `NotFound`.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_decimal_fraction(&mut self) -> Result<(i32, i32)> {
        let tag = self.get_tag().map_err(|_| CBORError::NotFound)?;
        if tag as u64 != TAG_DECIMAL_FRACTION {
            return Err(CBORError::NotFound);
        }
        let mut arr = self.enter_array().map_err(|_| CBORError::NotFound)?;
        let exponent = arr.get_int32()?;
        let mantissa = arr.get_int32()?;
        self.leave_container(&arr)?;
        Ok((exponent, mantissa))
    }

    /// Return the raw byte span of the item at the cursor, advancing past it.
    ///
    /// The span is exactly what [`Decoder::skip`] would consume: packed references inside it
    /// are captured as encoded, not expanded.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_subcbor(&mut self) -> Result<&'buf [u8]> {
        let start = self.index;
        self.skip()?;
        // A malformed indefinite container can leave the index one past the window.
        let end = self.index.min(self.buf.len());
        Ok(&self.buf[start..end])
    }

    /// Scan a map body for a text string key equal to `key`.
    ///
    /// On a match, returns a cursor positioned at the associated value. The receiver must be
    /// a cursor inside a map (see [`Decoder::enter_map`]) and is left untouched.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_key_tstr(&self, key: &str) -> Result<Decoder<'buf>> {
        let mut value = *self;
        while !value.at_end() {
            let found = value.get_tstr()?;
            if found == key {
                return Ok(value);
            }
            value.skip()?;
        }
        Err(CBORError::NotFound)
    }
}
