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
 * packbor CBOR constants
 *
 * A memory efficient deserializer for packed CBOR (RFC8949 + draft-ietf-cbor-packed).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
/// Additional Information bitmask
pub const AI_MASK: u8 = 0b000_11111;
/// Number of bits the major type is shifted left by in the initial byte
pub const MT_SHIFT: u8 = 5;

/// Major Type 7 (Floats, simple types etc.) as a bit pattern on the initial byte
pub const MT_FLOAT_BITS: u8 = 0b111_00000;

/// Maximum value of a "simple" payload mapped on AI bits
pub const PAYLOAD_AI_BITS: u8 = 23;
/// Indicates one byte of length or value information follows the MT/AI byte
pub const PAYLOAD_ONE_BYTE: u8 = 24;
/// Indicates two bytes of length or value information follow the MT/AI byte
pub const PAYLOAD_TWO_BYTES: u8 = 25;
/// Indicates four bytes of length or value information follow the MT/AI byte
pub const PAYLOAD_FOUR_BYTES: u8 = 26;
/// Indicates eight bytes of length or value information follow the MT/AI byte
pub const PAYLOAD_EIGHT_BYTES: u8 = 27;
/// Indicates an indefinite length container
pub const PAYLOAD_INDEFINITE: u8 = 31;

/// The widest argument encoding that fits a `usize` on this target
#[cfg(target_pointer_width = "64")]
pub const PAYLOAD_SIZE_T: u8 = PAYLOAD_EIGHT_BYTES;
/// The widest argument encoding that fits a `usize` on this target
#[cfg(target_pointer_width = "32")]
pub const PAYLOAD_SIZE_T: u8 = PAYLOAD_FOUR_BYTES;

/// The "break" stop code terminating indefinite length containers
pub const BREAK: u8 = 0xFF;

/// Simple value false (encoded 0xF4)
pub const SIMPLE_FALSE: u8 = 20;
/// Simple value true (encoded 0xF5)
pub const SIMPLE_TRUE: u8 = 21;
/// Simple value null (encoded 0xF6)
pub const SIMPLE_NULL: u8 = 22;
/// Simple value undefined (encoded 0xF7)
pub const SIMPLE_UNDEFINED: u8 = 23;

/// Tag number for a decimal fraction, `[exponent, mantissa]` (RFC8949 §3.4.4)
pub const TAG_DECIMAL_FRACTION: u64 = 4;
/// Tag number introducing a packing table, `[[entry, ...], rump]` (draft-ietf-cbor-packed)
pub const TAG_PACKED_TABLE: u64 = 113;
/// Tag number of a long-form shared item reference (draft-ietf-cbor-packed)
pub const TAG_PACKED_REF_SHARED: u64 = 6;

/// Maximum depth for nested item traversal, including packed reference chains
pub const RECURSION_MAX: u8 = 16;
/// Maximum number of simultaneously active packing tables per cursor
pub const PACKED_NESTED_TABLES_MAX: usize = 4;
