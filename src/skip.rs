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
 * packbor CBOR skip and recursion control
 *
 * A memory efficient deserializer for packed CBOR (RFC8949 + draft-ietf-cbor-packed).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::*;
use crate::container;
use crate::decode::{Decoder, MajorType};
use crate::error::{CBORError, Result};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Consume exactly one logical item at `it`, to a depth of at most `limit`.
///
/// Skipping is byte-level: a shared item reference is consumed as encoded, without expanding
/// it. The packed engine relies on this to measure table entries, sharing the same depth
/// budget so an adversarial document cannot cause unbounded work.
pub(crate) fn skip_limited<'buf>(it: &mut Decoder<'buf>, limit: u8) -> Result<()> {
    if limit == 0 {
        return Err(CBORError::Recursion);
    }
    match it.item_major()? {
        major @ MajorType::Array | major @ MajorType::Map => {
            let mut inner = if major == MajorType::Map {
                it.enter_map()?
            } else {
                it.enter_array()?
            };
            let mut res = Ok(());
            while !inner.at_end() {
                if let Err(e) = skip_limited(&mut inner, limit - 1) {
                    res = Err(e);
                    break;
                }
            }
            let _ = container::leave(it, &inner, RECURSION_MAX);
            res
        }
        MajorType::Tag => {
            let (_, head) = it.head_value(PAYLOAD_FOUR_BYTES, MajorType::Tag)?;
            it.advance_bytes(head);
            skip_limited(it, limit - 1)
        }
        _ => skip_one(it),
    }
}

/// Consume one non-container item: its head plus, for strings, the payload.
fn skip_one<'buf>(it: &mut Decoder<'buf>) -> Result<()> {
    match it.item_major()? {
        major @ MajorType::Bstr | major @ MajorType::Tstr => {
            it.read_string(major).map(|_| ())
        }
        major => {
            let (_, head) = it.head_value(PAYLOAD_EIGHT_BYTES, major)?;
            it.advance(head);
            Ok(())
        }
    }
}

impl<'buf> Decoder<'buf> {
    /// Skip one logical item of any depth, bounded by the recursion limit.
    #[cfg_attr(feature = "trace", trace)]
    pub fn skip(&mut self) -> Result<()> {
        skip_limited(self, RECURSION_MAX)
    }

    /// Skip one non-container item. Cheaper than [`Decoder::skip`] where the caller knows no
    /// array or map can occur.
    #[cfg_attr(feature = "trace", trace)]
    pub fn skip_simple(&mut self) -> Result<()> {
        skip_one(self)
    }
}
