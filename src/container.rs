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
 * packbor CBOR container state machine
 *
 * A memory efficient deserializer for packed CBOR (RFC8949 + draft-ietf-cbor-packed).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::*;
use crate::decode::{Decoder, Flags, MajorType};
use crate::error::{CBORError, Result};
use crate::packed;
use crate::skip;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Open a container of the given major type at `it` and return a child cursor positioned at
/// its first element. `it` itself is not advanced; [`leave`] performs the parent advancement.
///
/// The child shares the parent's window and end of input, and inherits the packed flag and
/// active table set. A container reached through a packed reference lives in a table slice
/// unrelated to the parent's stream; such a child is flagged `SHARED` so that [`leave`] knows
/// to advance the parent by skipping the reference instead of adopting the child position.
pub(crate) fn enter<'buf>(
    it: &Decoder<'buf>,
    major: MajorType,
    limit: u8,
) -> Result<Decoder<'buf>> {
    let mut work = *it;
    let mut flags = Flags::empty();
    if work.packed_enabled() {
        flags = Flags::PACKED;
        if let Some(followed) = packed::resolve(&mut work, limit)? {
            work = followed;
            flags |= Flags::SHARED;
        }
    }

    let mut container = work;
    container.remaining = 0;
    container.flags = flags;

    // An indefinite length head is the major type with AI 31.
    if !work.over_end() && work.buf[work.index] == (major.bits() | PAYLOAD_INDEFINITE) {
        container.flags |= Flags::INDEFINITE | Flags::CONTAINER;
        container.index = work.index + 1;
        return Ok(container);
    }

    let (n_items, head) = work.head_value(PAYLOAD_EIGHT_BYTES, major)?;
    container.remaining = n_items;
    container.flags |= Flags::CONTAINER;
    container.index = work.index + head;
    Ok(container)
}

/// Close `container` and advance `it` past the item the container was entered from.
///
/// The container must have been fully consumed ([`Decoder::at_end`]). For a `SHARED` child the
/// parent advances by skipping one item in its own stream; otherwise it adopts the child
/// position, plus one byte for the break of an indefinite container.
pub(crate) fn leave<'buf>(
    it: &mut Decoder<'buf>,
    container: &Decoder<'buf>,
    limit: u8,
) -> Result<()> {
    // `container` must be a fully consumed container plausibly entered from `it`.
    if !container.in_container() || !container.at_end() {
        return Err(CBORError::InvalidType);
    }
    if container.flags.contains(Flags::SHARED) {
        return skip::skip_limited(it, limit);
    }
    if container.index <= it.index || container.index > it.buf.len() {
        return Err(CBORError::InvalidType);
    }
    if it.remaining != 0 {
        it.remaining -= 1;
    }
    it.index = if container.container_indefinite() {
        container.index + 1
    } else {
        container.index
    };
    Ok(())
}

impl<'buf> Decoder<'buf> {
    /// True when the cursor has consumed its input: the window is exhausted, an indefinite
    /// container sits at its break byte, or a definite container has no items left.
    #[cfg_attr(feature = "trace", trace)]
    pub fn at_end(&self) -> bool {
        self.over_end()
            || (self.container_indefinite() && self.buf[self.index] == BREAK)
            || (!self.container_indefinite() && self.in_container() && self.remaining == 0)
    }

    /// True if this cursor walks the body of an array or map.
    #[inline]
    pub fn in_container(&self) -> bool {
        self.flags.contains(Flags::CONTAINER)
    }

    /// True if this cursor walks an indefinite length container.
    #[inline]
    pub fn container_indefinite(&self) -> bool {
        self.flags.contains(Flags::INDEFINITE)
    }

    /// Number of items left to read in a definite length array.
    #[inline]
    pub fn array_items_remaining(&self) -> u64 {
        self.remaining
    }

    /// Number of key/value pairs left to read in a definite length map.
    #[inline]
    pub fn map_items_remaining(&self) -> u64 {
        self.remaining / 2
    }

    /// Enter an array and return a cursor over its elements. The receiver is not advanced
    /// until the returned cursor is passed to [`Decoder::leave_container`].
    #[cfg_attr(feature = "trace", trace)]
    pub fn enter_array(&self) -> Result<Decoder<'buf>> {
        enter(self, MajorType::Array, RECURSION_MAX - 1)
    }

    /// Enter a map and return a cursor over its keys and values. `remaining` counts keys and
    /// values individually, so one decrement accounts for either.
    #[cfg_attr(feature = "trace", trace)]
    pub fn enter_map(&self) -> Result<Decoder<'buf>> {
        let mut map = enter(self, MajorType::Map, RECURSION_MAX - 1)?;
        if map.remaining > u64::MAX / 2 {
            return Err(CBORError::Overflow);
        }
        map.remaining *= 2;
        Ok(map)
    }

    /// Close a fully consumed child container and advance this cursor past it.
    #[cfg_attr(feature = "trace", trace)]
    pub fn leave_container(&mut self, container: &Decoder<'buf>) -> Result<()> {
        leave(self, container, RECURSION_MAX)
    }
}
