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
 * packbor packed CBOR resolution engine
 *
 * A memory efficient deserializer for packed CBOR (RFC8949 + draft-ietf-cbor-packed).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
/// # Packed CBOR resolution
///
/// Packed CBOR replaces repeated sub-items by references into packing tables introduced by a
/// dedicated tag. This module recognizes the two supported constructs at a cursor position:
///
/// - tag 113, `[[entry, ...], rump]`: the table entries become addressable and decoding
///   continues at the rump;
/// - shared item references: major type 7 with AI 0..=15 (short form, indices 0..=15) or
///   tag 6 over an integer `n` (long form, index `16 + 2n` for `n >= 0`, `16 + 2|n| - 1`
///   for `n < 0`).
///
/// Every accessor funnels through [`resolve`] before touching bytes, which makes the
/// substitution invisible to callers. Resolution is bounded by the shared recursion budget,
/// and table scoping is structural: a table entry can only see tables that existed when its
/// table was defined, so reference chains cannot be cyclic without running into the budget.
use crate::constants::*;
use crate::container;
use crate::decode::{Decoder, MajorType};
use crate::error::{CBORError, Result};
use crate::skip;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Check for and handle a packed CBOR item at the cursor position.
///
/// Returns `Ok(Some(followed))` when a packed item was found: `value` has been advanced past
/// its encoding (consuming one container slot), and `followed` is a cursor over the fully
/// substituted item, carrying the table scope that item is allowed to see. Returns `Ok(None)`
/// when nothing packed applies; `value` is then untouched and the caller decodes in place.
#[cfg_attr(feature = "trace", trace)]
pub(crate) fn resolve<'buf>(
    value: &mut Decoder<'buf>,
    limit: u8,
) -> Result<Option<Decoder<'buf>>> {
    if limit == 0 {
        return Err(CBORError::Recursion);
    }
    handle(value, limit - 1, true)
}

/// One resolution pass. `consume` distinguishes the outer call, which must advance `value`
/// past the packed encoding, from chain re-resolution, where `value` is a scratch copy and
/// only the returned cursor matters.
fn handle<'buf>(
    value: &mut Decoder<'buf>,
    limit: u8,
    consume: bool,
) -> Result<Option<Decoder<'buf>>> {
    if !value.packed_enabled() {
        return Ok(None);
    }
    if limit == 0 {
        return Err(CBORError::Recursion);
    }
    let major = match value.item_major() {
        Ok(major) => major,
        Err(_) => return Ok(None),
    };
    let mut target = match major {
        MajorType::Tag => {
            let (tag, head) = match value.head_value(PAYLOAD_FOUR_BYTES, MajorType::Tag) {
                Ok(r) => r,
                Err(_) => return Ok(None),
            };
            if tag == TAG_PACKED_TABLE {
                value.advance_bytes(head);
                if consume {
                    consume_table_advancing(value, limit)?
                } else {
                    consume_table_into(value, limit)?
                }
            } else if tag == TAG_PACKED_REF_SHARED {
                value.advance_bytes(head);
                follow_long_reference(value, limit)?
            } else {
                return Ok(None);
            }
        }
        MajorType::Float => {
            let info = value.initial_info();
            if info >= 16 {
                return Ok(None);
            }
            // Short-form reference: the AI bits are the index.
            value.advance(1);
            follow_reference(value, info as u64, limit)?
        }
        _ => return Ok(None),
    };

    // The substituted item may itself be packed; chase the chain until it stabilizes.
    let mut chain = target;
    if let Some(followed) = handle(&mut chain, limit - 1, false)? {
        target = followed;
    }
    Ok(Some(target))
}

/// Resolve a long-form shared item reference. On entry `value` sits just past the tag head,
/// at the integer index item, which may itself be packed.
#[cfg_attr(feature = "trace", trace)]
fn follow_long_reference<'buf>(value: &mut Decoder<'buf>, limit: u8) -> Result<Decoder<'buf>> {
    let mut idx_cur = *value;
    let nested = resolve(&mut idx_cur, limit)?;
    let mut read_cur = match nested {
        Some(followed) => {
            // The nested resolution consumed the index encoding from the input stream.
            *value = idx_cur;
            followed
        }
        None => *value,
    };

    let major = match read_cur.item_major() {
        Ok(m @ MajorType::UInt) | Ok(m @ MajorType::NInt) => m,
        _ => return Err(CBORError::PackedFormat),
    };
    let (n, head) = read_cur
        .head_value(PAYLOAD_EIGHT_BYTES, major)
        .map_err(|_| CBORError::PackedFormat)?;
    read_cur.advance(head);
    if nested.is_none() {
        *value = read_cur;
    }

    // Non-negative arguments map to even indices from 16 up, negative to odd ones. An index
    // that cannot be represented lies beyond every table by construction.
    let idx = match major {
        MajorType::UInt => n.checked_mul(2),
        _ => n.checked_mul(2).and_then(|v| v.checked_add(1)),
    }
    .and_then(|v| v.checked_add(16))
    .ok_or(CBORError::PackedUndefinedReference)?;

    follow_reference(&read_cur, idx, limit)
}

/// Resolve reference index `idx` against the active tables of `value`, innermost first.
///
/// The returned cursor points at the selected entry inside its table and sees only the tables
/// that were in scope at or before that table's definition. This keeps reference scoping
/// acyclic: an entry referring to a later-defined table reports an undefined reference.
#[cfg_attr(feature = "trace", trace)]
fn follow_reference<'buf>(
    value: &Decoder<'buf>,
    mut idx: u64,
    limit: u8,
) -> Result<Decoder<'buf>> {
    let num = value.num_active_tables as usize;
    for i in 0..num {
        let bytes = value.tables[num - 1 - i].ok_or(CBORError::PackedFormat)?;
        let mut table = Decoder::new_packed(bytes);
        table.tables = value.tables;
        table.num_active_tables = value.num_active_tables;

        let mut entry = container::enter(&table, MajorType::Array, limit - 1)
            .map_err(packed_format_unless_recursion)?;

        let size = if entry.container_indefinite() {
            u64::MAX
        } else {
            entry.array_items_remaining()
        };
        if idx < size {
            let mut walked = 0;
            while walked < idx && !entry.at_end() {
                skip::skip_limited(&mut entry, limit)?;
                walked += 1;
            }
            if entry.at_end() {
                // An indefinite table proved shorter than idx; walked is its true size.
                idx -= walked;
                continue;
            }
            let mut resolved = entry;
            resolved.tables = value.tables;
            resolved.num_active_tables = (num - i) as u8;
            return Ok(resolved);
        }
        idx -= size;
    }
    Err(CBORError::PackedUndefinedReference)
}

/// Consume a packing table definition and build the cursor decoding continues on: positioned
/// at the rump, bounded by the rump's span, with the table literal appended to the active set.
/// Returns the rump cursor together with the cursor that walked the two-element payload.
fn consume_table_core<'buf>(
    value: &Decoder<'buf>,
    limit: u8,
) -> Result<(Decoder<'buf>, Decoder<'buf>)> {
    let mut arr = container::enter(value, MajorType::Array, limit - 1)
        .map_err(packed_format_unless_recursion)?;

    if arr.num_active_tables as usize >= PACKED_NESTED_TABLES_MAX {
        return Err(CBORError::PackedMemory);
    }
    match arr.item_major() {
        Ok(MajorType::Array) => (),
        _ => return Err(CBORError::PackedFormat),
    }
    let table_start = arr.index;
    skip::skip_limited(&mut arr, limit - 1)?;
    let table = &arr.buf[table_start..arr.index];

    let rump_start = arr.index;
    skip::skip_limited(&mut arr, limit - 1)?;
    let rump = &arr.buf[rump_start..arr.index];

    let mut target = Decoder::new_packed(rump);
    target.tables = arr.tables;
    target.num_active_tables = arr.num_active_tables;
    target.tables[target.num_active_tables as usize] = Some(table);
    target.num_active_tables += 1;
    Ok((target, arr))
}

/// Table consumption for the outer cursor: additionally advances `value` past the whole tag
/// payload, validating that it is an array of exactly two items.
#[cfg_attr(feature = "trace", trace)]
fn consume_table_advancing<'buf>(value: &mut Decoder<'buf>, limit: u8) -> Result<Decoder<'buf>> {
    let (target, arr) = consume_table_core(value, limit)?;
    container::leave(value, &arr, limit - 1).map_err(packed_format_unless_recursion)?;
    Ok(target)
}

/// Table consumption during chain re-resolution: builds the rump cursor without touching the
/// input cursor, which is a scratch copy at this point.
#[cfg_attr(feature = "trace", trace)]
fn consume_table_into<'buf>(value: &Decoder<'buf>, limit: u8) -> Result<Decoder<'buf>> {
    consume_table_core(value, limit).map(|(target, _)| target)
}

fn packed_format_unless_recursion(e: CBORError) -> CBORError {
    if e == CBORError::Recursion {
        e
    } else {
        CBORError::PackedFormat
    }
}
