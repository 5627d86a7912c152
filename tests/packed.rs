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
 * Test cases for packed CBOR resolution: packing tables, shared item references, scoping.
 **************************************************************************************************/

extern crate packbor;

use packbor::decoder::{Decoder, MajorType};
use packbor::error::CBORError;

/// 113([[42], [ref(0)]]): one table entry, a rump array referencing it.
const BASIC_TABLE: &[u8] = &[0xD8, 0x71, 0x82, 0x81, 0x18, 0x2A, 0x81, 0xE0];

#[test]
fn basic_table_substitution() -> Result<(), CBORError> {
    let mut dec = Decoder::new_packed(BASIC_TABLE);
    let mut arr = dec.enter_array()?;
    assert_eq!(arr.get_uint8()?, 42);
    assert!(arr.at_end());
    dec.leave_container(&arr)?;
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn packed_disabled_sees_raw_encoding() -> Result<(), CBORError> {
    // Without packed support the same bytes decode as a literal tag over a two-element array.
    let mut dec = Decoder::new(BASIC_TABLE);
    assert_eq!(dec.get_tag()?, 113);
    let mut arr = dec.enter_array()?;
    let mut table = arr.enter_array()?;
    assert_eq!(table.get_uint8()?, 42);
    arr.leave_container(&table)?;
    let mut rump = arr.enter_array()?;
    assert_eq!(rump.get_simple()?, 0);
    arr.leave_container(&rump)?;
    dec.leave_container(&arr)?;
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn type_probe_resolves_references() -> Result<(), CBORError> {
    let dec = Decoder::new_packed(BASIC_TABLE);
    // The probe sees the substituted rump, and stays non-destructive.
    assert_eq!(dec.get_type()?, MajorType::Array);
    assert_eq!(dec.get_type()?, MajorType::Array);
    let mut arr = dec.enter_array()?;
    assert_eq!(arr.get_type()?, MajorType::UInt);
    assert_eq!(arr.get_uint8()?, 42);
    Ok(())
}

#[test]
fn shared_strings_in_map() -> Result<(), CBORError> {
    // 113([["a", "b"], {ref(0): 1, ref(1): 2}])
    let buf = [
        0xD8, 0x71, 0x82, 0x82, 0x61, 0x61, 0x61, 0x62, 0xA2, 0xE0, 0x01, 0xE1, 0x02,
    ];
    let mut dec = Decoder::new_packed(&buf);
    let mut map = dec.enter_map()?;
    assert_eq!(map.map_items_remaining(), 2);
    assert_eq!(map.get_tstr()?, "a");
    assert_eq!(map.get_uint8()?, 1);
    assert_eq!(map.get_tstr()?, "b");
    assert_eq!(map.get_uint8()?, 2);
    assert!(map.at_end());
    dec.leave_container(&map)?;
    assert!(dec.at_end());

    // Key scanning resolves the shared keys too.
    let dec = Decoder::new_packed(&buf);
    let map = dec.enter_map()?;
    let mut value = map.get_key_tstr("b")?;
    assert_eq!(value.get_uint8()?, 2);
    Ok(())
}

#[test]
fn long_form_references() -> Result<(), CBORError> {
    // An 18-entry table [0..=17]; tag 6(n) maps to index 16 + 2n, 6(-n-1) to 16 + 2n + 1.
    let mut buf = vec![0xD8, 0x71, 0x82, 0x92];
    for i in 0..18u8 {
        buf.push(i);
    }
    // rump: [6(0), 6(-1)]
    buf.extend_from_slice(&[0x82, 0xC6, 0x00, 0xC6, 0x20]);

    let mut dec = Decoder::new_packed(&buf);
    let mut arr = dec.enter_array()?;
    assert_eq!(arr.get_uint8()?, 16);
    assert_eq!(arr.get_uint8()?, 17);
    assert!(arr.at_end());
    dec.leave_container(&arr)?;
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn externally_supplied_table() -> Result<(), CBORError> {
    // ["a", "b"] supplied out of band; the document is a bare reference to entry 1.
    let table = [0x82, 0x61, 0x61, 0x61, 0x62];
    let doc = [0xE1];
    let mut dec = Decoder::new_packed_with_table(&doc, &table);
    assert_eq!(dec.get_tstr()?, "b");
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn rump_may_be_a_reference() -> Result<(), CBORError> {
    // 113([[42], ref(0)]): the whole rump is a reference into the table.
    let buf = [0xD8, 0x71, 0x82, 0x81, 0x18, 0x2A, 0xE0];
    let mut dec = Decoder::new_packed(&buf);
    assert_eq!(dec.get_uint8()?, 42);
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn chained_references() -> Result<(), CBORError> {
    // 113([[42, ref(0)], [ref(1)]]): entry 1 is itself a reference to entry 0.
    let buf = [0xD8, 0x71, 0x82, 0x82, 0x18, 0x2A, 0xE0, 0x81, 0xE1];
    let mut dec = Decoder::new_packed(&buf);
    let mut arr = dec.enter_array()?;
    assert_eq!(arr.get_uint8()?, 42);
    assert!(arr.at_end());
    dec.leave_container(&arr)?;
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn nested_tables_concatenate_innermost_first() -> Result<(), CBORError> {
    // 113([[1, 2], 113([[3], [ref(0), ref(2)]])]): index 0 hits the inner table, indices
    // 1 and 2 continue into the outer one.
    let buf = [
        0xD8, 0x71, 0x82, 0x82, 0x01, 0x02, 0xD8, 0x71, 0x82, 0x81, 0x03, 0x82, 0xE0, 0xE2,
    ];
    let mut dec = Decoder::new_packed(&buf);
    let mut arr = dec.enter_array()?;
    assert_eq!(arr.get_uint8()?, 3);
    assert_eq!(arr.get_uint8()?, 2);
    assert!(arr.at_end());
    dec.leave_container(&arr)?;
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn indefinite_length_table() -> Result<(), CBORError> {
    // 113([[_ 10, 11], ref(1)])
    let buf = [0xD8, 0x71, 0x82, 0x9F, 0x0A, 0x0B, 0xFF, 0xE1];
    let mut dec = Decoder::new_packed(&buf);
    assert_eq!(dec.get_uint8()?, 11);
    assert!(dec.at_end());

    // The true size of an indefinite table is discovered by walking it: index 2 is out of
    // range for a two-entry table.
    let buf = [0xD8, 0x71, 0x82, 0x9F, 0x0A, 0x0B, 0xFF, 0xE2];
    let mut dec = Decoder::new_packed(&buf);
    assert_eq!(dec.get_uint8(), Err(CBORError::PackedUndefinedReference));
    Ok(())
}

#[test]
fn undefined_references() {
    // No active tables at all.
    let mut dec = Decoder::new_packed(&[0xE5]);
    assert_eq!(dec.get_uint8(), Err(CBORError::PackedUndefinedReference));

    // 113([[], ref(0)]): an empty table defines no entries.
    let buf = [0xD8, 0x71, 0x82, 0x80, 0xE0];
    let mut dec = Decoder::new_packed(&buf);
    assert_eq!(dec.get_uint8(), Err(CBORError::PackedUndefinedReference));

    // 113([[10], ref(1)]): index past the only entry.
    let buf = [0xD8, 0x71, 0x82, 0x81, 0x0A, 0xE1];
    let mut dec = Decoder::new_packed(&buf);
    assert_eq!(dec.get_uint8(), Err(CBORError::PackedUndefinedReference));
}

#[test]
fn cyclic_reference_terminates() {
    // 113([[ref(0)], ref(0)]): entry 0 refers to itself. Resolution must terminate with an
    // error rather than loop.
    let buf = [0xD8, 0x71, 0x82, 0x81, 0xE0, 0xE0];
    let mut dec = Decoder::new_packed(&buf);
    let res = dec.get_uint8();
    assert!(
        res == Err(CBORError::Recursion) || res == Err(CBORError::PackedUndefinedReference),
        "unexpected result: {:?}",
        res
    );
}

#[test]
fn shared_container_keeps_parent_consistent() -> Result<(), CBORError> {
    // [113([[42], [ref(0)]]), 15]: a packed item inside an outer array. Leaving the shared
    // child must advance the outer cursor by exactly one item.
    let buf = [
        0x82, 0xD8, 0x71, 0x82, 0x81, 0x18, 0x2A, 0x81, 0xE0, 0x0F,
    ];
    let mut dec = Decoder::new_packed(&buf);
    let mut outer = dec.enter_array()?;
    assert_eq!(outer.array_items_remaining(), 2);

    let mut inner = outer.enter_array()?;
    assert_eq!(inner.get_uint8()?, 42);
    assert!(inner.at_end());
    outer.leave_container(&inner)?;
    assert_eq!(outer.array_items_remaining(), 1);

    assert_eq!(outer.get_uint8()?, 15);
    assert!(outer.at_end());
    dec.leave_container(&outer)?;
    assert!(dec.at_end());
    Ok(())
}

#[test]
fn packed_and_unpacked_agree() -> Result<(), CBORError> {
    // Invariant: a packed document yields the same item sequence as its unpacked form.
    let packed = [
        0xD8, 0x71, 0x82, 0x82, 0x61, 0x61, 0x61, 0x62, 0xA2, 0xE0, 0x01, 0xE1, 0x02,
    ];
    let unpacked = [0xA2, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02];

    let mut p = Decoder::new_packed(&packed).enter_map()?;
    let mut u = Decoder::new(&unpacked).enter_map()?;
    for _ in 0..2 {
        assert_eq!(p.get_tstr()?, u.get_tstr()?);
        assert_eq!(p.get_uint8()?, u.get_uint8()?);
    }
    assert!(p.at_end() && u.at_end());
    Ok(())
}

#[test]
fn subcbor_captures_references_as_encoded() -> Result<(), CBORError> {
    // Raw extraction does not expand packed items.
    let mut dec = Decoder::new_packed(BASIC_TABLE);
    let span = dec.get_subcbor()?;
    assert_eq!(span, BASIC_TABLE);
    assert!(dec.at_end());
    Ok(())
}
