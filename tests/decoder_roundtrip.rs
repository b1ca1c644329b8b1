use std::collections::BTreeMap;

use colonist_advisor::decoder::{DecodeError, decode, try_decode};
use colonist_advisor::Value;
use proptest::prelude::*;
use serde::Serialize;

fn roundtrip<T: Serialize + ?Sized>(value: &T) -> Value {
    let bytes = rmp_serde::to_vec(value).unwrap();
    try_decode(&bytes).unwrap()
}

#[test]
fn integers_of_every_width() {
    for v in [0i64, 1, 127, 128, 255, 256, 65_535, 65_536, 4_294_967_295, 4_294_967_296, i64::MAX] {
        assert_eq!(roundtrip(&v), Value::Int(v), "{v}");
    }
    for v in [-1i64, -32, -33, -128, -129, -32_768, -32_769, -2_147_483_648, -2_147_483_649, i64::MIN] {
        assert_eq!(roundtrip(&v), Value::Int(v), "{v}");
    }
    assert_eq!(roundtrip(&u64::MAX), Value::UInt(u64::MAX));
}

#[test]
fn floats_and_constants() {
    assert_eq!(roundtrip(&1.5f32), Value::Float(1.5));
    assert_eq!(roundtrip(&-0.1f64), Value::Float(-0.1));
    assert_eq!(roundtrip(&()), Value::Nil);
    assert_eq!(roundtrip(&true), Value::Bool(true));
    assert_eq!(roundtrip(&false), Value::Bool(false));
}

#[test]
fn strings_of_every_length_class() {
    for len in [0usize, 31, 32, 255, 256, 65_535, 65_536] {
        let text = "x".repeat(len);
        assert_eq!(roundtrip(&text), Value::String(text.clone()), "len {len}");
    }
}

#[test]
fn arrays_and_maps_of_every_length_class() {
    for len in [0usize, 15, 16, 65_535, 65_536] {
        let items: Vec<u8> = (0..len).map(|i| (i % 100) as u8).collect();
        let expected = Value::Array(items.iter().map(|i| Value::Int(i64::from(*i))).collect());
        assert_eq!(roundtrip(&items), expected, "array len {len}");
    }
    for len in [0usize, 15, 16, 65_536] {
        let map: BTreeMap<String, u32> = (0..len).map(|i| (format!("k{i:06}"), i as u32)).collect();
        let Value::Map(entries) = roundtrip(&map) else {
            panic!("expected a map for len {len}");
        };
        assert_eq!(entries.len(), len);
        if let Some((key, value)) = entries.last() {
            assert_eq!(key, &Value::String(format!("k{:06}", len - 1)));
            assert_eq!(value, &Value::Int(len as i64 - 1));
        }
    }
}

#[test]
fn binary_blobs() {
    assert_eq!(
        try_decode(&[0xc4, 0x03, 0x01, 0x02, 0x03]),
        Ok(Value::Binary(vec![1, 2, 3]))
    );
    let mut bin16 = vec![0xc5, 0x01, 0x00];
    bin16.extend(std::iter::repeat_n(0xab, 256));
    assert_eq!(try_decode(&bin16), Ok(Value::Binary(vec![0xab; 256])));
    let mut bin32 = vec![0xc6, 0x00, 0x00, 0x00, 0x02];
    bin32.extend([0x10, 0x20]);
    assert_eq!(try_decode(&bin32), Ok(Value::Binary(vec![0x10, 0x20])));
}

#[test]
fn nested_game_frame() {
    let frame = serde_json::json!({
        "id": "130",
        "data": { "type": 91, "payload": { "diff": { "diceState": { "dice1": 3, "dice2": 6 } } } }
    });
    let value = roundtrip(&frame);
    assert_eq!(value.to_json(), frame);
    assert_eq!(value.path(&["data", "payload", "diff", "diceState", "dice2"]).and_then(Value::as_i64), Some(6));
}

#[test]
fn truncated_and_reserved_input_fails_cleanly() {
    assert_eq!(
        try_decode(&[0xcd, 0x01]),
        Err(DecodeError::UnexpectedEof { offset: 1, needed: 1 })
    );
    assert_eq!(try_decode(&[]), Err(DecodeError::UnexpectedEof { offset: 0, needed: 1 }));
    assert_eq!(
        try_decode(&[0x91, 0xc1]),
        Err(DecodeError::ReservedTag { offset: 1, tag: 0xc1 })
    );
    assert!(decode(&[0xdd, 0xff, 0xff, 0xff, 0xff]).is_none());
}

#[test]
fn deep_nesting_is_capped() {
    let mut bytes = vec![0x91; 600];
    bytes.push(0xc0);
    assert!(matches!(try_decode(&bytes), Err(DecodeError::DepthLimit { .. })));

    let mut shallow = vec![0x91; 20];
    shallow.push(0xc0);
    assert!(try_decode(&shallow).is_ok());
}

proptest! {
    #[test]
    fn decoding_arbitrary_bytes_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&bytes);
    }

    #[test]
    fn every_strict_prefix_of_a_frame_is_rejected(
        numbers in proptest::collection::vec(any::<i64>(), 1..20),
        name in "[a-z]{0,40}",
        cut in any::<prop::sample::Index>(),
    ) {
        let frame = serde_json::json!({ "name": name, "numbers": numbers });
        let bytes = rmp_serde::to_vec(&frame).unwrap();
        let cut = cut.index(bytes.len());
        prop_assert!(try_decode(&bytes[..cut]).is_err());
        prop_assert!(try_decode(&bytes).is_ok());
    }
}
