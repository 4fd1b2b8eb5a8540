// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn sha256_of_empty_input_matches_known_vector() {
    let digest = Sha256Calculator.digest_bytes(b"").unwrap();
    assert_eq!(digest.algorithm(), "sha256");
    assert_eq!(
        digest.hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn sha512_produces_128_hex_chars() {
    let digest = Sha512Calculator.digest_bytes(b"hello").unwrap();
    assert_eq!(digest.algorithm(), "sha512");
    assert_eq!(digest.hex().len(), 128);
}

#[test]
fn same_bytes_same_digest() {
    let a = Sha256Calculator.digest_bytes(&[1, 2, 3]).unwrap();
    let b = Sha256Calculator.digest_bytes(&[1, 2, 3]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn digests_with_different_algorithms_are_not_equal() {
    let a = Digest::from_hex("sha256", "abcd").unwrap();
    let b = Digest::from_hex("md5", "abcd").unwrap();
    assert_ne!(a, b);
}

#[test]
fn reader_and_bytes_agree() {
    let data = vec![7_u8; 200_000];
    let from_bytes = Sha256Calculator.digest_bytes(&data).unwrap();
    let from_reader = Sha256Calculator
        .digest_reader(&mut std::io::Cursor::new(&data))
        .unwrap();
    assert_eq!(from_bytes, from_reader);
}

#[test]
fn display_and_parse_are_inverse() {
    let digest = Sha256Calculator.digest_bytes(b"x").unwrap();
    let parsed: Digest = digest.to_string().parse().unwrap();
    assert_eq!(parsed, digest);
}

#[test]
fn from_hex_lowercases() {
    let digest = Digest::from_hex("sha256", "ABCD").unwrap();
    assert_eq!(digest.hex(), "abcd");
}

#[parameterized(
    no_separator = { "sha256abcd" },
    empty_algorithm = { ":abcd" },
    empty_hex = { "sha256:" },
    not_hex = { "sha256:xyz" },
    parent_dir_algorithm = { "..:abcd" },
    nested_algorithm = { "a/b:abcd" },
    uppercase_algorithm = { "SHA256:abcd" },
    odd_length = { "sha256:abc" },
)]
fn parse_rejects(input: &str) {
    assert!(input.parse::<Digest>().is_err());
}

#[test]
fn from_bytes_rejects_algorithm_that_is_not_a_path_segment() {
    let err = Digest::from_bytes("../x", [0xab]).unwrap_err();
    assert_eq!(err, DigestParseError::InvalidAlgorithm("../x".to_string()));
    assert!(Digest::from_bytes("sha-256", [0xab]).is_ok());
}

#[test]
fn deserialize_validates_algorithm() {
    let json = r#"{"algorithm":"a/b","hex":"abcd"}"#;
    assert!(serde_json::from_str::<Digest>(json).is_err());
}

#[test]
fn serde_roundtrip_preserves_identity() {
    let digest = Sha512Calculator.digest_bytes(b"content").unwrap();
    let json = serde_json::to_string(&digest).unwrap();
    let back: Digest = serde_json::from_str(&json).unwrap();
    assert_eq!(back, digest);
}
