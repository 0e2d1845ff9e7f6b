use super::*;

#[test]
fn verifies_matching_password_only() {
    let encoded = hash_password("password123");
    assert!(verify_password("password123", &encoded));
    assert!(!verify_password("password124", &encoded));
}

#[test]
fn salts_differ_between_hashes() {
    assert_ne!(hash_password("same"), hash_password("same"));
}

#[test]
fn fixed_salt_is_deterministic() {
    let a = hash_password_with_salt("pw", b"0123456789abcdef");
    let b = hash_password_with_salt("pw", b"0123456789abcdef");
    assert_eq!(a, b);
    assert!(is_encoded_hash(&a));
}

#[test]
fn malformed_hashes_never_match() {
    assert!(!verify_password("pw", "plaintext"));
    assert!(!verify_password("pw", "md5$AAAA$BBBB"));
    assert!(!verify_password("pw", "sha256$not base64$???"));
    assert!(!verify_password("pw", "sha256$a$b$c"));
}

#[test]
fn truncated_digest_never_matches() {
    let encoded = hash_password_with_salt("pw", b"0123456789abcdef");
    let (prefix, digest_b64) = encoded.rsplit_once('$').expect("digest part");
    let mut digest = STANDARD.decode(digest_b64).expect("base64");
    digest.pop();
    let truncated = format!("{prefix}${}", STANDARD.encode(&digest));
    assert!(!verify_password("pw", &truncated));
    assert!(verify_password("pw", &encoded));
}
