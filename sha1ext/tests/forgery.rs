use proptest::prelude::*;
use sha1ext::{extend, forge_with_oracle, padding, sign, verify, Digest, MalformedDigestError};

const SECRET: &[u8] = b"my secret key";
const MESSAGE: &[u8] = b"a=1&b=2";
const SUFFIX: &[u8] = b"&b=5";

#[test]
fn forged_tag_verifies_under_unknown_secret() {
    let digest = sign(SECRET, MESSAGE);
    let total = (SECRET.len() + MESSAGE.len()) as u64;

    let (forged, forged_digest) = extend(MESSAGE, &digest.to_string(), total, SUFFIX).unwrap();

    let mut expected = MESSAGE.to_vec();
    expected.extend_from_slice(&padding(total));
    expected.extend_from_slice(SUFFIX);
    assert_eq!(forged, expected);
    assert!(verify(SECRET, &forged, &forged_digest));
}

#[test]
fn off_by_one_length_fails_to_verify() {
    let digest = sign(SECRET, MESSAGE).to_string();
    let total = (SECRET.len() + MESSAGE.len()) as u64;

    let (forged, forged_digest) = extend(MESSAGE, &digest, total + 1, SUFFIX).unwrap();
    assert!(!verify(SECRET, &forged, &forged_digest));
}

#[test]
fn uppercase_digest_text_is_accepted() {
    let digest = sign(SECRET, MESSAGE).to_string().to_uppercase();
    let total = (SECRET.len() + MESSAGE.len()) as u64;

    let (forged, forged_digest) = extend(MESSAGE, &digest, total, SUFFIX).unwrap();
    assert!(verify(SECRET, &forged, &forged_digest));
}

#[test]
fn malformed_digest_is_an_error() {
    let err = extend(MESSAGE, "not a digest", 20, SUFFIX).unwrap_err();
    assert_eq!(err, MalformedDigestError::WrongLength { expected: 40, actual: 12 });

    let bad = format!("{}x", &sign(SECRET, MESSAGE).to_string()[..39]);
    let err = extend(MESSAGE, &bad, 20, SUFFIX).unwrap_err();
    assert_eq!(err, MalformedDigestError::NonHex { index: 39, found: 'x' });
}

#[test]
fn oracle_search_recovers_secret_length() {
    let digest = sign(SECRET, MESSAGE);

    let forgery = forge_with_oracle(MESSAGE, &digest, SUFFIX, 0..=32, |msg, tag| {
        verify(SECRET, msg, tag)
    })
    .expect("secret length is within range");

    assert_eq!(forgery.secret_len, SECRET.len());
    assert!(forgery.message.starts_with(MESSAGE));
    assert!(forgery.message.ends_with(SUFFIX));
    assert!(verify(SECRET, &forgery.message, &forgery.digest));
}

#[test]
fn oracle_search_gives_up_outside_range() {
    let digest = sign(SECRET, MESSAGE);
    let mut asked = 0;

    let forgery = forge_with_oracle(MESSAGE, &digest, SUFFIX, 0..=5, |msg, tag| {
        asked += 1;
        verify(SECRET, msg, tag)
    });

    assert_eq!(forgery, None);
    assert_eq!(asked, 6);
}

proptest! {
    #[test]
    fn sign_then_verify(
        secret in proptest::collection::vec(any::<u8>(), 0..80),
        message in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let digest = sign(&secret, &message);
        prop_assert!(verify(&secret, &message, &digest));
        prop_assert_eq!(digest.to_string().parse::<Digest>(), Ok(digest));
    }

    #[test]
    fn single_byte_change_breaks_tag(
        secret in proptest::collection::vec(any::<u8>(), 1..40),
        message in proptest::collection::vec(any::<u8>(), 1..120),
        index in any::<usize>(),
        flip in 1..=255u8,
    ) {
        let digest = sign(&secret, &message);

        let mut tampered = message.clone();
        let i = index % tampered.len();
        tampered[i] ^= flip;
        prop_assert!(!verify(&secret, &tampered, &digest));

        let mut wrong_secret = secret.clone();
        let i = index % wrong_secret.len();
        wrong_secret[i] ^= flip;
        prop_assert!(!verify(&wrong_secret, &message, &digest));
    }

    #[test]
    fn extension_works_for_any_secret(
        secret in proptest::collection::vec(any::<u8>(), 0..100),
        message in proptest::collection::vec(any::<u8>(), 0..100),
        suffix in proptest::collection::vec(any::<u8>(), 0..150),
    ) {
        let digest = sign(&secret, &message).to_string();
        let total = (secret.len() + message.len()) as u64;

        let (forged, forged_digest) = extend(&message, &digest, total, &suffix).unwrap();
        prop_assert_eq!(forged.len() as u64, message.len() as u64 + padding(total).len() as u64 + suffix.len() as u64);
        prop_assert!(verify(&secret, &forged, &forged_digest));
    }
}
