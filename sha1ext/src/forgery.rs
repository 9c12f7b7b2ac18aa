//! Secret-prefix MAC `H(secret || message)` and the length-extension attack
//! that breaks it.
//!
//! SHA-1 publishes its whole chaining state as the digest, so anyone holding
//! a tag and the length of `secret || message` can resume hashing after the
//! glue padding and tag any suffix they like.

use std::ops::RangeInclusive;

use bytes::{BufMut, BytesMut};

use crate::{
    digest::{
        mac,
        sha1::{Digest, Sha1Core},
        FromState, Hasher,
    },
    error::MalformedDigestError,
};

/// Tags `message` as `SHA1(secret || message)`.
pub fn sign(secret: &[u8], message: &[u8]) -> Digest {
    mac::<Sha1Core>(secret, message)
}

/// Recomputes the tag of `message` under `secret` and compares it with `digest`.
///
/// Not constant time.
pub fn verify(secret: &[u8], message: &[u8], digest: &Digest) -> bool {
    sign(secret, message) == *digest
}

/// Forges a tag for `message || padding(secret_plus_message_length) || suffix`
/// from the hex text of a tag over `message`, without the secret.
///
/// A wrong length guess still returns a pair, it just won't verify.
pub fn extend(
    message: &[u8],
    digest: &str,
    secret_plus_message_length: u64,
    suffix: &[u8],
) -> Result<(Vec<u8>, Digest), MalformedDigestError> {
    let digest: Digest = digest.parse()?;
    let mut extender = LengthExtender::<Sha1Core>::new(secret_plus_message_length, message, digest);
    extender.update(suffix);
    Ok(extender.finalize())
}

/// Implements Length-Extension Attack on a HashAlgorithm where the inner state can be reconstructed from the output
pub struct LengthExtender<H: FromState> {
    msg: BytesMut,
    glue_start: usize,
    glue_len: usize,
    hasher: Hasher<H>,
}

impl<H: FromState> LengthExtender<H> {
    /// `total_len` is the length of everything the victim hashed, secret included.
    pub fn new(total_len: u64, message: &[u8], hash: H::Output) -> Self {
        let glue = H::padding(total_len);
        let resume_at = total_len.wrapping_add(glue.len() as u64);
        tracing::debug!(total_len, glue_len = glue.len(), resume_at, "seeding forged hasher");

        let mut msg = BytesMut::with_capacity(message.len() + glue.len() + H::BLOCK_LEN);
        msg.put_slice(message);
        msg.put_slice(&glue);

        Self {
            msg,
            glue_start: message.len(),
            glue_len: glue.len(),
            hasher: Hasher::from_state(H::unpack(&hash), resume_at),
        }
    }

    /// The padding spliced between the original message and the suffix.
    pub fn glue(&self) -> &[u8] {
        &self.msg[self.glue_start..self.glue_start + self.glue_len]
    }

    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(bytes);
        self.msg.put_slice(bytes);
        self
    }

    pub fn finalize(self) -> (Vec<u8>, H::Output) {
        (self.msg.into(), self.hasher.finalize())
    }
}

/// A forged message/tag pair together with the secret length that made it verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forgery {
    pub secret_len: usize,
    pub message: Vec<u8>,
    pub digest: Digest,
}

/// Tries each candidate secret length in order until `oracle` accepts a forgery.
pub fn forge_with_oracle<F>(
    message: &[u8],
    digest: &Digest,
    suffix: &[u8],
    secret_lengths: RangeInclusive<usize>,
    mut oracle: F,
) -> Option<Forgery>
where
    F: FnMut(&[u8], &Digest) -> bool,
{
    for secret_len in secret_lengths {
        // lengths past u64::MAX cannot be encoded, and the range only grows
        let Some(total_len) = (secret_len as u64).checked_add(message.len() as u64) else {
            break;
        };
        let mut extender = LengthExtender::<Sha1Core>::new(total_len, message, *digest);
        extender.update(suffix);
        let (forged, forged_digest) = extender.finalize();

        tracing::trace!(secret_len, digest = %forged_digest, "trying secret length");
        if oracle(&forged, &forged_digest) {
            tracing::debug!(secret_len, "oracle accepted forgery");
            return Some(Forgery { secret_len, message: forged, digest: forged_digest });
        }
    }
    None
}

#[test]
fn test_extend_example() {
    use crate::digest::sha1::padding;

    let secret = b"my secret key";
    let message = b"a=1&b=2";
    let digest = sign(secret, message);

    let total = (secret.len() + message.len()) as u64;
    let (forged, forged_digest) = extend(message, &digest.to_hex(), total, b"&b=5").unwrap();

    assert_eq!(forged, [&message[..], padding(total).as_slice(), &b"&b=5"[..]].concat());
    assert!(verify(secret, &forged, &forged_digest));
}

#[test]
fn test_extend_wrong_length() {
    let secret = b"my secret key";
    let message = b"a=1&b=2";
    let digest = sign(secret, message).to_hex();
    let total = (secret.len() + message.len()) as u64;

    for guess in [total - 1, total + 1] {
        let (forged, forged_digest) = extend(message, &digest, guess, b"&b=5").unwrap();
        assert!(!verify(secret, &forged, &forged_digest), "guess {guess}");
    }
}

#[test]
fn test_extend_rejects_malformed_digest() {
    let digest = sign(b"key", b"msg").to_hex();

    assert_eq!(
        extend(b"msg", &digest[..38], 10, b"x"),
        Err(MalformedDigestError::WrongLength { expected: 40, actual: 38 })
    );
    assert_eq!(
        extend(b"msg", &format!("{digest}00"), 10, b"x"),
        Err(MalformedDigestError::WrongLength { expected: 40, actual: 42 })
    );
    assert_eq!(
        extend(b"msg", &format!("z{}", &digest[1..]), 10, b"x"),
        Err(MalformedDigestError::NonHex { index: 0, found: 'z' })
    );
}

#[test]
fn test_oracle_search_stops_on_overflowing_length() {
    let digest = sign(b"key", b"msg");
    let mut asked = 0;

    let forgery = forge_with_oracle(b"msg", &digest, b"x", usize::MAX..=usize::MAX, |_, _| {
        asked += 1;
        false
    });

    assert_eq!(forgery, None);
    if usize::BITS == u64::BITS {
        assert_eq!(asked, 0);
    }
}

#[test]
fn test_glue_matches_padding() {
    use crate::digest::sha1::padding;

    let extender = LengthExtender::<Sha1Core>::new(20, b"abc", sign(b"x", b"abc"));
    assert_eq!(extender.glue(), padding(20).as_slice());
}
