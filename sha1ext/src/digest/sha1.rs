use std::{fmt, str::FromStr};

use super::{FromState, HashAlgorithm, Hasher};
use crate::{encode::hex, error::MalformedDigestError};

pub type Sha1 = Hasher<Sha1Core>;

pub const DIGEST_LEN: usize = 20;
pub const BLOCK_LEN: usize = 64;

pub const INITIAL_STATE: [u32; 5] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];
const ROUND_CONSTANTS: [u32; 4] = [0x5A827999, 0x6ED9EBA1, 0x8F1BBCDC, 0xCA62C1D6];

/// A finished SHA-1 output, the state words in big-endian order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn from_words(words: [u32; 5]) -> Self {
        let mut bytes = [0u8; DIGEST_LEN];
        bytes
            .chunks_exact_mut(4)
            .zip(words)
            .for_each(|(chunk, word)| chunk.copy_from_slice(&word.to_be_bytes()));
        Self(bytes)
    }

    pub fn words(&self) -> [u32; 5] {
        let mut words = [0u32; 5];
        words
            .iter_mut()
            .zip(self.0.chunks_exact(4))
            .for_each(|(word, chunk)| *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        words
    }

    pub fn to_hex(&self) -> String {
        hex::to_hex(&self.0)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self:x})")
    }
}

impl FromStr for Digest {
    type Err = MalformedDigestError;

    /// Parses exactly 40 hex digits, either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let actual = s.chars().count();
        if actual != 2 * DIGEST_LEN {
            return Err(MalformedDigestError::WrongLength { expected: 2 * DIGEST_LEN, actual });
        }
        if let Some((index, found)) = s.chars().enumerate().find(|(_, c)| !c.is_ascii_hexdigit()) {
            return Err(MalformedDigestError::NonHex { index, found });
        }

        let mut bytes = [0u8; DIGEST_LEN];
        for (i, (byte, pair)) in bytes.iter_mut().zip(s.as_bytes().chunks_exact(2)).enumerate() {
            *byte = hex::decode_pair(pair[0], pair[1])
                .ok_or(MalformedDigestError::NonHex { index: 2 * i, found: pair[0] as char })?;
        }
        Ok(Self(bytes))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sha1Core {
    state: [u32; 5],
    processed: u64,
}

impl Sha1Core {
    pub fn state(&self) -> [u32; 5] {
        self.state
    }
}

impl Default for Sha1Core {
    fn default() -> Self {
        Self { state: INITIAL_STATE, processed: 0 }
    }
}

impl HashAlgorithm for Sha1Core {
    const DIGEST_SIZE: usize = DIGEST_LEN;
    const BLOCK_LEN: usize = BLOCK_LEN;
    type Output = Digest;

    fn compress(&mut self, block: &[u8]) {
        debug_assert_eq!(block.len(), Self::BLOCK_LEN);

        let mut w = [0u32; 80];
        w.iter_mut()
            .zip(block.chunks_exact(4))
            .for_each(|(u, v)| *u = u32::from_be_bytes([v[0], v[1], v[2], v[3]]));

        for i in 16..80 {
            w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1)
        }

        let [mut a, mut b, mut c, mut d, mut e] = self.state;

        for (i, &word) in w.iter().enumerate() {
            let f = match i {
                0..=19 => choose(b, c, d),
                20..=39 | 60..=79 => parity(b, c, d),
                _ => majority(b, c, d),
            };
            let temp = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(ROUND_CONSTANTS[i / 20])
                .wrapping_add(word);
            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = temp;
        }

        for (s, v) in self.state.iter_mut().zip([a, b, c, d, e]) {
            *s = s.wrapping_add(v);
        }
        self.processed = self.processed.wrapping_add(Self::BLOCK_LEN as u64);
    }

    fn processed(&self) -> u64 {
        self.processed
    }

    fn padding(len: u64) -> Vec<u8> {
        padding(len)
    }

    fn finalize(self) -> Self::Output {
        Digest::from_words(self.state)
    }
}

impl FromState for Sha1Core {
    type State = [u32; 5];

    fn from_state(state: Self::State, processed: u64) -> Self {
        Self { state, processed }
    }

    fn unpack(hash: &Self::Output) -> Self::State {
        hash.words()
    }
}

/// Merkle-Damgard strengthening for a message of `len` bytes: `0x80`, zeros up
/// to 56 mod 64, then the bit length as a big-endian u64.
pub fn padding(len: u64) -> Vec<u8> {
    let n_zeros = ((BLOCK_LEN as u64 + 55 - len % BLOCK_LEN as u64) % BLOCK_LEN as u64) as usize;
    let mut pad = Vec::with_capacity(1 + n_zeros + 8);
    pad.push(0x80);
    pad.resize(1 + n_zeros, 0x00);
    pad.extend_from_slice(&len.wrapping_mul(8).to_be_bytes());
    pad
}

#[inline]
fn choose(b: u32, c: u32, d: u32) -> u32 {
    (b & c) | (!b & d)
}

#[inline]
fn parity(b: u32, c: u32, d: u32) -> u32 {
    b ^ c ^ d
}

#[inline]
fn majority(b: u32, c: u32, d: u32) -> u32 {
    (b & c) | (b & d) | (c & d)
}

#[test]
fn test_sha1() {
    // FIPS 180 examples plus the wikipedia pangrams
    let vectors: [(&[u8], &str); 5] = [
        (b"", "da39a3ee5e6b4b0d3255bfef95601890afd80709"),
        (b"abc", "a9993e364706816aba3e25717850c26c9cd0d89d"),
        (b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq", "84983e441c3bd26ebaae4aa1f95129e5e54670f1"),
        (b"The quick brown fox jumps over the lazy dog", "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"),
        (b"The quick brown fox jumps over the lazy cog", "de9f2c7fd25e1b3afad3e85a0bd17d9b100db4b3"),
    ];

    for (input, expected) in vectors {
        let mut hasher = Sha1::new();
        hasher.update(input);
        assert_eq!(hasher.finalize().to_hex(), expected);
    }
}

#[test]
fn test_sha1_million_a() {
    let mut hasher = Sha1::new();
    for _ in 0..1000 {
        hasher.update([b'a'; 1000]);
    }
    assert_eq!(hasher.finalize().to_hex(), "34aa973cd4c4daa4f61eeb2bdbad27316534016f");
}

#[test]
fn test_padding_edges() {
    assert_eq!(padding(0).len(), 64);
    assert_eq!(padding(55).len(), 9);
    assert_eq!(padding(56).len(), 72);
    assert_eq!(padding(63).len(), 65);
    assert_eq!(padding(64).len(), 64);

    let pad = padding(3);
    assert_eq!(pad[0], 0x80);
    assert!(pad[1..53].iter().all(|&b| b == 0));
    assert_eq!(&pad[53..], &24u64.to_be_bytes());
}

#[test]
fn test_seeded_core_resumes() {
    let mut fresh = Sha1Core::default();
    fresh.compress(&[0x61; 64]);

    let resumed = Sha1Core::from_state(fresh.state(), 64);
    assert_eq!(resumed, fresh);
    assert_eq!(Digest::from_words(resumed.state()).words(), fresh.state());
}

#[test]
fn test_digest_text_form() {
    let text = "A9993E364706816ABA3E25717850C26C9CD0D89D";
    let digest: Digest = text.parse().unwrap();
    assert_eq!(digest.to_string(), text.to_ascii_lowercase());
    assert_eq!(digest.words()[0], 0xa9993e36);

    assert_eq!(
        "abc".parse::<Digest>(),
        Err(MalformedDigestError::WrongLength { expected: 40, actual: 3 })
    );
    assert_eq!(
        format!("{}g", &text[..39]).parse::<Digest>(),
        Err(MalformedDigestError::NonHex { index: 39, found: 'g' })
    );
    // multi-byte chars are counted as single characters
    assert_eq!(
        format!("{}é", &text[..39]).parse::<Digest>(),
        Err(MalformedDigestError::NonHex { index: 39, found: 'é' })
    );
}
