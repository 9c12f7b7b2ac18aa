use bytes::{Buf, BufMut, BytesMut};

pub mod sha1;

/// Streaming front end for a [`HashAlgorithm`]: buffers input and feeds the
/// core one whole block at a time.
#[derive(Clone)]
pub struct Hasher<H: HashAlgorithm> {
    core: H,
    buf: BytesMut,
}

/// Allows rebuilding a core from a published state and a declared byte count.
///
/// No consistency check is made between the two: a length-extension attack
/// needs to seed a core with a state it never computed itself.
pub trait FromState: HashAlgorithm {
    type State;

    fn from_state(state: Self::State, processed: u64) -> Self;
    fn unpack(hash: &Self::Output) -> Self::State;
}

/// Basic pattern for a Merkle-Damgard hash
///  - compress for exactly BLOCK_LEN bytes
///  - padding as a pure function of the total message length
///  - finalize for translating internal state to output
pub trait HashAlgorithm: Default {
    const DIGEST_SIZE: usize;
    const BLOCK_LEN: usize;
    type Output: Sized + Clone + Copy + AsRef<[u8]>;

    fn compress(&mut self, block: &[u8]);
    /// Bytes pushed through `compress` so far.
    fn processed(&self) -> u64;
    fn padding(len: u64) -> Vec<u8>;
    fn finalize(self) -> Self::Output;
}

impl<H: HashAlgorithm> Hasher<H> {
    pub fn new() -> Self {
        Self::with_core(H::default())
    }

    fn with_core(core: H) -> Self {
        Self { core, buf: BytesMut::with_capacity(2 * H::BLOCK_LEN) }
    }

    pub fn update(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.buf.put_slice(bytes.as_ref());
        self.drain_blocks();
        self
    }

    pub fn finalize(mut self) -> H::Output {
        let total = self.total_len();
        tracing::trace!(
            processed = self.core.processed(),
            pending = self.buf.len(),
            "finalizing digest"
        );
        self.buf.put_slice(&H::padding(total));
        self.drain_blocks();
        if !self.buf.is_empty() {
            // seeded with a count off the block grid; only whole blocks are hashed
            tracing::trace!(dropped = self.buf.len(), "dropping partial padding block");
        }
        let output = self.core.finalize();
        debug_assert_eq!(output.as_ref().len(), H::DIGEST_SIZE);
        output
    }

    /// Bytes already compressed, excluding the carry.
    pub fn processed(&self) -> u64 {
        self.core.processed()
    }

    /// Length of the carry waiting for a full block.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn total_len(&self) -> u64 {
        self.core.processed().wrapping_add(self.buf.len() as u64)
    }

    fn drain_blocks(&mut self) {
        while let Some(block) = self.buf.get(0..H::BLOCK_LEN) {
            self.core.compress(block);
            self.buf.advance(H::BLOCK_LEN);
        }
        debug_assert!(self.buf.len() < H::BLOCK_LEN);
    }
}

impl<H: FromState> Hasher<H> {
    pub fn from_state(state: H::State, processed: u64) -> Self {
        Self::with_core(H::from_state(state, processed))
    }
}

impl<H: HashAlgorithm> Default for Hasher<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculates the naive MAC of a given (secret) key and message : MAC(key, message) = H( key || message )
pub fn mac<H: HashAlgorithm>(key: &[u8], message: &[u8]) -> H::Output {
    let mut hasher = Hasher::<H>::new();
    hasher.update(key).update(message);
    hasher.finalize()
}

#[macro_export]
macro_rules! hash {
    ($algo:ty, $($x:expr),*) => {
        {
            let mut temp = $crate::digest::Hasher::<$algo>::new();
            $(
                temp.update($x);
            )*
            temp.finalize()
        }
    };
}

#[test]
fn test_carry_stays_below_block() {
    use sha1::Sha1;

    let mut hasher = Sha1::new();
    hasher.update([0u8; 63]);
    assert_eq!((hasher.processed(), hasher.pending()), (0, 63));
    hasher.update([0u8; 1]);
    assert_eq!((hasher.processed(), hasher.pending()), (64, 0));
    hasher.update([0u8; 200]);
    assert_eq!((hasher.processed(), hasher.pending()), (256, 8));
}

#[test]
fn test_chunked_updates() {
    use sha1::{Sha1, Sha1Core};

    let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
    let whole = hash!(Sha1Core, &data);

    for step in [1, 3, 7, 55, 56, 63, 64, 65, 128, 999] {
        let mut hasher = Sha1::new();
        data.chunks(step).for_each(|chunk| {
            hasher.update(chunk);
        });
        assert_eq!(hasher.finalize(), whole, "chunk size {step}");
    }
}

#[test]
fn test_mac_is_prefix_hash() {
    use sha1::Sha1Core;

    assert_eq!(
        mac::<Sha1Core>(b"YELLOW SUBMARINE", b"MESSAGE"),
        hash!(Sha1Core, b"YELLOW SUBMARINEMESSAGE")
    );
    assert_ne!(
        mac::<Sha1Core>(b"YELLOW SUBMARINE", b"MESSAGE"),
        mac::<Sha1Core>(b"YELLOW SUBMARINE", b"MESSAG")
    );
    assert_ne!(
        mac::<Sha1Core>(b"YELLOW SUBMARINF", b"MESSAGE"),
        mac::<Sha1Core>(b"YELLOW SUBMARINE", b"MESSAGE")
    );
}

#[test]
fn test_seeded_counter_drives_padding() {
    use sha1::{padding, Sha1, Sha1Core, INITIAL_STATE};

    // block aligned count: the length field is the seeded count plus the carry
    let carry = [0x5a_u8; 10];
    let mut seeded = Sha1::from_state(INITIAL_STATE, 128);
    seeded.update(carry);
    assert_eq!((seeded.processed(), seeded.pending()), (128, 10));

    let tail = [&carry[..], padding(138).as_slice()].concat();
    assert_eq!(tail.len(), 64);
    assert_eq!(&tail[56..], &(138u64 * 8).to_be_bytes());
    let mut core = Sha1Core::from_state(INITIAL_STATE, 128);
    core.compress(&tail);
    assert_eq!(seeded.finalize(), core.finalize());

    // count off the block grid: padding still uses processed + pending verbatim,
    // and the trailing partial block is left out
    let carry = [0x5a_u8; 57];
    let mut seeded = Sha1::from_state(INITIAL_STATE, 7);
    seeded.update(carry);
    assert_eq!((seeded.processed(), seeded.pending()), (7, 57));

    let tail = [&carry[..], padding(64).as_slice()].concat();
    assert_eq!(tail.len(), 121);
    let mut core = Sha1Core::from_state(INITIAL_STATE, 7);
    core.compress(&tail[..64]);
    assert_eq!(seeded.finalize(), core.finalize());
}
