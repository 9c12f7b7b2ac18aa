use proptest::prelude::*;
use sha1ext::{hash, padding, Sha1, Sha1Core};

fn split_at_all(data: &[u8], mut cuts: Vec<usize>) -> Vec<&[u8]> {
    cuts.iter_mut().for_each(|c| *c %= data.len() + 1);
    cuts.sort_unstable();

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        pieces.push(&data[start..cut]);
        start = cut;
    }
    pieces.push(&data[start..]);
    pieces
}

proptest! {
    #[test]
    fn any_split_hashes_the_same(
        data in proptest::collection::vec(any::<u8>(), 0..600),
        cuts in proptest::collection::vec(any::<usize>(), 0..8),
    ) {
        let whole = hash!(Sha1Core, &data);

        let mut hasher = Sha1::new();
        for piece in split_at_all(&data, cuts) {
            hasher.update(piece);
        }
        prop_assert!(hasher.pending() < 64);
        prop_assert_eq!(hasher.finalize(), whole);
    }

    #[test]
    fn padding_completes_a_block(len in any::<u64>()) {
        let pad = padding(len);

        prop_assert!((9..=72).contains(&pad.len()));
        prop_assert_eq!(len.wrapping_add(pad.len() as u64) % 64, 0);
        prop_assert_eq!(pad[0], 0x80);
        prop_assert!(pad[1..pad.len() - 8].iter().all(|&b| b == 0));

        let mut tail = [0u8; 8];
        tail.copy_from_slice(&pad[pad.len() - 8..]);
        prop_assert_eq!(u64::from_be_bytes(tail), len.wrapping_mul(8));
    }
}

#[test]
fn chained_updates_match_single_update() {
    let mut chained = Sha1::new();
    chained.update(b"The quick brown ").update(b"fox jumps over ").update(b"the lazy dog");

    assert_eq!(
        chained.finalize().to_string(),
        "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"
    );
}

#[test]
fn carry_lengths_around_the_padding_boundary() {
    use rand::{Rng, SeedableRng};

    let mut rng = rand::rngs::StdRng::seed_from_u64(29);
    for len in 50..140 {
        let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let whole = hash!(Sha1Core, &data);

        let mut bytewise = Sha1::new();
        data.iter().for_each(|b| {
            bytewise.update([*b]);
        });
        assert_eq!(bytewise.finalize(), whole, "length {len}");
    }
}
