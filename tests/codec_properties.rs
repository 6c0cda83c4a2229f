//! Property-based coverage of the chunked stream codec (§4.3, §8): the
//! round-trip and ciphertext-length invariants must hold for arbitrary
//! plaintexts and arbitrary transport rechunking, not just the boundary
//! sizes already covered by the codec's own unit tests.

use cybs3::codec::{ciphertext_length_for, drain, ChunkDecoder, ChunkEncoder, MemorySource};
use proptest::prelude::*;

async fn encrypt(key: [u8; 32], plaintext: Vec<u8>) -> Vec<u8> {
    let encoder = ChunkEncoder::new(key, MemorySource::new(plaintext));
    drain(encoder).await.unwrap()
}

async fn decrypt(key: [u8; 32], ciphertext: Vec<u8>, piece_len: usize) -> Vec<u8> {
    let source = if piece_len == 0 {
        MemorySource::new(ciphertext)
    } else {
        MemorySource::with_piece_len(ciphertext, piece_len)
    };
    drain(ChunkDecoder::new(key, source)).await.unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// For all plaintexts P and keys K: decrypt(encrypt(P)) == P, and the
    /// ciphertext length matches the pure length law (§3, §8).
    #[test]
    fn round_trips_and_matches_length_law(key in any::<[u8; 32]>(), plaintext in proptest::collection::vec(any::<u8>(), 0..(3 * 1024 * 1024 + 7))) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let plaintext_len = plaintext.len() as u64;
        let ciphertext = rt.block_on(encrypt(key, plaintext.clone()));
        prop_assert_eq!(ciphertext.len() as u64, ciphertext_length_for(plaintext_len));

        let recovered = rt.block_on(decrypt(key, ciphertext, 0));
        prop_assert_eq!(recovered, plaintext);
    }

    /// For all nonempty plaintexts and all ways of rechunking the ciphertext
    /// into a sequence of byte slices, the decoder yields the same plaintext
    /// (§4.3's transport-tolerance invariant).
    #[test]
    fn tolerates_arbitrary_rechunking(
        key in any::<[u8; 32]>(),
        plaintext in proptest::collection::vec(any::<u8>(), 1..(2 * 1024 * 1024 + 3)),
        piece_len in 1usize..4096,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ciphertext = rt.block_on(encrypt(key, plaintext.clone()));
        let recovered = rt.block_on(decrypt(key, ciphertext, piece_len));
        prop_assert_eq!(recovered, plaintext);
    }
}
