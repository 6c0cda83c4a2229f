//! Chunked Stream Codec (component C3 of the specification).
//!
//! Defines the single "lazy byte sequence" abstraction ([`ByteSource`]) used
//! throughout the crate — by the local file reader, by [`encoder`]/[`decoder`],
//! and by the S3 request/response bodies in [`crate::s3`] — so the codec's
//! public API does not depend on any one HTTP or filesystem streaming type
//! (§9's re-architecture guidance). [`ciphertext_length_for`] is the pure
//! length calculator the signed upload path needs before it can send a
//! `Content-Length` header (§3's ciphertext-length law).

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{CHUNK, FRAME_OVERHEAD};
use crate::error::Result;

pub mod decoder;
pub mod encoder;
pub mod file_source;

pub use decoder::ChunkDecoder;
pub use encoder::ChunkEncoder;
pub use file_source::FileSource;

/// A lazy, pull-based sequence of byte chunks with an explicit end.
///
/// `next_chunk` returns `Ok(Some(bytes))` for more data, `Ok(None)` at a
/// clean end of stream, or `Err` to abort. Implementors may return chunks
/// of any nonzero size; callers must not assume any particular chunking.
#[async_trait]
pub trait ByteSource: Send {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// An in-memory [`ByteSource`], primarily for tests, that yields its
/// buffer split into fixed-size pieces (or a single piece if `piece_len`
/// is `None` or exceeds the remaining length).
pub struct MemorySource {
    data: Vec<u8>,
    pos: usize,
    piece_len: Option<usize>,
}

impl MemorySource {
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0, piece_len: None }
    }

    #[must_use]
    pub fn with_piece_len(data: Vec<u8>, piece_len: usize) -> Self {
        Self { data, pos: 0, piece_len: Some(piece_len) }
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let len = self.piece_len.unwrap_or(self.data.len() - self.pos).max(1);
        let end = (self.pos + len).min(self.data.len());
        let chunk = Bytes::copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(Some(chunk))
    }
}

/// Computes the encrypted object length for a `plaintext_len`-byte plaintext
/// without reading any plaintext (§3's ciphertext-length law). The signed
/// streaming upload path needs this up front for `Content-Length`.
#[must_use]
pub fn ciphertext_length_for(plaintext_len: u64) -> u64 {
    if plaintext_len == 0 {
        return 0;
    }
    let chunk = CHUNK as u64;
    let overhead = FRAME_OVERHEAD as u64;
    let full_frames = plaintext_len / chunk;
    let remainder = plaintext_len % chunk;
    full_frames * (chunk + overhead) + if remainder == 0 { 0 } else { remainder + overhead }
}

/// Drains a [`ByteSource`] into a single `Vec<u8>`. Used by tests and by
/// the config store, never by the streaming S3 request path.
pub async fn drain(mut source: impl ByteSource) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = source.next_chunk().await? {
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_law_boundaries() {
        assert_eq!(ciphertext_length_for(0), 0);
        assert_eq!(ciphertext_length_for(CHUNK as u64), (CHUNK + FRAME_OVERHEAD) as u64);
        assert_eq!(
            ciphertext_length_for(CHUNK as u64 + 1),
            (CHUNK + FRAME_OVERHEAD) as u64 + 1 + FRAME_OVERHEAD as u64
        );
        assert_eq!(ciphertext_length_for(1), 1 + FRAME_OVERHEAD as u64);
    }

    #[tokio::test]
    async fn memory_source_yields_whole_buffer_by_default() {
        let src = MemorySource::new(vec![1, 2, 3]);
        let all = drain(src).await.unwrap();
        assert_eq!(all, vec![1, 2, 3]);
    }
}
