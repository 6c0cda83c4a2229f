//! Streaming encrypt side of the chunked stream codec (§4.3).
//!
//! [`ChunkEncoder`] wraps a plaintext [`ByteSource`] and is itself a
//! `ByteSource` of ciphertext frames: each call to `next_chunk` advances the
//! `AccumulatingChunk → Flushing → Terminated` state machine and yields at
//! most one sealed frame, in O(CHUNK) memory.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use crate::aead;
use crate::config::CHUNK;
use crate::error::Result;

use super::ByteSource;

pub struct ChunkEncoder<S> {
    key: [u8; 32],
    upstream: S,
    buffer: BytesMut,
    upstream_done: bool,
    terminated: bool,
}

impl<S: ByteSource> ChunkEncoder<S> {
    #[must_use]
    pub fn new(key: [u8; 32], upstream: S) -> Self {
        Self { key, upstream, buffer: BytesMut::new(), upstream_done: false, terminated: false }
    }
}

#[async_trait]
impl<S: ByteSource> ByteSource for ChunkEncoder<S> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.terminated {
            return Ok(None);
        }

        loop {
            if self.buffer.len() >= CHUNK {
                let plaintext = self.buffer.split_to(CHUNK);
                return Ok(Some(Bytes::from(aead::seal(&self.key, &plaintext))));
            }

            if self.upstream_done {
                self.terminated = true;
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let plaintext = std::mem::take(&mut self.buffer);
                return Ok(Some(Bytes::from(aead::seal(&self.key, &plaintext))));
            }

            match self.upstream.next_chunk().await? {
                Some(bytes) => self.buffer.extend_from_slice(&bytes),
                None => self.upstream_done = true,
            }
        }
    }
}
