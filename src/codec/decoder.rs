//! Streaming decrypt side of the chunked stream codec (§4.3).
//!
//! [`ChunkDecoder`] is transport-tolerant: it reassembles frames correctly
//! no matter how the upstream [`ByteSource`] rechunks the ciphertext bytes.
//! A frame's plaintext is never yielded until its AEAD tag has verified;
//! any `AuthFailure`/`Truncated` aborts the stream immediately.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

use crate::aead;
use crate::config::{CHUNK, FRAME_OVERHEAD};
use crate::error::{CoreError, Result};

use super::ByteSource;

pub struct ChunkDecoder<S> {
    key: [u8; 32],
    upstream: S,
    buffer: BytesMut,
    upstream_done: bool,
    terminated: bool,
}

impl<S: ByteSource> ChunkDecoder<S> {
    #[must_use]
    pub fn new(key: [u8; 32], upstream: S) -> Self {
        Self { key, upstream, buffer: BytesMut::new(), upstream_done: false, terminated: false }
    }

    fn open_frame(&mut self, frame: Bytes) -> Result<Bytes> {
        match aead::open(&self.key, &frame) {
            Ok(plaintext) => Ok(Bytes::from(plaintext)),
            Err(e) => {
                self.terminated = true;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: ByteSource> ByteSource for ChunkDecoder<S> {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.terminated {
            return Ok(None);
        }

        loop {
            if self.buffer.len() >= CHUNK + FRAME_OVERHEAD {
                let frame = self.buffer.split_to(CHUNK + FRAME_OVERHEAD).freeze();
                return self.open_frame(frame).map(Some);
            }

            if self.upstream_done {
                self.terminated = true;
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                if self.buffer.len() < FRAME_OVERHEAD {
                    return Err(CoreError::Truncated);
                }
                let frame = std::mem::take(&mut self.buffer).freeze();
                return self.open_frame(frame).map(Some);
            }

            match self.upstream.next_chunk().await? {
                Some(bytes) => self.buffer.extend_from_slice(&bytes),
                None => self.upstream_done = true,
            }
        }
    }
}
