//! Local file reader, as a [`ByteSource`] (§9's "lazy byte sequence" note).
//!
//! The CLI's upload path reads plaintext through this rather than loading
//! whole files into memory, keeping the O(CHUNK) memory bound end to end
//! from disk through [`super::encoder::ChunkEncoder`] to the HTTP body.

use std::path::Path;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::AsyncReadExt;

use crate::error::{CoreError, Result};

use super::ByteSource;

const READ_BUF_LEN: usize = 64 * 1024;

pub struct FileSource {
    file: tokio::fs::File,
}

impl FileSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await.map_err(|e| CoreError::file_access(path, e))?;
        Ok(Self { file })
    }
}

#[async_trait]
impl ByteSource for FileSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        let mut buf = BytesMut::zeroed(READ_BUF_LEN);
        let n = self.file.read(&mut buf).await.map_err(|e| CoreError::file_access(Path::new("<open file>"), e))?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf.freeze()))
    }
}
