use std::io::{self, Read};
use sha2::{Sha256, Digest};

/// Reader adapter that computes the SHA-256 of everything read through it,
/// so a file can be archived and hashed in a single pass.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes_read: u64,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_read: 0,
        }
    }

    /// Number of bytes read and the lowercase hex digest of them
    pub fn finish(self) -> (u64, String) {
        let hash = self.hasher.finalize();
        (self.bytes_read, format!("{:x}", hash))
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes_read += n as u64;
        Ok(n)
    }
}
