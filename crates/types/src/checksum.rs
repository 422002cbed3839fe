//! Streaming Adler-32 checksum.
//!
//! STF files are fingerprinted with zlib-compatible Adler-32, the checksum
//! the downstream data-management chain expects (rendered as `ad:<value>`).
//! The hasher is incremental so files are digested in constant memory,
//! chunk by chunk, and the result is independent of the chunk size.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Chunk size used when digesting files.
pub const CHECKSUM_CHUNK_SIZE: usize = 4096;

const MOD_ADLER: u32 = 65521;
// Largest n such that 255n(n+1)/2 + (n+1)(MOD_ADLER-1) fits in u32,
// i.e. how many bytes can be summed before a modulo is required.
const NMAX: usize = 5552;

/// Incremental Adler-32 hasher.
#[derive(Debug, Clone)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new hasher in the initial state (checksum of empty input is 1).
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Feed a chunk of bytes into the checksum.
    pub fn update(&mut self, chunk: &[u8]) {
        for block in chunk.chunks(NMAX) {
            for &byte in block {
                self.a += u32::from(byte);
                self.b += self.a;
            }
            self.a %= MOD_ADLER;
            self.b %= MOD_ADLER;
        }
    }

    /// Finish and return the 32-bit checksum.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Checksum of a single byte slice.
    pub fn digest(bytes: &[u8]) -> u32 {
        let mut hasher = Self::new();
        hasher.update(bytes);
        hasher.finish()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Digest a file in fixed-size chunks, returning its Adler-32 checksum.
pub fn file_checksum(path: &Path) -> io::Result<u32> {
    let mut file = File::open(path)?;
    let mut hasher = Adler32::new();
    let mut buf = [0u8; CHECKSUM_CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finish())
}
