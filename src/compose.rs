use crate::crc::Crc32;
use crate::tail::{self, TAIL_LEN};

/// An extended buffer laid out as `original ‖ injection ‖ tail`, together with the two
/// checksums the search needs.
pub struct Composition {
    buffer: Vec<u8>,
    target: u32,
    base: u32,
}

impl Composition {
    pub fn new(crc: &Crc32, original: &[u8], injection: &[u8]) -> Self {
        let target = crc.calculate(original);
        let base = crc.resume(target, injection);
        let buffer = [original, injection, &[0u8; TAIL_LEN]].concat();
        Self { buffer, target, base }
    }

    /// Checksum of the original buffer, the one to restore.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Checksum of everything but the tail.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes `candidate` into the tail and hands back the finished buffer.
    pub fn apply(mut self, candidate: u32) -> Vec<u8> {
        let start = self.buffer.len() - TAIL_LEN;
        self.buffer[start..].copy_from_slice(&tail::encode(candidate));
        self.buffer
    }
}
