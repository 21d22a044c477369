//! The four trailing bytes that get brute-forced, always read and written little-endian.

pub const TAIL_LEN: usize = 4;

pub fn encode(candidate: u32) -> [u8; TAIL_LEN] {
    candidate.to_le_bytes()
}

pub fn decode(bytes: [u8; TAIL_LEN]) -> u32 {
    u32::from_le_bytes(bytes)
}
