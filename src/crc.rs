/// Table-driven CRC-32 over the reflected IEEE polynomial.
pub struct Crc32 {
    table: [u32; 256],
}

impl Crc32 {
    pub fn new() -> Self {
        Self {
            table: std::array::from_fn(|i| {
                let mut e = i as u32;
                for _ in 0..8 {
                    if e & 1 == 1 {
                        e = 0xedb88320 ^ (e >> 1);
                    } else {
                        e >>= 1;
                    }
                }
                e
            }),
        }
    }

    pub fn calculate(&self, bytes: &[u8]) -> u32 {
        self.resume(0, bytes)
    }

    /// Given `checksum`, the finished CRC-32 of some prefix, returns the CRC-32 of that prefix
    /// followed by `bytes`. The prefix itself is never touched.
    ///
    /// The finished value is the complement of the running register, so the register is
    /// recovered with `!checksum` and complemented again once `bytes` are folded in.
    pub fn resume(&self, checksum: u32, bytes: &[u8]) -> u32 {
        let mut register = !checksum;
        bytes.iter().for_each(|byte| register = self.step(register, *byte));
        !register
    }

    #[inline(always)]
    fn step(&self, register: u32, byte: u8) -> u32 {
        self.table[((register ^ byte as u32) & 0xff) as usize] ^ (register >> 8)
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}
