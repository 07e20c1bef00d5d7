use crate::cpu::Trap;
use serde::{Deserialize, Serialize};

/// Size of the emulated RAM in bytes.
pub const MEM_SIZE: usize = 65536;

/// Word-granular memory port. Every access must be 4-byte aligned.
pub trait Bus {
    fn read_u32(&mut self, addr: u32) -> Result<u32, Trap>;
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), Trap>;
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size] }
    }

    /// Copies a binary image to address 0.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), Trap> {
        if bytes.len() > self.mem.len() {
            return Err(Trap::OutOfRange {
                addr: bytes.len() as u32,
            });
        }
        self.mem[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Aligned, non-zero words in address order.
    pub fn nonzero_words(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.mem.chunks_exact(4).enumerate().filter_map(|(i, w)| {
            let v = u32::from_le_bytes([w[0], w[1], w[2], w[3]]);
            (v != 0).then_some(((i * 4) as u32, v))
        })
    }

    fn check(&self, addr: u32) -> Result<usize, Trap> {
        if addr % 4 != 0 {
            return Err(Trap::Unaligned { addr });
        }
        let off = addr as usize;
        if off + 4 > self.mem.len() {
            return Err(Trap::OutOfRange { addr });
        }
        Ok(off)
    }

    fn load_le_u32(&self, off: usize) -> u32 {
        u32::from_le_bytes([
            self.mem[off],
            self.mem[off + 1],
            self.mem[off + 2],
            self.mem[off + 3],
        ])
    }

    fn store_le_u32(&mut self, off: usize, v: u32) {
        self.mem[off..off + 4].copy_from_slice(&v.to_le_bytes());
    }
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new(MEM_SIZE)
    }
}

impl Bus for LinearMemory {
    fn read_u32(&mut self, addr: u32) -> Result<u32, Trap> {
        let off = self.check(addr)?;
        Ok(self.load_le_u32(off))
    }
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), Trap> {
        let off = self.check(addr)?;
        self.store_le_u32(off, val);
        Ok(())
    }
}
