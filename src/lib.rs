pub mod alu;
pub mod cpu;
pub mod decoder;
pub mod exec;
pub mod disasm;
pub mod gpio;
pub mod instructions;
pub mod memory;

pub mod isa {
    pub mod arm; // ARM-like 32-bit word format shared with the assembler
}

pub use cpu::{Cpsr, Cpu, CpuConfig, Trap};
pub use exec::Control;
pub use gpio::{Gpio, MappedMemory};
pub use memory::{Bus, LinearMemory, MEM_SIZE};
