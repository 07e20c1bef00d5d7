use crate::decoder::{Condition, Decoder, Register};
use crate::disasm::fmt_decoded;
use crate::exec::{Control, Executor};
use crate::memory::Bus;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CpuConfig {
    /// Abort with [`Trap::StepLimit`] after this many instructions.
    pub max_steps: Option<u64>,
}

pub const NUM_GPR: usize = 13;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub gpr: [u32; NUM_GPR], // r0..r12
    pub sp: u32,
    pub lr: u32,
    pub pc: u32,
    pub cpsr: Cpsr,
    pub cfg: CpuConfig,
}

bitflags! {
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpsr: u32 {
const V = 1 << 28; // Overflow
const C = 1 << 29; // Carry / not borrow
const Z = 1 << 30; // Zero
const N = 1 << 31; // Negative
}
}

impl Cpsr {
    pub fn passes(self, cond: Condition) -> bool {
        use Condition::*;
        let n = self.contains(Cpsr::N);
        let z = self.contains(Cpsr::Z);
        let c = self.contains(Cpsr::C);
        let v = self.contains(Cpsr::V);
        match cond {
            Eq => z,
            Ne => !z,
            Cs => c,
            Cc => !c,
            Mi => n,
            Pl => !n,
            Vs => v,
            Vc => !v,
            Hi => c && !z,
            Ls => !c || z,
            Ge => n == v,
            Lt => n != v,
            Gt => !z && n == v,
            Le => z || n != v,
            Al => true,
            Nv => false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("Invalid instruction {raw:#010x} at {pc:#010x}")]
    InvalidInstruction { pc: u32, raw: u32 },
    #[error("Unaligned access at {addr:#010x}")]
    Unaligned { addr: u32 },
    #[error("Out of bounds memory access at {addr:#010x}")]
    OutOfRange { addr: u32 },
    #[error("Step limit of {steps} instructions reached")]
    StepLimit { steps: u64 },
}

/// Reads the instruction word at `pc`.
pub fn fetch<B: Bus>(bus: &mut B, pc: u32) -> Result<u32, Trap> {
    bus.read_u32(pc)
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            gpr: [0; NUM_GPR],
            sp: 0,
            lr: 0,
            pc: 0,
            cpsr: Cpsr::empty(),
            cfg,
        }
    }

    pub fn reset(&mut self, reset_pc: u32) {
        self.gpr = [0; NUM_GPR];
        self.sp = 0;
        self.lr = 0;
        self.cpsr = Cpsr::empty();
        self.pc = reset_pc;
    }

    /// r15 reads as the address of the executing instruction.
    pub fn reg(&self, r: Register) -> u32 {
        match r {
            Register::Sp => self.sp,
            Register::Lr => self.lr,
            Register::Pc => self.pc,
            r => self.gpr[r.index()],
        }
    }

    pub fn set_reg(&mut self, r: Register, val: u32) {
        match r {
            Register::Sp => self.sp = val,
            Register::Lr => self.lr = val,
            Register::Pc => self.pc = val,
            r => self.gpr[r.index()] = val,
        }
    }

    /// Sets N and Z from `res`; C and V only when reported.
    pub fn set_flags(&mut self, res: u32, carry: Option<bool>, overflow: Option<bool>) {
        self.cpsr.set(Cpsr::N, (res as i32) < 0);
        self.cpsr.set(Cpsr::Z, res == 0);
        if let Some(c) = carry {
            self.cpsr.set(Cpsr::C, c);
        }
        if let Some(v) = overflow {
            self.cpsr.set(Cpsr::V, v);
        }
    }

    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<Control, Trap> {
        let pc = self.pc;
        let raw32 = fetch(bus, pc)?;
        let d = dec
            .decode(raw32)
            .ok_or(Trap::InvalidInstruction { pc, raw: raw32 })?;
        trace!(
            pc = format_args!("{pc:#010x}"),
            raw = format_args!("{raw32:#010x}"),
            "{}",
            fmt_decoded(&d)
        );
        let ctl = exec.exec(self, bus, d)?;
        if ctl == Control::Continue {
            self.pc = pc.wrapping_add(4);
        }
        Ok(ctl)
    }

    /// Steps until a halt. Returns the number of instructions executed,
    /// the halt included.
    pub fn run<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<u64, Trap> {
        let mut steps = 0u64;
        loop {
            if let Some(max) = self.cfg.max_steps {
                if steps >= max {
                    return Err(Trap::StepLimit { steps });
                }
            }
            steps += 1;
            if self.step(bus, dec, exec)? == Control::Halt {
                debug!(steps, pc = format_args!("{:#010x}", self.pc), "halted");
                return Ok(steps);
            }
        }
    }
}
