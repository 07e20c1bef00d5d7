use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alu::{self, Shifted};
use crate::cpu::{Cpu, Trap};
use crate::decoder::{Instruction, Offset, Operand2, Register, Shift, ShiftedRegister};
use crate::memory::Bus;

/// What the fetch loop does after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    /// Advance the PC to the next word.
    Continue,
    /// The PC has already been moved.
    Branch,
    Halt,
}

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Instruction) -> Result<Control, Trap>;
}

fn shifted_register(cpu: &Cpu, sr: &ShiftedRegister) -> Shifted {
    let value = cpu.reg(sr.rm);
    match sr.shift {
        Shift::Amount { kind, amount } => alu::shift(kind, value, amount as u32),
        Shift::Register { kind, rs } => alu::shift(kind, value, cpu.reg(rs) & 0xFF),
    }
}

fn operand2(cpu: &Cpu, op2: &Operand2) -> Shifted {
    match op2 {
        Operand2::Immediate { imm, rotate } => Shifted {
            value: (*imm as u32).rotate_right(2 * *rotate as u32),
            carry: None,
        },
        Operand2::Register(sr) => shifted_register(cpu, sr),
    }
}

/// Writing r15 counts as a branch.
fn write_back(cpu: &mut Cpu, rd: Register, val: u32) -> Control {
    cpu.set_reg(rd, val);
    if rd == Register::Pc {
        Control::Branch
    } else {
        Control::Continue
    }
}

pub struct IntExecutor;
impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: Instruction) -> Result<Control, Trap> {
        let cond = d.condition();
        if !cpu.cpsr.passes(cond) {
            debug!(pc = format_args!("{:#010x}", cpu.pc), ?cond, "condition failed");
            return Ok(Control::Continue);
        }

        match d {
            Instruction::DataProcessing {
                opcode,
                set_flags,
                rn,
                rd,
                operand2: op2,
                ..
            } => {
                let b = operand2(cpu, &op2);
                let out = alu::compute(opcode, cpu.reg(rn), b);
                if set_flags {
                    cpu.set_flags(out.value, out.carry, out.overflow);
                }
                if opcode.writes_result() {
                    return Ok(write_back(cpu, rd, out.value));
                }
            }
            Instruction::Multiply {
                accumulate,
                set_flags,
                rd,
                rn,
                rs,
                rm,
                ..
            } => {
                let mut res = cpu.reg(rm).wrapping_mul(cpu.reg(rs));
                if accumulate {
                    res = res.wrapping_add(cpu.reg(rn));
                }
                if set_flags {
                    cpu.set_flags(res, None, None);
                }
                return Ok(write_back(cpu, rd, res));
            }
            Instruction::DataTransfer {
                load,
                pre_index,
                up,
                rn,
                rd,
                offset,
                ..
            } => {
                let off = match offset {
                    Offset::Immediate(v) => v as u32,
                    Offset::Register(sr) => shifted_register(cpu, &sr).value,
                };
                let base = cpu.reg(rn);
                let moved = if up {
                    base.wrapping_add(off)
                } else {
                    base.wrapping_sub(off)
                };
                let addr = if pre_index { moved } else { base };
                let mut ctl = Control::Continue;
                if load {
                    let val = bus.read_u32(addr)?;
                    ctl = write_back(cpu, rd, val);
                } else {
                    bus.write_u32(addr, cpu.reg(rd))?;
                }
                if !pre_index && write_back(cpu, rn, moved) == Control::Branch {
                    ctl = Control::Branch;
                }
                return Ok(ctl);
            }
            Instruction::Branch { offset, .. } => {
                cpu.pc = cpu.pc.wrapping_sub(offset as u32);
                return Ok(Control::Branch);
            }
            Instruction::Halt => return Ok(Control::Halt),
        }
        Ok(Control::Continue)
    }
}
