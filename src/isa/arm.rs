use crate::decoder::{
    Condition, Decoder, Instruction, Offset, Opcode, Operand2, Register, Shift, ShiftKind,
    ShiftedRegister,
};

/// Word format shared by the assembler and the emulator.
///
/// ```text
/// DataProcessing  cond 00 I opcode S Rn Rd operand2
/// Multiply        cond 000000 A S Rd Rn Rs 1001 Rm
/// DataTransfer    cond 01 I P U 00 L Rn Rd offset
/// Branch          cond 1010 offset24
/// Halt            0x0000_0000
/// ```
pub struct ArmDecoder;

impl ArmDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

pub const HALT_WORD: u32 = 0;

const MUL_MARKER: u32 = 0b1001;
const BRANCH_MARKER: u32 = 0b1010;

#[inline]
fn field(raw: u32, lo: u32, len: u32) -> u32 {
    (raw >> lo) & ((1 << len) - 1)
}

#[inline]
fn bit(raw: u32, pos: u32) -> bool {
    (raw >> pos) & 1 != 0
}

#[inline]
fn reg(raw: u32, lo: u32) -> Register {
    Register::from_bits(raw >> lo)
}

fn sign_ext(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}

/// Bits 11..0 of a register operand (rm + shift).
fn decode_shifted(raw: u32) -> Option<ShiftedRegister> {
    let kind = ShiftKind::from_bits(field(raw, 5, 2));
    let shift = if bit(raw, 4) {
        // bit 7 set here is the multiply / extension space
        if bit(raw, 7) {
            return None;
        }
        Shift::Register {
            kind,
            rs: reg(raw, 8),
        }
    } else {
        Shift::Amount {
            kind,
            amount: field(raw, 7, 5) as u8,
        }
    };
    Some(ShiftedRegister {
        rm: reg(raw, 0),
        shift,
    })
}

fn encode_shifted(sr: &ShiftedRegister) -> u32 {
    let rm = sr.rm.index() as u32;
    match sr.shift {
        Shift::Amount { kind, amount } => {
            ((amount as u32 & 0x1F) << 7) | ((kind as u32) << 5) | rm
        }
        Shift::Register { kind, rs } => {
            ((rs.index() as u32) << 8) | ((kind as u32) << 5) | (1 << 4) | rm
        }
    }
}

impl Decoder for ArmDecoder {
    fn decode(&self, raw32: u32) -> Option<Instruction> {
        let cond = Condition::from_bits(raw32 >> 28);

        if field(raw32, 24, 4) == BRANCH_MARKER {
            let offset = sign_ext(field(raw32, 0, 24), 24) << 2;
            return Some(Instruction::Branch { cond, offset });
        }

        if field(raw32, 26, 2) == 0b01 {
            // byte transfers and writeback are outside the supported subset
            if bit(raw32, 22) || bit(raw32, 21) {
                return None;
            }
            let offset = if bit(raw32, 25) {
                Offset::Register(decode_shifted(raw32)?)
            } else {
                Offset::Immediate(field(raw32, 0, 12) as u16)
            };
            return Some(Instruction::DataTransfer {
                cond,
                load: bit(raw32, 20),
                pre_index: bit(raw32, 24),
                up: bit(raw32, 23),
                rn: reg(raw32, 16),
                rd: reg(raw32, 12),
                offset,
            });
        }

        if field(raw32, 22, 6) == 0 && field(raw32, 4, 4) == MUL_MARKER {
            return Some(Instruction::Multiply {
                cond,
                accumulate: bit(raw32, 21),
                set_flags: bit(raw32, 20),
                rd: reg(raw32, 16),
                rn: reg(raw32, 12),
                rs: reg(raw32, 8),
                rm: reg(raw32, 0),
            });
        }

        if field(raw32, 26, 2) == 0b00 && raw32 != HALT_WORD {
            let opcode = Opcode::from_bits(field(raw32, 21, 4))?;
            let operand2 = if bit(raw32, 25) {
                Operand2::Immediate {
                    imm: field(raw32, 0, 8) as u8,
                    rotate: field(raw32, 8, 4) as u8,
                }
            } else {
                Operand2::Register(decode_shifted(raw32)?)
            };
            return Some(Instruction::DataProcessing {
                cond,
                opcode,
                set_flags: bit(raw32, 20),
                rn: reg(raw32, 16),
                rd: reg(raw32, 12),
                operand2,
            });
        }

        if raw32 == HALT_WORD {
            return Some(Instruction::Halt);
        }

        None
    }
}

/// Packs an instruction into its 32-bit word. Inverse of [`ArmDecoder`].
pub fn encode(insn: &Instruction) -> u32 {
    match *insn {
        Instruction::DataProcessing {
            cond,
            opcode,
            set_flags,
            rn,
            rd,
            operand2,
        } => {
            let (i, op2) = match operand2 {
                Operand2::Immediate { imm, rotate } => {
                    (1, ((rotate as u32 & 0xF) << 8) | imm as u32)
                }
                Operand2::Register(sr) => (0, encode_shifted(&sr)),
            };
            (cond.bits() << 28)
                | (i << 25)
                | (opcode.bits() << 21)
                | ((set_flags as u32) << 20)
                | ((rn.index() as u32) << 16)
                | ((rd.index() as u32) << 12)
                | op2
        }
        Instruction::Multiply {
            cond,
            accumulate,
            set_flags,
            rd,
            rn,
            rs,
            rm,
        } => {
            (cond.bits() << 28)
                | ((accumulate as u32) << 21)
                | ((set_flags as u32) << 20)
                | ((rd.index() as u32) << 16)
                | ((rn.index() as u32) << 12)
                | ((rs.index() as u32) << 8)
                | (MUL_MARKER << 4)
                | rm.index() as u32
        }
        Instruction::DataTransfer {
            cond,
            load,
            pre_index,
            up,
            rn,
            rd,
            offset,
        } => {
            let (i, off) = match offset {
                Offset::Immediate(v) => (0, v as u32 & 0xFFF),
                Offset::Register(sr) => (1, encode_shifted(&sr)),
            };
            (cond.bits() << 28)
                | (0b01 << 26)
                | (i << 25)
                | ((pre_index as u32) << 24)
                | ((up as u32) << 23)
                | ((load as u32) << 20)
                | ((rn.index() as u32) << 16)
                | ((rd.index() as u32) << 12)
                | off
        }
        Instruction::Branch { cond, offset } => {
            let words = (offset >> 2) as u32 & 0x00FF_FFFF;
            (cond.bits() << 28) | (BRANCH_MARKER << 24) | words
        }
        Instruction::Halt => HALT_WORD,
    }
}

/// Largest byte displacement a branch can carry.
pub const BRANCH_RANGE: i32 = (1 << 23) * 4;
