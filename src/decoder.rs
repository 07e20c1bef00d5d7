use serde::{Deserialize, Serialize};
use std::fmt;

/// Register index as it appears in a 4-bit register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
    R9,
    R10,
    R11,
    R12,
    Sp,
    Lr,
    Pc,
}

impl Register {
    const ALL: [Register; 16] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
        Register::R8,
        Register::R9,
        Register::R10,
        Register::R11,
        Register::R12,
        Register::Sp,
        Register::Lr,
        Register::Pc,
    ];

    /// Low four bits select the register; upper bits are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self::ALL[(bits & 0xF) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Assembler spelling: `r0`..`r15`, or `sp`/`lr`/`pc`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sp" => return Some(Register::Sp),
            "lr" => return Some(Register::Lr),
            "pc" => return Some(Register::Pc),
            _ => {}
        }
        let n = name.strip_prefix('r')?;
        // reject "r01", "r+1" and friends
        if !n.bytes().all(|b| b.is_ascii_digit()) || (n.len() > 1 && n.starts_with('0')) {
            return None;
        }
        let idx = n.parse::<usize>().ok()?;
        Self::ALL.get(idx).copied()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Sp => f.write_str("sp"),
            Register::Lr => f.write_str("lr"),
            Register::Pc => f.write_str("pc"),
            r => write!(f, "r{}", r.index()),
        }
    }
}

/// Condition field, bits 31..28.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Eq = 0x0,
    Ne = 0x1,
    Cs = 0x2,
    Cc = 0x3,
    Mi = 0x4,
    Pl = 0x5,
    Vs = 0x6,
    Vc = 0x7,
    Hi = 0x8,
    Ls = 0x9,
    Ge = 0xA,
    Lt = 0xB,
    Gt = 0xC,
    Le = 0xD,
    Al = 0xE,
    Nv = 0xF,
}

impl Condition {
    pub fn from_bits(bits: u32) -> Self {
        use Condition::*;
        match bits & 0xF {
            0x0 => Eq,
            0x1 => Ne,
            0x2 => Cs,
            0x3 => Cc,
            0x4 => Mi,
            0x5 => Pl,
            0x6 => Vs,
            0x7 => Vc,
            0x8 => Hi,
            0x9 => Ls,
            0xA => Ge,
            0xB => Lt,
            0xC => Gt,
            0xD => Le,
            0xE => Al,
            _ => Nv,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Mnemonic suffix; empty for `Al`.
    pub fn suffix(self) -> &'static str {
        use Condition::*;
        match self {
            Eq => "eq",
            Ne => "ne",
            Cs => "cs",
            Cc => "cc",
            Mi => "mi",
            Pl => "pl",
            Vs => "vs",
            Vc => "vc",
            Hi => "hi",
            Ls => "ls",
            Ge => "ge",
            Lt => "lt",
            Gt => "gt",
            Le => "le",
            Al => "",
            Nv => "nv",
        }
    }
}

/// ALU operations understood by the data-processing class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Orr = 0xC,
    Mov = 0xD,
}

impl Opcode {
    pub fn from_bits(bits: u32) -> Option<Self> {
        use Opcode::*;
        Some(match bits & 0xF {
            0x0 => And,
            0x1 => Eor,
            0x2 => Sub,
            0x3 => Rsb,
            0x4 => Add,
            0x8 => Tst,
            0x9 => Teq,
            0xA => Cmp,
            0xC => Orr,
            0xD => Mov,
            _ => return None,
        })
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Tst/Teq/Cmp compute flags only.
    pub fn writes_result(self) -> bool {
        !matches!(self, Opcode::Tst | Opcode::Teq | Opcode::Cmp)
    }

    pub fn name(self) -> &'static str {
        use Opcode::*;
        match self {
            And => "and",
            Eor => "eor",
            Sub => "sub",
            Rsb => "rsb",
            Add => "add",
            Tst => "tst",
            Teq => "teq",
            Cmp => "cmp",
            Orr => "orr",
            Mov => "mov",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    Lsl = 0,
    Lsr = 1,
    Asr = 2,
    Ror = 3,
}

impl ShiftKind {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => ShiftKind::Lsl,
            1 => ShiftKind::Lsr,
            2 => ShiftKind::Asr,
            _ => ShiftKind::Ror,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lsl" => Some(ShiftKind::Lsl),
            "lsr" => Some(ShiftKind::Lsr),
            "asr" => Some(ShiftKind::Asr),
            "ror" => Some(ShiftKind::Ror),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShiftKind::Lsl => "lsl",
            ShiftKind::Lsr => "lsr",
            ShiftKind::Asr => "asr",
            ShiftKind::Ror => "ror",
        }
    }
}

/// How the barrel shifter obtains its shift amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    /// 5-bit constant amount.
    Amount { kind: ShiftKind, amount: u8 },
    /// Amount is the bottom byte of `rs`.
    Register { kind: ShiftKind, rs: Register },
}

impl Shift {
    pub const NONE: Shift = Shift::Amount {
        kind: ShiftKind::Lsl,
        amount: 0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftedRegister {
    pub rm: Register,
    pub shift: Shift,
}

impl ShiftedRegister {
    pub fn plain(rm: Register) -> Self {
        Self {
            rm,
            shift: Shift::NONE,
        }
    }
}

/// Second ALU operand of a data-processing instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand2 {
    /// `imm` rotated right by `2 * rotate`.
    Immediate { imm: u8, rotate: u8 },
    Register(ShiftedRegister),
}

impl Operand2 {
    /// Finds a rotated 8-bit form of `value`, if one exists.
    pub fn immediate(value: u32) -> Option<Self> {
        (0..16u8).find_map(|rotate| {
            let imm = value.rotate_left(2 * rotate as u32);
            (imm <= 0xFF).then_some(Operand2::Immediate {
                imm: imm as u8,
                rotate,
            })
        })
    }
}

/// Offset of a single data transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Offset {
    /// 12-bit unsigned immediate.
    Immediate(u16),
    Register(ShiftedRegister),
}

/// One decoded word. Each class carries only the fields it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    DataProcessing {
        cond: Condition,
        opcode: Opcode,
        set_flags: bool,
        rn: Register,
        rd: Register,
        operand2: Operand2,
    },
    /// `rd = rm * rs (+ rn when accumulate)`.
    Multiply {
        cond: Condition,
        accumulate: bool,
        set_flags: bool,
        rd: Register,
        rn: Register,
        rs: Register,
        rm: Register,
    },
    DataTransfer {
        cond: Condition,
        load: bool,
        pre_index: bool,
        up: bool,
        rn: Register,
        rd: Register,
        offset: Offset,
    },
    /// Taken branches move the PC to `current - offset` (bytes).
    Branch { cond: Condition, offset: i32 },
    Halt,
}

impl Instruction {
    /// Halt carries no condition and always executes.
    pub fn condition(&self) -> Condition {
        match *self {
            Instruction::DataProcessing { cond, .. }
            | Instruction::Multiply { cond, .. }
            | Instruction::DataTransfer { cond, .. }
            | Instruction::Branch { cond, .. } => cond,
            Instruction::Halt => Condition::Al,
        }
    }
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Option<Instruction>;
}
