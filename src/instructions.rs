use crate::decoder::{Condition, Opcode, ShiftKind};

/// Assembler mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Add,
    Sub,
    Rsb,
    And,
    Eor,
    Orr,
    Mov,
    Tst,
    Teq,
    Cmp,
    Mul,
    Mla,
    Ldr,
    Str,
    Beq,
    Bne,
    Bge,
    Blt,
    Bgt,
    Ble,
    B,
    Lsl,
    Andeq,
}

/// Operand shape and the fixed value a mnemonic contributes to its word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// `op rd, rn, <operand2>`
    DataProc3(Opcode),
    /// `mov rd, <operand2>` / `cmp rn, <operand2>`
    DataProc2(Opcode),
    Multiply { accumulate: bool },
    Transfer { load: bool },
    Branch(Condition),
    /// `lsl rn, <#n|rm>`
    Shift(ShiftKind),
    Halt,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub mnemonic: Mnemonic,
    pub name: &'static str,
    pub form: Form,
    /// Operands required, not counting optional shift suffixes.
    pub operands: usize,
}

pub const TABLE: &[InstrDesc] = &[
    InstrDesc { mnemonic: Mnemonic::Add, name: "add", form: Form::DataProc3(Opcode::Add), operands: 3 },
    InstrDesc { mnemonic: Mnemonic::Sub, name: "sub", form: Form::DataProc3(Opcode::Sub), operands: 3 },
    InstrDesc { mnemonic: Mnemonic::Rsb, name: "rsb", form: Form::DataProc3(Opcode::Rsb), operands: 3 },
    InstrDesc { mnemonic: Mnemonic::And, name: "and", form: Form::DataProc3(Opcode::And), operands: 3 },
    InstrDesc { mnemonic: Mnemonic::Eor, name: "eor", form: Form::DataProc3(Opcode::Eor), operands: 3 },
    InstrDesc { mnemonic: Mnemonic::Orr, name: "orr", form: Form::DataProc3(Opcode::Orr), operands: 3 },
    InstrDesc { mnemonic: Mnemonic::Mov, name: "mov", form: Form::DataProc2(Opcode::Mov), operands: 2 },
    InstrDesc { mnemonic: Mnemonic::Tst, name: "tst", form: Form::DataProc2(Opcode::Tst), operands: 2 },
    InstrDesc { mnemonic: Mnemonic::Teq, name: "teq", form: Form::DataProc2(Opcode::Teq), operands: 2 },
    InstrDesc { mnemonic: Mnemonic::Cmp, name: "cmp", form: Form::DataProc2(Opcode::Cmp), operands: 2 },
    InstrDesc { mnemonic: Mnemonic::Mul, name: "mul", form: Form::Multiply { accumulate: false }, operands: 3 },
    InstrDesc { mnemonic: Mnemonic::Mla, name: "mla", form: Form::Multiply { accumulate: true }, operands: 4 },
    InstrDesc { mnemonic: Mnemonic::Ldr, name: "ldr", form: Form::Transfer { load: true }, operands: 2 },
    InstrDesc { mnemonic: Mnemonic::Str, name: "str", form: Form::Transfer { load: false }, operands: 2 },
    InstrDesc { mnemonic: Mnemonic::Beq, name: "beq", form: Form::Branch(Condition::Eq), operands: 1 },
    InstrDesc { mnemonic: Mnemonic::Bne, name: "bne", form: Form::Branch(Condition::Ne), operands: 1 },
    InstrDesc { mnemonic: Mnemonic::Bge, name: "bge", form: Form::Branch(Condition::Ge), operands: 1 },
    InstrDesc { mnemonic: Mnemonic::Blt, name: "blt", form: Form::Branch(Condition::Lt), operands: 1 },
    InstrDesc { mnemonic: Mnemonic::Bgt, name: "bgt", form: Form::Branch(Condition::Gt), operands: 1 },
    InstrDesc { mnemonic: Mnemonic::Ble, name: "ble", form: Form::Branch(Condition::Le), operands: 1 },
    InstrDesc { mnemonic: Mnemonic::B, name: "b", form: Form::Branch(Condition::Al), operands: 1 },
    InstrDesc { mnemonic: Mnemonic::Lsl, name: "lsl", form: Form::Shift(ShiftKind::Lsl), operands: 2 },
    InstrDesc { mnemonic: Mnemonic::Andeq, name: "andeq", form: Form::Halt, operands: 0 },
];

impl Mnemonic {
    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        TABLE.iter().find(|d| d.name == name).map(|d| d.mnemonic)
    }

    pub fn desc(self) -> &'static InstrDesc {
        // TABLE is declared in variant order
        &TABLE[self as usize]
    }
}
