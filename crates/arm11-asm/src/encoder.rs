//! Turns one tokenized source line into an [`Instruction`].

use arm11_rs::decoder::{
    Condition, Instruction, Offset, Opcode, Operand2, Register, Shift, ShiftKind, ShiftedRegister,
};
use arm11_rs::instructions::{Form, Mnemonic};
use arm11_rs::isa::arm::BRANCH_RANGE;

use crate::error::AsmError;
use crate::symbols::SymbolMap;
use crate::token::{Token, TokenKind};

/// `mov r0, r0`, emitted for lines that carry no mnemonic.
pub const NOP: Instruction = Instruction::DataProcessing {
    cond: Condition::Al,
    opcode: Opcode::Mov,
    set_flags: false,
    rn: Register::R0,
    rd: Register::R0,
    operand2: Operand2::Register(ShiftedRegister {
        rm: Register::R0,
        shift: Shift::NONE,
    }),
};

const MAX_TRANSFER_OFFSET: i64 = 0xFFF;

/// Constants placed after the last source line and loaded PC-relative.
#[derive(Debug, Clone, Default)]
pub struct LiteralPool {
    base: u32,
    words: Vec<u32>,
}

impl LiteralPool {
    pub fn new(base: u32) -> Self {
        Self {
            base,
            words: Vec::new(),
        }
    }

    /// Address of `value` in the pool, adding it if absent.
    pub fn intern(&mut self, value: u32) -> u32 {
        let idx = match self.words.iter().position(|&w| w == value) {
            Some(i) => i,
            None => {
                self.words.push(value);
                self.words.len() - 1
            }
        };
        self.base + 4 * idx as u32
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

pub struct Encoder<'a> {
    labels: &'a SymbolMap,
    pool: LiteralPool,
}

fn register(tok: &Token) -> Result<Register, AsmError> {
    Register::from_name(&tok.text).ok_or_else(|| AsmError::UnknownSymbol(tok.text.clone()))
}

/// Base-10, optionally signed.
fn literal(tok: &Token) -> Result<i64, AsmError> {
    if tok.kind != TokenKind::Literal {
        return Err(AsmError::MalformedLiteral(tok.text.clone()));
    }
    tok.text
        .parse::<i64>()
        .map_err(|_| AsmError::MalformedLiteral(tok.text.clone()))
}

/// Two's-complement word for a signed literal.
fn to_word(v: i64) -> Result<u32, AsmError> {
    if v < i32::MIN as i64 || v > u32::MAX as i64 {
        return Err(AsmError::UnencodableImmediate(v));
    }
    Ok(v as u32)
}

fn no_more(rest: &[Token]) -> Result<(), AsmError> {
    match rest.first() {
        Some(t) => Err(AsmError::UnexpectedOperand(t.text.clone())),
        None => Ok(()),
    }
}

/// `rm` optionally followed by `<shift> #n` or `<shift> rs`.
fn shifted_register(toks: &[Token]) -> Result<ShiftedRegister, AsmError> {
    let rm = register(&toks[0])?;
    let Some(kind_tok) = toks.get(1) else {
        return Ok(ShiftedRegister::plain(rm));
    };
    let kind = ShiftKind::from_name(&kind_tok.text)
        .ok_or_else(|| AsmError::UnknownSymbol(kind_tok.text.clone()))?;
    let amount_tok = toks.get(2).ok_or_else(|| AsmError::MissingOperand {
        mnemonic: kind.name().to_string(),
        expected: 1,
    })?;
    no_more(&toks[3..])?;
    Ok(ShiftedRegister {
        rm,
        shift: shift_amount(kind, amount_tok)?,
    })
}

fn shift_amount(kind: ShiftKind, tok: &Token) -> Result<Shift, AsmError> {
    if tok.kind == TokenKind::Literal {
        let n = literal(tok)?;
        if !(0..=31).contains(&n) {
            return Err(AsmError::UnencodableImmediate(n));
        }
        Ok(Shift::Amount {
            kind,
            amount: n as u8,
        })
    } else {
        Ok(Shift::Register {
            kind,
            rs: register(tok)?,
        })
    }
}

fn operand2(toks: &[Token]) -> Result<Operand2, AsmError> {
    if toks[0].kind == TokenKind::Literal {
        let v = literal(&toks[0])?;
        no_more(&toks[1..])?;
        return Operand2::immediate(to_word(v)?).ok_or(AsmError::UnencodableImmediate(v));
    }
    Ok(Operand2::Register(shifted_register(toks)?))
}

impl<'a> Encoder<'a> {
    pub fn new(labels: &'a SymbolMap, pool_base: u32) -> Self {
        Self {
            labels,
            pool: LiteralPool::new(pool_base),
        }
    }

    pub fn into_pool(self) -> LiteralPool {
        self.pool
    }

    /// Value of an `=expr` operand: decimal, `0x` hex, or a label.
    pub fn expression(&self, text: &str) -> Result<u32, AsmError> {
        let malformed = || AsmError::MalformedLiteral(text.to_string());
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return u32::from_str_radix(hex, 16).map_err(|_| malformed());
        }
        if text.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+') {
            let v = text.parse::<i64>().map_err(|_| malformed())?;
            return to_word(v);
        }
        self.labels.lookup(text)
    }

    /// Encodes the tokens of one line (labels removed) sitting at `addr`.
    pub fn encode_line(&mut self, addr: u32, toks: &[Token]) -> Result<Instruction, AsmError> {
        let Some(mn) = toks.first() else {
            return Ok(NOP);
        };
        let desc = Mnemonic::from_name(&mn.text)
            .ok_or_else(|| AsmError::UnknownSymbol(mn.text.clone()))?
            .desc();
        let ops = &toks[1..];
        if ops.len() < desc.operands {
            return Err(AsmError::MissingOperand {
                mnemonic: desc.name.to_string(),
                expected: desc.operands,
            });
        }

        let insn = match desc.form {
            Form::DataProc3(opcode) => Instruction::DataProcessing {
                cond: Condition::Al,
                opcode,
                set_flags: true,
                rd: register(&ops[0])?,
                rn: register(&ops[1])?,
                operand2: operand2(&ops[2..])?,
            },
            Form::DataProc2(opcode) => {
                let r = register(&ops[0])?;
                let (rd, rn) = if opcode == Opcode::Mov {
                    (r, Register::R0)
                } else {
                    (Register::R0, r)
                };
                Instruction::DataProcessing {
                    cond: Condition::Al,
                    opcode,
                    set_flags: true,
                    rn,
                    rd,
                    operand2: operand2(&ops[1..])?,
                }
            }
            Form::Multiply { accumulate } => {
                no_more(&ops[desc.operands..])?;
                Instruction::Multiply {
                    cond: Condition::Al,
                    accumulate,
                    set_flags: true,
                    rd: register(&ops[0])?,
                    rm: register(&ops[1])?,
                    rs: register(&ops[2])?,
                    rn: if accumulate {
                        register(&ops[3])?
                    } else {
                        Register::R0
                    },
                }
            }
            Form::Transfer { load } => self.transfer(addr, load, ops)?,
            Form::Branch(cond) => {
                no_more(&ops[1..])?;
                let target = self.labels.lookup(&ops[0].text)?;
                let offset = addr as i64 - target as i64;
                if offset.abs() >= BRANCH_RANGE as i64 {
                    return Err(AsmError::UnencodableImmediate(offset));
                }
                Instruction::Branch {
                    cond,
                    offset: offset as i32,
                }
            }
            Form::Shift(kind) => {
                no_more(&ops[2..])?;
                let rn = register(&ops[0])?;
                Instruction::DataProcessing {
                    cond: Condition::Al,
                    opcode: Opcode::Mov,
                    set_flags: true,
                    rn: Register::R0,
                    rd: rn,
                    operand2: Operand2::Register(ShiftedRegister {
                        rm: rn,
                        shift: shift_amount(kind, &ops[1])?,
                    }),
                }
            }
            Form::Halt => Instruction::Halt,
        };
        Ok(insn)
    }

    fn transfer(&mut self, addr: u32, load: bool, ops: &[Token]) -> Result<Instruction, AsmError> {
        let rd = register(&ops[0])?;
        let addr_tok = &ops[1];

        if addr_tok.kind == TokenKind::Expression {
            if !load {
                return Err(AsmError::UnexpectedOperand(format!("={}", addr_tok.text)));
            }
            no_more(&ops[2..])?;
            let value = self.expression(&addr_tok.text)?;
            if value <= 0xFF {
                return Ok(Instruction::DataProcessing {
                    cond: Condition::Al,
                    opcode: Opcode::Mov,
                    set_flags: false,
                    rn: Register::R0,
                    rd,
                    operand2: Operand2::Immediate {
                        imm: value as u8,
                        rotate: 0,
                    },
                });
            }
            let slot = self.pool.intern(value);
            let distance = slot as i64 - addr as i64;
            if distance > MAX_TRANSFER_OFFSET {
                return Err(AsmError::UnencodableImmediate(distance));
            }
            return Ok(Instruction::DataTransfer {
                cond: Condition::Al,
                load: true,
                pre_index: true,
                up: true,
                rn: Register::Pc,
                rd,
                offset: Offset::Immediate(distance as u16),
            });
        }

        let rn = register(addr_tok)?;
        let (up, offset) = match ops.get(2) {
            None => (true, Offset::Immediate(0)),
            Some(t) if t.kind == TokenKind::Literal => {
                no_more(&ops[3..])?;
                let n = literal(t)?;
                if n.unsigned_abs() > MAX_TRANSFER_OFFSET as u64 {
                    return Err(AsmError::UnencodableImmediate(n));
                }
                (n >= 0, Offset::Immediate(n.unsigned_abs() as u16))
            }
            Some(t) => {
                // `-rm` subtracts the register offset
                let (up, name) = match t.text.strip_prefix('-') {
                    Some(name) => (false, name),
                    None => (true, t.text.strip_prefix('+').unwrap_or(&t.text)),
                };
                let mut rest = ops[2..].to_vec();
                rest[0] = Token::new(TokenKind::Other, name);
                (up, Offset::Register(shifted_register(&rest)?))
            }
        };
        Ok(Instruction::DataTransfer {
            cond: Condition::Al,
            load,
            pre_index: true,
            up,
            rn,
            rd,
            offset,
        })
    }
}
