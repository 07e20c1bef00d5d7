//! Barrel shifter and ALU.
//!
//! Both report carry (and the adder overflow) as `Option<bool>`: `None`
//! means the flag is left as it was.

use crate::decoder::{Opcode, ShiftKind};

/// Shifter output: value plus carry-out, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shifted {
    pub value: u32,
    pub carry: Option<bool>,
}

/// Shifts `value` by `amount`. An amount of zero is the identity with no carry.
pub fn shift(kind: ShiftKind, value: u32, amount: u32) -> Shifted {
    if amount == 0 {
        return Shifted { value, carry: None };
    }
    let bit = |n: u32| (value >> n) & 1 != 0;
    let (value, carry) = match kind {
        ShiftKind::Lsl => match amount {
            1..=31 => (value << amount, bit(32 - amount)),
            32 => (0, bit(0)),
            _ => (0, false),
        },
        ShiftKind::Lsr => match amount {
            1..=31 => (value >> amount, bit(amount - 1)),
            32 => (0, bit(31)),
            _ => (0, false),
        },
        ShiftKind::Asr => match amount {
            1..=31 => (((value as i32) >> amount) as u32, bit(amount - 1)),
            _ => (((value as i32) >> 31) as u32, bit(31)),
        },
        ShiftKind::Ror => {
            let r = amount % 32;
            let v = value.rotate_right(r);
            (v, v >> 31 != 0)
        }
    };
    Shifted {
        value,
        carry: Some(carry),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOut {
    pub value: u32,
    pub carry: Option<bool>,
    pub overflow: Option<bool>,
}

/// `a - b` with C meaning "no borrow".
fn sub(a: u32, b: u32) -> AluOut {
    let value = a.wrapping_sub(b);
    AluOut {
        value,
        carry: Some(a >= b),
        overflow: Some(((a ^ b) & (a ^ value)) >> 31 != 0),
    }
}

fn add(a: u32, b: u32) -> AluOut {
    let (value, carry) = a.overflowing_add(b);
    AluOut {
        value,
        carry: Some(carry),
        overflow: Some(((a ^ value) & (b ^ value)) >> 31 != 0),
    }
}

/// Applies `op` to `rn` and the shifted operand. Logical forms pass the
/// shifter carry through.
pub fn compute(op: Opcode, rn: u32, op2: Shifted) -> AluOut {
    let b = op2.value;
    let logical = |value: u32| AluOut {
        value,
        carry: op2.carry,
        overflow: None,
    };
    match op {
        Opcode::And | Opcode::Tst => logical(rn & b),
        Opcode::Eor | Opcode::Teq => logical(rn ^ b),
        Opcode::Orr => logical(rn | b),
        Opcode::Mov => logical(b),
        Opcode::Add => add(rn, b),
        Opcode::Sub | Opcode::Cmp => sub(rn, b),
        Opcode::Rsb => sub(b, rn),
    }
}
