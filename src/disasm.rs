use crate::decoder::{Instruction, Offset, Opcode, Operand2, Shift, ShiftedRegister};

pub fn fmt_decoded(d: &Instruction) -> String {
    match *d {
        Instruction::DataProcessing {
            cond,
            opcode,
            rn,
            rd,
            operand2,
            ..
        } => {
            let mn = format!("{}{}", opcode.name(), cond.suffix());
            let op2 = fmt_operand2(&operand2);
            match opcode {
                Opcode::Mov => format!("{mn} {rd}, {op2}"),
                Opcode::Tst | Opcode::Teq | Opcode::Cmp => format!("{mn} {rn}, {op2}"),
                _ => format!("{mn} {rd}, {rn}, {op2}"),
            }
        }
        Instruction::Multiply {
            cond,
            accumulate,
            rd,
            rn,
            rs,
            rm,
            ..
        } => {
            if accumulate {
                format!("mla{} {rd}, {rm}, {rs}, {rn}", cond.suffix())
            } else {
                format!("mul{} {rd}, {rm}, {rs}", cond.suffix())
            }
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
            let mn = format!("{}{}", if load { "ldr" } else { "str" }, cond.suffix());
            let sign = if up { "" } else { "-" };
            let off = match offset {
                Offset::Immediate(0) => None,
                Offset::Immediate(v) => Some(format!("#{sign}{v}")),
                Offset::Register(sr) => Some(format!("{sign}{}", fmt_shifted(&sr))),
            };
            match (pre_index, off) {
                (_, None) => format!("{mn} {rd}, [{rn}]"),
                (true, Some(o)) => format!("{mn} {rd}, [{rn}, {o}]"),
                (false, Some(o)) => format!("{mn} {rd}, [{rn}], {o}"),
            }
        }
        Instruction::Branch { cond, offset } => {
            // displacement is subtracted from the current address
            if offset >= 0 {
                format!("b{} pc-{:#x}", cond.suffix(), offset)
            } else {
                format!("b{} pc+{:#x}", cond.suffix(), offset.unsigned_abs())
            }
        }
        Instruction::Halt => "andeq r0, r0, r0".to_string(),
    }
}

fn fmt_operand2(op2: &Operand2) -> String {
    match op2 {
        Operand2::Immediate { imm, rotate } => {
            format!("#{}", (*imm as u32).rotate_right(2 * *rotate as u32))
        }
        Operand2::Register(sr) => fmt_shifted(sr),
    }
}

fn fmt_shifted(sr: &ShiftedRegister) -> String {
    match sr.shift {
        Shift::Amount { amount: 0, .. } => sr.rm.to_string(),
        Shift::Amount { kind, amount } => format!("{}, {} #{}", sr.rm, kind.name(), amount),
        Shift::Register { kind, rs } => format!("{}, {} {}", sr.rm, kind.name(), rs),
    }
}
