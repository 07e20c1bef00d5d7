use arm11_rs::decoder::{
    Condition, Instruction, Opcode, Operand2, Register, Shift, ShiftKind, ShiftedRegister,
};
use arm11_rs::exec::IntExecutor;
use arm11_rs::isa::arm::{encode, ArmDecoder};
use arm11_rs::{Control, Cpsr, Cpu, CpuConfig, LinearMemory};
use arm11_rs::Bus;

fn dp(opcode: Opcode, rd: Register, rn: Register, operand2: Operand2) -> u32 {
    encode(&Instruction::DataProcessing {
        cond: Condition::Al,
        opcode,
        set_flags: true,
        rn,
        rd,
        operand2,
    })
}

fn imm(v: u32) -> Operand2 {
    Operand2::immediate(v).unwrap()
}

fn reg_shift(rm: Register, kind: ShiftKind, amount: u8) -> Operand2 {
    Operand2::Register(ShiftedRegister {
        rm,
        shift: Shift::Amount { kind, amount },
    })
}

/// Runs one word at address 0 and returns the control signal.
fn run_one(cpu: &mut Cpu, word: u32) -> Control {
    let mut mem = LinearMemory::new(16);
    mem.write_u32(0, word).unwrap();
    cpu.pc = 0;
    cpu.step(&mut mem, &ArmDecoder::new(), &IntExecutor).unwrap()
}

fn fresh() -> Cpu {
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0);
    cpu
}

#[test]
fn add_zero_sets_zero_flag() {
    let mut cpu = fresh();
    run_one(&mut cpu, dp(Opcode::Add, Register::R0, Register::R0, imm(0)));
    assert_eq!(cpu.gpr[0], 0);
    assert!(cpu.cpsr.contains(Cpsr::Z));
    assert!(!cpu.cpsr.contains(Cpsr::N));
}

#[test]
fn sub_underflow_sets_negative_and_clears_carry() {
    let mut cpu = fresh();
    cpu.cpsr.insert(Cpsr::C);
    run_one(&mut cpu, dp(Opcode::Sub, Register::R0, Register::R0, imm(1)));
    assert_eq!(cpu.gpr[0], 0xFFFF_FFFF);
    assert!(cpu.cpsr.contains(Cpsr::N));
    assert!(!cpu.cpsr.contains(Cpsr::C));
    assert!(!cpu.cpsr.contains(Cpsr::Z));
}

#[test]
fn rsb_reverses_operands() {
    let mut cpu = fresh();
    cpu.gpr[1] = 3;
    run_one(&mut cpu, dp(Opcode::Rsb, Register::R2, Register::R1, imm(10)));
    assert_eq!(cpu.gpr[2], 7);
    assert!(cpu.cpsr.contains(Cpsr::C));
}

#[test]
fn compare_and_test_forms_only_touch_flags() {
    let mut cpu = fresh();
    cpu.gpr[0] = 0x55;
    cpu.gpr[1] = 0xAA;

    run_one(&mut cpu, dp(Opcode::Cmp, Register::R0, Register::R1, imm(0xAA)));
    assert_eq!(cpu.gpr[0], 0x55);
    assert!(cpu.cpsr.contains(Cpsr::Z | Cpsr::C));

    run_one(
        &mut cpu,
        dp(Opcode::Tst, Register::R0, Register::R1, Operand2::Register(ShiftedRegister::plain(Register::R0))),
    );
    assert_eq!(cpu.gpr[0], 0x55);
    assert!(cpu.cpsr.contains(Cpsr::Z)); // 0xAA & 0x55

    run_one(&mut cpu, dp(Opcode::Teq, Register::R0, Register::R1, imm(0xAA)));
    assert!(cpu.cpsr.contains(Cpsr::Z));
}

#[test]
fn logical_ops_with_register_operands() {
    let mut cpu = fresh();
    cpu.gpr[1] = 0xF0F0;
    cpu.gpr[2] = 0x0FF0;
    let r2 = Operand2::Register(ShiftedRegister::plain(Register::R2));

    run_one(&mut cpu, dp(Opcode::And, Register::R3, Register::R1, r2));
    assert_eq!(cpu.gpr[3], 0x00F0);
    run_one(&mut cpu, dp(Opcode::Orr, Register::R4, Register::R1, r2));
    assert_eq!(cpu.gpr[4], 0xFFF0);
    run_one(&mut cpu, dp(Opcode::Eor, Register::R5, Register::R1, r2));
    assert_eq!(cpu.gpr[5], 0xFF00);
}

#[test]
fn rotated_immediate() {
    let mut cpu = fresh();
    // 0xFF rotated right by 8
    let op2 = Operand2::Immediate { imm: 0xFF, rotate: 4 };
    run_one(&mut cpu, dp(Opcode::Mov, Register::R0, Register::R0, op2));
    assert_eq!(cpu.gpr[0], 0xFF00_0000);
    assert!(cpu.cpsr.contains(Cpsr::N));
}

#[test]
fn shifter_carry_reaches_flags() {
    let mut cpu = fresh();
    cpu.gpr[1] = 0x8000_0000;
    run_one(&mut cpu, dp(Opcode::Mov, Register::R0, Register::R0, reg_shift(Register::R1, ShiftKind::Lsl, 1)));
    assert_eq!(cpu.gpr[0], 0);
    assert!(cpu.cpsr.contains(Cpsr::Z | Cpsr::C));
}

#[test]
fn register_specified_shift() {
    let mut cpu = fresh();
    cpu.gpr[1] = 0x100;
    cpu.gpr[3] = 0x104; // only the bottom byte counts: 4
    let op2 = Operand2::Register(ShiftedRegister {
        rm: Register::R1,
        shift: Shift::Register { kind: ShiftKind::Lsr, rs: Register::R3 },
    });
    run_one(&mut cpu, dp(Opcode::Mov, Register::R2, Register::R0, op2));
    assert_eq!(cpu.gpr[2], 0x10);
}

#[test]
fn arithmetic_shift_keeps_sign() {
    let mut cpu = fresh();
    cpu.gpr[1] = 0xFFFF_FF00;
    run_one(&mut cpu, dp(Opcode::Mov, Register::R0, Register::R0, reg_shift(Register::R1, ShiftKind::Asr, 4)));
    assert_eq!(cpu.gpr[0], 0xFFFF_FFF0);
}

#[test]
fn flags_untouched_without_s_bit() {
    let mut cpu = fresh();
    cpu.cpsr = Cpsr::Z | Cpsr::V;
    let word = encode(&Instruction::DataProcessing {
        cond: Condition::Al,
        opcode: Opcode::Sub,
        set_flags: false,
        rn: Register::R0,
        rd: Register::R0,
        operand2: imm(1),
    });
    run_one(&mut cpu, word);
    assert_eq!(cpu.gpr[0], 0xFFFF_FFFF);
    assert_eq!(cpu.cpsr, Cpsr::Z | Cpsr::V);
}

#[test]
fn add_overflow_sets_v() {
    let mut cpu = fresh();
    cpu.gpr[1] = 0x7FFF_FFFF;
    run_one(&mut cpu, dp(Opcode::Add, Register::R0, Register::R1, imm(1)));
    assert_eq!(cpu.gpr[0], 0x8000_0000);
    assert!(cpu.cpsr.contains(Cpsr::N | Cpsr::V));
    assert!(!cpu.cpsr.contains(Cpsr::C));
}

#[test]
fn writing_pc_is_a_branch() {
    let mut cpu = fresh();
    cpu.gpr[1] = 0x40;
    let ctl = run_one(
        &mut cpu,
        dp(Opcode::Mov, Register::Pc, Register::R0, Operand2::Register(ShiftedRegister::plain(Register::R1))),
    );
    assert_eq!(ctl, Control::Branch);
    assert_eq!(cpu.pc, 0x40);
}
