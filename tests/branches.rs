use arm11_rs::decoder::{Condition, Decoder, Instruction};
use arm11_rs::exec::IntExecutor;
use arm11_rs::isa::arm::{encode, ArmDecoder};
use arm11_rs::{Control, Cpsr, Cpu, CpuConfig, LinearMemory};
use arm11_rs::Bus;

// B<cond> with a byte displacement subtracted from the branch address
fn enc_b(cond: u32, disp_bytes: i32) -> u32 {
    (cond << 28) | (0b1010 << 24) | (((disp_bytes >> 2) as u32) & 0x00FF_FFFF)
}

fn enc_mov_imm(rd: u32, imm8: u32) -> u32 {
    0xE3A0_0000 | (rd << 12) | (imm8 & 0xFF)
}

fn enc_subs_imm(rd: u32, rn: u32, imm8: u32) -> u32 {
    0xE250_0000 | (rn << 16) | (rd << 12) | (imm8 & 0xFF)
}

#[test]
fn backward_branch_returns_to_label() {
    let mut mem = LinearMemory::new(64);
    let mut cpu = Cpu::new(CpuConfig::default());

    // label at 0x08, branch at 0x14
    let word = enc_b(0xE, 0x14 - 0x08);
    assert_eq!(
        ArmDecoder::new().decode(word),
        Some(Instruction::Branch {
            cond: Condition::Al,
            offset: 0x0C
        })
    );
    mem.write_u32(0x14, word).unwrap();
    cpu.reset(0x14);

    let ctl = cpu.step(&mut mem, &ArmDecoder::new(), &IntExecutor).unwrap();
    assert_eq!(ctl, Control::Branch);
    assert_eq!(cpu.pc, 0x08);
}

#[test]
fn forward_branch_skips_next_word() {
    let mut mem = LinearMemory::new(64);
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0);

    // 0x00: B 0x08          (displacement 0 - 8 = -8)
    // 0x04: MOV R0, #1      [skipped]
    // 0x08: MOV R0, #2
    // 0x0C: halt
    mem.write_u32(0, enc_b(0xE, -8)).unwrap();
    mem.write_u32(4, enc_mov_imm(0, 1)).unwrap();
    mem.write_u32(8, enc_mov_imm(0, 2)).unwrap();

    cpu.run(&mut mem, &ArmDecoder::new(), &IntExecutor).unwrap();
    assert_eq!(cpu.gpr[0], 2);
    assert_eq!(cpu.pc, 0x0C);
}

#[test]
fn untaken_branch_falls_through() {
    let mut mem = LinearMemory::new(64);
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0x10);
    cpu.cpsr = Cpsr::empty();

    mem.write_u32(0x10, enc_b(Condition::Eq.bits(), 0x10)).unwrap();
    let ctl = cpu.step(&mut mem, &ArmDecoder::new(), &IntExecutor).unwrap();
    assert_eq!(ctl, Control::Continue);
    assert_eq!(cpu.pc, 0x14);
}

#[test]
fn countdown_loop_with_bne() {
    let mut mem = LinearMemory::new(64);
    let mut cpu = Cpu::new(CpuConfig::default());
    cpu.reset(0);

    // 0x00: MOV  R0, #3
    // 0x04: SUBS R0, R0, #1
    // 0x08: BNE  0x04
    // 0x0C: halt
    mem.write_u32(0, enc_mov_imm(0, 3)).unwrap();
    mem.write_u32(4, enc_subs_imm(0, 0, 1)).unwrap();
    mem.write_u32(8, enc_b(Condition::Ne.bits(), 8 - 4)).unwrap();

    let steps = cpu.run(&mut mem, &ArmDecoder::new(), &IntExecutor).unwrap();
    assert_eq!(cpu.gpr[0], 0);
    assert!(cpu.cpsr.contains(Cpsr::Z));
    assert_eq!(steps, 1 + 3 * 2 + 1);
}

#[test]
fn encoder_and_test_helper_agree() {
    for (cond, disp) in [(Condition::Al, 0x0C), (Condition::Lt, -0x40), (Condition::Le, 4)] {
        let ours = encode(&Instruction::Branch { cond, offset: disp });
        assert_eq!(ours, enc_b(cond.bits(), disp));
    }
}
