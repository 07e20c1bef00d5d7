use arm11_asm::{assemble, AsmError};
use pretty_assertions::assert_eq;

fn words(src: &str) -> Vec<u32> {
    assemble(src).unwrap().words
}

fn one(line: &str) -> u32 {
    let w = words(line);
    assert_eq!(w.len(), 1, "{line}");
    w[0]
}

#[test]
fn single_line_encodings() {
    assert_eq!(one("mov r1, #5"), 0xE3B0_1005);
    assert_eq!(one("add r0, r1, r2"), 0xE091_0002);
    assert_eq!(one("cmp r1, #0"), 0xE351_0000);
    assert_eq!(one("ldr r0, [r1, #4]"), 0xE591_0004);
    assert_eq!(one("str r0, [r1]"), 0xE581_0000);
    assert_eq!(one("mul r0, r1, r2"), 0xE010_0291);
    assert_eq!(one("mla r0, r1, r2, r3"), 0xE030_3291);
    assert_eq!(one("andeq r0, r0, r0"), 0);
}

#[test]
fn shifts_and_register_offsets() {
    assert_eq!(one("lsl r1, #2"), 0xE1B0_1101);
    assert_eq!(one("mov r1, r1, lsl #2"), 0xE1B0_1101);
    assert_eq!(one("mov r0, r1, lsr r2"), 0xE1B0_0231);
    assert_eq!(one("ldr r0, [r1, #-4]"), 0xE511_0004);
    assert_eq!(one("ldr r0, [pc, r2, lsl #2]"), 0xE79F_0102);
    assert_eq!(one("str r0, [r1, -r2]"), 0xE701_0002);
}

#[test]
fn large_immediates_use_the_rotation_field() {
    // 0xFF000000 is 0xFF rotated right by 8
    assert_eq!(one("mov r0, #4278190080"), 0xE3B0_04FF);
}

#[test]
fn branch_offsets_count_back_from_the_branch() {
    let src = "\
start: mov r0, #1
       b start
       beq end
       bne start
end:   andeq r0, r0, r0
";
    let prog = assemble(src).unwrap();
    assert_eq!(prog.labels.lookup("start").unwrap(), 0);
    assert_eq!(prog.labels.lookup("end").unwrap(), 16);
    assert_eq!(
        prog.words,
        vec![
            0xE3B0_0001,
            0xEA00_0001, // 4 - 0
            0x0AFF_FFFE, // 8 - 16
            0x1A00_0003, // 12 - 0
            0,
        ]
    );
}

#[test]
fn label_only_and_comment_lines_become_nops() {
    let src = "mov r0, #1\nskip:\n; nothing here\nandeq r0, r0, r0\n";
    let prog = assemble(src).unwrap();
    assert_eq!(prog.words, vec![0xE3B0_0001, 0xE1A0_0000, 0xE1A0_0000, 0]);
    assert_eq!(prog.labels.lookup("skip").unwrap(), 4);
}

#[test]
fn ldr_constant_small_becomes_mov() {
    assert_eq!(one("ldr r2, =200"), 0xE3A0_20C8);
    assert_eq!(one("ldr r2, =0x10"), 0xE3A0_2010);
}

#[test]
fn ldr_constant_large_goes_to_the_pool() {
    let src = "\
ldr r0, =0x20200000
ldr r1, =0x20200000
ldr r2, =0x2020001C
andeq r0, r0, r0
";
    let prog = assemble(src).unwrap();
    assert_eq!(
        prog.words,
        vec![
            0xE59F_0010, // pool at 16
            0xE59F_100C, // same slot
            0xE59F_200C, // second slot at 20
            0,
            0x2020_0000,
            0x2020_001C,
        ]
    );
}

#[test]
fn ldr_constant_of_a_label() {
    let src = "ldr r0, =data\nandeq r0, r0, r0\ndata: andeq r0, r0, r0\n";
    assert_eq!(words(src), vec![0xE3A0_0008, 0, 0]);
}

#[test]
fn assembly_is_deterministic() {
    let src = "loop: sub r0, r0, #1\nbne loop\nandeq r0, r0, r0\n";
    assert_eq!(assemble(src).unwrap(), assemble(src).unwrap());
}

#[test]
fn bytes_are_little_endian() {
    let prog = assemble("mov r1, #5").unwrap();
    assert_eq!(prog.to_bytes(), vec![0x05, 0x10, 0xB0, 0xE3]);
}

#[test]
fn unknown_mnemonic_register_and_label() {
    let err = assemble("mov r0, #1\nfoo r0, r1\n").unwrap_err();
    assert!(matches!(err, AsmError::Line { line: 2, .. }));
    assert!(matches!(err.kind(), AsmError::UnknownSymbol(s) if s == "foo"));

    let err = assemble("add r0, r1, r16").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnknownSymbol(s) if s == "r16"));

    let err = assemble("add r0, r+1, r2").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnknownSymbol(s) if s == "r+1"));

    let err = assemble("b nowhere").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnknownSymbol(s) if s == "nowhere"));

    let err = assemble("ldr r0, =nowhere").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnknownSymbol(s) if s == "nowhere"));
}

#[test]
fn malformed_and_unencodable_literals() {
    let err = assemble("mov r0, #abc").unwrap_err();
    assert!(matches!(err.kind(), AsmError::MalformedLiteral(s) if s == "abc"));

    let err = assemble("ldr r0, =0xZZ").unwrap_err();
    assert!(matches!(err.kind(), AsmError::MalformedLiteral(_)));

    let err = assemble("mov r0, #257").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnencodableImmediate(257)));

    let err = assemble("ldr r0, [r1, #4096]").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnencodableImmediate(4096)));

    let err = assemble("ldr r0, [r1, #-9223372036854775808]").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnencodableImmediate(i64::MIN)));

    let err = assemble("lsl r0, #32").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnencodableImmediate(32)));
}

#[test]
fn operand_count_is_checked() {
    let err = assemble("add r0, r1").unwrap_err();
    assert!(matches!(
        err.kind(),
        AsmError::MissingOperand { mnemonic, expected: 3 } if mnemonic == "add"
    ));

    let err = assemble("mov r0, #1, r2").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnexpectedOperand(s) if s == "r2"));

    let err = assemble("str r0, =5").unwrap_err();
    assert!(matches!(err.kind(), AsmError::UnexpectedOperand(s) if s == "=5"));
}

#[test]
fn error_messages_carry_the_line() {
    let err = assemble("mov r0, #1\n\nbogus\n").unwrap_err();
    assert_eq!(err.to_string(), "line 3: unknown symbol `bogus`");
}

#[test]
fn decoding_reproduces_the_source_fields() {
    use arm11_rs::decoder::{Condition, Decoder, Instruction, Opcode, Register};
    use arm11_rs::isa::arm::ArmDecoder;

    let src = "\
sub r3, r4, r5
mla r6, r7, r8, r9
str r10, [r11, #12]
target: ble target
andeq r0, r0, r0
";
    let dec = ArmDecoder::new();
    let decoded: Vec<_> = words(src).into_iter().map(|w| dec.decode(w).unwrap()).collect();

    assert!(matches!(
        decoded[0],
        Instruction::DataProcessing { cond: Condition::Al, opcode: Opcode::Sub, rd: Register::R3, rn: Register::R4, .. }
    ));
    assert!(matches!(
        decoded[1],
        Instruction::Multiply {
            accumulate: true,
            rd: Register::R6,
            rm: Register::R7,
            rs: Register::R8,
            rn: Register::R9,
            ..
        }
    ));
    assert!(matches!(
        decoded[2],
        Instruction::DataTransfer { load: false, rd: Register::R10, rn: Register::R11, .. }
    ));
    assert_eq!(decoded[3], Instruction::Branch { cond: Condition::Le, offset: 0 });
    assert_eq!(decoded[4], Instruction::Halt);
}
