use crate::bits::sign_extend;
use crate::registers::Register;
use crate::trap::TrapVector;

/// A decoded instruction. Variants don't map one-to-one onto the 4-bit
/// opcodes: `ADD`/`AND` split into register and immediate forms, and `JSR`
/// splits from `JSRR`, for handler ergonomics.
#[derive(Debug)]
pub enum Instruction {
    Br {
        n: bool,
        z: bool,
        p: bool,
        pc_offset: u16,
    },
    Add(Register, Register, Register),
    AddImm(Register, Register, u16),
    Ld(Register, u16),
    St(Register, u16),
    Jsr(u16),
    Jsrr(Register),
    And(Register, Register, Register),
    AndImm(Register, Register, u16),
    Ldr(Register, Register, u16),
    Str(Register, Register, u16),
    Not(Register, Register),
    Ldi(Register, u16),
    Sti(Register, u16),
    Jmp(Register),
    Lea(Register, u16),
    Trap(TrapVector),
    /// `RES` (0b1101) or `RTI` (0b1000): fatal, carries the raw opcode for
    /// the error message.
    Illegal(u16),
}

impl Instruction {
    /// Decodes a 16-bit instruction word. The opcode occupies bits [15:12].
    pub fn decode(instruction: u16) -> Self {
        let opcode = instruction >> 12;

        match opcode {
            0x0 => {
                let n = (instruction >> 11) & 0x1 == 1;
                let z = (instruction >> 10) & 0x1 == 1;
                let p = (instruction >> 9) & 0x1 == 1;
                let pc_offset = instruction & 0x1ff;

                Instruction::Br { n, z, p, pc_offset }
            }

            0x1 => {
                let dr = Register::from((instruction >> 9) & 0x7);
                let sr1 = Register::from((instruction >> 6) & 0x7);
                let immediate_flag = (instruction >> 5) & 0x1 == 1;

                if immediate_flag {
                    let imm5 = sign_extend(instruction & 0x1f, 5);
                    Instruction::AddImm(dr, sr1, imm5)
                } else {
                    let sr2 = Register::from(instruction & 0x7);
                    Instruction::Add(dr, sr1, sr2)
                }
            }

            0x2 => {
                let dr = Register::from((instruction >> 9) & 0x7);
                let pc_offset = instruction & 0x1ff;
                Instruction::Ld(dr, pc_offset)
            }

            0x3 => {
                let sr = Register::from((instruction >> 9) & 0x7);
                let pc_offset = instruction & 0x1ff;
                Instruction::St(sr, pc_offset)
            }

            0x4 => {
                let use_pc_offset = (instruction >> 11) & 0x1 == 1;

                if use_pc_offset {
                    Instruction::Jsr(instruction & 0x7ff)
                } else {
                    let base_r = Register::from((instruction >> 6) & 0x7);
                    Instruction::Jsrr(base_r)
                }
            }

            0x5 => {
                let dr = Register::from((instruction >> 9) & 0x7);
                let sr1 = Register::from((instruction >> 6) & 0x7);
                let immediate_flag = (instruction >> 5) & 0x1 == 1;

                if immediate_flag {
                    let imm5 = sign_extend(instruction & 0x1f, 5);
                    Instruction::AndImm(dr, sr1, imm5)
                } else {
                    let sr2 = Register::from(instruction & 0x7);
                    Instruction::And(dr, sr1, sr2)
                }
            }

            0x6 => {
                let dr = Register::from((instruction >> 9) & 0x7);
                let base_r = Register::from((instruction >> 6) & 0x7);
                let offset = instruction & 0x3f;
                Instruction::Ldr(dr, base_r, offset)
            }

            0x7 => {
                let sr = Register::from((instruction >> 9) & 0x7);
                let base_r = Register::from((instruction >> 6) & 0x7);
                let offset = instruction & 0x3f;
                Instruction::Str(sr, base_r, offset)
            }

            0x8 => Instruction::Illegal(opcode),

            0x9 => {
                let dr = Register::from((instruction >> 9) & 0x7);
                let sr = Register::from((instruction >> 6) & 0x7);
                Instruction::Not(dr, sr)
            }

            0xa => {
                let dr = Register::from((instruction >> 9) & 0x7);
                let pc_offset = instruction & 0x1ff;
                Instruction::Ldi(dr, pc_offset)
            }

            0xb => {
                let sr = Register::from((instruction >> 9) & 0x7);
                let pc_offset = instruction & 0x1ff;
                Instruction::Sti(sr, pc_offset)
            }

            0xc => {
                let base_r = Register::from((instruction >> 6) & 0x7);
                Instruction::Jmp(base_r)
            }

            0xd => Instruction::Illegal(opcode),

            0xe => {
                let dr = Register::from((instruction >> 9) & 0x7);
                let pc_offset = instruction & 0x1ff;
                Instruction::Lea(dr, pc_offset)
            }

            0xf => Instruction::Trap(TrapVector::decode(instruction)),

            _ => unreachable!("opcode is a 4-bit field: {:#x}", opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_add_register_form() {
        // ADD R1, R2, R3
        match Instruction::decode(0b0001_001_010_0_00_011) {
            Instruction::Add(Register::R1, Register::R2, Register::R3) => {}
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_add_immediate_form() {
        // ADD R1, R2, #-1
        match Instruction::decode(0b0001_001_010_1_11111) {
            Instruction::AddImm(Register::R1, Register::R2, imm) => assert_eq!(imm, 0xFFFF),
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_br_condition_bits() {
        match Instruction::decode(0b0000_111_000000101) {
            Instruction::Br { n, z, p, pc_offset } => {
                assert!(n && z && p);
                assert_eq!(pc_offset, 5);
            }
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_jsr_and_jsrr() {
        match Instruction::decode(0b0100_1_00000000010) {
            Instruction::Jsr(offset) => assert_eq!(offset, 2),
            other => panic!("unexpected decode: {:?}", other),
        }

        match Instruction::decode(0b0100_000_011_000000) {
            Instruction::Jsrr(Register::R3) => {}
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn decodes_reserved_and_rti_as_illegal() {
        assert!(matches!(
            Instruction::decode(0b1000 << 12),
            Instruction::Illegal(0x8)
        ));
        assert!(matches!(
            Instruction::decode(0b1101 << 12),
            Instruction::Illegal(0xd)
        ));
    }
}
