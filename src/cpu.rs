use crate::bits::sign_extend;
use crate::condition::Condition;
use crate::console::ConsoleIo;
use crate::error::Error;
use crate::instruction::Instruction;
use crate::memory::Memory;
use crate::registers::{Register, Registers};
use crate::trap;
use std::io::Write;

/// The whole guest-visible machine state: memory, registers, program
/// counter, and the condition flags. Owned by the caller (`main`, or a
/// test) and threaded through the fetch–decode–execute loop by exclusive
/// reference.
pub struct Machine {
    pub memory: Memory,
    pub registers: Registers,
    pub pc: u16,
    pub condition: Condition,
    pub running: bool,
}

/// Every LC-3 program's entry point, per convention.
pub const DEFAULT_PC: u16 = 0x3000;

impl Machine {
    pub fn new() -> Machine {
        Machine {
            memory: Memory::new(),
            registers: Registers::new(),
            pc: DEFAULT_PC,
            condition: Condition::Zero,
            running: true,
        }
    }

    /// Derives `COND` from the contents of `r`. Called from every
    /// instruction that writes a general-purpose register; never from
    /// stores, branches, jumps, or `TRAP HALT`.
    pub fn update_flags(&mut self, r: Register) {
        self.condition = Condition::from_word(self.registers.read(r));
    }

    /// Fetches the instruction at `PC`, advances `PC` (wrapping), decodes,
    /// and executes it. Returns an error if the decoded instruction is
    /// `RES`/`RTI`.
    pub fn step(&mut self, io: &mut dyn ConsoleIo, out: &mut dyn Write) -> Result<(), Error> {
        let fetch_pc = self.pc;
        let raw = self.memory.read(self.pc, io);
        self.pc = self.pc.wrapping_add(1);
        let instruction = Instruction::decode(raw);

        if let Instruction::Illegal(opcode) = instruction {
            return Err(Error::IllegalInstruction {
                opcode,
                pc: fetch_pc,
            });
        }

        self.execute(instruction, io, out);
        Ok(())
    }

    /// Runs the fetch–decode–execute loop until `TRAP HALT` clears
    /// `running` or an illegal instruction is encountered.
    pub fn run(&mut self, io: &mut dyn ConsoleIo, out: &mut dyn Write) -> Result<(), Error> {
        while self.running {
            self.step(io, out)?;
        }
        Ok(())
    }

    fn execute(&mut self, instruction: Instruction, io: &mut dyn ConsoleIo, out: &mut dyn Write) {
        match instruction {
            Instruction::Br { n, z, p, pc_offset } => {
                let taken = (n && self.condition == Condition::Negative)
                    || (z && self.condition == Condition::Zero)
                    || (p && self.condition == Condition::Positive);
                if taken {
                    self.pc = self.pc.wrapping_add(sign_extend(pc_offset, 9));
                }
            }

            Instruction::Add(dr, sr1, sr2) => {
                let value = self
                    .registers
                    .read(sr1)
                    .wrapping_add(self.registers.read(sr2));
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::AddImm(dr, sr1, imm5) => {
                let value = self.registers.read(sr1).wrapping_add(imm5);
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::Ld(dr, pc_offset) => {
                let address = self.pc.wrapping_add(sign_extend(pc_offset, 9));
                let value = self.memory.read(address, io);
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::St(sr, pc_offset) => {
                let address = self.pc.wrapping_add(sign_extend(pc_offset, 9));
                self.memory.write(address, self.registers.read(sr));
            }

            Instruction::Jsr(pc_offset) => {
                let return_addr = self.pc;
                self.pc = self.pc.wrapping_add(sign_extend(pc_offset, 11));
                self.registers.write(Register::R7, return_addr);
            }

            Instruction::Jsrr(base_r) => {
                let return_addr = self.pc;
                self.pc = self.registers.read(base_r);
                self.registers.write(Register::R7, return_addr);
            }

            Instruction::And(dr, sr1, sr2) => {
                let value = self.registers.read(sr1) & self.registers.read(sr2);
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::AndImm(dr, sr1, imm5) => {
                let value = self.registers.read(sr1) & imm5;
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::Ldr(dr, base_r, offset) => {
                let address = self
                    .registers
                    .read(base_r)
                    .wrapping_add(sign_extend(offset, 6));
                let value = self.memory.read(address, io);
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::Str(sr, base_r, offset) => {
                let address = self
                    .registers
                    .read(base_r)
                    .wrapping_add(sign_extend(offset, 6));
                self.memory.write(address, self.registers.read(sr));
            }

            Instruction::Not(dr, sr) => {
                let value = !self.registers.read(sr);
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::Ldi(dr, pc_offset) => {
                let pointer = self.pc.wrapping_add(sign_extend(pc_offset, 9));
                let address = self.memory.read(pointer, io);
                let value = self.memory.read(address, io);
                self.registers.write(dr, value);
                self.update_flags(dr);
            }

            Instruction::Sti(sr, pc_offset) => {
                let pointer = self.pc.wrapping_add(sign_extend(pc_offset, 9));
                let address = self.memory.read(pointer, io);
                self.memory.write(address, self.registers.read(sr));
            }

            Instruction::Jmp(base_r) => {
                self.pc = self.registers.read(base_r);
            }

            Instruction::Lea(dr, pc_offset) => {
                let address = self.pc.wrapping_add(sign_extend(pc_offset, 9));
                self.registers.write(dr, address);
                self.update_flags(dr);
            }

            Instruction::Trap(trap_vector) => {
                self.registers.write(Register::R7, self.pc);
                trap::execute(trap_vector, self, io, out);
            }

            Instruction::Illegal(_) => unreachable!("filtered out by step() before execute()"),
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
