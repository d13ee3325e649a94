use crate::console::{write_flushed, ConsoleIo};
use crate::cpu::Machine;
use crate::registers::Register;
use std::io::Write;

/// One of the six trap vectors a `TRAP` instruction can select.
#[derive(Debug)]
pub enum TrapVector {
    Getc,
    Out,
    Puts,
    In,
    Putsp,
    Halt,
}

impl TrapVector {
    /// Decodes the low 8 bits of a `TRAP` instruction.
    pub fn decode(instruction: u16) -> TrapVector {
        match instruction & 0xFF {
            0x20 => TrapVector::Getc,
            0x21 => TrapVector::Out,
            0x22 => TrapVector::Puts,
            0x23 => TrapVector::In,
            0x24 => TrapVector::Putsp,
            0x25 => TrapVector::Halt,
            other => unreachable!("bad trap vector: {:#04x}", other),
        }
    }
}

/// Executes one trap service routine. `R7` has already been set to the
/// return address by the caller before this runs.
pub fn execute(trap: TrapVector, machine: &mut Machine, io: &mut dyn ConsoleIo, out: &mut dyn Write) {
    match trap {
        // Read a single character from the keyboard, not echoed, into R0.
        TrapVector::Getc => {
            let value = u16::from(io.read_char());
            machine.registers.write(Register::R0, value);
            machine.update_flags(Register::R0);
        }

        // Write the low 8 bits of R0 to the console.
        TrapVector::Out => {
            let byte = machine.registers.read(Register::R0) as u8;
            write_flushed(out, &(byte as char).to_string());
        }

        // Write the null-terminated string starting at the address in R0,
        // one character per memory cell.
        TrapVector::Puts => {
            let mut addr = machine.registers.read(Register::R0);
            let mut text = String::new();
            loop {
                let word = machine.memory.read(addr, io);
                if word == 0 {
                    break;
                }
                text.push((word as u8) as char);
                addr = addr.wrapping_add(1);
            }
            write_flushed(out, &text);
        }

        // Print a prompt, read one character, echo it, and store it in R0.
        TrapVector::In => {
            write_flushed(out, "Enter a character: ");
            let byte = io.read_char();
            write_flushed(out, &(byte as char).to_string());
            machine.registers.write(Register::R0, u16::from(byte));
            machine.update_flags(Register::R0);
        }

        // Write the null-terminated string starting at the address in R0,
        // two characters packed per memory cell (low byte first).
        TrapVector::Putsp => {
            let mut addr = machine.registers.read(Register::R0);
            let mut text = String::new();
            loop {
                let word = machine.memory.read(addr, io);
                if word == 0 {
                    break;
                }
                let low = (word & 0xFF) as u8;
                let high = (word >> 8) as u8;
                text.push(low as char);
                if high != 0 {
                    text.push(high as char);
                }
                addr = addr.wrapping_add(1);
            }
            write_flushed(out, &text);
        }

        // Halt execution and print a message on the console.
        TrapVector::Halt => {
            write_flushed(out, "HALT\n");
            machine.running = false;
        }
    }
}
