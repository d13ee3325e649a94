mod bits;
mod condition;
mod config;
mod console;
mod cpu;
mod error;
mod image;
mod instruction;
mod memory;
mod registers;
mod trap;

pub use condition::Condition;
pub use config::Config;
pub use console::{ConsoleIo, RestoreHandle, Terminal};
pub use cpu::{Machine, DEFAULT_PC};
pub use error::Error;
pub use image::load_image;
pub use memory::Memory;
pub use registers::{Register, Registers};

use std::io::Write;

/// Loads every image named in `config` (in order) and runs the machine to
/// completion against `io`/`out`.
///
/// A failure loading any image stops before execution begins; the images
/// already written to memory are simply discarded along with the rest of
/// the process.
pub fn run(config: Config, io: &mut dyn ConsoleIo, out: &mut dyn Write) -> Result<(), Error> {
    let mut machine = Machine::new();

    for path in &config.images {
        load_image(path, &mut machine.memory)?;
    }

    machine.run(io, out)
}
