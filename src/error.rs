use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading or running a program.
#[derive(Debug, Error)]
pub enum Error {
    #[error("usage: lc3 [image-file1] ...")]
    Usage,

    #[error("failed to load image: {path}")]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load image: {path}")]
    ImageFormat { path: PathBuf },

    #[error("illegal instruction {opcode:#06x} at {pc:#06x}")]
    IllegalInstruction { opcode: u16, pc: u16 },
}
