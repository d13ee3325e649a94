use crate::bits::swap16;
use crate::error::Error;
use crate::memory::Memory;
use byteorder::{NativeEndian, ReadBytesExt};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Converts a word just read in the host's native byte order into the value
/// it represents in the file's big-endian encoding. A no-op on big-endian
/// hosts, a byte swap everywhere else.
#[cfg(target_endian = "little")]
fn from_big_endian(word: u16) -> u16 {
    swap16(word)
}

#[cfg(target_endian = "big")]
fn from_big_endian(word: u16) -> u16 {
    word
}

/// Loads a big-endian LC-3 object image: a 2-byte origin followed by zero or
/// more 16-bit payload words, placed into `memory` starting at `origin`.
///
/// A short or empty payload is not an error. The payload is silently
/// truncated at `0x10000 - origin` words if the file is larger than that;
/// later images loaded at overlapping addresses overwrite earlier ones,
/// since this only ever writes forward into `memory`.
pub fn load_image(path: &Path, memory: &mut Memory) -> Result<(), Error> {
    let file = File::open(path).map_err(|source| Error::ImageOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let origin = from_big_endian(reader.read_u16::<NativeEndian>().map_err(|_| {
        Error::ImageFormat {
            path: path.to_path_buf(),
        }
    })?);

    let max_words = 0x10000usize - origin as usize;
    let mut address = origin;

    for _ in 0..max_words {
        match reader.read_u16::<NativeEndian>() {
            Ok(word) => {
                memory.write(address, from_big_endian(word));
                address = address.wrapping_add(1);
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(_) => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_image(words: &[u16]) -> tempfile_like::TempFile {
        let mut file = tempfile_like::TempFile::new();
        for word in words {
            file.write_all(&word.to_be_bytes()).unwrap();
        }
        file
    }

    #[test]
    fn loads_payload_at_origin() {
        let file = write_image(&[0x3000, 1, 2, 3]);
        let mut memory = Memory::new();

        load_image(file.path(), &mut memory).unwrap();

        assert_eq!(memory.peek(0x3000), 1);
        assert_eq!(memory.peek(0x3001), 2);
        assert_eq!(memory.peek(0x3002), 3);
    }

    #[test]
    fn empty_payload_is_not_an_error() {
        let file = write_image(&[0x3000]);
        let mut memory = Memory::new();

        assert!(load_image(file.path(), &mut memory).is_ok());
    }

    #[test]
    fn missing_origin_is_a_format_error() {
        let file = tempfile_like::TempFile::new();
        let mut memory = Memory::new();

        let err = load_image(file.path(), &mut memory).unwrap_err();
        assert!(matches!(err, Error::ImageFormat { .. }));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let mut memory = Memory::new();
        let err = load_image(Path::new("/nonexistent/path/to.obj"), &mut memory).unwrap_err();
        assert!(matches!(err, Error::ImageOpen { .. }));
    }

    #[test]
    fn two_images_overlay_with_later_writes_winning() {
        let first = write_image(&[0x3000, 1, 1, 1]);
        let second = write_image(&[0x3001, 2, 2]);
        let mut memory = Memory::new();

        load_image(first.path(), &mut memory).unwrap();
        load_image(second.path(), &mut memory).unwrap();

        assert_eq!(memory.peek(0x3000), 1);
        assert_eq!(memory.peek(0x3001), 2);
        assert_eq!(memory.peek(0x3002), 2);
    }

    /// A minimal scratch-file helper so image-loader tests don't need a
    /// `tempfile` dependency for what is, each time, a handful of bytes.
    mod tempfile_like {
        use std::fs::{self, File};
        use std::path::{Path, PathBuf};

        pub struct TempFile {
            path: PathBuf,
            file: File,
        }

        impl TempFile {
            pub fn new() -> Self {
                let path = std::env::temp_dir().join(format!(
                    "lc3-image-test-{}-{}.obj",
                    std::process::id(),
                    COUNTER.next()
                ));
                let file = File::create(&path).unwrap();
                Self { path, file }
            }

            pub fn path(&self) -> &Path {
                &self.path
            }
        }

        impl std::io::Write for TempFile {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.file.write(buf)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                self.file.flush()
            }
        }

        impl Drop for TempFile {
            fn drop(&mut self) {
                let _ = fs::remove_file(&self.path);
            }
        }

        struct Counter(std::sync::atomic::AtomicU64);
        static COUNTER: Counter = Counter(std::sync::atomic::AtomicU64::new(0));
        impl Counter {
            fn next(&self) -> u64 {
                self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            }
        }
    }
}
