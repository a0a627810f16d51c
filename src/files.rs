//! Input and output helpers: a missing path means stdin or stdout.

use crate::error::{Error, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Read a whole UTF-8 file, or stdin.
pub fn read(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| io_error(path, source)),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|source| io_error(Path::new("<stdin>"), source))?;
            Ok(input)
        }
    }
}

/// Look up an encoding by its label (`utf-8`, `latin1`, `shift_jis`, ...).
pub fn encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Read a whole file in `encoding`. Bytes that do not decode are an error,
/// and a byte order mark is kept as text.
pub fn read_encoded(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| io_error(path, source))?;
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| Error::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        })
}

/// Buffered writer to a file (created or truncated), or stdout.
pub fn writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| io_error(path, source))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

pub fn io_error(path: &Path, source: io::Error) -> Error {
    Error::Io {
        path: PathBuf::from(path),
        source,
    }
}
