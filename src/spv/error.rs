use std::error;
use std::fmt;
use std::io;

/// Failure conditions surfaced by the decoder and reflector. The first
/// fatal condition aborts the parse; nothing is recovered locally.
#[derive(Debug)]
pub enum Error {
    /// The buffer ended before a required read, or its byte length is not
    /// a whole number of words.
    Truncated,
    /// The first header word is not the SPIR-V magic number.
    BadMagic(u32),
    /// The module violates the logical layout reflection depends on. The
    /// message carries the instruction index where decoding stopped.
    StructuralError(String),
    /// Strict mode rejected a construct this decoder does not support.
    UnsupportedFeature(&'static str),
    IoFailure(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            Truncated => write!(f, "spirv binary is truncated"),
            BadMagic(word) => write!(f, "invalid magic number {:#010x}", word),
            StructuralError(what) => write!(f, "{}", what),
            UnsupportedFeature(what) => write!(f, "unsupported feature: {}", what),
            IoFailure(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::IoFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(x: io::Error) -> Error {
        Error::IoFailure(x)
    }
}
