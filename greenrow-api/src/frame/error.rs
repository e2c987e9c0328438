use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is shorter than the fixed frame length
    TooShort { len: usize, expected: usize },
    /// Buffer length is not one of the accepted frame lengths
    UnexpectedLength { len: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len, expected } => {
                write!(f, "Frame too short: {} bytes (expected {})", len, expected)
            }
            Self::UnexpectedLength { len } => write!(f, "Unexpected frame length: {} bytes", len),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// No request row exists for the requested submission timestamp
    SourceRowMissing { submitted_at: i64 },
    /// A stored value does not fit its wire field
    FieldOutOfRange { field: &'static str, value: i64 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceRowMissing { submitted_at } => {
                write!(f, "No request row for timestamp {}", submitted_at)
            }
            Self::FieldOutOfRange { field, value } => {
                write!(f, "Field {} out of wire range: {}", field, value)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodeError {}
