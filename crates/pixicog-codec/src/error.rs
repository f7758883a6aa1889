use thiserror::Error;

/// Malformed checkpoint text, or a working set that cannot be encoded.
///
/// `line` is 1-based within the decoded stream.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("FORMAT/NAME: line {line} has no entry name")]
    MissingName { line: usize },

    #[error("FORMAT/FIELDS: line {line} image entry has {found} `|` fields, expected 4")]
    FieldCount { line: usize, found: usize },

    #[error("FORMAT/NUMBER: line {line} {field} is not a non-negative integer: {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("FORMAT/CHANNELS: line {line} declares {found} channels, only 4 is supported")]
    UnsupportedChannels { line: usize, found: usize },

    #[error("FORMAT/PAYLOAD: line {line} payload is not unpadded base64: {source}")]
    Payload {
        line: usize,
        #[source]
        source: base64::DecodeError,
    },

    #[error("FORMAT/PAYLOAD: line {line} payload has {found} bytes, expected {expected}")]
    PayloadLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("FORMAT/SIZE: {width}x{height} image does not fit in memory")]
    TooLarge { width: u32, height: u32 },

    #[error("FORMAT/NAME: {name:?} cannot be encoded (empty or contains a delimiter)")]
    InvalidName { name: String },

    #[error("FORMAT/BUFFER: pixel buffer has {found} bytes, expected {expected}")]
    BufferLength { expected: usize, found: usize },
}
