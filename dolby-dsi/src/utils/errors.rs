use std::io;

#[derive(thiserror::Error, Debug)]
pub enum BitReadError {
    #[error("read of {requested} bits at bit {position} exceeds {length}-bit buffer")]
    OutOfBounds {
        requested: u64,
        position: u64,
        length: u64,
    },

    #[error("zero-width read requested at bit {0}")]
    ZeroWidth(u64),

    #[error("read width {requested} exceeds maximum {max}")]
    TooWide { requested: u32, max: u32 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum Ac4DsiError {
    #[error("dac4 payload is empty")]
    EmptyDescriptor,

    #[error("bitstream_version {0} is not supported")]
    UnsupportedBitstreamVersion(u8),

    #[error("presentation_version {0} is not supported")]
    UnsupportedPresentationVersion(u8),

    #[error(
        "Only a single presentation (including its IMS companion) is supported. presentation_version = {presentation_version}, n_presentations = {n_presentation}"
    )]
    MultiplePresentations {
        presentation_version: u8,
        n_presentation: u16,
    },

    #[error("ac4_presentation_v1_dsi consumed {consumed_bits} bits, only {declared_bits} declared")]
    PresentationOverrun { declared_bits: u64, consumed_bits: u64 },
}

#[derive(thiserror::Error, Debug)]
pub enum Ec3DsiError {
    #[error("dec3 payload is empty")]
    EmptyDescriptor,
}

#[derive(thiserror::Error, Debug)]
pub enum KeyError {
    #[error("Cannot parse {field} as hex: {value:?}")]
    InvalidHex { field: &'static str, value: String },

    #[error("Key for key ID {0} was not found")]
    KeyNotFound(String),

    #[error("Cannot rotate empty {0}")]
    EmptyRotationInput(&'static str),
}

impl BitReadError {
    /// True when the failure means the buffer ran out of data.
    pub fn is_out_of_bounds(&self) -> bool {
        match self {
            BitReadError::OutOfBounds { .. } => true,
            BitReadError::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
