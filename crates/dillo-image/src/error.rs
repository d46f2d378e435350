use thiserror::Error;

/// Failures that cross the `dillo-image` crate boundary as an `Err`.
///
/// Per the pipeline's failure semantics, a corrupt image, a truncated
/// stream, or an oversized image never surfaces as an `Err` from the
/// steady-state streaming API: those fold into the decoder transitioning
/// to [`crate::dicache::State::Abort`] instead, so a single bad fetch
/// can't panic a host. `Err` is reserved for programmer misuse (feeding
/// a row before `SetParms`, writing to a closed entry) and for one-shot
/// constructors where the caller genuinely needs to know a call failed.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unrecognized image MIME type: {0}")]
    UnknownMime(String),

    #[error("image dimensions {width}x{height} exceed the {limit}x{limit} size limit")]
    TooLarge { width: u32, height: u32, limit: u32 },

    #[error("row {y} written before SetParms")]
    RowBeforeParms { y: u32 },

    #[error("row {y} out of bounds for image of height {height}")]
    RowOutOfBounds { y: u32, height: u32 },

    #[error("codec reported a malformed stream: {0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
