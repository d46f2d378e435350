//! Progressive image decoding: MIME-dispatched codecs that emit
//! `SetParms`/`SetCmap`/`NewScan`/`WriteRow`/`Close`/`Abort` events into
//! a versioned, URL-keyed [`Dicache`] that fans rows out to every
//! viewer attached to an entry.

pub mod codec;
pub mod dicache;
pub mod error;
pub mod imgbuf;

pub use codec::{codec_for_mime, ColorType, Codec, DecodeSink, MAX_IMAGE_DIMENSION};
pub use dicache::{Dicache, DicacheEntry, DicacheSink, State, Version, Viewer};
pub use error::ImageError;
pub use imgbuf::ImgBuf;
