//! RFC 3986 URL parsing, resolution, comparison and percent-encoding.

mod error;
mod flags;
mod organization;
mod percent;
mod resolve;
mod split;
mod url;

pub use crate::error::UrlError;
pub use crate::flags::{default_port, UrlFlags};
pub use crate::organization::same_organization;
pub use crate::percent::{decode_hex_str, encode_hex_str, strip_delimiters};
pub use crate::url::Url;
