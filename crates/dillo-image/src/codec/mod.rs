//! Codec state machines: each instance consumes compressed bytes and
//! emits `SetParms`/`SetCmap`/`NewScan`/`WriteRow`/`Close`/`Abort`
//! events into a [`DecodeSink`].

mod buffered;
mod gif;
mod jpeg;
mod png;
mod svg;
mod webp;

use crate::error::ImageError;

pub use self::gif::GifCodec;
pub use self::jpeg::JpegCodec;
pub use self::png::PngCodec;
pub use self::svg::SvgCodec;
pub use self::webp::WebpCodec;

/// The maximum image area (width x height) any codec will decode.
/// Beyond this the pipeline aborts rather than allocate an unbounded
/// row store.
pub const MAX_IMAGE_DIMENSION: u32 = 6000;

/// How a decoded image's samples map to RGB, mirroring
/// `DicacheEntry::type` in the source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorType {
    Indexed,
    Rgb,
    Gray,
    /// CMYK treated as "RGBW": a pragmatic hack preserved from the
    /// source (see the JPEG codec's doc comment).
    CmykInv,
    NotSet,
}

/// The events a codec reports as it decodes. A sink (in practice a
/// [`crate::dicache::DicacheEntry`]) receives these in the order
/// described in the module-level pipeline contract; `write_row` may be
/// called with rows out of y-order for interlaced/progressive formats.
pub trait DecodeSink {
    fn set_parms(&mut self, width: u32, height: u32, ty: ColorType, gamma: f64);
    fn set_cmap(&mut self, colors: &[[u8; 3]]);
    fn new_scan(&mut self);
    fn write_row(&mut self, y: u32, rgb: &[u8]);
    fn close(&mut self);
    fn abort(&mut self, err: &ImageError);
}

/// A streaming decoder for one image instance.
///
/// `feed` is handed the entire buffer received so far and the offset
/// up to which previous calls already consumed input (the
/// "partial-input contract", §4.3); it returns the new consumed offset.
/// The next call resumes from there. A codec that needs to buffer the
/// whole stream before it can decode (see [`buffered::BufferedRaster`])
/// still honors this contract by reporting everything as consumed and
/// deferring decode work to `close`.
pub trait Codec {
    fn feed(&mut self, buffer: &[u8], start_ofs: usize, sink: &mut dyn DecodeSink) -> usize;
    fn close(&mut self, sink: &mut dyn DecodeSink);
    fn abort(&mut self, sink: &mut dyn DecodeSink);
}

/// Picks a codec by MIME major/minor, per the fetch layer's dispatch
/// table (§6). `max_dimension` is normally [`MAX_IMAGE_DIMENSION`] but
/// is threaded through so a host can override it via `CoreConfig`.
pub fn codec_for_mime(mime: &str, max_dimension: u32) -> Option<Box<dyn Codec>> {
    match mime {
        "image/gif" => Some(Box::new(GifCodec::with_limit(max_dimension))),
        "image/png" => Some(Box::new(PngCodec::with_limit(max_dimension))),
        "image/jpeg" => Some(Box::new(JpegCodec::with_limit(max_dimension))),
        "image/webp" => Some(Box::new(WebpCodec::with_limit(max_dimension))),
        "image/svg+xml" => Some(Box::new(SvgCodec::with_limit([0, 0, 0], max_dimension))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_covers_all_documented_mime_types() {
        for mime in [
            "image/gif",
            "image/png",
            "image/jpeg",
            "image/webp",
            "image/svg+xml",
        ] {
            assert!(codec_for_mime(mime, MAX_IMAGE_DIMENSION).is_some(), "{mime} should dispatch");
        }
    }

    #[test]
    fn unknown_mime_dispatches_to_nothing() {
        assert!(codec_for_mime("application/pdf", MAX_IMAGE_DIMENSION).is_none());
    }
}
