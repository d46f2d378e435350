//! PNG decoding via the `png` crate's standard (non-streaming) decoder,
//! buffered until `Close` (see `buffered`).
//!
//! The `png` crate's `Reader::next_frame` already performs Adam7
//! de-interlacing and palette/grayscale expansion, returning one
//! complete top-down buffer; this codec reports it as a single scan
//! rather than re-deriving per-pass row order, since whole-buffer
//! buffering (§4.3, shared with GIF/JPEG/WebP) already discards the
//! true incremental-decode timing Adam7 exists to improve.

use std::io::Cursor;

use png::{ColorType as PngColorType, Transformations};

use super::buffered::{check_size_limit, BufferedRaster, RasterDecode};
use super::{ColorType, DecodeSink};
use crate::error::ImageError;

pub struct PngCodec {
    inner: BufferedRaster<Decoder>,
}

struct Decoder {
    limit: u32,
}

impl PngCodec {
    pub fn new() -> PngCodec {
        PngCodec::with_limit(super::MAX_IMAGE_DIMENSION)
    }

    pub fn with_limit(limit: u32) -> PngCodec {
        PngCodec { inner: BufferedRaster::new(Decoder { limit }) }
    }
}

impl Default for PngCodec {
    fn default() -> PngCodec {
        PngCodec::new()
    }
}

impl super::Codec for PngCodec {
    fn feed(&mut self, buffer: &[u8], start_ofs: usize, sink: &mut dyn DecodeSink) -> usize {
        self.inner.feed(buffer, start_ofs, sink)
    }

    fn close(&mut self, sink: &mut dyn DecodeSink) {
        self.inner.close(sink);
    }

    fn abort(&mut self, sink: &mut dyn DecodeSink) {
        self.inner.abort(sink);
    }
}

impl RasterDecode for Decoder {
    fn decode(&self, bytes: &[u8], sink: &mut dyn DecodeSink) -> Result<(), ImageError> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut reader = decoder.read_info().map_err(|e| ImageError::Malformed(e.to_string()))?;

        let width = reader.info().width;
        let height = reader.info().height;
        check_size_limit(width, height, self.limit)?;

        let mut buf = vec![0u8; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf).map_err(|e| ImageError::Malformed(e.to_string()))?;
        let bytes = &buf[..frame.buffer_size()];

        let channels = match frame.color_type {
            PngColorType::Grayscale => 1,
            PngColorType::GrayscaleAlpha => 2,
            PngColorType::Rgb => 3,
            PngColorType::Rgba => 4,
            PngColorType::Indexed => return Err(ImageError::Malformed("indexed PNG survived EXPAND transform".into())),
        };

        let ty = if matches!(frame.color_type, PngColorType::Grayscale | PngColorType::GrayscaleAlpha) {
            ColorType::Gray
        } else {
            ColorType::Rgb
        };
        sink.set_parms(width, height, ty, 1.0);

        let stride = width as usize * channels;
        let mut rgb_row = vec![0u8; width as usize * 3];
        for y in 0..height as usize {
            let row = &bytes[y * stride..(y + 1) * stride];
            for x in 0..width as usize {
                let px = &row[x * channels..x * channels + channels];
                let rgb = match channels {
                    1 => [px[0], px[0], px[0]],
                    2 => [px[0], px[0], px[0]],
                    3 => [px[0], px[1], px[2]],
                    _ => composite_over_black(px[0], px[1], px[2], px[3]),
                };
                rgb_row[x * 3..x * 3 + 3].copy_from_slice(&rgb);
            }
            sink.write_row(y as u32, &rgb_row);
        }

        Ok(())
    }
}

fn composite_over_black(r: u8, g: u8, b: u8, a: u8) -> [u8; 3] {
    let blend = |c: u8| (c as u32 * a as u32 / 255) as u8;
    [blend(r), blend(g), blend(b)]
}
