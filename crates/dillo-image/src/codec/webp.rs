//! WebP decoding via `image-webp`, buffered until `Close` (see
//! `buffered`); alpha is composited over black since the dicache only
//! stores opaque RGB triples.

use std::io::Cursor;

use image_webp::WebPDecoder;

use super::buffered::{check_size_limit, BufferedRaster, RasterDecode};
use super::{ColorType, DecodeSink};
use crate::error::ImageError;

pub struct WebpCodec {
    inner: BufferedRaster<Decoder>,
}

struct Decoder {
    limit: u32,
}

impl WebpCodec {
    pub fn new() -> WebpCodec {
        WebpCodec::with_limit(super::MAX_IMAGE_DIMENSION)
    }

    pub fn with_limit(limit: u32) -> WebpCodec {
        WebpCodec { inner: BufferedRaster::new(Decoder { limit }) }
    }
}

impl Default for WebpCodec {
    fn default() -> WebpCodec {
        WebpCodec::new()
    }
}

impl super::Codec for WebpCodec {
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
        let mut decoder =
            WebPDecoder::new(Cursor::new(bytes)).map_err(|e| ImageError::Malformed(e.to_string()))?;
        let (width, height) = decoder.dimensions();
        check_size_limit(width, height, self.limit)?;

        let has_alpha = decoder.has_alpha();
        let channels = if has_alpha { 4 } else { 3 };
        let mut pixels = vec![0u8; width as usize * height as usize * channels];
        decoder.read_image(&mut pixels).map_err(|e| ImageError::Malformed(e.to_string()))?;

        sink.set_parms(width, height, ColorType::Rgb, 1.0);

        let stride = width as usize * channels;
        let mut rgb_row = vec![0u8; width as usize * 3];
        for y in 0..height as usize {
            let row = &pixels[y * stride..(y + 1) * stride];
            if has_alpha {
                for x in 0..width as usize {
                    let px = &row[x * 4..x * 4 + 4];
                    let blend = |c: u8| (c as u32 * px[3] as u32 / 255) as u8;
                    rgb_row[x * 3..x * 3 + 3].copy_from_slice(&[blend(px[0]), blend(px[1]), blend(px[2])]);
                }
            } else {
                rgb_row.copy_from_slice(row);
            }
            sink.write_row(y as u32, &rgb_row);
        }

        Ok(())
    }
}
