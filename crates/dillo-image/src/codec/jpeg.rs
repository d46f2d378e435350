//! JPEG decoding via `jpeg-decoder`, buffered until `Close` (see
//! `buffered`) since the crate only exposes a whole-image `decode()`
//! call rather than an incremental row-at-a-time API.

use std::io::Cursor;

use jpeg_decoder::PixelFormat;
use tracing::debug;

use super::buffered::{check_size_limit, BufferedRaster, RasterDecode};
use super::{ColorType, DecodeSink};
use crate::error::ImageError;

const LOG_TARGET: &str = "dillo_image::codec::jpeg";

pub struct JpegCodec {
    inner: BufferedRaster<JpegDecoder>,
}

struct JpegDecoder {
    limit: u32,
}

impl JpegCodec {
    pub fn new() -> JpegCodec {
        JpegCodec::with_limit(super::MAX_IMAGE_DIMENSION)
    }

    pub fn with_limit(limit: u32) -> JpegCodec {
        JpegCodec { inner: BufferedRaster::new(JpegDecoder { limit }) }
    }
}

impl Default for JpegCodec {
    fn default() -> JpegCodec {
        JpegCodec::new()
    }
}

impl super::Codec for JpegCodec {
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

impl RasterDecode for JpegDecoder {
    fn decode(&self, bytes: &[u8], sink: &mut dyn DecodeSink) -> Result<(), ImageError> {
        let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(bytes));
        let pixels = decoder.decode().map_err(|e| ImageError::Malformed(e.to_string()))?;
        let info = decoder.info().ok_or_else(|| ImageError::Malformed("JPEG decoded with no frame info".into()))?;

        let width = info.width as u32;
        let height = info.height as u32;
        check_size_limit(width, height, self.limit)?;

        let (channels, ty) = match info.pixel_format {
            PixelFormat::L8 => (1, ColorType::Gray),
            PixelFormat::RGB24 => (3, ColorType::Rgb),
            PixelFormat::CMYK32 => {
                debug!(target: LOG_TARGET, "treating CMYK JPEG as RGBW (preserved source quirk)");
                (4, ColorType::CmykInv)
            }
            // L16 is not produced by this crate's baseline/progressive paths we target.
            other => return Err(ImageError::Malformed(format!("unsupported JPEG pixel format: {other:?}"))),
        };

        sink.set_parms(width, height, ty, 1.0 / 2.2);

        let stride = width as usize * channels;
        let mut rgb_row = vec![0u8; width as usize * 3];
        for y in 0..height as usize {
            let row = &pixels[y * stride..(y + 1) * stride];
            for x in 0..width as usize {
                let px = &row[x * channels..x * channels + channels];
                let rgb = match channels {
                    1 => [px[0], px[0], px[0]],
                    3 => [px[0], px[1], px[2]],
                    _ => rgbw(px[0], px[1], px[2], px[3]),
                };
                rgb_row[x * 3..x * 3 + 3].copy_from_slice(&rgb);
            }
            sink.write_row(y as u32, &rgb_row);
        }

        Ok(())
    }
}

/// The source's "RGBW" hack for CMYK JPEGs: treat the first three
/// channels as inverted RGB and multiply by the fourth (K) channel.
fn rgbw(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let scale = |v: u8| (v as u32 * k as u32 / 255) as u8;
    [scale(c), scale(m), scale(y)]
}
