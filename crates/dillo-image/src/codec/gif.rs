//! GIF decoding via the `gif` crate, buffered until `Close` (see
//! `buffered`), with rows re-emitted in the source's documented
//! four-pass interlace order so a progressively-rendering viewer still
//! sees the expected reveal pattern.

use std::io::Cursor;

use gif::{ColorOutput, DecodeOptions};

use super::buffered::{check_size_limit, BufferedRaster, RasterDecode};
use super::{ColorType, DecodeSink};
use crate::error::ImageError;

/// The four interlace passes of the GIF89a spec: starting row and row
/// step, in pass order. Mirrors the source's `Gif_emit_line`.
const INTERLACE_PASSES: [(u32, u32); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

pub struct GifCodec {
    inner: BufferedRaster<Decoder>,
}

struct Decoder {
    background: [u8; 3],
    limit: u32,
}

impl GifCodec {
    pub fn new() -> GifCodec {
        GifCodec::with_limit(super::MAX_IMAGE_DIMENSION)
    }

    pub fn with_background(background: [u8; 3]) -> GifCodec {
        GifCodec { inner: BufferedRaster::new(Decoder { background, limit: super::MAX_IMAGE_DIMENSION }) }
    }

    /// Same as [`GifCodec::new`] but with a caller-supplied size ceiling,
    /// per `CoreConfig`'s overridable image size limit.
    pub fn with_limit(limit: u32) -> GifCodec {
        GifCodec { inner: BufferedRaster::new(Decoder { background: [0, 0, 0], limit }) }
    }
}

impl Default for GifCodec {
    fn default() -> GifCodec {
        GifCodec::new()
    }
}

impl super::Codec for GifCodec {
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
        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::Indexed);
        let mut decoder = options
            .read_info(Cursor::new(bytes))
            .map_err(|e| ImageError::Malformed(e.to_string()))?;

        let width = decoder.width() as u32;
        let height = decoder.height() as u32;
        check_size_limit(width, height, self.limit)?;

        let mut scan = 0;
        while let Some(frame) = decoder.read_next_frame().map_err(|e| ImageError::Malformed(e.to_string()))? {
            let palette = frame
                .palette
                .as_deref()
                .or(decoder.global_palette())
                .ok_or_else(|| ImageError::Malformed("GIF frame has no color table".into()))?;

            if scan == 0 {
                sink.set_parms(width, height, ColorType::Indexed, 1.0);
                let colors: Vec<[u8; 3]> = palette.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
                sink.set_cmap(&colors);
            } else {
                sink.new_scan();
            }

            let frame_width = frame.width as u32;
            let frame_height = frame.height as u32;
            let top = frame.top as u32;
            let left = frame.left as u32;

            let row_order: Box<dyn Iterator<Item = u32>> = if frame.interlaced {
                Box::new(INTERLACE_PASSES.iter().flat_map(move |&(start, step)| {
                    (start..frame_height).step_by(step as usize)
                }))
            } else {
                Box::new(0..frame_height)
            };

            let mut rgb_row = vec![0u8; width as usize * 3];
            for local_y in row_order {
                let indices = &frame.buffer[(local_y as usize) * frame_width as usize
                    ..(local_y as usize + 1) * frame_width as usize];
                for (x, &idx) in indices.iter().enumerate() {
                    let transparent = frame.transparent == Some(idx);
                    let rgb = if transparent {
                        self.background
                    } else {
                        let base = idx as usize * 3;
                        [
                            *palette.get(base).unwrap_or(&0),
                            *palette.get(base + 1).unwrap_or(&0),
                            *palette.get(base + 2).unwrap_or(&0),
                        ]
                    };
                    let px = (left as usize + x) * 3;
                    rgb_row[px..px + 3].copy_from_slice(&rgb);
                }
                sink.write_row(top + local_y, &rgb_row);
            }

            scan += 1;
        }

        Ok(())
    }
}
