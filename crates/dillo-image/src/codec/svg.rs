//! SVG rasterization via `usvg` + `resvg` + `tiny-skia`.
//!
//! Unlike the raster codecs, an SVG is rasterized as soon as a closing
//! `</svg>` tag is seen in the accumulated bytes rather than waiting
//! for an explicit `Close`, since the whole document must be present
//! for `usvg` to parse it and there is no earlier point at which partial
//! rows could be produced anyway.

use super::buffered::check_size_limit;
use super::{ColorType, DecodeSink};
use crate::error::ImageError;

pub struct SvgCodec {
    buffer: Vec<u8>,
    /// Composited behind transparent regions of the rasterized image,
    /// standing in for the viewer's background/foreground color that
    /// the source passes down for `currentColor` resolution.
    background: [u8; 3],
    limit: u32,
    rasterized: bool,
}

impl SvgCodec {
    pub fn new(background: [u8; 3]) -> SvgCodec {
        SvgCodec::with_limit(background, super::MAX_IMAGE_DIMENSION)
    }

    pub fn with_limit(background: [u8; 3], limit: u32) -> SvgCodec {
        SvgCodec { buffer: Vec::new(), background, limit, rasterized: false }
    }

    fn try_rasterize(&mut self, sink: &mut dyn DecodeSink) {
        if self.rasterized {
            return;
        }
        if !contains_closing_tag(&self.buffer) {
            return;
        }
        self.rasterized = true;

        if let Err(err) = rasterize(&self.buffer, self.background, self.limit, sink) {
            sink.abort(&err);
        } else {
            sink.close();
        }
    }
}

fn contains_closing_tag(buffer: &[u8]) -> bool {
    buffer.windows(6).any(|w| w.eq_ignore_ascii_case(b"</svg>"))
}

fn rasterize(
    bytes: &[u8],
    background: [u8; 3],
    limit: u32,
    sink: &mut dyn DecodeSink,
) -> Result<(), ImageError> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree =
        usvg::Tree::from_data(bytes, &options).map_err(|e| ImageError::Malformed(e.to_string()))?;
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;
    check_size_limit(width, height, limit)?;

    let mut pixmap = tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| ImageError::Malformed("zero-sized SVG viewport".into()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    sink.set_parms(width, height, ColorType::Rgb, 1.0);

    let data = pixmap.data();
    let mut rgb_row = vec![0u8; width as usize * 3];
    for y in 0..height as usize {
        for x in 0..width as usize {
            let i = (y * width as usize + x) * 4;
            let (r, g, b, a) = (data[i], data[i + 1], data[i + 2], data[i + 3]);
            let blend = |fg: u8, bg: u8| ((fg as u32 * a as u32 + bg as u32 * (255 - a as u32)) / 255) as u8;
            let px = x * 3;
            rgb_row[px] = blend(r, background[0]);
            rgb_row[px + 1] = blend(g, background[1]);
            rgb_row[px + 2] = blend(b, background[2]);
        }
        sink.write_row(y as u32, &rgb_row);
    }

    Ok(())
}

impl super::Codec for SvgCodec {
    fn feed(&mut self, buffer: &[u8], start_ofs: usize, sink: &mut dyn DecodeSink) -> usize {
        if buffer.len() > start_ofs {
            self.buffer.extend_from_slice(&buffer[start_ofs..]);
        }
        self.try_rasterize(sink);
        buffer.len()
    }

    fn close(&mut self, sink: &mut dyn DecodeSink) {
        self.try_rasterize(sink);
        if !self.rasterized {
            self.rasterized = true;
            sink.abort(&ImageError::Malformed("SVG stream closed without a closing </svg> tag".into()));
        }
    }

    fn abort(&mut self, sink: &mut dyn DecodeSink) {
        self.rasterized = true;
        sink.abort(&ImageError::Malformed("decode aborted by caller".into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_tag_detection_is_case_insensitive() {
        assert!(contains_closing_tag(b"<svg></SVG>"));
        assert!(!contains_closing_tag(b"<svg><circle/>"));
    }
}
