#![no_main]

use dillo_image::{codec::PngCodec, Codec, ColorType, DecodeSink, ImageError};
use libfuzzer_sys::fuzz_target;

struct NullSink;

impl DecodeSink for NullSink {
    fn set_parms(&mut self, _width: u32, _height: u32, _ty: ColorType, _gamma: f64) {}
    fn set_cmap(&mut self, _colors: &[[u8; 3]]) {}
    fn new_scan(&mut self) {}
    fn write_row(&mut self, _y: u32, _rgb: &[u8]) {}
    fn close(&mut self) {}
    fn abort(&mut self, _err: &ImageError) {}
}

fuzz_target!(|data: &[u8]| {
    let mut codec = PngCodec::new();
    let mut sink = NullSink;

    let mut consumed = 0;
    for chunk in data.chunks(7) {
        let end = consumed + chunk.len();
        consumed = codec.feed(&data[..end], consumed, &mut sink);
        assert!(consumed <= data.len());
    }
    codec.close(&mut sink);
});
