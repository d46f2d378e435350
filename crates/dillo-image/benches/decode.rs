use criterion::{criterion_group, criterion_main, Criterion};
use dillo_image::{codec::SvgCodec, Codec, ColorType, DecodeSink, Dicache, DicacheSink, ImageError, ImgBuf};
use dillo_url::Url;

struct NullSink;

impl DecodeSink for NullSink {
    fn set_parms(&mut self, _width: u32, _height: u32, _ty: ColorType, _gamma: f64) {}
    fn set_cmap(&mut self, _colors: &[[u8; 3]]) {}
    fn new_scan(&mut self) {}
    fn write_row(&mut self, _y: u32, _rgb: &[u8]) {}
    fn close(&mut self) {}
    fn abort(&mut self, _err: &ImageError) {}
}

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64">
    <rect x="0" y="0" width="64" height="64" fill="#336699"/>
    <circle cx="32" cy="32" r="20" fill="#ffcc00"/>
</svg>"#;

fn imgbuf_benchmark(c: &mut Criterion) {
    c.bench_function("imgbuf-alloc-640x480", |b| {
        b.iter(|| ImgBuf::new(640, 480));
    });

    c.bench_function("imgbuf-write-all-rows-640x480", |b| {
        b.iter(|| {
            let buf = ImgBuf::new(640, 480);
            let row = vec![128u8; 640 * 3];
            for y in 0..480 {
                buf.copy_row(y, &row);
            }
        });
    });
}

fn dicache_benchmark(c: &mut Criterion) {
    c.bench_function("dicache-decode-cycle-100x100", |b| {
        b.iter(|| {
            let mut cache = Dicache::new();
            let url = Url::parse("http://example.com/bench.png", None).unwrap();
            let version = cache.add(&url);
            let mut sink = DicacheSink { cache: &mut cache, url: url.clone(), version };
            sink.set_parms(100, 100, ColorType::Rgb, 1.0);
            let row = vec![0u8; 100 * 3];
            for y in 0..100u32 {
                sink.write_row(y, &row);
            }
            sink.close();
        });
    });
}

fn svg_benchmark(c: &mut Criterion) {
    c.bench_function("svg-rasterize-64x64", |b| {
        b.iter(|| {
            let mut codec = SvgCodec::new([255, 255, 255]);
            let mut sink = NullSink;
            codec.feed(SVG.as_bytes(), 0, &mut sink);
            codec.close(&mut sink);
        });
    });
}

criterion_group!(benches, imgbuf_benchmark, dicache_benchmark, svg_benchmark);
criterion_main!(benches);
