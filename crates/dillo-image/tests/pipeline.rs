//! End-to-end tests driving a real codec through a [`Dicache`] entry
//! and a recording viewer, the way the fetch layer would.

use std::cell::RefCell;
use std::rc::Rc;

use dillo_image::{codec_for_mime, ColorType, Dicache, DicacheSink, ImgBuf, State, Version, Viewer, MAX_IMAGE_DIMENSION};
use dillo_url::Url;

#[derive(Default)]
struct Recorded {
    width: u32,
    height: u32,
    scans: u32,
    rows: Vec<u32>,
    closed: bool,
    aborted: bool,
}

struct RecordingViewer(Rc<RefCell<Recorded>>);

impl Viewer for RecordingViewer {
    fn bind(&mut self, _imgbuf: ImgBuf, width: u32, height: u32, _ty: ColorType) {
        let mut r = self.0.borrow_mut();
        r.width = width;
        r.height = height;
    }
    fn new_scan(&mut self) {
        self.0.borrow_mut().scans += 1;
    }
    fn draw_row(&mut self, y: u32) {
        self.0.borrow_mut().rows.push(y);
    }
    fn close(&mut self) {
        self.0.borrow_mut().closed = true;
    }
    fn abort(&mut self) {
        self.0.borrow_mut().aborted = true;
    }
}

/// The canonical 1x1 transparent GIF (`R0lGODlhAQABAIAAAAAAAP///ywAAAAAAQABAAACAUwAOw==`).
const TINY_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x01, 0x4c,
    0x00, 0x3b,
];

/// A 1x1, 8-bit RGB PNG (pixel `(10, 20, 30)`), generated offline with a
/// standard zlib deflate + CRC32 implementation.
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53,
    0xde, 0x00, 0x00, 0x00, 0x0c, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xe0, 0x12, 0x91, 0x03,
    0x00, 0x00, 0x68, 0x00, 0x3d, 0x54, 0x08, 0xa3, 0xf7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e,
    0x44, 0xae, 0x42, 0x60, 0x82,
];

fn run_through_pipeline(mime: &str, bytes: &[u8]) -> Rc<RefCell<Recorded>> {
    let mut codec = codec_for_mime(mime, MAX_IMAGE_DIMENSION).expect("mime should dispatch to a codec");
    let mut cache = Dicache::new();
    let url = Url::parse("http://example.com/t", None).unwrap();
    let version = cache.add(&url);

    let recorded = Rc::new(RefCell::new(Recorded::default()));
    cache.attach_viewer(&url, Version::Numbered(version), Box::new(RecordingViewer(Rc::clone(&recorded))));

    let mut consumed = 0;
    {
        let mut sink = DicacheSink { cache: &mut cache, url: url.clone(), version };
        consumed = codec.feed(bytes, consumed, &mut sink);
        codec.close(&mut sink);
    }

    let entry = cache.get(&url, Version::Numbered(version)).unwrap();
    assert!(matches!(entry.state(), State::Close | State::Abort));
    let _ = consumed;
    recorded
}

#[test]
fn gif_decodes_every_row_and_notifies_close() {
    let recorded = run_through_pipeline("image/gif", TINY_GIF);
    let r = recorded.borrow();
    assert_eq!(r.width, 1);
    assert_eq!(r.height, 1);
    assert_eq!(r.rows, vec![0]);
    assert!(r.closed);
    assert!(!r.aborted);
}

#[test]
fn png_decodes_every_row_and_notifies_close() {
    let recorded = run_through_pipeline("image/png", TINY_PNG);
    let r = recorded.borrow();
    assert_eq!(r.width, 1);
    assert_eq!(r.height, 1);
    assert_eq!(r.rows, vec![0]);
    assert!(r.closed);
    assert!(!r.aborted);
}

#[test]
fn chunked_feed_still_decodes_once_fully_buffered() {
    let mut codec = codec_for_mime("image/png", MAX_IMAGE_DIMENSION).unwrap();
    let mut cache = Dicache::new();
    let url = Url::parse("http://example.com/chunked.png", None).unwrap();
    let version = cache.add(&url);
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    cache.attach_viewer(&url, Version::Numbered(version), Box::new(RecordingViewer(Rc::clone(&recorded))));

    let mut sink = DicacheSink { cache: &mut cache, url: url.clone(), version };
    let mut consumed = 0;
    for chunk in TINY_PNG.chunks(7) {
        let end = consumed + chunk.len();
        consumed = codec.feed(&TINY_PNG[..end], consumed, &mut sink);
    }
    codec.close(&mut sink);

    let r = recorded.borrow();
    assert_eq!(r.rows, vec![0]);
    assert!(r.closed);
}

#[test]
fn malformed_stream_aborts_instead_of_panicking() {
    let recorded = run_through_pipeline("image/png", b"not a png");
    let r = recorded.borrow();
    assert!(r.aborted);
    assert!(!r.closed);
}

#[test]
fn unknown_mime_has_no_codec() {
    assert!(codec_for_mime("application/octet-stream", MAX_IMAGE_DIMENSION).is_none());
}
