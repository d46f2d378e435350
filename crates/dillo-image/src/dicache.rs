//! Content-addressed, per-URL-versioned decoded-image cache with
//! viewer fanout.

use dillo_url::Url;
use dillo_utils::BitSet;
use tracing::{trace, warn};

use crate::codec::{ColorType, DecodeSink};
use crate::error::ImageError;
use crate::imgbuf::ImgBuf;

const LOG_TARGET: &str = "dillo_image::dicache";

/// A dicache entry's decode-progress state. Transitions only ever
/// advance; a call that would move `state` backwards is ignored,
/// mirroring the source's `DicEntry->State < DIC_X` guards.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum State {
    Empty,
    SetParms,
    SetCmap,
    Write,
    Close,
    Abort,
}

/// Which version of a URL's image to look up.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Version {
    Last,
    Numbered(u32),
}

/// Receives push notifications as an entry it's bound to decodes.
/// Implemented by the widget that actually draws pixels; `dillo-image`
/// only calls these methods, never draws anything itself.
pub trait Viewer {
    fn bind(&mut self, imgbuf: ImgBuf, width: u32, height: u32, ty: ColorType);
    fn new_scan(&mut self);
    fn draw_row(&mut self, y: u32);
    fn close(&mut self);
    fn abort(&mut self);
}

struct ViewerHandle {
    viewer: Box<dyn Viewer>,
    seen_parms: bool,
    scan_number: u32,
    rows_drawn: BitSet,
}

pub struct DicacheEntry {
    version: u32,
    ty: ColorType,
    width: u32,
    height: u32,
    cmap: Option<Vec<[u8; 3]>>,
    imgbuf: Option<ImgBuf>,
    total_size: usize,
    scan_number: u32,
    rows_decoded: BitSet,
    state: State,
    ref_count: usize,
    viewers: Vec<ViewerHandle>,
}

impl DicacheEntry {
    fn new(version: u32) -> DicacheEntry {
        DicacheEntry {
            version,
            ty: ColorType::NotSet,
            width: 0,
            height: 0,
            cmap: None,
            imgbuf: None,
            total_size: 0,
            scan_number: 0,
            rows_decoded: BitSet::new(),
            state: State::Empty,
            ref_count: 1,
            viewers: Vec::new(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rows_decoded(&self) -> &BitSet {
        &self.rows_decoded
    }

    pub fn imgbuf(&self) -> Option<&ImgBuf> {
        self.imgbuf.as_ref()
    }

    /// Binds a viewer to this entry; it is caught up immediately if
    /// parameters are already known.
    pub fn attach_viewer(&mut self, mut viewer: Box<dyn Viewer>) {
        if let Some(imgbuf) = &self.imgbuf {
            if self.state >= State::SetParms {
                viewer.bind(imgbuf.clone(), self.width, self.height, self.ty);
            }
        }
        let mut handle = ViewerHandle {
            viewer,
            seen_parms: self.state >= State::SetParms,
            scan_number: self.scan_number,
            rows_drawn: BitSet::new(),
        };
        for y in 0..self.height {
            if self.rows_decoded.contains(y as usize) {
                handle.viewer.draw_row(y);
                handle.rows_drawn.insert(y as usize);
            }
        }
        self.viewers.push(handle);
    }

    fn notify_write(&mut self, y: u32) {
        let imgbuf = match &self.imgbuf {
            Some(b) => b.clone(),
            None => return,
        };
        for handle in &mut self.viewers {
            if !handle.seen_parms {
                handle.viewer.bind(imgbuf.clone(), self.width, self.height, self.ty);
                handle.seen_parms = true;
            }
            if handle.scan_number != self.scan_number {
                handle.viewer.new_scan();
                handle.scan_number = self.scan_number;
                handle.rows_drawn = BitSet::new();
            }
            if self.rows_decoded.contains(y as usize) && !handle.rows_drawn.contains(y as usize) {
                handle.viewer.draw_row(y);
                handle.rows_drawn.insert(y as usize);
            }
        }
    }

    fn notify_close(&mut self) {
        for handle in &mut self.viewers {
            handle.viewer.close();
        }
    }

    fn notify_abort(&mut self) {
        for handle in &mut self.viewers {
            handle.viewer.abort();
        }
    }
}

struct DicacheNode {
    url: Url,
    valid: bool,
    entries: Vec<DicacheEntry>,
}

/// Decoded-image cache keyed by `(URL, version)`, per §4.3. One node
/// per distinct URL identity (`Url::cmp_identity`); each node's
/// entries are its versions in creation order.
#[derive(Default)]
pub struct Dicache {
    nodes: Vec<DicacheNode>,
    size_total: usize,
}

impl Dicache {
    pub fn new() -> Dicache {
        Dicache::default()
    }

    fn find_node(&self, url: &Url) -> Option<usize> {
        self.nodes.iter().position(|n| n.url.cmp_identity(url) == std::cmp::Ordering::Equal)
    }

    /// Creates a new entry for `url`, with `version = max_existing + 1`.
    /// Revalidates the node if it already existed.
    pub fn add(&mut self, url: &Url) -> u32 {
        match self.find_node(url) {
            Some(idx) => {
                let node = &mut self.nodes[idx];
                node.valid = true;
                let next_version = node.entries.last().map(|e| e.version + 1).unwrap_or(1);
                node.entries.push(DicacheEntry::new(next_version));
                next_version
            }
            None => {
                self.nodes.push(DicacheNode { url: url.clone(), valid: true, entries: vec![DicacheEntry::new(1)] });
                1
            }
        }
    }

    pub fn get(&self, url: &Url, version: Version) -> Option<&DicacheEntry> {
        let idx = self.find_node(url)?;
        let node = &self.nodes[idx];
        match version {
            Version::Last => node.valid.then(|| node.entries.last()).flatten(),
            Version::Numbered(v) => node.entries.iter().find(|e| e.version == v),
        }
    }

    pub fn get_mut(&mut self, url: &Url, version: Version) -> Option<&mut DicacheEntry> {
        let idx = self.find_node(url)?;
        let node = &mut self.nodes[idx];
        match version {
            Version::Last => {
                if !node.valid {
                    return None;
                }
                node.entries.last_mut()
            }
            Version::Numbered(v) => node.entries.iter_mut().find(|e| e.version == v),
        }
    }

    /// Marks `url`'s node invalid: `get(url, Last)` returns `None`
    /// thereafter, but existing entries survive until unreffed.
    pub fn invalidate(&mut self, url: &Url) {
        if let Some(idx) = self.find_node(url) {
            self.nodes[idx].valid = false;
        }
    }

    pub fn ref_entry(&mut self, url: &Url, version: u32) {
        if let Some(entry) = self.get_mut(url, Version::Numbered(version)) {
            entry.ref_count += 1;
        }
    }

    /// Decrements the entry's refcount, destroying it (and, if it was
    /// the node's only entry, the node) when it reaches zero. Returns
    /// whether the entry was destroyed.
    pub fn unref_entry(&mut self, url: &Url, version: u32) -> bool {
        let Some(idx) = self.find_node(url) else { return false };
        let node = &mut self.nodes[idx];
        let Some(pos) = node.entries.iter().position(|e| e.version == version) else { return false };
        node.entries[pos].ref_count -= 1;
        if node.entries[pos].ref_count > 0 {
            return false;
        }
        let entry = node.entries.remove(pos);
        self.size_total -= entry.total_size;
        trace!(target: LOG_TARGET, url = %node.url, version, "dicache entry destroyed");
        if node.entries.is_empty() {
            self.nodes.remove(idx);
        }
        true
    }

    pub fn attach_viewer(&mut self, url: &Url, version: Version, viewer: Box<dyn Viewer>) {
        if let Some(entry) = self.get_mut(url, version) {
            entry.attach_viewer(viewer);
        }
    }

    fn set_parms(&mut self, url: &Url, version: u32, width: u32, height: u32, ty: ColorType) {
        let Some(entry) = self.get_mut(url, Version::Numbered(version)) else { return };
        if entry.state >= State::SetParms || width == 0 || height == 0 {
            return;
        }
        entry.imgbuf = Some(ImgBuf::new(width, height));
        entry.total_size = width as usize * height as usize * 3;
        entry.width = width;
        entry.height = height;
        entry.ty = ty;
        entry.rows_decoded = BitSet::new();
        entry.state = State::SetParms;
        self.size_total += entry.total_size;
    }

    fn set_cmap(&mut self, url: &Url, version: u32, colors: &[[u8; 3]]) {
        let Some(entry) = self.get_mut(url, Version::Numbered(version)) else { return };
        entry.cmap = Some(colors.to_vec());
        if entry.state < State::SetCmap {
            entry.state = State::SetCmap;
        }
    }

    fn new_scan(&mut self, url: &Url, version: u32) {
        let Some(entry) = self.get_mut(url, Version::Numbered(version)) else { return };
        if entry.state < State::SetParms {
            warn!(target: LOG_TARGET, "new_scan before SetParms, ignoring");
            return;
        }
        entry.rows_decoded = BitSet::new();
        entry.scan_number += 1;
    }

    fn write(&mut self, url: &Url, version: u32, y: u32, rgb: &[u8]) -> Result<(), ImageError> {
        let Some(entry) = self.get_mut(url, Version::Numbered(version)) else { return Ok(()) };
        if entry.width == 0 || entry.height == 0 {
            return Err(ImageError::RowBeforeParms { y });
        }
        if y >= entry.height {
            return Err(ImageError::RowOutOfBounds { y, height: entry.height });
        }
        if let Some(imgbuf) = &entry.imgbuf {
            imgbuf.copy_row(y, rgb);
        }
        entry.rows_decoded.insert(y as usize);
        entry.state = State::Write;
        entry.notify_write(y);
        Ok(())
    }

    fn close(&mut self, url: &Url, version: u32) {
        let Some(entry) = self.get_mut(url, Version::Numbered(version)) else { return };
        if entry.state < State::Close {
            entry.cmap = None;
            entry.state = State::Close;
        }
        entry.notify_close();
    }

    fn abort(&mut self, url: &Url, version: u32, err: &ImageError) {
        warn!(target: LOG_TARGET, %err, "decode aborted");
        let Some(entry) = self.get_mut(url, Version::Numbered(version)) else { return };
        entry.state = State::Abort;
        entry.notify_abort();
    }
}

/// Adapts a `(Dicache, url, version)` triple into the [`DecodeSink`]
/// a [`crate::codec::Codec`] writes events to.
pub struct DicacheSink<'a> {
    pub cache: &'a mut Dicache,
    pub url: Url,
    pub version: u32,
}

impl DecodeSink for DicacheSink<'_> {
    fn set_parms(&mut self, width: u32, height: u32, ty: ColorType, _gamma: f64) {
        self.cache.set_parms(&self.url, self.version, width, height, ty);
    }

    fn set_cmap(&mut self, colors: &[[u8; 3]]) {
        self.cache.set_cmap(&self.url, self.version, colors);
    }

    fn new_scan(&mut self) {
        self.cache.new_scan(&self.url, self.version);
    }

    fn write_row(&mut self, y: u32, rgb: &[u8]) {
        if let Err(err) = self.cache.write(&self.url, self.version, y, rgb) {
            self.abort(&err);
        }
    }

    fn close(&mut self) {
        self.cache.close(&self.url, self.version);
    }

    fn abort(&mut self, err: &ImageError) {
        self.cache.abort(&self.url, self.version, err);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Recorded {
        bound: bool,
        scans: u32,
        rows: Vec<u32>,
        closed: bool,
    }

    struct RecordingViewer(Rc<RefCell<Recorded>>);

    impl Viewer for RecordingViewer {
        fn bind(&mut self, _imgbuf: ImgBuf, _width: u32, _height: u32, _ty: ColorType) {
            self.0.borrow_mut().bound = true;
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
            self.0.borrow_mut().closed = true;
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s, None).unwrap()
    }

    #[test]
    fn add_assigns_increasing_versions_per_url() {
        let mut cache = Dicache::new();
        let u = url("http://example.com/a.png");
        assert_eq!(cache.add(&u), 1);
        assert_eq!(cache.add(&u), 2);
    }

    #[test]
    fn get_last_returns_newest_valid_version() {
        let mut cache = Dicache::new();
        let u = url("http://example.com/a.png");
        cache.add(&u);
        let v2 = cache.add(&u);
        assert_eq!(cache.get(&u, Version::Last).unwrap().version(), v2);
    }

    #[test]
    fn invalidate_hides_last_but_keeps_numbered_lookup() {
        let mut cache = Dicache::new();
        let u = url("http://example.com/a.png");
        let v1 = cache.add(&u);
        cache.invalidate(&u);
        assert!(cache.get(&u, Version::Last).is_none());
        assert!(cache.get(&u, Version::Numbered(v1)).is_some());
    }

    #[test]
    fn unref_destroys_entry_at_zero_refcount() {
        let mut cache = Dicache::new();
        let u = url("http://example.com/a.png");
        let v1 = cache.add(&u);
        assert!(cache.unref_entry(&u, v1));
        assert!(cache.get(&u, Version::Numbered(v1)).is_none());
    }

    #[test]
    fn write_before_set_parms_errors() {
        let mut cache = Dicache::new();
        let u = url("http://example.com/a.png");
        let v1 = cache.add(&u);
        assert!(cache.write(&u, v1, 0, &[0, 0, 0]).is_err());
    }

    #[test]
    fn state_only_advances() {
        let mut cache = Dicache::new();
        let u = url("http://example.com/a.png");
        let v1 = cache.add(&u);
        cache.set_parms(&u, v1, 2, 2, ColorType::Rgb);
        cache.write(&u, v1, 0, &[0; 6]).unwrap();
        assert_eq!(cache.get(&u, Version::Numbered(v1)).unwrap().state(), State::Write);
        cache.set_parms(&u, v1, 4, 4, ColorType::Rgb);
        assert_eq!(cache.get(&u, Version::Numbered(v1)).unwrap().width(), 2, "SetParms is ignored once already set");
    }

    #[test]
    fn viewer_receives_new_scan_before_its_rows() {
        let mut cache = Dicache::new();
        let u = url("http://example.com/a.png");
        let v1 = cache.add(&u);
        cache.set_parms(&u, v1, 1, 2, ColorType::Rgb);
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        cache.attach_viewer(&u, Version::Numbered(v1), Box::new(RecordingViewer(Rc::clone(&recorded))));
        cache.write(&u, v1, 0, &[1, 2, 3]).unwrap();
        cache.new_scan(&u, v1);
        cache.write(&u, v1, 0, &[4, 5, 6]).unwrap();

        let recorded = recorded.borrow();
        assert!(recorded.bound);
        assert_eq!(recorded.scans, 1);
        assert_eq!(recorded.rows, vec![0, 0]);
    }
}
