use std::cell::RefCell;
use std::rc::Rc;

use dillo_hyphenate::HyphenatorCache;
use dillo_image::{Codec, Dicache};
use dillo_layout::{LineBreaker, StyleInterner};
use tracing::debug;

use crate::config::CoreConfig;

const LOG_TARGET: &str = "dillo_core";

/// The single, host-constructed object holding the process-wide state
/// the source kept as file-scope globals: the per-language hyphenator
/// cache and the decoded-image cache. A host builds one `CoreContext`
/// and threads it through both subsystems; the line-breaker's own
/// state stays per-textblock and is not held here.
pub struct CoreContext {
    config: CoreConfig,
    hyphenators: HyphenatorCache,
    dicache: RefCell<Dicache>,
}

impl CoreContext {
    pub fn new(config: CoreConfig) -> CoreContext {
        debug!(target: LOG_TARGET, ?config, "constructing core context");
        CoreContext { config, hyphenators: HyphenatorCache::new(), dicache: RefCell::new(Dicache::new()) }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn hyphenators(&self) -> &HyphenatorCache {
        &self.hyphenators
    }

    /// The dicache is shared, mutated only from the loop thread, and
    /// guarded by a `RefCell` rather than a lock: the model is
    /// single-threaded-cooperative, not multi-threaded with
    /// synchronization.
    pub fn dicache(&self) -> &RefCell<Dicache> {
        &self.dicache
    }

    /// Picks a codec for `mime`, applying the configured image size
    /// ceiling.
    pub fn codec_for_mime(&self, mime: &str) -> Option<Box<dyn Codec>> {
        dillo_image::codec_for_mime(mime, self.config.image_size_limit)
    }

    /// Builds a fresh `LineBreaker`, applying the configured hyphen
    /// glyph width. Callers still attach a hyphenator themselves via
    /// `with_hyphenator`, since that also depends on which language the
    /// surrounding block is rendering.
    pub fn new_line_breaker(&self, available_width: i32, styles: Rc<RefCell<StyleInterner>>) -> LineBreaker {
        LineBreaker::new(available_width, styles).with_hyphen_width(self.config.hyphen_width_px)
    }
}
