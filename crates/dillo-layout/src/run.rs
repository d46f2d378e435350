//! The word/run stream a [`crate::linebreak::LineBreaker`] consumes.

use bitflags::bitflags;

use crate::style::StyleId;

bitflags! {
    /// Per-text-run flags, mirroring the source's `Word::Flags`.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct RunFlags: u8 {
        /// The word may be split by the hyphenator if a line is tight.
        const CAN_BE_HYPHENATED = 1 << 0;
        /// A soft-hyphen divider character is drawn if this word ends a line.
        const DIV_CHAR_AT_EOL = 1 << 1;
        /// A permanent divider character (e.g. an explicit hyphen) always
        /// draws even mid-line.
        const PERM_DIV_CHAR = 1 << 2;
        /// Draw this run as a single text primitive rather than glyph-by-glyph.
        const DRAW_AS_ONE_TEXT = 1 << 3;
        /// Exclude this run from the minimum-width computation (e.g. an
        /// unbreakable sub-word produced by hyphenation).
        const UNBREAKABLE_FOR_MIN_WIDTH = 1 << 4;
        /// This run begins a word (the first sub-word after hyphenation, or
        /// an ordinary word start).
        const WORD_START = 1 << 5;
        /// This run ends a word.
        const WORD_END = 1 << 6;
    }
}

/// Stretch/shrink budget carried by a run's trailing inter-run space.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SpaceGlue {
    pub width: i32,
    pub stretch: i32,
    pub shrink: i32,
}

/// One atomic unit in a text block's run stream.
#[derive(Clone, Debug)]
pub enum Run {
    /// A run of text: a byte range into a shared text zone.
    Text {
        start: u32,
        end: u32,
        style: StyleId,
        font: u32,
        width: i32,
        ascent: i32,
        descent: i32,
        flags: RunFlags,
        /// Width of the hyphen glyph drawn if this run ends a line via a
        /// soft hyphen; `0` if this run was never produced by hyphenation.
        hyphen_width: i32,
        /// The space (if any) following this run, with its own style.
        space: Option<(SpaceGlue, StyleId)>,
    },
    /// An embedded child widget participating in the line.
    InlineWidget { width: i32, ascent: i32, descent: i32, space: Option<(SpaceGlue, StyleId)> },
    /// A forced line break.
    Break { min_break_space: i32 },
    /// A placeholder for an out-of-flow element (a float): consumes no
    /// horizontal space but may pin a y-position.
    OofRef,
}

impl Run {
    pub fn width(&self) -> i32 {
        match self {
            Run::Text { width, .. } | Run::InlineWidget { width, .. } => *width,
            Run::Break { .. } | Run::OofRef => 0,
        }
    }

    pub fn ascent(&self) -> i32 {
        match self {
            Run::Text { ascent, .. } | Run::InlineWidget { ascent, .. } => *ascent,
            Run::Break { .. } | Run::OofRef => 0,
        }
    }

    pub fn descent(&self) -> i32 {
        match self {
            Run::Text { descent, .. } | Run::InlineWidget { descent, .. } => *descent,
            Run::Break { .. } | Run::OofRef => 0,
        }
    }

    pub fn space(&self) -> Option<(SpaceGlue, StyleId)> {
        match self {
            Run::Text { space, .. } | Run::InlineWidget { space, .. } => *space,
            Run::Break { .. } | Run::OofRef => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Run::Break { .. })
    }

    pub fn is_oof_ref(&self) -> bool {
        matches!(self, Run::OofRef)
    }

    pub fn flags(&self) -> RunFlags {
        match self {
            Run::Text { flags, .. } => *flags,
            _ => RunFlags::empty(),
        }
    }

    pub fn can_be_hyphenated(&self) -> bool {
        self.flags().contains(RunFlags::CAN_BE_HYPHENATED)
    }
}
