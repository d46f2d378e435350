//! The line-breaking, justification and width-extremes engine.

use std::cell::RefCell;
use std::rc::Rc;

use dillo_hyphenate::Hyphenator;
use dillo_utils::distribute_rounded;
use tracing::{debug, trace};

use crate::badness::{BadnessAndPenalty, Penalty, PenaltyPair};
use crate::capability::{NoFloats, OutOfFlowMgr};
use crate::line::{Alignment, Extremes, Line, Paragraph};
use crate::run::{Run, RunFlags, SpaceGlue};
use crate::style::{StyleAttrs, StyleId, StyleInterner};

const LOG_TARGET: &str = "dillo_layout::linebreak";

/// Maximum number of height-vs-border convergence iterations per line;
/// a float's border only ever narrows with a taller line and a line's
/// height only ever grows with a narrower border, so this always
/// converges in a handful of steps, but a hard cap keeps a malformed
/// float manager from looping forever.
const MAX_HEIGHT_ITERATIONS: u32 = 64;

/// Width of the hyphen glyph drawn at a soft line break, in the same
/// units as run widths. A single crate-wide constant stands in for the
/// per-font hyphen glyph metric the source queries from the platform.
const HYPHEN_WIDTH: i32 = 6;

/// Lays a stream of [`Run`]s out into [`Line`]s, minimizing a
/// `(badness, penalty)` key per line and hyphenating tight lines on
/// demand.
pub struct LineBreaker {
    text_zone: String,
    runs: Vec<Run>,
    lines: Vec<Line>,
    paragraphs: Vec<Paragraph>,
    /// Lines at or after this index must be rebuilt on the next `rewrap`.
    wrap_ref_line: usize,
    /// The run index up to which lines have already been built.
    wrapped_until_run: usize,
    available_width: i32,
    stretchability_factor: i32,
    hyphenator: Option<Rc<Hyphenator>>,
    lang: String,
    hyphen_width: i32,
    oof: Box<dyn OutOfFlowMgr>,
    styles: Rc<RefCell<StyleInterner>>,
}

impl LineBreaker {
    pub fn new(available_width: i32, styles: Rc<RefCell<StyleInterner>>) -> LineBreaker {
        LineBreaker {
            text_zone: String::new(),
            runs: Vec::new(),
            lines: Vec::new(),
            paragraphs: Vec::new(),
            wrap_ref_line: 0,
            wrapped_until_run: 0,
            available_width,
            stretchability_factor: 50,
            hyphenator: None,
            lang: String::new(),
            hyphen_width: HYPHEN_WIDTH,
            oof: Box::new(NoFloats),
            styles,
        }
    }

    pub fn with_out_of_flow_mgr(mut self, oof: Box<dyn OutOfFlowMgr>) -> LineBreaker {
        self.oof = oof;
        self
    }

    pub fn with_hyphenator(mut self, lang: impl Into<String>, hyphenator: Rc<Hyphenator>) -> LineBreaker {
        self.lang = lang.into();
        self.hyphenator = Some(hyphenator);
        self
    }

    /// Overrides the hyphen glyph width (default [`HYPHEN_WIDTH`]), per
    /// `CoreConfig`'s overridable hyphenation cost constants.
    pub fn with_hyphen_width(mut self, px: i32) -> LineBreaker {
        self.hyphen_width = px;
        self
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Appends a run to the stream and triggers the same incremental
    /// rewrap the run's addition requires.
    pub fn append_run(&mut self, run: Run) -> usize {
        self.runs.push(run);
        let i = self.runs.len() - 1;
        self.process_word(i);
        i
    }

    fn push_text(&mut self, text: &str) -> (u32, u32) {
        let start = self.text_zone.len() as u32;
        self.text_zone.push_str(text);
        (start, self.text_zone.len() as u32)
    }

    pub fn append_text_run(
        &mut self,
        text: &str,
        style: StyleId,
        font: u32,
        width: i32,
        ascent: i32,
        descent: i32,
        mut flags: RunFlags,
        space_after: Option<(SpaceGlue, StyleId)>,
    ) -> usize {
        let (start, end) = self.push_text(text);
        if text.len() >= 6 {
            flags |= RunFlags::CAN_BE_HYPHENATED;
        }
        self.append_run(Run::Text {
            start,
            end,
            style,
            font,
            width,
            ascent,
            descent,
            flags,
            hyphen_width: 0,
            space: space_after,
        })
    }

    /// Call when run `i` is appended or its metrics changed.
    pub fn process_word(&mut self, i: usize) {
        let before = self.runs.len();
        self.word_wrap(i, false);
        if self.runs.len() != before {
            // Hyphenation grew the run vector; the current paragraph's
            // extremes are stale.
            let first = self.paragraphs.last().map(|p| p.first_run).unwrap_or(0);
            self.recompute_extremes_from(first);
        }
    }

    /// Rebuilds all lines at or after `wrap_ref_line` from the
    /// unchanged run vector.
    pub fn rewrap(&mut self) {
        trace!(target: LOG_TARGET, wrap_ref_line = self.wrap_ref_line, "entering rewrap");
        let resume_run = self.lines.get(self.wrap_ref_line).map(|l| l.first_run).unwrap_or(0);
        self.lines.truncate(self.wrap_ref_line);
        self.wrapped_until_run = resume_run;
        if !self.runs.is_empty() {
            self.word_wrap(self.runs.len() - 1, true);
        }
        trace!(target: LOG_TARGET, lines = self.lines.len(), "leaving rewrap");
    }

    /// Finalizes lines up to the last run, inserting a temporary empty
    /// text run if the last real run is an `OofRef` so the final line
    /// still covers every run.
    pub fn show_missing_lines(&mut self) {
        if matches!(self.runs.last(), Some(Run::OofRef)) {
            self.runs.push(Run::Text {
                start: self.text_zone.len() as u32,
                end: self.text_zone.len() as u32,
                style: self.runs_last_text_style(),
                font: 0,
                width: 0,
                ascent: 0,
                descent: 0,
                flags: RunFlags::empty(),
                hyphen_width: 0,
                space: None,
            });
        }
        if !self.runs.is_empty() {
            self.word_wrap(self.runs.len() - 1, true);
        }
    }

    fn runs_last_text_style(&self) -> StyleId {
        self.runs
            .iter()
            .rev()
            .find_map(|r| match r {
                Run::Text { style, .. } => Some(*style),
                _ => None,
            })
            .unwrap_or_else(|| {
                self.styles
                    .borrow_mut()
                    .intern(StyleAttrs::plain(crate::length::Abs(0), crate::length::Abs(0), crate::length::Abs(0)))
            })
    }

    /// Returns `(minWidth, maxWidth)` across all paragraphs, plus
    /// intrinsic variants that ignore widget-induced lower bounds.
    pub fn get_extremes(&self) -> Extremes {
        let mut extremes = Extremes::default();
        for p in &self.paragraphs {
            extremes.min_width = extremes.min_width.max(p.max_par_min);
            extremes.max_width = extremes.max_width.max(p.max_par_max);
            extremes.min_width_intrinsic = extremes.min_width_intrinsic.max(p.par_min_intrinsic);
            extremes.max_width_intrinsic = extremes.max_width_intrinsic.max(p.par_max_intrinsic);
        }
        extremes
    }

    fn recompute_extremes_from(&mut self, first_run: usize) {
        let mut par = Paragraph::reset_at(first_run);
        for (i, run) in self.runs.iter().enumerate().skip(first_run) {
            let w = run.width();
            par.last_run = i;
            par.par_min = par_min_increment(par.par_min, run);
            par.par_max += w;
            par.par_min_intrinsic = par.par_min_intrinsic.max(w);
            par.par_max_intrinsic += w;
            par.max_par_min = par.max_par_min.max(par.par_min);
            par.max_par_max = par.max_par_max.max(par.par_max);
            if run.is_break() {
                self.paragraphs.retain(|p| p.first_run < first_run);
                self.paragraphs.push(par.clone());
                par = Paragraph::reset_at(i + 1);
            }
        }
        self.paragraphs.retain(|p| p.first_run < first_run);
        self.paragraphs.push(par);
    }

    /// Core break search + hyphenation + line emission, driven from run
    /// index `from` through `to` inclusive. `force_full` replays the
    /// whole unwrapped suffix (used by `rewrap`/`show_missing_lines`);
    /// otherwise only the newly appended run is considered.
    fn word_wrap(&mut self, to: usize, force_full: bool) {
        while self.wrapped_until_run <= to {
            let first_run = self.wrapped_until_run;
            if first_run >= self.runs.len() {
                break;
            }
            let (last_run, metrics) = self.break_one_line(first_run);
            self.emit_line(first_run, last_run, metrics);
            self.wrapped_until_run = last_run + 1;
            if last_run >= to && !force_full {
                break;
            }
        }
    }

    /// Finds the best break position starting at `first_run`, trying a
    /// hyphenation pass if the unhyphenated result is too tight, and
    /// returns the chosen last-run index plus its line metrics.
    fn break_one_line(&mut self, first_run: usize) -> (usize, LineMetrics) {
        let top = self.lines.last().map(|l| l.top + l.height() + l.break_space).unwrap_or(0);
        let mut height_estimate = self.runs[first_run].ascent() + self.runs[first_run].descent();

        for _ in 0..MAX_HEIGHT_ITERATIONS {
            let left_border = self.oof.get_left_border(top, height_estimate.max(1));
            let right_border = self.oof.get_right_border(top, height_estimate.max(1));
            let ideal = (self.available_width - left_border - right_border).max(0);

            let (last_run, mut metrics) = self.search_break(first_run, ideal, left_border, right_border, top);

            if matches!(metrics.badness, crate::badness::Badness::TooTight)
                && self.try_hyphenate_for_tightness(first_run, last_run).is_some()
            {
                // Run vector grew; restart the search over the same
                // first_run with the (now finer-grained) runs.
                continue;
            }

            let new_height = metrics.content_ascent + metrics.content_descent;
            if new_height <= height_estimate {
                metrics.top = top;
                return (last_run, metrics);
            }
            height_estimate = new_height;
        }

        // Fallback: take whatever the last iteration produced.
        let left_border = self.oof.get_left_border(top, height_estimate.max(1));
        let right_border = self.oof.get_right_border(top, height_estimate.max(1));
        let ideal = (self.available_width - left_border - right_border).max(0);
        let (last_run, mut metrics) = self.search_break(first_run, ideal, left_border, right_border, top);
        metrics.top = top;
        (last_run, metrics)
    }

    fn search_break(
        &self,
        first_run: usize,
        ideal: i32,
        left_border: i32,
        right_border: i32,
        top: i32,
    ) -> (usize, LineMetrics) {
        let alignment = self.line_alignment(first_run);
        let justify = alignment.is_none();
        let alignment = alignment.unwrap_or(Alignment::Left);

        let mut width = 0i32;
        let mut stretch = if justify {
            0
        } else {
            let (a, d) = self.line_style_metrics(first_run);
            self.stretchability_factor * (a + d) / 100
        };
        let mut shrink = 0i32;
        let mut ascent = 0i32;
        let mut descent = 0i32;

        let mut best: Option<(usize, BadnessAndPenalty, i32, i32, i32, i32, i32)> = None;
        let last_index = self.runs.len() - 1;

        for b in first_run..=last_index {
            let run = &self.runs[b];
            width += run.width();
            ascent = ascent.max(run.ascent());
            descent = descent.max(run.descent());

            let hyphen_extra = match run {
                Run::Text { hyphen_width, flags, .. }
                    if flags.contains(RunFlags::DIV_CHAR_AT_EOL) =>
                {
                    *hyphen_width
                }
                _ => 0,
            };

            let forced = run.is_break();
            let has_space = run.space().is_some();
            let is_last = b == last_index;

            if forced || has_space || is_last {
                let trial_width = width + hyphen_extra;
                let penalty = if forced {
                    PenaltyPair(Penalty::Force, Penalty::Force)
                } else if is_last && !has_space {
                    PenaltyPair(Penalty::Force, Penalty::Force)
                } else {
                    PenaltyPair(Penalty::from_external(0), Penalty::from_external(0))
                };
                let bp = BadnessAndPenalty::compute(trial_width, ideal, stretch, shrink, penalty);
                if best.as_ref().map(|(_, best_bp, ..)| bp <= *best_bp).unwrap_or(true) {
                    best = Some((b, bp, trial_width, stretch, shrink, ascent, descent));
                }
                if forced {
                    break;
                }
            }

            if let Some((glue, style)) = run.space() {
                width += glue.width;
                if self.style_justify(style) {
                    stretch += glue.width / 2;
                    shrink += glue.width / 3;
                }
            }
        }

        let (last_run, bp, total_width, total_stretch, total_shrink, content_ascent, content_descent) =
            best.expect("every line has at least one candidate break: the final run always qualifies");

        let break_space = match &self.runs[last_run] {
            Run::Break { min_break_space } => *min_break_space,
            _ => 0,
        };

        let do_justify = justify && !self.is_final_line(last_run) && total_width <= ideal;
        let text_offset =
            self.compute_text_offset(alignment, left_border, right_border, total_width, ideal).max(left_border);

        let metrics = LineMetrics {
            badness: bp.badness,
            alignment,
            left_offset: left_border,
            right_offset: right_border,
            text_offset,
            content_ascent,
            content_descent,
            margin_ascent: content_ascent,
            margin_descent: content_descent,
            break_space,
            top,
            width: total_width,
            ideal,
            stretch: total_stretch,
            shrink: total_shrink,
            justify: do_justify,
        };
        (last_run, metrics)
    }

    fn compute_text_offset(&self, alignment: Alignment, left: i32, right: i32, width: i32, ideal: i32) -> i32 {
        match alignment {
            Alignment::Left => left,
            Alignment::Right => left + (ideal - width).max(0),
            Alignment::Center => left + (ideal - width).max(0) / 2,
        }
    }

    fn is_final_line(&self, last_run: usize) -> bool {
        last_run + 1 >= self.runs.len()
    }

    fn line_alignment(&self, first_run: usize) -> Option<Alignment> {
        for run in &self.runs[first_run..] {
            if let Run::Text { style, .. } = run {
                return if self.style_justify(*style) { None } else { Some(Alignment::Left) };
            }
            if run.is_oof_ref() {
                continue;
            }
            break;
        }
        Some(Alignment::Left)
    }

    fn style_justify(&self, style: StyleId) -> bool {
        self.styles.borrow().resolve(style).justify
    }

    fn line_style_metrics(&self, first_run: usize) -> (i32, i32) {
        let run = &self.runs[first_run];
        (run.ascent(), run.descent())
    }

    fn emit_line(&mut self, first_run: usize, last_run: usize, metrics: LineMetrics) {
        let max_line_width = self.lines.last().map(|l| l.max_line_width).unwrap_or(0).max(metrics.width);
        let last_oof = self.lines.last().map(|l| l.last_oof_ref_positioned_before_this_line).unwrap_or(0);

        if metrics.justify {
            self.apply_justification(first_run, last_run, metrics.ideal - metrics.width);
        }

        self.lines.push(Line {
            first_run,
            last_run,
            alignment: metrics.alignment,
            left_offset: metrics.left_offset,
            right_offset: metrics.right_offset,
            text_offset: metrics.text_offset,
            border_ascent: metrics.content_ascent,
            border_descent: metrics.content_descent,
            margin_ascent: metrics.margin_ascent,
            margin_descent: metrics.margin_descent,
            content_ascent: metrics.content_ascent,
            content_descent: metrics.content_descent,
            break_space: metrics.break_space,
            top: metrics.top,
            max_line_width,
            last_oof_ref_positioned_before_this_line: last_oof,
        });
    }

    /// Distributes `diff` (positive = stretch, negative = shrink) over
    /// the justified spaces in `[first_run, last_run)` using cumulative
    /// rounding so the parts sum to exactly `diff`.
    fn apply_justification(&mut self, first_run: usize, last_run: usize, diff: i32) {
        if diff == 0 {
            return;
        }
        let space_indices: Vec<usize> =
            (first_run..last_run).filter(|&i| self.runs[i].space().is_some()).collect();
        if space_indices.is_empty() {
            return;
        }
        let budgets: Vec<i64> = space_indices
            .iter()
            .map(|&i| {
                let (glue, style) = self.runs[i].space().unwrap();
                if !self.style_justify(style) {
                    return 0;
                }
                (if diff > 0 { glue.stretch } else { glue.shrink }) as i64
            })
            .collect();
        let total_budget: i64 = budgets.iter().sum();
        if total_budget == 0 {
            return;
        }
        // Weight each space's share of `diff` by its stretch/shrink
        // budget, scaled to a common denominator before the cumulative
        // rounding pass so spaces with zero budget get zero extra.
        let scaled: Vec<i64> = budgets.iter().map(|&b| b * diff as i64).collect();
        let shares = distribute_scaled(&scaled, total_budget);
        for (&i, share) in space_indices.iter().zip(shares) {
            if let Run::Text { space: Some((glue, _)), .. } | Run::InlineWidget { space: Some((glue, _)), .. } =
                &mut self.runs[i]
            {
                glue.width = (glue.width as i64 + share).max(0) as i32;
            }
        }
    }

    fn try_hyphenate_for_tightness(&mut self, first_run: usize, last_run: usize) -> Option<usize> {
        let hyphenator = self.hyphenator.clone()?;
        let candidate = (first_run..=last_run).rev().find(|&i| self.is_whole_hyphenatable_word(i))?;
        self.hyphenate_run(candidate, &hyphenator)
    }

    fn is_whole_hyphenatable_word(&self, i: usize) -> bool {
        matches!(&self.runs[i], Run::Text { flags, .. } if flags.contains(RunFlags::CAN_BE_HYPHENATED))
    }

    /// Replaces run `i` (a single word) with N+1 sub-word runs at the
    /// hyphenator's candidate break positions. Returns the number of
    /// runs inserted beyond the original one, or `None` if the word had
    /// no candidate breaks.
    fn hyphenate_run(&mut self, i: usize, hyphenator: &Hyphenator) -> Option<usize> {
        let (start, end, style, font, flags_orig) = match &self.runs[i] {
            Run::Text { start, end, style, font, flags, .. } => (*start, *end, *style, *font, *flags),
            _ => return None,
        };
        let word = &self.text_zone[start as usize..end as usize];
        let breaks = hyphenator.hyphenate(word);
        if breaks.is_empty() {
            return None;
        }

        debug!(target: LOG_TARGET, word, breaks = breaks.len(), "hyphenating tight line's last word");

        let mut boundaries = vec![0usize];
        boundaries.extend(breaks.iter().copied());
        boundaries.push(word.len());

        let n = boundaries.len() - 1;
        let mut new_runs = Vec::with_capacity(n);
        for k in 0..n {
            let piece_start = start + boundaries[k] as u32;
            let piece_end = start + boundaries[k + 1] as u32;
            let piece = &self.text_zone[piece_start as usize..piece_end as usize];
            let is_last_piece = k == n - 1;

            let mut flags = RunFlags::DRAW_AS_ONE_TEXT | RunFlags::UNBREAKABLE_FOR_MIN_WIDTH;
            if k == 0 {
                flags |= flags_orig & RunFlags::WORD_START;
            }
            if is_last_piece {
                flags |= flags_orig & RunFlags::WORD_END;
            } else {
                flags |= RunFlags::DIV_CHAR_AT_EOL;
            }

            new_runs.push(Run::Text {
                start: piece_start,
                end: piece_end,
                style,
                font,
                width: piece.len() as i32 * 6,
                ascent: 0,
                descent: 0,
                flags,
                hyphen_width: if is_last_piece { 0 } else { self.hyphen_width },
                space: if is_last_piece { self.runs[i].space() } else { None },
            });
        }

        let inserted = new_runs.len() - 1;
        self.runs.splice(i..=i, new_runs);
        Some(inserted)
    }
}

fn par_min_increment(current: i32, run: &Run) -> i32 {
    if run.flags().contains(RunFlags::UNBREAKABLE_FOR_MIN_WIDTH) {
        current
    } else {
        current.max(run.width())
    }
}

/// Splits `scaled` (each already multiplied by `diff`) over
/// `total_budget`, using the same cumulative-rounding discipline as
/// [`distribute_rounded`] but weighted rather than uniform.
fn distribute_scaled(scaled: &[i64], total_budget: i64) -> Vec<i64> {
    let mut shares = Vec::with_capacity(scaled.len());
    let mut running = 0i64;
    let mut previous = 0i64;
    let mut cumulative = 0i64;
    for &s in scaled {
        cumulative += s;
        running = if cumulative >= 0 {
            (cumulative + total_budget / 2) / total_budget
        } else {
            -((-cumulative + total_budget / 2) / total_budget)
        };
        shares.push(running - previous);
        previous = running;
    }
    shares
}

struct LineMetrics {
    badness: crate::badness::Badness,
    alignment: Alignment,
    left_offset: i32,
    right_offset: i32,
    text_offset: i32,
    content_ascent: i32,
    content_descent: i32,
    margin_ascent: i32,
    margin_descent: i32,
    break_space: i32,
    top: i32,
    width: i32,
    ideal: i32,
    stretch: i32,
    shrink: i32,
    justify: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::length::Abs;

    fn plain_style(interner: &mut StyleInterner) -> StyleId {
        interner.intern(StyleAttrs::plain(Abs(10), Abs(2), Abs(4)))
    }

    fn new_breaker(available_width: i32, interner: Rc<RefCell<StyleInterner>>) -> LineBreaker {
        LineBreaker::new(available_width, interner)
    }

    #[test]
    fn single_short_word_makes_one_line() {
        let interner = Rc::new(RefCell::new(StyleInterner::new()));
        let style = plain_style(&mut interner.borrow_mut());
        let mut lb = new_breaker(100, interner);
        lb.append_text_run("hi", style, 0, 20, 10, 2, RunFlags::WORD_START | RunFlags::WORD_END, None);
        lb.show_missing_lines();
        assert_eq!(lb.lines().len(), 1);
        assert_eq!(lb.lines()[0].first_run, 0);
        assert_eq!(lb.lines()[0].last_run, 0);
    }

    #[test]
    fn forced_break_ends_a_line_immediately() {
        let interner = Rc::new(RefCell::new(StyleInterner::new()));
        let style = plain_style(&mut interner.borrow_mut());
        let mut lb = new_breaker(100, interner);
        lb.append_text_run("hi", style, 0, 20, 10, 2, RunFlags::WORD_START | RunFlags::WORD_END, None);
        lb.append_run(Run::Break { min_break_space: 4 });
        lb.append_text_run("bye", style, 0, 20, 10, 2, RunFlags::WORD_START | RunFlags::WORD_END, None);
        lb.show_missing_lines();
        assert_eq!(lb.lines().len(), 2);
        assert_eq!(lb.lines()[0].last_run, 1);
        assert_eq!(lb.lines()[1].first_run, 2);
    }

    #[test]
    fn lines_partition_the_run_range_with_no_gaps() {
        let interner = Rc::new(RefCell::new(StyleInterner::new()));
        let style = plain_style(&mut interner.borrow_mut());
        let mut lb = new_breaker(50, interner);
        for word in ["one", "two", "three", "four", "five"] {
            lb.append_text_run(
                word,
                style,
                0,
                30,
                10,
                2,
                RunFlags::WORD_START | RunFlags::WORD_END,
                Some((SpaceGlue { width: 5, stretch: 2, shrink: 1 }, style)),
            );
        }
        lb.show_missing_lines();
        assert!(crate::line::lines_partition_run_range(lb.lines(), lb.runs().len() - 1));
    }

    #[test]
    fn line_top_is_non_decreasing() {
        let interner = Rc::new(RefCell::new(StyleInterner::new()));
        let style = plain_style(&mut interner.borrow_mut());
        let mut lb = new_breaker(40, interner);
        for word in ["aa", "bb", "cc", "dd"] {
            lb.append_text_run(
                word,
                style,
                0,
                30,
                10,
                2,
                RunFlags::WORD_START | RunFlags::WORD_END,
                Some((SpaceGlue { width: 5, stretch: 2, shrink: 1 }, style)),
            );
        }
        lb.show_missing_lines();
        let mut last_top = i32::MIN;
        for line in lb.lines() {
            assert!(line.top >= last_top);
            last_top = line.top;
        }
    }

    #[test]
    fn get_extremes_reports_widest_paragraph() {
        let interner = Rc::new(RefCell::new(StyleInterner::new()));
        let style = plain_style(&mut interner.borrow_mut());
        let mut lb = new_breaker(1000, interner);
        lb.append_text_run("hello", style, 0, 40, 10, 2, RunFlags::WORD_START | RunFlags::WORD_END, None);
        lb.show_missing_lines();
        let extremes = lb.get_extremes();
        assert!(extremes.max_width >= 40);
    }
}
