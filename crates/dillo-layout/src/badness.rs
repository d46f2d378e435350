//! Integer, float-free badness and penalty scoring for candidate line
//! breaks.

/// How far a candidate line's width is from ideal, saturating into a
/// small set of named "infinity" states at the extremes rather than
/// overflowing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Badness {
    /// The line is shorter than ideal and has no stretchability at all.
    NotStretchable,
    /// The line is far too loose (stretch ratio beyond the threshold).
    QuiteLoose,
    /// The line is too tight to shrink into its available width.
    TooTight,
    /// A finite, cubic badness value.
    Value(i64),
}

/// Rank used to compare [`Badness`] values: lower is better, and every
/// named state outranks (is worse than) any finite value.
fn badness_rank(b: Badness) -> (u8, i64) {
    match b {
        Badness::Value(v) => (0, v),
        Badness::TooTight => (1, 0),
        Badness::QuiteLoose => (2, 0),
        Badness::NotStretchable => (3, 0),
    }
}

impl PartialOrd for Badness {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Badness {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        badness_rank(*self).cmp(&badness_rank(*other))
    }
}

/// An additive break-site cost, as an `i64` scaled by `1_000_000`
/// (matching the badness cubic scale at ratio = ±100), or one of the two
/// mandatory/prohibited sentinels.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Penalty {
    /// This break must be taken.
    Force,
    /// This break must never be taken.
    Prohibit,
    Value(i64),
}

pub const PENALTY_SCALE: i64 = 1_000_000;

impl Penalty {
    pub fn from_external(p: i32) -> Penalty {
        Penalty::Value(p as i64 * PENALTY_SCALE)
    }

    fn rank(self) -> (u8, i64) {
        match self {
            Penalty::Prohibit => (3, 0),
            Penalty::Value(v) => (1, v),
            Penalty::Force => (0, 0),
        }
    }
}

impl PartialOrd for Penalty {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Penalty {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// The two penalty channels carried per candidate break: one for
/// ordinary layout, one consulted when only computing width extremes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PenaltyPair(pub Penalty, pub Penalty);

/// The comparable key attached to a candidate break: lexicographic on
/// badness "infinity levels" first, then penalty, then the finite
/// badness value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BadnessAndPenalty {
    pub badness: Badness,
    pub penalty: PenaltyPair,
}

impl BadnessAndPenalty {
    /// `ratio` is `100*(ideal-actual)/stretch_or_shrink`. `stretch` and
    /// `shrink` gate the `NotStretchable`/`TooTight` states.
    pub fn compute(width: i32, ideal: i32, stretch: i32, shrink: i32, penalty: PenaltyPair) -> BadnessAndPenalty {
        let badness = compute_badness(width, ideal, stretch, shrink);
        BadnessAndPenalty { badness, penalty }
    }

    /// The comparison key used by the break search: `(badness-rank,
    /// penalty-rank, penalty-value, badness-value)`.
    fn key(self) -> (u8, (u8, i64), (u8, i64)) {
        let penalty_level = match self.penalty.0 {
            Penalty::Force => 0,
            Penalty::Value(_) => 1,
            Penalty::Prohibit => 2,
        };
        (penalty_level, badness_rank(self.badness), self.penalty.0.rank())
    }
}

impl PartialOrd for BadnessAndPenalty {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BadnessAndPenalty {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

fn compute_badness(width: i32, ideal: i32, stretch: i32, shrink: i32) -> Badness {
    if width == ideal {
        return Badness::Value(0);
    }

    if width < ideal {
        if stretch == 0 {
            return Badness::NotStretchable;
        }
        let ratio = 100i64 * (ideal as i64 - width as i64) / stretch as i64;
        if ratio > 1024 {
            return Badness::QuiteLoose;
        }
        return Badness::Value(ratio.pow(3));
    }

    let ratio = if shrink == 0 { i64::MIN } else { -(100i64 * (width as i64 - ideal as i64) / shrink as i64) };
    if shrink == 0 || ratio <= -100 {
        return Badness::TooTight;
    }
    Badness::Value(ratio.abs().pow(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(p: Penalty) -> PenaltyPair {
        PenaltyPair(p, p)
    }

    #[test]
    fn exact_fit_is_zero_badness() {
        assert_eq!(compute_badness(100, 100, 10, 10), Badness::Value(0));
    }

    #[test]
    fn too_tight_without_shrink() {
        assert_eq!(compute_badness(120, 100, 0, 0), Badness::TooTight);
    }

    #[test]
    fn shrinkable_tight_line_has_cubic_badness() {
        // width=130, ideal=100, shrink=45: ratio = -100*30/45 = -66 (int div).
        assert_eq!(compute_badness(130, 100, 0, 45), Badness::Value(66i64.pow(3)));
    }

    #[test]
    fn not_stretchable_when_loose_without_stretch() {
        assert_eq!(compute_badness(80, 100, 0, 10), Badness::NotStretchable);
    }

    #[test]
    fn quite_loose_past_threshold() {
        assert_eq!(compute_badness(0, 10_300, 10, 10), Badness::QuiteLoose);
    }

    #[test]
    fn badness_ordering_prefers_finite_over_named_states() {
        assert!(Badness::Value(1000) < Badness::TooTight);
        assert!(Badness::TooTight < Badness::QuiteLoose);
        assert!(Badness::QuiteLoose < Badness::NotStretchable);
    }

    #[test]
    fn force_break_outranks_any_finite_penalty() {
        assert!(Penalty::Force < Penalty::Value(1_000_000_000));
        assert!(Penalty::Value(0) < Penalty::Prohibit);
    }

    #[test]
    fn penalty_infinity_dominates_badness() {
        let forced_but_tight = BadnessAndPenalty { badness: Badness::TooTight, penalty: pair(Penalty::Force) };
        let fine_but_prohibited = BadnessAndPenalty { badness: Badness::Value(5), penalty: pair(Penalty::Prohibit) };
        assert!(forced_but_tight < fine_but_prohibited);
    }

    #[test]
    fn external_penalty_scales_to_cube_of_ratio_100() {
        assert_eq!(Penalty::from_external(1), Penalty::Value(PENALTY_SCALE));
    }
}
