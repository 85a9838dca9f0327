// LogTrim - core/segments.rs
//
// Interval algebra over removed time ranges.
//
// The canonical edit state is "what to remove": cut operations compose by
// union + merge, and "trim to selection" is one inversion of the kept
// segment within the log bounds. Representing the complement instead would
// need two divergent code paths for what is mathematically one operation.
//
// Containment at segment boundaries is closed (`start <= t <= end`) and
// is used consistently everywhere a timestamp is tested, so boundary
// records are removed by the segment that names them.

use crate::core::model::TimeRange;
use crate::util::error::SegmentError;
use serde::Serialize;

// =============================================================================
// Segment
// =============================================================================

/// A closed time interval `[start, end]` in seconds with `start < end`.
///
/// The invariant is enforced at construction; an inverted or empty segment
/// is a hard error, never silently coerced, so a user-selection bug
/// surfaces at the point it happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    start: f64,
    end: f64,
}

impl Segment {
    pub fn new(start: f64, end: f64) -> Result<Self, SegmentError> {
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(SegmentError::Invalid { start, end });
        }
        Ok(Self { start, end })
    }

    /// Internal constructor for spans already known to satisfy the
    /// invariant (gap walks, merges).
    fn new_unchecked(start: f64, end: f64) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Closed-interval containment.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Check this segment lies within the given log bounds.
    pub fn validate(&self, bounds: TimeRange) -> Result<(), SegmentError> {
        if self.start < bounds.start || self.end > bounds.end {
            return Err(SegmentError::OutOfRange {
                start: self.start,
                end: self.end,
                bounds_start: bounds.start,
                bounds_end: bounds.end,
            });
        }
        Ok(())
    }
}

// =============================================================================
// SegmentSet
// =============================================================================

/// An immutable, normalized set of disjoint segments.
///
/// Invariant: sorted by start, pairwise disjoint, with touching segments
/// merged (`segments[i].end < segments[i+1].start` strictly). Every
/// constructor normalizes, so any value of this type is a normalized view
/// of whatever union of raw ranges produced it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SegmentSet {
    segments: Vec<Segment>,
}

impl SegmentSet {
    /// The empty set (nothing removed).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sort by start and merge overlapping or touching segments.
    ///
    /// Stable: the result is identical regardless of input order. Inputs
    /// are valid by construction (`Segment::new`), so normalization itself
    /// cannot fail.
    pub fn normalize(raw: impl IntoIterator<Item = Segment>) -> Self {
        let mut ordered: Vec<Segment> = raw.into_iter().collect();
        ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut merged: Vec<Segment> = Vec::with_capacity(ordered.len());
        for seg in ordered {
            match merged.last_mut() {
                // Touching counts as overlap: exactly-adjacent segments
                // merge rather than sit side by side.
                Some(last) if seg.start <= last.end => {
                    last.end = last.end.max(seg.end);
                }
                _ => merged.push(seg),
            }
        }
        Self { segments: merged }
    }

    /// Union with one more segment, re-normalized.
    pub fn add(&self, seg: Segment) -> Self {
        let mut raw = self.segments.clone();
        raw.push(seg);
        Self::normalize(raw)
    }

    /// Check every segment lies within the log bounds. The first offending
    /// segment is named in the error.
    pub fn validate(&self, bounds: TimeRange) -> Result<(), SegmentError> {
        for seg in &self.segments {
            seg.validate(bounds)?;
        }
        Ok(())
    }

    /// Complement within `bounds`: the maximal set of gaps between
    /// segments.
    ///
    /// This one algorithm serves both directions of the edit model:
    /// inverting a kept selection yields the remove set ("trim"), and
    /// inverting the remove set yields the keep ranges.
    pub fn invert(&self, bounds: TimeRange) -> Self {
        let mut gaps = Vec::new();
        let mut cursor = bounds.start;
        for seg in &self.segments {
            if cursor >= bounds.end {
                break;
            }
            if cursor < seg.start {
                gaps.push(Segment::new_unchecked(cursor, seg.start.min(bounds.end)));
            }
            cursor = cursor.max(seg.end);
        }
        if cursor < bounds.end {
            gaps.push(Segment::new_unchecked(cursor, bounds.end));
        }
        Self { segments: gaps }
    }

    /// Intersect each segment with `bounds`, dropping segments that become
    /// empty or inverted.
    pub fn clamp(&self, bounds: TimeRange) -> Self {
        let clamped = self.segments.iter().filter_map(|seg| {
            let start = seg.start.max(bounds.start);
            let end = seg.end.min(bounds.end);
            (start < end).then(|| Segment::new_unchecked(start, end))
        });
        // Clamping preserves order and disjointness.
        Self {
            segments: clamped.collect(),
        }
    }

    /// Closed-interval membership across the whole set.
    pub fn contains(&self, t: f64) -> bool {
        // Sorted and disjoint, so a binary search on start would do; the
        // sets here are a handful of user edits, a scan is simpler.
        self.segments.iter().any(|seg| seg.contains(t))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }
}

impl From<Segment> for SegmentSet {
    fn from(seg: Segment) -> Self {
        Self {
            segments: vec![seg],
        }
    }
}

/// Convert a "keep this range" selection into the equivalent "remove
/// everything else" set: the inversion of the single kept segment within
/// the log bounds.
pub fn trim_to_selection(bounds: TimeRange, selection: Segment) -> Result<SegmentSet, SegmentError> {
    selection.validate(bounds)?;
    Ok(SegmentSet::from(selection).invert(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> Segment {
        Segment::new(start, end).unwrap()
    }

    fn set(raw: &[(f64, f64)]) -> SegmentSet {
        SegmentSet::normalize(raw.iter().map(|&(s, e)| seg(s, e)))
    }

    fn pairs(s: &SegmentSet) -> Vec<(f64, f64)> {
        s.iter().map(|x| (x.start(), x.end())).collect()
    }

    #[test]
    fn test_invalid_segment_rejected_at_construction() {
        assert!(matches!(
            Segment::new(5.0, 3.0),
            Err(SegmentError::Invalid { .. })
        ));
        assert!(matches!(
            Segment::new(2.0, 2.0),
            Err(SegmentError::Invalid { .. })
        ));
        assert!(Segment::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_normalize_merges_overlaps() {
        let s = set(&[(0.0, 2.0), (1.0, 3.0), (4.0, 5.0)]);
        assert_eq!(pairs(&s), vec![(0.0, 3.0), (4.0, 5.0)]);
    }

    #[test]
    fn test_normalize_merges_touching_segments() {
        let s = set(&[(0.0, 2.0), (2.0, 4.0)]);
        assert_eq!(pairs(&s), vec![(0.0, 4.0)]);
    }

    #[test]
    fn test_normalize_is_order_independent() {
        let a = set(&[(4.0, 5.0), (0.0, 2.0), (1.0, 3.0)]);
        let b = set(&[(0.0, 2.0), (1.0, 3.0), (4.0, 5.0)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let s = set(&[(0.0, 2.0), (1.0, 3.0), (6.0, 7.0), (6.5, 9.0)]);
        let again = SegmentSet::normalize(s.iter().copied());
        assert_eq!(s, again);
    }

    #[test]
    fn test_disjoint_segments_pass_through_sorted() {
        let s = set(&[(6.0, 7.0), (0.0, 1.0), (3.0, 4.0)]);
        assert_eq!(pairs(&s), vec![(0.0, 1.0), (3.0, 4.0), (6.0, 7.0)]);
    }

    #[test]
    fn test_add_merges_into_existing() {
        // add_remove_segment([(0,2)], (1,3)) -> [(0,3)]
        let s = set(&[(0.0, 2.0)]).add(seg(1.0, 3.0));
        assert_eq!(pairs(&s), vec![(0.0, 3.0)]);
    }

    #[test]
    fn test_invert_produces_keep_ranges() {
        // bounds (0,10), remove [(2,4),(6,7)] -> keep [(0,2),(4,6),(7,10)]
        let bounds = TimeRange::new(0.0, 10.0);
        let keep = set(&[(2.0, 4.0), (6.0, 7.0)]).invert(bounds);
        assert_eq!(pairs(&keep), vec![(0.0, 2.0), (4.0, 6.0), (7.0, 10.0)]);
    }

    #[test]
    fn test_invert_of_empty_set_is_full_bounds() {
        let bounds = TimeRange::new(1.0, 9.0);
        assert_eq!(pairs(&SegmentSet::empty().invert(bounds)), vec![(1.0, 9.0)]);
    }

    #[test]
    fn test_invert_of_full_bounds_is_empty() {
        let bounds = TimeRange::new(0.0, 10.0);
        assert!(set(&[(0.0, 10.0)]).invert(bounds).is_empty());
    }

    #[test]
    fn test_invert_involution() {
        let bounds = TimeRange::new(0.0, 10.0);
        let s = set(&[(2.0, 4.0), (6.0, 7.0)]);
        assert_eq!(s.invert(bounds).invert(bounds), s);
    }

    #[test]
    fn test_invert_with_segment_at_bounds_edges() {
        let bounds = TimeRange::new(0.0, 10.0);
        let keep = set(&[(0.0, 3.0), (8.0, 10.0)]).invert(bounds);
        assert_eq!(pairs(&keep), vec![(3.0, 8.0)]);
    }

    #[test]
    fn test_invert_of_degenerate_bounds_is_empty() {
        // A single-record log has start == end; there is no gap to emit.
        let bounds = TimeRange::new(5.0, 5.0);
        assert!(SegmentSet::empty().invert(bounds).is_empty());
    }

    #[test]
    fn test_trim_to_selection_equals_invert_of_selection() {
        let bounds = TimeRange::new(0.0, 10.0);
        let sel = seg(3.0, 7.0);
        let trimmed = trim_to_selection(bounds, sel).unwrap();
        assert_eq!(trimmed, SegmentSet::from(sel).invert(bounds));
        assert_eq!(pairs(&trimmed), vec![(0.0, 3.0), (7.0, 10.0)]);
    }

    #[test]
    fn test_trim_to_selection_rejects_out_of_bounds() {
        let bounds = TimeRange::new(0.0, 10.0);
        assert!(matches!(
            trim_to_selection(bounds, seg(-1.0, 2.0)),
            Err(SegmentError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bounds = TimeRange::new(0.0, 10.0);
        assert!(set(&[(-1.0, 2.0)]).validate(bounds).is_err());
        assert!(set(&[(8.0, 12.0)]).validate(bounds).is_err());
        assert!(set(&[(2.0, 4.0)]).validate(bounds).is_ok());
    }

    #[test]
    fn test_clamp_intersects_and_drops_empty() {
        let bounds = TimeRange::new(2.0, 8.0);
        let s = set(&[(0.0, 3.0), (4.0, 5.0), (9.0, 11.0)]);
        assert_eq!(pairs(&s.clamp(bounds)), vec![(2.0, 3.0), (4.0, 5.0)]);
    }

    #[test]
    fn test_contains_is_closed_at_both_ends() {
        let s = set(&[(2.0, 4.0)]);
        assert!(s.contains(2.0));
        assert!(s.contains(3.0));
        assert!(s.contains(4.0));
        assert!(!s.contains(1.999));
        assert!(!s.contains(4.001));
    }

    #[test]
    fn test_repeated_adds_stay_disjoint() {
        let mut s = SegmentSet::empty();
        for &(a, b) in &[(0.0, 1.0), (0.5, 2.0), (2.0, 3.0), (5.0, 6.0), (4.0, 5.5)] {
            s = s.add(seg(a, b));
        }
        let p = pairs(&s);
        assert_eq!(p, vec![(0.0, 3.0), (4.0, 6.0)]);
        for w in p.windows(2) {
            assert!(w[0].1 < w[1].0, "segments overlap or touch: {p:?}");
        }
    }
}
