pub mod path;

pub use path::finger_joint_path;

/// Joint gender of a panel edge.
///
/// Male edges carry protruding tabs, female edges carry indented slots,
/// `Plain` edges are straight and unjointed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Plain,
}

impl Gender {
    /// Edge mutability status, derived purely from joint gender.
    #[must_use]
    pub fn status(self) -> EdgeStatus {
        match self {
            Gender::Male => EdgeStatus::Locked,
            Gender::Female => EdgeStatus::OutwardOnly,
            Gender::Plain => EdgeStatus::Unlocked,
        }
    }
}

/// What can be done to an edge, given its joint.
///
/// - `Locked`: male tabs; the edge geometry is immutable.
/// - `OutwardOnly`: female slots; the edge may be extended outward.
/// - `Unlocked`: open; free to extend in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStatus {
    Locked,
    OutwardOnly,
    Unlocked,
}

/// Shared finger-joint layout for one world axis.
///
/// `points` holds the finger/hole transition positions in ascending absolute
/// axis coordinates. Every edge running along the axis consumes the same
/// record, which is what guarantees that mating tab and slot patterns align.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FingerPoints {
    /// Monotonic transition positions (absolute axis coordinates).
    pub points: Vec<f64>,
    /// Solid margin between the span start and the first transition.
    pub inner_offset: f64,
    /// Tab protrusion depth, equal to the material thickness.
    pub finger_length: f64,
    /// Full jointable span length on this axis.
    pub max_joint_length: f64,
}

impl FingerPoints {
    /// An empty record: edges along this axis render as straight lines.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lays out fingers symmetrically over `[span_start, span_end]`.
    ///
    /// The pattern is finger, gap, finger, ..., finger: `k` fingers of
    /// `finger_width` and `k - 1` gaps of `finger_gap`, centered in the span
    /// so both ends carry equal solid margins merged into the end fingers.
    /// Spans too short for two fingers and one gap produce an empty record.
    #[must_use]
    pub fn for_span(
        span_start: f64,
        span_end: f64,
        finger_width: f64,
        finger_gap: f64,
        thickness: f64,
    ) -> Self {
        let length = span_end - span_start;
        if finger_width <= 0.0 || finger_gap <= 0.0 || length <= 0.0 {
            return Self::empty();
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fingers = ((length + finger_gap) / (finger_width + finger_gap)).floor() as usize;
        if fingers < 2 {
            return Self::empty();
        }

        #[allow(clippy::cast_precision_loss)]
        let used = fingers as f64 * finger_width + (fingers - 1) as f64 * finger_gap;
        let margin = (length - used) / 2.0;

        let mut points = Vec::with_capacity(2 * (fingers - 1));
        let mut cursor = span_start + margin + finger_width;
        for _ in 0..fingers - 1 {
            points.push(cursor);
            cursor += finger_gap;
            points.push(cursor);
            cursor += finger_width;
        }

        Self {
            points,
            inner_offset: margin,
            finger_length: thickness,
            max_joint_length: length,
        }
    }

    /// Index of the section containing `pos`, counting sections from the
    /// span start. Even indices are finger (solid) sections.
    ///
    /// `forward` selects which side of an exactly-coincident transition the
    /// position belongs to: `true` takes the section ahead in ascending axis
    /// order, `false` the one behind.
    #[must_use]
    pub fn section_at(&self, pos: f64, forward: bool) -> usize {
        let eps = 1e-9;
        if forward {
            self.points.partition_point(|&q| q <= pos + eps)
        } else {
            self.points.partition_point(|&q| q < pos - eps)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_symmetric() {
        // 100mm span, 10mm fingers, 10mm gaps: 5 fingers + 4 gaps = 90mm,
        // leaving a 5mm margin at each end.
        let fp = FingerPoints::for_span(0.0, 100.0, 10.0, 10.0, 3.0);
        assert_eq!(fp.points.len(), 8);
        assert!((fp.inner_offset - 5.0).abs() < 1e-9);
        assert!((fp.points[0] - 15.0).abs() < 1e-9);
        assert!((fp.points[7] - 85.0).abs() < 1e-9);
        // Mirror symmetry about the span center.
        for (a, b) in fp.points.iter().zip(fp.points.iter().rev()) {
            assert!((a + b - 100.0).abs() < 1e-9, "asymmetric: {a} vs {b}");
        }
    }

    #[test]
    fn short_span_is_empty() {
        let fp = FingerPoints::for_span(0.0, 15.0, 10.0, 10.0, 3.0);
        assert!(fp.points.is_empty());
    }

    #[test]
    fn transitions_are_monotonic() {
        let fp = FingerPoints::for_span(-20.0, 140.0, 8.0, 6.0, 3.0);
        for w in fp.points.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn section_parity() {
        let fp = FingerPoints::for_span(0.0, 100.0, 10.0, 10.0, 3.0);
        // Span start is inside the first finger section.
        assert_eq!(fp.section_at(0.0, true), 0);
        // Just past the first transition (15.0) is a gap section.
        assert_eq!(fp.section_at(16.0, true) % 2, 1);
        // Span center falls in a finger (odd finger count).
        assert_eq!(fp.section_at(50.0, true) % 2, 0);
    }

    #[test]
    fn status_from_gender() {
        assert_eq!(Gender::Male.status(), EdgeStatus::Locked);
        assert_eq!(Gender::Female.status(), EdgeStatus::OutwardOnly);
        assert_eq!(Gender::Plain.status(), EdgeStatus::Unlocked);
    }
}
