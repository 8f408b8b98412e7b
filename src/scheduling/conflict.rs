//! Advisory overlap detection for room bookings.
//!
//! This only keeps the grid from offering obviously double-booked slots; the
//! backend remains the authority on conflicting writes.

/// Half-open interval `[start, end)` in minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    pub start: u32,
    pub end: u32,
}

impl TimeSpan {
    pub fn new(start: u32, duration_minutes: u32) -> Self {
        Self {
            start,
            end: start.saturating_add(duration_minutes),
        }
    }

    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        has_conflict(*self, *other)
    }

    pub fn contains_minute(&self, minute: u32) -> bool {
        minute >= self.start && minute < self.end
    }

    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

/// `s1 < e2 && e1 > s2`; touching intervals do not conflict
pub fn has_conflict(first: TimeSpan, second: TimeSpan) -> bool {
    first.start < second.end && first.end > second.start
}

/// First booking that overlaps `candidate`, by id
pub fn find_conflict<'a, I>(candidate: TimeSpan, bookings: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, TimeSpan)>,
{
    bookings
        .into_iter()
        .find(|(_, span)| has_conflict(candidate, *span))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(600, 90, 600, 60, true ; "same start")]
    #[test_case(540, 90, 600, 90, true ; "tail overlaps head")]
    #[test_case(620, 10, 600, 90, true ; "contained")]
    #[test_case(540, 60, 600, 90, false ; "adjacent before")]
    #[test_case(690, 30, 600, 90, false ; "adjacent after")]
    #[test_case(800, 60, 600, 90, false ; "disjoint")]
    fn test_has_conflict(s1: u32, d1: u32, s2: u32, d2: u32, expected: bool) {
        let first = TimeSpan::new(s1, d1);
        let second = TimeSpan::new(s2, d2);
        assert_eq!(has_conflict(first, second), expected);
        assert_eq!(has_conflict(second, first), expected);
    }

    #[test]
    fn test_find_conflict_returns_first_overlapping_id() {
        let bookings = vec![
            ("a", TimeSpan::new(480, 60)),
            ("b", TimeSpan::new(600, 90)),
            ("c", TimeSpan::new(650, 30)),
        ];
        assert_eq!(find_conflict(TimeSpan::new(630, 60), bookings.clone()), Some("b"));
        assert_eq!(find_conflict(TimeSpan::new(540, 60), bookings), None);
    }

    #[test]
    fn test_span_contains_minute_is_half_open() {
        let span = TimeSpan::new(600, 90);
        assert!(span.contains_minute(600));
        assert!(span.contains_minute(689));
        assert!(!span.contains_minute(690));
        assert_eq!(span.duration(), 90);
    }
}
