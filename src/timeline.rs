use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive range of week numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: u32,
    pub end: u32,
}

impl WeekRange {
    /// Build a range from two endpoints given in any order.
    pub fn between(a: u32, b: u32) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Closed-interval overlap: two ranges overlap when they share a week.
    pub fn overlaps(&self, other: &WeekRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, week: u32) -> bool {
        self.start <= week && week <= self.end
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }
}

impl std::fmt::Display for WeekRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "week {}", self.start)
        } else {
            write!(f, "weeks {}-{}", self.start, self.end)
        }
    }
}

/// The bounded week domain `1..=total_weeks` of a training plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    total_weeks: u32,
    #[serde(default)]
    starts_on: Option<NaiveDate>,
}

impl Timeline {
    /// A timeline always holds at least one week; `0` is raised to `1`.
    pub fn new(total_weeks: u32) -> Self {
        Self {
            total_weeks: total_weeks.max(1),
            starts_on: None,
        }
    }

    /// Anchor week 1 to a calendar date.
    pub fn starting_on(mut self, date: NaiveDate) -> Self {
        self.starts_on = Some(date);
        self
    }

    pub fn total_weeks(&self) -> u32 {
        self.total_weeks
    }

    pub fn starts_on(&self) -> Option<NaiveDate> {
        self.starts_on
    }

    pub fn contains(&self, week: u32) -> bool {
        week >= 1 && week <= self.total_weeks
    }

    pub fn is_valid_range(&self, start: u32, end: u32) -> bool {
        1 <= start && end <= self.total_weeks && start <= end
    }

    pub fn weeks(&self) -> impl Iterator<Item = u32> {
        1..=self.total_weeks
    }

    /// First and last calendar day of `week`, when the timeline is anchored.
    pub fn week_span(&self, week: u32) -> Option<(NaiveDate, NaiveDate)> {
        if !self.contains(week) {
            return None;
        }
        let first = self.starts_on? + Duration::weeks(i64::from(week - 1));
        Some((first, first + Duration::days(6)))
    }

    /// Calendar dates covered by a range, from the first day of `start`
    /// to the last day of `end`.
    pub fn range_span(&self, range: WeekRange) -> Option<(NaiveDate, NaiveDate)> {
        let (first, _) = self.week_span(range.start)?;
        let (_, last) = self.week_span(range.end)?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ranges_respect_bounds() {
        let t = Timeline::new(12);
        assert!(t.is_valid_range(1, 12));
        assert!(t.is_valid_range(4, 4));
        assert!(!t.is_valid_range(0, 3));
        assert!(!t.is_valid_range(5, 13));
        assert!(!t.is_valid_range(6, 5));
    }

    #[test]
    fn zero_weeks_is_raised_to_one() {
        let t = Timeline::new(0);
        assert_eq!(t.total_weeks(), 1);
        assert_eq!(t.weeks().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn overlap_is_closed_interval() {
        let a = WeekRange::between(2, 5);
        assert!(a.overlaps(&WeekRange::between(5, 8)));
        assert!(a.overlaps(&WeekRange::between(6, 4)));
        assert!(!a.overlaps(&WeekRange::between(6, 9)));
        assert!(!a.overlaps(&WeekRange::between(1, 1)));
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn week_span_uses_anchor_date() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let t = Timeline::new(4).starting_on(start);
        assert_eq!(
            t.week_span(2),
            Some((
                NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 19).unwrap()
            ))
        );
        assert_eq!(t.week_span(5), None);
        assert_eq!(Timeline::new(4).week_span(1), None);
        assert_eq!(
            t.range_span(WeekRange::between(1, 4)),
            Some((start, NaiveDate::from_ymd_opt(2025, 2, 2).unwrap()))
        );
    }
}
