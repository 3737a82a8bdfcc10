//! Time windows and the chunking of a window into API-legal requests.

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::CountOptions;

/// Source of "now" for defaulting windows
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Window of unix timestamps (seconds) to count mentions over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: i64,
    pub until: i64,
}

/// One request-sized piece of a window. Both bounds are sent to the API as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub since: i64,
    pub until: i64,
}

impl TimeWindow {
    pub fn new(since: i64, until: i64) -> Self {
        Self { since, until }
    }

    /// `until` defaults to `now`, `since` to one hour before `until`.
    pub fn from_options(options: &CountOptions, now: DateTime<Utc>) -> Self {
        let until = options.mentions_until.unwrap_or(now);
        let since = options
            .mentions_since
            .unwrap_or_else(|| {
                until
                    .checked_sub_signed(TimeDelta::hours(1))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC)
            });

        Self {
            since: since.timestamp(),
            until: until.timestamp(),
        }
    }

    pub fn chunks(&self, max_chunk_seconds: i64) -> Chunks {
        Chunks {
            cursor: self.since,
            until: self.until,
            step: max_chunk_seconds.max(1),
        }
    }
}

/// Iterator over the chunks of a window.
///
/// Each chunk ends at `min(start + step, until)` and the next one starts one
/// second after it, so consecutive chunks never share a second.
#[derive(Debug, Clone)]
pub struct Chunks {
    cursor: i64,
    until: i64,
    step: i64,
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.cursor >= self.until {
            return None;
        }

        let since = self.cursor;
        let until = since.saturating_add(self.step).min(self.until);
        self.cursor = until.saturating_add(1);

        Some(Chunk { since, until })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::MAX_CHUNK_SECONDS;
    use chrono::TimeZone;

    #[test]
    fn chunks_match_documented_example() {
        let chunks: Vec<_> = TimeWindow::new(0, 50_000)
            .chunks(MAX_CHUNK_SECONDS)
            .collect();

        assert_eq!(
            chunks,
            vec![
                Chunk { since: 0, until: 21_600 },
                Chunk { since: 21_601, until: 43_201 },
                Chunk { since: 43_202, until: 50_000 },
            ]
        );
    }

    #[test]
    fn chunks_cover_window_without_gaps() {
        for (since, until, step) in [(0, 1, 1), (10, 100, 7), (5, 86_400 * 3, 21_600), (-50, 50, 33)] {
            let chunks: Vec<_> = TimeWindow::new(since, until).chunks(step).collect();

            assert_eq!(chunks.first().unwrap().since, since);
            assert_eq!(chunks.last().unwrap().until, until);
            for pair in chunks.windows(2) {
                assert_eq!(pair[1].since, pair[0].until + 1);
            }
            for chunk in &chunks {
                assert!(chunk.until - chunk.since <= step);
                assert!(chunk.since <= chunk.until);
            }
        }
    }

    #[test]
    fn empty_and_inverted_windows_yield_nothing() {
        assert_eq!(TimeWindow::new(100, 100).chunks(10).count(), 0);
        assert_eq!(TimeWindow::new(200, 100).chunks(10).count(), 0);
    }

    #[test]
    fn non_positive_step_still_terminates() {
        let chunks: Vec<_> = TimeWindow::new(0, 3).chunks(0).collect();
        assert_eq!(
            chunks,
            vec![Chunk { since: 0, until: 1 }, Chunk { since: 2, until: 3 }]
        );
    }

    #[test]
    fn window_defaults_to_last_hour() {
        let now = Utc.with_ymd_and_hms(2015, 1, 1, 12, 0, 0).unwrap();

        let window = TimeWindow::from_options(&CountOptions::default(), now);
        assert_eq!(window.until, now.timestamp());
        assert_eq!(window.since, now.timestamp() - 3600);

        let until = Utc.with_ymd_and_hms(2015, 1, 1, 6, 0, 0).unwrap();
        let window = TimeWindow::from_options(&CountOptions::default().until(until), now);
        assert_eq!(window.until, until.timestamp());
        assert_eq!(window.since, until.timestamp() - 3600);

        let since = Utc.with_ymd_and_hms(2014, 12, 31, 0, 0, 0).unwrap();
        let window = TimeWindow::from_options(&CountOptions::default().since(since), now);
        assert_eq!(window, TimeWindow::new(since.timestamp(), now.timestamp()));
    }

    #[test]
    fn default_since_saturates_at_earliest_instant() {
        let window = TimeWindow::from_options(
            &CountOptions::default().until(DateTime::<Utc>::MIN_UTC),
            Utc::now(),
        );

        assert_eq!(window.since, window.until);
        assert_eq!(window.chunks(MAX_CHUNK_SECONDS).count(), 0);
    }

    #[test]
    fn fixed_clock_reports_its_instant() {
        let instant = Utc.with_ymd_and_hms(2020, 2, 2, 0, 0, 0).unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }
}
