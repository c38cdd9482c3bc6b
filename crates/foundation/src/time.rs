/// Scene time in seconds, advanced by the frame loop.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub fn after(self, seconds: f64) -> Self {
        Time(self.0 + seconds)
    }
}

/// Wall-clock timestamp in milliseconds since the Unix epoch, as carried by
/// the earthquake feed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EpochMillis(pub i64);

impl EpochMillis {
    /// Milliseconds elapsed from `self` to `now`, saturating at zero for
    /// timestamps in the future.
    pub fn elapsed_until(self, now: EpochMillis) -> u64 {
        now.0.saturating_sub(self.0).max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::{EpochMillis, Time};

    #[test]
    fn time_after_offsets_seconds() {
        assert_eq!(Time(1.5).after(2.0), Time(3.5));
    }

    #[test]
    fn elapsed_saturates_for_future_timestamps() {
        assert_eq!(EpochMillis(1_000).elapsed_until(EpochMillis(4_500)), 3_500);
        assert_eq!(EpochMillis(9_000).elapsed_until(EpochMillis(4_500)), 0);
    }
}
