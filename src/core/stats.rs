//! Signup statistics shown in the header

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignupStats {
    pub signups: u32,
    pub seats_remaining: u32,
    /// Whole days until launch, rounded up; negative once launched
    pub days_until_launch: i64,
}

impl SignupStats {
    pub fn compute(signups: usize, total_seats: u32, launch_unix: i64, now_unix: i64) -> Self {
        let signups = u32::try_from(signups).unwrap_or(u32::MAX);
        Self {
            signups,
            seats_remaining: total_seats.saturating_sub(signups),
            days_until_launch: ceil_div(launch_unix - now_unix, SECONDS_PER_DAY),
        }
    }

    pub fn launched(&self) -> bool {
        self.days_until_launch <= 0
    }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a.div_euclid(b);
    if a.rem_euclid(b) == 0 {
        q
    } else {
        q + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAUNCH: i64 = 1_737_763_200;

    #[test]
    fn test_seats_and_countdown() {
        let stats = SignupStats::compute(42, 120, LAUNCH, LAUNCH - 10 * SECONDS_PER_DAY - 1);
        assert_eq!(stats.signups, 42);
        assert_eq!(stats.seats_remaining, 78);
        assert_eq!(stats.days_until_launch, 11);
        assert!(!stats.launched());
    }

    #[test]
    fn test_oversubscribed_and_past_launch() {
        let stats = SignupStats::compute(150, 120, LAUNCH, LAUNCH + 2 * SECONDS_PER_DAY);
        assert_eq!(stats.seats_remaining, 0);
        assert_eq!(stats.days_until_launch, -2);
        assert!(stats.launched());
    }

    #[test]
    fn test_launch_day_exact() {
        let stats = SignupStats::compute(0, 120, LAUNCH, LAUNCH);
        assert_eq!(stats.days_until_launch, 0);
    }
}
