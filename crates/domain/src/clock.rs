use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, Mutex};

/// 时间来源。业务规则只通过该 trait 读取"今天"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定时钟，可在测试中手动推进
#[derive(Debug, Clone)]
pub struct FixedClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(now)),
        }
    }

    /// 以某天的零点构造
    pub fn on(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut current) = self.current.lock() {
            *current = now;
        }
    }

    pub fn advance_days(&self, days: i64) {
        if let Ok(mut current) = self.current.lock() {
            *current += chrono::Duration::days(days);
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let clock = FixedClock::on(start);
        assert_eq!(clock.today(), start);

        clock.advance_days(1);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_clones_share_time() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let other = clock.clone();
        clock.advance_days(10);
        assert_eq!(other.today(), NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
    }
}
