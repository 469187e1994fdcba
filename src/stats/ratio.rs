use std::fmt;

use thiserror::Error;

/// A ratio with a zero denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Ratio undefined: total is zero")]
pub struct UndefinedRatio;

/// `count` out of `total`, e.g. compatible add-ons out of all add-ons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    pub count: u64,
    pub total: u64,
}

impl Share {
    pub fn new(count: u64, total: u64) -> Self {
        Self { count, total }
    }

    /// Share of records matching `predicate`
    pub fn of<R>(records: &[R], predicate: impl Fn(&R) -> bool) -> Self {
        let count = records.iter().filter(|r| predicate(r)).count();
        Self::new(count as u64, records.len() as u64)
    }

    pub fn ratio(&self) -> Result<f64, UndefinedRatio> {
        ratio(self.count, self.total)
    }
}

pub fn ratio(count: u64, total: u64) -> Result<f64, UndefinedRatio> {
    if total == 0 {
        return Err(UndefinedRatio);
    }
    Ok(count as f64 / total as f64)
}

impl fmt::Display for Share {
    /// `3 / 12 (25.0000%)`, or `0 / 0 (N/A)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio() {
            Ok(r) => write!(f, "{} / {} ({:.4}%)", self.count, self.total, r * 100.0),
            Err(UndefinedRatio) => write!(f, "{} / {} (N/A)", self.count, self.total),
        }
    }
}
