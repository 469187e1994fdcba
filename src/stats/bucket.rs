//! Calendar buckets for time series
//!
//! A window `[start, end)` is enumerated into month or ISO-week buckets
//! before any record is assigned, so empty periods still show up with zero
//! counts.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Monthly,
    /// ISO weeks, starting on Monday
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// A calendar period, identified by its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Month { year: i32, month: u32 },
    Week(NaiveDate),
}

impl Bucket {
    /// The bucket a date falls in
    pub fn for_date(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Monthly => Bucket::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                Bucket::Week(date - Days::new(offset))
            }
        }
    }

    /// The bucket a timestamp falls in (UTC calendar)
    pub fn containing(timestamp: DateTime<Utc>, granularity: Granularity) -> Self {
        Self::for_date(timestamp.date_naive(), granularity)
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Bucket::Month { .. } => Granularity::Monthly,
            Bucket::Week(_) => Granularity::Weekly,
        }
    }

    /// First day of the period, `None` past the calendar's range
    pub fn start(&self) -> Option<NaiveDate> {
        match *self {
            Bucket::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            Bucket::Week(date) => Some(date),
        }
    }

    /// The following period, `None` once it would begin past the calendar's range
    pub fn next(&self) -> Option<Self> {
        match *self {
            Bucket::Month { year, month } => {
                let next = if month == 12 {
                    Bucket::Month {
                        year: year.checked_add(1)?,
                        month: 1,
                    }
                } else {
                    Bucket::Month {
                        year,
                        month: month + 1,
                    }
                };
                next.start().map(|_| next)
            }
            Bucket::Week(date) => date.checked_add_days(Days::new(7)).map(Bucket::Week),
        }
    }

    /// `January 2024` for months, `2024-01-01` for weeks
    pub fn label(&self) -> String {
        match *self {
            Bucket::Month { year, month } => match self.start() {
                Some(start) => start.format("%B %Y").to_string(),
                None => format!("{}-{:02}", year, month),
            },
            Bucket::Week(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// All buckets overlapping `[start, end)`.
///
/// The first bucket begins at `start` truncated to the granularity boundary.
pub fn enumerate_buckets(
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
    order: Order,
) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut next = Some(Bucket::for_date(start, granularity));
    while let Some(bucket) = next.filter(|b| b.start().is_some_and(|first| first < end)) {
        buckets.push(bucket);
        next = bucket.next();
    }

    if order == Order::Descending {
        buckets.reverse();
    }
    buckets
}

/// A closed reporting window at a fixed granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucketer {
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
}

impl TimeBucketer {
    pub fn new(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Self {
        Self {
            start,
            end,
            granularity,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn enumerate(&self, order: Order) -> Vec<Bucket> {
        enumerate_buckets(self.start, self.end, self.granularity, order)
    }

    /// The bucket for a timestamp, or `None` when it lies outside the window
    pub fn assign(&self, timestamp: DateTime<Utc>) -> Option<Bucket> {
        let date = timestamp.date_naive();
        (date >= self.start && date < self.end).then(|| Bucket::for_date(date, self.granularity))
    }

    /// Group records by bucket.
    ///
    /// `timestamps` may yield several timestamps per record; the record is
    /// then listed once per in-window timestamp. The map holds every bucket
    /// of the window in `order`, including empty ones.
    pub fn group_by<'a, R, I, F>(
        &self,
        records: &'a [R],
        order: Order,
        timestamps: F,
    ) -> IndexMap<Bucket, Vec<&'a R>>
    where
        F: Fn(&R) -> I,
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        let mut grouped: IndexMap<Bucket, Vec<&'a R>> = self
            .enumerate(order)
            .into_iter()
            .map(|bucket| (bucket, Vec::new()))
            .collect();

        for record in records {
            for timestamp in timestamps(record) {
                if let Some(entries) = self
                    .assign(timestamp)
                    .and_then(|bucket| grouped.get_mut(&bucket))
                {
                    entries.push(record);
                }
            }
        }
        grouped
    }
}

/// The `months` full months before the one containing `now`: `[start, end)`
/// where `end` is the first day of the current month.
///
/// `start` is clamped to `NaiveDate::MIN` when `months` reaches past the
/// earliest representable month.
pub fn report_window(now: DateTime<Utc>, months: u32) -> (NaiveDate, NaiveDate) {
    let today = now.date_naive();
    let end = today - Days::new(u64::from(today.day0()));
    let start = end
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    (start, end)
}
