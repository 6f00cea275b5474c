// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Daily cash-flow buckets for charts.

use crate::db::{Store, Table};
use crate::error::Result;
use crate::models::{DailyBucket, TransactionType, TransactionWithCategory};
use crate::repo::transactions;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use futures::Stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// `2025-03-07`
    IsoDate,
    /// `7`
    DayOfMonth,
    /// `Fri`
    Weekday,
}

impl LabelStyle {
    fn label(&self, date: NaiveDate) -> String {
        match self {
            LabelStyle::IsoDate => date.format("%Y-%m-%d").to_string(),
            LabelStyle::DayOfMonth => date.day().to_string(),
            LabelStyle::Weekday => date.format("%a").to_string(),
        }
    }
}

/// First millisecond of `date` in `tz`.
pub fn day_start_millis<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        .timestamp_millis()
}

/// Splits `rows` into one bucket per day of `[start, end]`. Days without
/// activity still get a zeroed bucket; rows outside the range are ignored.
pub fn bucketize<Tz: TimeZone>(
    tz: &Tz,
    start: NaiveDate,
    end: NaiveDate,
    style: LabelStyle,
    rows: &[TransactionWithCategory],
) -> Vec<DailyBucket> {
    let mut buckets: Vec<DailyBucket> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| DailyBucket::empty(style.label(d), d))
        .collect();

    for row in rows {
        let Some(local) = tz.timestamp_millis_opt(row.transaction.date).single() else {
            continue;
        };
        let day = local.date_naive();
        if day < start || day > end {
            continue;
        }
        let idx = (day - start).num_days() as usize;
        let Some(bucket) = buckets.get_mut(idx) else {
            continue;
        };
        let amount = row.transaction.amount;
        match row.category.as_ref().map(|c| c.transaction_type) {
            Some(TransactionType::Income) => bucket.income_amount += amount,
            Some(TransactionType::Bitcoin) => bucket.bitcoin_amount += amount.abs(),
            _ => bucket.expense_amount += amount,
        }
    }
    buckets
}

pub struct CashFlowAggregator<Tz: TimeZone> {
    store: Store,
    tz: Tz,
}

impl<Tz> CashFlowAggregator<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    pub fn new(store: Store, tz: Tz) -> Self {
        CashFlowAggregator { store, tz }
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    /// Buckets for every day in `[start, end]`, re-emitted whenever
    /// transactions or categories change.
    pub fn observe(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        style: LabelStyle,
    ) -> impl Stream<Item = Result<Vec<DailyBucket>>> + Send + 'static {
        let tz = self.tz.clone();
        let from = day_start_millis(&tz, start);
        let to = end
            .succ_opt()
            .map(|next| day_start_millis(&tz, next) - 1)
            .unwrap_or(i64::MAX);
        self.store.observe(
            &[Table::Transactions, Table::Categories],
            move |conn| {
                let rows = transactions::by_date_range(conn, from, to)?;
                Ok(bucketize(&tz, start, end, style, &rows))
            },
        )
    }

    /// Seven days ending with `today`, oldest first, labeled by weekday.
    pub fn weekly(
        &self,
        today: NaiveDate,
    ) -> impl Stream<Item = Result<Vec<DailyBucket>>> + Send + 'static {
        let start = today - Duration::days(6);
        self.observe(start, today, LabelStyle::Weekday)
    }

    /// Every day of the month containing `today`, labeled by day number.
    pub fn monthly(
        &self,
        today: NaiveDate,
    ) -> impl Stream<Item = Result<Vec<DailyBucket>>> + Send + 'static {
        let (first, last) = month_bounds(today);
        self.observe(first, last, LabelStyle::DayOfMonth)
    }
}

pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Transaction};
    use chrono::FixedOffset;
    use rust_decimal::Decimal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date_millis: i64, amount: Decimal, ty: Option<TransactionType>) -> TransactionWithCategory {
        TransactionWithCategory {
            transaction: Transaction {
                id: 1,
                account_id: 1,
                category_id: ty.map(|_| 1),
                amount,
                date: date_millis,
                note: None,
            },
            category: ty.map(|t| Category {
                id: 1,
                name: "c".into(),
                icon_name: "ic".into(),
                color_hex: "#000".into(),
                transaction_type: t,
            }),
        }
    }

    fn noon_utc(date: NaiveDate) -> i64 {
        day_start_millis(&Utc, date) + 12 * 3_600_000
    }

    #[test]
    fn bitcoin_amounts_are_absolute() {
        let day = d(2025, 3, 7);
        let rows = vec![row(noon_utc(day), Decimal::new(-300, 1), Some(TransactionType::Bitcoin))];
        let buckets = bucketize(&Utc, day, day, LabelStyle::IsoDate, &rows);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].bitcoin_amount, Decimal::new(300, 1));
        assert_eq!(buckets[0].expense_amount, Decimal::ZERO);
    }

    #[test]
    fn classification_and_zero_seeding() {
        let start = d(2025, 2, 26);
        let end = d(2025, 3, 2);
        let rows = vec![
            row(noon_utc(d(2025, 2, 27)), Decimal::from(1000), Some(TransactionType::Income)),
            row(noon_utc(d(2025, 2, 27)), Decimal::from(25), Some(TransactionType::Expense)),
            row(noon_utc(d(2025, 3, 1)), Decimal::from(7), None),
            row(noon_utc(d(2025, 3, 1)), Decimal::from(50), Some(TransactionType::Bitcoin)),
        ];
        let buckets = bucketize(&Utc, start, end, LabelStyle::DayOfMonth, &rows);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        // crosses the month boundary in a non-leap year
        assert_eq!(labels, vec!["26", "27", "28", "1", "2"]);
        assert_eq!(buckets[1].income_amount, Decimal::from(1000));
        assert_eq!(buckets[1].expense_amount, Decimal::from(25));
        assert_eq!(buckets[3].expense_amount, Decimal::from(7));
        assert_eq!(buckets[3].bitcoin_amount, Decimal::from(50));
        for idx in [0, 2, 4] {
            assert_eq!(buckets[idx], DailyBucket::empty(labels[idx].to_string(), buckets[idx].date));
        }
    }

    #[test]
    fn day_boundaries_follow_the_time_zone() {
        // 23:30 UTC on the 7th is already the 8th at UTC+2
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let millis = day_start_millis(&Utc, d(2025, 3, 7)) + (23 * 60 + 30) * 60_000;
        let rows = vec![row(millis, Decimal::from(5), Some(TransactionType::Expense))];
        let buckets = bucketize(&tz, d(2025, 3, 7), d(2025, 3, 8), LabelStyle::IsoDate, &rows);
        assert_eq!(buckets[0].expense_amount, Decimal::ZERO);
        assert_eq!(buckets[1].expense_amount, Decimal::from(5));
    }

    #[test]
    fn weekday_labels_walk_oldest_to_newest() {
        // 2025-03-01 is a Saturday
        let today = d(2025, 3, 7);
        let buckets = bucketize(
            &Utc,
            today - Duration::days(6),
            today,
            LabelStyle::Weekday,
            &[],
        );
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Sat", "Sun", "Mon", "Tue", "Wed", "Thu", "Fri"]);
    }

    #[test]
    fn month_bounds_handle_leap_february() {
        assert_eq!(month_bounds(d(2024, 2, 10)), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_bounds(d(2025, 12, 31)), (d(2025, 12, 1), d(2025, 12, 31)));
    }
}
