//! Revenue Rollup
//!
//! Day, week and month windows are calendar dates in the business timezone,
//! queried as half-open millisecond ranges `[start 00:00, day after end 00:00)`.
//! Archived orders count; deleted orders are gone.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use shared::models::{FinancialSummary, RollupQuery, RollupWindow};
use sqlx::SqlitePool;

use super::store_error;
use crate::db::repository::order;
use crate::pricing::money::{to_decimal, to_f64};
use crate::utils::time::{day_end_millis, day_start_millis, first_day_of_month, last_day_of_month, monday_of};
use crate::utils::{AppError, AppResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn invalid_token(field: &str, token: &str, expected: &str) -> AppError {
    AppError::validation(format!("Invalid {field} '{token}', expected {expected}"))
        .with_detail("field", field)
        .with_detail("value", token)
}

/// `YYYY-MM-DD`
pub fn parse_day(token: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(token.trim(), DATE_FORMAT)
        .map_err(|_| invalid_token("day", token, "YYYY-MM-DD"))
}

/// `YYYY-Www` → Monday..Sunday
///
/// Week 1 starts on the Monday of the week containing January 1st, so it
/// may begin in the previous year. Week 53 is accepted for every year.
pub fn parse_week(token: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let err = || invalid_token("week", token, "YYYY-Www");

    let (year, week) = token.trim().split_once('-').ok_or_else(err)?;
    let week = week
        .strip_prefix('W')
        .or_else(|| week.strip_prefix('w'))
        .ok_or_else(err)?;
    if year.len() != 4 || week.is_empty() || week.len() > 2 {
        return Err(err());
    }
    let year: i32 = year.parse().map_err(|_| err())?;
    let week: i64 = week.parse().map_err(|_| err())?;
    if !(1..=53).contains(&week) {
        return Err(err());
    }

    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(err)?;
    let start = monday_of(jan1) + Duration::days((week - 1) * 7);
    Ok((start, start + Duration::days(6)))
}

/// `YYYY-MM` → first..last day
pub fn parse_month(token: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let token_trimmed = token.trim();
    if token_trimmed.len() != 7 {
        return Err(invalid_token("month", token, "YYYY-MM"));
    }
    let first = NaiveDate::parse_from_str(&format!("{token_trimmed}-01"), DATE_FORMAT)
        .map_err(|_| invalid_token("month", token, "YYYY-MM"))?;
    Ok((first, last_day_of_month(first)))
}

async fn window(pool: &SqlitePool, tz: Tz, start: NaiveDate, end: NaiveDate) -> AppResult<RollupWindow> {
    let (count, revenue) = order::sum_in_range(pool, day_start_millis(start, tz), day_end_millis(end, tz))
        .await
        .map_err(store_error)?;
    Ok(RollupWindow {
        count,
        revenue: to_f64(to_decimal(revenue)),
    })
}

fn fmt(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Daily, weekly and monthly order count and revenue
///
/// Omitted selectors default to the window containing `today`. All tokens are
/// parsed before the store is queried.
pub async fn rollup(
    pool: &SqlitePool,
    tz: Tz,
    query: &RollupQuery,
    today: NaiveDate,
) -> AppResult<FinancialSummary> {
    let day = match query.day.as_deref() {
        Some(token) => parse_day(token)?,
        None => today,
    };
    let (week_start, week_end) = match query.week.as_deref() {
        Some(token) => parse_week(token)?,
        None => {
            let monday = monday_of(today);
            (monday, monday + Duration::days(6))
        }
    };
    let (month_start, month_end) = match query.month.as_deref() {
        Some(token) => parse_month(token)?,
        None => (first_day_of_month(today), last_day_of_month(today)),
    };

    let daily = window(pool, tz, day, day).await?;
    let weekly = window(pool, tz, week_start, week_end).await?;
    let monthly = window(pool, tz, month_start, month_end).await?;

    tracing::debug!(
        day = %day,
        week_start = %week_start,
        daily_count = daily.count,
        weekly_count = weekly.count,
        monthly_count = monthly.count,
        "Rollup computed"
    );

    Ok(FinancialSummary {
        daily_count: daily.count,
        daily_revenue: daily.revenue,
        weekly_count: weekly.count,
        weekly_revenue: weekly.revenue,
        monthly_count: monthly.count,
        monthly_revenue: monthly.revenue,
        day: fmt(day),
        week_start: fmt(week_start),
        week_end: fmt(week_end),
        month_start: fmt(month_start),
        month_end: fmt(month_end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use crate::utils::ErrorCode;
    use crate::utils::time::date_time_to_millis;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sao_paulo() -> Tz {
        "America/Sao_Paulo".parse().unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> i64 {
        date_time_to_millis(date, NaiveTime::from_hms_opt(h, m, 0).unwrap(), sao_paulo())
    }

    async fn seed_order(pool: &SqlitePool, created_at: i64, total: f64) -> i64 {
        let customer: i64 = sqlx::query_scalar(
            "INSERT INTO customer (name, phone, street, neighborhood) VALUES ('Ana', '1', 'Rua A', 'Centro') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        sqlx::query_scalar(
            "INSERT INTO orders (created_at, payment_method, customer_id, total_amount) VALUES (?, 1, ?, ?) RETURNING id",
        )
        .bind(created_at)
        .bind(customer)
        .bind(total)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn query(day: Option<&str>, week: Option<&str>, month: Option<&str>) -> RollupQuery {
        RollupQuery {
            day: day.map(str::to_string),
            week: week.map(str::to_string),
            month: month.map(str::to_string),
        }
    }

    #[test]
    fn test_week_one_for_each_jan1_weekday() {
        let cases = [
            ("2024-W01", d(2024, 1, 1), d(2024, 1, 7)),    // Mon
            ("2019-W01", d(2018, 12, 31), d(2019, 1, 6)),  // Tue
            ("2020-W01", d(2019, 12, 30), d(2020, 1, 5)),  // Wed
            ("2015-W01", d(2014, 12, 29), d(2015, 1, 4)),  // Thu
            ("2016-W01", d(2015, 12, 28), d(2016, 1, 3)),  // Fri
            ("2022-W01", d(2021, 12, 27), d(2022, 1, 2)),  // Sat
            ("2023-W01", d(2022, 12, 26), d(2023, 1, 1)),  // Sun
        ];
        for (token, start, end) in cases {
            assert_eq!(parse_week(token).unwrap(), (start, end), "{token}");
        }
    }

    #[test]
    fn test_week_offsets() {
        assert_eq!(parse_week("2024-W02").unwrap(), (d(2024, 1, 8), d(2024, 1, 14)));
        assert_eq!(parse_week("2024-w10").unwrap().0, d(2024, 3, 4));
        assert_eq!(parse_week("2024-W53").unwrap().0, d(2024, 12, 30));
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["2024-W00", "2024-W54", "2024W01", "2024-01", "24-W01", "2024-Wx", "2024-W123"] {
            let err = parse_week(token).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed, "{token}");
        }
        for token in ["2024-13", "2024/01", "2024-1", "2024-01-05"] {
            assert_eq!(parse_month(token).unwrap_err().code, ErrorCode::ValidationFailed, "{token}");
        }
        for token in ["2024-02-30", "15/03/2024", ""] {
            assert_eq!(parse_day(token).unwrap_err().code, ErrorCode::ValidationFailed, "{token:?}");
        }
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(parse_month("2024-02").unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(parse_month("2023-12").unwrap(), (d(2023, 12, 1), d(2023, 12, 31)));
    }

    #[tokio::test]
    async fn test_day_window_only_counts_that_day() {
        let pool = test_pool().await;
        let day = d(2024, 3, 15);
        seed_order(&pool, at(day, 0, 0), 10.0).await;
        seed_order(&pool, at(day, 23, 59), 15.5).await;
        seed_order(&pool, at(d(2024, 3, 14), 23, 59), 100.0).await;
        seed_order(&pool, at(d(2024, 3, 16), 0, 0), 100.0).await;

        let summary = rollup(&pool, sao_paulo(), &query(Some("2024-03-15"), None, None), day)
            .await
            .unwrap();

        assert_eq!(summary.daily_count, 2);
        assert_eq!(summary.daily_revenue, 25.50);
        assert_eq!(summary.day, "2024-03-15");
    }

    #[tokio::test]
    async fn test_day_windows_across_midnight_dst_gap() {
        let pool = test_pool().await;
        // 2018-11-03 22:00 -03:00
        seed_order(&pool, 1_541_293_200_000, 40.0).await;

        let nov3 = rollup(&pool, sao_paulo(), &query(Some("2018-11-03"), None, None), d(2018, 11, 3))
            .await
            .unwrap();
        let nov4 = rollup(&pool, sao_paulo(), &query(Some("2018-11-04"), None, None), d(2018, 11, 4))
            .await
            .unwrap();

        assert_eq!((nov3.daily_count, nov4.daily_count), (1, 0));
        assert_eq!(nov3.daily_revenue, 40.0);
    }

    #[tokio::test]
    async fn test_month_window_spanning_days() {
        let pool = test_pool().await;
        seed_order(&pool, at(d(2024, 5, 1), 12, 0), 10.10).await;
        seed_order(&pool, at(d(2024, 5, 2), 12, 0), 20.20).await;
        seed_order(&pool, at(d(2024, 5, 3), 12, 0), 30.30).await;
        seed_order(&pool, at(d(2024, 6, 1), 0, 0), 99.0).await;

        let summary = rollup(&pool, sao_paulo(), &query(None, None, Some("2024-05")), d(2024, 5, 3))
            .await
            .unwrap();

        assert_eq!(summary.monthly_count, 3);
        assert_eq!(summary.monthly_revenue, 60.60);
        assert_eq!(summary.month_start, "2024-05-01");
        assert_eq!(summary.month_end, "2024-05-31");
    }

    #[tokio::test]
    async fn test_defaults_to_windows_containing_today() {
        let pool = test_pool().await;
        // Wednesday
        let today = d(2024, 5, 15);
        seed_order(&pool, at(d(2024, 5, 13), 9, 0), 5.0).await;
        seed_order(&pool, at(today, 9, 0), 7.0).await;
        seed_order(&pool, at(d(2024, 5, 2), 9, 0), 11.0).await;

        let summary = rollup(&pool, sao_paulo(), &RollupQuery::default(), today)
            .await
            .unwrap();

        assert_eq!((summary.daily_count, summary.daily_revenue), (1, 7.0));
        assert_eq!((summary.weekly_count, summary.weekly_revenue), (2, 12.0));
        assert_eq!((summary.monthly_count, summary.monthly_revenue), (3, 23.0));
        assert_eq!(summary.week_start, "2024-05-13");
        assert_eq!(summary.week_end, "2024-05-19");
    }

    #[tokio::test]
    async fn test_empty_windows_are_zero() {
        let pool = test_pool().await;
        let summary = rollup(
            &pool,
            sao_paulo(),
            &query(Some("2020-01-01"), Some("2020-W01"), Some("2020-01")),
            d(2024, 1, 1),
        )
        .await
        .unwrap();

        assert_eq!(summary.daily_count, 0);
        assert_eq!(summary.weekly_revenue, 0.0);
        assert_eq!(summary.monthly_revenue, 0.0);
        assert_eq!(summary.week_start, "2019-12-30");
    }

    #[tokio::test]
    async fn test_archived_counted_deleted_not() {
        let pool = test_pool().await;
        let day = d(2024, 3, 15);
        let archived = seed_order(&pool, at(day, 10, 0), 10.0).await;
        let deleted = seed_order(&pool, at(day, 11, 0), 20.0).await;
        seed_order(&pool, at(day, 12, 0), 30.0).await;

        sqlx::query("UPDATE orders SET status = 2 WHERE id = ?")
            .bind(archived)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(deleted)
            .execute(&pool)
            .await
            .unwrap();

        let summary = rollup(&pool, sao_paulo(), &RollupQuery::default(), day)
            .await
            .unwrap();
        assert_eq!(summary.daily_count, 2);
        assert_eq!(summary.daily_revenue, 40.0);
    }

    #[tokio::test]
    async fn test_malformed_token_rejected_before_query() {
        let pool = test_pool().await;
        pool.close().await;

        let err = rollup(&pool, sao_paulo(), &query(None, Some("2024-W99"), None), d(2024, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
