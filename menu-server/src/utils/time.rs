//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 service / handler 层完成，
//! repository 层只接收 `i64` Unix millis。

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;

/// 今天 (业务时区)
pub fn today(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 日期 + 时间 → Unix millis (业务时区)
///
/// DST gap: 本地时间不存在时 (夏令时跳跃)，取跳跃结束后的第一个有效时刻。
/// 以 15 分钟为步长前移，覆盖所有现存时区的跳跃幅度。
pub fn date_time_to_millis(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    (0..=DST_GAP_STEPS)
        .map(|step| naive + chrono::Duration::minutes(15 * step))
        .find_map(|candidate| candidate.and_local_timezone(tz).earliest())
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 最多前移 24 小时
const DST_GAP_STEPS: i64 = 24 * 4;

/// 日期开始 (00:00:00) → Unix millis (业务时区)
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_time_to_millis(date, NaiveTime::MIN, tz)
}

/// 日期结束 → 次日 00:00:00 的 Unix millis (业务时区)
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_time_to_millis(next_day, NaiveTime::MIN, tz)
}

/// 本周周一 (Monday..Sunday 周)
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// 当月第一天
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// 当月最后一天 (正确处理 28/29/30/31 天)
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}
