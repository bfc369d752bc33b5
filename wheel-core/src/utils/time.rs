//! 时间工具函数 - 业务时区转换
//!
//! 存储层只保存 `i64` Unix millis，日期/小时/星期统一在这里按业务时区计算。

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 默认业务时区
pub const DEFAULT_BUSINESS_TZ: Tz = chrono_tz::Asia::Bangkok;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析时区名称 (IANA)
pub fn parse_tz(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AppError::validation(format!("Unknown timezone: {}", name)))
}

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 业务时区下的日历位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSlot {
    /// YYYY-MM-DD
    pub date: String,
    /// 0-23
    pub hour: u32,
    /// 0-6, 周日 = 0
    pub day_of_week: u32,
}

/// Unix millis → (日期, 小时, 星期)
///
/// 超出 chrono 范围的时间戳落到 1970-01-01。
pub fn local_slot(millis: i64, tz: Tz) -> LocalSlot {
    let local = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz);
    LocalSlot {
        date: format_date(local.date_naive()),
        hour: local.hour(),
        day_of_week: local.weekday().num_days_from_sunday(),
    }
}

/// 星期 (周日 = 0) of a YYYY-MM-DD date
pub fn day_of_week(date: &str) -> AppResult<u32> {
    Ok(parse_date(date)?.weekday().num_days_from_sunday())
}

/// 日期平移
pub fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

/// 两个时间点之间的分钟数 (可能为负，调用方决定是否接受)
pub fn minutes_between(from: i64, to: i64) -> f64 {
    (to - from) as f64 / 60_000.0
}

/// 分钟 → 毫秒
pub fn minutes_to_millis(minutes: u32) -> i64 {
    i64::from(minutes) * 60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_slot_uses_business_tz() {
        // 2024-03-09T18:30:00Z = 2024-03-10 01:30 Bangkok (Sunday)
        let millis = 1_710_009_000_000;
        let slot = local_slot(millis, DEFAULT_BUSINESS_TZ);
        assert_eq!(slot.date, "2024-03-10");
        assert_eq!(slot.hour, 1);
        assert_eq!(slot.day_of_week, 0);

        let utc = local_slot(millis, chrono_tz::UTC);
        assert_eq!(utc.date, "2024-03-09");
        assert_eq!(utc.hour, 18);
        assert_eq!(utc.day_of_week, 6);
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("yesterday").is_err());
        assert_eq!(day_of_week("2024-03-10").unwrap(), 0);
    }

    #[test]
    fn test_parse_tz() {
        assert_eq!(parse_tz("Asia/Bangkok").unwrap(), DEFAULT_BUSINESS_TZ);
        assert!(parse_tz("Mars/Olympus").is_err());
    }

    #[test]
    fn test_minutes_between() {
        assert_eq!(minutes_between(0, 90_000), 1.5);
        assert_eq!(minutes_to_millis(30), 1_800_000);
    }
}
