use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

/// 现场时区（阿拉伯标准时间，UTC+3）偏移秒数
pub const SITE_OFFSET_SECONDS: i32 = 3 * 3600;

/// 报告中日期的显示格式，例如 `Oct 15, 2024`
pub const REPORT_DATE_FORMAT: &str = "%b %-d, %Y";

/// 返回现场时区 `FixedOffset` 对象
#[inline]
pub fn site_offset() -> FixedOffset {
    FixedOffset::east_opt(SITE_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// 将任意时区 DateTime 格式化为现场时间字符串
#[inline]
pub fn format_site<Tz: TimeZone>(dt: DateTime<Tz>, fmt: &str) -> String {
    dt.with_timezone(&site_offset()).format(fmt).to_string()
}

/// 报告日期显示
#[inline]
pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_report_date() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 5).unwrap();
        assert_eq!(format_report_date(date), "Oct 5, 2024");
    }

    #[test]
    fn test_site_time_crosses_midnight() {
        let utc = Utc.with_ymd_and_hms(2024, 10, 15, 22, 30, 0).unwrap();
        assert_eq!(format_site(utc, "%Y-%m-%d %H:%M"), "2024-10-16 01:30");
        assert_eq!(site_offset().local_minus_utc(), SITE_OFFSET_SECONDS);
    }
}
