// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, FixedOffset, TimeZone};
    use themecrawl::domain::models::schedule::{Schedule, ScheduleType};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_is_strictly_after_and_within_a_day() {
        let schedule = Schedule::parse(ScheduleType::Daily, "00:00").unwrap();

        for hour in [0, 1, 12, 23] {
            let now = utc(2025, 12, 31, hour, 0);
            let next = schedule.next_run_after(now);
            assert!(next > now);
            assert!(next - now <= Duration::hours(24));
            assert_eq!(next, utc(2026, 1, 1, 0, 0));
        }
    }

    #[test]
    fn test_daily_respects_offset_of_now() {
        let schedule = Schedule::parse(ScheduleType::Daily, "09:00").unwrap();
        let beijing = FixedOffset::east_opt(8 * 3600).unwrap();

        // 北京时间 08:00 等于 UTC 00:00，下一次为同日 09:00 北京时间
        let now = beijing.with_ymd_and_hms(2025, 8, 6, 8, 0, 0).unwrap();
        let next = schedule.next_run_after(now);
        assert_eq!(next, utc(2025, 8, 6, 1, 0));
        assert_eq!(next.offset(), &beijing);
    }

    #[test]
    fn test_serializes_as_type_and_value() {
        let schedule = Schedule::parse(ScheduleType::Weekly, "6").unwrap();
        let json = serde_json::to_value(schedule).unwrap();

        assert_eq!(json["schedule_type"], "weekly");
        assert_eq!(json["schedule_value"], "6:09:00");
    }
}
