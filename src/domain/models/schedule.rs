// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Timelike};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 调度规则解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Unknown schedule type: {0}")]
    UnknownType(String),
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("Invalid weekday '{0}', expected 0-6 (Monday=0)")]
    InvalidWeekday(String),
    #[error("Invalid interval '{0}', expected a positive number of minutes")]
    InvalidInterval(String),
}

/// 调度类型，线上格式为小写字符串
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Daily,
    Weekly,
    Interval,
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScheduleType::Daily => write!(f, "daily"),
            ScheduleType::Weekly => write!(f, "weekly"),
            ScheduleType::Interval => write!(f, "interval"),
        }
    }
}

impl FromStr for ScheduleType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(ScheduleType::Daily),
            "weekly" => Ok(ScheduleType::Weekly),
            "interval" => Ok(ScheduleType::Interval),
            other => Err(ScheduleError::UnknownType(other.to_string())),
        }
    }
}

/// 已解析的调度规则
///
/// `schedule_value` 在入口处（HTTP 与存储读取）即被解析为本类型，
/// 之后不再传递原始字符串。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// 每天 `time` 触发
    Daily { time: NaiveTime },
    /// 每周 `weekday`（周一为 0）的 `time` 触发
    Weekly { weekday: u32, time: NaiveTime },
    /// 每隔 `minutes` 分钟触发
    Interval { minutes: u32 },
}

/// 周规则只给出星期时使用的默认时间
const DEFAULT_WEEKLY_HOUR: u32 = 9;

impl Schedule {
    /// 解析调度规则
    ///
    /// # 参数
    ///
    /// * `schedule_type` - 调度类型
    /// * `value` - Daily 为 `"HH:MM"`，Weekly 为 `"D:HH:MM"` 或 `"D"`，Interval 为分钟数
    ///
    /// # 返回值
    ///
    /// * `Ok(Schedule)` - 解析成功
    /// * `Err(ScheduleError)` - 格式不合法
    pub fn parse(schedule_type: ScheduleType, value: &str) -> Result<Self, ScheduleError> {
        let value = value.trim();
        match schedule_type {
            ScheduleType::Daily => Ok(Schedule::Daily {
                time: parse_time(value)?,
            }),
            ScheduleType::Weekly => {
                let (day, time) = match value.split_once(':') {
                    Some((day, time)) => (day, parse_time(time)?),
                    None => (
                        value,
                        NaiveTime::from_hms_opt(DEFAULT_WEEKLY_HOUR, 0, 0)
                            .ok_or_else(|| ScheduleError::InvalidTime(value.to_string()))?,
                    ),
                };
                let weekday = day
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|d| *d <= 6)
                    .ok_or_else(|| ScheduleError::InvalidWeekday(day.to_string()))?;
                Ok(Schedule::Weekly { weekday, time })
            }
            ScheduleType::Interval => {
                let minutes = value
                    .parse::<u32>()
                    .ok()
                    .filter(|m| *m > 0)
                    .ok_or_else(|| ScheduleError::InvalidInterval(value.to_string()))?;
                Ok(Schedule::Interval { minutes })
            }
        }
    }

    pub fn schedule_type(&self) -> ScheduleType {
        match self {
            Schedule::Daily { .. } => ScheduleType::Daily,
            Schedule::Weekly { .. } => ScheduleType::Weekly,
            Schedule::Interval { .. } => ScheduleType::Interval,
        }
    }

    /// 规范化后的 `schedule_value` 字符串
    pub fn value(&self) -> String {
        match self {
            Schedule::Daily { time } => format_time(time),
            Schedule::Weekly { weekday, time } => format!("{}:{}", weekday, format_time(time)),
            Schedule::Interval { minutes } => minutes.to_string(),
        }
    }

    /// 计算严格晚于 `now` 的下一次触发时间
    ///
    /// Daily/Weekly 在 `now` 所在偏移的本地时间上计算，候选时间等于 `now`
    /// 视为已经过去。Interval 为 `now + minutes`。
    pub fn next_run_after(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let offset = *now.offset();
        let local = now.naive_local();

        let next_local = match self {
            Schedule::Interval { minutes } => return now + Duration::minutes(i64::from(*minutes)),
            Schedule::Daily { time } => {
                let candidate = local.date().and_time(*time);
                if candidate <= local {
                    candidate + Duration::days(1)
                } else {
                    candidate
                }
            }
            Schedule::Weekly { weekday, time } => {
                let today = local.weekday().num_days_from_monday() as i64;
                let days_ahead = (i64::from(*weekday) - today).rem_euclid(7);
                let candidate = (local.date() + Duration::days(days_ahead)).and_time(*time);
                if candidate <= local {
                    candidate + Duration::days(7)
                } else {
                    candidate
                }
            }
        };

        at_offset(next_local, offset)
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Schedule", 2)?;
        state.serialize_field("schedule_type", &self.schedule_type())?;
        state.serialize_field("schedule_value", &self.value())?;
        state.end()
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime(value.to_string());
    let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hour = hour.trim().parse::<u32>().map_err(|_| invalid())?;
    let minute = minute.trim().parse::<u32>().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

fn format_time(time: &NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

fn at_offset(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}
