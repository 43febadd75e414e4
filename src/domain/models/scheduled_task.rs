// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_target::{CrawlMode, CrawlTarget};
use crate::domain::models::schedule::Schedule;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 周期性爬取定义
///
/// 调度器是 `next_run`、`run_count`、`last_run` 的唯一写入者。
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledTask {
    #[serde(rename = "task_id")]
    pub id: Uuid,
    pub name: String,
    pub theme_id: String,
    pub mode: CrawlMode,
    pub start_page: i32,
    pub end_page: i32,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub enabled: bool,
    pub last_run: Option<DateTime<FixedOffset>>,
    pub next_run: Option<DateTime<FixedOffset>>,
    pub run_count: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl ScheduledTask {
    /// 创建新的定时任务定义，`next_run` 由调度器在保存前计算
    pub fn new(name: String, target: CrawlTarget, schedule: Schedule, enabled: bool) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            name,
            theme_id: target.theme_id,
            mode: target.mode,
            start_page: target.start_page,
            end_page: target.end_page,
            schedule,
            enabled,
            last_run: None,
            next_run: None,
            run_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn target(&self) -> CrawlTarget {
        CrawlTarget {
            theme_id: self.theme_id.clone(),
            mode: self.mode,
            start_page: self.start_page,
            end_page: self.end_page,
        }
    }

    /// 替换爬取目标与调度规则
    pub fn apply_definition(&mut self, name: String, target: CrawlTarget, schedule: Schedule) {
        self.name = name;
        self.theme_id = target.theme_id;
        self.mode = target.mode;
        self.start_page = target.start_page;
        self.end_page = target.end_page;
        self.schedule = schedule;
        self.updated_at = Utc::now().into();
    }

    /// 在启用时重新计算下次运行时间，禁用时清空
    pub fn reschedule_from(&mut self, now: DateTime<FixedOffset>) {
        self.next_run = if self.enabled {
            Some(self.schedule.next_run_after(now))
        } else {
            None
        };
        self.updated_at = Utc::now().into();
    }

    /// 是否到期
    pub fn is_due(&self, now: DateTime<FixedOffset>) -> bool {
        self.enabled && self.next_run.is_some_and(|next| next <= now)
    }

    /// 记录一次派生
    pub fn record_run(&mut self, now: DateTime<FixedOffset>) {
        self.run_count += 1;
        self.last_run = Some(now);
        self.updated_at = Utc::now().into();
    }
}
