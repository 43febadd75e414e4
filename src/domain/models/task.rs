// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_target::{CrawlMode, CrawlTarget};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 临时爬取任务
///
/// 表示一次针对某个主题、某个页码区间的抓取。任务由执行池驱动，
/// 按 Pending → Running → Completed/Failed 的顺序推进，
/// 过程中累计进度、日志和找到的磁力链接数量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// 任务唯一标识符
    #[serde(rename = "task_id")]
    pub id: Uuid,
    /// 主题ID，对应主题目录中的条目
    pub theme_id: String,
    /// 爬取模式
    pub mode: CrawlMode,
    /// 起始页
    pub start_page: i32,
    /// 结束页
    pub end_page: i32,
    /// 本任务显式指定的代理地址
    pub proxy: Option<String>,
    /// 任务状态
    pub status: TaskStatus,
    /// 进度百分比 0-100，运行期间单调不减
    pub progress: i32,
    /// 已发现的帖子页数量
    pub total_links: i32,
    /// 已提取的磁力链接数量，完成时定稿
    pub found_links: i32,
    /// 失败原因
    pub error_message: Option<String>,
    /// 任务日志，只追加
    pub logs: Vec<String>,
    /// 结果文件在存储中的键，仅在完成时设置
    pub result_path: Option<String>,
    /// 派生出本任务的定时任务ID
    pub scheduled_task_id: Option<Uuid>,
    /// 创建时间
    pub created_at: DateTime<FixedOffset>,
    /// 开始执行时间
    pub start_time: Option<DateTime<FixedOffset>>,
    /// 结束时间，当且仅当任务处于终态时设置
    pub end_time: Option<DateTime<FixedOffset>>,
    /// 最后更新时间
    pub updated_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// 状态转换遵循以下流程：
/// Pending → Running → Completed/Failed
///
/// Pending 也可以直接进入 Failed（例如启动恢复时）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// 等待执行槽位
    #[default]
    Pending,
    /// 正在执行
    Running,
    /// 成功完成
    Completed,
    /// 执行失败或被取消
    Failed,
}

impl TaskStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(DomainError::ValidationError(format!(
                "unknown task status: {}",
                other
            ))),
        }
    }
}

/// 领域错误类型
///
/// 表示在领域层可能发生的错误情况，包括状态转换错误和输入验证失败。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: TaskStatus, to: TaskStatus },

    /// 验证错误，当输入数据不符合领域规则时发生
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 代理地址不符合 scheme://host:port 格式
    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),
}

impl Task {
    /// 根据已验证的爬取目标创建一个 Pending 任务
    ///
    /// # 参数
    ///
    /// * `target` - 已通过主题目录校验的爬取目标
    /// * `proxy` - 可选代理地址（调用方负责校验）
    ///
    /// # 返回值
    ///
    /// 返回新创建的任务实例
    pub fn new(target: CrawlTarget, proxy: Option<String>) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            theme_id: target.theme_id,
            mode: target.mode,
            start_page: target.start_page,
            end_page: target.end_page,
            proxy,
            status: TaskStatus::Pending,
            progress: 0,
            total_links: 0,
            found_links: 0,
            error_message: None,
            logs: Vec::new(),
            result_path: None,
            scheduled_task_id: None,
            created_at: now,
            start_time: None,
            end_time: None,
            updated_at: now,
        }
    }

    /// 标记任务由某个定时任务派生
    pub fn with_scheduled_task(mut self, scheduled_task_id: Uuid) -> Self {
        self.scheduled_task_id = Some(scheduled_task_id);
        self
    }

    /// 还原出爬取目标
    pub fn target(&self) -> CrawlTarget {
        CrawlTarget {
            theme_id: self.theme_id.clone(),
            mode: self.mode,
            start_page: self.start_page,
            end_page: self.end_page,
        }
    }

    /// 启动任务
    ///
    /// 将任务状态从 Pending 变更为 Running
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 成功启动
    /// * `Err(DomainError)` - 状态转换失败
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.ensure_transition(TaskStatus::Running)?;
        let now = Utc::now().into();
        self.status = TaskStatus::Running;
        self.progress = 0;
        self.start_time = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// 记录进度
    ///
    /// 仅在 Running 状态下生效，进度不会倒退且不超过 100
    pub fn record_progress(&mut self, progress: i32) {
        if self.status != TaskStatus::Running {
            return;
        }
        let clamped = progress.clamp(0, 100);
        if clamped > self.progress {
            self.progress = clamped;
            self.updated_at = Utc::now().into();
        }
    }

    /// 完成任务
    ///
    /// # 参数
    ///
    /// * `found_links` - 最终的磁力链接数量
    /// * `result_path` - 结果文件的存储键
    pub fn complete(&mut self, found_links: i32, result_path: String) -> Result<(), DomainError> {
        self.ensure_transition(TaskStatus::Completed)?;
        let now = Utc::now().into();
        self.status = TaskStatus::Completed;
        self.progress = 100;
        self.found_links = found_links;
        self.result_path = Some(result_path);
        self.end_time = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// 将任务标记为失败，结果路径保持为空
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_transition(TaskStatus::Failed)?;
        let now = Utc::now().into();
        self.status = TaskStatus::Failed;
        self.error_message = Some(message.into());
        self.result_path = None;
        self.end_time = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// 追加一行日志
    pub fn push_log(&mut self, line: String) {
        self.logs.push(line);
        self.updated_at = Utc::now().into();
    }

    /// 结果文件下载名
    pub fn download_file_name(&self) -> String {
        format!(
            "magnet_links_{}_{}_{}-{}.txt",
            self.theme_id,
            self.mode.as_wire(),
            self.start_page,
            self.end_page
        )
    }

    fn ensure_transition(&self, to: TaskStatus) -> Result<(), DomainError> {
        let allowed = matches!(
            (self.status, to),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Completed)
                | (TaskStatus::Running, TaskStatus::Failed)
        );
        if allowed {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition {
                from: self.status,
                to,
            })
        }
    }
}
