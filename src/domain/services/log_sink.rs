// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::Local;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use tracing::{error, info, warn};

/// 面向用户的日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// 格式化一行日志：`[YYYY-MM-DD HH:MM:SS] LEVEL: message`
pub fn format_log_line(level: LogLevel, message: &str) -> String {
    format!(
        "[{}] {}: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level,
        message
    )
}

/// 进程级最近日志环形缓冲区
///
/// 与 tracing 输出相互独立，每条记录同时镜像到 tracing
pub struct LogSink {
    capacity: usize,
    lines: Mutex<VecDeque<String>>,
}

impl LogSink {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// 记录一条日志并返回格式化后的行
    pub fn push(&self, level: LogLevel, message: &str) -> String {
        match level {
            LogLevel::Info => info!(target: "themecrawl::log_sink", "{}", message),
            LogLevel::Warning => warn!(target: "themecrawl::log_sink", "{}", message),
            LogLevel::Error => error!(target: "themecrawl::log_sink", "{}", message),
        }

        let line = format_log_line(level, message);
        self.push_line(line.clone());
        line
    }

    /// 追加一行已格式化的日志
    pub fn push_line(&self, line: String) {
        let mut lines = self.lines.lock();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// 最近 `limit` 条日志，最新的在前
    pub fn recent(&self, limit: usize) -> Vec<String> {
        self.lines.lock().iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}
