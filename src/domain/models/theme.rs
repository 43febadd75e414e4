// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl_target::CrawlMode;
use serde::Serialize;

/// 论坛主题（版块）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub supports_hot: bool,
}

/// 静态主题目录
///
/// 列表页地址由站点根地址推导：
/// - 普通模式：`{base}/forum-{id}-{page}.html`
/// - 热门模式：`{base}/forum.php?mod=forumdisplay&fid={id}&filter=heat&orderby=heats`
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    base_url: String,
    themes: Vec<Theme>,
}

const BUILTIN_THEMES: &[(&str, &str, bool)] = &[
    ("36", "亚洲无码", true),
    ("37", "亚洲有码", false),
    ("2", "国产原创", true),
    ("103", "高清中文字幕", true),
    ("104", "素人原创", false),
    ("39", "动漫原创", false),
    ("152", "韩国主播", true),
];

impl ThemeCatalog {
    /// 内置主题目录
    pub fn builtin(base_url: &str) -> Self {
        let themes = BUILTIN_THEMES
            .iter()
            .map(|(id, name, hot)| Theme {
                id: id.to_string(),
                name: name.to_string(),
                supports_hot: *hot,
            })
            .collect();
        Self::new(base_url, themes)
    }

    pub fn new(base_url: &str, themes: Vec<Theme>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            themes,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 按目录顺序返回所有主题
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get(&self, theme_id: &str) -> Option<&Theme> {
        self.themes.iter().find(|theme| theme.id == theme_id)
    }

    /// 计算列表页地址，热门模式忽略页码
    pub fn listing_url(&self, theme_id: &str, mode: CrawlMode, page: i32) -> String {
        match mode {
            CrawlMode::Hot => format!(
                "{}/forum.php?mod=forumdisplay&fid={}&filter=heat&orderby=heats",
                self.base_url, theme_id
            ),
            CrawlMode::Normal => format!("{}/forum-{}-{}.html", self.base_url, theme_id, page),
        }
    }
}
