// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 默认过滤规则，可被 `RUST_LOG` 覆盖
pub const DEFAULT_FILTER: &str = "info,themecrawl=debug,sqlx=warn";

/// 初始化全局 tracing 订阅者
///
/// `THEMECRAWL_LOG_FORMAT=json` 时输出 JSON 行
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json_output_requested() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn json_output_requested() -> bool {
    std::env::var("THEMECRAWL_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"))
}
