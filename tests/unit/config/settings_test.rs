// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置设置测试模块
///
/// 测试配置文件与环境变量的分层加载

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use themecrawl::config::settings::Settings;

    #[test]
    fn test_config_layers_and_env_override() {
        // 只有本测试修改 THEMECRAWL__ 环境变量
        std::env::set_var("THEMECRAWL__RUNNER__POOL_SIZE", "7");
        std::env::set_var("THEMECRAWL__CRAWLER__BASE_URL", "https://mirror.test");
        std::env::set_var("THEMECRAWL__SCHEDULER__ENABLED", "false");

        let loaded = Settings::new();

        std::env::remove_var("THEMECRAWL__RUNNER__POOL_SIZE");
        std::env::remove_var("THEMECRAWL__CRAWLER__BASE_URL");
        std::env::remove_var("THEMECRAWL__SCHEDULER__ENABLED");

        let settings = match loaded {
            Ok(settings) => settings,
            Err(e) => panic!("Failed to load configuration: {}", e),
        };

        assert_eq!(settings.runner.pool_size, 7);
        assert_eq!(settings.crawler.base_url, "https://mirror.test");
        assert!(!settings.scheduler.enabled);

        // 未覆盖的值来自 config/default.toml 或内置默认值
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.crawler.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.logs.capacity, 500);
    }

    #[test]
    fn test_defaults_ignore_environment() {
        let settings = Settings::defaults().unwrap();

        assert_eq!(settings.storage.storage_type, "local");
        assert_eq!(settings.crawler.request_delay(), Duration::from_millis(500));
        assert_eq!(settings.runner.cancel_grace_ms, 10_000);
    }
}
