use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::pricing::UnresolvedLinePolicy;

/// 服务器配置 - 菜单/订单服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | HTTP_PORT | 3001 | HTTP 服务端口 |
/// | DATABASE_PATH | {WORK_DIR}/menu.db | SQLite 数据库文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TIMEZONE | America/Sao_Paulo | 业务时区 (营业额汇总) |
/// | UNRESOLVED_LINE_POLICY | skip | 商品不存在时: skip 跳过该行 / reject 拒绝整单 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | ORDER_FEED_CAPACITY | 256 | 订单事件广播缓冲 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_DIR | (未设置) | 日志文件目录 |
///
/// 无法解析的值回退到默认值并记录 warn 日志。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/menu HTTP_PORT=8080 UNRESOLVED_LINE_POLICY=reject cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 业务时区 (日/周/月汇总的日期边界)
    pub timezone: Tz,
    /// 商品引用无法解析时的处理策略
    pub unresolved_line_policy: UnresolvedLinePolicy,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 订单事件广播通道容量
    pub order_feed_capacity: usize,
    /// 日志级别
    pub log_level: String,
    /// 日志文件目录
    pub log_dir: Option<String>,
}

const DEFAULT_WORK_DIR: &str = "./data";
const DEFAULT_HTTP_PORT: u16 = 3001;
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_ORDER_FEED_CAPACITY: usize = 256;

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意 key → value 来源加载配置
    ///
    /// 常用于测试场景
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let work_dir = lookup("WORK_DIR").unwrap_or_else(|| DEFAULT_WORK_DIR.into());
        let database_path = lookup("DATABASE_PATH").unwrap_or_else(|| {
            PathBuf::from(&work_dir)
                .join("menu.db")
                .to_string_lossy()
                .into_owned()
        });

        Self {
            http_port: parse_or_default(&lookup, "HTTP_PORT", DEFAULT_HTTP_PORT),
            database_path,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            timezone: parse_or_default(&lookup, "TIMEZONE", DEFAULT_TIMEZONE),
            unresolved_line_policy: parse_or_default(
                &lookup,
                "UNRESOLVED_LINE_POLICY",
                UnresolvedLinePolicy::default(),
            ),
            request_timeout_ms: parse_or_default(
                &lookup,
                "REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            ),
            order_feed_capacity: parse_or_default(
                &lookup,
                "ORDER_FEED_CAPACITY",
                DEFAULT_ORDER_FEED_CAPACITY,
            )
            .max(1),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR"),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        let mut config = Self::from_lookup(|_| None);
        config.database_path = PathBuf::from(&work_dir)
            .join("menu.db")
            .to_string_lossy()
            .into_owned();
        config.work_dir = work_dir;
        config.http_port = http_port;
        config
    }

    /// 确保工作目录存在
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        if let Some(parent) = PathBuf::from(&self.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid value for {}: {:?}, falling back to {:?}",
                key,
                raw,
                default
            );
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.work_dir, "./data");
        assert_eq!(config.http_port, 3001);
        assert!(config.database_path.ends_with("menu.db"));
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.unresolved_line_policy, UnresolvedLinePolicy::Skip);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert_eq!(config.order_feed_capacity, 256);
        assert_eq!(config.log_level, "info");
        assert!(config.log_dir.is_none());
        assert!(config.is_development());
    }

    #[test]
    fn test_overrides_from_env() {
        let config = config_from(&[
            ("WORK_DIR", "/srv/menu"),
            ("HTTP_PORT", "8080"),
            ("TIMEZONE", "Europe/Lisbon"),
            ("UNRESOLVED_LINE_POLICY", "reject"),
            ("ENVIRONMENT", "production"),
        ]);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, "/srv/menu/menu.db");
        assert_eq!(config.timezone, chrono_tz::Europe::Lisbon);
        assert_eq!(config.unresolved_line_policy, UnresolvedLinePolicy::Reject);
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("HTTP_PORT", "not-a-port"),
            ("TIMEZONE", "Nowhere/City"),
            ("UNRESOLVED_LINE_POLICY", "maybe"),
            ("ORDER_FEED_CAPACITY", "0"),
        ]);
        assert_eq!(config.http_port, 3001);
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.unresolved_line_policy, UnresolvedLinePolicy::Skip);
        assert_eq!(config.order_feed_capacity, 1);
    }

    #[test]
    fn test_explicit_database_path() {
        let config = config_from(&[("DATABASE_PATH", "/tmp/other.db")]);
        assert_eq!(config.database_path, "/tmp/other.db");
    }
}
