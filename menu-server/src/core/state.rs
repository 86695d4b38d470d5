use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::{Config, Result};
use crate::db::DbService;
use crate::orders::{OrderFeed, OrderFinalizer};
use crate::pricing::{CatalogLookup, SqliteCatalog};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc / 连接池实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | feed | OrderFeed | 订单事件广播 |
/// | catalog | Arc<dyn CatalogLookup> | 定价用的商品目录 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 订单事件广播
    pub feed: OrderFeed,
    /// 商品目录 (定价引擎读取)
    pub catalog: Arc<dyn CatalogLookup>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("feed", &self.feed)
            .field("catalog", &"<dyn CatalogLookup>")
            .finish()
    }
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`initialize()`](Self::initialize) 方法代替
    pub fn new(
        config: Config,
        pool: SqlitePool,
        feed: OrderFeed,
        catalog: Arc<dyn CatalogLookup>,
    ) -> Self {
        Self {
            config,
            pool,
            feed,
            catalog,
        }
    }

    /// 基于已有连接池构造 (SQLite 目录 + 新的事件广播)
    pub fn from_pool(config: Config, pool: SqlitePool) -> Self {
        let feed = OrderFeed::new(config.order_feed_capacity);
        let catalog: Arc<dyn CatalogLookup> = Arc::new(SqliteCatalog::new(pool.clone()));
        Self::new(config, pool, feed, catalog)
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (DATABASE_PATH, 运行迁移)
    /// 3. 订单事件广播与商品目录
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir()?;

        let db = DbService::new(&config.database_path).await?;
        tracing::info!(path = %config.database_path, "Database ready");

        Ok(Self::from_pool(config.clone(), db.pool))
    }

    /// 订单定稿服务 (每次调用构造，内部只持有共享引用)
    pub fn finalizer(&self) -> OrderFinalizer {
        OrderFinalizer::new(
            self.pool.clone(),
            self.catalog.clone(),
            self.config.unresolved_line_policy,
            self.feed.clone(),
        )
    }
}
