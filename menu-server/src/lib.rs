//! Menu Server - 在线点餐菜单与订单后端
//!
//! # 架构概述
//!
//! - **定价** (`pricing`): 服务端按目录价格计算购物车总价
//! - **订单** (`orders`): 顾客识别、单事务落库、查询、营业额汇总、事件广播
//! - **数据库** (`db`): SQLite (sqlx) 连接池、迁移与 repository
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! menu-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── pricing/       # 定价引擎、目录查找、金额计算
//! ├── orders/        # 下单、查询、汇总、事件广播
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装 + 中间件
//! ├── utils/         # 日志、时间、校验
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod pricing;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use orders::{OrderFeed, OrderFinalizer};
pub use pricing::{CatalogLookup, UnresolvedLinePolicy, price_order};
pub use routes::{build_app, build_router};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 `.env`，初始化日志
///
/// 日志级别取 `LOG_LEVEL` (RUST_LOG 优先)，`LOG_DIR` 存在时同时写入每日滚动文件。
pub fn setup_environment() -> anyhow::Result<()> {
    // .env 不存在不是错误
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  ___
   /  |/  /__  ____  __  __
  / /|_/ / _ \/ __ \/ / / /
 / /  / /  __/ / / / /_/ /
/_/  /_/\___/_/ /_/\__,_/
    _____
   / ___/___  ______   _____  _____
   \__ \/ _ \/ ___/ | / / _ \/ ___/
  ___/ /  __/ /   | |/ /  __/ /
 /____/\___/_/    |___/\___/_/
    "#
    );
}
