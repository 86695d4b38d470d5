use shared::error::AppError;
use thiserror::Error;

/// 服务器启动 / 运行错误
///
/// 请求级错误使用 [`AppError`]；这里只覆盖进程级失败。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("初始化失败: {0}")]
    Init(#[from] AppError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
