use thiserror::Error;

use crate::utils::AppError;

/// 启动与运行期错误
///
/// 请求级错误使用 [`AppError`], 这里只覆盖启动流程和监听循环。
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("数据库初始化失败: {0}")]
    Database(String),

    #[error("文件操作失败: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("内部错误: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
