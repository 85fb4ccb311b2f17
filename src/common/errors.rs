use thiserror::Error;

/// 凭证生命周期操作可能遇到的错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 调用方提供的参数非法（熵的编码或长度错误、字节数越界等）
    #[error("validation error: {0}")]
    Validation(String),

    /// 外部凭证生成器失败或其后端不可用
    #[error("generation error: {0}")]
    Generation(String),

    /// 文本/二进制转换失败
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("serialization error (JSON)")]
    Json(#[from] serde_json::Error),
}

// 手动实现一些无法使用 #[from] 的转换
impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(format!("UTF-8 conversion error: {}", err))
    }
}
