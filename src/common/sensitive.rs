//!
//! # 敏感数据包装
//!
//! 秘密材料（私钥、明文数据密钥、调用方提供的熵）在状态与依赖布线中
//! 始终以 [`Sensitive`] 的形式流动，使敏感标记在序列化与重构后依然存在，
//! 而不是依赖字段命名约定。
//!

use crate::common::utils::constant_time_eq;
use secrecy::{CloneableSecret, ExposeSecret, SecretBox, SerializableSecret};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// 用于秘密文本的 Newtype 包装，以实现 `SerializableSecret`。
#[derive(Clone, Serialize, Deserialize, Zeroize)]
pub struct SecretText(pub String);

// 为我们的 newtype 选择加入秘密序列化。
impl SerializableSecret for SecretText {}

// 允许包含此 newtype 的 SecretBox 被克隆。
impl CloneableSecret for SecretText {}

/// 携带敏感标记的秘密字符串。
///
/// 内部由 [`SecretBox`] 持有，超出作用域时自动擦除；
/// `Debug` 输出不泄露内容，比较采用常量时间。
#[derive(Clone, Serialize, Deserialize)]
pub struct Sensitive(SecretBox<SecretText>);

impl Sensitive {
    /// 包装一个秘密字符串。
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::new(SecretText(value.into()))))
    }

    /// 暴露内部值。调用方负责不将其写入日志或非敏感输出。
    pub fn expose(&self) -> &str {
        &self.0.expose_secret().0
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Default for Sensitive {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<String> for Sensitive {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Sensitive {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl PartialEq for Sensitive {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.expose().as_bytes(), other.expose().as_bytes())
    }
}

impl Eq for Sensitive {}

impl fmt::Debug for Sensitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sensitive([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let s = Sensitive::new("AGE-SECRET-KEY-1SECRET");
        assert_eq!(format!("{:?}", s), "Sensitive([REDACTED])");
    }

    #[test]
    fn serde_roundtrip_preserves_value() {
        let s = Sensitive::new("top-secret");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"top-secret\"");
        let back: Sensitive = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn comparison_is_by_value() {
        assert_eq!(Sensitive::new("a"), Sensitive::new("a"));
        assert_ne!(Sensitive::new("a"), Sensitive::new("b"));
    }
}
