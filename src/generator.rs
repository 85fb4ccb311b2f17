//!
//! # 凭证生成器协作者
//!
//! 真正的密钥生成原语（age X25519、AWS KMS）位于本 crate 之外，
//! 通过 [`CredentialGenerator`] 这一单一能力接入：
//! 给定种类与不可变参数，产出公开材料与秘密材料，或失败。
//!
//! crate 内置的 [`EntropyGenerator`] 仅服务随机字节种类，
//! 供本地开发与测试在没有云端后端时使用。
//!

use crate::common::errors::Error;
use crate::common::sensitive::Sensitive;
use crate::common::traits::{OsRandom, RandomSource};
use crate::common::utils::{ZeroizingVec, to_base64};
use crate::descriptor::ResourceKind;
use crate::kinds::kms::{DataKeyPairSpec, DataKeySpec};
use std::collections::BTreeMap;
use std::sync::Arc;
use zeroize::Zeroize;

/// 发往生成器的请求，携带解码后的种类特定不可变参数。
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorRequest {
    AgeIdentity {
        /// 调用方提供的 32 字节种子；`None` 时由生成器自行取随机。
        seed: Option<ZeroizingVec>,
    },
    KmsRandom {
        number_of_bytes: i64,
        custom_key_store_id: Option<String>,
    },
    KmsDataKey {
        key_id: String,
        key_spec: Option<DataKeySpec>,
        number_of_bytes: Option<i64>,
        without_plain_text: bool,
    },
    KmsDataKeyPair {
        key_id: String,
        key_pair_spec: DataKeyPairSpec,
        without_plain_text: bool,
    },
}

impl GeneratorRequest {
    pub fn kind(&self) -> ResourceKind {
        match self {
            GeneratorRequest::AgeIdentity { .. } => ResourceKind::AgeIdentity,
            GeneratorRequest::KmsRandom { .. } => ResourceKind::KmsRandom,
            GeneratorRequest::KmsDataKey { .. } => ResourceKind::KmsDataKey,
            GeneratorRequest::KmsDataKeyPair { .. } => ResourceKind::KmsDataKeyPair,
        }
    }
}

/// 生成器产出的材料。
///
/// 秘密材料始终带敏感标记；`withoutPlainText` 的种类产出空的秘密。
/// 公开/密文材料以命名输出的形式返回（如 `recipient`、`ciphertextBlob`、
/// `publicKey`），名称与各种类的布线表一致。
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMaterial {
    pub secret: Sensitive,
    pub outputs: BTreeMap<String, String>,
}

impl GeneratedMaterial {
    pub fn new(secret: Sensitive) -> Self {
        Self {
            secret,
            outputs: BTreeMap::new(),
        }
    }

    /// 不携带明文秘密的材料。
    pub fn without_plaintext() -> Self {
        Self::new(Sensitive::default())
    }

    pub fn with_output(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), value.into());
        self
    }

    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }
}

/// 外部凭证生成原语的单一能力接口。
pub trait CredentialGenerator: Send + Sync {
    fn generate(&self, request: GeneratorRequest) -> Result<GeneratedMaterial, Error>;
}

/// 本地熵生成器：用注入的随机源服务 [`ResourceKind::KmsRandom`] 请求。
///
/// 其余种类需要外部后端（age 库或 KMS SDK），一律报告 `Generation` 错误。
pub struct EntropyGenerator {
    random: Arc<dyn RandomSource>,
}

impl EntropyGenerator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// 使用操作系统随机源。
    pub fn with_os_rng() -> Self {
        Self::new(Arc::new(OsRandom))
    }
}

impl CredentialGenerator for EntropyGenerator {
    fn generate(&self, request: GeneratorRequest) -> Result<GeneratedMaterial, Error> {
        match request {
            GeneratorRequest::KmsRandom {
                number_of_bytes, ..
            } => {
                let mut buf = vec![0u8; number_of_bytes as usize];
                self.random.fill(&mut buf)?;
                let material = GeneratedMaterial::new(Sensitive::new(to_base64(&buf)));
                buf.zeroize();
                Ok(material)
            }
            other => Err(Error::Generation(format!(
                "{} requires an external key management backend",
                other.kind()
            ))),
        }
    }
}
