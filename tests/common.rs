//!
//! 集成测试的通用辅助：确定性时钟与脚本化的假生成器
//!

use keygen_kit::common::to_base64;
use keygen_kit::kinds::age::OUTPUT_RECIPIENT;
use keygen_kit::kinds::kms::{
    OUTPUT_CIPHERTEXT_BLOB, OUTPUT_PRIVATE_KEY_CIPHERTEXT_BLOB, OUTPUT_PUBLIC_KEY,
};
use keygen_kit::prelude::*;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// 可手动推进的确定性时钟。
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_epoch(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// 确定性的假生成器：记录调用次数，每次调用产出不同的材料。
pub struct FakeGenerator {
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CredentialGenerator for FakeGenerator {
    fn generate(&self, request: GeneratorRequest) -> Result<GeneratedMaterial, Error> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(match request {
            GeneratorRequest::AgeIdentity { seed } => {
                // 提供种子时材料由种子决定，否则每次生成都不同
                let tag = seed
                    .map(|s| to_base64(&s))
                    .unwrap_or_else(|| format!("generated-{}", n));
                GeneratedMaterial::new(Sensitive::new(format!("AGE-SECRET-KEY-1{}", tag)))
                    .with_output(OUTPUT_RECIPIENT, format!("age1fake{}", n))
            }
            GeneratorRequest::KmsRandom {
                number_of_bytes, ..
            } => GeneratedMaterial::new(Sensitive::new(to_base64(&vec![
                0xAB;
                number_of_bytes as usize
            ]))),
            GeneratorRequest::KmsDataKey {
                without_plain_text, ..
            } => {
                let material = if without_plain_text {
                    GeneratedMaterial::without_plaintext()
                } else {
                    GeneratedMaterial::new(Sensitive::new(format!("data-key-plain-{}", n)))
                };
                material.with_output(OUTPUT_CIPHERTEXT_BLOB, format!("blob-{}", n))
            }
            GeneratorRequest::KmsDataKeyPair {
                without_plain_text, ..
            } => {
                let material = if without_plain_text {
                    GeneratedMaterial::without_plaintext()
                } else {
                    GeneratedMaterial::new(Sensitive::new(format!("private-key-{}", n)))
                };
                material
                    .with_output(OUTPUT_PRIVATE_KEY_CIPHERTEXT_BLOB, format!("wrapped-{}", n))
                    .with_output(OUTPUT_PUBLIC_KEY, format!("public-{}", n))
            }
        })
    }
}

/// 始终失败的生成器，模拟上游不可用。
pub struct FailingGenerator;

impl CredentialGenerator for FailingGenerator {
    fn generate(&self, _request: GeneratorRequest) -> Result<GeneratedMaterial, Error> {
        Err(Error::Generation("kms backend unavailable".into()))
    }
}
