//!
//! # age 加密身份
//!
//! 标准 age X25519 私钥。调用方可以提供自定义的 32 字节种子
//! （base64 编码，视为秘密输入），否则由外部生成器自行取随机。
//! 实例以公开接收方字符串（recipient）寻址。
//!

use crate::common::errors::Error;
use crate::common::sensitive::Sensitive;
use crate::common::utils::{ZeroizingVec, from_base64};
use crate::descriptor::{
    CredentialSpec, FieldValue, KindDescriptor, MUTABLE_FIELDS, OutputWiring, ResourceKind,
};
use crate::generator::{GeneratedMaterial, GeneratorRequest};
use crate::renewal::RenewalPolicy;
use serde::{Deserialize, Serialize};

/// X25519 标量长度，自定义种子解码后必须恰好是这个字节数。
pub const X25519_SEED_LEN: usize = 32;

pub const FIELD_RANDOM: &str = "random";
/// 秘密输出：age 私钥。
pub const OUTPUT_KEY: &str = "key";
/// 公开输出：接收方字符串，同时作为实例标识。
pub const OUTPUT_RECIPIENT: &str = "recipient";

static DESCRIPTOR: KindDescriptor = KindDescriptor {
    kind: ResourceKind::AgeIdentity,
    mutable_fields: MUTABLE_FIELDS,
    immutable_fields: &[FIELD_RANDOM],
    delete_before_replace: false,
    wiring: &[
        OutputWiring {
            output: OUTPUT_KEY,
            sensitive: true,
            depends_on: &[FIELD_RANDOM],
        },
        OutputWiring {
            output: OUTPUT_RECIPIENT,
            sensitive: false,
            depends_on: &[FIELD_RANDOM],
        },
    ],
};

/// age 身份的声明式配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeIdentity {
    #[serde(flatten)]
    pub renewal: RenewalPolicy,
    /// 自定义随机种子：base64 编码的 32 字节，秘密输入，可选。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random: Option<Sensitive>,
}

impl AgeIdentity {
    pub fn new(renewal: RenewalPolicy) -> Self {
        Self {
            renewal,
            random: None,
        }
    }

    /// 使用调用方提供的 base64 种子。
    pub fn with_random(renewal: RenewalPolicy, random: &str) -> Self {
        Self {
            renewal,
            random: Some(Sensitive::new(random)),
        }
    }

    fn decoded_seed(&self) -> Result<Option<ZeroizingVec>, Error> {
        let Some(random) = &self.random else {
            return Ok(None);
        };
        let decoded = from_base64(random.expose())
            .map_err(|_| Error::Validation("provided random is not base64 encoded".into()))?;
        if decoded.len() != X25519_SEED_LEN {
            return Err(Error::Validation(format!(
                "provided random has incorrect({}) size",
                decoded.len()
            )));
        }
        Ok(Some(ZeroizingVec(decoded)))
    }
}

impl CredentialSpec for AgeIdentity {
    const KIND: ResourceKind = ResourceKind::AgeIdentity;

    fn descriptor() -> &'static KindDescriptor {
        &DESCRIPTOR
    }

    fn renewal(&self) -> &RenewalPolicy {
        &self.renewal
    }

    fn renewal_mut(&mut self) -> &mut RenewalPolicy {
        &mut self.renewal
    }

    fn immutable_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![(FIELD_RANDOM, FieldValue::Secret(self.random.clone()))]
    }

    fn validate(&self) -> Result<(), Error> {
        self.decoded_seed().map(|_| ())
    }

    fn generator_request(&self) -> Result<GeneratorRequest, Error> {
        Ok(GeneratorRequest::AgeIdentity {
            seed: self.decoded_seed()?,
        })
    }

    /// 新身份的接收方字符串就是它的外部标识。
    fn instance_id(&self, name: &str, material: &GeneratedMaterial) -> String {
        material
            .output(OUTPUT_RECIPIENT)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::to_base64;

    #[test]
    fn rejects_non_base64_random() {
        let spec = AgeIdentity::with_random(RenewalPolicy::default(), "%%%not-base64%%%");
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("not base64 encoded"));
    }

    #[test]
    fn rejects_wrong_sized_random() {
        let spec = AgeIdentity::with_random(RenewalPolicy::default(), &to_base64(&[7u8; 16]));
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("incorrect(16) size"));
    }

    #[test]
    fn valid_seed_reaches_generator_request_decoded() {
        let seed = [0x42u8; X25519_SEED_LEN];
        let spec = AgeIdentity::with_random(RenewalPolicy::default(), &to_base64(&seed));
        spec.validate().unwrap();
        match spec.generator_request().unwrap() {
            GeneratorRequest::AgeIdentity { seed: Some(bytes) } => {
                assert_eq!(bytes.as_ref(), seed.as_slice());
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn missing_seed_is_valid() {
        let spec = AgeIdentity::new(RenewalPolicy::new(24, 2));
        spec.validate().unwrap();
        assert_eq!(
            spec.generator_request().unwrap(),
            GeneratorRequest::AgeIdentity { seed: None }
        );
    }

    #[test]
    fn instance_id_prefers_recipient() {
        let spec = AgeIdentity::new(RenewalPolicy::default());
        let material = GeneratedMaterial::new(Sensitive::new("AGE-SECRET-KEY-1TEST"))
            .with_output(OUTPUT_RECIPIENT, "age1qtest");
        assert_eq!(spec.instance_id("my-key", &material), "age1qtest");

        let bare = GeneratedMaterial::new(Sensitive::new("AGE-SECRET-KEY-1TEST"));
        assert_eq!(spec.instance_id("my-key", &bare), "my-key");
    }

    #[test]
    fn wiring_is_consistent_with_immutable_fields() {
        assert!(AgeIdentity::descriptor().wiring_violations().is_empty());
        assert!(AgeIdentity::descriptor().is_sensitive_output(OUTPUT_KEY));
        assert!(!AgeIdentity::descriptor().is_sensitive_output(OUTPUT_RECIPIENT));
    }

    #[test]
    fn serde_uses_original_wire_names() {
        let spec = AgeIdentity::with_random(RenewalPolicy::new(24, 2), "c2VlZA==");
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"validityPeriodHours\":24"));
        assert!(json.contains("\"earlyRenewalHours\":2"));
        assert!(json.contains("\"random\":\"c2VlZA==\""));

        let without: AgeIdentity =
            serde_json::from_str("{\"validityPeriodHours\":24}").unwrap();
        assert!(without.random.is_none());
        assert_eq!(without.renewal.early_renewal_hours, 0);
    }
}
