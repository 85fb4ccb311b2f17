//!
//! # AWS KMS 支撑的凭证
//!
//! 三种围绕 KMS 生成原语的资源：随机字节串、对称数据密钥、数据密钥对。
//! KMS 侧的工件彼此独立寻址，替换时无需先删后建。
//!

use crate::common::errors::Error;
use crate::descriptor::{
    CredentialSpec, FieldValue, KindDescriptor, MUTABLE_FIELDS, OutputWiring, ResourceKind,
};
use crate::generator::GeneratorRequest;
use crate::renewal::RenewalPolicy;
use serde::{Deserialize, Serialize};

pub const FIELD_NUMBER_OF_BYTES: &str = "numberOfBytes";
pub const FIELD_CUSTOM_KEY_STORE_ID: &str = "customKeyStoreId";
pub const FIELD_KEY_ID: &str = "keyId";
pub const FIELD_KEY_SPEC: &str = "keySpec";
pub const FIELD_KEY_PAIR_SPEC: &str = "keyPairSpec";
pub const FIELD_WITHOUT_PLAIN_TEXT: &str = "withoutPlainText";

/// 秘密输出：明文随机字节 / 明文数据密钥。
pub const OUTPUT_PLAINTEXT: &str = "plaintext";
pub const OUTPUT_CIPHERTEXT_BLOB: &str = "ciphertextBlob";
/// 秘密输出：明文私钥。
pub const OUTPUT_PRIVATE_KEY: &str = "privateKey";
pub const OUTPUT_PRIVATE_KEY_CIPHERTEXT_BLOB: &str = "privateKeyCiphertextBlob";
pub const OUTPUT_PUBLIC_KEY: &str = "publicKey";

/// KMS 允许的随机字节数与数据密钥字节数范围。
const NUMBER_OF_BYTES_RANGE: std::ops::RangeInclusive<i64> = 1..=1024;

/// 对称数据密钥的规格。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKeySpec {
    #[serde(rename = "AES_128")]
    Aes128,
    #[serde(rename = "AES_256")]
    Aes256,
}

impl DataKeySpec {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKeySpec::Aes128 => "AES_128",
            DataKeySpec::Aes256 => "AES_256",
        }
    }
}

/// 数据密钥对的规格，取值与 KMS 线上字符串一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKeyPairSpec {
    #[serde(rename = "RSA_2048")]
    Rsa2048,
    #[serde(rename = "RSA_3072")]
    Rsa3072,
    #[serde(rename = "RSA_4096")]
    Rsa4096,
    #[serde(rename = "ECC_NIST_P256")]
    EccNistP256,
    #[serde(rename = "ECC_NIST_P384")]
    EccNistP384,
    #[serde(rename = "ECC_NIST_P521")]
    EccNistP521,
    #[serde(rename = "ECC_SECG_P256K1")]
    EccSecgP256k1,
    #[serde(rename = "SM2")]
    Sm2,
}

impl DataKeyPairSpec {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKeyPairSpec::Rsa2048 => "RSA_2048",
            DataKeyPairSpec::Rsa3072 => "RSA_3072",
            DataKeyPairSpec::Rsa4096 => "RSA_4096",
            DataKeyPairSpec::EccNistP256 => "ECC_NIST_P256",
            DataKeyPairSpec::EccNistP384 => "ECC_NIST_P384",
            DataKeyPairSpec::EccNistP521 => "ECC_NIST_P521",
            DataKeyPairSpec::EccSecgP256k1 => "ECC_SECG_P256K1",
            DataKeyPairSpec::Sm2 => "SM2",
        }
    }
}

fn validate_number_of_bytes(n: i64) -> Result<(), Error> {
    if !NUMBER_OF_BYTES_RANGE.contains(&n) {
        return Err(Error::Validation(format!(
            "numberOfBytes must be between 1 and 1024, got {}",
            n
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Random
// ---------------------------------------------------------------------------

static RANDOM_DESCRIPTOR: KindDescriptor = KindDescriptor {
    kind: ResourceKind::KmsRandom,
    mutable_fields: MUTABLE_FIELDS,
    immutable_fields: &[FIELD_CUSTOM_KEY_STORE_ID, FIELD_NUMBER_OF_BYTES],
    delete_before_replace: false,
    wiring: &[OutputWiring {
        output: OUTPUT_PLAINTEXT,
        sensitive: true,
        depends_on: &[FIELD_NUMBER_OF_BYTES, FIELD_CUSTOM_KEY_STORE_ID],
    }],
};

/// 密码学安全的随机字节串。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsRandom {
    #[serde(flatten)]
    pub renewal: RenewalPolicy,
    /// 生成的字节数，1 到 1024。
    pub number_of_bytes: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_key_store_id: Option<String>,
}

impl KmsRandom {
    pub fn new(renewal: RenewalPolicy, number_of_bytes: i64) -> Self {
        Self {
            renewal,
            number_of_bytes,
            custom_key_store_id: None,
        }
    }
}

impl CredentialSpec for KmsRandom {
    const KIND: ResourceKind = ResourceKind::KmsRandom;

    fn descriptor() -> &'static KindDescriptor {
        &RANDOM_DESCRIPTOR
    }

    fn renewal(&self) -> &RenewalPolicy {
        &self.renewal
    }

    fn renewal_mut(&mut self) -> &mut RenewalPolicy {
        &mut self.renewal
    }

    fn immutable_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            (
                FIELD_CUSTOM_KEY_STORE_ID,
                FieldValue::Text(self.custom_key_store_id.clone()),
            ),
            (
                FIELD_NUMBER_OF_BYTES,
                FieldValue::Int(Some(self.number_of_bytes)),
            ),
        ]
    }

    fn validate(&self) -> Result<(), Error> {
        validate_number_of_bytes(self.number_of_bytes)
    }

    fn generator_request(&self) -> Result<GeneratorRequest, Error> {
        Ok(GeneratorRequest::KmsRandom {
            number_of_bytes: self.number_of_bytes,
            custom_key_store_id: self.custom_key_store_id.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// DataKey
// ---------------------------------------------------------------------------

static DATA_KEY_DESCRIPTOR: KindDescriptor = KindDescriptor {
    kind: ResourceKind::KmsDataKey,
    mutable_fields: MUTABLE_FIELDS,
    immutable_fields: &[
        FIELD_KEY_ID,
        FIELD_KEY_SPEC,
        FIELD_NUMBER_OF_BYTES,
        FIELD_WITHOUT_PLAIN_TEXT,
    ],
    delete_before_replace: false,
    wiring: &[
        OutputWiring {
            output: OUTPUT_PLAINTEXT,
            sensitive: true,
            depends_on: &[
                FIELD_KEY_ID,
                FIELD_KEY_SPEC,
                FIELD_NUMBER_OF_BYTES,
                FIELD_WITHOUT_PLAIN_TEXT,
            ],
        },
        OutputWiring {
            output: OUTPUT_CIPHERTEXT_BLOB,
            sensitive: false,
            depends_on: &[FIELD_KEY_ID, FIELD_KEY_SPEC, FIELD_NUMBER_OF_BYTES],
        },
    ],
};

/// 在 KMS 之外使用的对称数据密钥。
///
/// `keySpec` 与 `numberOfBytes` 必须且只能指定其一。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsDataKey {
    #[serde(flatten)]
    pub renewal: RenewalPolicy,
    /// 用于加密数据密钥的 KMS 密钥标识。
    pub key_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_spec: Option<DataKeySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_bytes: Option<i64>,
    /// 是否只生成密文、不在输出中携带明文。
    #[serde(default)]
    pub without_plain_text: bool,
}

impl KmsDataKey {
    pub fn new(renewal: RenewalPolicy, key_id: impl Into<String>, key_spec: DataKeySpec) -> Self {
        Self {
            renewal,
            key_id: key_id.into(),
            key_spec: Some(key_spec),
            number_of_bytes: None,
            without_plain_text: false,
        }
    }
}

impl CredentialSpec for KmsDataKey {
    const KIND: ResourceKind = ResourceKind::KmsDataKey;

    fn descriptor() -> &'static KindDescriptor {
        &DATA_KEY_DESCRIPTOR
    }

    fn renewal(&self) -> &RenewalPolicy {
        &self.renewal
    }

    fn renewal_mut(&mut self) -> &mut RenewalPolicy {
        &mut self.renewal
    }

    fn immutable_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            (FIELD_KEY_ID, FieldValue::Text(Some(self.key_id.clone()))),
            (
                FIELD_KEY_SPEC,
                FieldValue::Text(self.key_spec.map(|s| s.as_str().to_string())),
            ),
            (FIELD_NUMBER_OF_BYTES, FieldValue::Int(self.number_of_bytes)),
            (
                FIELD_WITHOUT_PLAIN_TEXT,
                FieldValue::Flag(self.without_plain_text),
            ),
        ]
    }

    fn validate(&self) -> Result<(), Error> {
        match (self.key_spec, self.number_of_bytes) {
            (Some(_), Some(_)) => Err(Error::Validation(
                "specify either keySpec or numberOfBytes, but not both".into(),
            )),
            (None, None) => Err(Error::Validation(
                "either keySpec or numberOfBytes is required".into(),
            )),
            (None, Some(n)) => validate_number_of_bytes(n),
            (Some(_), None) => Ok(()),
        }
    }

    fn generator_request(&self) -> Result<GeneratorRequest, Error> {
        Ok(GeneratorRequest::KmsDataKey {
            key_id: self.key_id.clone(),
            key_spec: self.key_spec,
            number_of_bytes: self.number_of_bytes,
            without_plain_text: self.without_plain_text,
        })
    }
}

// ---------------------------------------------------------------------------
// DataKeyPair
// ---------------------------------------------------------------------------

static DATA_KEY_PAIR_DESCRIPTOR: KindDescriptor = KindDescriptor {
    kind: ResourceKind::KmsDataKeyPair,
    mutable_fields: MUTABLE_FIELDS,
    immutable_fields: &[FIELD_KEY_ID, FIELD_KEY_PAIR_SPEC, FIELD_WITHOUT_PLAIN_TEXT],
    delete_before_replace: false,
    wiring: &[
        OutputWiring {
            output: OUTPUT_PRIVATE_KEY,
            sensitive: true,
            depends_on: &[FIELD_KEY_ID, FIELD_KEY_PAIR_SPEC, FIELD_WITHOUT_PLAIN_TEXT],
        },
        OutputWiring {
            output: OUTPUT_PRIVATE_KEY_CIPHERTEXT_BLOB,
            sensitive: false,
            depends_on: &[FIELD_KEY_ID, FIELD_KEY_PAIR_SPEC],
        },
        OutputWiring {
            output: OUTPUT_PUBLIC_KEY,
            sensitive: false,
            depends_on: &[FIELD_KEY_ID, FIELD_KEY_PAIR_SPEC],
        },
    ],
};

/// 非对称数据密钥对，私钥以 KMS 密钥加密后留存。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KmsDataKeyPair {
    #[serde(flatten)]
    pub renewal: RenewalPolicy,
    pub key_id: String,
    pub key_pair_spec: DataKeyPairSpec,
    #[serde(default)]
    pub without_plain_text: bool,
}

impl KmsDataKeyPair {
    pub fn new(
        renewal: RenewalPolicy,
        key_id: impl Into<String>,
        key_pair_spec: DataKeyPairSpec,
    ) -> Self {
        Self {
            renewal,
            key_id: key_id.into(),
            key_pair_spec,
            without_plain_text: false,
        }
    }
}

impl CredentialSpec for KmsDataKeyPair {
    const KIND: ResourceKind = ResourceKind::KmsDataKeyPair;

    fn descriptor() -> &'static KindDescriptor {
        &DATA_KEY_PAIR_DESCRIPTOR
    }

    fn renewal(&self) -> &RenewalPolicy {
        &self.renewal
    }

    fn renewal_mut(&mut self) -> &mut RenewalPolicy {
        &mut self.renewal
    }

    fn immutable_fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            (FIELD_KEY_ID, FieldValue::Text(Some(self.key_id.clone()))),
            (
                FIELD_KEY_PAIR_SPEC,
                FieldValue::Text(Some(self.key_pair_spec.as_str().to_string())),
            ),
            (
                FIELD_WITHOUT_PLAIN_TEXT,
                FieldValue::Flag(self.without_plain_text),
            ),
        ]
    }

    fn generator_request(&self) -> Result<GeneratorRequest, Error> {
        Ok(GeneratorRequest::KmsDataKeyPair {
            key_id: self.key_id.clone(),
            key_pair_spec: self.key_pair_spec,
            without_plain_text: self.without_plain_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_rejects_out_of_range_byte_count() {
        let spec = KmsRandom::new(RenewalPolicy::default(), 0);
        assert!(matches!(spec.validate(), Err(Error::Validation(_))));
        let spec = KmsRandom::new(RenewalPolicy::default(), 1025);
        assert!(spec.validate().unwrap_err().to_string().contains("1025"));
        KmsRandom::new(RenewalPolicy::default(), 1024).validate().unwrap();
    }

    #[test]
    fn data_key_requires_exactly_one_of_spec_and_bytes() {
        let mut spec = KmsDataKey::new(RenewalPolicy::default(), "alias/app", DataKeySpec::Aes256);
        spec.validate().unwrap();

        spec.number_of_bytes = Some(32);
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("but not both"));

        spec.key_spec = None;
        spec.validate().unwrap();

        spec.number_of_bytes = None;
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn data_key_byte_count_is_range_checked() {
        let mut spec = KmsDataKey::new(RenewalPolicy::default(), "alias/app", DataKeySpec::Aes256);
        spec.key_spec = None;
        spec.number_of_bytes = Some(4096);
        assert!(matches!(spec.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn all_descriptors_have_consistent_wiring() {
        for descriptor in [
            KmsRandom::descriptor(),
            KmsDataKey::descriptor(),
            KmsDataKeyPair::descriptor(),
        ] {
            assert!(
                descriptor.wiring_violations().is_empty(),
                "inconsistent wiring for {}",
                descriptor.kind
            );
        }
    }

    #[test]
    fn spec_enums_use_kms_wire_strings() {
        assert_eq!(
            serde_json::to_string(&DataKeySpec::Aes256).unwrap(),
            "\"AES_256\""
        );
        assert_eq!(
            serde_json::to_string(&DataKeyPairSpec::EccSecgP256k1).unwrap(),
            "\"ECC_SECG_P256K1\""
        );
        let spec: DataKeyPairSpec = serde_json::from_str("\"RSA_2048\"").unwrap();
        assert_eq!(spec, DataKeyPairSpec::Rsa2048);
    }

    #[test]
    fn serde_uses_original_wire_names() {
        let spec = KmsDataKeyPair::new(
            RenewalPolicy::new(24, 2),
            "alias/app",
            DataKeyPairSpec::Rsa2048,
        );
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"keyId\":\"alias/app\""));
        assert!(json.contains("\"keyPairSpec\":\"RSA_2048\""));
        assert!(json.contains("\"withoutPlainText\":false"));
        assert!(json.contains("\"validityPeriodHours\":24"));
    }

    #[test]
    fn data_key_immutable_fields_match_descriptor_order() {
        let spec = KmsDataKey::new(RenewalPolicy::default(), "alias/app", DataKeySpec::Aes128);
        let fields = spec.immutable_fields();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, KmsDataKey::descriptor().immutable_fields);
    }
}
