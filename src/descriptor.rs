//!
//! # 资源种类描述符与依赖布线表
//!
//! 四种资源的差异被压缩为一张静态描述符：哪些字段可就地更新、
//! 哪些字段不可变（变更即替换）、替换时的先删后建策略位，
//! 以及输出字段对输入字段的依赖布线。
//! 差异引擎与生命周期控制器只依赖描述符与 [`CredentialSpec`]，
//! 不对具体种类做任何特判。
//!

use crate::common::errors::Error;
use crate::common::sensitive::Sensitive;
use crate::generator::{GeneratedMaterial, GeneratorRequest};
use crate::renewal::RenewalPolicy;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fmt;

/// 受管资源的种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    AgeIdentity,
    KmsRandom,
    KmsDataKey,
    KmsDataKeyPair,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::AgeIdentity => "ageIdentity",
            ResourceKind::KmsRandom => "kmsRandom",
            ResourceKind::KmsDataKey => "kmsDataKey",
            ResourceKind::KmsDataKeyPair => "kmsDataKeyPair",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 所有种类共有的可变字段。
pub const FIELD_VALIDITY_PERIOD_HOURS: &str = "validityPeriodHours";
pub const FIELD_EARLY_RENEWAL_HOURS: &str = "earlyRenewalHours";
pub const MUTABLE_FIELDS: &[&str] = &[FIELD_EARLY_RENEWAL_HOURS, FIELD_VALIDITY_PERIOD_HOURS];

/// 参与差异比较的字段值。
///
/// `Secret` 变体通过 [`Sensitive`] 进行常量时间比较，
/// 使调用方提供的秘密输入（如 age 种子）不因比较操作泄露时序信息。
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(Option<i64>),
    Flag(bool),
    Text(Option<String>),
    Secret(Option<Sensitive>),
}

/// 单条输出布线：一个输出字段由哪些输入字段派生，以及它是否敏感。
#[derive(Debug, Clone, Copy)]
pub struct OutputWiring {
    pub output: &'static str,
    pub sensitive: bool,
    pub depends_on: &'static [&'static str],
}

/// 每种资源的静态描述符。
#[derive(Debug, Clone, Copy)]
pub struct KindDescriptor {
    pub kind: ResourceKind,
    /// 可就地更新的字段（恒为续期策略的两个字段）。
    pub mutable_fields: &'static [&'static str],
    /// 变更即触发替换的字段。
    pub immutable_fields: &'static [&'static str],
    /// 替换时是否必须先删除旧实例再创建新实例。
    /// 当新旧凭证会在外部可见的标识上冲突时为 true。
    pub delete_before_replace: bool,
    /// 依赖布线表，供外层编排系统做敏感标记与变更传播。
    pub wiring: &'static [OutputWiring],
}

impl KindDescriptor {
    /// 校验布线表与不可变字段表的一致性。
    ///
    /// 任何触发替换的字段必须出现在某条输出的依赖中，反之亦然。
    /// 返回违反约束的字段名列表，为空即一致。
    pub fn wiring_violations(&self) -> Vec<String> {
        let immutable: BTreeSet<&str> = self.immutable_fields.iter().copied().collect();
        let wired: BTreeSet<&str> = self
            .wiring
            .iter()
            .flat_map(|w| w.depends_on.iter().copied())
            .collect();

        let mut violations = Vec::new();
        for field in immutable.difference(&wired) {
            violations.push(format!("immutable field `{}` is not wired to any output", field));
        }
        for field in wired.difference(&immutable) {
            violations.push(format!("wired input `{}` is not an immutable field", field));
        }
        violations
    }

    /// 查找某个输出字段的布线。
    pub fn wiring_for(&self, output: &str) -> Option<&'static OutputWiring> {
        self.wiring.iter().find(|w| w.output == output)
    }

    /// 输出字段是否敏感。未布线的输出一律视为不敏感。
    pub fn is_sensitive_output(&self, output: &str) -> bool {
        self.wiring_for(output).is_some_and(|w| w.sensitive)
    }
}

/// 受管凭证的声明式配置。
///
/// 每种资源实现此 trait 来向通用引擎描述自己：
/// 续期策略（可变部分）、不可变字段的取值、参数校验，
/// 以及如何构造发往外部生成器的请求。
pub trait CredentialSpec:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync
{
    const KIND: ResourceKind;

    /// 本种类的静态描述符。
    fn descriptor() -> &'static KindDescriptor;

    /// 续期策略（两个可变字段）。
    fn renewal(&self) -> &RenewalPolicy;

    fn renewal_mut(&mut self) -> &mut RenewalPolicy;

    /// 不可变字段及其当前取值，顺序与描述符中的 `immutable_fields` 一致。
    fn immutable_fields(&self) -> Vec<(&'static str, FieldValue)>;

    /// 校验种类特定参数。默认无须校验。
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }

    /// 构造发往外部生成器的请求，携带解码后的不可变参数。
    fn generator_request(&self) -> Result<GeneratorRequest, Error>;

    /// 实例标识。默认使用调用方提供的名称；
    /// 以公开材料寻址的种类（age）覆写此方法。
    fn instance_id(&self, name: &str, _material: &GeneratedMaterial) -> String {
        name.to_string()
    }

    /// 将 `desired` 中的可变字段复制到自身，不可变字段与材料不受影响。
    fn apply_mutable(&mut self, desired: &Self) {
        *self.renewal_mut() = desired.renewal().clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serde_uses_camel_case() {
        assert_eq!(
            serde_json::to_string(&ResourceKind::KmsDataKeyPair).unwrap(),
            "\"kmsDataKeyPair\""
        );
        let kind: ResourceKind = serde_json::from_str("\"ageIdentity\"").unwrap();
        assert_eq!(kind, ResourceKind::AgeIdentity);
    }

    #[test]
    fn secret_field_values_compare_by_value() {
        let a = FieldValue::Secret(Some(Sensitive::new("seed")));
        let b = FieldValue::Secret(Some(Sensitive::new("seed")));
        let c = FieldValue::Secret(None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn wiring_violations_flags_both_directions() {
        static BROKEN: KindDescriptor = KindDescriptor {
            kind: ResourceKind::KmsRandom,
            mutable_fields: MUTABLE_FIELDS,
            immutable_fields: &["numberOfBytes", "unwired"],
            delete_before_replace: false,
            wiring: &[OutputWiring {
                output: "plaintext",
                sensitive: true,
                depends_on: &["numberOfBytes", "notImmutable"],
            }],
        };
        let violations = BROKEN.wiring_violations();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.contains("unwired")));
        assert!(violations.iter().any(|v| v.contains("notImmutable")));
    }
}
