//!
//! # 字段差异引擎
//!
//! 比较期望配置与上次成功创建时留存的配置，把每个变更字段归类为
//! 可就地更新（`Update`）或触发替换（`Replace`），并把过期信号
//! 以保留字段名 `"expired"` 折叠进结果。
//!
//! 引擎是纯函数：给定相同输入产生相同输出，无副作用，从不失败。
//! 所有种类共用同一实现，差异仅来自描述符与 [`CredentialSpec`]。
//!

use crate::descriptor::{
    CredentialSpec, FIELD_EARLY_RENEWAL_HOURS, FIELD_VALIDITY_PERIOD_HOURS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 过期信号的保留字段名，从不出现在期望配置中。
pub const FIELD_EXPIRED: &str = "expired";

/// 单个字段的变更类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// 可就地更新，不触碰已生成的材料。
    Update,
    /// 必须销毁并重新生成凭证。
    Replace,
}

/// 资源级别的计划动作，由变更映射按"替换优先"规则折叠而来。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// 无任何变更。
    Unchanged,
    /// 仅有可就地更新的字段变更。
    Update,
    /// 存在至少一个替换级变更，整个资源按替换处理。
    Replace,
}

/// 差异结果：字段名到变更类别的映射。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    changes: BTreeMap<String, ChangeKind>,
}

impl DiffReport {
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<ChangeKind> {
        self.changes.get(field).copied()
    }

    /// 是否包含过期触发的替换条目。
    pub fn is_expired(&self) -> bool {
        self.changes.contains_key(FIELD_EXPIRED)
    }

    /// 是否存在任何替换级变更。
    pub fn requires_replacement(&self) -> bool {
        self.changes.values().any(|k| *k == ChangeKind::Replace)
    }

    /// 按"任一 Replace 即整体替换"的规则折叠为资源级动作。
    ///
    /// 混合了 Update 与 Replace 的变更不做部分更新，
    /// 避免更新后的策略字段与陈旧材料并存。
    pub fn action(&self) -> PlanAction {
        if self.requires_replacement() {
            PlanAction::Replace
        } else if self.has_changes() {
            PlanAction::Update
        } else {
            PlanAction::Unchanged
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ChangeKind)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn record(&mut self, field: impl Into<String>, kind: ChangeKind) {
        self.changes.insert(field.into(), kind);
    }
}

/// 计算期望配置与留存配置之间的差异。
///
/// 过期判定使用**留存**配置的续期策略与凭证的创建时间；
/// 仅当**期望**配置的有效期不为 0 时才记录过期替换，
/// 这样调用方可以通过将有效期改为 0 来停止一个已过期凭证的轮换。
pub fn diff<S: CredentialSpec>(desired: &S, stored: &S, created_at: i64, now: i64) -> DiffReport {
    let mut report = DiffReport::default();

    let desired_renewal = desired.renewal();
    let stored_renewal = stored.renewal();
    if desired_renewal.early_renewal_hours != stored_renewal.early_renewal_hours {
        report.record(FIELD_EARLY_RENEWAL_HOURS, ChangeKind::Update);
    }
    if desired_renewal.validity_period_hours != stored_renewal.validity_period_hours {
        report.record(FIELD_VALIDITY_PERIOD_HOURS, ChangeKind::Update);
    }

    for ((field, desired_value), (_, stored_value)) in desired
        .immutable_fields()
        .into_iter()
        .zip(stored.immutable_fields())
    {
        if desired_value != stored_value {
            report.record(field, ChangeKind::Replace);
        }
    }

    if desired_renewal.validity_period_hours != 0 && stored_renewal.is_expired(created_at, now) {
        report.record(FIELD_EXPIRED, ChangeKind::Replace);
    }

    report
}
