//!
//! # 生命周期控制器
//!
//! 面向外层编排系统的四个操作：创建、差异、就地更新、删除。
//! 每个操作同步执行，完全闭合于自身参数之上；
//! 引擎不在实例之间共享任何可变状态，多个实例可被并发操作。
//!
//! 创建是事务性的：失败的创建不留下任何状态。
//! 差异与过期判定是纯函数；删除从不失败。
//!

use crate::common::errors::Error;
use crate::common::sensitive::Sensitive;
use crate::common::traits::{Clock, SystemClock};
use crate::descriptor::CredentialSpec;
use crate::diff::{self, DiffReport};
use crate::generator::CredentialGenerator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 一次成功创建后留存的全部状态。
///
/// 仅由成功的创建产生；除生命周期控制器外对一切保持不透明。
/// 留存的配置副本是下一次差异比较的基线。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Materialized<S> {
    /// 产生本状态的配置副本。
    pub config: S,
    /// 生成的秘密材料，始终敏感；`withoutPlainText` 时为空。
    pub secret: Sensitive,
    /// 生成的公开/密文材料，按输出字段名命名。
    pub outputs: BTreeMap<String, String>,
    /// 创建时间（纪元秒）。
    pub created_at: i64,
}

impl<S: CredentialSpec> Materialized<S> {
    /// 序列化为JSON
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// 从JSON反序列化
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 创建操作的结果：实例标识与物化状态。
#[derive(Debug, Clone)]
pub struct CreatedInstance<S> {
    pub id: String,
    pub state: Materialized<S>,
}

/// 差异操作的结果，附带本种类的替换顺序策略位。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResponse {
    pub changes: DiffReport,
    pub has_changes: bool,
    /// 替换时是否必须先删旧后建新。
    pub delete_before_replace: bool,
}

/// 生命周期控制器。
///
/// 时钟与生成器以显式注入的协作者出现，测试中可替换为确定性实现。
pub struct LifecycleEngine {
    generator: Arc<dyn CredentialGenerator>,
    clock: Arc<dyn Clock>,
}

impl LifecycleEngine {
    /// 使用系统时钟创建控制器。
    pub fn new(generator: Arc<dyn CredentialGenerator>) -> Self {
        Self::with_clock(generator, Arc::new(SystemClock))
    }

    pub fn with_clock(generator: Arc<dyn CredentialGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { generator, clock }
    }

    /// 创建实例。
    ///
    /// `dry_run` 时返回 `Ok(None)`，不触碰生成器，无任何副作用。
    /// 否则校验种类参数、调用生成器、以当前时间落下 `created_at`，
    /// 并留存一份期望配置作为下次差异比较的基线。
    /// 生成器失败时原样传播错误，不产生任何状态。
    pub fn create<S: CredentialSpec>(
        &self,
        name: &str,
        desired: &S,
        dry_run: bool,
    ) -> Result<Option<CreatedInstance<S>>, Error> {
        if dry_run {
            return Ok(None);
        }
        desired.validate()?;
        let request = desired.generator_request()?;
        let material = self.generator.generate(request)?;
        let id = desired.instance_id(name, &material);
        let state = Materialized {
            config: desired.clone(),
            secret: material.secret,
            outputs: material.outputs,
            created_at: self.clock.now_epoch(),
        };
        debug!(kind = %S::KIND, id = %id, "credential created");
        Ok(Some(CreatedInstance { id, state }))
    }

    /// 计算期望配置相对留存状态的差异。纯操作，不改变任何状态。
    pub fn diff<S: CredentialSpec>(
        &self,
        id: &str,
        desired: &S,
        stored: &Materialized<S>,
    ) -> DiffResponse {
        let changes = diff::diff(
            desired,
            &stored.config,
            stored.created_at,
            self.clock.now_epoch(),
        );
        if changes.is_expired() {
            warn!(
                "key {} is about to expire, will be replaced if perform this update!",
                id
            );
        }
        DiffResponse {
            has_changes: changes.has_changes(),
            delete_before_replace: S::descriptor().delete_before_replace,
            changes,
        }
    }

    /// 就地更新：仅将期望配置中的可变字段复制进留存配置。
    ///
    /// 秘密材料、公开材料与 `created_at` 保持原样。
    /// `dry_run` 时返回 `None`。
    pub fn update<S: CredentialSpec>(
        &self,
        desired: &S,
        stored: &Materialized<S>,
        dry_run: bool,
    ) -> Option<Materialized<S>> {
        if dry_run {
            return None;
        }
        let mut next = stored.clone();
        next.config.apply_mutable(desired);
        Some(next)
    }

    /// 删除实例：丢弃内存中的状态。
    ///
    /// 不向外部服务发出任何撤销调用；幂等，从不失败。
    /// 秘密材料随状态析构被擦除。
    pub fn delete<S: CredentialSpec>(&self, id: &str, stored: Materialized<S>) {
        debug!(kind = %S::KIND, id = %id, "credential state discarded");
        drop(stored);
    }
}
