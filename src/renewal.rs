//!
//! # 续期策略与过期判定
//!
//! 每种资源都共享同一对可变字段：有效期与提前续期窗口。
//! 过期判定是纯函数，给定输入即可确定结果，从不失败。
//!

use serde::{Deserialize, Serialize};

/// 每小时的秒数。有效期与续期窗口统一按小时 × 3600 换算。
pub const SECONDS_PER_HOUR: i64 = 3600;

/// 凭证续期策略，即所有资源种类共有的两个可就地更新的字段。
///
/// `validity_period_hours` 为 0 表示凭证永不过期。
/// `early_renewal_hours` 表示在到期前多少小时就将凭证视为待替换。
/// 引擎不校验 `early_renewal_hours <= validity_period_hours`；
/// 违反时续期时间点会落在创建时间之前，凭证在创建后立即被报告为过期，
/// 这是对调用方配置的原样传递。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RenewalPolicy {
    /// 凭证自签发起的有效小时数，0 表示永不过期。
    pub validity_period_hours: i64,
    /// 到期前多少小时触发续期。
    pub early_renewal_hours: i64,
}

impl RenewalPolicy {
    pub fn new(validity_period_hours: i64, early_renewal_hours: i64) -> Self {
        Self {
            validity_period_hours,
            early_renewal_hours,
        }
    }

    /// 计算续期时间点（纪元秒）。永不过期时返回 `None`。
    pub fn renew_at(&self, created_at: i64) -> Option<i64> {
        if self.validity_period_hours == 0 {
            return None;
        }
        Some(
            created_at
                + (self.validity_period_hours - self.early_renewal_hours) * SECONDS_PER_HOUR,
        )
    }

    /// 判断凭证是否应被视为过期。边界时刻（`now == renew_at`）视为已过期。
    pub fn is_expired(&self, created_at: i64, now: i64) -> bool {
        match self.renew_at(created_at) {
            Some(renew_at) => now >= renew_at,
            None => false,
        }
    }
}
