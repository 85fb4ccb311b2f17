//!
//! # 进程级协作者抽象
//!
//! 系统时钟与安全随机源是引擎仅有的两个进程级共享资源。
//! 它们以显式注入的 trait 出现，而不是环境全局状态，
//! 以便在测试中使用确定性的实现。
//!

use crate::common::errors::Error;
use chrono::Utc;
use rand_core::{OsRng, TryRngCore};

/// 时钟抽象，返回 Unix 纪元秒。
///
/// 实现必须可在无外部锁的情况下被并发读取。
pub trait Clock: Send + Sync {
    fn now_epoch(&self) -> i64;
}

/// 使用系统 UTC 时间的默认时钟。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// 密码学安全随机源抽象。
pub trait RandomSource: Send + Sync {
    /// 用随机字节填充整个缓冲区。
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error>;
}

/// 使用操作系统随机源的默认实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), Error> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| Error::Generation(format!("OS random source unavailable: {}", e)))
    }
}
