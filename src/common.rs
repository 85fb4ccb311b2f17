//!
//! # 通用基础模块
//!
//! 包含错误类型、敏感数据包装、时钟与随机源抽象以及编码工具。
//!

pub mod errors;
pub mod sensitive;
pub mod traits;
pub mod utils;

pub use errors::Error;
pub use sensitive::Sensitive;
pub use traits::{Clock, OsRandom, RandomSource, SystemClock};
pub use utils::{ZeroizingVec, constant_time_eq, from_base64, to_base64};
