//! # Mocking Common
//!
//! 这个 crate 提供自动替身容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`ServiceKey`] - 服务查找键（精确标识 + 泛型家族标识）
//! - [`Lifetime`] - 服务生命周期类型
//! - [`ResolutionError`] / [`VerificationError`] - 错误分类
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统的编译时安全
//! - 家族标识取自标记类型，不依赖类型显示名
//! - 缺席不是错误：未注册的解析请求返回 `None` 而非报错

pub mod errors;
pub mod key;
pub mod lifetime;

pub use errors::*;
pub use key::*;
pub use lifetime::*;
