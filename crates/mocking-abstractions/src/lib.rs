//! # Mocking Abstractions
//!
//! 自动替身容器的抽象层，定义服务契约、替身构造能力与容器的两个
//! 注入视图。
//!
//! ## 核心接口
//!
//! - [`Contract`] - 服务契约（标识 + 视图形状）
//! - [`MockConstruction`] - 替身构造能力接口
//! - [`ServiceProvider`] / [`ServiceRegistrar`] - 容器的提供者/注册表视图
//! - [`ResolveContext`] - 解析上下文与循环依赖防护
//!
//! ## 设计原则
//!
//! - 运行时不做反射：构造函数形状由各契约显式声明
//! - 被测代码只依赖视图 trait，测试时指向替身注册表即可原样运行

pub mod construction;
pub mod context;
pub mod contract;
pub mod provider;

pub use construction::*;
pub use context::*;
pub use contract::*;
pub use provider::*;
