//! # Mock Provider
//!
//! 自动替身注册表的具体实现：有序描述符集合、按需创建算法，以及
//! 供完整性检查复用的只读解析探测。
//!
//! ## 核心类型
//!
//! - [`MockRegistry`] - 替身注册表，同时实现容器的提供者与注册表视图
//! - [`MockDescriptor`] - 服务键到解析策略的绑定
//!
//! ## 基本使用
//!
//! ```rust
//! use mock_provider::MockRegistry;
//! use mocking_abstractions::{Contract, MockConstruction, MockParts, Arguments};
//! use mocking_common::{Lifetime, ResolutionResult};
//! use std::sync::Arc;
//!
//! struct ClockContract;
//!
//! impl Contract for ClockContract {
//!     type View = Arc<&'static str>;
//!     fn mock_shape() -> Option<mocking_abstractions::MockShape> {
//!         Some(mocking_abstractions::MockShape::of::<Self>())
//!     }
//! }
//!
//! impl MockConstruction for ClockContract {
//!     fn build(_args: &Arguments) -> ResolutionResult<MockParts> {
//!         Ok(MockParts::of::<Self>(Arc::new("fixed-clock")))
//!     }
//! }
//!
//! let registry = MockRegistry::new();
//! registry.register_mock::<ClockContract>(Lifetime::Transient);
//! let clock = registry.resolve::<ClockContract>().unwrap();
//! assert!(clock.is_some());
//! ```

pub mod descriptor;
pub mod registry;

mod resolver;

pub use descriptor::MockDescriptor;
pub use registry::MockRegistry;
