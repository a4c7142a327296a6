//! # Startup Testing
//!
//! 注册完整性的静态检查：在任何行为测试运行之前，走查一族生产类型
//! 的构造函数与按调用注入的方法参数，验证配置代码注册的服务足以
//! 满足解析器将要发起的每一次依赖解析。
//!
//! ## 核心接口
//!
//! - [`TypeDescriptor`] / [`TypeUniverse`] - 候选类型的声明与来源
//! - [`find_missing_registrations`] - 返回全部缺失项，不抛错
//! - [`assert_registrations_complete`] - 聚合缺失项为单个错误
//!
//! ## 基本使用
//!
//! ```rust
//! use mocking_abstractions::{ConstructorSpec, Contract, ServiceEntry, ServiceRegistrar};
//! use mocking_common::Lifetime;
//! use startup_testing::{assert_registrations_complete, TypeDescriptor};
//! use std::sync::Arc;
//!
//! trait Handler {}
//! struct ConfigContract;
//! impl Contract for ConfigContract {
//!     type View = Arc<String>;
//! }
//!
//! struct OrderHandler;
//!
//! let universe = vec![TypeDescriptor::of::<OrderHandler>()
//!     .with_marker::<dyn Handler>()
//!     .with_constructor(
//!         ConstructorSpec::new("new").with_parameter::<ConfigContract>("config"),
//!     )];
//!
//! let outcome = assert_registrations_complete::<dyn Handler>(
//!     |registrar| registrar.register(ServiceEntry::instance::<ConfigContract>(Arc::new("cfg".to_string()))),
//!     &universe,
//! );
//! assert!(outcome.is_ok());
//! ```

pub mod checker;
pub mod universe;

pub use checker::*;
pub use universe::*;
