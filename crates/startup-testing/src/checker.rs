//! 注册完整性检查
//!
//! 对一族生产类型执行与解析器同一契约的只读探测：配置代码注册完
//! 毕后，每个候选类型的每个构造函数参数、每个按调用注入的方法参数
//! 都必须可被满足，否则记入缺失报告。

use crate::universe::{MarkerId, TypeUniverse};
use mock_provider::MockRegistry;
use mocking_abstractions::{ServiceProvider, ServiceRegistrar};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// 缺失成员的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// 构造函数
    Constructor(&'static str),
    /// 按调用注入参数的方法
    Method(&'static str),
}

impl MemberKind {
    /// 成员名
    pub fn name(&self) -> &'static str {
        match *self {
            Self::Constructor(name) | Self::Method(name) => name,
        }
    }
}

/// 缺失注册报告项
///
/// 只由检查器产生的报告记录，创建后不再变化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRegistration {
    /// 所属类型名
    pub owning_type: &'static str,
    /// 缺失参数所在的成员
    pub member: MemberKind,
    /// 参数名
    pub parameter: &'static str,
}

impl fmt::Display for MissingRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} -> {}",
            self.owning_type,
            self.member.name(),
            self.parameter
        )
    }
}

/// 完整性检查错误类型
#[derive(Error, Debug)]
pub enum StartupTestError {
    #[error("存在未注册的依赖: [{}]", join_missing(.missing))]
    RegistrationsIncomplete { missing: Vec<MissingRegistration> },
}

fn join_missing(missing: &[MissingRegistration]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 走查标记类型的全部实现，报告解析器无法满足的每个参数
///
/// `configure` 是被重定向到替身注册表的生产配置入口，对一个全新的
/// 注册表恰好调用一次。探测是只读的：检查过程不会向注册表合成描述
/// 符，也不会创建实例，后续候选类型看到的注册表与首个候选完全相同。
/// 无参构造的类型天然不缺任何东西。
pub fn find_missing_registrations<M: ?Sized + 'static>(
    configure: impl FnOnce(&dyn ServiceRegistrar),
    universe: &dyn TypeUniverse,
) -> Vec<MissingRegistration> {
    let registry = MockRegistry::new();
    let registrar: &dyn ServiceRegistrar = registry.as_ref();
    configure(registrar);

    let marker = MarkerId::of::<M>();
    let candidates: Vec<_> = universe
        .types()
        .into_iter()
        .filter(|descriptor| descriptor.implements(marker))
        .collect();
    debug!(
        marker = std::any::type_name::<M>(),
        candidates = candidates.len(),
        "开始注册完整性检查"
    );

    let mut missing = Vec::new();
    for candidate in candidates {
        for constructor in candidate.constructors() {
            for parameter in constructor.parameters() {
                if !registry.can_provide(parameter.request()) {
                    missing.push(MissingRegistration {
                        owning_type: candidate.name(),
                        member: MemberKind::Constructor(constructor.name()),
                        parameter: parameter.name(),
                    });
                }
            }
        }
        for method in candidate.service_methods() {
            for parameter in method.parameters() {
                if !registry.can_provide(parameter.request()) {
                    missing.push(MissingRegistration {
                        owning_type: candidate.name(),
                        member: MemberKind::Method(method.name()),
                        parameter: parameter.name(),
                    });
                }
            }
        }
    }
    missing
}

/// 断言配置完整
///
/// [`find_missing_registrations`] 的断言形式：存在缺失时聚合为单个
/// 错误，一次性列出全部缺失项。
pub fn assert_registrations_complete<M: ?Sized + 'static>(
    configure: impl FnOnce(&dyn ServiceRegistrar),
    universe: &dyn TypeUniverse,
) -> Result<(), StartupTestError> {
    let missing = find_missing_registrations::<M>(configure, universe);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StartupTestError::RegistrationsIncomplete { missing })
    }
}
