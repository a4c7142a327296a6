//! 服务标识定义
//!
//! 提供服务查找所用的键：精确类型标识，加上独立的泛型家族标识。

use std::any::TypeId;
use std::fmt;

/// 泛型家族标识
///
/// 同一开放泛型的所有封闭实例共享一个家族标识。标识取自一个非泛型
/// 标记类型的 `TypeId`，而不是类型显示名，避免跨模块短名冲突引起的
/// 误匹配。非泛型服务默认以自身类型作为家族。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FamilyId(TypeId);

impl FamilyId {
    /// 取标记类型的家族标识
    pub fn of<M: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<M>())
    }
}

/// 服务键
///
/// 查找所用的身份。两个键**精确相等**指精确标识一致；**同族**指家族
/// 标识一致而精确标识不同（开放泛型注册对封闭泛型请求的匹配依据）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    id: TypeId,
    family: FamilyId,
    name: &'static str,
}

impl ServiceKey {
    /// 构造服务键
    pub fn new(id: TypeId, family: FamilyId, name: &'static str) -> Self {
        Self { id, family, name }
    }

    /// 取类型自身的服务键（家族即自身）
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(
            TypeId::of::<T>(),
            FamilyId::of::<T>(),
            std::any::type_name::<T>(),
        )
    }

    /// 精确类型标识
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 泛型家族标识
    pub fn family(&self) -> FamilyId {
        self.family
    }

    /// 服务显示名（仅用于日志与报告，不参与匹配）
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 简短显示名（不含模块路径）
    pub fn short_name(&self) -> &str {
        self.name.split("::").last().unwrap_or(self.name)
    }

    /// 两键是否精确相等
    pub fn exact_matches(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// 两键是否同族（家族一致且精确标识不同）
    pub fn family_matches(&self, other: &Self) -> bool {
        self.family == other.family && self.id != other.id
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
