//! 类型全集声明
//!
//! 反射边界的显式替代：参与完整性检查的生产类型以声明的方式描述
//! 自己的标记归属、构造函数与按调用注入的方法参数。

use mocking_abstractions::{ConstructorSpec, ParameterSpec};
use std::any::TypeId;

/// 标记类型标识
///
/// 完整性检查以标记类型圈定候选类型集合；接口实现与基类派生在声明
/// 模型里合并为同一种“归属于标记”的关系。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(TypeId);

impl MarkerId {
    /// 取标记类型的标识
    pub fn of<M: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<M>())
    }
}

/// 按调用注入参数的方法形状
///
/// 只声明携带注入标记的参数；未声明的方法参数不参与检查。
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: &'static str,
    parameters: Vec<ParameterSpec>,
}

impl MethodSpec {
    /// 创建方法形状
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            parameters: Vec::new(),
        }
    }

    /// 追加按调用注入的单值参数
    pub fn with_parameter<C: mocking_abstractions::Contract>(mut self, name: &'static str) -> Self {
        self.parameters.push(ParameterSpec::one::<C>(name));
        self
    }

    /// 追加按调用注入的序列参数
    pub fn with_sequence<C: mocking_abstractions::Contract>(mut self, name: &'static str) -> Self {
        self.parameters.push(ParameterSpec::sequence::<C>(name));
        self
    }

    /// 方法名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 注入参数形状表
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }
}

/// 候选类型描述
///
/// 一个生产类型为完整性检查声明的全部形状。
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: &'static str,
    markers: Vec<MarkerId>,
    constructors: Vec<ConstructorSpec>,
    service_methods: Vec<MethodSpec>,
}

impl TypeDescriptor {
    /// 以类型名创建描述
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            markers: Vec::new(),
            constructors: Vec::new(),
            service_methods: Vec::new(),
        }
    }

    /// 声明归属的标记类型
    pub fn with_marker<M: ?Sized + 'static>(mut self) -> Self {
        self.markers.push(MarkerId::of::<M>());
        self
    }

    /// 声明一个构造函数
    pub fn with_constructor(mut self, constructor: ConstructorSpec) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// 声明一个按调用注入参数的方法
    pub fn with_service_method(mut self, method: MethodSpec) -> Self {
        self.service_methods.push(method);
        self
    }

    /// 类型名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 是否归属于指定标记
    pub fn implements(&self, marker: MarkerId) -> bool {
        self.markers.contains(&marker)
    }

    /// 构造函数形状表，按声明顺序
    pub fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }

    /// 注入方法形状表
    pub fn service_methods(&self) -> &[MethodSpec] {
        &self.service_methods
    }
}

/// 类型全集
///
/// 完整性检查遍历的候选类型来源；对应“枚举程序集内全部类型”的
/// 外部能力。
pub trait TypeUniverse {
    /// 全集中的所有类型描述
    fn types(&self) -> Vec<&TypeDescriptor>;
}

impl TypeUniverse for [TypeDescriptor] {
    fn types(&self) -> Vec<&TypeDescriptor> {
        self.iter().collect()
    }
}

impl TypeUniverse for Vec<TypeDescriptor> {
    fn types(&self) -> Vec<&TypeDescriptor> {
        self.iter().collect()
    }
}
