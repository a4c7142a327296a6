//! 替身构造抽象
//!
//! 反射的显式替代：每个可替身化的契约声明自己的构造函数形状表，
//! 并提供一个以位置实参构造替身的入口。具体 mock 框架在
//! [`MockConstruction::build`] 中接入。

use crate::contract::{downcast_view, AnyView, Contract};
use crate::provider::{ServiceProvider, ServiceRequest};
use mocking_common::{ExpectationFailure, ResolutionError, ResolutionResult};
use std::sync::Arc;

/// 可验证能力
///
/// 替身实例暴露的期望检查入口：所有标记为“必须发生”的调用期望在
/// 验证时仍未被观察到，即返回失败描述。
pub trait Verifiable: Send + Sync {
    /// 校验已录制的期望；全部满足时返回 `Ok`
    fn verify_expectations(&self) -> Result<(), ExpectationFailure>;
}

/// 替身构造产物
pub struct MockParts {
    instance: AnyView,
    verifiable: Option<Arc<dyn Verifiable>>,
}

impl MockParts {
    /// 由契约视图构造产物
    pub fn of<C: Contract>(view: C::View) -> Self {
        Self {
            instance: Arc::new(view),
            verifiable: None,
        }
    }

    /// 附加验证能力
    pub fn with_verifiable(mut self, verifiable: Arc<dyn Verifiable>) -> Self {
        self.verifiable = Some(verifiable);
        self
    }

    /// 拆出实例与验证能力
    pub fn into_parts(self) -> (AnyView, Option<Arc<dyn Verifiable>>) {
        (self.instance, self.verifiable)
    }
}

/// 替身构造形状
///
/// 契约构造能力的 `Copy` 打包，随解析请求传递，使封闭泛型请求能够
/// 升级开放家族注册。
#[derive(Debug, Clone, Copy)]
pub struct MockShape {
    constructors: fn() -> Vec<ConstructorSpec>,
    build: fn(&Arguments) -> ResolutionResult<MockParts>,
}

impl MockShape {
    /// 打包契约的构造能力
    pub fn of<C: MockConstruction>() -> Self {
        Self {
            constructors: C::constructors,
            build: C::build,
        }
    }

    /// 构造函数形状表，按声明顺序
    pub fn constructors(&self) -> Vec<ConstructorSpec> {
        (self.constructors)()
    }

    /// 以位置实参构造替身
    pub fn build(&self, args: &Arguments) -> ResolutionResult<MockParts> {
        (self.build)(args)
    }
}

/// 替身构造能力（外部 mock 框架的接入点）
pub trait MockConstruction: Contract {
    /// 构造函数形状表，按声明顺序；默认视为只有无参构造
    fn constructors() -> Vec<ConstructorSpec> {
        Vec::new()
    }

    /// 以位置实参构造替身实例
    fn build(args: &Arguments) -> ResolutionResult<MockParts>;
}

/// 构造函数形状
#[derive(Debug, Clone)]
pub struct ConstructorSpec {
    name: &'static str,
    parameters: Vec<ParameterSpec>,
}

impl ConstructorSpec {
    /// 创建构造函数形状
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            parameters: Vec::new(),
        }
    }

    /// 追加单值参数
    pub fn with_parameter<C: Contract>(mut self, name: &'static str) -> Self {
        self.parameters.push(ParameterSpec::one::<C>(name));
        self
    }

    /// 追加序列参数
    pub fn with_sequence<C: Contract>(mut self, name: &'static str) -> Self {
        self.parameters.push(ParameterSpec::sequence::<C>(name));
        self
    }

    /// 构造函数名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 参数形状表
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }
}

/// 参数形状
///
/// 携带参数的解析请求与一个单态化的取值入口；取值入口负责把解析
/// 产物装配成参数声明的具体形状（序列参数装配为 `Vec<View>`）。
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    name: &'static str,
    request: ServiceRequest,
    materialize: fn(&dyn ServiceProvider) -> ResolutionResult<Option<AnyView>>,
}

impl ParameterSpec {
    /// 单值参数
    pub fn one<C: Contract>(name: &'static str) -> Self {
        Self {
            name,
            request: ServiceRequest::one::<C>(),
            materialize: materialize_one::<C>,
        }
    }

    /// 序列参数
    pub fn sequence<C: Contract>(name: &'static str) -> Self {
        Self {
            name,
            request: ServiceRequest::all::<C>(),
            materialize: materialize_all::<C>,
        }
    }

    /// 参数名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 参数的解析请求
    pub fn request(&self) -> &ServiceRequest {
        &self.request
    }

    /// 解析并装配该参数的实参
    pub fn materialize(&self, provider: &dyn ServiceProvider) -> ResolutionResult<Option<AnyView>> {
        (self.materialize)(provider)
    }
}

fn materialize_one<C: Contract>(provider: &dyn ServiceProvider) -> ResolutionResult<Option<AnyView>> {
    provider.get(&ServiceRequest::one::<C>())
}

fn materialize_all<C: Contract>(provider: &dyn ServiceProvider) -> ResolutionResult<Option<AnyView>> {
    let views = provider
        .get_all(&C::key())?
        .into_iter()
        .map(downcast_view::<C>)
        .collect::<ResolutionResult<Vec<C::View>>>()?;
    // 序列请求总能得到一个（可能为空的）序列
    Ok(Some(Arc::new(views)))
}

/// 位置实参表
///
/// 构造替身时按所选构造函数的参数顺序传递的已解析视图。
#[derive(Default)]
pub struct Arguments {
    values: Vec<ArgumentValue>,
}

struct ArgumentValue {
    name: &'static str,
    view: AnyView,
}

impl Arguments {
    /// 创建空实参表
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个实参
    pub fn push(&mut self, name: &'static str, view: AnyView) {
        self.values.push(ArgumentValue { name, view });
    }

    /// 追加契约视图实参（测试直接传参的便捷入口）
    pub fn with<C: Contract>(mut self, name: &'static str, view: C::View) -> Self {
        self.push(name, Arc::new(view));
        self
    }

    /// 实参数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有实参
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 取第 `index` 个实参并还原为契约视图
    pub fn view<C: Contract>(&self, index: usize) -> ResolutionResult<C::View> {
        downcast_view::<C>(self.value_at::<C>(index)?)
    }

    /// 取第 `index` 个序列实参
    pub fn views<C: Contract>(&self, index: usize) -> ResolutionResult<Vec<C::View>> {
        self.value_at::<C>(index)?
            .downcast::<Vec<C::View>>()
            .map(|typed| (*typed).clone())
            .map_err(|_| ResolutionError::ViewMismatch {
                service: C::service_name().to_string(),
            })
    }

    fn value_at<C: Contract>(&self, index: usize) -> ResolutionResult<AnyView> {
        self.values
            .get(index)
            .map(|value| value.view.clone())
            .ok_or_else(|| ResolutionError::MockCreationFailed {
                service: C::service_name().to_string(),
                message: format!("缺少第 {index} 个位置实参"),
            })
    }

    /// 实参名列表，按位置顺序
    pub fn names(&self) -> Vec<&'static str> {
        self.values.iter().map(|value| value.name).collect()
    }
}
