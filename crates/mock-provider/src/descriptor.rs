//! 替身描述符
//!
//! 将服务键绑定到解析策略、生命周期与一次性创建槽。

use mocking_abstractions::{AnyView, EntryPayload, MockShape, ServiceEntry, ServiceFactory, Verifiable};
use mocking_common::{ExpectationFailure, Lifetime, ServiceKey};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// 容器自引用视图种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContainerView {
    /// 容器即提供者
    Provider,
    /// 容器即注册表
    Registrar,
}

/// 解析策略
///
/// 每个描述符恰好携带一种策略。
pub(crate) enum Strategy {
    /// 预置真实实例（实例在创建槽中生而有值）
    Instance,
    /// 按需构造的自动替身
    AutoMock { shape: Option<MockShape> },
    /// 工厂构造
    Factory { factory: ServiceFactory },
    /// 容器自引用视图
    Container { view: ContainerView },
}

/// 创建槽内容：实例视图与可选的验证能力
#[derive(Clone)]
pub(crate) struct CreatedService {
    pub(crate) view: AnyView,
    pub(crate) verifiable: Option<Arc<dyn Verifiable>>,
}

/// 替身描述符
///
/// 不可变身份：键、生命周期与策略在构造后不再变化；唯一的可变状态
/// 是写一次的创建槽。
pub struct MockDescriptor {
    key: ServiceKey,
    lifetime: Lifetime,
    strategy: Strategy,
    slot: OnceCell<CreatedService>,
}

impl MockDescriptor {
    /// 由注册条目生成描述符
    pub(crate) fn from_entry(entry: ServiceEntry) -> Self {
        let (key, lifetime, payload) = entry.into_parts();
        match payload {
            EntryPayload::Instance { view, verifiable } => {
                let slot = OnceCell::new();
                let _ = slot.set(CreatedService { view, verifiable });
                Self {
                    key,
                    lifetime,
                    strategy: Strategy::Instance,
                    slot,
                }
            }
            EntryPayload::AutoMock { shape } => Self {
                key,
                lifetime,
                strategy: Strategy::AutoMock { shape },
                slot: OnceCell::new(),
            },
            EntryPayload::Factory { factory } => Self {
                key,
                lifetime,
                strategy: Strategy::Factory { factory },
                slot: OnceCell::new(),
            },
        }
    }

    /// 容器自引用描述符
    pub(crate) fn container(key: ServiceKey, view: ContainerView) -> Self {
        Self {
            key,
            lifetime: Lifetime::Singleton,
            strategy: Strategy::Container { view },
            slot: OnceCell::new(),
        }
    }

    /// 服务键
    pub fn key(&self) -> ServiceKey {
        self.key
    }

    /// 生命周期
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// 实例是否已创建
    ///
    /// 真实实例与容器自引用注册从诞生起即视为已创建。
    pub fn is_created(&self) -> bool {
        matches!(self.strategy, Strategy::Container { .. }) || self.slot.get().is_some()
    }

    pub(crate) fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub(crate) fn created(&self) -> Option<CreatedService> {
        self.slot.get().cloned()
    }

    /// 以“先建后占”的方式写入创建槽
    ///
    /// 竞争失败方丢弃自建值并采用先到者的实例。
    pub(crate) fn adopt(&self, created: CreatedService) -> CreatedService {
        match self.slot.try_insert(created) {
            Ok(stored) => stored.clone(),
            Err((stored, _discarded)) => stored.clone(),
        }
    }

    /// 携带请求方形状时，该注册能否创建实例
    pub(crate) fn is_creatable_with(&self, requester_shape: Option<MockShape>) -> bool {
        match &self.strategy {
            Strategy::Instance | Strategy::Factory { .. } | Strategy::Container { .. } => true,
            Strategy::AutoMock { shape } => shape.is_some() || requester_shape.is_some(),
        }
    }

    /// 该注册能否作为家族模板满足携带给定形状的封闭请求
    pub(crate) fn can_upgrade_with(&self, requester_shape: Option<MockShape>) -> bool {
        match &self.strategy {
            Strategy::AutoMock { shape } => shape.is_some() || requester_shape.is_some(),
            // 实例、工厂与自引用注册只参与精确匹配
            _ => false,
        }
    }

    /// 以请求方形状派生精确键描述符（家族升级）
    ///
    /// 模板的策略与生命周期原样复制；模板缺少构造形状时采用请求方
    /// 携带的形状。非自动替身注册不可升级。
    pub(crate) fn derive_for(
        &self,
        key: ServiceKey,
        requester_shape: Option<MockShape>,
    ) -> Option<Self> {
        match &self.strategy {
            Strategy::AutoMock { shape } => Some(Self {
                key,
                lifetime: self.lifetime,
                strategy: Strategy::AutoMock {
                    shape: shape.or(requester_shape),
                },
                slot: OnceCell::new(),
            }),
            _ => None,
        }
    }

    /// 校验该描述符上的调用期望
    ///
    /// 未创建或不携带验证能力的注册不参与验证。
    pub fn verify(&self) -> Option<ExpectationFailure> {
        let created = self.slot.get()?;
        let verifiable = created.verifiable.as_ref()?;
        verifiable.verify_expectations().err()
    }
}

impl fmt::Display for MockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

impl fmt::Debug for MockDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match &self.strategy {
            Strategy::Instance => "Instance",
            Strategy::AutoMock { .. } => "AutoMock",
            Strategy::Factory { .. } => "Factory",
            Strategy::Container { .. } => "Container",
        };
        f.debug_struct("MockDescriptor")
            .field("key", &self.key.name())
            .field("lifetime", &self.lifetime)
            .field("strategy", &strategy)
            .field("is_created", &self.is_created())
            .finish()
    }
}
