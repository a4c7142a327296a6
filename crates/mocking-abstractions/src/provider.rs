//! 容器注入视图抽象
//!
//! 注册表同时以两种能力视图暴露自己：提供者视图负责单类型解析，
//! 注册表视图负责注册与枚举。被测代码依赖任一视图时，测试期指向
//! 同一个替身注册表对象即可原样运行。

use crate::construction::{MockShape, Verifiable};
use crate::contract::{downcast_view, AnyView, Contract};
use mocking_common::{FamilyId, Lifetime, ResolutionResult, ServiceKey};
use std::any::TypeId;
use std::sync::Arc;

/// 请求种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// 解析单个服务
    One,
    /// 解析该元素键下的全部服务序列
    All,
}

/// 服务请求
///
/// 解析入口的统一参数：请求种类、目标键，以及请求方可携带的替身
/// 构造形状（封闭泛型请求升级开放家族注册时使用）。
#[derive(Debug, Clone, Copy)]
pub struct ServiceRequest {
    kind: RequestKind,
    key: ServiceKey,
    shape: Option<MockShape>,
}

impl ServiceRequest {
    /// 单值请求
    pub fn one<C: Contract>() -> Self {
        Self {
            kind: RequestKind::One,
            key: C::key(),
            shape: C::mock_shape(),
        }
    }

    /// 序列请求（键为元素契约的键）
    pub fn all<C: Contract>() -> Self {
        Self {
            kind: RequestKind::All,
            key: C::key(),
            shape: C::mock_shape(),
        }
    }

    /// 不携带构造形状的裸键请求
    pub fn keyed(key: ServiceKey) -> Self {
        Self {
            kind: RequestKind::One,
            key,
            shape: None,
        }
    }

    /// 请求种类
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// 目标键
    pub fn key(&self) -> ServiceKey {
        self.key
    }

    /// 请求方携带的构造形状
    pub fn shape(&self) -> Option<MockShape> {
        self.shape
    }
}

/// 服务提供者视图
///
/// 解析失败分两种：未注册返回 `Ok(None)`（缺席不是错误），循环依赖
/// 等解析故障返回 `Err`。
pub trait ServiceProvider: Send + Sync {
    /// 按请求解析服务
    ///
    /// 单值请求返回实例视图；序列请求返回装配前的元素视图序列
    /// （`Vec<AnyView>` 的擦除形态），类型化装配经由
    /// [`ServiceProviderExt::get_services`] 完成。
    fn get(&self, request: &ServiceRequest) -> ResolutionResult<Option<AnyView>>;

    /// 解析元素键下的全部服务；无匹配时返回空序列而非缺席
    fn get_all(&self, element: &ServiceKey) -> ResolutionResult<Vec<AnyView>>;

    /// 只读探测：判断请求是否可由当前注册满足
    ///
    /// 与 [`ServiceProvider::get`] 共享同一匹配规则，但不合成描述符、
    /// 不创建实例，因此可安全用于完整性检查。
    fn can_provide(&self, request: &ServiceRequest) -> bool;
}

/// `ServiceProvider` 的类型化扩展
pub trait ServiceProviderExt: ServiceProvider {
    /// 解析契约服务并还原视图类型
    fn get_service<C: Contract>(&self) -> ResolutionResult<Option<C::View>> {
        match self.get(&ServiceRequest::one::<C>())? {
            Some(view) => downcast_view::<C>(view).map(Some),
            None => Ok(None),
        }
    }

    /// 解析契约键下的全部服务视图，按注册顺序
    fn get_services<C: Contract>(&self) -> ResolutionResult<Vec<C::View>> {
        self.get_all(&C::key())?
            .into_iter()
            .map(downcast_view::<C>)
            .collect()
    }
}

impl<P: ServiceProvider + ?Sized> ServiceProviderExt for P {}

/// 服务注册表视图
///
/// 有序描述符集合的标准操作面。位置操作越界时与 `Vec` 一致直接 panic。
pub trait ServiceRegistrar: Send + Sync {
    /// 追加注册；同键已存在时保留既有注册
    fn register(&self, entry: ServiceEntry);

    /// 按键移除首个精确匹配的注册
    fn remove(&self, key: &ServiceKey) -> bool;

    /// 是否存在精确匹配的注册
    fn contains(&self, key: &ServiceKey) -> bool;

    /// 首个精确匹配注册的位置
    fn index_of(&self, key: &ServiceKey) -> Option<usize>;

    /// 在指定位置插入注册
    fn insert(&self, index: usize, entry: ServiceEntry);

    /// 移除指定位置的注册
    fn remove_at(&self, index: usize);

    /// 覆盖指定位置的注册
    ///
    /// 任何写入都以完整注册条目表达，注册表内永远不存放裸值。
    fn set(&self, index: usize, entry: ServiceEntry);

    /// 注册数量
    fn len(&self) -> usize;

    /// 是否没有注册
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全部注册键的快照，按注册顺序
    fn keys(&self) -> Vec<ServiceKey>;

    /// 清空全部注册并重建容器自引用注册
    fn clear(&self);
}

/// 工厂函数类型：以提供者视图为参数构造服务视图
pub type ServiceFactory =
    Arc<dyn Fn(&dyn ServiceProvider) -> ResolutionResult<AnyView> + Send + Sync>;

/// 注册条目
///
/// 描述一项注册的键、生命周期与解析策略载荷；注册表据此生成内部
/// 描述符。
pub struct ServiceEntry {
    key: ServiceKey,
    lifetime: Lifetime,
    payload: EntryPayload,
}

/// 注册条目的策略载荷
pub enum EntryPayload {
    /// 预置真实实例（及可选的验证能力）
    Instance {
        view: AnyView,
        verifiable: Option<Arc<dyn Verifiable>>,
    },
    /// 按需构造的自动替身
    AutoMock { shape: Option<MockShape> },
    /// 工厂构造
    Factory { factory: ServiceFactory },
}

impl ServiceEntry {
    /// 自动替身注册
    pub fn mock<C: Contract>(lifetime: Lifetime) -> Self {
        Self {
            key: C::key(),
            lifetime,
            payload: EntryPayload::AutoMock {
                shape: C::mock_shape(),
            },
        }
    }

    /// 开放泛型家族模板注册
    ///
    /// 以家族标记类型为键占位；封闭泛型请求命中后会携带自己的构造
    /// 形状升级为精确键描述符。
    pub fn family<M: ?Sized + 'static>(lifetime: Lifetime) -> Self {
        Self {
            key: ServiceKey::new(
                TypeId::of::<M>(),
                FamilyId::of::<M>(),
                std::any::type_name::<M>(),
            ),
            lifetime,
            payload: EntryPayload::AutoMock { shape: None },
        }
    }

    /// 真实实例注册
    pub fn instance<C: Contract>(view: C::View) -> Self {
        Self {
            key: C::key(),
            lifetime: Lifetime::Singleton,
            payload: EntryPayload::Instance {
                view: Arc::new(view),
                verifiable: None,
            },
        }
    }

    /// 预构建替身实例注册（携带验证能力）
    pub fn substitute<C: Contract>(view: C::View, verifiable: Arc<dyn Verifiable>) -> Self {
        Self {
            key: C::key(),
            lifetime: Lifetime::Singleton,
            payload: EntryPayload::Instance {
                view: Arc::new(view),
                verifiable: Some(verifiable),
            },
        }
    }

    /// 工厂注册
    pub fn factory<C, F>(factory: F, lifetime: Lifetime) -> Self
    where
        C: Contract,
        F: Fn(&dyn ServiceProvider) -> ResolutionResult<C::View> + Send + Sync + 'static,
    {
        let erased: ServiceFactory =
            Arc::new(move |provider| factory(provider).map(|view| Arc::new(view) as AnyView));
        Self {
            key: C::key(),
            lifetime,
            payload: EntryPayload::Factory { factory: erased },
        }
    }

    /// 注册键
    pub fn key(&self) -> ServiceKey {
        self.key
    }

    /// 生命周期
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// 拆出键、生命周期与策略载荷
    pub fn into_parts(self) -> (ServiceKey, Lifetime, EntryPayload) {
        (self.key, self.lifetime, self.payload)
    }
}

/// “容器即提供者”视图契约
///
/// 被测代码依赖 `Arc<dyn ServiceProvider>` 时经此契约解析到注册表
/// 自身。
pub struct ProviderView;

impl Contract for ProviderView {
    type View = Arc<dyn ServiceProvider>;
}

/// “容器即注册表”视图契约
pub struct RegistrarView;

impl Contract for RegistrarView {
    type View = Arc<dyn ServiceRegistrar>;
}
