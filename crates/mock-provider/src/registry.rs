//! 替身注册表
//!
//! 有序的描述符集合，同时实现容器的提供者视图与注册表视图。被测
//! 代码依赖任一视图时，测试期拿到的都是同一个注册表对象。

use crate::descriptor::{ContainerView, CreatedService, MockDescriptor};
use mocking_abstractions::{
    Arguments, Contract, MockConstruction, ProviderView, RegistrarView, ResolveOptions,
    ServiceEntry, ServiceProvider, ServiceProviderExt, ServiceRegistrar, Verifiable,
    downcast_view,
};
use mocking_common::{
    ExpectationFailure, Lifetime, ResolutionResult, ServiceKey, VerificationError,
    VerificationResult,
};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// 替身注册表
///
/// 构造时自动种入两条自引用注册：提供者视图与注册表视图。被测代码
/// 无论依赖哪个视图，解析得到的都是这个注册表自身，从而建立按引用
/// 共享的同一性。
pub struct MockRegistry {
    descriptors: RwLock<Vec<Arc<MockDescriptor>>>,
    options: ResolveOptions,
    self_ref: Weak<MockRegistry>,
}

impl MockRegistry {
    /// 创建新的替身注册表
    pub fn new() -> Arc<Self> {
        Self::with_options(ResolveOptions::default())
    }

    /// 以指定解析选项创建注册表
    pub fn with_options(options: ResolveOptions) -> Arc<Self> {
        let registry = Arc::new_cyclic(|weak| Self {
            descriptors: RwLock::new(Vec::new()),
            options,
            self_ref: weak.clone(),
        });
        registry.seed_container_views();
        registry
    }

    /// 以一组既有注册条目构建注册表
    ///
    /// 对应“测试先自建替身、容器只负责分发”的用法：每个条目通常由
    /// [`ServiceEntry::substitute`] 构造并携带验证能力。
    pub fn with_substitutes(entries: impl IntoIterator<Item = ServiceEntry>) -> Arc<Self> {
        let registry = Self::new();
        for entry in entries {
            ServiceRegistrar::register(registry.as_ref(), entry);
        }
        registry
    }

    /// 种入容器自引用描述符
    fn seed_container_views(&self) {
        let mut descriptors = self.descriptors.write();
        descriptors.push(Arc::new(MockDescriptor::container(
            ProviderView::key(),
            ContainerView::Provider,
        )));
        descriptors.push(Arc::new(MockDescriptor::container(
            RegistrarView::key(),
            ContainerView::Registrar,
        )));
    }

    pub(crate) fn options(&self) -> ResolveOptions {
        self.options
    }

    pub(crate) fn upgrade_self(&self) -> Option<Arc<Self>> {
        self.self_ref.upgrade()
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<MockDescriptor>> {
        self.descriptors.read().iter().cloned().collect()
    }

    pub(crate) fn find_exact(&self, key: &ServiceKey) -> Option<Arc<MockDescriptor>> {
        self.descriptors
            .read()
            .iter()
            .find(|descriptor| descriptor.key().exact_matches(key))
            .cloned()
    }

    /// 以精确键二次检查的方式收养描述符；同键已存在时采用先到者
    pub(crate) fn adopt_descriptor(&self, descriptor: Arc<MockDescriptor>) -> Arc<MockDescriptor> {
        let mut descriptors = self.descriptors.write();
        if let Some(existing) = descriptors
            .iter()
            .find(|candidate| candidate.key().exact_matches(&descriptor.key()))
        {
            return existing.clone();
        }
        descriptors.push(descriptor.clone());
        descriptor
    }

    /// 注册自动替身服务
    pub fn register_mock<C: Contract>(&self, lifetime: Lifetime) {
        ServiceRegistrar::register(self, ServiceEntry::mock::<C>(lifetime));
    }

    /// 注册开放泛型家族模板
    pub fn register_family<M: ?Sized + 'static>(&self, lifetime: Lifetime) {
        ServiceRegistrar::register(self, ServiceEntry::family::<M>(lifetime));
    }

    /// 注册真实实例
    pub fn register_instance<C: Contract>(&self, view: C::View) {
        ServiceRegistrar::register(self, ServiceEntry::instance::<C>(view));
    }

    /// 注册预构建替身实例（携带验证能力）
    pub fn register_substitute<C: Contract>(&self, view: C::View, verifiable: Arc<dyn Verifiable>) {
        ServiceRegistrar::register(self, ServiceEntry::substitute::<C>(view, verifiable));
    }

    /// 注册工厂
    pub fn register_factory<C, F>(&self, factory: F, lifetime: Lifetime)
    where
        C: Contract,
        F: Fn(&dyn ServiceProvider) -> ResolutionResult<C::View> + Send + Sync + 'static,
    {
        ServiceRegistrar::register(self, ServiceEntry::factory::<C, F>(factory, lifetime));
    }

    /// 解析契约服务
    ///
    /// 未注册且无家族回退时返回 `Ok(None)`；由调用方决定缺席是否算
    /// 失败。
    pub fn resolve<C: Contract>(&self) -> ResolutionResult<Option<C::View>> {
        self.get_service::<C>()
    }

    /// 解析契约键下的全部服务，按注册顺序
    pub fn resolve_all<C: Contract>(&self) -> ResolutionResult<Vec<C::View>> {
        self.get_services::<C>()
    }

    /// 以显式位置实参即席创建替身
    ///
    /// 同键幂等：实例已创建时返回既有实例，显式实参被忽略；并发
    /// 竞争时后到者丢弃自建值。
    pub fn create_mock<C: MockConstruction>(&self, args: &Arguments) -> ResolutionResult<C::View> {
        let key = C::key();
        let existing = self.find_exact(&key);
        if let Some(descriptor) = &existing {
            if let Some(created) = descriptor.created() {
                return downcast_view::<C>(created.view);
            }
        }
        let parts = C::build(args)?;
        let (view, verifiable) = parts.into_parts();
        let descriptor = match existing {
            Some(descriptor) => descriptor,
            None => self.adopt_descriptor(Arc::new(MockDescriptor::from_entry(
                ServiceEntry::mock::<C>(Lifetime::Transient),
            ))),
        };
        debug!(service = key.name(), "即席创建替身实例");
        let created = descriptor.adopt(CreatedService { view, verifiable });
        downcast_view::<C>(created.view)
    }

    /// 按键取描述符（精确匹配）
    pub fn descriptor(&self, key: &ServiceKey) -> Option<Arc<MockDescriptor>> {
        self.find_exact(key)
    }

    /// 校验所有已创建且携带验证能力的替身
    ///
    /// 不在首个失败处停下：聚合全部未满足的期望后一次性上报。从未
    /// 被解析过的注册与真实实例注册不参与验证。
    pub fn verify_all(&self) -> VerificationResult<()> {
        let failures: Vec<ExpectationFailure> = self
            .snapshot()
            .iter()
            .filter_map(|descriptor| descriptor.verify())
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            warn!(count = failures.len(), "验证发现未满足的调用期望");
            Err(VerificationError::ExpectationsUnmet { failures })
        }
    }
}

impl ServiceRegistrar for MockRegistry {
    fn register(&self, entry: ServiceEntry) {
        let mut descriptors = self.descriptors.write();
        if descriptors
            .iter()
            .any(|descriptor| descriptor.key().exact_matches(&entry.key()))
        {
            debug!(service = entry.key().name(), "同键注册已存在，保留既有注册");
            return;
        }
        debug!(service = entry.key().name(), "追加服务注册");
        descriptors.push(Arc::new(MockDescriptor::from_entry(entry)));
    }

    fn remove(&self, key: &ServiceKey) -> bool {
        let mut descriptors = self.descriptors.write();
        match descriptors
            .iter()
            .position(|descriptor| descriptor.key().exact_matches(key))
        {
            Some(index) => {
                descriptors.remove(index);
                true
            }
            None => false,
        }
    }

    fn contains(&self, key: &ServiceKey) -> bool {
        self.descriptors
            .read()
            .iter()
            .any(|descriptor| descriptor.key().exact_matches(key))
    }

    fn index_of(&self, key: &ServiceKey) -> Option<usize> {
        self.descriptors
            .read()
            .iter()
            .position(|descriptor| descriptor.key().exact_matches(key))
    }

    fn insert(&self, index: usize, entry: ServiceEntry) {
        self.descriptors
            .write()
            .insert(index, Arc::new(MockDescriptor::from_entry(entry)));
    }

    fn remove_at(&self, index: usize) {
        self.descriptors.write().remove(index);
    }

    fn set(&self, index: usize, entry: ServiceEntry) {
        self.descriptors.write()[index] = Arc::new(MockDescriptor::from_entry(entry));
    }

    fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    fn keys(&self) -> Vec<ServiceKey> {
        self.descriptors
            .read()
            .iter()
            .map(|descriptor| descriptor.key())
            .collect()
    }

    fn clear(&self) {
        {
            let mut descriptors = self.descriptors.write();
            let count = descriptors.len();
            descriptors.clear();
            debug!(count, "清空注册表");
        }
        // 注册表永远要能解析对容器自身的请求
        self.seed_container_views();
    }
}
