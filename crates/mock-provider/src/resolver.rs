//! 解析算法
//!
//! 注册表查找路径内嵌的解析器：精确匹配、家族匹配升级、序列装配，
//! 以及供完整性检查与构造函数选择共用的只读探测。两条路径共享同一
//! 匹配规则，行为保持一致。

use crate::descriptor::{ContainerView, CreatedService, MockDescriptor, Strategy};
use crate::registry::MockRegistry;
use mocking_abstractions::{
    AnyView, Arguments, MockParts, MockShape, RequestKind, ResolveContext, ServiceProvider,
    ServiceRegistrar, ServiceRequest,
};
use mocking_common::{ResolutionError, ResolutionResult, ServiceKey};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

impl ServiceProvider for MockRegistry {
    fn get(&self, request: &ServiceRequest) -> ResolutionResult<Option<AnyView>> {
        let mut ctx = ResolveContext::with_options(self.options());
        self.resolve_request(request, &mut ctx)
    }

    fn get_all(&self, element: &ServiceKey) -> ResolutionResult<Vec<AnyView>> {
        let mut ctx = ResolveContext::with_options(self.options());
        self.resolve_sequence(element, &mut ctx)
    }

    fn can_provide(&self, request: &ServiceRequest) -> bool {
        self.probe(request)
    }
}

impl MockRegistry {
    /// 在给定解析上下文中处理一次请求
    pub(crate) fn resolve_request(
        &self,
        request: &ServiceRequest,
        ctx: &mut ResolveContext,
    ) -> ResolutionResult<Option<AnyView>> {
        match request.kind() {
            RequestKind::One => self.resolve_one(request, ctx),
            RequestKind::All => {
                let views = self.resolve_sequence(&request.key(), ctx)?;
                Ok(Some(Arc::new(views)))
            }
        }
    }

    /// 单值解析：精确匹配、家族匹配升级、无匹配缺席
    fn resolve_one(
        &self,
        request: &ServiceRequest,
        ctx: &mut ResolveContext,
    ) -> ResolutionResult<Option<AnyView>> {
        let key = request.key();

        // 1. 精确匹配
        if let Some(descriptor) = self.find_exact(&key) {
            return Ok(self
                .ensure_created(&descriptor, request.shape(), ctx)?
                .map(|created| created.view));
        }

        // 2. 家族匹配：以模板合成精确键描述符；并发升级时先到者胜
        let derived = {
            let candidates = self.snapshot();
            candidates
                .iter()
                .filter(|candidate| candidate.key().family_matches(&key))
                .find_map(|template| template.derive_for(key, request.shape()))
        };
        if let Some(derived) = derived {
            debug!(service = key.name(), "命中家族注册，合成精确键描述符");
            let descriptor = self.adopt_descriptor(Arc::new(derived));
            return Ok(self
                .ensure_created(&descriptor, request.shape(), ctx)?
                .map(|created| created.view));
        }

        // 3. 无匹配，返回缺席
        debug!(service = key.name(), "无匹配注册，返回缺席");
        Ok(None)
    }

    /// 序列解析：按注册顺序收集元素键下的全部实例；空序列不算缺席
    pub(crate) fn resolve_sequence(
        &self,
        element: &ServiceKey,
        ctx: &mut ResolveContext,
    ) -> ResolutionResult<Vec<AnyView>> {
        let matches: Vec<Arc<MockDescriptor>> = self
            .snapshot()
            .into_iter()
            .filter(|descriptor| descriptor.key().exact_matches(element))
            .collect();
        let mut views = Vec::with_capacity(matches.len());
        for descriptor in &matches {
            // 无法创建（缺少构造形状）的注册在序列解析中跳过
            if let Some(created) = self.ensure_created(descriptor, None, ctx)? {
                views.push(created.view);
            }
        }
        Ok(views)
    }

    /// 只读解析探测
    ///
    /// 与实际解析共享同一匹配规则，但不合成描述符、不创建实例。
    /// 完整性检查与构造函数选择都以此判定参数可满足性。
    pub(crate) fn probe(&self, request: &ServiceRequest) -> bool {
        match request.kind() {
            // 序列请求永远可满足：没有匹配时得到空序列而非缺席
            RequestKind::All => true,
            RequestKind::One => {
                let key = request.key();
                let candidates = self.snapshot();
                if let Some(descriptor) = candidates
                    .iter()
                    .find(|candidate| candidate.key().exact_matches(&key))
                {
                    return descriptor.is_creatable_with(request.shape());
                }
                candidates
                    .iter()
                    .filter(|candidate| candidate.key().family_matches(&key))
                    .any(|candidate| candidate.can_upgrade_with(request.shape()))
            }
        }
    }

    /// 确保描述符的实例已创建；无法创建时返回 `None`
    fn ensure_created(
        &self,
        descriptor: &Arc<MockDescriptor>,
        requester_shape: Option<MockShape>,
        ctx: &mut ResolveContext,
    ) -> ResolutionResult<Option<CreatedService>> {
        if let Some(created) = descriptor.created() {
            return Ok(Some(created));
        }
        match descriptor.strategy() {
            // 实例注册生而有值，此分支只为完备
            Strategy::Instance => Ok(descriptor.created()),
            Strategy::Container { view } => Ok(self.created_container_view(descriptor, *view)),
            Strategy::Factory { factory } => {
                ctx.push(descriptor.key())?;
                let result = {
                    let provider = ContextProvider::new(self, ctx);
                    (factory.as_ref())(&provider)
                };
                ctx.pop();
                let view = result?;
                debug!(service = %descriptor, "工厂创建服务实例");
                Ok(Some(descriptor.adopt(CreatedService {
                    view,
                    verifiable: None,
                })))
            }
            Strategy::AutoMock { shape } => {
                let Some(shape) = shape.or(requester_shape) else {
                    warn!(service = %descriptor, "注册缺少替身构造形状，无法按需创建");
                    return Ok(None);
                };
                ctx.push(descriptor.key())?;
                let result = self.build_mock(descriptor.key(), shape, ctx);
                ctx.pop();
                let (view, verifiable) = result?.into_parts();
                debug!(service = %descriptor, "自动创建替身实例");
                Ok(Some(descriptor.adopt(CreatedService { view, verifiable })))
            }
        }
    }

    /// 构造容器自引用视图并写入创建槽
    fn created_container_view(
        &self,
        descriptor: &Arc<MockDescriptor>,
        view: ContainerView,
    ) -> Option<CreatedService> {
        let registry = match self.upgrade_self() {
            Some(registry) => registry,
            None => {
                warn!(service = %descriptor, "注册表已不在 Arc 中，无法提供自引用视图");
                return None;
            }
        };
        let container: AnyView = match view {
            ContainerView::Provider => {
                let provider: Arc<dyn ServiceProvider> = registry;
                Arc::new(provider)
            }
            ContainerView::Registrar => {
                let registrar: Arc<dyn ServiceRegistrar> = registry;
                Arc::new(registrar)
            }
        };
        Some(descriptor.adopt(CreatedService {
            view: container,
            verifiable: None,
        }))
    }

    /// 构造函数选择与替身构建
    ///
    /// 选择规则：按声明顺序取首个无参、或全部参数均可被当前注册
    /// 满足的构造函数；没有可满足的构造函数时以无参方式构建替身。
    fn build_mock(
        &self,
        key: ServiceKey,
        shape: MockShape,
        ctx: &mut ResolveContext,
    ) -> ResolutionResult<MockParts> {
        let constructors = shape.constructors();
        let selected = constructors.iter().find(|ctor| {
            ctor.parameters().is_empty()
                || ctor
                    .parameters()
                    .iter()
                    .all(|parameter| self.probe(parameter.request()))
        });
        let mut args = Arguments::new();
        if let Some(ctor) = selected {
            debug!(service = key.name(), constructor = ctor.name(), "选定构造函数");
            let provider = ContextProvider::new(self, ctx);
            for parameter in ctor.parameters() {
                match parameter.materialize(&provider)? {
                    Some(view) => args.push(parameter.name(), view),
                    None => {
                        return Err(ResolutionError::MockCreationFailed {
                            service: key.name().to_string(),
                            message: format!("构造参数 {} 无法解析", parameter.name()),
                        });
                    }
                }
            }
        } else if !constructors.is_empty() {
            debug!(service = key.name(), "无可满足的构造函数，以无参方式构造替身");
        }
        shape.build(&args)
    }
}

/// 在既有解析链上转发请求的提供者视图
///
/// 工厂与构造参数的递归解析经由此视图进入注册表，使循环依赖检测
/// 能够贯穿整条解析链。
struct ContextProvider<'a> {
    registry: &'a MockRegistry,
    ctx: Mutex<&'a mut ResolveContext>,
}

impl<'a> ContextProvider<'a> {
    fn new(registry: &'a MockRegistry, ctx: &'a mut ResolveContext) -> Self {
        Self {
            registry,
            ctx: Mutex::new(ctx),
        }
    }
}

impl ServiceProvider for ContextProvider<'_> {
    fn get(&self, request: &ServiceRequest) -> ResolutionResult<Option<AnyView>> {
        let mut ctx = self.ctx.lock();
        self.registry.resolve_request(request, &mut **ctx)
    }

    fn get_all(&self, element: &ServiceKey) -> ResolutionResult<Vec<AnyView>> {
        let mut ctx = self.ctx.lock();
        self.registry.resolve_sequence(element, &mut **ctx)
    }

    fn can_provide(&self, request: &ServiceRequest) -> bool {
        self.registry.probe(request)
    }
}
