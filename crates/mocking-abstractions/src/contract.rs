//! 服务契约抽象
//!
//! 以契约类型标识一项可注册服务，并声明解析产物的具体形状。

use crate::construction::MockShape;
use mocking_common::{FamilyId, ResolutionError, ResolutionResult, ServiceKey};
use std::any::{Any, TypeId};
use std::sync::Arc;

/// 任意服务视图的类型擦除形态
pub type AnyView = Arc<dyn Any + Send + Sync>;

/// 服务契约 trait
///
/// 契约类型本身只是标识；[`Contract::View`] 才是被测对象实际注入的
/// 值形状（例如 `Arc<dyn UserRepo>` 或 `Arc<Config>`）。封闭泛型契约
/// 应覆写 [`Contract::family`]，让同一开放泛型的全部实例共享家族
/// 标识。
pub trait Contract: Send + Sync + 'static {
    /// 解析产物类型
    type View: Clone + Send + Sync + 'static;

    /// 泛型家族标识；默认以契约自身为家族
    fn family() -> FamilyId {
        FamilyId::of::<Self>()
    }

    /// 服务显示名
    fn service_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// 服务键
    fn key() -> ServiceKey {
        ServiceKey::new(TypeId::of::<Self>(), Self::family(), Self::service_name())
    }

    /// 自动替身构造形状；`None` 表示该服务只能以实例或工厂方式注册
    fn mock_shape() -> Option<MockShape> {
        None
    }
}

/// 将擦除视图还原为契约的视图类型
pub fn downcast_view<C: Contract>(view: AnyView) -> ResolutionResult<C::View> {
    view.downcast::<C::View>()
        .map(|typed| (*typed).clone())
        .map_err(|_| ResolutionError::ViewMismatch {
            service: C::service_name().to_string(),
        })
}
