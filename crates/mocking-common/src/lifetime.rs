//! 服务生命周期定义

/// 服务生命周期类型
///
/// 描述符上登记的生命周期语义。替身容器内实例创建始终是每描述符
/// 一次的惰性创建，生命周期仅作为注册元数据保留，供被测配置代码
/// 原样写入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// 单例模式 - 整个注册表生命周期内共享一个实例
    Singleton,
    /// 作用域模式 - 同一作用域内共享实例
    Scoped,
    /// 瞬时模式 - 语义上每次请求都创建新实例
    Transient,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Transient
    }
}
