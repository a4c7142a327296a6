//! 解析上下文
//!
//! 记录当前解析链，用于循环依赖检测与递归深度限制。

use mocking_common::{ResolutionError, ResolutionResult, ServiceKey};

/// 解析选项
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// 最大递归解析深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// 解析上下文
///
/// 一次解析入口对应一个上下文；递归解析构造参数与工厂内的再解析
/// 都沿用同一条解析链，重入即判定为循环依赖。
#[derive(Debug)]
pub struct ResolveContext {
    resolution_chain: Vec<ServiceKey>,
    options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::with_options(ResolveOptions::default())
    }

    /// 以指定选项创建解析上下文
    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 将键压入解析链；发现重入或超深时报错
    pub fn push(&mut self, key: ServiceKey) -> ResolutionResult<()> {
        if self
            .resolution_chain
            .iter()
            .any(|visited| visited.exact_matches(&key))
        {
            return Err(ResolutionError::CircularDependency {
                dependency_chain: self.render_chain(&key),
            });
        }
        if self.resolution_chain.len() >= self.options.max_depth {
            return Err(ResolutionError::MaxDepthExceeded {
                max_depth: self.options.max_depth,
                dependency_chain: self.render_chain(&key),
            });
        }
        self.resolution_chain.push(key);
        Ok(())
    }

    /// 从解析链中弹出最近压入的键
    pub fn pop(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    fn render_chain(&self, tail: &ServiceKey) -> String {
        let mut names: Vec<&str> = self
            .resolution_chain
            .iter()
            .map(ServiceKey::short_name)
            .collect();
        names.push(tail.short_name());
        names.join(" -> ")
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}
