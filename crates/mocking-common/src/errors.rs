//! 错误类型定义

use std::fmt;
use thiserror::Error;

/// 替身期望未满足的明细
#[derive(Debug, Clone)]
pub struct ExpectationFailure {
    /// 服务显示名
    pub service: String,
    /// 未满足期望的描述
    pub detail: String,
}

impl fmt::Display for ExpectationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.service, self.detail)
    }
}

/// 解析错误类型
///
/// 未注册的解析请求不属于错误（返回缺席）；只有循环依赖、深度超限
/// 与替身创建本身的失败会以错误上报。
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("检测到循环依赖: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("解析深度超过上限 {max_depth}: {dependency_chain}")]
    MaxDepthExceeded {
        max_depth: usize,
        dependency_chain: String,
    },

    #[error("替身创建失败: {service}, 原因: {message}")]
    MockCreationFailed { service: String, message: String },

    #[error("视图类型不匹配: {service}")]
    ViewMismatch { service: String },
}

/// 验证错误类型
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("存在未满足的调用期望: [{}]", join_failures(.failures))]
    ExpectationsUnmet { failures: Vec<ExpectationFailure> },
}

fn join_failures(failures: &[ExpectationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 结果类型别名
pub type ResolutionResult<T> = Result<T, ResolutionError>;
pub type VerificationResult<T> = Result<T, VerificationError>;
