//! mockall 作为外部替身框架的接入测试
//!
//! 容器只依赖“构造 + 录制 + 验证”三件套契约；这里用 mockall 生成的
//! 替身实现该契约，验证期望在构建时配置、由 `verify_all` 聚合上报。

use mock_provider::MockRegistry;
use mocking_abstractions::{
    Arguments, ConstructorSpec, Contract, MockConstruction, MockParts, MockShape, Verifiable,
};
use mocking_common::{ExpectationFailure, Lifetime, ResolutionResult, VerificationError};
use parking_lot::Mutex;
use std::sync::Arc;

#[mockall::automock]
trait Mailer {
    fn send(&self, to: &str);
}

#[mockall::automock]
trait Templates {
    fn render(&self, name: &str) -> String;
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "未知的期望失败".to_string()
    }
}

/// 用 checkpoint 把 mockall 的 panic 式验证适配成聚合友好的结果
struct CheckpointVerifier<M: Send + 'static> {
    service: &'static str,
    mock: Arc<Mutex<M>>,
    checkpoint: fn(&mut M),
}

impl<M: Send + 'static> Verifiable for CheckpointVerifier<M> {
    fn verify_expectations(&self) -> Result<(), ExpectationFailure> {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            (self.checkpoint)(&mut self.mock.lock());
        }));
        outcome.map_err(|panic| ExpectationFailure {
            service: self.service.to_string(),
            detail: panic_message(panic),
        })
    }
}

struct MailerContract;

impl Contract for MailerContract {
    type View = Arc<Mutex<MockMailer>>;
    fn mock_shape() -> Option<MockShape> {
        Some(MockShape::of::<Self>())
    }
}

impl MockConstruction for MailerContract {
    fn build(_args: &Arguments) -> ResolutionResult<MockParts> {
        let mut mock = MockMailer::new();
        // “必须发生”的期望在构建时配置
        mock.expect_send().times(1..).return_const(());
        let shared = Arc::new(Mutex::new(mock));
        Ok(MockParts::of::<Self>(shared.clone()).with_verifiable(Arc::new(
            CheckpointVerifier {
                service: "Mailer",
                mock: shared,
                checkpoint: MockMailer::checkpoint,
            },
        )))
    }
}

struct TemplatesContract;

impl Contract for TemplatesContract {
    type View = Arc<Mutex<MockTemplates>>;
    fn mock_shape() -> Option<MockShape> {
        Some(MockShape::of::<Self>())
    }
}

impl MockConstruction for TemplatesContract {
    fn constructors() -> Vec<ConstructorSpec> {
        vec![ConstructorSpec::new("new").with_parameter::<MailerContract>("mailer")]
    }

    fn build(args: &Arguments) -> ResolutionResult<MockParts> {
        // 构造参数按位置传入，替身本身不持有依赖也要能收到它们
        let _mailer = args.view::<MailerContract>(0)?;
        let mut mock = MockTemplates::new();
        mock.expect_render()
            .returning(|name| format!("<{name}>"));
        Ok(MockParts::of::<Self>(Arc::new(Mutex::new(mock))))
    }
}

#[test]
fn mockall_expectations_pass_after_exercise() {
    let registry = MockRegistry::new();
    registry.register_mock::<MailerContract>(Lifetime::Singleton);

    let mailer = registry.resolve::<MailerContract>().unwrap().unwrap();
    mailer.lock().send("dev@example.com");

    assert!(registry.verify_all().is_ok());
}

#[test]
fn mockall_unmet_expectation_is_aggregated() {
    let registry = MockRegistry::new();
    registry.register_mock::<MailerContract>(Lifetime::Singleton);

    // 创建但不调用
    registry.resolve::<MailerContract>().unwrap().unwrap();

    let err = registry.verify_all().unwrap_err();
    let VerificationError::ExpectationsUnmet { failures } = err;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].service, "Mailer");
    assert!(!failures[0].detail.is_empty());
}

#[test]
fn mockall_mock_receives_resolved_constructor_arguments() {
    let registry = MockRegistry::new();
    registry.register_mock::<MailerContract>(Lifetime::Singleton);
    registry.register_mock::<TemplatesContract>(Lifetime::Singleton);

    let templates = registry.resolve::<TemplatesContract>().unwrap().unwrap();
    assert_eq!(templates.lock().render("welcome"), "<welcome>");

    // 参数解析把 Mailer 也创建了出来；满足其期望后整体验证通过
    let mailer = registry.resolve::<MailerContract>().unwrap().unwrap();
    mailer.lock().send("dev@example.com");
    assert!(registry.verify_all().is_ok());
}
