//! Shared router test fixtures

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::config::RouterOptions;
use crate::core::provider::ModelProvider;
use crate::core::router::router::CapabilityRouter;
use crate::core::types::{
    FinishReason, GenerateOptions, GenerateResult, ProviderCapabilities, TokenUsage,
};
use crate::utils::error::{DispatchError, Result};

/// Scriptable in-memory provider
pub struct TestProvider {
    name: String,
    pub capabilities: ProviderCapabilities,
    available: AtomicBool,
    fail: AtomicBool,
    fail_shutdown: bool,
    calls: AtomicU32,
}

impl TestProvider {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            capabilities: ProviderCapabilities::default(),
            available: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            fail_shutdown: false,
            calls: AtomicU32::new(0),
        })
    }

    pub fn with_capabilities(name: &str, capabilities: ProviderCapabilities) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            capabilities,
            available: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            fail_shutdown: false,
            calls: AtomicU32::new(0),
        })
    }

    pub fn failing(name: &str) -> Arc<Self> {
        let provider = Self::new(name);
        provider.fail.store(true, Ordering::SeqCst);
        provider
    }

    pub fn unavailable(name: &str) -> Arc<Self> {
        let provider = Self::new(name);
        provider.available.store(false, Ordering::SeqCst);
        provider
    }

    pub fn failing_shutdown(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            capabilities: ProviderCapabilities::default(),
            available: AtomicBool::new(true),
            fail: AtomicBool::new(false),
            fail_shutdown: true,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for TestProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    async fn generate(&self, _prompt: &str, _options: &GenerateOptions) -> Result<GenerateResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::generation(self.name.as_str(), "test failure"));
        }
        Ok(GenerateResult {
            content: format!("ok from {}", self.name),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: FinishReason::Stop,
        })
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn shutdown(&self) -> Result<()> {
        if self.fail_shutdown {
            return Err(DispatchError::generation(self.name.as_str(), "shutdown boom"));
        }
        Ok(())
    }
}

/// Initialize test logging once; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Router over the given providers with default options
pub fn router_over(providers: Vec<Arc<TestProvider>>) -> CapabilityRouter {
    router_with(providers, RouterOptions::default())
}

/// Router over the given providers with explicit options
pub fn router_with(providers: Vec<Arc<TestProvider>>, options: RouterOptions) -> CapabilityRouter {
    let providers = providers
        .into_iter()
        .map(|provider| provider as Arc<dyn ModelProvider>)
        .collect();
    CapabilityRouter::new(providers, options)
}
