//! Provider selection and scoring tests

use super::support::{TestProvider, router_over, router_with};
use crate::config::RouterOptions;
use crate::core::router::scoring;
use crate::core::router::stats::ProviderStats;
use crate::core::router::thermal;
use crate::core::types::{CapabilityRequest, GenerateOptions, ProviderCapabilities};
use crate::utils::error::DispatchError;

fn vision_caps() -> ProviderCapabilities {
    ProviderCapabilities {
        vision: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_vision_request_prefers_vision_provider() {
    let a = TestProvider::with_capabilities("openai-a", vision_caps());
    let b = TestProvider::new("openai-b");
    let router = router_over(vec![a, b]);

    let request = CapabilityRequest {
        vision: true,
        ..Default::default()
    };
    let decision = router
        .select_provider("describe this image", &GenerateOptions::default(), &request)
        .await
        .unwrap();

    assert_eq!(decision.provider.name(), "openai-a");

    // The losing provider's composite score is strictly lower
    let weights = RouterOptions::default().weights;
    let score_b = scoring::score(
        &weights,
        &ProviderCapabilities::default(),
        &request,
        &GenerateOptions::default(),
        &ProviderStats::default(),
        0.0,
        0.0,
        None,
        "openai-b",
        true,
        &thermal::ThermalStatus::nominal(),
    );
    assert!(decision.score > score_b.total);
}

#[tokio::test]
async fn test_selection_is_deterministic() {
    let a = TestProvider::with_capabilities("openai-a", vision_caps());
    let b = TestProvider::new("openai-b");
    let router = router_over(vec![a, b]);

    let request = CapabilityRequest {
        vision: true,
        ..Default::default()
    };
    for _ in 0..5 {
        let decision = router
            .select_provider("hi", &GenerateOptions::default(), &request)
            .await
            .unwrap();
        assert_eq!(decision.provider.name(), "openai-a");
    }
}

#[tokio::test]
async fn test_ties_preserve_configuration_order() {
    let a = TestProvider::new("openai-a");
    let b = TestProvider::new("openai-b");
    let router = router_over(vec![a, b]);

    let decision = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap();
    assert_eq!(decision.provider.name(), "openai-a");

    // Reversing configuration order flips the winner
    let a = TestProvider::new("openai-a");
    let b = TestProvider::new("openai-b");
    let router = router_over(vec![b, a]);

    let decision = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap();
    assert_eq!(decision.provider.name(), "openai-b");
}

#[tokio::test]
async fn test_unavailable_providers_are_skipped() {
    let a = TestProvider::unavailable("openai-a");
    let b = TestProvider::new("openai-b");
    let router = router_over(vec![a, b]);

    let decision = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap();

    assert_eq!(decision.provider.name(), "openai-b");
}

#[tokio::test]
async fn test_no_available_providers_is_fatal() {
    let router = router_over(vec![
        TestProvider::unavailable("openai-a"),
        TestProvider::unavailable("openai-b"),
    ]);

    let err = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoAvailableProviders));
}

#[tokio::test]
async fn test_no_configured_providers_is_fatal() {
    let router = router_over(vec![]);

    let err = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoAvailableProviders));
}

#[tokio::test]
async fn test_extra_matching_capability_never_decreases_score() {
    let request = CapabilityRequest {
        vision: true,
        streaming: true,
        tool_calling: false,
    };
    let weights = RouterOptions::default().weights;
    let options = GenerateOptions::default();
    let stats = ProviderStats::default();
    let nominal = thermal::ThermalStatus::nominal();

    let base = scoring::score(
        &weights,
        &vision_caps(),
        &request,
        &options,
        &stats,
        0.0,
        0.0,
        None,
        "openai-a",
        true,
        &nominal,
    );

    let richer = scoring::score(
        &weights,
        &ProviderCapabilities {
            vision: true,
            streaming: true,
            ..Default::default()
        },
        &request,
        &options,
        &stats,
        0.0,
        0.0,
        None,
        "openai-a",
        true,
        &nominal,
    );

    assert!(richer.total >= base.total);
    assert!(richer.capability > base.capability);
}

#[tokio::test]
async fn test_max_tokens_fit_scores_higher() {
    let small = TestProvider::with_capabilities(
        "openai-small",
        ProviderCapabilities {
            max_tokens: 1024,
            ..Default::default()
        },
    );
    let large = TestProvider::with_capabilities(
        "openai-large",
        ProviderCapabilities {
            max_tokens: 32768,
            ..Default::default()
        },
    );
    let router = router_over(vec![small, large]);

    let options = GenerateOptions {
        max_tokens: Some(8000),
        ..Default::default()
    };
    let decision = router
        .select_provider("hi", &options, &CapabilityRequest::none())
        .await
        .unwrap();

    assert_eq!(decision.provider.name(), "openai-large");
}

#[tokio::test]
async fn test_throttling_penalizes_accelerated_provider() {
    let mlx = TestProvider::new("mlx-local");
    let daemon = TestProvider::new("ollama-chat");
    let router = router_over(vec![mlx, daemon]);

    // Host thermals are nominal: configuration order wins the tie
    let decision = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap();
    assert_eq!(decision.provider.name(), "mlx-local");

    // Throttling flips the choice to the daemon runtime
    *router.thermal.write() = thermal::from_reading(4);
    let decision = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap();
    assert_eq!(decision.provider.name(), "ollama-chat");
}

#[tokio::test]
async fn test_throttling_ignored_when_disabled() {
    let mlx = TestProvider::new("mlx-local");
    let daemon = TestProvider::new("ollama-chat");

    let mut options = RouterOptions::default();
    options.thermal.enabled = false;
    let router = router_with(vec![mlx, daemon], options);

    *router.thermal.write() = thermal::from_reading(4);
    let decision = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap();

    assert_eq!(decision.provider.name(), "mlx-local");
}

#[tokio::test]
async fn test_error_history_lowers_performance() {
    let a = TestProvider::new("openai-a");
    let b = TestProvider::new("openai-b");
    let router = router_over(vec![a, b]);

    // Give the first provider a failing record
    if let Some(mut stats) = router.stats.get_mut("openai-a") {
        for _ in 0..5 {
            stats.record_error();
        }
    }

    let decision = router
        .select_provider("hi", &GenerateOptions::default(), &CapabilityRequest::none())
        .await
        .unwrap();

    assert_eq!(decision.provider.name(), "openai-b");
}

#[tokio::test]
async fn test_decision_carries_reason_and_estimates() {
    let router = router_over(vec![TestProvider::new("openai-a")]);

    let decision = router
        .select_provider(
            "a reasonably long prompt for cost estimation",
            &GenerateOptions::default(),
            &CapabilityRequest::none(),
        )
        .await
        .unwrap();

    assert!(decision.reason.contains("score"));
    assert!(decision.estimated_cost > 0.0);
    assert_eq!(decision.estimated_latency_ms, 0.0);
    assert!(decision.score >= 0.0 && decision.score <= 1.0);
}
