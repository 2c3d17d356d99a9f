use breedlens::telemetry::{MemorySink, RequestOutcome, SearchEvent};
use breedlens::testing::ScriptedFetcher;
use breedlens::{
    AdmissionController, ErrorKind, Field, RequestContext, SearchError, SearchQuery,
    SearchRequest, SearchService, Stage,
};
use http::StatusCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const BASE: &str = "https://up.test";
const HUSKY: &str = "https://up.test/api/breed/husky/images/random";
const FRENCH: &str = "https://up.test/api/breed/bulldog/french/images/random";
const HUSKY_IMG: &str = "https://images.up.test/breeds/husky/n02110185_1469.jpg";
const FRENCH_IMG: &str = "https://images.up.test/breeds/bulldog-french/n02108915_8258.jpg";

fn init_logs() {
    let _ = tracing_subscriber::fmt().with_env_filter("breedlens=debug").with_test_writer().try_init();
}

fn service(fetcher: &ScriptedFetcher) -> SearchService<ScriptedFetcher> {
    SearchService::new(fetcher.clone(), AdmissionController::new(), BASE)
}

async fn search(
    svc: &SearchService<ScriptedFetcher>,
    category: &str,
    sub_category: &str,
) -> Result<breedlens::SearchResult, SearchError> {
    svc.search(&SearchQuery::new(category, sub_category), &RequestContext::new()).await
}

#[tokio::test]
async fn returns_resolved_url_and_payload() {
    init_logs();
    let fetcher = ScriptedFetcher::new()
        .resolves_to(FRENCH, FRENCH_IMG)
        .respond(FRENCH_IMG, StatusCode::OK, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    let svc = service(&fetcher);

    let found = search(&svc, "bulldog", "french").await.unwrap();
    assert_eq!(found.resource_url, FRENCH_IMG);
    assert_eq!(found.payload, vec![0xFF, 0xD8, 0xFF, 0xE0]);
    assert_eq!(fetcher.calls(), vec![FRENCH, FRENCH_IMG]);
}

#[tokio::test]
async fn invalid_fields_are_rejected_before_any_upstream_call() {
    let fetcher = ScriptedFetcher::new();
    let svc = service(&fetcher);

    for (category, sub, field) in [
        ("", "", Field::Category),
        ("hu5ky", "", Field::Category),
        ("bull dog", "", Field::Category),
        ("bulldog", "fr3nch", Field::SubCategory),
        ("bulldog", "french/../x", Field::SubCategory),
    ] {
        let err = search(&svc, category, sub).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{:?}/{:?}", category, sub);
        assert_eq!(err.invalid_field(), Some(field));
    }

    assert!(fetcher.calls().is_empty());
    assert_eq!(svc.admission().in_use(), 0);
}

#[tokio::test]
async fn unknown_sub_breed_is_not_found() {
    let fetcher = ScriptedFetcher::new();
    let svc = service(&fetcher);

    let err = search(&svc, "husky", "notreal").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.stage(), Some(Stage::Resolve));
    assert_eq!(fetcher.calls(), vec!["https://up.test/api/breed/husky/notreal/images/random"]);
}

#[tokio::test]
async fn lookup_server_error_is_internal_with_status() {
    let fetcher = ScriptedFetcher::new().respond(HUSKY, StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let svc = service(&fetcher);

    let err = search(&svc, "husky", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.upstream_status(), Some(500));
    assert_eq!(err.stage(), Some(Stage::Resolve));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn non_200_success_codes_are_internal() {
    let fetcher = ScriptedFetcher::new().respond(HUSKY, StatusCode::NO_CONTENT, "");
    let svc = service(&fetcher);

    let err = search(&svc, "husky", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.upstream_status(), Some(204));
}

#[tokio::test]
async fn error_envelope_under_ok_status_is_not_found() {
    let body = r#"{"status":"error","message":"Breed not found (master breed does not exist)","code":404}"#;
    let fetcher = ScriptedFetcher::new().respond(HUSKY, StatusCode::OK, body);
    let svc = service(&fetcher);

    let err = search(&svc, "husky", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn malformed_envelope_is_internal() {
    let fetcher = ScriptedFetcher::new().respond(HUSKY, StatusCode::OK, "<html>maintenance</html>");
    let svc = service(&fetcher);

    let err = search(&svc, "husky", "").await.unwrap_err();
    assert!(matches!(err, SearchError::MalformedEnvelope(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[tokio::test]
async fn transport_failures_are_unavailable_at_either_stage() {
    init_logs();
    let fetcher = ScriptedFetcher::new().fail(HUSKY, "connection refused");
    let err = search(&service(&fetcher), "husky", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(err.stage(), Some(Stage::Resolve));

    let fetcher = ScriptedFetcher::new()
        .resolves_to(HUSKY, HUSKY_IMG)
        .fail(HUSKY_IMG, "connection reset by peer");
    let err = search(&service(&fetcher), "husky", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(err.stage(), Some(Stage::Fetch));
    assert!(err.to_string().contains("connection reset by peer"));
}

#[tokio::test]
async fn resource_status_is_checked_like_the_lookup() {
    let fetcher = ScriptedFetcher::new().resolves_to(HUSKY, HUSKY_IMG);
    let err = search(&service(&fetcher), "husky", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.stage(), Some(Stage::Fetch));

    let fetcher = ScriptedFetcher::new()
        .resolves_to(HUSKY, HUSKY_IMG)
        .respond(HUSKY_IMG, StatusCode::BAD_GATEWAY, "");
    let err = search(&service(&fetcher), "husky", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.upstream_status(), Some(502));
    assert_eq!(err.stage(), Some(Stage::Fetch));
}

#[tokio::test]
async fn empty_payload_is_internal() {
    let fetcher = ScriptedFetcher::new()
        .resolves_to(HUSKY, HUSKY_IMG)
        .respond(HUSKY_IMG, StatusCode::OK, Vec::new());

    let err = search(&service(&fetcher), "husky", "").await.unwrap_err();
    assert!(matches!(err, SearchError::EmptyPayload { ref url } if url == HUSKY_IMG));
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[tokio::test(start_paused = true)]
async fn deadline_during_lookup() {
    let fetcher = ScriptedFetcher::new().hang(HUSKY);
    let svc = service(&fetcher);
    let ctx = RequestContext::new().with_timeout(Duration::from_secs(1));

    let err = svc.search(&SearchQuery::category_only("husky"), &ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert_eq!(err.stage(), Some(Stage::Resolve));
}

#[tokio::test(start_paused = true)]
async fn deadline_spans_both_steps() {
    let fetcher = ScriptedFetcher::new()
        .delayed(
            HUSKY,
            Duration::from_millis(600),
            StatusCode::OK,
            format!(r#"{{"message":"{}","status":"success"}}"#, HUSKY_IMG),
        )
        .delayed(HUSKY_IMG, Duration::from_millis(600), StatusCode::OK, b"jpeg".to_vec());
    let svc = service(&fetcher);
    let ctx = RequestContext::new().with_timeout(Duration::from_secs(1));

    let err = svc.search(&SearchQuery::category_only("husky"), &ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert_eq!(err.stage(), Some(Stage::Fetch));
}

#[tokio::test]
async fn cancellation_during_fetch() {
    let fetcher = ScriptedFetcher::new().resolves_to(HUSKY, HUSKY_IMG).hang(HUSKY_IMG);
    let svc = service(&fetcher);
    let token = CancellationToken::new();
    let ctx = RequestContext::new().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let err = svc.search(&SearchQuery::category_only("husky"), &ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Canceled);
    assert_eq!(err.stage(), Some(Stage::Fetch));
    canceller.await.unwrap();
}

#[tokio::test]
async fn tower_service_serves_requests() {
    let fetcher = ScriptedFetcher::new()
        .resolves_to(HUSKY, HUSKY_IMG)
        .respond(HUSKY_IMG, StatusCode::OK, b"jpeg".to_vec());
    let svc = service(&fetcher);

    let found = svc
        .clone()
        .oneshot(SearchRequest::from(SearchQuery::category_only("husky")))
        .await
        .unwrap();
    assert_eq!(found.resource_url, HUSKY_IMG);

    let err = svc.oneshot(SearchRequest::from(SearchQuery::category_only(""))).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn outcome_events_carry_kind_and_stage() {
    let fetcher = ScriptedFetcher::new();
    let sink = MemorySink::new();
    let svc = service(&fetcher).with_sink(sink.clone());

    let _ = svc.search(&SearchQuery::new("husky", "notreal"), &RequestContext::new()).await;

    let outcomes = sink.outcomes();
    assert_eq!(outcomes.len(), 1);
    match outcomes[0] {
        RequestOutcome::Failed { kind, stage, .. } => {
            assert_eq!(kind, ErrorKind::NotFound);
            assert_eq!(stage, Some(Stage::Resolve));
        }
        other => panic!("expected failure, got {}", other),
    }
    assert!(sink.events().iter().any(|e| matches!(e, SearchEvent::Stage(_))));
}
