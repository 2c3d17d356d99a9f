use breedlens::testing::ScriptedFetcher;
use breedlens::{
    AdmissionController, ErrorKind, RequestContext, SearchQuery, SearchService,
    DecayHandle,
};
use http::StatusCode;
use std::time::Duration;

const LOOKUP: &str = "https://up.test/api/breed/husky/images/random";
const IMAGE: &str = "https://images.up.test/breeds/husky/n02110185_1469.jpg";

fn husky_service() -> (SearchService<ScriptedFetcher>, ScriptedFetcher, DecayHandle) {
    let fetcher = ScriptedFetcher::new()
        .resolves_to(LOOKUP, IMAGE)
        .respond(IMAGE, StatusCode::OK, b"jpeg".to_vec());
    let admission = AdmissionController::new();
    let decay = admission.start_decay(Duration::from_secs(1));
    let service = SearchService::new(fetcher.clone(), admission, "https://up.test");
    (service, fetcher, decay)
}

#[tokio::test(start_paused = true)]
async fn eleventh_request_in_a_window_is_rejected() {
    let (service, fetcher, _decay) = husky_service();
    let query = SearchQuery::category_only("husky");

    for i in 0..10 {
        let found = service.search(&query, &RequestContext::new()).await;
        assert!(found.is_ok(), "request {} should be admitted: {:?}", i, found);
    }

    let err = service.search(&query, &RequestContext::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    assert!(err.is_resource_exhausted());

    // Denied requests never reach the upstream.
    assert_eq!(fetcher.calls().len(), 20);
}

#[tokio::test(start_paused = true)]
async fn one_slot_frees_after_an_interval() {
    let (service, _fetcher, _decay) = husky_service();
    let query = SearchQuery::category_only("husky");

    for _ in 0..10 {
        service.search(&query, &RequestContext::new()).await.unwrap();
    }
    assert!(service.search(&query, &RequestContext::new()).await.is_err());

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    assert_eq!(service.admission().in_use(), 9);

    service.search(&query, &RequestContext::new()).await.unwrap();
    let err = service.search(&query, &RequestContext::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
}

#[tokio::test(start_paused = true)]
async fn counter_drains_one_per_interval_and_stops_at_zero() {
    let (service, _fetcher, _decay) = husky_service();
    let query = SearchQuery::category_only("husky");

    for _ in 0..3 {
        service.search(&query, &RequestContext::new()).await.unwrap();
    }
    assert_eq!(service.admission().in_use(), 3);

    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert_eq!(service.admission().in_use(), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(service.admission().in_use(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_requests_still_hold_their_slot() {
    let (service, _fetcher, _decay) = husky_service();

    for _ in 0..10 {
        let err = service
            .search(&SearchQuery::new("husky", "notreal"), &RequestContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    let err = service
        .search(&SearchQuery::category_only("husky"), &RequestContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
}

#[tokio::test(start_paused = true)]
async fn invalid_requests_do_not_consume_admission() {
    let (service, fetcher, _decay) = husky_service();

    for _ in 0..25 {
        let err = service
            .search(&SearchQuery::category_only("hu5ky"), &RequestContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    assert_eq!(service.admission().in_use(), 0);
    assert!(fetcher.calls().is_empty());
    service.search(&SearchQuery::category_only("husky"), &RequestContext::new()).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_burst_admits_exactly_capacity() {
    let fetcher = ScriptedFetcher::new()
        .resolves_to(LOOKUP, IMAGE)
        .respond(IMAGE, StatusCode::OK, b"jpeg".to_vec());
    // No decay task: the window never drains during the burst.
    let service = SearchService::new(fetcher, AdmissionController::new(), "https://up.test");

    let mut handles = Vec::new();
    for _ in 0..30 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.search(&SearchQuery::category_only("husky"), &RequestContext::new()).await
        }));
    }

    let mut admitted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) if e.is_resource_exhausted() => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(admitted, 10);
    assert_eq!(rejected, 20);
    assert_eq!(service.admission().in_use(), 10);
}
