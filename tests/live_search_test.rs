//! Live end-to-end search against a real Chromium
//!
//! These drive the whole pipeline: browser launch, the synthetic document,
//! the real CSE widget, pagination, extraction. They need a Chromium on the
//! machine, network access, and a CSE engine id in `CSE_ENGINE_ID`.

use cse_indexer::session::SearchRequest;
use cse_indexer::{search, Config, Outcome};

fn engine_id() -> String {
    std::env::var("CSE_ENGINE_ID")
        .expect("set CSE_ENGINE_ID to a CSE engine id to run live tests")
}

#[tokio::test]
#[ignore] // Requires browser installation and a CSE_ENGINE_ID env var
async fn live_search_streams_result_links() {
    let request = SearchRequest::new(engine_id(), "rust programming", None);
    let mut sink: Vec<String> = Vec::new();

    let outcome = search::run_search(&Config::default(), &request, &mut sink)
        .await
        .unwrap();

    match outcome {
        Outcome::PagesExhausted { pages } => {
            assert!(pages >= 1);
            assert!(!sink.is_empty());
            for link in &sink {
                assert!(link.starts_with("http"), "not an absolute URL: {link}");
            }
        }
        Outcome::NoResults => panic!("expected results for a broad query"),
    }
}

#[tokio::test]
#[ignore] // Requires browser installation and a CSE_ENGINE_ID env var
async fn live_search_with_no_hits_is_empty_success() {
    let request = SearchRequest::new(
        engine_id(),
        "zvqxw qwvxz vxqzw unlikely token salad",
        None,
    );
    let mut sink: Vec<String> = Vec::new();

    let outcome = search::run_search(&Config::default(), &request, &mut sink)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::NoResults);
    assert!(sink.is_empty());
}
