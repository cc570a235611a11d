//! Search Module Tests
//!
//! Validates the search pipeline from indexing through the HTTP surface.
//!
//! ## Test Scopes
//! - **Trigram**: similarity values match `pg_trgm`.
//! - **Ranking / intersection**: the pure aggregation helpers.
//! - **Engine**: exact, ranked and suggest over data indexed through the background queue.
//! - **Handlers**: JSON shapes and error responses.

#[cfg(test)]
mod tests {
    use crate::config::SearchConfig;
    use crate::employees::types::{Employee, EmployeeId, EmployeePatch, EmployeeSummary};
    use crate::error::{ErrorMessage, SearchError, StoreError};
    use crate::executor::queue::IndexQueue;
    use crate::index::hooks::Indexer;
    use crate::index::mutator::IndexMutator;
    use crate::search::engine::{SearchEngine, intersect_suggestions, rank_candidates};
    use crate::search::handlers::{handle_exact_search, handle_ranked_search, handle_suggest};
    use crate::search::trigram::{similarity, trigrams};
    use crate::search::types::SearchResponse;
    use crate::storage::memory::{MemoryEmployees, MemoryReverseIndex};
    use crate::storage::{ReverseIndexEntry, ReverseIndexStore, ScoredEntry};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::{Extension, Router};
    use std::sync::Arc;
    use tower::ServiceExt;

    // ============================================================
    // FIXTURE
    // ============================================================

    struct Fixture {
        index: Arc<MemoryReverseIndex>,
        employees: Arc<MemoryEmployees>,
        indexer: Indexer,
        engine: Arc<SearchEngine>,
    }

    impl Fixture {
        fn new() -> Self {
            let index = Arc::new(MemoryReverseIndex::new());
            let employees = Arc::new(MemoryEmployees::new());
            let mutator = Arc::new(IndexMutator::new(index.clone(), employees.clone()));
            let queue = Arc::new(IndexQueue::on_current_runtime(mutator));
            let indexer = Indexer::new(queue, employees.clone());
            let engine = Arc::new(SearchEngine::new(
                index.clone(),
                employees.clone(),
                SearchConfig::default(),
            ));
            Self {
                index,
                employees,
                indexer,
                engine,
            }
        }

        async fn create(&self, employee: Employee) {
            self.employees.insert(employee.clone());
            self.indexer.on_entity_created(&employee).unwrap();
            self.indexer.queue().wait_idle().await;
        }

        async fn delete(&self, id: &str) {
            self.indexer.on_entity_deleted(id).await.unwrap();
            self.employees.remove(id);
            self.indexer.queue().wait_idle().await;
        }

        async fn edit(&self, id: &str, patch: EmployeePatch) {
            self.indexer.on_entity_edited(id, &patch).unwrap();
            self.indexer.queue().wait_idle().await;
            self.employees.update(id, &patch).unwrap();
        }
    }

    fn ids(summaries: &[EmployeeSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.id.as_str()).collect()
    }

    fn ivan_petrov() -> Employee {
        Employee::new("e1", "Ivan", "Petrov")
    }

    // ============================================================
    // TRIGRAM
    // ============================================================

    #[test]
    fn test_trigrams_of_word() {
        let set = trigrams("Ivan");

        assert_eq!(set.len(), 5);
        assert!(set.contains(&[' ', ' ', 'i']));
        assert!(set.contains(&['a', 'n', ' ']));
    }

    #[test]
    fn test_similarity_identical_and_disjoint() {
        assert_eq!(similarity("petrov", "petrov"), 1.0);
        assert_eq!(similarity("ivan", "petrov"), 0.0);
        assert_eq!(similarity("", "petrov"), 0.0);
    }

    #[test]
    fn test_similarity_partial_overlap() {
        // "  iv " has 3 trigrams, "  ivan " has 5; two are shared.
        let score = similarity("iv", "ivan");
        assert!((score - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_case_insensitive_and_cyrillic_aware() {
        assert_eq!(similarity("ИВАН", "иван"), 1.0);
        assert!(similarity("петров", "петрова") > 0.4);
    }

    #[test]
    fn test_similarity_splits_on_punctuation() {
        assert!(similarity("ivan", "ivan@x.com") > 0.0);
    }

    // ============================================================
    // RANKING / INTERSECTION
    // ============================================================

    fn scored(key: &str, ids: &[&str], score: f64) -> ScoredEntry {
        ScoredEntry {
            key: key.to_string(),
            ids: ids.iter().map(|id| id.to_string()).collect(),
            score,
        }
    }

    fn entry(key: &str, ids: &[&str]) -> ReverseIndexEntry {
        ReverseIndexEntry {
            key: key.to_string(),
            ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn test_rank_candidates_sums_scores() {
        let rows = vec![
            scored("ivan", &["e1", "e2"], 1.0),
            scored("petrov", &["e1"], 1.0),
            scored("petrova", &["e3"], 0.6),
        ];

        assert_eq!(rank_candidates(&rows, 10), vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn test_rank_candidates_tie_break_by_id() {
        let rows = vec![scored("anna", &["zeta", "alpha", "mid"], 0.8)];

        assert_eq!(rank_candidates(&rows, 10), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_rank_candidates_duplicate_ids_count_once_per_row() {
        let rows = vec![
            scored("ivan", &["e1", "e1", "e1"], 1.0),
            scored("ivan", &["e2"], 1.0),
            scored("petrov", &["e2"], 0.5),
        ];

        assert_eq!(rank_candidates(&rows, 10), vec!["e2", "e1"]);
    }

    #[test]
    fn test_rank_candidates_truncates() {
        let rows = vec![scored("team", &["a", "b", "c", "d"], 1.0)];

        assert_eq!(rank_candidates(&rows, 2).len(), 2);
        assert!(rank_candidates(&[], 5).is_empty());
    }

    #[test]
    fn test_intersect_suggestions_prefix_only() {
        let prefixed = vec![entry("ivan", &["e2", "e1"]), entry("ivanova", &["e3", "e1"])];

        assert_eq!(intersect_suggestions(&[], &prefixed, 5), vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn test_intersect_suggestions_with_exact_filters() {
        let prefixed = vec![entry("pet", &["e1", "e2"]), entry("petrov", &["e3"])];
        let exact: Vec<Vec<EmployeeId>> = vec![
            vec!["e1".to_string(), "e3".to_string()],
            vec!["e3".to_string(), "e1".to_string(), "e9".to_string()],
        ];

        assert_eq!(intersect_suggestions(&exact, &prefixed, 5), vec!["e1", "e3"]);
    }

    #[test]
    fn test_intersect_suggestions_cap() {
        let many: Vec<String> = (0..20).map(|n| format!("e{:02}", n)).collect();
        let many_refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let prefixed = vec![entry("a", &many_refs)];

        let result = intersect_suggestions(&[], &prefixed, 5);

        assert_eq!(result, vec!["e00", "e01", "e02", "e03", "e04"]);
    }

    // ============================================================
    // ENGINE: EXACT
    // ============================================================

    #[tokio::test]
    async fn test_exact_round_trip_every_field() {
        let fx = Fixture::new();
        let mut employee = ivan_petrov();
        employee.email = Some("ivan@x.com".to_string());
        employee.team = Some("Платформа".to_string());
        employee.phones = vec!["+7 900 000".to_string()];
        fx.create(employee.clone()).await;

        for value in employee.indexable_values() {
            let found = fx.engine.exact(&value).await.unwrap();
            assert_eq!(ids(&found), vec!["e1"], "value {:?}", value);
        }
    }

    #[tokio::test]
    async fn test_exact_normalization_symmetry() {
        let fx = Fixture::new();
        fx.create(Employee::new("jdoe", "Jane", "Doe")).await;

        let upper = fx.engine.exact("JANE").await.unwrap();
        let lower = fx.engine.exact("jane").await.unwrap();

        assert_eq!(upper, lower);
        assert_eq!(ids(&upper), vec!["jdoe"]);
    }

    #[tokio::test]
    async fn test_exact_uses_whole_query_as_key() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;

        assert!(fx.engine.exact("ivan petrov").await.unwrap().is_empty());
        assert!(fx.engine.exact("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_collapses_duplicate_ids() {
        let fx = Fixture::new();
        let employee = ivan_petrov();
        fx.create(employee.clone()).await;
        fx.indexer.on_entity_created(&employee).unwrap();
        fx.indexer.queue().wait_idle().await;

        assert_eq!(fx.index.raw_ids("ivan").unwrap().len(), 2);
        assert_eq!(ids(&fx.engine.exact("ivan").await.unwrap()), vec!["e1"]);
    }

    #[tokio::test]
    async fn test_deletion_clears_rows() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;
        fx.create(Employee::new("e2", "Ivan", "Sidorov")).await;

        fx.delete("e1").await;

        assert!(fx.engine.exact("petrov").await.unwrap().is_empty());
        assert!(!fx.index.contains_key("petrov"), "last id gone, row gone");
        assert_eq!(ids(&fx.engine.exact("ivan").await.unwrap()), vec!["e2"]);
    }

    #[tokio::test]
    async fn test_edit_is_delete_old_add_new() {
        let fx = Fixture::new();
        let mut employee = Employee::new("alice", "Alice", "Smith");
        employee.email = Some("alice@x.com".to_string());
        fx.create(employee).await;

        fx.edit(
            "alice",
            EmployeePatch {
                email: Some("alice@y.com".to_string()),
                ..Default::default()
            },
        )
        .await;

        assert!(fx.engine.exact("alice@x.com").await.unwrap().is_empty());
        assert_eq!(ids(&fx.engine.exact("alice@y.com").await.unwrap()), vec!["alice"]);
        assert_eq!(ids(&fx.engine.exact("smith").await.unwrap()), vec!["alice"]);
    }

    // ============================================================
    // ENGINE: RANKED
    // ============================================================

    #[tokio::test]
    async fn test_ranked_two_token_match_ranks_first() {
        let fx = Fixture::new();
        fx.create(Employee::new("e2", "Ivan", "Sidorov")).await;
        fx.create(ivan_petrov()).await;

        let found = fx.engine.ranked("ivan petroV", 5).await.unwrap();

        assert_eq!(ids(&found), vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn test_ranked_fuzzy_token() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;

        let found = fx.engine.ranked("petrova", 5).await.unwrap();

        assert_eq!(ids(&found), vec!["e1"]);
    }

    #[tokio::test]
    async fn test_ranked_respects_limit() {
        let fx = Fixture::new();
        for n in 0..5 {
            fx.create(Employee::new(&format!("e{}", n), "Maria", &format!("Surname{}", n)))
                .await;
        }

        let found = fx.engine.ranked("maria", 2).await.unwrap();

        assert_eq!(ids(&found), vec!["e0", "e1"]);
    }

    #[tokio::test]
    async fn test_ranked_limit_clamped_to_max() {
        let index = Arc::new(MemoryReverseIndex::new());
        let employees = Arc::new(MemoryEmployees::new());
        for n in 0..4 {
            let id = format!("e{}", n);
            employees.insert(Employee::new(&id, "Maria", "Ivanova"));
            index.append(&id, &["maria".to_string()]).await.unwrap();
        }
        let engine = SearchEngine::new(
            index,
            employees,
            SearchConfig {
                max_limit: 3,
                ..SearchConfig::default()
            },
        );

        assert_eq!(engine.ranked("maria", 100).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ranked_zero_limit_is_input_error() {
        let fx = Fixture::new();

        let result = fx.engine.ranked("ivan", 0).await;

        assert!(matches!(result, Err(SearchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_ranked_below_threshold_is_empty() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;

        assert!(fx.engine.ranked("iv", 5).await.unwrap().is_empty());
    }

    // ============================================================
    // ENGINE: SUGGEST
    // ============================================================

    #[tokio::test]
    async fn test_suggest_single_prefix() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;

        assert_eq!(ids(&fx.engine.suggest("iv").await.unwrap()), vec!["e1"]);
        assert_eq!(ids(&fx.engine.suggest("IV").await.unwrap()), vec!["e1"]);
    }

    #[tokio::test]
    async fn test_suggest_exact_filters_then_prefix() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;
        fx.create(Employee::new("e2", "Ivan", "Sidorov")).await;
        fx.create(Employee::new("e3", "Pavel", "Petrovsky")).await;

        let found = fx.engine.suggest("ivan pet").await.unwrap();

        assert_eq!(ids(&found), vec!["e1"]);
    }

    #[tokio::test]
    async fn test_suggest_unknown_exact_token_is_empty() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;

        assert!(fx.engine.suggest("iva pet").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_cap_of_five() {
        let fx = Fixture::new();
        for n in 0..8 {
            fx.create(Employee::new(&format!("e{}", n), "Anna", "Kuznetsova"))
                .await;
        }

        let found = fx.engine.suggest("an").await.unwrap();

        assert_eq!(ids(&found), vec!["e0", "e1", "e2", "e3", "e4"]);
    }

    #[tokio::test]
    async fn test_suggest_empty_query_matches_any_key() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;
        fx.create(Employee::new("e2", "Anna", "Ivanova")).await;

        assert_eq!(ids(&fx.engine.suggest("").await.unwrap()), vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn test_ivan_petrov_scenario() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;

        assert_eq!(ids(&fx.engine.exact("petrov").await.unwrap()), vec!["e1"]);
        assert_eq!(
            ids(&fx.engine.ranked("ivan petroV", 5).await.unwrap()).first(),
            Some(&"e1")
        );
        assert_eq!(ids(&fx.engine.suggest("iv").await.unwrap()), vec!["e1"]);

        fx.delete("e1").await;

        assert!(fx.engine.exact("petrov").await.unwrap().is_empty());
    }

    // ============================================================
    // HANDLERS
    // ============================================================

    fn router(engine: Arc<SearchEngine>) -> Router {
        Router::new()
            .route("/v1/search/basic", post(handle_exact_search))
            .route("/v1/search/full", post(handle_ranked_search))
            .route("/v1/search/suggest", post(handle_suggest))
            .layer(Extension(engine))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_handler_response_shape() {
        let fx = Fixture::new();
        let mut employee = Employee::new("jdoe", "Jane", "Doe");
        employee.photo_link = Some("photos/jdoe.png".to_string());
        fx.create(employee).await;

        let (status, body) = post_json(
            router(fx.engine.clone()),
            "/v1/search/basic",
            r#"{"search_key":"JANE"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"employees": [{
                "id": "jdoe",
                "name": "Jane",
                "surname": "Doe",
                "patronymic": null,
                "photo_link": "photos/jdoe.png"
            }]})
        );
    }

    #[tokio::test]
    async fn test_handler_ranked_and_suggest() {
        let fx = Fixture::new();
        fx.create(ivan_petrov()).await;

        let (status, body) = post_json(
            router(fx.engine.clone()),
            "/v1/search/full",
            r#"{"search_key":"ivan petrov","limit":5}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: SearchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(ids(&response.employees), vec!["e1"]);

        let (status, body) = post_json(
            router(fx.engine.clone()),
            "/v1/search/suggest",
            r#"{"search_key":"pe"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let response: SearchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(ids(&response.employees), vec!["e1"]);
    }

    #[tokio::test]
    async fn test_handler_malformed_body_is_400_with_message() {
        let fx = Fixture::new();

        for (uri, body) in [
            ("/v1/search/basic", "not json"),
            ("/v1/search/full", r#"{"search_key":"ivan"}"#),
            ("/v1/search/suggest", r#"{"query":"ivan"}"#),
        ] {
            let (status, bytes) = post_json(router(fx.engine.clone()), uri, body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            let error: ErrorMessage = serde_json::from_slice(&bytes).unwrap();
            assert!(!error.message.is_empty());
        }
    }

    #[tokio::test]
    async fn test_handler_zero_limit_is_400() {
        let fx = Fixture::new();

        let (status, bytes) = post_json(
            router(fx.engine.clone()),
            "/v1/search/full",
            r#"{"search_key":"ivan","limit":0}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorMessage = serde_json::from_slice(&bytes).unwrap();
        assert!(error.message.contains("limit"));
    }

    /// Index store whose reads always fail.
    struct BrokenIndex;

    #[async_trait]
    impl ReverseIndexStore for BrokenIndex {
        async fn append(&self, _id: &str, _keys: &[String]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn remove(&self, _id: &str, _keys: &[String]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn lookup(&self, _key: &str) -> Result<Option<Vec<EmployeeId>>, StoreError> {
            Err(StoreError::Database("replica unavailable".to_string()))
        }

        async fn similar(
            &self,
            _tokens: &[String],
            _threshold: f64,
        ) -> Result<Vec<ScoredEntry>, StoreError> {
            Err(StoreError::Database("replica unavailable".to_string()))
        }

        async fn prefixed(&self, _prefix: &str) -> Result<Vec<ReverseIndexEntry>, StoreError> {
            Err(StoreError::Database("replica unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_store_failure_during_search_is_500() {
        let engine = Arc::new(SearchEngine::new(
            Arc::new(BrokenIndex),
            Arc::new(MemoryEmployees::new()),
            SearchConfig::default(),
        ));

        assert!(matches!(
            engine.suggest("iv").await,
            Err(SearchError::Store(_))
        ));

        let (status, bytes) =
            post_json(router(engine), "/v1/search/basic", r#"{"search_key":"x"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorMessage = serde_json::from_slice(&bytes).unwrap();
        assert!(error.message.contains("replica unavailable"));
    }
}
