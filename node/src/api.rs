//! # REST API
//!
//! The axum router that stands in for an interactive front end: submit
//! transfers, inspect the ledger, validate it, and tune difficulty. All
//! handlers share one [`LedgerService`] through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path             | Description                              |
//! |--------|------------------|------------------------------------------|
//! | GET    | `/health`        | Liveness probe                           |
//! | GET    | `/status`        | Height, difficulty, tip hash             |
//! | GET    | `/blocks`        | The ledger as a table of display rows    |
//! | POST   | `/blocks`        | Mine and append a transfer               |
//! | GET    | `/blocks/:index` | Single block detail                      |
//! | POST   | `/validate`      | Run a full validation pass               |
//! | GET    | `/difficulty`    | Current difficulty                       |
//! | PUT    | `/difficulty`    | Change difficulty for future blocks      |

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use hashchain::{Block, BlockRow, LedgerError, LedgerService};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared state for every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Reported version string.
    pub version: String,
    /// The one ledger this node serves.
    pub ledger: Arc<LedgerService>,
    /// Prometheus handles.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Build the API router with CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/blocks", get(list_blocks_handler).post(submit_block_handler))
        .route("/blocks/:index", get(block_by_index_handler))
        .route("/validate", post(validate_handler))
        .route(
            "/difficulty",
            get(get_difficulty_handler).put(set_difficulty_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Body of `POST /blocks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
}

/// Response of `POST /blocks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MinedBlockResponse {
    /// Position of the new block.
    pub index: usize,
    /// Winning hash.
    pub hash: String,
    /// Winning nonce.
    pub nonce: u64,
    /// Hashes computed during the search.
    pub attempts: u64,
    /// Search time in milliseconds.
    pub elapsed_ms: u64,
    pub block: Block,
}

/// Response of `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    /// Blocks in the chain, genesis included.
    pub height: usize,
    pub difficulty: usize,
    pub min_difficulty: usize,
    pub max_difficulty: usize,
    /// Hash of the most recent block.
    pub tip_hash: String,
    /// RFC 3339 time of the response.
    pub timestamp: String,
}

/// Response of `GET /blocks/:index`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockDetailResponse {
    pub index: usize,
    pub hash: String,
    /// One-line display form of the block.
    pub summary: String,
    pub block: Block,
}

/// Response of `POST /validate`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub valid: bool,
    /// First block whose prev hash does not match, when invalid.
    pub first_invalid_index: Option<usize>,
}

/// Body of `PUT /difficulty` and response of both difficulty routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct DifficultyBody {
    pub difficulty: usize,
}

/// Error body returned on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn ledger_error_response(err: LedgerError) -> Response {
    let status = match err {
        LedgerError::DifficultyOutOfRange { .. } | LedgerError::InvalidConfig(_) => {
            StatusCode::BAD_REQUEST
        }
        LedgerError::NonceExhausted { .. } | LedgerError::MiningTask(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, err.to_string())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: 200 while the process is up.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status`
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.ledger.config();
    Json(StatusResponse {
        version: state.version.clone(),
        height: state.ledger.height(),
        difficulty: state.ledger.difficulty(),
        min_difficulty: config.min_difficulty,
        max_difficulty: config.max_difficulty,
        tip_hash: state.ledger.tip_hash(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `GET /blocks`: one row per block, every field as text.
async fn list_blocks_handler(State(state): State<AppState>) -> Json<Vec<BlockRow>> {
    Json(state.ledger.table())
}

/// `POST /blocks`: link a new transfer to the tip, mine it, append it.
///
/// Holds the request open until mining finishes.
async fn submit_block_handler(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Response {
    match state.ledger.submit(req.sender, req.receiver, req.amount).await {
        Ok(mined) => {
            state.metrics.observe_mining(&mined.report, mined.index + 1);
            let resp = MinedBlockResponse {
                index: mined.index,
                hash: mined.report.hash.clone(),
                nonce: mined.report.nonce,
                attempts: mined.report.attempts,
                elapsed_ms: mined.report.elapsed.as_millis() as u64,
                block: mined.block,
            };
            (StatusCode::CREATED, Json(resp)).into_response()
        }
        Err(e) => {
            tracing::error!("block submission failed: {}", e);
            ledger_error_response(e)
        }
    }
}

/// `GET /blocks/:index`: 404 past the tip.
async fn block_by_index_handler(
    Path(index): Path<usize>,
    State(state): State<AppState>,
) -> Response {
    match state.ledger.get_block(index) {
        Some(block) => Json(BlockDetailResponse {
            index,
            hash: block.hash_block(),
            summary: block.to_string(),
            block,
        })
        .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Block not found at index {}", index),
        ),
    }
}

/// `POST /validate`
async fn validate_handler(State(state): State<AppState>) -> Json<ValidationResponse> {
    let outcome = state.ledger.validate_chain();
    state.metrics.observe_validation(outcome.is_valid());
    Json(ValidationResponse {
        valid: outcome.is_valid(),
        first_invalid_index: outcome.first_invalid_index(),
    })
}

/// `GET /difficulty`
async fn get_difficulty_handler(State(state): State<AppState>) -> Json<DifficultyBody> {
    Json(DifficultyBody {
        difficulty: state.ledger.difficulty(),
    })
}

/// `PUT /difficulty`: 400 when outside the configured range.
async fn set_difficulty_handler(
    State(state): State<AppState>,
    Json(body): Json<DifficultyBody>,
) -> Response {
    match state.ledger.set_difficulty(body.difficulty) {
        Ok(()) => {
            state.metrics.difficulty.set(body.difficulty as i64);
            Json(DifficultyBody {
                difficulty: body.difficulty,
            })
            .into_response()
        }
        Err(e) => ledger_error_response(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use hashchain::{Chain, LedgerConfig, Record};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_config() -> LedgerConfig {
        LedgerConfig {
            difficulty: 1,
            min_difficulty: 0,
            max_difficulty: 5,
            creator_id: 42,
        }
    }

    fn state_with(ledger: LedgerService) -> AppState {
        AppState {
            version: "0.1.0-test".into(),
            ledger: Arc::new(ledger),
            metrics: Arc::new(crate::metrics::NodeMetrics::new().expect("metrics")),
        }
    }

    fn test_app_state() -> AppState {
        state_with(LedgerService::new(test_config()).expect("ledger"))
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, body)
    }

    async fn get(router: &Router, path: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        send(router, req).await
    }

    async fn with_json(
        router: &Router,
        method: &str,
        path: &str,
        body: serde_json::Value,
    ) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        send(router, req).await
    }

    // -- Health / status ------------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn status_reports_genesis_chain() {
        let state = test_app_state();
        let tip = state.ledger.tip_hash();
        let router = create_router(state);
        let (status, body) = get(&router, "/status").await;

        assert_eq!(status, StatusCode::OK);
        let resp: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.height, 1);
        assert_eq!(resp.difficulty, 1);
        assert_eq!(resp.tip_hash, tip);
    }

    // -- Blocks ---------------------------------------------------------------

    #[tokio::test]
    async fn submit_mines_and_appends() {
        let state = test_app_state();
        let router = create_router(state.clone());

        let (status, body) = with_json(
            &router,
            "POST",
            "/blocks",
            serde_json::json!({ "sender": "Alice", "receiver": "Bob", "amount": 10.0 }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let resp: MinedBlockResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.index, 1);
        assert!(resp.hash.starts_with('0'));
        assert_eq!(resp.block.record.sender, "Alice");
        assert_eq!(resp.block.creator_id, 42);
        assert_eq!(state.ledger.height(), 2);
        assert_eq!(state.metrics.blocks_mined_total.get(), 1);
        assert_eq!(state.metrics.chain_height.get(), 2);
    }

    #[tokio::test]
    async fn submit_rejects_malformed_body() {
        let router = create_router(test_app_state());
        let (status, _) = with_json(
            &router,
            "POST",
            "/blocks",
            serde_json::json!({ "sender": "Alice", "receiver": "Bob", "amount": "ten" }),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn list_blocks_returns_table_rows() {
        let state = test_app_state();
        state.ledger.submit("Alice", "Bob", 2.0).await.unwrap();
        let router = create_router(state);

        let (status, body) = get(&router, "/blocks").await;
        assert_eq!(status, StatusCode::OK);
        let rows: Vec<BlockRow> = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sender, "Genesis");
        assert_eq!(rows[1].amount, "2");
        assert_eq!(rows[1].prev_hash, rows[0].hash);
    }

    #[tokio::test]
    async fn block_detail_returns_genesis() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/blocks/0").await;

        assert_eq!(status, StatusCode::OK);
        let resp: BlockDetailResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.index, 0);
        assert_eq!(resp.block.prev_hash, "0");
        assert_eq!(resp.hash, resp.block.hash_block());
        assert!(resp.summary.starts_with("Block("));
    }

    #[tokio::test]
    async fn block_detail_404_past_tip() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/blocks/7").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(err.error.contains("not found"));
    }

    // -- Validation -----------------------------------------------------------

    #[tokio::test]
    async fn validate_reports_valid_chain() {
        let state = test_app_state();
        state.ledger.submit("Alice", "Bob", 1.0).await.unwrap();
        let router = create_router(state.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/validate")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&router, req).await;

        assert_eq!(status, StatusCode::OK);
        let resp: ValidationResponse = serde_json::from_slice(&body).unwrap();
        assert!(resp.valid);
        assert_eq!(resp.first_invalid_index, None);
        assert_eq!(state.metrics.validations_total.get(), 1);
    }

    #[tokio::test]
    async fn validate_reports_tampered_chain() {
        let mut chain = Chain::new(0);
        for amount in [1.0, 2.0] {
            let next = chain.tip().hash_block();
            chain
                .add_block(Block::new(Record::new("a", "b", amount), 42).with_prev_hash(next))
                .unwrap();
        }
        chain.blocks_mut()[2].prev_hash = "forged".into();

        let state = state_with(LedgerService::from_chain(chain, test_config()).unwrap());
        let router = create_router(state.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/validate")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&router, req).await;

        let resp: ValidationResponse = serde_json::from_slice(&body).unwrap();
        assert!(!resp.valid);
        assert_eq!(resp.first_invalid_index, Some(2));
        assert_eq!(state.metrics.validation_failures_total.get(), 1);
    }

    // -- Difficulty -----------------------------------------------------------

    #[tokio::test]
    async fn difficulty_roundtrip() {
        let state = test_app_state();
        let router = create_router(state.clone());

        let (status, _) =
            with_json(&router, "PUT", "/difficulty", serde_json::json!({ "difficulty": 3 })).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(&router, "/difficulty").await;
        assert_eq!(status, StatusCode::OK);
        let resp: DifficultyBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.difficulty, 3);
        assert_eq!(state.metrics.difficulty.get(), 3);
    }

    #[tokio::test]
    async fn difficulty_out_of_range_is_bad_request() {
        let state = test_app_state();
        let router = create_router(state.clone());

        let (status, body) =
            with_json(&router, "PUT", "/difficulty", serde_json::json!({ "difficulty": 9 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(err.error.contains("outside allowed range"));
        assert_eq!(state.ledger.difficulty(), 1);
    }
}
