//! In-memory mock of the deck kanban API.
//!
//! Serves the same paths and camelCase JSON as the real service under
//! `/index.php/apps/deck/api/v1.0/boards`. Every request must carry
//! `OCS-APIRequest: true` (412 otherwise) and Basic credentials (401
//! otherwise); the Basic username owns whatever the request creates. The
//! password is not checked.

pub mod model;
pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};

use model::{
    Acl, AclInput, AclUpdate, Board, BoardInput, BoardUpdate, Card, CardInput, CardUpdate, Label,
    LabelInput, LabelRef, Reorder, Stack, StackInput, UserRef,
};
use store::Deck;

pub const API_PATH: &str = "/index.php/apps/deck/api/v1.0/boards";

pub type Db = Arc<RwLock<Deck>>;

/// The authenticated user, taken from the Basic credentials.
#[derive(Clone, Debug)]
pub struct Caller(pub String);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Deck::default()));
    Router::new()
        .nest(API_PATH, routes())
        .with_state(db)
}

/// Every deck route, relative to `API_PATH`.
fn routes() -> Router<Db> {
    Router::new()
        .route("/", get(list_boards).post(create_board))
        .route("/{board_id}", get(get_board).delete(delete_board))
        .route("/boards/{board_id}", put(update_board))
        .route("/boards/{board_id}/undo_delete", post(undo_delete_board))
        .route("/boards/{board_id}/acl", post(add_acl))
        .route(
            "/boards/{board_id}/acl/{acl_id}",
            put(update_acl).delete(delete_acl),
        )
        .route("/{board_id}/stacks", get(list_stacks).post(create_stack))
        .route("/{board_id}/stacks/archived", get(list_archived_stacks))
        .route(
            "/{board_id}/stacks/{stack_id}",
            get(get_stack).put(update_stack).delete(delete_stack),
        )
        .route("/{board_id}/stacks/{stack_id}/cards", post(create_card))
        .route(
            "/{board_id}/stacks/{stack_id}/cards/{card_id}",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route(
            "/{board_id}/stacks/{stack_id}/cards/{card_id}/{action}",
            put(card_action),
        )
        .route("/{board_id}/labels", post(create_label))
        .route(
            "/{board_id}/labels/{label_id}",
            get(get_label).put(update_label).delete(delete_label),
        )
        .layer(middleware::from_fn(authenticate))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn authenticate(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let ocs = request
        .headers()
        .get("ocs-apirequest")
        .and_then(|value| value.to_str().ok());
    if ocs != Some("true") {
        return Err(StatusCode::PRECONDITION_FAILED);
    }
    let user = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(basic_user)
        .ok_or(StatusCode::UNAUTHORIZED)?;
    request.extensions_mut().insert(Caller(user));
    Ok(next.run(request).await)
}

/// Username from an `Authorization: Basic ...` header value.
fn basic_user(value: &str) -> Option<String> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, _password) = decoded.split_once(':')?;
    (!user.is_empty()).then(|| user.to_string())
}

// Boards

async fn list_boards(State(db): State<Db>) -> Json<Vec<Board>> {
    Json(db.read().await.list_boards())
}

async fn create_board(
    State(db): State<Db>,
    Extension(caller): Extension<Caller>,
    Json(input): Json<BoardInput>,
) -> Result<Json<Board>, StatusCode> {
    db.write().await.create_board(&caller.0, input).map(Json)
}

async fn get_board(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
) -> Result<Json<Board>, StatusCode> {
    db.read().await.get_board(board_id).map(Json)
}

async fn update_board(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
    Json(input): Json<BoardUpdate>,
) -> Result<Json<Board>, StatusCode> {
    db.write().await.update_board(board_id, input).map(Json)
}

async fn delete_board(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
) -> Result<Json<Board>, StatusCode> {
    db.write().await.delete_board(board_id).map(Json)
}

async fn undo_delete_board(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
) -> Result<Json<Board>, StatusCode> {
    db.write().await.undo_delete_board(board_id).map(Json)
}

async fn add_acl(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
    Json(input): Json<AclInput>,
) -> Result<Json<Acl>, StatusCode> {
    db.write().await.add_acl(board_id, input).map(Json)
}

async fn update_acl(
    State(db): State<Db>,
    Path((board_id, acl_id)): Path<(i64, i64)>,
    Json(input): Json<AclUpdate>,
) -> Result<Json<Acl>, StatusCode> {
    db.write().await.update_acl(board_id, acl_id, input).map(Json)
}

async fn delete_acl(
    State(db): State<Db>,
    Path((board_id, acl_id)): Path<(i64, i64)>,
) -> Result<Json<Acl>, StatusCode> {
    db.write().await.delete_acl(board_id, acl_id).map(Json)
}

// Stacks

async fn list_stacks(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
) -> Result<Json<Vec<Stack>>, StatusCode> {
    db.read().await.list_stacks(board_id).map(Json)
}

async fn list_archived_stacks(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
) -> Result<Json<Vec<Stack>>, StatusCode> {
    db.read().await.list_archived_stacks(board_id).map(Json)
}

async fn get_stack(
    State(db): State<Db>,
    Path((board_id, stack_id)): Path<(i64, i64)>,
) -> Result<Json<Stack>, StatusCode> {
    db.read().await.get_stack(board_id, stack_id).map(Json)
}

async fn create_stack(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
    Json(input): Json<StackInput>,
) -> Result<Json<Stack>, StatusCode> {
    db.write().await.create_stack(board_id, input).map(Json)
}

async fn update_stack(
    State(db): State<Db>,
    Path((board_id, stack_id)): Path<(i64, i64)>,
    Json(input): Json<StackInput>,
) -> Result<Json<Stack>, StatusCode> {
    db.write().await.update_stack(board_id, stack_id, input).map(Json)
}

async fn delete_stack(
    State(db): State<Db>,
    Path((board_id, stack_id)): Path<(i64, i64)>,
) -> Result<Json<Stack>, StatusCode> {
    db.write().await.delete_stack(board_id, stack_id).map(Json)
}

// Cards

async fn get_card(
    State(db): State<Db>,
    Path((board_id, stack_id, card_id)): Path<(i64, i64, i64)>,
) -> Result<Json<Card>, StatusCode> {
    db.read().await.get_card(board_id, stack_id, card_id).map(Json)
}

async fn create_card(
    State(db): State<Db>,
    Extension(caller): Extension<Caller>,
    Path((board_id, stack_id)): Path<(i64, i64)>,
    Json(input): Json<CardInput>,
) -> Result<Json<Card>, StatusCode> {
    db.write()
        .await
        .create_card(&caller.0, board_id, stack_id, input)
        .map(Json)
}

async fn update_card(
    State(db): State<Db>,
    Path((board_id, stack_id, card_id)): Path<(i64, i64, i64)>,
    Json(input): Json<CardUpdate>,
) -> Result<Json<Card>, StatusCode> {
    db.write()
        .await
        .update_card(board_id, stack_id, card_id, input)
        .map(Json)
}

async fn delete_card(
    State(db): State<Db>,
    Path((board_id, stack_id, card_id)): Path<(i64, i64, i64)>,
) -> Result<Json<Card>, StatusCode> {
    db.write()
        .await
        .delete_card(board_id, stack_id, card_id)
        .map(Json)
}

fn body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, StatusCode> {
    serde_json::from_value(body).map_err(|_| StatusCode::BAD_REQUEST)
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, StatusCode> {
    serde_json::to_value(value).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// `assignLabel`, `removeLabel`, `assignUser`, `unassignUser` and `reorder`.
async fn card_action(
    State(db): State<Db>,
    Path((board_id, stack_id, card_id, action)): Path<(i64, i64, i64, String)>,
    Json(input): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut deck = db.write().await;
    let result = match action.as_str() {
        "assignLabel" => {
            let LabelRef { label_id } = body(input)?;
            deck.assign_label(board_id, stack_id, card_id, label_id)?;
            Value::Null
        }
        "removeLabel" => {
            let LabelRef { label_id } = body(input)?;
            deck.remove_label(board_id, stack_id, card_id, label_id)?;
            Value::Null
        }
        "assignUser" => {
            let UserRef { user_id } = body(input)?;
            to_json(deck.assign_user(board_id, stack_id, card_id, &user_id)?)?
        }
        "unassignUser" => {
            let UserRef { user_id } = body(input)?;
            to_json(deck.unassign_user(board_id, stack_id, card_id, &user_id)?)?
        }
        "reorder" => {
            let Reorder { order, stack_id: target } = body(input)?;
            to_json(deck.reorder_card(board_id, stack_id, card_id, order, target)?)?
        }
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Json(result))
}

// Labels

async fn get_label(
    State(db): State<Db>,
    Path((board_id, label_id)): Path<(i64, i64)>,
) -> Result<Json<Label>, StatusCode> {
    db.read().await.get_label(board_id, label_id).map(Json)
}

async fn create_label(
    State(db): State<Db>,
    Path(board_id): Path<i64>,
    Json(input): Json<LabelInput>,
) -> Result<Json<Label>, StatusCode> {
    db.write().await.create_label(board_id, input).map(Json)
}

async fn update_label(
    State(db): State<Db>,
    Path((board_id, label_id)): Path<(i64, i64)>,
    Json(input): Json<LabelInput>,
) -> Result<Json<Label>, StatusCode> {
    db.write().await.update_label(board_id, label_id, input).map(Json)
}

async fn delete_label(
    State(db): State<Db>,
    Path((board_id, label_id)): Path<(i64, i64)>,
) -> Result<Json<Label>, StatusCode> {
    db.write().await.delete_label(board_id, label_id).map(Json)
}
