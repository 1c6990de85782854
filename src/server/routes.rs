//! HTTP route handlers for the chat state API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::chat::{ChatError, Chatroom, ChatroomId, Message, User};

use super::state::AppState;

/// Create the API router with all routes.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/session", get(session_state))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/chatrooms", get(list_chatrooms).post(new_chatroom))
        .route("/api/chatrooms/{id}", delete(delete_chatroom))
        .route("/api/chatrooms/{id}/title", put(rename_chatroom))
        .route("/api/chatrooms/{id}/select", post(select_chatroom))
        .route("/api/chatrooms/{id}/history", post(load_history))
        .route("/api/selection", delete(clear_selection))
        .route("/api/messages", get(current_messages).post(send_message))
        .route("/api/search", put(set_search))
        .route("/api/theme/toggle", post(toggle_theme))
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn api_error(err: &ChatError) -> ApiError {
    let status = match err {
        ChatError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ChatError::NoActiveChatroom => StatusCode::CONFLICT,
        ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chatroom-core",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Session flags and selection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Signed-in user.
    pub user: Option<User>,
    /// Whether the assistant is typing.
    pub is_typing: bool,
    /// Theme flag.
    pub is_dark_mode: bool,
    /// Sidebar search query.
    pub search_query: String,
    /// Selected chatroom, if it still exists.
    pub current_chatroom_id: Option<ChatroomId>,
}

async fn session_state(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let user = state.session.current_user().await;
    let (is_typing, is_dark_mode, search_query, current_chatroom_id) = state
        .session
        .read(|store| {
            (
                store.is_typing(),
                store.is_dark_mode(),
                store.search_query().to_owned(),
                store.current_chatroom_id().cloned(),
            )
        })
        .await;

    Json(SessionResponse {
        user,
        is_typing,
        is_dark_mode,
        search_query,
        current_chatroom_id,
    })
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Phone number without country code.
    pub phone: String,
    /// Dialling prefix, e.g. `+44`.
    pub country_code: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Json<User> {
    Json(state.session.login(request.phone, request.country_code).await)
}

async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.logout().await;
    StatusCode::NO_CONTENT
}

async fn list_chatrooms(State(state): State<Arc<AppState>>) -> Json<Vec<Chatroom>> {
    Json(state.session.visible_chatrooms().await)
}

async fn new_chatroom(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Chatroom>), ApiError> {
    let chatroom = state.session.new_chat().await.map_err(|e| api_error(&e))?;
    Ok((StatusCode::CREATED, Json(chatroom)))
}

/// Deletion outcome.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Whether a chatroom was removed.
    pub deleted: bool,
}

async fn delete_chatroom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.session.delete_chatroom(&id).await;
    Json(DeleteResponse { deleted })
}

/// Rename request.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    /// New title.
    pub title: String,
}

async fn rename_chatroom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<RenameRequest>,
) -> StatusCode {
    state.session.rename_chatroom(&id, request.title).await;
    StatusCode::NO_CONTENT
}

async fn select_chatroom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.session.select_chatroom(Some(ChatroomId::from(id))).await;
    StatusCode::NO_CONTENT
}

async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.select_chatroom(None).await;
    StatusCode::NO_CONTENT
}

/// History page outcome.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Number of messages prepended.
    pub added: usize,
}

async fn load_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<HistoryResponse> {
    let added = state.session.load_more_messages(&id).await;
    Json(HistoryResponse { added })
}

async fn current_messages(State(state): State<Arc<AppState>>) -> Json<Vec<Message>> {
    Json(state.session.current_messages().await)
}

/// Send request.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message text.
    #[serde(default)]
    pub content: String,
    /// Opaque image payload.
    pub image: Option<String>,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = state
        .session
        .send_message(&request.content, request.image)
        .await
        .map_err(|e| api_error(&e))?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Search request.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// The search query, applied verbatim.
    pub query: String,
}

async fn set_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Json<Vec<Chatroom>> {
    state.session.set_search_query(request.query).await;
    Json(state.session.visible_chatrooms().await)
}

/// Theme outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    /// New theme flag.
    pub is_dark_mode: bool,
}

async fn toggle_theme(State(state): State<Arc<AppState>>) -> Json<ThemeResponse> {
    let is_dark_mode = state.session.toggle_dark_mode().await;
    Json(ThemeResponse { is_dark_mode })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::chat::ChatConfig;

    fn app() -> Router {
        create_router(AppState::in_memory(&ChatConfig::new()).unwrap())
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = call(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_new_chat_requires_login() {
        let (status, _) = call(&app(), "POST", "/api/chatrooms", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_flow() {
        let app = app();
        let login = serde_json::json!({"phone": "5550100", "countryCode": "+1"});
        let (status, user) = call(&app, "POST", "/api/login", Some(login)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["countryCode"], "+1");
        assert_eq!(user["isAuthenticated"], true);

        let (status, chatroom) = call(&app, "POST", "/api/chatrooms", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(chatroom["title"], "New Chat");
        let id = chatroom["id"].as_str().unwrap().to_owned();

        let send = serde_json::json!({"content": "Hello there, how are you"});
        let (status, message) = call(&app, "POST", "/api/messages", Some(send)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message["isUser"], true);
        assert_eq!(message["chatroomId"], id.as_str());

        let (_, session) = call(&app, "GET", "/api/session", None).await;
        assert_eq!(session["isTyping"], true);
        assert_eq!(session["currentChatroomId"], id.as_str());

        let (_, chatrooms) = call(&app, "GET", "/api/chatrooms", None).await;
        assert_eq!(chatrooms[0]["title"], "Hello there, how are you");
        assert_eq!(chatrooms[0]["lastMessage"], "Hello there, how are you");

        let uri = format!("/api/chatrooms/{id}/history");
        let (_, history) = call(&app, "POST", &uri, None).await;
        assert_eq!(history["added"], 20);
        let (_, messages) = call(&app, "GET", "/api/messages", None).await;
        assert_eq!(messages.as_array().unwrap().len(), 21);

        let (_, deleted) = call(&app, "DELETE", &format!("/api/chatrooms/{id}"), None).await;
        assert_eq!(deleted["deleted"], true);
        let (_, session) = call(&app, "GET", "/api/session", None).await;
        assert_eq!(session["isTyping"], false);
        assert_eq!(session["currentChatroomId"], Value::Null);
    }

    #[tokio::test]
    async fn test_selection_can_be_cleared() {
        let app = app();
        let login = serde_json::json!({"phone": "5550100", "countryCode": "+1"});
        call(&app, "POST", "/api/login", Some(login)).await;
        let (_, chatroom) = call(&app, "POST", "/api/chatrooms", None).await;
        let id = chatroom["id"].as_str().unwrap();

        let (status, _) = call(&app, "DELETE", "/api/selection", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, cleared) = call(&app, "GET", "/api/session", None).await;
        assert_eq!(cleared["currentChatroomId"], Value::Null);
        let (_, messages) = call(&app, "GET", "/api/messages", None).await;
        assert!(messages.as_array().unwrap().is_empty());

        let (status, _) = call(&app, "POST", &format!("/api/chatrooms/{id}/select"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, selected) = call(&app, "GET", "/api/session", None).await;
        assert_eq!(selected["currentChatroomId"], id);
    }

    #[tokio::test]
    async fn test_send_without_selection_conflicts() {
        let app = app();
        let login = serde_json::json!({"phone": "5550100", "countryCode": "+1"});
        call(&app, "POST", "/api/login", Some(login)).await;

        let send = serde_json::json!({"content": "hi"});
        let (status, _) = call(&app, "POST", "/api/messages", Some(send)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let empty = serde_json::json!({"content": "   "});
        let (status, _) = call(&app, "POST", "/api/messages", Some(empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_rename_and_theme() {
        let app = app();
        let login = serde_json::json!({"phone": "5550100", "countryCode": "+1"});
        call(&app, "POST", "/api/login", Some(login)).await;
        let (_, first) = call(&app, "POST", "/api/chatrooms", None).await;
        call(&app, "POST", "/api/chatrooms", None).await;

        let id = first["id"].as_str().unwrap();
        let rename = serde_json::json!({"title": "Weekend Plans"});
        let (status, _) = call(&app, "PUT", &format!("/api/chatrooms/{id}/title"), Some(rename)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let search = serde_json::json!({"query": "weekend"});
        let (_, visible) = call(&app, "PUT", "/api/search", Some(search)).await;
        let visible = visible.as_array().unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0]["id"], id);

        let (_, theme) = call(&app, "POST", "/api/theme/toggle", None).await;
        assert_eq!(theme["isDarkMode"], true);

        let (status, _) = call(&app, "POST", "/api/logout", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, session) = call(&app, "GET", "/api/session", None).await;
        assert_eq!(session["user"], Value::Null);
        assert_eq!(session["isDarkMode"], true);
        let (_, chatrooms) = call(&app, "GET", "/api/chatrooms", None).await;
        assert!(chatrooms.as_array().unwrap().is_empty());
    }
}
