//! REST API handlers exposing the engine and the shared form session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::adapters::form_session::{FormSession, SessionInput, SessionState};
use crate::config::Settings;
use crate::domain::{CatalogSource, Catalogs, EngineError, LayoutElement};
use crate::engine::{
    compose_with_policy, synthesize_defaults, synthesize_layout, ObjectSchema, ResolvedSchema,
};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<RwLock<Settings>>,
    pub catalogs: Arc<dyn CatalogSource>,
    pub session: Arc<RwLock<FormSession>>,
}

impl ApiState {
    pub fn new(settings: Arc<RwLock<Settings>>, catalogs: Arc<dyn CatalogSource>) -> Self {
        Self {
            settings,
            catalogs,
            session: Arc::new(RwLock::new(FormSession::new())),
        }
    }

    /// Load the configured catalogs and compose them. Nothing is cached.
    pub async fn resolve(&self) -> Result<ResolvedSchema, EngineError> {
        let policy = self.settings.read().await.catalog.duplicates;
        let catalogs = self.catalogs.load().await?;
        compose_with_policy(&catalogs.fields, &catalogs.objects, policy)
    }

    /// Re-activate the configured object in the session from fresh catalogs.
    ///
    /// On failure the session keeps its last good state.
    pub async fn reload_session(&self) -> Result<(), EngineError> {
        let object = {
            let settings = self.settings.read().await;
            settings
                .catalog
                .active_object
                .clone()
                .or_else(|| self.session_object_hint())
        };
        let Some(object) = object else {
            info!("No active object configured; session left as is");
            return Ok(());
        };

        let resolved = self.resolve().await?;
        let policy = self.settings.read().await.layout.clone();
        self.session
            .write()
            .await
            .activate(&resolved, &object, &policy)?;
        info!("Session initialised with object schema {}", object);
        Ok(())
    }

    fn session_object_hint(&self) -> Option<String> {
        self.session
            .try_read()
            .ok()
            .and_then(|s| s.active_object().map(str::to_string))
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn engine_error(err: &EngineError) -> Response {
    let status = match err {
        EngineError::UnresolvedReference { .. }
        | EngineError::CyclicReference { .. }
        | EngineError::MalformedInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::DuplicateIdentifier { .. } => StatusCode::CONFLICT,
        EngineError::Io { .. } | EngineError::Parse { .. } => {
            error!("Catalog load failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}

fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

// ============================================================================
// Engine endpoints
// ============================================================================

/// Resolved schema, default data and layout of one object
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectView {
    pub schema: Value,
    pub data: Map<String, Value>,
    pub layout: LayoutElement,
}

/// POST /api/compose - Compose catalogs sent in the body
pub async fn compose_catalogs(
    State(state): State<ApiState>,
    Json(catalogs): Json<Catalogs>,
) -> impl IntoResponse {
    let policy = state.settings.read().await.catalog.duplicates;
    match compose_with_policy(&catalogs.fields, &catalogs.objects, policy) {
        Ok(resolved) => ok(resolved),
        Err(e) => engine_error(&e),
    }
}

/// POST /api/defaults - Default data for the schema in the body
pub async fn defaults_for_schema(Json(schema): Json<Value>) -> impl IntoResponse {
    match ObjectSchema::new(&schema) {
        Ok(view) => ok(synthesize_defaults(view)),
        Err(e) => engine_error(&e),
    }
}

/// POST /api/layout - Layout for the schema in the body
pub async fn layout_for_schema(
    State(state): State<ApiState>,
    Json(schema): Json<Value>,
) -> impl IntoResponse {
    let policy = state.settings.read().await.layout.clone();
    match ObjectSchema::new(&schema) {
        Ok(view) => ok(synthesize_layout(view, &policy)),
        Err(e) => engine_error(&e),
    }
}

/// GET /api/schema - Composed schema of the configured catalogs
pub async fn get_schema(State(state): State<ApiState>) -> impl IntoResponse {
    match state.resolve().await {
        Ok(resolved) => ok(resolved),
        Err(e) => engine_error(&e),
    }
}

/// GET /api/objects - Names of the composed object schemas
pub async fn list_objects(State(state): State<ApiState>) -> impl IntoResponse {
    match state.resolve().await {
        Ok(resolved) => {
            let names: Vec<String> = resolved.object_names().into_iter().map(String::from).collect();
            ok(names)
        }
        Err(e) => engine_error(&e),
    }
}

/// GET /api/objects/:name - Schema, default data and layout of one object
pub async fn get_object(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let resolved = match state.resolve().await {
        Ok(resolved) => resolved,
        Err(e) => return engine_error(&e),
    };
    let Some(schema) = resolved.object(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("Object schema not found: {}", name))),
        )
            .into_response();
    };

    let policy = state.settings.read().await.layout.clone();
    match ObjectSchema::new(schema) {
        Ok(view) => ok(ObjectView {
            schema: schema.clone(),
            data: synthesize_defaults(view),
            layout: synthesize_layout(view, &policy),
        }),
        Err(e) => engine_error(&e),
    }
}

// ============================================================================
// Session endpoints
// ============================================================================

/// A single edit routed from a form control
#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub path: String,
    pub value: Value,
}

/// GET /api/session - Current schema, layout and data
pub async fn get_session(State(state): State<ApiState>) -> impl IntoResponse {
    ok(state.session.read().await.snapshot())
}

fn applied(accepted: bool, what: &str, snapshot: SessionState) -> Response {
    if accepted {
        ok(snapshot)
    } else {
        warn!("Rejected session {} update", what);
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!(
                "Invalid {}; previous state kept",
                what
            ))),
        )
            .into_response()
    }
}

/// PUT /api/session/schema
pub async fn put_session_schema(
    State(state): State<ApiState>,
    Json(input): Json<SessionInput>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    let accepted = session.set_schema(input);
    applied(accepted, "schema", session.snapshot())
}

/// PUT /api/session/layout
pub async fn put_session_layout(
    State(state): State<ApiState>,
    Json(input): Json<SessionInput>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    let accepted = session.set_layout(input);
    applied(accepted, "layout", session.snapshot())
}

/// PUT /api/session/data
pub async fn put_session_data(
    State(state): State<ApiState>,
    Json(input): Json<SessionInput>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    let accepted = session.set_data(input);
    applied(accepted, "data", session.snapshot())
}

/// PATCH /api/session/data - Merge one edited value
pub async fn patch_session_data(
    State(state): State<ApiState>,
    Json(edit): Json<FieldEdit>,
) -> impl IntoResponse {
    let mut session = state.session.write().await;
    match session.on_field_edit(&edit.path, edit.value) {
        Ok(()) => ok(Value::Object(session.data().clone())),
        Err(e) => engine_error(&e),
    }
}

/// POST /api/session/activate/:name - Switch the session to another object
pub async fn activate_object(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let resolved = match state.resolve().await {
        Ok(resolved) => resolved,
        Err(e) => return engine_error(&e),
    };
    if resolved.object(&name).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!("Object schema not found: {}", name))),
        )
            .into_response();
    }

    let policy = state.settings.read().await.layout.clone();
    let mut session = state.session.write().await;
    match session.activate(&resolved, &name, &policy) {
        Ok(()) => ok(session.snapshot()),
        Err(e) => engine_error(&e),
    }
}
