use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::pages::{self, Severity};
use super::service::{ApprovalError, ApprovalService};
use super::store::PendingStore;
use super::transport::{MessageTransport, RecipientDirectory};

/// Router builder exposing the query-parameter action surface.
pub fn approval_router<S, D, T>(service: Arc<ApprovalService<S, D, T>>) -> Router
where
    S: PendingStore + 'static,
    D: RecipientDirectory + 'static,
    T: MessageTransport + 'static,
{
    Router::new()
        .route("/approval", get(action_handler::<S, D, T>))
        .with_state(service)
}

/// Everything arrives through one GET endpoint dispatching on `action`, mirroring the
/// reviewer links embedded in notification messages.
#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
    pub customer: Option<String>,
    pub room_id: Option<String>,
    pub include_image: Option<String>,
    pub selected_images: Option<String>,
    pub images: Option<String>,
}

fn require<'a>(
    value: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, ApprovalError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApprovalError::MissingParam(name)),
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn severity_for(err: &ApprovalError) -> Severity {
    match err {
        ApprovalError::NotFoundOrProcessed | ApprovalError::NotVisible => Severity::NotFound,
        _ => Severity::Error,
    }
}

fn error_page(err: &ApprovalError) -> Response {
    let severity = severity_for(err);
    match severity {
        Severity::NotFound => warn!(error = %err, "approval action found no pending row"),
        _ => error!(error = %err, "approval action failed"),
    }
    Html(pages::notice_page(severity, &err.to_string())).into_response()
}

pub(crate) async fn action_handler<S, D, T>(
    State(service): State<Arc<ApprovalService<S, D, T>>>,
    Query(query): Query<ActionQuery>,
) -> Response
where
    S: PendingStore + 'static,
    D: RecipientDirectory + 'static,
    T: MessageTransport + 'static,
{
    match dispatch(&service, &query).await {
        Ok(response) => response,
        Err(err) => {
            if query.action.as_deref() == Some("view_api") {
                Json(json!({ "error": err.to_string() })).into_response()
            } else {
                error_page(&err)
            }
        }
    }
}

async fn dispatch<S, D, T>(
    service: &ApprovalService<S, D, T>,
    query: &ActionQuery,
) -> Result<Response, ApprovalError>
where
    S: PendingStore + 'static,
    D: RecipientDirectory + 'static,
    T: MessageTransport + 'static,
{
    let action = require(&query.action, "action")?;

    match action {
        "approve" => {
            let customer = require(&query.customer, "customer")?;
            let room_id = require(&query.room_id, "room_id")?;
            let preview = service.preview(customer, room_id)?;
            Ok(Html(pages::single_preview_page(&preview)).into_response())
        }
        "approve_all" => {
            let customer = require(&query.customer, "customer")?;
            let cards = service.preview_all(customer)?;
            Ok(Html(pages::batch_preview_page(customer, &cards)).into_response())
        }
        "confirm_approve" => {
            let customer = require(&query.customer, "customer")?;
            let room_id = require(&query.room_id, "room_id")?;
            let include_image = parse_bool(require(&query.include_image, "include_image")?);
            let selected = query
                .selected_images
                .as_deref()
                .ok_or(ApprovalError::MissingParam("selected_images"))?;

            let outcome = service
                .confirm(customer, room_id, include_image, selected)
                .await?;
            Ok(Html(pages::notice_page(
                Severity::Success,
                &format!(
                    "room {} を承認し、送信しました（画像{}枚）",
                    outcome.room_id, outcome.image_count
                ),
            ))
            .into_response())
        }
        "confirm_approve_all" => {
            let customer = require(&query.customer, "customer")?;
            let images = query
                .images
                .as_deref()
                .ok_or(ApprovalError::MissingParam("images"))?;

            let outcome = service.confirm_all(customer, images).await?;
            let severity = if outcome.failed.is_empty() {
                Severity::Success
            } else {
                Severity::Error
            };
            Ok(Html(pages::notice_page(
                severity,
                &format!(
                    "送信 {}件 / 失敗 {}件",
                    outcome.sent.len(),
                    outcome.failed.len()
                ),
            ))
            .into_response())
        }
        "skip" => {
            let customer = require(&query.customer, "customer")?;
            let room_id = require(&query.room_id, "room_id")?;
            let skipped = service.skip(customer, room_id)?;
            Ok(Html(pages::notice_page(
                Severity::Success,
                &format!("room {skipped} をスキップしました"),
            ))
            .into_response())
        }
        "view" => {
            let customer = require(&query.customer, "customer")?;
            let room_id = require(&query.room_id, "room_id")?;
            let view = service.customer_view(customer, room_id)?;
            Ok(Html(pages::customer_page(&view)).into_response())
        }
        "view_api" => {
            let customer = require(&query.customer, "customer")?;
            let room_id = require(&query.room_id, "room_id")?;
            let view = service.customer_view(customer, room_id)?;
            Ok(Json(view).into_response())
        }
        other => {
            warn!(action = other, "unknown approval action");
            Ok(Html(pages::notice_page(
                Severity::Error,
                &format!("不明なアクションです: {other}"),
            ))
            .into_response())
        }
    }
}
