use std::sync::Arc;

use axum::{extract::State, Json};
use shrinkray_core::constants::SUBSCRIBE_RESPONSE_MESSAGE;
use shrinkray_core::models::{GatewayMessage, SubscribeRequest};
use validator::Validate;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Subscribe an email address to the completion topic.
///
/// Only `email` is read from the body; protocol and topic are fixed.
#[tracing::instrument(skip(state, request), fields(operation = "subscribe"))]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SubscribeRequest>,
) -> Result<Json<GatewayMessage>, HttpAppError> {
    request.validate()?;

    let receipt = state.notifier.subscribe_email(&request.email).await?;

    tracing::info!(
        protocol = %receipt.protocol,
        topic_arn = %receipt.topic_arn,
        subscription_arn = %receipt.subscription_arn,
        "Subscription requested"
    );

    Ok(Json(GatewayMessage::new(SUBSCRIBE_RESPONSE_MESSAGE)))
}
