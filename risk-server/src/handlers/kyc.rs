//! KYC handlers (AML screening only)

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use risk_core::pipelines::{AmlContext, AmlStatus};

use super::risk::round4;
use crate::extract::ValidatedJson;
use crate::{AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct AmlCheckRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default)]
    pub document_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AmlCheckResponse {
    pub user_id: String,
    pub status: AmlStatus,
    pub risk_score: f64,
    pub sanctions: bool,
    pub pep: bool,
    pub adverse_media: bool,
    pub data_sources: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

pub async fn aml_check(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AmlCheckRequest>,
) -> AppResult<Json<AmlCheckResponse>> {
    let context = AmlContext {
        user_id: req.user_id,
        document_number: req.document_number,
    };
    let result = state.engine.aml().screen(&context).await?;

    Ok(Json(AmlCheckResponse {
        user_id: result.user_id,
        status: result.status,
        risk_score: round4(result.risk_score),
        sanctions: result.sanctions,
        pep: result.pep,
        adverse_media: result.adverse_media,
        data_sources: result.data_sources,
        checked_at: result.checked_at,
    }))
}
