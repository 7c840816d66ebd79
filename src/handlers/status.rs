// src/handlers/status.rs

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResposta {
    #[schema(example = "API da Guia de Remessa ativa")]
    pub status: String,
}

// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "Status",
    responses(
        (status = 200, description = "API no ar", body = StatusResposta)
    )
)]
pub async fn status() -> Json<StatusResposta> {
    Json(StatusResposta {
        status: "API da Guia de Remessa ativa".into(),
    })
}
