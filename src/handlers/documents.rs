// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;

use crate::{common::error::AppError, config::AppState, handlers::respostas::ErroResposta};

// GET /guia/{id}/pdf
#[utoipa::path(
    get,
    path = "/guia/{id}/pdf",
    tag = "Documentos",
    params(("id" = i32, Path, description = "ID da guia")),
    responses(
        (status = 200, description = "Guia impressa", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Guia não encontrada", body = ErroResposta)
    )
)]
pub async fn gerar_guia_pdf(
    State(app_state): State<AppState>,
    WithRejection(Path(guia_id), _): WithRejection<Path<i32>, AppError>,
) -> Result<Response, AppError> {
    let (numero, pdf_bytes) = app_state.document_service.gerar_guia_pdf(guia_id).await?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}.pdf\"", numero)),
    ];

    Ok((headers, pdf_bytes).into_response())
}
