// src/handlers/guias.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::respostas::{ErroResposta, GuiaCriadaResposta, MensagemResposta},
    models::guia::{CreateGuiaPayload, GuiaDetalhe, GuiaListagem},
};

// POST /guia/nova
#[utoipa::path(
    post,
    path = "/guia/nova",
    tag = "Guias",
    request_body = CreateGuiaPayload,
    responses(
        (status = 201, description = "Guia criada com número sequencial do ano", body = GuiaCriadaResposta),
        (status = 400, description = "fornecedor_id ausente ou nenhum equipamento", body = ErroResposta),
        (status = 404, description = "Fornecedor não encontrado", body = ErroResposta),
        (status = 409, description = "Não foi possível reservar um número", body = ErroResposta)
    )
)]
pub async fn criar_guia(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateGuiaPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let guia = app_state
        .guia_service
        .criar(payload, Utc::now().date_naive())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GuiaCriadaResposta {
            message: "Guia criada com sucesso".into(),
            numero: guia.numero_guia,
            id: guia.id,
        }),
    ))
}

// GET /guias
#[utoipa::path(
    get,
    path = "/guias",
    tag = "Guias",
    responses(
        (status = 200, description = "Guias da mais recente para a mais antiga", body = Vec<GuiaListagem>)
    )
)]
pub async fn listar_guias(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let guias: Vec<GuiaListagem> = app_state
        .guia_service
        .listar()
        .await?
        .into_iter()
        .map(GuiaListagem::from)
        .collect();

    Ok((StatusCode::OK, Json(guias)))
}

// GET /guia/{id}
#[utoipa::path(
    get,
    path = "/guia/{id}",
    tag = "Guias",
    params(("id" = i32, Path, description = "ID da guia")),
    responses(
        (status = 200, description = "Guia com fornecedor e equipamentos", body = GuiaDetalhe),
        (status = 404, description = "Guia não encontrada", body = ErroResposta)
    )
)]
pub async fn buscar_guia(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let guia = app_state.guia_service.buscar(id).await?;
    Ok((StatusCode::OK, Json(GuiaDetalhe::from(guia))))
}

// DELETE /guia/{id}
#[utoipa::path(
    delete,
    path = "/guia/{id}",
    tag = "Guias",
    params(("id" = i32, Path, description = "ID da guia")),
    responses(
        (status = 200, description = "Guia e equipamentos excluídos", body = MensagemResposta),
        (status = 404, description = "Guia não encontrada", body = ErroResposta)
    )
)]
pub async fn excluir_guia(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.guia_service.excluir(id).await?;
    Ok((StatusCode::OK, Json(MensagemResposta::new("Guia deletada com sucesso"))))
}
