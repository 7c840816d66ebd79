// src/handlers/fornecedores.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::respostas::{CriadoResposta, ErroResposta, MensagemResposta},
    models::fornecedor::{CreateFornecedorPayload, Fornecedor, UpdateFornecedorPayload},
};

// GET /fornecedores
#[utoipa::path(
    get,
    path = "/fornecedores",
    tag = "Fornecedores",
    responses(
        (status = 200, description = "Fornecedores em ordem alfabética", body = Vec<Fornecedor>)
    )
)]
pub async fn listar_fornecedores(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let fornecedores = app_state.fornecedor_service.listar().await?;
    Ok((StatusCode::OK, Json(fornecedores)))
}

// POST /fornecedor/novo
#[utoipa::path(
    post,
    path = "/fornecedor/novo",
    tag = "Fornecedores",
    request_body = CreateFornecedorPayload,
    responses(
        (status = 201, description = "Fornecedor cadastrado", body = CriadoResposta),
        (status = 400, description = "Dados inválidos", body = ErroResposta),
        (status = 409, description = "CNPJ já cadastrado (devolve o id existente)", body = CriadoResposta)
    )
)]
pub async fn criar_fornecedor(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateFornecedorPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let fornecedor = app_state.fornecedor_service.criar(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(CriadoResposta {
            message: "Fornecedor cadastrado com sucesso".into(),
            id: fornecedor.id,
        }),
    ))
}

// GET /fornecedor/{id}
#[utoipa::path(
    get,
    path = "/fornecedor/{id}",
    tag = "Fornecedores",
    params(("id" = i32, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor", body = Fornecedor),
        (status = 404, description = "Fornecedor não encontrado", body = ErroResposta)
    )
)]
pub async fn buscar_fornecedor(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let fornecedor = app_state.fornecedor_service.buscar(id).await?;
    Ok((StatusCode::OK, Json(fornecedor)))
}

// PUT /fornecedor/{id}
#[utoipa::path(
    put,
    path = "/fornecedor/{id}",
    tag = "Fornecedores",
    params(("id" = i32, Path, description = "ID do fornecedor")),
    request_body = UpdateFornecedorPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = MensagemResposta),
        (status = 400, description = "Dados inválidos", body = ErroResposta),
        (status = 404, description = "Fornecedor não encontrado", body = ErroResposta)
    )
)]
pub async fn atualizar_fornecedor(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateFornecedorPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.fornecedor_service.atualizar(id, payload).await?;
    Ok((StatusCode::OK, Json(MensagemResposta::new("Fornecedor atualizado com sucesso"))))
}

// DELETE /fornecedor/{id}
#[utoipa::path(
    delete,
    path = "/fornecedor/{id}",
    tag = "Fornecedores",
    params(("id" = i32, Path, description = "ID do fornecedor")),
    responses(
        (status = 200, description = "Fornecedor, guias e equipamentos excluídos", body = MensagemResposta),
        (status = 404, description = "Fornecedor não encontrado", body = ErroResposta)
    )
)]
pub async fn excluir_fornecedor(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.fornecedor_service.excluir(id).await?;
    Ok((StatusCode::OK, Json(MensagemResposta::new("Fornecedor deletado com sucesso"))))
}
