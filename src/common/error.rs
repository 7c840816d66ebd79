use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Corpo malformado ou campo obrigatório ausente
    #[error("{0}")]
    RequisicaoInvalida(String),

    #[error("Fornecedor não encontrado")]
    FornecedorNaoEncontrado,

    #[error("Guia não encontrada")]
    GuiaNaoEncontrada,

    #[error("Recurso não encontrado")]
    RecursoNaoEncontrado,

    // O CNPJ já está cadastrado; carrega o id do registro existente
    #[error("Fornecedor já existe")]
    FornecedorJaExiste { id: i32 },

    // Violação da chave única de CNPJ detectada no INSERT (o serviço resolve o id)
    #[error("CNPJ já cadastrado: {0}")]
    CnpjJaCadastrado(String),

    #[error("Número de guia já utilizado: {0}")]
    NumeroGuiaDuplicado(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::RequisicaoInvalida(format!("JSON inválido: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::RecursoNaoEncontrado
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::RequisicaoInvalida(_) => StatusCode::BAD_REQUEST,
            AppError::FornecedorNaoEncontrado
            | AppError::GuiaNaoEncontrada
            | AppError::RecursoNaoEncontrado => StatusCode::NOT_FOUND,
            AppError::FornecedorJaExiste { .. }
            | AppError::CnpjJaCadastrado(_)
            | AppError::NumeroGuiaDuplicado(_) => StatusCode::CONFLICT,
            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            // Retorna a mensagem agregada e os detalhes por campo
            AppError::ValidationError(errors) => {
                let mut details = std::collections::BTreeMap::new();
                let mut messages: Vec<String> = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    let field_messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), field_messages);
                }
                for field_messages in details.values() {
                    for message in field_messages {
                        if !messages.contains(message) {
                            messages.push(message.clone());
                        }
                    }
                }
                json!({
                    "error": messages.join("; "),
                    "details": details,
                })
            }
            AppError::FornecedorJaExiste { id } => json!({
                "message": "Fornecedor já existe",
                "id": id,
            }),
            AppError::NumeroGuiaDuplicado(ref numero) => {
                tracing::warn!(numero = %numero, "Numeração de guia esgotou as tentativas");
                json!({ "error": "Não foi possível reservar um número para a guia. Tente novamente." })
            }
            // Todos os outros erros 500 são logados com o detalhe e devolvem mensagem genérica.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "error": "Erro interno do servidor" })
            }
            ref e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
