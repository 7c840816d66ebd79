// src/handlers/respostas.rs

use serde::Serialize;
use utoipa::ToSchema;

// Corpos de resposta compartilhados pelos handlers

#[derive(Debug, Serialize, ToSchema)]
pub struct MensagemResposta {
    #[schema(example = "Fornecedor atualizado com sucesso")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CriadoResposta {
    #[schema(example = "Fornecedor cadastrado com sucesso")]
    pub message: String,
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuiaCriadaResposta {
    #[schema(example = "Guia criada com sucesso")]
    pub message: String,
    #[schema(example = "GR-2025-0001")]
    pub numero: String,
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErroResposta {
    #[schema(example = "Fornecedor não encontrado")]
    pub error: String,
}

impl MensagemResposta {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string() }
    }
}
