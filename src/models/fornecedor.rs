// src/models/fornecedor.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::json::{texto_livre, texto_opcional};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("regex de e-mail válida")
});

// ---
// 1. Fornecedor (tabela 'fornecedores_gr')
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fornecedor {
    pub id: i32,
    #[schema(example = "Acme Manutenção Ltda")]
    pub nome: String,
    /// Somente dígitos (14)
    #[schema(example = "12345678000199")]
    pub cnpj: String,
    pub contato: String,
    pub email: String,
    pub endereco: String,
    pub responsavel: String,
}

// Resumo aninhado em GET /guia/{id}
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FornecedorResumo {
    pub id: i32,
    pub nome: String,
    pub cnpj: String,
}

impl From<Fornecedor> for FornecedorResumo {
    fn from(f: Fornecedor) -> Self {
        Self { id: f.id, nome: f.nome, cnpj: f.cnpj }
    }
}

// ---
// Validação
// ---

/// Remove tudo que não for dígito ("12.345.678/0001-99" -> "12345678000199").
pub fn somente_digitos(valor: &str) -> String {
    valor.chars().filter(|c| c.is_ascii_digit()).collect()
}

// Validação básica: 14 dígitos, sem dígito verificador.
// Vazio é tratado pela regra de obrigatoriedade.
pub fn validar_cnpj(cnpj: &str) -> Result<(), ValidationError> {
    if cnpj.is_empty() || somente_digitos(cnpj).len() == 14 {
        return Ok(());
    }
    let mut err = ValidationError::new("cnpj");
    err.message = Some("CNPJ inválido".into());
    Err(err)
}

pub fn validar_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || EMAIL_REGEX.is_match(email) {
        return Ok(());
    }
    let mut err = ValidationError::new("email");
    err.message = Some("E-mail inválido".into());
    Err(err)
}

// ---
// Payloads (o "formulário" da API)
// ---

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateFornecedorPayload {
    #[serde(default, deserialize_with = "texto_livre")]
    #[schema(example = "Acme")]
    pub nome: String,
    #[serde(default, deserialize_with = "texto_livre")]
    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: String,
    #[serde(default, deserialize_with = "texto_livre")]
    pub contato: String,
    #[serde(default, deserialize_with = "texto_livre")]
    #[schema(example = "contato@acme.com.br")]
    pub email: String,
    #[serde(default, deserialize_with = "texto_livre")]
    pub endereco: String,
    #[serde(default, deserialize_with = "texto_livre")]
    pub responsavel: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateFornecedorPayload {
    #[serde(default, deserialize_with = "texto_opcional")]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub contato: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub endereco: Option<String>,
    #[serde(default, deserialize_with = "texto_opcional")]
    pub responsavel: Option<String>,
}

// ---
// Comandos normalizados (entrada dos repositórios)
// ---

#[derive(Debug, Clone, Validate)]
pub struct NovoFornecedor {
    #[validate(length(min = 1, message = "Nome e CNPJ são obrigatórios"))]
    pub nome: String,

    #[validate(
        length(min = 1, message = "Nome e CNPJ são obrigatórios"),
        custom(function = "validar_cnpj")
    )]
    pub cnpj: String,

    pub contato: String,

    #[validate(custom(function = "validar_email"))]
    pub email: String,

    pub endereco: String,
    pub responsavel: String,
}

impl From<CreateFornecedorPayload> for NovoFornecedor {
    fn from(p: CreateFornecedorPayload) -> Self {
        Self {
            nome: p.nome.trim().to_string(),
            cnpj: p.cnpj.trim().to_string(),
            contato: p.contato.trim().to_string(),
            email: p.email.trim().to_string(),
            endereco: p.endereco.trim().to_string(),
            responsavel: p.responsavel.trim().to_string(),
        }
    }
}

/// Substituição parcial: `None` mantém o valor atual.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlteracoesFornecedor {
    pub nome: Option<String>,
    pub contato: Option<String>,
    pub email: Option<String>,
    pub endereco: Option<String>,
    pub responsavel: Option<String>,
}

impl From<UpdateFornecedorPayload> for AlteracoesFornecedor {
    fn from(p: UpdateFornecedorPayload) -> Self {
        let limpar = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            nome: limpar(p.nome),
            contato: limpar(p.contato),
            email: limpar(p.email),
            endereco: limpar(p.endereco),
            responsavel: limpar(p.responsavel),
        }
    }
}

impl AlteracoesFornecedor {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if matches!(self.nome.as_deref(), Some("")) {
            let mut err = ValidationError::new("length");
            err.message = Some("O nome não pode ficar vazio".into());
            errors.add("nome", err);
        }
        if let Some(email) = self.email.as_deref() {
            if let Err(err) = validar_email(email) {
                errors.add("email", err);
            }
        }

        if errors.errors().is_empty() { Ok(()) } else { Err(errors) }
    }

    pub fn aplicar(&self, fornecedor: &mut Fornecedor) {
        if let Some(v) = &self.nome { fornecedor.nome = v.clone(); }
        if let Some(v) = &self.contato { fornecedor.contato = v.clone(); }
        if let Some(v) = &self.email { fornecedor.email = v.clone(); }
        if let Some(v) = &self.endereco { fornecedor.endereco = v.clone(); }
        if let Some(v) = &self.responsavel { fornecedor.responsavel = v.clone(); }
    }
}
