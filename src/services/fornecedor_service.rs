// src/services/fornecedor_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::FornecedorRepository,
    models::fornecedor::{
        somente_digitos, AlteracoesFornecedor, CreateFornecedorPayload, Fornecedor,
        NovoFornecedor, UpdateFornecedorPayload,
    },
};

#[derive(Clone)]
pub struct FornecedorService {
    repo: Arc<dyn FornecedorRepository>,
}

impl FornecedorService {
    pub fn new(repo: Arc<dyn FornecedorRepository>) -> Self {
        Self { repo }
    }

    pub async fn listar(&self) -> Result<Vec<Fornecedor>, AppError> {
        self.repo.list_all().await
    }

    pub async fn buscar(&self, id: i32) -> Result<Fornecedor, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::FornecedorNaoEncontrado)
    }

    /// LÓGICA DE NEGÓCIO: valida, normaliza o CNPJ para somente dígitos e
    /// devolve `FornecedorJaExiste` com o id existente em caso de duplicidade.
    pub async fn criar(&self, payload: CreateFornecedorPayload) -> Result<Fornecedor, AppError> {
        let mut novo = NovoFornecedor::from(payload);
        novo.validate()?;
        novo.cnpj = somente_digitos(&novo.cnpj);

        if let Some(existente) = self.repo.find_by_cnpj(&novo.cnpj).await? {
            return Err(AppError::FornecedorJaExiste { id: existente.id });
        }

        match self.repo.create(&novo).await {
            Ok(fornecedor) => {
                tracing::info!(id = fornecedor.id, cnpj = %fornecedor.cnpj, "Fornecedor cadastrado");
                Ok(fornecedor)
            }
            // Outro pedido gravou o mesmo CNPJ entre a consulta e o INSERT
            Err(AppError::CnpjJaCadastrado(cnpj)) => match self.repo.find_by_cnpj(&cnpj).await? {
                Some(existente) => Err(AppError::FornecedorJaExiste { id: existente.id }),
                // O registro concorrente já foi excluído: não há id para devolver
                None => Err(AppError::InternalServerError(anyhow::anyhow!(
                    "CNPJ {} violou a chave única mas não foi encontrado",
                    cnpj
                ))),
            },
            Err(e) => Err(e),
        }
    }

    pub async fn atualizar(
        &self,
        id: i32,
        payload: UpdateFornecedorPayload,
    ) -> Result<Fornecedor, AppError> {
        let alteracoes = AlteracoesFornecedor::from(payload);
        alteracoes.validate()?;

        let fornecedor = self
            .repo
            .update(id, &alteracoes)
            .await?
            .ok_or(AppError::FornecedorNaoEncontrado)?;

        tracing::info!(id, "Fornecedor atualizado");
        Ok(fornecedor)
    }

    /// Exclui o fornecedor e, em cascata, as suas guias e equipamentos.
    pub async fn excluir(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::FornecedorNaoEncontrado);
        }
        tracing::info!(id, "Fornecedor excluído");
        Ok(())
    }
}
