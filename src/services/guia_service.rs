// src/services/guia_service.rs

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::{FornecedorRepository, GuiaRepository},
    models::guia::{CreateGuiaPayload, Guia, GuiaComRelacoes, NovaGuia, NovoEquipamento},
};

/// Tentativas de criação quando o número reservado colide com outro pedido.
const MAX_TENTATIVAS_NUMERACAO: usize = 5;

#[derive(Clone)]
pub struct GuiaService {
    guias: Arc<dyn GuiaRepository>,
    fornecedores: Arc<dyn FornecedorRepository>,
}

impl GuiaService {
    pub fn new(guias: Arc<dyn GuiaRepository>, fornecedores: Arc<dyn FornecedorRepository>) -> Self {
        Self { guias, fornecedores }
    }

    pub async fn listar(&self) -> Result<Vec<GuiaComRelacoes>, AppError> {
        self.guias.list_all().await
    }

    pub async fn buscar(&self, id: i32) -> Result<GuiaComRelacoes, AppError> {
        self.guias
            .find_by_id(id)
            .await?
            .ok_or(AppError::GuiaNaoEncontrada)
    }

    /// LÓGICA DE NEGÓCIO: valida o pedido antes de qualquer escrita e grava
    /// a guia com os equipamentos numa única transação, com número sequencial
    /// do ano de `data_emissao`.
    pub async fn criar(
        &self,
        payload: CreateGuiaPayload,
        data_emissao: NaiveDate,
    ) -> Result<Guia, AppError> {
        // 1. Validações de formulário
        let fornecedor_id = match payload.fornecedor_id {
            Some(id) if id != 0 => id,
            _ => return Err(AppError::RequisicaoInvalida("fornecedor_id é obrigatório".into())),
        };
        let equipamentos = payload.equipamentos.unwrap_or_default();
        if equipamentos.is_empty() {
            return Err(AppError::RequisicaoInvalida(
                "Pelo menos um equipamento é obrigatório".into(),
            ));
        }

        // 2. O fornecedor precisa existir
        if self.fornecedores.find_by_id(fornecedor_id).await?.is_none() {
            return Err(AppError::FornecedorNaoEncontrado);
        }

        let nova = NovaGuia {
            fornecedor_id,
            defeito: payload.defeito.trim().to_string(),
            motivo: payload.motivo.trim().to_string(),
            equipamentos: equipamentos.into_iter().map(NovoEquipamento::from).collect(),
        };

        // 3. Grava; colisão de número refaz a transação inteira
        let mut tentativa = 1;
        loop {
            match self.guias.create_with_equipamentos(&nova, data_emissao).await {
                Ok(guia) => {
                    tracing::info!(
                        id = guia.id,
                        numero = %guia.numero_guia,
                        fornecedor_id,
                        equipamentos = nova.equipamentos.len(),
                        "Guia criada"
                    );
                    return Ok(guia);
                }
                Err(AppError::NumeroGuiaDuplicado(numero)) if tentativa < MAX_TENTATIVAS_NUMERACAO => {
                    tracing::warn!(numero = %numero, tentativa, "Número de guia em uso, tentando novamente");
                    tentativa += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Exclui a guia e os seus equipamentos; o fornecedor permanece.
    pub async fn excluir(&self, id: i32) -> Result<(), AppError> {
        if !self.guias.delete(id).await? {
            return Err(AppError::GuiaNaoEncontrada);
        }
        tracing::info!(id, "Guia excluída");
        Ok(())
    }
}
