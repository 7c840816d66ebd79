// src/db/memory.rs

use std::{collections::{BTreeMap, HashMap}, sync::Arc};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::{FornecedorRepository, GuiaRepository},
    models::{
        fornecedor::{AlteracoesFornecedor, Fornecedor, NovoFornecedor},
        guia::{Equipamento, Guia, GuiaComRelacoes, NovaGuia},
    },
    services::numeracao,
};

#[derive(Debug, Default)]
struct Estado {
    fornecedores: BTreeMap<i32, Fornecedor>,
    guias: BTreeMap<i32, Guia>,
    equipamentos: BTreeMap<i32, Equipamento>,
    // ano -> último sequencial reservado
    sequencias: HashMap<i32, i32>,
    proximo_fornecedor: i32,
    proximo_guia: i32,
    proximo_equipamento: i32,
}

impl Estado {
    fn gerar_id(contador: &mut i32) -> i32 {
        *contador += 1;
        *contador
    }

    fn relacoes(&self, guia: &Guia) -> Option<GuiaComRelacoes> {
        let fornecedor = self.fornecedores.get(&guia.fornecedor_id)?.clone();
        let equipamentos = self
            .equipamentos
            .values()
            .filter(|e| e.guia_id == guia.id)
            .cloned()
            .collect();
        Some(GuiaComRelacoes { guia: guia.clone(), fornecedor, equipamentos })
    }

    fn remover_guia(&mut self, id: i32) -> bool {
        if self.guias.remove(&id).is_none() {
            return false;
        }
        self.equipamentos.retain(|_, e| e.guia_id != id);
        true
    }

    // Mesma derivação da versão Postgres: histórico do ano como semente,
    // contador por ano como reserva.
    fn reservar_sequencial(&mut self, ano: i32) -> i32 {
        let prefixo = numeracao::prefixo_do_ano(ano);
        let do_ano: Vec<&Guia> = self
            .guias
            .values()
            .filter(|g| g.numero_guia.starts_with(&prefixo))
            .collect();

        let ultimo = do_ano.last().map(|g| g.numero_guia.as_str());
        let semente = numeracao::sequencial_seguinte(ultimo)
            .unwrap_or_else(|| numeracao::sequencial_por_contagem(do_ano.len() as i64));

        let sequencial = match self.sequencias.get(&ano) {
            Some(atual) => (atual + 1).max(semente),
            None => semente,
        };
        self.sequencias.insert(ano, sequencial);
        sequencial
    }
}

/// Armazenamento em memória de um único processo.
///
/// Um único `Mutex` protege todas as tabelas, então cada operação é atômica.
/// Serve para desenvolvimento local (`STORE_BACKEND=memory`) e para os testes;
/// não deve ser usado com várias instâncias do serviço.
#[derive(Clone, Default)]
pub struct MemoryStore {
    estado: Arc<Mutex<Estado>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grava uma guia com número arbitrário, sem passar pela numeração.
    /// Simula dados antigos (inclusive malformados) nos testes.
    #[cfg(test)]
    pub async fn inserir_guia_legada(&self, fornecedor_id: i32, numero_guia: &str, data_emissao: NaiveDate) -> Guia {
        let mut estado = self.estado.lock().await;
        let id = Estado::gerar_id(&mut estado.proximo_guia);
        let guia = Guia {
            id,
            numero_guia: numero_guia.to_string(),
            data_emissao,
            defeito: String::new(),
            motivo: String::new(),
            fornecedor_id,
        };
        estado.guias.insert(id, guia.clone());
        guia
    }

    #[cfg(test)]
    pub async fn total_equipamentos(&self) -> usize {
        self.estado.lock().await.equipamentos.len()
    }
}

#[async_trait]
impl FornecedorRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Fornecedor>, AppError> {
        let estado = self.estado.lock().await;
        let mut fornecedores: Vec<Fornecedor> = estado.fornecedores.values().cloned().collect();
        fornecedores.sort_by(|a, b| a.nome.cmp(&b.nome).then(a.id.cmp(&b.id)));
        Ok(fornecedores)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Fornecedor>, AppError> {
        Ok(self.estado.lock().await.fornecedores.get(&id).cloned())
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Fornecedor>, AppError> {
        let estado = self.estado.lock().await;
        Ok(estado.fornecedores.values().find(|f| f.cnpj == cnpj).cloned())
    }

    async fn create(&self, novo: &NovoFornecedor) -> Result<Fornecedor, AppError> {
        let mut estado = self.estado.lock().await;
        if estado.fornecedores.values().any(|f| f.cnpj == novo.cnpj) {
            return Err(AppError::CnpjJaCadastrado(novo.cnpj.clone()));
        }

        let id = Estado::gerar_id(&mut estado.proximo_fornecedor);
        let fornecedor = Fornecedor {
            id,
            nome: novo.nome.clone(),
            cnpj: novo.cnpj.clone(),
            contato: novo.contato.clone(),
            email: novo.email.clone(),
            endereco: novo.endereco.clone(),
            responsavel: novo.responsavel.clone(),
        };
        estado.fornecedores.insert(id, fornecedor.clone());
        Ok(fornecedor)
    }

    async fn update(
        &self,
        id: i32,
        alteracoes: &AlteracoesFornecedor,
    ) -> Result<Option<Fornecedor>, AppError> {
        let mut estado = self.estado.lock().await;
        Ok(estado.fornecedores.get_mut(&id).map(|fornecedor| {
            alteracoes.aplicar(fornecedor);
            fornecedor.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut estado = self.estado.lock().await;
        if estado.fornecedores.remove(&id).is_none() {
            return Ok(false);
        }

        // Cascata explícita: guias do fornecedor e seus equipamentos
        let guias: Vec<i32> = estado
            .guias
            .values()
            .filter(|g| g.fornecedor_id == id)
            .map(|g| g.id)
            .collect();
        for guia_id in guias {
            estado.remover_guia(guia_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl GuiaRepository for MemoryStore {
    async fn list_all(&self) -> Result<Vec<GuiaComRelacoes>, AppError> {
        let estado = self.estado.lock().await;
        Ok(estado
            .guias
            .values()
            .rev()
            .filter_map(|g| estado.relacoes(g))
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<GuiaComRelacoes>, AppError> {
        let estado = self.estado.lock().await;
        Ok(estado.guias.get(&id).and_then(|g| estado.relacoes(g)))
    }

    async fn create_with_equipamentos(
        &self,
        nova: &NovaGuia,
        data_emissao: NaiveDate,
    ) -> Result<Guia, AppError> {
        let mut estado = self.estado.lock().await;

        // Nada é gravado antes destas verificações (equivale ao rollback)
        if !estado.fornecedores.contains_key(&nova.fornecedor_id) {
            return Err(AppError::FornecedorNaoEncontrado);
        }

        let ano = data_emissao.year();
        let sequencial = estado.reservar_sequencial(ano);
        let numero_guia = numeracao::formatar_numero(ano, sequencial);
        if estado.guias.values().any(|g| g.numero_guia == numero_guia) {
            return Err(AppError::NumeroGuiaDuplicado(numero_guia));
        }

        let id = Estado::gerar_id(&mut estado.proximo_guia);
        let guia = Guia {
            id,
            numero_guia,
            data_emissao,
            defeito: nova.defeito.clone(),
            motivo: nova.motivo.clone(),
            fornecedor_id: nova.fornecedor_id,
        };
        estado.guias.insert(id, guia.clone());

        for novo in &nova.equipamentos {
            let equipamento_id = Estado::gerar_id(&mut estado.proximo_equipamento);
            estado.equipamentos.insert(
                equipamento_id,
                Equipamento {
                    id: equipamento_id,
                    guia_id: id,
                    quantidade: novo.quantidade,
                    descricao: novo.descricao.clone(),
                    numero_serie: novo.numero_serie.clone(),
                    patrimonio: novo.patrimonio.clone(),
                    valor: novo.valor.clone(),
                },
            );
        }

        Ok(guia)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.estado.lock().await.remover_guia(id))
    }
}
