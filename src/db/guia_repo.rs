// src/db/guia_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Executor, FromRow, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        fornecedor::Fornecedor,
        guia::{Equipamento, Guia, GuiaComRelacoes, NovaGuia},
    },
    services::numeracao,
};

// O repositório de guias: 'guias_gr', 'equipamentos_gr' e o contador 'guia_sequencias'.
#[async_trait]
pub trait GuiaRepository: Send + Sync {
    /// Todas as guias (id DESC) com fornecedor e equipamentos.
    async fn list_all(&self) -> Result<Vec<GuiaComRelacoes>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<GuiaComRelacoes>, AppError>;

    /// Reserva o próximo número do ano de `data_emissao` e grava a guia com
    /// todos os equipamentos como uma unidade atômica.
    ///
    /// Número já usado: `AppError::NumeroGuiaDuplicado` (nada é gravado).
    async fn create_with_equipamentos(
        &self,
        nova: &NovaGuia,
        data_emissao: NaiveDate,
    ) -> Result<Guia, AppError>;

    /// `false` quando o id não existe. Os equipamentos saem junto.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgGuiaRepository {
    pool: PgPool,
}

// Linha do JOIN guia + fornecedor
#[derive(Debug, FromRow)]
struct GuiaLinha {
    id: i32,
    numero_guia: String,
    data_emissao: NaiveDate,
    defeito: String,
    motivo: String,
    fornecedor_id: i32,
    f_nome: String,
    f_cnpj: String,
    f_contato: String,
    f_email: String,
    f_endereco: String,
    f_responsavel: String,
}

impl GuiaLinha {
    fn com_equipamentos(self, equipamentos: Vec<Equipamento>) -> GuiaComRelacoes {
        GuiaComRelacoes {
            fornecedor: Fornecedor {
                id: self.fornecedor_id,
                nome: self.f_nome,
                cnpj: self.f_cnpj,
                contato: self.f_contato,
                email: self.f_email,
                endereco: self.f_endereco,
                responsavel: self.f_responsavel,
            },
            guia: Guia {
                id: self.id,
                numero_guia: self.numero_guia,
                data_emissao: self.data_emissao,
                defeito: self.defeito,
                motivo: self.motivo,
                fornecedor_id: self.fornecedor_id,
            },
            equipamentos,
        }
    }
}

const SELECT_GUIA_COM_FORNECEDOR: &str = r#"
    SELECT
        g.id, g.numero_guia, g.data_emissao, g.defeito, g.motivo, g.fornecedor_id,
        f.nome AS f_nome, f.cnpj AS f_cnpj, f.contato AS f_contato,
        f.email AS f_email, f.endereco AS f_endereco, f.responsavel AS f_responsavel
    FROM guias_gr g
    INNER JOIN fornecedores_gr f ON f.id = g.fornecedor_id
"#;

impl PgGuiaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    async fn equipamentos_por_guia<'e, E>(
        &self,
        executor: E,
        guia_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<Equipamento>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let equipamentos = sqlx::query_as::<_, Equipamento>(
            r#"
            SELECT id, guia_id, quantidade, descricao, numero_serie, patrimonio, valor
            FROM equipamentos_gr
            WHERE guia_id = ANY($1)
            ORDER BY id ASC
            "#,
        )
        .bind(guia_ids)
        .fetch_all(executor)
        .await?;

        let mut por_guia: HashMap<i32, Vec<Equipamento>> = HashMap::new();
        for equipamento in equipamentos {
            por_guia.entry(equipamento.guia_id).or_default().push(equipamento);
        }
        Ok(por_guia)
    }

    // ---
    // Numeração (sempre dentro da transação de criação)
    // ---

    async fn ultimo_numero_do_ano<'e, E>(&self, executor: E, ano: i32) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let numero = sqlx::query_scalar::<_, String>(
            "SELECT numero_guia FROM guias_gr WHERE numero_guia LIKE $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(numeracao::padrao_like(ano))
        .fetch_optional(executor)
        .await?;

        Ok(numero)
    }

    async fn contar_guias_do_ano<'e, E>(&self, executor: E, ano: i32) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM guias_gr WHERE numero_guia LIKE $1",
        )
        .bind(numeracao::padrao_like(ano))
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    /// Incrementa o contador do ano. A linha fica travada até o commit,
    /// então duas criações simultâneas nunca recebem o mesmo sequencial.
    async fn incrementar_contador<'e, E>(&self, executor: E, ano: i32, semente: i32) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // GREATEST mantém o contador à frente de guias gravadas sem passar por ele
        let sequencial = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO guia_sequencias (ano, ultimo)
            VALUES ($1, $2)
            ON CONFLICT (ano)
            DO UPDATE SET ultimo = GREATEST(guia_sequencias.ultimo + 1, EXCLUDED.ultimo)
            RETURNING ultimo
            "#,
        )
        .bind(ano)
        .bind(semente)
        .fetch_one(executor)
        .await?;

        Ok(sequencial)
    }
}

#[async_trait]
impl GuiaRepository for PgGuiaRepository {
    async fn list_all(&self) -> Result<Vec<GuiaComRelacoes>, AppError> {
        let linhas = sqlx::query_as::<_, GuiaLinha>(&format!(
            "{} ORDER BY g.id DESC",
            SELECT_GUIA_COM_FORNECEDOR
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = linhas.iter().map(|l| l.id).collect();
        let mut equipamentos = self.equipamentos_por_guia(&self.pool, &ids).await?;

        Ok(linhas
            .into_iter()
            .map(|linha| {
                let itens = equipamentos.remove(&linha.id).unwrap_or_default();
                linha.com_equipamentos(itens)
            })
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<GuiaComRelacoes>, AppError> {
        let linha = sqlx::query_as::<_, GuiaLinha>(&format!(
            "{} WHERE g.id = $1",
            SELECT_GUIA_COM_FORNECEDOR
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(linha) = linha else {
            return Ok(None);
        };

        let mut equipamentos = self.equipamentos_por_guia(&self.pool, &[id]).await?;
        let itens = equipamentos.remove(&id).unwrap_or_default();
        Ok(Some(linha.com_equipamentos(itens)))
    }

    async fn create_with_equipamentos(
        &self,
        nova: &NovaGuia,
        data_emissao: NaiveDate,
    ) -> Result<Guia, AppError> {
        use chrono::Datelike;

        let ano = data_emissao.year();

        // 1. Inicia a transação (qualquer `?` abaixo faz rollback no drop)
        let mut tx = self.pool.begin().await?;

        // 2. Ponto de partida pelo histórico do ano
        let ultimo = self.ultimo_numero_do_ano(&mut *tx, ano).await?;
        let semente = match numeracao::sequencial_seguinte(ultimo.as_deref()) {
            Some(sequencial) => sequencial,
            None => {
                let total = self.contar_guias_do_ano(&mut *tx, ano).await?;
                numeracao::sequencial_por_contagem(total)
            }
        };

        // 3. Reserva atômica
        let sequencial = self.incrementar_contador(&mut *tx, ano, semente).await?;
        let numero_guia = numeracao::formatar_numero(ano, sequencial);

        // 4. Cria a guia
        let guia = sqlx::query_as::<_, Guia>(
            r#"
            INSERT INTO guias_gr (numero_guia, data_emissao, defeito, motivo, fornecedor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, numero_guia, data_emissao, defeito, motivo, fornecedor_id
            "#,
        )
        .bind(&numero_guia)
        .bind(data_emissao)
        .bind(&nova.defeito)
        .bind(&nova.motivo)
        .bind(nova.fornecedor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NumeroGuiaDuplicado(numero_guia.clone());
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::FornecedorNaoEncontrado;
                }
            }
            e.into()
        })?;

        // 5. Cria os equipamentos
        for equipamento in &nova.equipamentos {
            sqlx::query(
                r#"
                INSERT INTO equipamentos_gr (guia_id, quantidade, descricao, numero_serie, patrimonio, valor)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(guia.id)
            .bind(equipamento.quantidade)
            .bind(&equipamento.descricao)
            .bind(&equipamento.numero_serie)
            .bind(&equipamento.patrimonio)
            .bind(&equipamento.valor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(guia)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM guias_gr WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
