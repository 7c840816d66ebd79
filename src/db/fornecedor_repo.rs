// src/db/fornecedor_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::fornecedor::{AlteracoesFornecedor, Fornecedor, NovoFornecedor},
};

// O repositório de fornecedores: tudo que toca a tabela 'fornecedores_gr'.
// A exclusão cascateia para guias e equipamentos.
#[async_trait]
pub trait FornecedorRepository: Send + Sync {
    /// Todos os fornecedores, por nome (ASC).
    async fn list_all(&self) -> Result<Vec<Fornecedor>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Fornecedor>, AppError>;

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Fornecedor>, AppError>;

    /// Violação da chave única de CNPJ retorna `AppError::CnpjJaCadastrado`.
    async fn create(&self, novo: &NovoFornecedor) -> Result<Fornecedor, AppError>;

    /// `None` quando o id não existe.
    async fn update(
        &self,
        id: i32,
        alteracoes: &AlteracoesFornecedor,
    ) -> Result<Option<Fornecedor>, AppError>;

    /// `false` quando o id não existe.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgFornecedorRepository {
    pool: PgPool,
}

impl PgFornecedorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FornecedorRepository for PgFornecedorRepository {
    async fn list_all(&self) -> Result<Vec<Fornecedor>, AppError> {
        let fornecedores = sqlx::query_as::<_, Fornecedor>(
            "SELECT id, nome, cnpj, contato, email, endereco, responsavel
             FROM fornecedores_gr
             ORDER BY nome ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(fornecedores)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Fornecedor>, AppError> {
        let fornecedor = sqlx::query_as::<_, Fornecedor>(
            "SELECT id, nome, cnpj, contato, email, endereco, responsavel
             FROM fornecedores_gr
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fornecedor)
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Fornecedor>, AppError> {
        let fornecedor = sqlx::query_as::<_, Fornecedor>(
            "SELECT id, nome, cnpj, contato, email, endereco, responsavel
             FROM fornecedores_gr
             WHERE cnpj = $1",
        )
        .bind(cnpj)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fornecedor)
    }

    async fn create(&self, novo: &NovoFornecedor) -> Result<Fornecedor, AppError> {
        sqlx::query_as::<_, Fornecedor>(
            r#"
            INSERT INTO fornecedores_gr (nome, cnpj, contato, email, endereco, responsavel)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, nome, cnpj, contato, email, endereco, responsavel
            "#,
        )
        .bind(&novo.nome)
        .bind(&novo.cnpj)
        .bind(&novo.contato)
        .bind(&novo.email)
        .bind(&novo.endereco)
        .bind(&novo.responsavel)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::CnpjJaCadastrado(novo.cnpj.clone());
                }
            }
            e.into()
        })
    }

    async fn update(
        &self,
        id: i32,
        alteracoes: &AlteracoesFornecedor,
    ) -> Result<Option<Fornecedor>, AppError> {
        // COALESCE mantém o valor atual quando o campo não veio no payload
        let fornecedor = sqlx::query_as::<_, Fornecedor>(
            r#"
            UPDATE fornecedores_gr
            SET nome = COALESCE($2, nome),
                contato = COALESCE($3, contato),
                email = COALESCE($4, email),
                endereco = COALESCE($5, endereco),
                responsavel = COALESCE($6, responsavel)
            WHERE id = $1
            RETURNING id, nome, cnpj, contato, email, endereco, responsavel
            "#,
        )
        .bind(id)
        .bind(alteracoes.nome.as_deref())
        .bind(alteracoes.contato.as_deref())
        .bind(alteracoes.email.as_deref())
        .bind(alteracoes.endereco.as_deref())
        .bind(alteracoes.responsavel.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(fornecedor)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        // Guias e equipamentos saem junto (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM fornecedores_gr WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
