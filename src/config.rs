// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{FornecedorRepository, GuiaRepository, MemoryStore, PgFornecedorRepository, PgGuiaRepository},
    services::{
        document_service::DocumentService, fornecedor_service::FornecedorService,
        guia_service::GuiaService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    // Tudo em memória, perdido ao reiniciar
    Memory,
}

/// Dados usados na impressão da guia.
#[derive(Debug, Clone)]
pub struct ImpressaoConfig {
    pub fonts_dir: String,
    pub font_family: String,
    pub emitente_nome: Option<String>,
    pub emitente_cnpj: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub impressao: ImpressaoConfig,
}

impl Settings {
    /// Lê as variáveis de ambiente (o `.env` já deve ter sido carregado).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|chave| env::var(chave).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let valor = |chave: &str| lookup(chave).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match valor("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(outro) => return Err(anyhow!("STORE_BACKEND inválido: '{}' (use postgres ou memory)", outro)),
        };

        let database_url = valor("DATABASE_URL");
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL deve ser definida"));
        }

        let db_max_connections = match valor("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>().with_context(|| format!("DB_MAX_CONNECTIONS inválido: '{}'", v))?,
            None => 5,
        };
        let timeout_secs = match valor("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().with_context(|| format!("DB_ACQUIRE_TIMEOUT_SECS inválido: '{}'", v))?,
            None => 3,
        };

        Ok(Self {
            bind_addr: valor("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5000".into()),
            backend,
            database_url,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(timeout_secs),
            impressao: ImpressaoConfig {
                fonts_dir: valor("FONTS_DIR").unwrap_or_else(|| "./fonts".into()),
                font_family: valor("FONT_FAMILY").unwrap_or_else(|| "Roboto".into()),
                emitente_nome: valor("EMITENTE_NOME"),
                emitente_cnpj: valor("EMITENTE_CNPJ"),
            },
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub fornecedor_service: FornecedorService,
    pub guia_service: GuiaService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        match settings.backend {
            StoreBackend::Memory => {
                tracing::warn!("⚠️ STORE_BACKEND=memory: os dados não sobrevivem a um reinício");
                let store = Arc::new(MemoryStore::new());
                Ok(Self::with_repositories(store.clone(), store, settings.impressao.clone()))
            }
            StoreBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("DATABASE_URL deve ser definida"))?;

                // Conecta ao banco de dados, usando '?' para propagar erros
                let db_pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(settings.db_acquire_timeout)
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&db_pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;

                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Ok(Self::with_repositories(
                    Arc::new(PgFornecedorRepository::new(db_pool.clone())),
                    Arc::new(PgGuiaRepository::new(db_pool)),
                    settings.impressao.clone(),
                ))
            }
        }
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_repositories(
        fornecedores: Arc<dyn FornecedorRepository>,
        guias: Arc<dyn GuiaRepository>,
        impressao: ImpressaoConfig,
    ) -> Self {
        Self {
            fornecedor_service: FornecedorService::new(fornecedores.clone()),
            guia_service: GuiaService::new(guias.clone(), fornecedores),
            document_service: DocumentService::new(guias, impressao),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let mapa: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|chave| mapa.get(chave).cloned())
    }

    #[test]
    fn padroes_com_backend_em_memoria() {
        let s = settings(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(s.backend, StoreBackend::Memory);
        assert_eq!(s.bind_addr, "0.0.0.0:5000");
        assert_eq!(s.db_max_connections, 5);
        assert_eq!(s.db_acquire_timeout, Duration::from_secs(3));
        assert_eq!(s.impressao.font_family, "Roboto");
        assert!(s.impressao.emitente_nome.is_none());
    }

    #[test]
    fn postgres_exige_database_url() {
        assert!(settings(&[]).is_err());
        let s = settings(&[("DATABASE_URL", "postgres://localhost/gr")]).unwrap();
        assert_eq!(s.backend, StoreBackend::Postgres);
    }

    #[test]
    fn valores_invalidos_abortam() {
        assert!(settings(&[("STORE_BACKEND", "redis")]).is_err());
        assert!(settings(&[("STORE_BACKEND", "memory"), ("DB_MAX_CONNECTIONS", "muitas")]).is_err());
    }

    #[tokio::test]
    async fn estado_em_memoria_sobe_sem_banco() {
        let s = settings(&[("STORE_BACKEND", "memory")]).unwrap();
        let state = AppState::new(&s).await.unwrap();
        assert!(state.fornecedor_service.listar().await.unwrap().is_empty());
    }
}
