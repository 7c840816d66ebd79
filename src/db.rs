pub mod fornecedor_repo;
pub use fornecedor_repo::{FornecedorRepository, PgFornecedorRepository};
pub mod guia_repo;
pub use guia_repo::{GuiaRepository, PgGuiaRepository};
pub mod memory;
pub use memory::MemoryStore;

/// Pool de testes contra um Postgres real, com as migrações aplicadas.
/// Sem `DATABASE_URL` devolve `None` e o teste é pulado.
#[cfg(test)]
pub(crate) async fn pool_de_teste() -> Option<sqlx::PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL ausente; pulando testes de Postgres");
        return None;
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(8)
        .connect(&database_url)
        .await
        .expect("conexão com o Postgres de teste");
    sqlx::migrate!().run(&pool).await.expect("migrações de teste");
    Some(pool)
}
