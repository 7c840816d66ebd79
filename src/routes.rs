// src/routes.rs

use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers};

pub fn app_router(app_state: AppState) -> Router {
    let fornecedor_routes = Router::new()
        .route("/fornecedores", get(handlers::fornecedores::listar_fornecedores))
        .route("/fornecedor/novo", post(handlers::fornecedores::criar_fornecedor))
        .route(
            "/fornecedor/{id}",
            get(handlers::fornecedores::buscar_fornecedor)
                .put(handlers::fornecedores::atualizar_fornecedor)
                .delete(handlers::fornecedores::excluir_fornecedor),
        );

    let guia_routes = Router::new()
        .route("/guia/nova", post(handlers::guias::criar_guia))
        .route("/guias", get(handlers::guias::listar_guias))
        .route(
            "/guia/{id}",
            get(handlers::guias::buscar_guia).delete(handlers::guias::excluir_guia),
        )
        .route("/guia/{id}/pdf", get(handlers::documents::gerar_guia_pdf));

    Router::new()
        .route("/", get(handlers::status::status))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(fornecedor_routes)
        .merge(guia_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{config::ImpressaoConfig, db::MemoryStore};

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let impressao = ImpressaoConfig {
            fonts_dir: "/caminho/que/nao/existe".into(),
            font_family: "Roboto".into(),
            emitente_nome: None,
            emitente_cnpj: None,
        };
        app_router(AppState::with_repositories(store.clone(), store, impressao))
    }

    async fn chamar(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn criar_fornecedor(app: &Router, nome: &str, cnpj: &str) -> i64 {
        let (status, body) = chamar(
            app,
            Method::POST,
            "/fornecedor/novo",
            Some(json!({ "nome": nome, "cnpj": cnpj })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn raiz_informa_status() {
        let (status, body) = chamar(&app(), Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "API da Guia de Remessa ativa" }));
    }

    #[tokio::test]
    async fn cadastro_de_fornecedor_com_cnpj_pontuado() {
        let app = app();
        let (status, body) = chamar(
            &app,
            Method::POST,
            "/fornecedor/novo",
            Some(json!({ "nome": "Acme", "cnpj": "12.345.678/0001-99" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Fornecedor cadastrado com sucesso");

        let id = body["id"].as_i64().unwrap();
        let (status, body) = chamar(&app, Method::GET, &format!("/fornecedor/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["nome"], "Acme");
        assert_eq!(body["cnpj"], "12345678000199");
    }

    #[tokio::test]
    async fn cnpj_repetido_devolve_409_com_id() {
        let app = app();
        let id = criar_fornecedor(&app, "Acme", "12.345.678/0001-99").await;

        let (status, body) = chamar(
            &app,
            Method::POST,
            "/fornecedor/novo",
            Some(json!({ "nome": "Outra", "cnpj": "12345678000199" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "message": "Fornecedor já existe", "id": id }));
    }

    #[tokio::test]
    async fn cadastro_incompleto_da_400() {
        let app = app();
        let (status, body) =
            chamar(&app, Method::POST, "/fornecedor/novo", Some(json!({ "nome": "Acme" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Nome e CNPJ são obrigatórios");

        let (status, body) = chamar(
            &app,
            Method::POST,
            "/fornecedor/novo",
            Some(json!({ "nome": "Acme", "cnpj": "123" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "CNPJ inválido");
    }

    #[tokio::test]
    async fn fornecedor_inexistente_da_404() {
        let app = app();
        let (status, body) = chamar(&app, Method::GET, "/fornecedor/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Fornecedor não encontrado" }));

        let (status, _) = chamar(&app, Method::GET, "/fornecedor/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn atualizacao_parcial_pela_api() {
        let app = app();
        let id = criar_fornecedor(&app, "Acme", "12345678000199").await;

        let (status, body) = chamar(
            &app,
            Method::PUT,
            &format!("/fornecedor/{}", id),
            Some(json!({ "contato": "(11) 99999-0000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Fornecedor atualizado com sucesso");

        let (_, body) = chamar(&app, Method::GET, &format!("/fornecedor/{}", id), None).await;
        assert_eq!(body["nome"], "Acme");
        assert_eq!(body["contato"], "(11) 99999-0000");
    }

    #[tokio::test]
    async fn guia_criada_e_consultada_com_equipamentos() {
        let app = app();
        let fornecedor_id = criar_fornecedor(&app, "Acme", "12345678000199").await;

        let (status, body) = chamar(
            &app,
            Method::POST,
            "/guia/nova",
            Some(json!({
                "fornecedor_id": fornecedor_id,
                "defeito": "Não liga",
                "motivo": "Conserto",
                "equipamentos": [
                    { "quantidade": 2, "descricao": "Impressora", "numero_serie": "SN1", "valor": "R$ 100,00" },
                    { "quantidade": "3", "descricao": "Monitor" }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Guia criada com sucesso");
        let numero = body["numero"].as_str().unwrap().to_string();
        assert!(numero.starts_with("GR-"));
        assert_eq!(numero.len(), "GR-2025-0001".len());
        let id = body["id"].as_i64().unwrap();

        let (status, body) = chamar(&app, Method::GET, &format!("/guia/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["numero_guia"], numero.as_str());
        assert_eq!(body["defeito"], "Não liga");
        assert_eq!(body["fornecedor"], json!({ "id": fornecedor_id, "nome": "Acme", "cnpj": "12345678000199" }));

        let equipamentos = body["equipamentos"].as_array().unwrap();
        assert_eq!(equipamentos.len(), 2);
        assert_eq!(equipamentos[0]["quantidade"], 2);
        assert_eq!(equipamentos[0]["valor"], "R$ 100,00");
        assert_eq!(equipamentos[1]["quantidade"], 3);
        assert_eq!(equipamentos[1]["patrimonio"], "");
        assert!(equipamentos[0].get("guia_id").is_none());
    }

    #[tokio::test]
    async fn listagem_de_guias_traz_fornecedor_completo() {
        let app = app();
        let fornecedor_id = criar_fornecedor(&app, "Acme", "12345678000199").await;
        for _ in 0..2 {
            let (status, _) = chamar(
                &app,
                Method::POST,
                "/guia/nova",
                Some(json!({ "fornecedor_id": fornecedor_id, "equipamentos": [{ "descricao": "Scanner" }] })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = chamar(&app, Method::GET, "/guias", None).await;
        assert_eq!(status, StatusCode::OK);
        let guias = body.as_array().unwrap();
        assert_eq!(guias.len(), 2);
        // Mais recente primeiro
        assert!(guias[0]["id"].as_i64() > guias[1]["id"].as_i64());
        assert_eq!(guias[0]["fornecedor"]["email"], "");
        assert_eq!(guias[0]["equipamentos"][0]["quantidade"], 1);
    }

    #[tokio::test]
    async fn guia_sem_dados_obrigatorios_da_400_ou_404() {
        let app = app();
        let (status, body) =
            chamar(&app, Method::POST, "/guia/nova", Some(json!({ "equipamentos": [{}] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "fornecedor_id é obrigatório");

        let fornecedor_id = criar_fornecedor(&app, "Acme", "12345678000199").await;
        let (status, _) = chamar(
            &app,
            Method::POST,
            "/guia/nova",
            Some(json!({ "fornecedor_id": fornecedor_id, "equipamentos": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = chamar(
            &app,
            Method::POST,
            "/guia/nova",
            Some(json!({ "fornecedor_id": 999, "equipamentos": [{ "descricao": "X" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Fornecedor não encontrado");

        let (_, body) = chamar(&app, Method::GET, "/guias", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn payload_solto_chega_as_validacoes_do_servico() {
        let app = app();
        let fornecedor_id = criar_fornecedor(&app, "Acme", "12345678000199").await;

        let (status, body) = chamar(
            &app,
            Method::POST,
            "/guia/nova",
            Some(json!({ "fornecedor_id": fornecedor_id, "equipamentos": null })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Pelo menos um equipamento é obrigatório");

        // fornecedor_id como texto numérico
        let (status, body) = chamar(
            &app,
            Method::POST,
            "/guia/nova",
            Some(json!({
                "fornecedor_id": fornecedor_id.to_string(),
                "equipamentos": [{ "descricao": "Scanner" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();

        let (_, body) = chamar(&app, Method::GET, &format!("/guia/{}", id), None).await;
        assert_eq!(body["fornecedor"]["id"], fornecedor_id);
    }

    #[tokio::test]
    async fn excluir_fornecedor_remove_as_guias() {
        let app = app();
        let fornecedor_id = criar_fornecedor(&app, "Acme", "12345678000199").await;
        let (_, body) = chamar(
            &app,
            Method::POST,
            "/guia/nova",
            Some(json!({ "fornecedor_id": fornecedor_id, "equipamentos": [{ "descricao": "X" }] })),
        )
        .await;
        let guia_id = body["id"].as_i64().unwrap();

        let (status, body) =
            chamar(&app, Method::DELETE, &format!("/fornecedor/{}", fornecedor_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Fornecedor deletado com sucesso");

        let (status, _) = chamar(&app, Method::GET, &format!("/guia/{}", guia_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = chamar(&app, Method::GET, "/fornecedores", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn excluir_guia_mantem_fornecedor() {
        let app = app();
        let fornecedor_id = criar_fornecedor(&app, "Acme", "12345678000199").await;
        let (_, body) = chamar(
            &app,
            Method::POST,
            "/guia/nova",
            Some(json!({ "fornecedor_id": fornecedor_id, "equipamentos": [{ "descricao": "X" }] })),
        )
        .await;
        let guia_id = body["id"].as_i64().unwrap();

        let (status, body) = chamar(&app, Method::DELETE, &format!("/guia/{}", guia_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Guia deletada com sucesso");

        let (status, _) = chamar(&app, Method::DELETE, &format!("/guia/{}", guia_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) =
            chamar(&app, Method::GET, &format!("/fornecedor/{}", fornecedor_id), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn json_malformado_da_400() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/fornecedor/novo")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"nome\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("JSON inválido"));
    }

    #[tokio::test]
    async fn pdf_de_guia_inexistente_da_404() {
        let (status, body) = chamar(&app(), Method::GET, "/guia/1/pdf", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Guia não encontrada");
    }

    #[tokio::test]
    async fn documento_openapi_publicado() {
        let (status, body) = chamar(&app(), Method::GET, "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/guia/nova").is_some());
        assert!(body["paths"].get("/fornecedor/{id}").is_some());
    }
}
