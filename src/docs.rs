// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "API da Guia de Remessa", description = "Fornecedores e guias de remessa para manutenção"),
    paths(
        // --- Status ---
        handlers::status::status,

        // --- Fornecedores ---
        handlers::fornecedores::listar_fornecedores,
        handlers::fornecedores::criar_fornecedor,
        handlers::fornecedores::buscar_fornecedor,
        handlers::fornecedores::atualizar_fornecedor,
        handlers::fornecedores::excluir_fornecedor,

        // --- Guias ---
        handlers::guias::criar_guia,
        handlers::guias::listar_guias,
        handlers::guias::buscar_guia,
        handlers::guias::excluir_guia,

        // --- Documentos ---
        handlers::documents::gerar_guia_pdf,
    ),
    components(
        schemas(
            // --- Fornecedores ---
            models::fornecedor::Fornecedor,
            models::fornecedor::FornecedorResumo,
            models::fornecedor::CreateFornecedorPayload,
            models::fornecedor::UpdateFornecedorPayload,

            // --- Guias ---
            models::guia::Guia,
            models::guia::Equipamento,
            models::guia::GuiaListagem,
            models::guia::GuiaDetalhe,
            models::guia::EquipamentoPayload,
            models::guia::CreateGuiaPayload,

            // --- Respostas ---
            handlers::status::StatusResposta,
            handlers::respostas::MensagemResposta,
            handlers::respostas::CriadoResposta,
            handlers::respostas::GuiaCriadaResposta,
            handlers::respostas::ErroResposta,
        )
    ),
    tags(
        (name = "Status", description = "Verificação da API"),
        (name = "Fornecedores", description = "Cadastro de Fornecedores/Prestadores de Serviço"),
        (name = "Guias", description = "Guias de Remessa e Equipamentos"),
        (name = "Documentos", description = "Guia impressa em PDF")
    )
)]
pub struct ApiDoc;
