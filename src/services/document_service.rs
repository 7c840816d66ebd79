// src/services/document_service.rs

use std::sync::Arc;

use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{
    common::error::AppError,
    config::ImpressaoConfig,
    db::GuiaRepository,
    models::guia::GuiaComRelacoes,
};

const NAO_INFORMADO: &str = "Não informado";

const OBSERVACOES: [&str; 3] = [
    "• Os equipamentos deverão ser devolvidos em perfeitas condições de uso",
    "• Prazo máximo para devolução: 30 dias",
    "• Em caso de avarias durante o transporte, comunicar imediatamente",
];

fn ou_nao_informado(valor: &str) -> &str {
    if valor.trim().is_empty() { NAO_INFORMADO } else { valor }
}

fn ou_traco(valor: &str) -> &str {
    if valor.trim().is_empty() { "-" } else { valor }
}

fn erro_pdf(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Erro ao gerar PDF: {}", e))
}

// Gera a guia impressa (a mesma que o frontend montava para o navegador imprimir)
#[derive(Clone)]
pub struct DocumentService {
    guias: Arc<dyn GuiaRepository>,
    config: ImpressaoConfig,
}

impl DocumentService {
    pub fn new(guias: Arc<dyn GuiaRepository>, config: ImpressaoConfig) -> Self {
        Self { guias, config }
    }

    pub async fn gerar_guia_pdf(&self, guia_id: i32) -> Result<(String, Vec<u8>), AppError> {
        // 1. Busca os Dados
        let dados = self
            .guias
            .find_by_id(guia_id)
            .await?
            .ok_or(AppError::GuiaNaoEncontrada)?;

        let numero = dados.guia.numero_guia.clone();

        // 2. Renderiza fora do executor assíncrono (fontes e layout são síncronos)
        let config = self.config.clone();
        let pdf = tokio::task::spawn_blocking(move || renderizar(&config, &dados))
            .await
            .map_err(erro_pdf)??;

        Ok((numero, pdf))
    }
}

fn renderizar(config: &ImpressaoConfig, dados: &GuiaComRelacoes) -> Result<Vec<u8>, AppError> {
    let GuiaComRelacoes { guia, fornecedor, equipamentos } = dados;

    // Carrega a fonte da pasta configurada
    let font_family = genpdf::fonts::from_files(&config.fonts_dir, &config.font_family, None)
        .map_err(|_| AppError::FontNotFound(format!(
            "{} não encontrada em {}",
            config.font_family, config.fonts_dir
        )))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Guia de Remessa - {}", guia.numero_guia));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let negrito = style::Style::new().bold();
    let secao = |titulo: &str| {
        elements::Paragraph::new(titulo.to_string())
            .styled(style::Style::new().bold().with_font_size(12))
    };

    // --- CABEÇALHO ---
    let mut titulo = elements::Paragraph::new("GUIA DE REMESSA PARA MANUTENÇÃO/CONSERTO");
    titulo.set_alignment(Alignment::Center);
    doc.push(titulo.styled(style::Style::new().bold().with_font_size(16)));

    if let Some(nome) = &config.emitente_nome {
        let mut p = elements::Paragraph::new(nome.clone());
        p.set_alignment(Alignment::Center);
        doc.push(p.styled(negrito));
    }
    if let Some(cnpj) = &config.emitente_cnpj {
        let mut p = elements::Paragraph::new(format!("CNPJ: {}", cnpj));
        p.set_alignment(Alignment::Center);
        doc.push(p.styled(style::Style::new().with_font_size(10)));
    }

    doc.push(elements::Break::new(1.5));

    // --- DADOS DA REMESSA ---
    doc.push(secao("DADOS DA REMESSA"));
    doc.push(elements::Paragraph::new(format!("Número da Guia: {}", guia.numero_guia)));
    doc.push(elements::Paragraph::new(format!(
        "Data de Emissão: {}",
        guia.data_emissao.format("%d/%m/%Y")
    )));
    doc.push(elements::Break::new(1));

    // --- FORNECEDOR ---
    doc.push(secao("INFORMAÇÕES DO FORNECEDOR/PRESTADOR DE SERVIÇOS"));
    doc.push(elements::Paragraph::new(format!("Razão Social: {}", fornecedor.nome)));
    doc.push(elements::Paragraph::new(format!("CNPJ: {}", fornecedor.cnpj)));
    doc.push(elements::Paragraph::new(format!("Contato: {}", ou_nao_informado(&fornecedor.contato))));
    doc.push(elements::Paragraph::new(format!("E-mail: {}", ou_nao_informado(&fornecedor.email))));
    doc.push(elements::Paragraph::new(format!("Endereço: {}", ou_nao_informado(&fornecedor.endereco))));
    doc.push(elements::Paragraph::new(format!(
        "Responsável: {}",
        ou_nao_informado(&fornecedor.responsavel)
    )));
    doc.push(elements::Break::new(1));

    // --- TABELA DE EQUIPAMENTOS ---
    // Pesos das colunas: Qtd (1), Descrição (4), Série (2), Patrimônio (2), Valor (2)
    doc.push(secao("ATIVOS REMETIDOS"));
    let mut table = elements::TableLayout::new(vec![1, 4, 2, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    table
        .row()
        .element(elements::Paragraph::new("Qtd.").styled(negrito))
        .element(elements::Paragraph::new("Descrição do Equipamento/Ativo").styled(negrito))
        .element(elements::Paragraph::new("Nº de Série").styled(negrito))
        .element(elements::Paragraph::new("Patrimônio").styled(negrito))
        .element(elements::Paragraph::new("Valor Contábil").styled(negrito))
        .push()
        .map_err(erro_pdf)?;

    for equipamento in equipamentos {
        table
            .row()
            .element(elements::Paragraph::new(equipamento.quantidade.to_string()))
            .element(elements::Paragraph::new(equipamento.descricao.clone()))
            .element(elements::Paragraph::new(ou_traco(&equipamento.numero_serie).to_string()))
            .element(elements::Paragraph::new(ou_traco(&equipamento.patrimonio).to_string()))
            .element(elements::Paragraph::new(ou_traco(&equipamento.valor).to_string()))
            .push()
            .map_err(erro_pdf)?;
    }

    doc.push(table);
    doc.push(elements::Break::new(1));

    // --- MOTIVO E DEFEITO ---
    doc.push(secao("MOTIVO DA REMESSA"));
    doc.push(elements::Paragraph::new(format!("Motivo: {}", ou_nao_informado(&guia.motivo))));
    doc.push(elements::Paragraph::new("Defeito/Problema Relatado:").styled(negrito));
    doc.push(elements::Paragraph::new(ou_nao_informado(&guia.defeito).to_string()));
    doc.push(elements::Break::new(1));

    doc.push(secao("OBSERVAÇÕES"));
    for linha in OBSERVACOES {
        doc.push(elements::Paragraph::new(linha));
    }
    doc.push(elements::Break::new(2));

    // --- ASSINATURAS ---
    let mut assinaturas = elements::TableLayout::new(vec![1, 1, 1]);
    assinaturas
        .row()
        .element(elements::Paragraph::new("EMITENTE").styled(negrito))
        .element(elements::Paragraph::new("RECEBEDOR").styled(negrito))
        .element(elements::Paragraph::new("CONFERÊNCIA").styled(negrito))
        .push()
        .map_err(erro_pdf)?;
    assinaturas
        .row()
        .element(elements::Paragraph::new("_____________________"))
        .element(elements::Paragraph::new("_____________________"))
        .element(elements::Paragraph::new("_____________________"))
        .push()
        .map_err(erro_pdf)?;
    doc.push(assinaturas);
    doc.push(elements::Break::new(2));

    // --- QR CODE COM O NÚMERO DA GUIA ---
    let code = QrCode::new(guia.numero_guia.as_bytes()).map_err(erro_pdf)?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
    let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
        .map_err(erro_pdf)?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(pdf_image);

    // 3. Renderiza para Buffer (Memória)
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(erro_pdf)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{FornecedorRepository, MemoryStore},
        models::{
            fornecedor::NovoFornecedor,
            guia::{NovaGuia, NovoEquipamento},
        },
    };
    use chrono::NaiveDate;

    fn config_sem_fontes() -> ImpressaoConfig {
        ImpressaoConfig {
            fonts_dir: "/caminho/que/nao/existe".into(),
            font_family: "Roboto".into(),
            emitente_nome: None,
            emitente_cnpj: None,
        }
    }

    #[test]
    fn campos_vazios_aparecem_como_nao_informado() {
        assert_eq!(ou_nao_informado("  "), "Não informado");
        assert_eq!(ou_nao_informado("Rua A"), "Rua A");
        assert_eq!(ou_traco(""), "-");
    }

    #[tokio::test]
    async fn guia_inexistente_da_404() {
        let service = DocumentService::new(Arc::new(MemoryStore::new()), config_sem_fontes());
        assert!(matches!(service.gerar_guia_pdf(1).await, Err(AppError::GuiaNaoEncontrada)));
    }

    #[tokio::test]
    async fn fonte_ausente_vira_erro_de_fonte() {
        let store = MemoryStore::new();
        let fornecedor = store
            .create(&NovoFornecedor {
                nome: "Acme".into(),
                cnpj: "12345678000199".into(),
                contato: String::new(),
                email: String::new(),
                endereco: String::new(),
                responsavel: String::new(),
            })
            .await
            .unwrap();
        let guia = store
            .create_with_equipamentos(
                &NovaGuia {
                    fornecedor_id: fornecedor.id,
                    defeito: String::new(),
                    motivo: String::new(),
                    equipamentos: vec![NovoEquipamento {
                        quantidade: 1,
                        descricao: "Scanner".into(),
                        numero_serie: String::new(),
                        patrimonio: String::new(),
                        valor: String::new(),
                    }],
                },
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            )
            .await
            .unwrap();

        let service = DocumentService::new(Arc::new(store), config_sem_fontes());
        assert!(matches!(service.gerar_guia_pdf(guia.id).await, Err(AppError::FontNotFound(_))));
    }
}
