// src/models/guia.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::json::{id_opcional, texto_livre};
use crate::models::fornecedor::{Fornecedor, FornecedorResumo};

// --- 1. Guia de Remessa (tabela 'guias_gr') ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Guia {
    pub id: i32,
    #[schema(example = "GR-2025-0001")]
    pub numero_guia: String,
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub data_emissao: NaiveDate,
    pub defeito: String,
    pub motivo: String,
    pub fornecedor_id: i32,
}

// --- 2. Equipamento remetido (tabela 'equipamentos_gr') ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipamento {
    pub id: i32,
    #[serde(skip_serializing)]
    pub guia_id: i32,
    pub quantidade: i32,
    pub descricao: String,
    pub numero_serie: String,
    pub patrimonio: String,
    // Texto livre: o valor contábil não é numérico
    pub valor: String,
}

/// Guia carregada junto com o fornecedor e os equipamentos.
#[derive(Debug, Clone)]
pub struct GuiaComRelacoes {
    pub guia: Guia,
    pub fornecedor: Fornecedor,
    pub equipamentos: Vec<Equipamento>,
}

// ---
// Respostas
// ---

// GET /guias: fornecedor completo
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GuiaListagem {
    pub id: i32,
    pub numero_guia: String,
    #[schema(value_type = String, format = Date)]
    pub data_emissao: NaiveDate,
    pub fornecedor: Fornecedor,
    pub defeito: String,
    pub motivo: String,
    pub equipamentos: Vec<Equipamento>,
}

// GET /guia/{id}: fornecedor resumido
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GuiaDetalhe {
    pub id: i32,
    pub numero_guia: String,
    #[schema(value_type = String, format = Date)]
    pub data_emissao: NaiveDate,
    pub fornecedor: FornecedorResumo,
    pub defeito: String,
    pub motivo: String,
    pub equipamentos: Vec<Equipamento>,
}

impl From<GuiaComRelacoes> for GuiaListagem {
    fn from(g: GuiaComRelacoes) -> Self {
        Self {
            id: g.guia.id,
            numero_guia: g.guia.numero_guia,
            data_emissao: g.guia.data_emissao,
            fornecedor: g.fornecedor,
            defeito: g.guia.defeito,
            motivo: g.guia.motivo,
            equipamentos: g.equipamentos,
        }
    }
}

impl From<GuiaComRelacoes> for GuiaDetalhe {
    fn from(g: GuiaComRelacoes) -> Self {
        Self {
            id: g.guia.id,
            numero_guia: g.guia.numero_guia,
            data_emissao: g.guia.data_emissao,
            fornecedor: g.fornecedor.into(),
            defeito: g.guia.defeito,
            motivo: g.guia.motivo,
            equipamentos: g.equipamentos,
        }
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EquipamentoPayload {
    // Número ou texto numérico; qualquer outra coisa vira 1
    #[serde(default)]
    #[schema(value_type = Option<i32>, example = 2)]
    pub quantidade: Option<Value>,
    #[serde(default, deserialize_with = "texto_livre")]
    #[schema(example = "Impressora térmica")]
    pub descricao: String,
    #[serde(default, deserialize_with = "texto_livre")]
    pub numero_serie: String,
    #[serde(default, deserialize_with = "texto_livre")]
    pub patrimonio: String,
    #[serde(default, deserialize_with = "texto_livre")]
    #[schema(example = "R$ 1.200,00")]
    pub valor: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateGuiaPayload {
    // Número ou texto numérico ("5")
    #[serde(default, deserialize_with = "id_opcional")]
    #[schema(value_type = Option<i32>, example = 1)]
    pub fornecedor_id: Option<i32>,
    #[serde(default, deserialize_with = "texto_livre")]
    pub defeito: String,
    #[serde(default, deserialize_with = "texto_livre")]
    pub motivo: String,
    // Null e ausência chegam ao serviço como lista vazia
    #[serde(default)]
    pub equipamentos: Option<Vec<EquipamentoPayload>>,
}

// ---
// Comandos normalizados
// ---

#[derive(Debug, Clone, PartialEq)]
pub struct NovoEquipamento {
    pub quantidade: i32,
    pub descricao: String,
    pub numero_serie: String,
    pub patrimonio: String,
    pub valor: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NovaGuia {
    pub fornecedor_id: i32,
    pub defeito: String,
    pub motivo: String,
    pub equipamentos: Vec<NovoEquipamento>,
}

/// Converte a quantidade recebida em inteiro positivo.
/// Números são truncados, textos numéricos são aceitos; o resto vira 1.
pub fn coagir_quantidade(valor: Option<&Value>) -> i32 {
    let bruto = match valor {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(Value::Bool(true)) => Some(1),
        _ => None,
    };

    match bruto.and_then(|q| i32::try_from(q).ok()) {
        Some(q) if q > 0 => q,
        _ => 1,
    }
}

impl From<EquipamentoPayload> for NovoEquipamento {
    fn from(p: EquipamentoPayload) -> Self {
        Self {
            quantidade: coagir_quantidade(p.quantidade.as_ref()),
            descricao: p.descricao.trim().to_string(),
            numero_serie: p.numero_serie.trim().to_string(),
            patrimonio: p.patrimonio.trim().to_string(),
            valor: p.valor.trim().to_string(),
        }
    }
}
