// src/common/json.rs

use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

// ---
// Desserializadores tolerantes
// ---
// O frontend envia campos de texto como string, número ou null.
// Null e ausência viram "", números viram o seu texto.

pub fn texto_livre<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(D::Error::custom("esperado um texto")),
    }
}

/// Igual a `texto_livre`, mas preserva a diferença entre "campo ausente" (None)
/// e "campo presente" (Some). Usado em atualizações parciais.
pub fn texto_opcional<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    texto_livre(deserializer).map(Some)
}

/// Identificador numérico vindo como número ou texto ("5").
/// Null, ausente ou impossível de converter viram `None`; quem chama decide o erro.
pub fn id_opcional<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(id.and_then(|id| i32::try_from(id).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Exemplo {
        #[serde(default, deserialize_with = "texto_livre")]
        valor: String,
        #[serde(default, deserialize_with = "texto_opcional")]
        contato: Option<String>,
        #[serde(default, deserialize_with = "id_opcional")]
        fornecedor_id: Option<i32>,
    }

    #[test]
    fn aceita_numero_e_null() {
        let e: Exemplo = serde_json::from_str(r#"{"valor": 1500.5, "contato": null}"#).unwrap();
        assert_eq!(e.valor, "1500.5");
        assert_eq!(e.contato.as_deref(), Some(""));
    }

    #[test]
    fn campo_ausente_vira_padrao() {
        let e: Exemplo = serde_json::from_str("{}").unwrap();
        assert_eq!(e.valor, "");
        assert!(e.contato.is_none());
    }

    #[test]
    fn rejeita_objetos() {
        let r = serde_json::from_str::<Exemplo>(r#"{"valor": {"a": 1}}"#);
        assert!(r.is_err());
    }

    #[test]
    fn id_aceita_numero_e_texto_numerico() {
        let e: Exemplo = serde_json::from_str(r#"{"fornecedor_id": "5"}"#).unwrap();
        assert_eq!(e.fornecedor_id, Some(5));
        let e: Exemplo = serde_json::from_str(r#"{"fornecedor_id": 7}"#).unwrap();
        assert_eq!(e.fornecedor_id, Some(7));
        let e: Exemplo = serde_json::from_str(r#"{"fornecedor_id": null}"#).unwrap();
        assert_eq!(e.fornecedor_id, None);
        let e: Exemplo = serde_json::from_str(r#"{"fornecedor_id": "abc"}"#).unwrap();
        assert_eq!(e.fornecedor_id, None);
    }
}
