// src/services/numeracao.rs

// =========================================================================
//  NUMERAÇÃO DE GUIAS: GR-<ano>-<sequencial de 4 dígitos>
// =========================================================================
//
// Regras de derivação do próximo número a partir do histórico do ano.
// A reserva atômica fica nos repositórios (contador por ano + chave única),
// que usam estas funções para calcular o ponto de partida.

/// Prefixo comum a todas as guias do ano ("GR-2025-").
pub fn prefixo_do_ano(ano: i32) -> String {
    format!("GR-{}-", ano)
}

/// Padrão LIKE para buscar as guias do ano.
pub fn padrao_like(ano: i32) -> String {
    format!("{}%", prefixo_do_ano(ano))
}

pub fn formatar_numero(ano: i32, sequencial: i32) -> String {
    format!("GR-{}-{:04}", ano, sequencial)
}

/// Sequencial seguinte a partir da guia mais recente do ano.
///
/// - sem guia no ano: 1
/// - número bem formado (`GR-<ano>-<n>`): n + 1
/// - número malformado: `None`, e quem chama deve cair na contagem
pub fn sequencial_seguinte(ultimo_numero: Option<&str>) -> Option<i32> {
    let Some(numero) = ultimo_numero else {
        return Some(1);
    };

    let partes: Vec<&str> = numero.split('-').collect();
    if partes.len() != 3 {
        return None;
    }

    partes[2]
        .trim()
        .parse::<i32>()
        .ok()
        .and_then(|n| n.checked_add(1))
}

/// Fallback para histórico malformado: total de guias do ano + 1.
pub fn sequencial_por_contagem(total_no_ano: i64) -> i32 {
    i32::try_from(total_no_ano.saturating_add(1)).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primeira_guia_do_ano() {
        assert_eq!(sequencial_seguinte(None), Some(1));
        assert_eq!(formatar_numero(2025, 1), "GR-2025-0001");
    }

    #[test]
    fn incrementa_o_ultimo_numero() {
        assert_eq!(sequencial_seguinte(Some("GR-2025-0001")), Some(2));
        assert_eq!(sequencial_seguinte(Some("GR-2025-0099")), Some(100));
        assert_eq!(formatar_numero(2025, 2), "GR-2025-0002");
    }

    #[test]
    fn passa_de_quatro_digitos_sem_truncar() {
        assert_eq!(sequencial_seguinte(Some("GR-2025-9999")), Some(10000));
        assert_eq!(formatar_numero(2025, 10000), "GR-2025-10000");
    }

    #[test]
    fn numero_malformado_pede_contagem() {
        assert_eq!(sequencial_seguinte(Some("GR-2025-00A1")), None);
        assert_eq!(sequencial_seguinte(Some("GR-2025-0001-B")), None);
        assert_eq!(sequencial_seguinte(Some("GR2025")), None);
        assert_eq!(sequencial_por_contagem(7), 8);
    }

    #[test]
    fn prefixos() {
        assert_eq!(prefixo_do_ano(2026), "GR-2026-");
        assert_eq!(padrao_like(2026), "GR-2026-%");
    }
}
