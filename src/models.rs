pub mod fornecedor;
pub mod guia;
