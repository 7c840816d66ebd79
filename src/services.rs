pub mod document_service;
pub mod fornecedor_service;
pub mod guia_service;
pub mod numeracao;
