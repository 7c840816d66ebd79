pub mod documents;
pub mod fornecedores;
pub mod guias;
pub mod respostas;
pub mod status;
