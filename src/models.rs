pub mod auth;
pub mod dashboard;
pub mod relatorio;
pub mod usuario;
