pub mod auth;
pub mod dashboard;
pub mod relatorios;
pub mod usuarios;
