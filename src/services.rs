pub mod aggregation;
pub mod auth;
pub mod dashboard_service;
pub mod relatorio_service;
pub mod report_filter;
pub mod scope;
pub mod usuario_service;
