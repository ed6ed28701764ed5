pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod relatorio_repo;
pub use relatorio_repo::RelatorioRepository;
pub mod codigo_repo;
pub use codigo_repo::CodigoRepository;
