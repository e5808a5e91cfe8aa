pub mod store;
pub use store::{Datastore, IdentityProvider, UnitOfWork};
pub mod postgres;
pub use postgres::PgDatastore;
pub mod identity_repo;
pub use identity_repo::PgIdentityProvider;
pub mod clinica_repo;
pub use clinica_repo::ClinicaRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod convite_repo;
pub use convite_repo::ConviteRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod paciente_repo;
pub use paciente_repo::PacienteRepository;

#[cfg(test)]
pub mod memory;
