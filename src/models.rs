pub mod auth;
pub mod clinica;
pub mod convite;
pub mod finance;
pub mod paciente;
