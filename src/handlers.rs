pub mod admin;
pub mod auth;
pub mod clinica;
pub mod convites;
pub mod finance;
pub mod pacientes;
pub mod usuarios;
