pub mod auth;
pub mod clinica_service;
pub mod convite_service;
pub mod email;
pub mod equipe_service;
pub mod finance_service;
pub mod paciente_service;
