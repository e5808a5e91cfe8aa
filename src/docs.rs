// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::accept_founder_invite,
        handlers::auth::accept_invite,

        // --- Convites ---
        handlers::convites::create_founder_invite,
        handlers::convites::list_founder_invites,
        handlers::convites::validate_founder_invite,
        handlers::convites::create_invite,
        handlers::convites::list_invites,
        handlers::convites::resend_invite,
        handlers::convites::revoke_invite,
        handlers::convites::validate_invite,

        // --- Equipe ---
        handlers::usuarios::get_me,
        handlers::usuarios::list_usuarios,
        handlers::usuarios::update_papel,
        handlers::usuarios::deactivate_usuario,

        // --- Clínica ---
        handlers::clinica::get_clinica,
        handlers::clinica::update_clinica,

        // --- Financeiro ---
        handlers::finance::create_conta,
        handlers::finance::list_contas,
        handlers::finance::create_transacao,
        handlers::finance::list_transacoes,
        handlers::finance::get_transacao,
        handlers::finance::reconcile_transacao,
        handlers::finance::refund_transacao,
        handlers::finance::pay_parcela,
        handlers::finance::cancel_parcela,

        // --- Pacientes ---
        handlers::pacientes::create_paciente,
        handlers::pacientes::list_pacientes,
        handlers::pacientes::get_paciente,
        handlers::pacientes::update_paciente,
        handlers::pacientes::deactivate_paciente,

        // --- Plataforma ---
        handlers::admin::list_identidades,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Identidade,
            models::auth::SignupPayload,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::SignupResponse,
            models::auth::RegisteredUser,
            models::auth::RegisterResponse,

            // --- Clínica / Equipe ---
            models::clinica::Papel,
            models::clinica::Clinica,
            models::clinica::AtualizarClinica,
            models::clinica::Usuario,
            models::clinica::PerfilUsuario,
            models::clinica::AlterarPapelPayload,

            // --- Convites ---
            models::convite::StatusConvite,
            models::convite::ConviteFundador,
            models::convite::Convite,
            models::convite::CriarConviteFundadorPayload,
            models::convite::CriarConvitePayload,
            models::convite::ReenviarConvitePayload,
            models::convite::ConviteEmitido,
            models::convite::AceitarConviteFundadorPayload,
            models::convite::AceitarConvitePayload,
            models::convite::ConviteAceito,
            models::convite::ConviteValidado,

            // --- Financeiro ---
            models::finance::TipoTransacao,
            models::finance::StatusTransacao,
            models::finance::MetodoPagamento,
            models::finance::ContaBancaria,
            models::finance::Transacao,
            models::finance::Parcela,
            models::finance::TransacaoDetalhe,
            models::finance::ParcelaAtualizada,
            models::finance::CriarContaBancariaPayload,
            models::finance::CriarTransacaoPayload,
            models::finance::PagarParcelaPayload,

            // --- Pacientes ---
            models::paciente::Paciente,
            models::paciente::DadosPaciente,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro, login e aceite de convites"),
        (name = "Convites", description = "Convites de fundador e de equipe"),
        (name = "Equipe", description = "Usuários da clínica e seus papéis"),
        (name = "Clínica", description = "Perfil da clínica"),
        (name = "Financeiro", description = "Contas, transações e parcelas"),
        (name = "Pacientes", description = "Cadastro de pacientes"),
        (name = "Plataforma", description = "Administração da plataforma")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
