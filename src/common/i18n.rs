// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::OnceLock;

pub const IDIOMA_PADRAO: &str = "pt";

// Tabela (código do erro, idioma) -> mensagem
const MENSAGENS: &[(&str, &str, &str)] = &[
    ("validation_error", "pt", "Um ou mais campos são inválidos."),
    ("validation_error", "en", "One or more fields are invalid."),
    ("business_rule", "pt", "A operação não é permitida no estado atual."),
    ("business_rule", "en", "The operation is not allowed in the current state."),
    ("email_already_exists", "pt", "Este e-mail já está em uso."),
    ("email_already_exists", "en", "This e-mail is already in use."),
    ("invalid_credentials", "pt", "E-mail ou senha inválidos."),
    ("invalid_credentials", "en", "Invalid e-mail or password."),
    ("invalid_token", "pt", "Token de autenticação inválido ou ausente."),
    ("invalid_token", "en", "Missing or invalid authentication token."),
    ("forbidden", "pt", "Você não tem permissão para realizar esta ação."),
    ("forbidden", "en", "You are not allowed to perform this action."),
    ("resource_not_found", "pt", "Recurso não encontrado."),
    ("resource_not_found", "en", "Resource not found."),
    ("invite_not_found", "pt", "Convite não encontrado."),
    ("invite_not_found", "en", "Invite not found."),
    ("invite_already_used", "pt", "Este convite já foi utilizado."),
    ("invite_already_used", "en", "This invite has already been used."),
    ("invite_expired", "pt", "Este convite expirou."),
    ("invite_expired", "en", "This invite has expired."),
    ("invite_invalid_status", "pt", "O convite não pode ser alterado no status atual."),
    ("invite_invalid_status", "en", "The invite cannot be changed in its current status."),
    ("invite_already_pending", "pt", "Já existe um convite pendente para este e-mail."),
    ("invite_already_pending", "en", "There is already a pending invite for this e-mail."),
    ("user_already_linked", "pt", "Este usuário já está vinculado a uma clínica."),
    ("user_already_linked", "en", "This user already belongs to a clinic."),
    ("unique_violation", "pt", "Registro duplicado."),
    ("unique_violation", "en", "Duplicate record."),
    ("internal_error", "pt", "Ocorreu um erro inesperado."),
    ("internal_error", "en", "An unexpected error occurred."),
];

pub struct I18nStore {
    // código -> (idioma -> mensagem)
    mensagens: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut mensagens: HashMap<&'static str, HashMap<&'static str, &'static str>> =
            HashMap::new();
        for (codigo, idioma, texto) in MENSAGENS {
            mensagens.entry(*codigo).or_default().insert(*idioma, *texto);
        }
        Self { mensagens }
    }

    /// Instância compartilhada (a tabela é estática).
    pub fn global() -> &'static I18nStore {
        static STORE: OnceLock<I18nStore> = OnceLock::new();
        STORE.get_or_init(I18nStore::new)
    }

    /// Busca a mensagem no idioma pedido, caindo para o português.
    pub fn mensagem(&self, idioma: &str, codigo: &str) -> String {
        self.mensagens
            .get(codigo)
            .and_then(|traducoes| traducoes.get(idioma).or_else(|| traducoes.get(IDIOMA_PADRAO)))
            .map(|texto| texto.to_string())
            .unwrap_or_else(|| codigo.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
