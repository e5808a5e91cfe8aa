// src/common/texto.rs

use validator::ValidationError;

/// E-mails são comparados sem diferenciar maiúsculas.
pub fn normalizar_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Espaços nas pontas não contam para o tamanho mínimo.
fn exigir_tamanho(valor: &str, minimo: usize, mensagem: &'static str) -> Result<(), ValidationError> {
    if valor.trim().chars().count() < minimo {
        let mut err = ValidationError::new("length");
        err.add_param("min".into(), &minimo);
        err.message = Some(mensagem.into());
        return Err(err);
    }
    Ok(())
}

pub fn validar_nome_clinica(valor: &str) -> Result<(), ValidationError> {
    exigir_tamanho(valor, 2, "O nome da clínica deve ter no mínimo 2 caracteres.")
}

pub fn validar_nome_pessoa(valor: &str) -> Result<(), ValidationError> {
    exigir_tamanho(valor, 1, "O nome é obrigatório.")
}

fn sem_acento(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        outro => outro,
    }
}

/// "Clínica Sorriso & Cia" -> "clinica-sorriso-cia"
pub fn gerar_slug(nome: &str) -> String {
    let mut slug = String::with_capacity(nome.len());
    for c in nome.to_lowercase().chars().map(sem_acento) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        "clinica".to_string()
    } else {
        slug
    }
}

/// Escolhe o primeiro slug livre: `base`, `base-2`, `base-3`...
/// `existentes` são os slugs já gravados que começam com `base`.
pub fn proximo_slug_disponivel(base: &str, existentes: &[String]) -> String {
    if !existentes.iter().any(|s| s == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidato| !existentes.contains(candidato))
        .unwrap_or_else(|| base.to_string())
}
