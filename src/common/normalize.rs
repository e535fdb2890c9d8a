// src/common/normalize.rs

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use validator::ValidateEmail;

/// Token que identifica o tipo de documento multi-arquivo.
pub const SECURITY_VERIFICATION_TOKEN: &str = "verificaciones de seguridad";

/// Decompõe (NFD), remove acentos, passa para minúsculas e apara espaços.
pub fn normalize_name(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Regra única usada pelo cálculo de progresso e pelo upsert de documentos.
pub fn is_security_verification(document_name: &str) -> bool {
    normalize_name(document_name).contains(SECURITY_VERIFICATION_TOKEN)
}

/// Formato `local@dominio.tld`: e-mail válido para o `validator` e domínio
/// com pelo menos um ponto, sem rótulos vazios entre os pontos.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case_and_accents() {
        assert!(is_security_verification("Verificaciones De Seguridad"));
        assert!(is_security_verification("verificaciones de seguridad"));
        assert!(is_security_verification("VERIFICACIONES DE SEGURIDAD"));
        assert!(is_security_verification("  Verificaciónes de Segurídad  "));
    }

    #[test]
    fn matching_is_a_substring_match() {
        assert!(is_security_verification("Anexo: Verificaciones de seguridad (listas)"));
        assert!(!is_security_verification("Certificación bancaria"));
        assert!(!is_security_verification("Verificación de seguridad"));
    }

    #[test]
    fn normalize_strips_diacritics() {
        assert_eq!(normalize_name(" Cámara de Comercio "), "camara de comercio");
        assert_eq!(normalize_name("ÑANDÚ"), "nandu");
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("compras@empresa.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("sem@dominio"));
        assert!(!is_valid_email("@empresa.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@empresa."));
        assert!(!is_valid_email("a b@empresa.com"));
        assert!(!is_valid_email("a@b@empresa.com"));
    }

    #[test]
    fn email_domain_labels_cannot_be_empty() {
        for malformed in ["a@..com", "a@b..com", "a@b.com.", "a@b.c."] {
            assert!(!is_valid_email(malformed), "{malformed}");
        }
        assert!(is_valid_email("ana.ruiz@mail.empresa.com.co"));
    }
}
