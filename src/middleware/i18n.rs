// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::{DEFAULT_LANG, SUPPORTED_LANGS};

// Idioma das mensagens de erro, vindo do Accept-Language
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma suportado do cabeçalho ("pt-BR" conta como "pt").
    pub fn from_header(header_value: Option<&str>) -> Self {
        let lang = header_value
            .map(accept_language::parse)
            .unwrap_or_default()
            .iter()
            .filter_map(|tag| tag.split('-').next())
            .map(str::to_ascii_lowercase)
            .find(|lang| SUPPORTED_LANGS.contains(&lang.as_str()))
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regiao_e_descartada() {
        assert_eq!(Locale::from_header(Some("en-US,en;q=0.9")).0, "en");
    }

    #[test]
    fn pula_idiomas_nao_suportados() {
        assert_eq!(Locale::from_header(Some("fr-FR, en;q=0.5")).0, "en");
    }

    #[test]
    fn sem_cabecalho_usa_portugues() {
        assert_eq!(Locale::from_header(None).0, "pt");
        assert_eq!(Locale::from_header(Some("de")).0, "pt");
    }
}
