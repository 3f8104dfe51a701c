// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::I18nStore;

// Extrator de idioma (Accept-Language). Sem cabeçalho, japonês.
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(I18nStore::DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    // "ja-JP" -> "ja"
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_string())
            });

        Ok(lang.map(Locale).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn locale_for(header: Option<&str>) -> String {
        let mut builder = Request::builder();
        if let Some(value) = header {
            builder = builder.header(header::ACCEPT_LANGUAGE, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        let Ok(Locale(lang)) = Locale::from_request_parts(&mut parts, &()).await;
        lang
    }

    #[tokio::test]
    async fn picks_primary_language_or_japanese() {
        assert_eq!(locale_for(Some("en-US,en;q=0.9")).await, "en");
        assert_eq!(locale_for(Some("ja-JP")).await, "ja");
        assert_eq!(locale_for(None).await, "ja");
    }
}
