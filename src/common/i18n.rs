// src/common/i18n.rs

use std::collections::HashMap;

// (idioma, chave, mensagem)
const MESSAGES: &[(&str, &str, &str)] = &[
    ("ja", "validation", "入力内容に誤りがあります。"),
    ("ja", "missing_fields", "以下の項目を入力してください。"),
    ("ja", "invalid_input", "入力値が不正です。"),
    ("ja", "invalid_credentials", "ユーザー名またはパスワードが正しくありません。"),
    ("ja", "invalid_token", "認証トークンが無効です。再度ログインしてください。"),
    ("ja", "forbidden", "この操作を行う権限がありません。"),
    ("ja", "not_found", "対象のデータが見つかりません。"),
    ("ja", "conflict", "既に登録されています。"),
    ("ja", "internal", "予期しないエラーが発生しました。"),
    ("en", "validation", "One or more fields are invalid."),
    ("en", "missing_fields", "Please fill in the following fields."),
    ("en", "invalid_input", "Invalid input."),
    ("en", "invalid_credentials", "Invalid username or password."),
    ("en", "invalid_token", "Invalid or missing authentication token."),
    ("en", "forbidden", "You are not allowed to perform this action."),
    ("en", "not_found", "Resource not found."),
    ("en", "conflict", "Already registered."),
    ("en", "internal", "An unexpected error occurred."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub const DEFAULT_LANG: &'static str = "ja";

    pub fn new() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> =
            HashMap::new();
        for (lang, key, msg) in MESSAGES {
            messages.entry(*lang).or_default().insert(*key, *msg);
        }
        Self { messages }
    }

    /// Idioma desconhecido cai no japonês; chave desconhecida volta como está.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        let lookup = |lang: &str| self.messages.get(lang).and_then(|table| table.get(key));
        lookup(lang)
            .or_else(|| lookup(Self::DEFAULT_LANG))
            .map(|m| m.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}
