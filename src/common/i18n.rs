// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

pub const DEFAULT_LANG: &str = "pt";
pub const SUPPORTED_LANGS: &[&str] = &["pt", "en"];

// Catálogos embutidos no binário
const CATALOGS: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

#[derive(Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Idioma pedido, depois o padrão, depois a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        [lang, DEFAULT_LANG]
            .iter()
            .find_map(|l| self.catalogs.get(*l).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogos_tem_as_mesmas_chaves() {
        let store = I18nStore::load().expect("catálogos embutidos");
        let pt = &store.catalogs["pt"];
        let en = &store.catalogs["en"];
        let mut faltando: Vec<&String> = pt.keys().filter(|k| !en.contains_key(*k)).collect();
        faltando.extend(en.keys().filter(|k| !pt.contains_key(*k)));
        assert!(faltando.is_empty(), "chaves sem tradução: {:?}", faltando);
    }

    #[test]
    fn idioma_desconhecido_cai_no_padrao() {
        let store = I18nStore::load().expect("catálogos embutidos");
        assert_eq!(store.translate("fr", "forbidden"), store.translate("pt", "forbidden"));
    }

    #[test]
    fn chave_desconhecida_volta_como_esta() {
        let store = I18nStore::load().expect("catálogos embutidos");
        assert_eq!(store.translate("en", "nao_existe"), "nao_existe");
    }
}
