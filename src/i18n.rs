// i18n.rs
//
// Runtime string tables:
// - Built in: assets/i18n.json compiled into the binary ({ "<lang>": { "key": "value" } })
// - Override: assets/i18n/<lang>.json next to the executable or in the working dir
// - Lookup order: selected lang -> fallback "en" -> the key itself
// - tr("key") / tr_with("key", &[("name", "...")]) with {name} placeholders

use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "en";

/// Languages offered in the menu: (code, native name).
pub const LANGUAGES: [(&str, &str); 2] = [("en", "English"), ("zh-Hans", "简体中文")];

const BUILTIN: &str = include_str!("../assets/i18n.json");

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct Catalog {
    langs: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct I18n {
    pub lang: String,
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

impl I18n {
    fn lookup(&self, key: &str) -> String {
        self.map
            .get(key)
            .or_else(|| self.fallback_map.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn builtin(lang: &str) -> HashMap<String, String> {
    match serde_json::from_str::<Catalog>(BUILTIN) {
        Ok(mut c) => c.langs.remove(lang).unwrap_or_default(),
        Err(e) => {
            log::error!("built-in i18n table is malformed: {}", e);
            HashMap::new()
        }
    }
}

fn load_json_map(path: &Path) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(m) => Some(m),
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

/// assets/i18n/<lang>.json, next to the executable first, then the working dir.
fn find_lang_file(lang: &str) -> Option<PathBuf> {
    let file = format!("{}.json", lang);
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::new()))
        .map(|dir| dir.join("assets").join("i18n").join(&file))
        .find(|p| p.exists())
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    let mut map = builtin(lang);
    if let Some(overrides) = find_lang_file(lang).and_then(|p| load_json_map(&p)) {
        map.extend(overrides);
    }
    map
}

/// Initialize global i18n. Later calls switch the language.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let map = load_lang(&lang);
    let fallback_map = if lang == FALLBACK_LANG {
        map.clone()
    } else {
        load_lang(FALLBACK_LANG)
    };

    let i = I18n { lang, map, fallback_map };

    let lock = I18N.get_or_init(|| {
        RwLock::new(I18n {
            lang: String::new(),
            map: HashMap::new(),
            fallback_map: HashMap::new(),
        })
    });
    if let Ok(mut w) = lock.write() {
        *w = i;
    }
}

pub fn current_lang() -> String {
    I18N.get()
        .and_then(|l| l.read().ok().map(|i| i.lang.clone()))
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// Get localized text by key. If key missing, returns key itself.
pub fn tr(key: &str) -> String {
    match I18N.get().and_then(|l| l.read().ok()) {
        Some(i) => i.lookup(key),
        None => key.to_string(),
    }
}

/// Get localized text and substitute `{name}` placeholders.
/// Any placeholder not provided is kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    substitute(tr(key), args)
}

fn substitute(mut s: String, args: &[(&str, String)]) -> String {
    for (k, v) in args {
        let placeholder = format!("{{{}}}", k);
        s = s.replace(&placeholder, v);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_languages_cover_the_same_keys() {
        let en = builtin("en");
        assert!(!en.is_empty());
        for (code, _) in LANGUAGES {
            let other = builtin(code);
            for key in en.keys() {
                assert!(other.contains_key(key), "{code} is missing {key}");
            }
        }
    }

    #[test]
    fn every_view_button_has_a_label() {
        let en = builtin("en");
        for v in crate::view::Viewpoint::ALL {
            assert!(en.contains_key(v.label_key()), "missing {}", v.label_key());
        }
    }

    #[test]
    fn lookup_falls_back_to_english_then_key() {
        let i = I18n {
            lang: "xx".into(),
            map: HashMap::from([("a".to_string(), "local".to_string())]),
            fallback_map: HashMap::from([
                ("a".to_string(), "fallback a".to_string()),
                ("b".to_string(), "fallback b".to_string()),
            ]),
        };
        assert_eq!(i.lookup("a"), "local");
        assert_eq!(i.lookup("b"), "fallback b");
        assert_eq!(i.lookup("c"), "c");
    }

    #[test]
    fn placeholders_are_substituted() {
        let s = substitute("{w}x{h} {missing}".to_string(), &[("w", "4".into()), ("h", "2".into())]);
        assert_eq!(s, "4x2 {missing}");
    }
}
