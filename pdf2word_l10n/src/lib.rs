use once_cell::sync::Lazy;
use fluent_langneg::negotiate_languages;
use fluent_langneg::NegotiationStrategy;
use fluent_langneg::convert_vec_str_to_langids_lossy;
use unic_langid::LanguageIdentifier;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use gettext::Catalog;

pub const DEFAULT_LANGID: &str = "en";
pub const ENV_VAR_PDF2WORD_LANGID: &str = "PDF2WORD_LANGID";

static CATALOG_PER_LOCALE: Lazy<Mutex<HashMap<String, Catalog>>> = Lazy::new(|| {
    Mutex::new(HashMap::new())
});

/// Language of the current user session, e.g. `zh-CN` or `en-US`.
pub fn sys_locale() -> String {
    let locale = locale_config::Locale::user_default();

    if let Some((_, language_range)) = locale.tags().next() {
        language_range.to_string()
    } else {
        String::from(DEFAULT_LANGID)
    }
}

/// Registers compiled `.mo` catalogs keyed by language id.
///
/// Catalogs that fail to parse are skipped, lookups for those languages
/// fall back to the untranslated message ids.
pub fn load_translations(locale_data: HashMap<&str, &[u8]>) {
    if let Ok(mut ret) = CATALOG_PER_LOCALE.lock() {
        for (locale_id, locale_translation_bytes) in locale_data {
            let reader = Cursor::new(locale_translation_bytes);

            if let Ok(catalog) = gettext::Catalog::parse(reader) {
                ret.insert(locale_id.to_string(), catalog);
            }
        }
    }
}

#[derive(Clone)]
struct GettextTranslations {
    locale: String,
    catalog: Catalog,
}

pub trait Translations: Send + Sync {
    fn langid(&self) -> String;

    fn gettext(&self, msg: &str) -> String;

    fn gettext_fmt(&self, template: &str, params: Vec<&str>) -> String;

    /// Plural lookup, `{0}` in the resolved message is replaced by `n`.
    fn ngettext(&self, msgid: &str, msgid_plural: &str, n: u64) -> String;

    fn clone_box(&self) -> Box<dyn Translations>;
}

impl Clone for Box<dyn Translations> {
    fn clone(&self) -> Box<dyn Translations> {
        self.clone_box()
    }
}

pub fn negotiate_langid(requested_locale: String, keys: Vec<String>) -> String {
    let requested = convert_vec_str_to_langids_lossy(&[requested_locale]);
    let available = convert_vec_str_to_langids_lossy(&keys);
    let default: LanguageIdentifier = LanguageIdentifier::from_bytes(DEFAULT_LANGID.as_bytes()).unwrap_or_default();

    let supported = negotiate_languages(
        &requested,
        &available,
        Some(&default),
        NegotiationStrategy::Matching
    );

    supported
        .first()
        .map(|langid| langid.to_string())
        .unwrap_or_else(|| DEFAULT_LANGID.to_string())
}

pub fn new_translations(requested_locale: String) -> Box<dyn Translations> {
    let catalog_per_langid = match CATALOG_PER_LOCALE.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let keys: Vec<String> = catalog_per_langid.keys().cloned().collect();
    let locale = negotiate_langid(requested_locale, keys);
    let catalog = catalog_per_langid
        .get(&locale)
        .cloned()
        .unwrap_or_else(Catalog::empty);

    Box::new(GettextTranslations { locale, catalog })
}

impl Translations for GettextTranslations {
    fn langid(&self) -> String {
        self.locale.clone()
    }

    fn clone_box(&self) -> Box<dyn Translations> {
        Box::new(self.clone())
    }

    fn gettext(&self, msg: &str) -> String {
        self.catalog.gettext(msg).to_string()
    }

    fn gettext_fmt(&self, template: &str, params: Vec<&str>) -> String {
        fill_placeholders(self.catalog.gettext(template), &params)
    }

    fn ngettext(&self, msgid: &str, msgid_plural: &str, n: u64) -> String {
        let count = n.to_string();
        fill_placeholders(self.catalog.ngettext(msgid, msgid_plural, n), &[count.as_str()])
    }
}

/// Replaces positional `{N}` markers with `params[N]`.
///
/// `{{` and `}}` produce literal braces. Markers without a matching
/// parameter are kept as is so that a bad translation stays readable.
pub fn fill_placeholders(template: &str, params: &[&str]) -> String {
    let mut ret = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                ret.push('{');
            },
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                ret.push('}');
            },
            '{' => {
                let rest = &template[pos + 1..];

                match rest.find('}') {
                    Some(end) => {
                        let param = rest[..end]
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|idx| params.get(idx));

                        match param {
                            Some(value) => {
                                ret.push_str(value);

                                for _ in 0..=end {
                                    chars.next();
                                }
                            },
                            None => ret.push(c),
                        }
                    },
                    None => ret.push(c),
                }
            },
            _ => ret.push(c),
        }
    }

    ret
}
