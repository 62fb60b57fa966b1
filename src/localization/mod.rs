use fluent_templates::fluent_bundle::FluentValue;
pub use fluent_templates::{LanguageIdentifier, Loader};
use log::*;
use std::borrow::Cow;
use std::collections::HashMap;

pub const DEFAULT_LOCALE: &str = "en-US";

fluent_templates::static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "en-US",
        // console output, no bidi isolation marks around placeables
        customise: |bundle| bundle.set_use_isolating(false),
    };
}

/// Message catalog for one output language.
#[derive(Debug, Clone)]
pub struct Messages {
    language: LanguageIdentifier,
}
impl Messages {
    pub fn for_locale(locale: &str) -> Messages {
        match locale.parse::<LanguageIdentifier>() {
            Ok(language) => Messages { language },
            Err(_) => {
                warn!("Invalid locale {:?}, falling back to {}", locale, DEFAULT_LOCALE);
                Messages::default()
            }
        }
    }

    pub fn lookup(&self, text_id: &str) -> String {
        LOCALES.lookup(&self.language, text_id)
    }

    pub fn lookup_with_args(&self, text_id: &str, args: &HashMap<Cow<'static, str>, FluentValue>) -> String {
        LOCALES.lookup_with_args(&self.language, text_id, args)
    }
}
impl Default for Messages {
    fn default() -> Self {
        Messages { language: fallback_language() }
    }
}

fn fallback_language() -> LanguageIdentifier {
    DEFAULT_LOCALE.parse().unwrap_or_default()
}

macro_rules! localize {
    // Case 1: No arguments provided
    ( $messages:expr, $text_id:expr ) => {{
        $messages.lookup($text_id)
    }};

    // Case 2: One or more arguments provided
    ( $messages:expr, $text_id:expr, $( $arg_name:ident: $arg_value:expr ),* $(,)? ) => {{
        let args = std::collections::HashMap::from_iter([
            $(  // key-value pair (Cow<str>, FluentValue::String)
                (std::borrow::Cow::from(stringify!($arg_name)),
                fluent_templates::fluent_bundle::FluentValue::String($arg_value.to_string().into()))
            ),*
        ]);
        $messages.lookup_with_args($text_id, &args)
    }};
}

pub(crate) use localize;
