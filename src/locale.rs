use serde::{Deserialize, Serialize};

/// Languages the site is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Es,
    Fr,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Es, Locale::Fr];
    pub const DEFAULT: Locale = Locale::En;

    /// Resolve a raw route segment, falling back to [`Locale::DEFAULT`].
    pub fn resolve(segment: &str) -> Self {
        Self::from_code(segment).unwrap_or(Self::DEFAULT)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|locale| locale.code() == code)
    }

    /// Map a CMS language term name ("Spanish", "Español", ...) back to a locale.
    pub fn from_language_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.name() == name || locale.native_name() == name)
    }

    pub const fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::Fr => "fr",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Spanish",
            Locale::Fr => "French",
        }
    }

    pub const fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Español",
            Locale::Fr => "Français",
        }
    }

    pub fn home_path(self) -> String {
        format!("/{}", self.code())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Link target for the language switcher.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocaleLink {
    pub locale: Locale,
    pub native_name: &'static str,
    pub href: String,
    pub active: bool,
}

pub fn switcher_links(current: Locale) -> Vec<LocaleLink> {
    Locale::ALL
        .into_iter()
        .map(|locale| LocaleLink {
            locale,
            native_name: locale.native_name(),
            href: locale.home_path(),
            active: locale == current,
        })
        .collect()
}
