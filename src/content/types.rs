use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Processed {
    pub processed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageVariation {
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<ImageVariation>,
}

/// Taxonomy term the CMS attaches to each article to mark its language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageTerm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl LanguageTerm {
    pub fn matches(&self, locale: Locale) -> bool {
        self.code.as_deref() == Some(locale.code())
            || self
                .name
                .as_deref()
                .and_then(Locale::from_language_name)
                .is_some_and(|named| named == locale)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Langcode {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub path: String,
    pub langcode: Langcode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langcode: Option<Langcode>,
    #[serde(default)]
    pub created: Timestamp,
    #[serde(default)]
    pub changed: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Processed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Processed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Vec<LanguageTerm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<Translation>>,
}

const EXCERPT_LENGTH: usize = 160;

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static pattern"))
}

impl Article {
    pub fn languages(&self) -> &[LanguageTerm] {
        self.language.as_deref().unwrap_or_default()
    }

    pub fn translations(&self) -> &[Translation] {
        self.translations.as_deref().unwrap_or_default()
    }

    /// Whether the article is published in `locale`, judged by its language
    /// terms. Articles without terms fall back to their `langcode`.
    pub fn is_in(&self, locale: Locale) -> bool {
        match self.languages() {
            [] => self
                .langcode
                .as_ref()
                .is_some_and(|langcode| langcode.id == locale.code()),
            terms => terms.iter().any(|term| term.matches(locale)),
        }
    }

    /// Plain-text summary truncated to `max` characters.
    pub fn excerpt(&self, max: usize) -> Option<String> {
        let summary = self.summary.as_ref()?;
        let text = tag_pattern().replace_all(&summary.processed, "");
        Some(text.trim().chars().take(max).collect())
    }

    pub fn description(&self) -> Option<String> {
        self.excerpt(EXCERPT_LENGTH)
    }

    /// Hero image URL, forced onto https.
    pub fn hero_image_url(&self) -> Option<String> {
        self.image.as_ref().map(|image| match image.url.strip_prefix("http:") {
            Some(rest) => format!("https:{rest}"),
            None => image.url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_with_terms(terms: Vec<LanguageTerm>) -> Article {
        Article {
            path: "/es/noticia".to_string(),
            language: Some(terms),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_in_by_code_and_name() {
        let by_code = article_with_terms(vec![LanguageTerm {
            code: Some("es".to_string()),
            ..Default::default()
        }]);
        assert!(by_code.is_in(Locale::Es));
        assert!(!by_code.is_in(Locale::En));

        let by_name = article_with_terms(vec![LanguageTerm {
            name: Some("Español".to_string()),
            ..Default::default()
        }]);
        assert!(by_name.is_in(Locale::Es));
        assert!(!by_name.is_in(Locale::Fr));
    }

    #[test]
    fn test_is_in_without_terms() {
        let mut article = Article::default();
        assert!(!article.is_in(Locale::En));

        article.langcode = Some(Langcode { id: "fr".to_string() });
        assert!(article.is_in(Locale::Fr));
    }

    #[test]
    fn test_excerpt_strips_markup() {
        let article = Article {
            summary: Some(Processed {
                processed: "<p>Markets <strong>rally</strong> again</p>".to_string(),
            }),
            ..Default::default()
        };

        assert_eq!(article.description().as_deref(), Some("Markets rally again"));
        assert_eq!(article.excerpt(7).as_deref(), Some("Markets"));
        assert_eq!(Article::default().description(), None);
    }

    #[test]
    fn test_hero_image_url_upgrades_scheme() {
        let mut article = Article {
            image: Some(Image {
                url: "http://cms.example.com/a.jpg".to_string(),
                alt: None,
                width: None,
                height: None,
                variations: Vec::new(),
            }),
            ..Default::default()
        };
        assert_eq!(
            article.hero_image_url().as_deref(),
            Some("https://cms.example.com/a.jpg")
        );

        article.image.as_mut().unwrap().url = "https://cdn.example.com/b.jpg".to_string();
        assert_eq!(
            article.hero_image_url().as_deref(),
            Some("https://cdn.example.com/b.jpg")
        );
    }

    #[test]
    fn test_deserialize_sparse_article() {
        let article: Article = serde_json::from_str(
            r#"{"path": "/en/sample", "language": [{"code": "en"}], "__typename": "NodeNewsArticle"}"#,
        )
        .unwrap();

        assert_eq!(article.path, "/en/sample");
        assert_eq!(article.created.timestamp, 0);
        assert!(article.is_in(Locale::En));
    }
}
