use crate::profile::{DBProfile, ServerProfile};
use crate::schema::articles;
use chrono::{DateTime, Utc};
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, DbEnum, Serialize, Deserialize)]
pub enum ArticleStatus {
    #[db_rename = "draft"]
    #[serde(rename = "draft")]
    Draft,
    #[db_rename = "pending_review"]
    #[serde(rename = "pending_review")]
    PendingReview,
    #[db_rename = "Pending AI Verification"]
    #[serde(rename = "Pending AI Verification")]
    PendingAiVerification,
    #[db_rename = "Published"]
    #[serde(rename = "Published")]
    Published,
    #[db_rename = "Rejected"]
    #[serde(rename = "Rejected")]
    Rejected,
    #[db_rename = "Rejected - AI"]
    #[serde(rename = "Rejected - AI")]
    RejectedAi,
}

impl ArticleStatus {
    /// Owners may only flip an article between published and pending review.
    pub fn owner_toggle_allowed(from: ArticleStatus, to: ArticleStatus) -> bool {
        matches!(
            (from, to),
            (ArticleStatus::Published, ArticleStatus::PendingReview)
                | (ArticleStatus::PendingReview, ArticleStatus::Published)
        )
    }

    /// Admins override to published or rejected only.
    pub fn admin_override_allowed(to: ArticleStatus) -> bool {
        matches!(to, ArticleStatus::Published | ArticleStatus::Rejected)
    }

    /// Parses the client-facing status string (the same names the API
    /// serializes).
    pub fn parse(value: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(value.into())).ok()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, DbEnum, Serialize, Deserialize)]
pub enum ArticleType {
    #[db_rename = "Factual"]
    #[serde(rename = "Factual")]
    Factual,
    #[db_rename = "Reporting/Rumor"]
    #[serde(rename = "Reporting/Rumor")]
    ReportingRumor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Url,
    Pdf,
}

/// One supporting source attached to a factual article.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Identifiable, Queryable, Debug, Serialize, Associations)]
#[belongs_to(DBProfile, foreign_key = "author_id")]
#[table_name = "articles"]
pub struct DBArticle {
    pub id: i32,
    pub headline: String,
    pub content: String,
    pub excerpt: String,
    pub category: String,
    pub slug: String,
    pub status: ArticleStatus,
    pub article_type: ArticleType,
    pub sources: serde_json::Value,
    pub trust_score: Option<i32>,
    pub analysis_result: Option<serde_json::Value>,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

/// What the client receives when they request an article.
#[derive(Serialize, Debug)]
pub struct ServerArticle {
    pub id: i32,
    pub headline: String,
    pub content: String,
    pub excerpt: String,
    pub category: String,
    pub slug: String,
    pub status: ArticleStatus,
    pub article_type: ArticleType,
    pub sources: serde_json::Value,
    pub trust_score: Option<i32>,
    pub analysis_result: Option<serde_json::Value>,
    pub author: ServerProfile,
    pub created_at: DateTime<Utc>,
}

impl ServerArticle {
    pub fn new(article: DBArticle, author: DBProfile) -> Self {
        ServerArticle {
            id: article.id,
            headline: article.headline,
            content: article.content,
            excerpt: article.excerpt,
            category: article.category,
            slug: article.slug,
            status: article.status,
            article_type: article.article_type,
            sources: article.sources,
            trust_score: article.trust_score,
            analysis_result: article.analysis_result,
            author: ServerProfile::new(author),
            created_at: article.created_at,
        }
    }
}

/// What the client sends when they post an article.
#[derive(Deserialize, Debug)]
pub struct ClientArticle<'a> {
    pub headline: &'a str,
    pub content: &'a str,
    pub excerpt: &'a str,
    pub category: &'a str,
    pub article_type: ArticleType,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub draft: bool,
}

/// What the client sends when they change an article's status.
#[derive(Deserialize, Debug)]
pub struct ClientStatusUpdate {
    pub status: ArticleStatus,
}

/// What the client sends when they edit an article.
#[derive(Deserialize, Debug)]
pub struct ClientArticleUpdate<'a> {
    pub headline: &'a str,
    pub content: &'a str,
    pub excerpt: &'a str,
    pub category: &'a str,
    #[serde(default)]
    pub sources: Vec<Source>,
}

impl<'a> ClientArticle<'a> {
    /// Status a new submission starts in. Factual articles may not leave
    /// draft state without at least one source.
    pub fn initial_status(&self) -> Result<ArticleStatus, &'static str> {
        if self.draft {
            return Ok(ArticleStatus::Draft);
        }
        match self.article_type {
            ArticleType::ReportingRumor => Ok(ArticleStatus::Published),
            ArticleType::Factual => {
                if self.sources.is_empty() {
                    Err("Factual articles require at least one source.")
                } else {
                    Ok(ArticleStatus::PendingAiVerification)
                }
            }
        }
    }
}

lazy_static::lazy_static! {
    static ref SLUG_INVALID: regex::Regex = regex::Regex::new("[^a-z0-9-]").unwrap();
    static ref SLUG_DASHES: regex::Regex = regex::Regex::new("-{2,}").unwrap();
}

pub fn slugify(headline: &str) -> String {
    let mut slug = headline.trim().replace(' ', "-");
    slug.make_ascii_lowercase();
    let slug = SLUG_INVALID.replace_all(&slug, "");
    SLUG_DASHES
        .replace_all(&slug, "-")
        .trim_matches('-')
        .to_string()
}

/// Disambiguates a slug that already exists in the articles table.
pub fn with_collision_suffix(slug: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", slug, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Mayor Announces New Budget"), "mayor-announces-new-budget");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("Breaking: City Hall on Fire!?"), "breaking-city-hall-on-fire");
        assert_eq!(slugify("  Spaced   out  headline  "), "spaced-out-headline");
    }

    #[test]
    fn slugify_collapses_dash_runs() {
        assert_eq!(slugify("Taxes - up 5% again"), "taxes-up-5-again");
    }

    #[test]
    fn collision_suffix_preserves_base() {
        let suffixed = with_collision_suffix("city-hall-fire");
        assert!(suffixed.starts_with("city-hall-fire-"));
        assert_eq!(suffixed.len(), "city-hall-fire-".len() + 8);
    }

    #[test]
    fn reporting_articles_publish_immediately() {
        let article = ClientArticle {
            headline: "h",
            content: "c",
            excerpt: "e",
            category: "Politics",
            article_type: ArticleType::ReportingRumor,
            sources: vec![],
            draft: false,
        };
        assert_eq!(article.initial_status(), Ok(ArticleStatus::Published));
    }

    #[test]
    fn factual_articles_need_a_source() {
        let mut article = ClientArticle {
            headline: "h",
            content: "c",
            excerpt: "e",
            category: "Politics",
            article_type: ArticleType::Factual,
            sources: vec![],
            draft: false,
        };
        assert!(article.initial_status().is_err());

        article.sources.push(Source {
            source_type: SourceType::Url,
            value: "https://example.com/report".into(),
            name: None,
        });
        assert_eq!(
            article.initial_status(),
            Ok(ArticleStatus::PendingAiVerification)
        );
    }

    #[test]
    fn sourceless_factual_draft_is_allowed() {
        let article = ClientArticle {
            headline: "h",
            content: "c",
            excerpt: "e",
            category: "Politics",
            article_type: ArticleType::Factual,
            sources: vec![],
            draft: true,
        };
        assert_eq!(article.initial_status(), Ok(ArticleStatus::Draft));
    }

    #[test]
    fn owner_toggle_is_a_two_way_gate() {
        use ArticleStatus::*;
        assert!(ArticleStatus::owner_toggle_allowed(Published, PendingReview));
        assert!(ArticleStatus::owner_toggle_allowed(PendingReview, Published));
        assert!(!ArticleStatus::owner_toggle_allowed(Draft, Published));
        assert!(!ArticleStatus::owner_toggle_allowed(RejectedAi, Published));
        assert!(!ArticleStatus::owner_toggle_allowed(Published, Rejected));
    }

    #[test]
    fn admin_overrides_limited_to_published_and_rejected() {
        use ArticleStatus::*;
        assert!(ArticleStatus::admin_override_allowed(Published));
        assert!(ArticleStatus::admin_override_allowed(Rejected));
        assert!(!ArticleStatus::admin_override_allowed(Draft));
        assert!(!ArticleStatus::admin_override_allowed(RejectedAi));
    }

    #[test]
    fn status_parses_its_own_serialized_names() {
        assert_eq!(
            ArticleStatus::parse("Pending AI Verification"),
            Some(ArticleStatus::PendingAiVerification)
        );
        assert_eq!(ArticleStatus::parse("draft"), Some(ArticleStatus::Draft));
        assert_eq!(ArticleStatus::parse("Rejected - AI"), Some(ArticleStatus::RejectedAi));
        assert_eq!(ArticleStatus::parse("bogus"), None);
    }

    #[test]
    fn status_serializes_with_display_names() {
        let json = serde_json::to_string(&ArticleStatus::PendingAiVerification).unwrap();
        assert_eq!(json, "\"Pending AI Verification\"");
        let json = serde_json::to_string(&ArticleStatus::RejectedAi).unwrap();
        assert_eq!(json, "\"Rejected - AI\"");
    }

    #[test]
    fn source_accepts_missing_name() {
        let source: Source =
            serde_json::from_str(r#"{"type": "url", "value": "https://example.com"}"#).unwrap();
        assert_eq!(source.source_type, SourceType::Url);
        assert!(source.name.is_none());

        let source: Source =
            serde_json::from_str(r#"{"type": "pdf", "value": "report.pdf", "name": "Report"}"#)
                .unwrap();
        assert_eq!(source.source_type, SourceType::Pdf);
        assert_eq!(source.name.as_deref(), Some("Report"));
    }
}
