//! Credibility verification through hosted AI services.
//!
//! The platform never judges an article itself: it assembles a prompt from the
//! submission, sends it to a chat-completion API, and reads a trust-score
//! marker back out of the returned markdown.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::article::Source;

/// Articles at or above this trust score are published; everything below is
/// rejected by the AI track.
pub const PUBLISH_THRESHOLD: i32 = 60;

const RETRY_ATTEMPTS: u32 = 3;

fn chat_api_url() -> String {
    std::env::var("AI_API_URL").unwrap_or_else(|_| "https://api.perplexity.ai".into())
}

pub fn chat_model() -> String {
    std::env::var("AI_MODEL").unwrap_or_else(|_| "sonar-pro".into())
}

fn genai_api_url() -> String {
    std::env::var("GENAI_API_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into())
}

pub fn genai_model() -> String {
    std::env::var("GENAI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".into())
}

/// What the client sends for an ad-hoc (not yet submitted) verification.
#[derive(Deserialize, Debug)]
pub struct ClientVerification<'a> {
    pub headline: &'a str,
    pub content: &'a str,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// What the client receives after a persisted verification run.
#[derive(Serialize, Debug)]
pub struct ServerVerification {
    pub article: crate::article::ServerArticle,
    pub report: CredibilityReport,
}

/// The parsed form of one verification run, persisted to
/// `articles.analysis_result` and returned to the client.
#[derive(Serialize, Deserialize, Debug)]
pub struct CredibilityReport {
    pub trust_score: Option<i32>,
    pub summary: String,
    pub report: String,
    pub model: String,
}

impl CredibilityReport {
    pub fn from_markdown(report: String, model: String) -> Self {
        CredibilityReport {
            trust_score: parse_trust_score(&report),
            summary: extract_summary(&report),
            report,
            model,
        }
    }

    pub fn passes(&self) -> bool {
        matches!(self.trust_score, Some(score) if score >= PUBLISH_THRESHOLD)
    }
}

pub fn build_verification_prompt(headline: &str, content: &str, sources: &[Source]) -> String {
    let mut source_lines = String::new();
    for source in sources {
        let name = source.name.as_deref().unwrap_or("unnamed");
        source_lines.push_str(&format!(
            "- [{:?}] {} ({})\n",
            source.source_type, source.value, name
        ));
    }
    if source_lines.is_empty() {
        source_lines.push_str("- none provided\n");
    }

    format!(
        "You are a fact-checking assistant for a public news platform. \
         Assess the credibility of the article below against its cited sources \
         and your own knowledge.\n\n\
         Headline: {headline}\n\n\
         Article:\n{content}\n\n\
         Cited sources:\n{source_lines}\n\
         Respond in markdown with a short summary paragraph first, then a \
         claim-by-claim analysis and an assessment of each cited source. \
         Finish with one line of the exact form:\n\
         Trust Score: <number between 0 and 100>/100"
    )
}

lazy_static::lazy_static! {
    static ref TRUST_SCORE: regex::Regex =
        regex::Regex::new(r"(?i)trust[ _-]?score[^0-9\n]{0,10}([0-9]{1,3})").unwrap();
}

/// Finds the score marker in whatever shape the model rendered it
/// (`Trust Score: 82/100`, `TRUST_SCORE: 82`, `**Trust Score** - 82`).
pub fn parse_trust_score(markdown: &str) -> Option<i32> {
    let captures = TRUST_SCORE.captures(markdown)?;
    let score: i32 = captures.get(1)?.as_str().parse().ok()?;
    if score > 100 {
        return None;
    }
    Some(score)
}

/// First prose line of the report, used as a teaser in the admin dashboard.
fn extract_summary(markdown: &str) -> String {
    markdown
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("Trust Score"))
        .unwrap_or("")
        .to_string()
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

fn chat_request_body(prompt: &str, stream: bool) -> serde_json::Value {
    serde_json::json!({
        "model": chat_model(),
        "messages": [
            {
                "role": "system",
                "content": "Be precise. Always end with the requested trust score line."
            },
            { "role": "user", "content": prompt }
        ],
        "stream": stream,
    })
}

/// One synchronous chat-completion round trip. Returns the raw markdown body.
pub async fn chat_completion(client: &reqwest::Client, prompt: &str) -> anyhow::Result<String> {
    let api_key = std::env::var("AI_API_KEY").context("AI_API_KEY must be set")?;

    let resp = client
        .post(format!("{}/chat/completions", chat_api_url()))
        .bearer_auth(api_key)
        .json(&chat_request_body(prompt, false))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("chat-completion API returned {}: {}", status, body);
    }

    let parsed: ChatResponse = resp.json().await?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .context("chat-completion API returned no choices")?;
    Ok(choice.message.content)
}

/// Same call with `stream: true`; the caller forwards the body chunks.
pub async fn stream_chat_completion(
    client: &reqwest::Client,
    prompt: &str,
) -> anyhow::Result<reqwest::Response> {
    let api_key = std::env::var("AI_API_KEY").context("AI_API_KEY must be set")?;

    let resp = client
        .post(format!("{}/chat/completions", chat_api_url()))
        .bearer_auth(api_key)
        .json(&chat_request_body(prompt, true))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("chat-completion API returned {}: {}", status, body);
    }

    Ok(resp)
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<GenerateCandidate>,
}

#[derive(Deserialize)]
struct GenerateCandidate {
    content: GenerateContent,
}

#[derive(Deserialize)]
struct GenerateContent {
    parts: Vec<GeneratePart>,
}

#[derive(Deserialize)]
struct GeneratePart {
    text: String,
}

/// Generative-AI fallback endpoint. The service sheds load with 503s, so the
/// call retries up to three times with linear backoff before giving up.
pub async fn generate_with_retry(client: &reqwest::Client, prompt: &str) -> anyhow::Result<String> {
    let api_key = std::env::var("GENAI_API_KEY").context("GENAI_API_KEY must be set")?;
    let url = format!(
        "{}/models/{}:generateContent?key={}",
        genai_api_url(),
        genai_model(),
        api_key
    );
    let body = serde_json::json!({
        "contents": [ { "parts": [ { "text": prompt } ] } ]
    });

    for attempt in 1..=RETRY_ATTEMPTS {
        let resp = client.post(&url).json(&body).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE && attempt < RETRY_ATTEMPTS {
            log::warn!(
                "generative AI overloaded (attempt {}/{}), backing off",
                attempt,
                RETRY_ATTEMPTS
            );
            rocket::tokio::time::sleep(Duration::from_secs(2 * attempt as u64)).await;
            continue;
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("generative AI API returned {}: {}", status, body);
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .context("generative AI API returned no candidates")?
            .text;
        return Ok(text);
    }

    unreachable!("retry loop always returns on the final attempt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::SourceType;

    #[test]
    fn parses_plain_score_marker() {
        assert_eq!(parse_trust_score("Trust Score: 82/100"), Some(82));
        assert_eq!(parse_trust_score("TRUST_SCORE: 7"), Some(7));
    }

    #[test]
    fn parses_markdown_flavored_markers() {
        assert_eq!(parse_trust_score("**Trust Score**: 64/100"), Some(64));
        assert_eq!(parse_trust_score("## Trust score - 100"), Some(100));
    }

    #[test]
    fn finds_marker_inside_a_longer_report() {
        let report = "The claims check out.\n\nSome analysis here.\n\nTrust Score: 91/100\n";
        assert_eq!(parse_trust_score(report), Some(91));
    }

    #[test]
    fn rejects_out_of_range_and_missing_scores() {
        assert_eq!(parse_trust_score("Trust Score: 250/100"), None);
        assert_eq!(parse_trust_score("No marker in this output."), None);
    }

    #[test]
    fn report_passes_at_threshold() {
        let report = CredibilityReport::from_markdown(
            format!("Fine.\n\nTrust Score: {}/100", PUBLISH_THRESHOLD),
            "sonar-pro".into(),
        );
        assert!(report.passes());

        let report = CredibilityReport::from_markdown(
            format!("Shaky.\n\nTrust Score: {}/100", PUBLISH_THRESHOLD - 1),
            "sonar-pro".into(),
        );
        assert!(!report.passes());
    }

    #[test]
    fn report_without_marker_never_passes() {
        let report =
            CredibilityReport::from_markdown("The model rambled instead.".into(), "sonar".into());
        assert_eq!(report.trust_score, None);
        assert!(!report.passes());
    }

    #[test]
    fn summary_skips_headings_and_marker() {
        let report = CredibilityReport::from_markdown(
            "# Credibility Report\n\nThe article overstates its evidence.\n\nTrust Score: 40/100"
                .into(),
            "sonar".into(),
        );
        assert_eq!(report.summary, "The article overstates its evidence.");
    }

    #[test]
    fn prompt_carries_headline_and_sources() {
        let sources = vec![Source {
            source_type: SourceType::Url,
            value: "https://example.com/study".into(),
            name: Some("Example Study".into()),
        }];
        let prompt = build_verification_prompt("Sea levels rising", "Full text.", &sources);
        assert!(prompt.contains("Sea levels rising"));
        assert!(prompt.contains("https://example.com/study"));
        assert!(prompt.contains("Trust Score:"));
    }

    #[test]
    fn prompt_notes_missing_sources() {
        let prompt = build_verification_prompt("h", "c", &[]);
        assert!(prompt.contains("none provided"));
    }
}
