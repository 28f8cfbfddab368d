//! External language-model providers that narrate an analysis digest.
//!
//! Each provider owns its wire format end to end; the rest of the pipeline
//! only sees the [`Analyzer`] trait. Provider selection happens once, by
//! name, when the capability is constructed — never inside business logic.

use std::time::Duration;

use log::debug;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{
    credentials::{Credential, CredentialStore},
    insight::{AnalysisDigest, Insight},
};

pub const DEFAULT_PROVIDER: &str = "openai";
pub const PROVIDERS: &[&str] = &["openai", "baidu"];

/// Upper bound for any single provider request. A hung call must not stall
/// the whole analysis.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4";
const OPENAI_MAX_TOKENS: u32 = 1500;
const OPENAI_TEMPERATURE: f64 = 0.7;

const BAIDU_ANALYSIS_ENDPOINT: &str = "https://aip.baidubce.com/rpc/2.0/ai/v1/analysis";
const BAIDU_TOKEN_ENDPOINT: &str = "https://aip.baidubce.com/oauth/2.0/token";

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("unknown analyzer provider '{name}' (expected one of: openai, baidu)")]
    UnknownProvider { name: String },
    #[error("provider '{provider}' has no usable credential")]
    MissingCredential { provider: &'static str },
    #[error("request to '{provider}' failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("'{provider}' returned HTTP {status}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("unexpected '{provider}' response: {reason}")]
    Response {
        provider: &'static str,
        reason: String,
    },
}

pub trait Analyzer {
    fn name(&self) -> &'static str;

    /// Whether the provider holds a credential worth calling with.
    fn is_configured(&self) -> bool;

    fn analyze(&self, digest: &AnalysisDigest) -> Result<Vec<Insight>, AnalyzerError>;
}

/// Builds the analyzer for a provider name against the given credential
/// store. An unknown name is an error; a known name with no credential yields
/// an analyzer that reports itself unconfigured.
pub fn for_provider(
    name: &str,
    store: &CredentialStore,
) -> Result<Box<dyn Analyzer>, AnalyzerError> {
    match name {
        "openai" => Ok(Box::new(OpenAiAnalyzer::from_store(store)?)),
        "baidu" => Ok(Box::new(BaiduAnalyzer::from_store(store)?)),
        other => Err(AnalyzerError::UnknownProvider {
            name: other.to_string(),
        }),
    }
}

fn build_client(provider: &'static str) -> Result<reqwest::blocking::Client, AnalyzerError> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|source| AnalyzerError::Transport { provider, source })
}

pub struct OpenAiAnalyzer {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
}

impl OpenAiAnalyzer {
    pub fn from_store(store: &CredentialStore) -> Result<Self, AnalyzerError> {
        let api_key = match store.get("openai") {
            Some(Credential::Key(key)) if !key.trim().is_empty() => Some(key.trim().to_string()),
            _ => None,
        };
        Ok(Self {
            client: build_client("openai")?,
            api_key,
        })
    }
}

impl Analyzer for OpenAiAnalyzer {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn analyze(&self, digest: &AnalysisDigest) -> Result<Vec<Insight>, AnalyzerError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AnalyzerError::MissingCredential { provider: "openai" })?;
        let prompt = build_analysis_prompt(digest)?;
        let body = json!({
            "model": OPENAI_MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a professional data analyst skilled at spotting insights and trends in tabular data."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": OPENAI_MAX_TOKENS,
            "temperature": OPENAI_TEMPERATURE,
        });

        debug!(
            "Requesting OpenAI analysis with {} sample row(s)",
            digest.sample_rows.len()
        );
        let response = self
            .client
            .post(OPENAI_ENDPOINT)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|source| AnalyzerError::Transport {
                provider: "openai",
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                provider: "openai",
                status,
            });
        }
        let payload: Value = response.json().map_err(|source| AnalyzerError::Transport {
            provider: "openai",
            source,
        })?;
        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| AnalyzerError::Response {
                provider: "openai",
                reason: "missing message content".to_string(),
            })?;

        let insights = split_paragraphs(content);
        if insights.is_empty() {
            return Err(AnalyzerError::Response {
                provider: "openai",
                reason: "analysis text was empty".to_string(),
            });
        }
        Ok(insights)
    }
}

pub struct BaiduAnalyzer {
    client: reqwest::blocking::Client,
    credential: Option<(String, String)>,
}

impl BaiduAnalyzer {
    pub fn from_store(store: &CredentialStore) -> Result<Self, AnalyzerError> {
        let credential = match store.get("baidu") {
            Some(Credential::Pair {
                client_id,
                client_secret,
            }) if !client_id.trim().is_empty() && !client_secret.trim().is_empty() => Some((
                client_id.trim().to_string(),
                client_secret.trim().to_string(),
            )),
            _ => None,
        };
        Ok(Self {
            client: build_client("baidu")?,
            credential,
        })
    }

    fn fetch_access_token(&self, id: &str, secret: &str) -> Result<String, AnalyzerError> {
        let response = self
            .client
            .post(BAIDU_TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", id),
                ("client_secret", secret),
            ])
            .send()
            .map_err(|source| AnalyzerError::Transport {
                provider: "baidu",
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                provider: "baidu",
                status,
            });
        }
        let payload: Value = response.json().map_err(|source| AnalyzerError::Transport {
            provider: "baidu",
            source,
        })?;
        if let Some(error) = payload.get("error").and_then(Value::as_str) {
            let description = payload
                .get("error_description")
                .and_then(Value::as_str)
                .unwrap_or(error);
            return Err(AnalyzerError::Response {
                provider: "baidu",
                reason: format!("token request rejected: {description}"),
            });
        }
        payload
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AnalyzerError::Response {
                provider: "baidu",
                reason: "token response missing access_token".to_string(),
            })
    }
}

impl Analyzer for BaiduAnalyzer {
    fn name(&self) -> &'static str {
        "baidu"
    }

    fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    fn analyze(&self, digest: &AnalysisDigest) -> Result<Vec<Insight>, AnalyzerError> {
        let (id, secret) = self
            .credential
            .as_ref()
            .ok_or(AnalyzerError::MissingCredential { provider: "baidu" })?;
        let token = self.fetch_access_token(id, secret)?;

        debug!(
            "Requesting Baidu analysis with {} sample row(s)",
            digest.sample_rows.len()
        );
        let response = self
            .client
            .post(BAIDU_ANALYSIS_ENDPOINT)
            .query(&[("access_token", token.as_str())])
            .json(&json!({
                "data": digest,
                "analysis_type": "comprehensive",
            }))
            .send()
            .map_err(|source| AnalyzerError::Transport {
                provider: "baidu",
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                provider: "baidu",
                status,
            });
        }
        let payload: Value = response.json().map_err(|source| AnalyzerError::Transport {
            provider: "baidu",
            source,
        })?;

        match payload.get("insights").and_then(Value::as_array) {
            Some(items) => {
                let insights: Vec<Insight> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(Insight::new)
                    .collect();
                if insights.is_empty() {
                    Ok(vec![completed_without_detail()])
                } else {
                    Ok(insights)
                }
            }
            None => Ok(vec![completed_without_detail()]),
        }
    }
}

fn completed_without_detail() -> Insight {
    Insight::new("The provider completed the analysis but returned no detailed insights.")
}

fn build_analysis_prompt(digest: &AnalysisDigest) -> Result<String, AnalyzerError> {
    let statistics =
        serde_json::to_string_pretty(&digest.statistics).map_err(|err| AnalyzerError::Response {
            provider: "openai",
            reason: format!("serializing statistics: {err}"),
        })?;
    let sample =
        serde_json::to_string_pretty(&digest.sample_rows).map_err(|err| AnalyzerError::Response {
            provider: "openai",
            reason: format!("serializing sample rows: {err}"),
        })?;
    Ok(format!(
        "As a senior data analyst, review the following CSV dataset and provide professional insights.\n\n\
         Overview:\n\
         - total rows: {rows}\n\
         - total columns: {columns}\n\
         - numeric columns: {numeric}\n\
         - column names: {names}\n\n\
         Statistics:\n{statistics}\n\n\
         Sample rows (first {sample_count}):\n{sample}\n\n\
         Please cover: data quality, key insights and trends, potential anomalies, \
         business recommendations, and directions for further analysis. \
         Keep each point to one short paragraph.",
        rows = digest.overview.rows,
        columns = digest.overview.columns,
        numeric = digest.overview.numeric_columns.join(", "),
        names = digest.columns.join(", "),
        sample_count = digest.sample_rows.len(),
    ))
}

fn split_paragraphs(text: &str) -> Vec<Insight> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Insight::new)
        .collect()
}
