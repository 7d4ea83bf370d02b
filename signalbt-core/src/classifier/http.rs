//! HTTP text-classification client.
//!
//! Posts `{"inputs": text, "truncate": true}` and expects a list of
//! `{label, score}` objects, optionally wrapped in a one-element batch.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Classifier, ClassifierError, Prediction, SignalClass};

/// Environment variable consulted when no token is configured.
pub const API_TOKEN_ENV: &str = "SIGNALBT_API_TOKEN";

fn default_endpoint() -> String {
    "http://127.0.0.1:8080/predict".into()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClassifierConfig {
    /// Inference URL; `{model}` is replaced with the model name.
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HttpClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpClassifierConfig {
    pub fn url_for(&self, model_name: &str) -> String {
        self.endpoint.replace("{model}", model_name)
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Blocking client for one model behind one endpoint.
pub struct HttpClassifier {
    client: reqwest::blocking::Client,
    url: String,
    model_name: String,
    api_token: Option<String>,
}

impl HttpClassifier {
    pub fn new(model_name: &str, config: &HttpClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_token = config
            .api_token
            .clone()
            .or_else(|| std::env::var(API_TOKEN_ENV).ok())
            .filter(|t| !t.is_empty());

        Ok(Self {
            client,
            url: config.url_for(model_name),
            model_name: model_name.to_string(),
            api_token,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Classifier for HttpClassifier {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let mut request = self.client.post(&self.url).json(&ClassifyRequest {
            inputs: text,
            truncate: true,
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let prediction = parse_scores(&body)?;
        debug!(
            model = %self.model_name,
            class = ?prediction.class,
            confidence = prediction.confidence,
            "classified"
        );
        Ok(prediction)
    }
}

/// Map a server label onto a class.
pub fn label_class(label: &str) -> Result<SignalClass, ClassifierError> {
    match label.to_ascii_lowercase().as_str() {
        "label_0" | "down" | "negative" => Ok(SignalClass::Down),
        "label_1" | "neutral" => Ok(SignalClass::Neutral),
        "label_2" | "up" | "positive" => Ok(SignalClass::Up),
        _ => Err(ClassifierError::UnknownLabel(label.to_string())),
    }
}

/// Parse a response body into a prediction. Classes the server omits score 0.
pub fn parse_scores(body: &str) -> Result<Prediction, ClassifierError> {
    let parsed: ClassifyResponse =
        serde_json::from_str(body).map_err(|e| ClassifierError::Response(e.to_string()))?;
    let scores = match parsed {
        ClassifyResponse::Flat(scores) => scores,
        ClassifyResponse::Nested(mut batch) => {
            if batch.len() != 1 {
                return Err(ClassifierError::Response(format!(
                    "expected a batch of one, got {}",
                    batch.len()
                )));
            }
            batch.swap_remove(0)
        }
    };
    if scores.is_empty() {
        return Err(ClassifierError::Response("no label scores".into()));
    }

    let mut distribution = [0.0; 3];
    for LabelScore { label, score } in scores {
        distribution[label_class(&label)?.index()] = score;
    }
    Prediction::from_probabilities(distribution)
}
