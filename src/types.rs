/// Wire types shared by the API client and the output layer.
///
/// Every response keeps the JSON exactly as the service sent it; the typed
/// accessors are read-only views over that document. Serializing any of
/// these types writes the original document back unchanged.
///
/// The validation service answers in two historical shapes: a "full" shape
/// carrying `valid`, and a "compact" shape carrying `v`. The shape is
/// decided once, by the presence of `valid`, and every code path that
/// inspects validity goes through [`EmailResult::is_valid`].
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Which field carries validity in an [`EmailResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// `valid`, with `email`, `risk`, `checks` alongside.
    Full,
    /// `v`. Also covers objects with neither field.
    Compact,
}

/// Result of verifying a single address, in either wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailResult {
    shape: ResultShape,
    raw: Value,
}

impl EmailResult {
    /// Classify a decoded document. Never fails; unexpected field types
    /// read as absent.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let shape = if raw.get("valid").is_some() {
            ResultShape::Full
        } else {
            ResultShape::Compact
        };
        Self { shape, raw }
    }

    /// Validity, read from `valid` in the full shape, else from `v`.
    /// Anything but a JSON `true` is invalid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let field = match self.shape {
            ResultShape::Full => "valid",
            ResultShape::Compact => "v",
        };
        self.raw.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Address this result refers to, when the service echoed it back.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.text("email").or_else(|| self.text("e"))
    }

    /// Raw risk classification, if any.
    #[must_use]
    pub fn risk(&self) -> Option<&str> {
        self.text("risk").or_else(|| self.text("r"))
    }

    /// Individual check outcomes keyed by check name (e.g. `mx_record`).
    #[must_use]
    pub fn checks(&self) -> Option<&Map<String, Value>> {
        self.raw.get("checks").and_then(Value::as_object)
    }

    /// Opaque diagnostics returned when `--debug` is requested.
    #[must_use]
    pub fn debug(&self) -> Option<&Value> {
        self.raw.get("debug").filter(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }
}

/// Handle for a submitted asynchronous batch.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptor {
    raw: Value,
}

impl JobDescriptor {
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Job id, or `-` when the service sent none.
    #[must_use]
    pub fn job_id(&self) -> &str {
        self.raw.get("job_id").and_then(Value::as_str).unwrap_or("-")
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.raw.get("status").and_then(Value::as_str)
    }

    #[must_use]
    pub fn webhook_url(&self) -> Option<&str> {
        self.raw.get("webhook_url").and_then(Value::as_str)
    }
}

/// Synchronous batch result: `{ "data": { summary, results, ... } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    raw: Value,
    results: Vec<EmailResult>,
}

impl BatchResult {
    fn from_value(raw: Value) -> Self {
        let results = raw
            .get("data")
            .and_then(|d| d.get("results"))
            .map(decode_results)
            .unwrap_or_default();
        Self { raw, results }
    }

    /// A field of `data`, skipping JSON nulls.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.raw
            .get("data")
            .and_then(|d| d.get(key))
            .filter(|v| !v.is_null())
    }

    /// A count from `data.summary` (`total`, `valid`, `invalid`).
    #[must_use]
    pub fn summary(&self, key: &str) -> Option<&Value> {
        self.field("summary")
            .and_then(|s| s.get(key))
            .filter(|v| !v.is_null())
    }

    #[must_use]
    pub fn results(&self) -> &[EmailResult] {
        &self.results
    }
}

/// Object carrying a top-level `results` array.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultListing {
    raw: Value,
    results: Vec<EmailResult>,
}

/// Response of a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkResponse {
    /// Synchronous batch result wrapped in `data`.
    Batch(BatchResult),
    /// Asynchronous job descriptor.
    Job(JobDescriptor),
    /// Object with a top-level `results` array.
    Listing(ResultListing),
    /// Bare array of per-address results.
    Bare(Vec<EmailResult>),
}

impl BulkResponse {
    /// Classify a decoded document.
    ///
    /// Anything carrying `data` is a synchronous batch, even when a
    /// `job_id` is also present.
    ///
    /// # Errors
    ///
    /// Returns a message when the document matches none of the shapes.
    pub fn from_value(raw: Value) -> Result<Self, String> {
        if let Value::Array(items) = raw {
            return Ok(Self::Bare(items.into_iter().map(EmailResult::from_value).collect()));
        }
        let Some(obj) = raw.as_object() else {
            return Err("bulk response is not a JSON object or array".to_owned());
        };
        if obj.contains_key("data") {
            return Ok(Self::Batch(BatchResult::from_value(raw)));
        }
        if obj.contains_key("job_id") {
            return Ok(Self::Job(JobDescriptor::from_value(raw)));
        }
        if let Some(items) = obj.get("results").filter(|r| r.is_array()) {
            let results = decode_results(items);
            return Ok(Self::Listing(ResultListing { raw, results }));
        }
        Err("bulk response has none of `data`, `job_id` or `results`".to_owned())
    }

    /// Per-address results, empty for job descriptors.
    #[must_use]
    pub fn results(&self) -> &[EmailResult] {
        match self {
            Self::Batch(b) => &b.results,
            Self::Listing(l) => &l.results,
            Self::Bare(v) => v,
            Self::Job(_) => &[],
        }
    }

    /// Number of invalid addresses reported by a synchronous response.
    ///
    /// Counts per-address results; a batch that carries no results falls
    /// back to `summary.invalid`. Job descriptors always count zero.
    #[must_use]
    pub fn invalid_count(&self) -> u64 {
        match self {
            Self::Batch(b) if b.results.is_empty() => {
                b.summary("invalid").map_or(0, count_of)
            }
            _ => self.results().iter().filter(|r| !r.is_valid()).count() as u64,
        }
    }
}

fn decode_results(items: &Value) -> Vec<EmailResult> {
    items
        .as_array()
        .map(|a| a.iter().cloned().map(EmailResult::from_value).collect())
        .unwrap_or_default()
}

/// Read a JSON count; fractional counts round up, negatives read as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_of(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|f| f.max(0.0).ceil() as u64))
        .unwrap_or(0)
}

impl Serialize for EmailResult {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(s)
    }
}

impl<'de> Deserialize<'de> for EmailResult {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Value::deserialize(d).map(Self::from_value)
    }
}

impl Serialize for JobDescriptor {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(s)
    }
}

impl<'de> Deserialize<'de> for JobDescriptor {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Value::deserialize(d).map(Self::from_value)
    }
}

impl Serialize for BulkResponse {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Batch(b) => b.raw.serialize(s),
            Self::Job(j) => j.raw.serialize(s),
            Self::Listing(l) => l.raw.serialize(s),
            Self::Bare(items) => items.serialize(s),
        }
    }
}

impl<'de> Deserialize<'de> for BulkResponse {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Self::from_value(Value::deserialize(d)?).map_err(de::Error::custom)
    }
}

/// Stored configuration as reported by `validkit config` in JSON mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigReport {
    /// Whether any API key is configured.
    pub configured: bool,
    /// Masked key, or null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// `Environment Variable` or the config file path.
    pub config_path: String,
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (snake_case).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Remediation hints shown after the message in text mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl ErrorOutput {
    /// Construct from a `CommandError`.
    #[must_use]
    pub fn from_command_error(err: &crate::validation::CommandError) -> Self {
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
                hints: err.hints(),
            },
        }
    }
}
