//! REDCap API client.
//!
//! REDCap exposes a single form-encoded POST endpoint at `{url}/api/`; the
//! `content` and `action` parameters select the operation.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use cadasil_model::RawRecord;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::snapshot::Origin;
use crate::source::{RecordSource, rows_from_json};

const SERVICE: &str = "REDCap";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Values shipped in sample environment files; treated as unset.
const PLACEHOLDER_URL: &str = "your_redcap_url";
const PLACEHOLDER_TOKEN: &str = "your_redcap_api_token";

type Form = Vec<(&'static str, String)>;

/// REDCap endpoint and API token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedcapSettings {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl RedcapSettings {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            token: Some(token.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let url = usable(self.url.as_deref(), PLACEHOLDER_URL)
            .ok_or_else(|| not_configured("API URL is missing"))?;
        let token = usable(self.token.as_deref(), PLACEHOLDER_TOKEN)
            .ok_or_else(|| not_configured("API token is missing"))?;
        Ok((url, token))
    }
}

impl fmt::Debug for RedcapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedcapSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn usable<'a>(value: Option<&'a str>, placeholder: &str) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != placeholder)
}

fn not_configured(reason: &str) -> IngestError {
    IngestError::NotConfigured {
        service: SERVICE,
        reason: reason.to_string(),
    }
}

/// One data-dictionary entry from a metadata export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedcapField {
    pub field_name: String,
    #[serde(default)]
    pub form_name: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default)]
    pub field_label: String,
    #[serde(default)]
    pub select_choices_or_calculations: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RedcapField {
    /// Coded choices of a radio, dropdown or checkbox field.
    ///
    /// REDCap encodes them as `"1, Masculino | 2, Femenino"`.
    pub fn choices(&self) -> Vec<(String, String)> {
        if !matches!(
            self.field_type.as_str(),
            "radio" | "dropdown" | "checkbox" | "yesno"
        ) {
            return Vec::new();
        }
        self.select_choices_or_calculations
            .split('|')
            .filter_map(|choice| {
                let (code, label) = choice.split_once(',')?;
                Some((code.trim().to_string(), label.trim().to_string()))
            })
            .collect()
    }
}

/// Client for a REDCap project.
pub struct RedcapClient {
    client: Client,
    settings: RedcapSettings,
}

impl RedcapClient {
    pub fn new(settings: RedcapSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(network)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &RedcapSettings {
        &self.settings
    }

    /// Exports flat records in raw coded form, optionally a single record.
    pub fn export_records(&self, record_id: Option<&str>) -> Result<Vec<RawRecord>> {
        let (_, token) = self.settings.credentials()?;
        let body = self.post(&export_records_form(token, record_id))?;
        let rows = rows_from_json(body, SERVICE)?;
        info!(records = rows.len(), "exported REDCap records");
        Ok(rows)
    }

    /// Exports the project's data dictionary.
    pub fn export_metadata(&self) -> Result<Vec<RedcapField>> {
        let (_, token) = self.settings.credentials()?;
        let body = self.post(&metadata_form(token))?;
        serde_json::from_value(body).map_err(|error| decode(&error))
    }

    /// Imports records, returning the number REDCap reports as saved.
    pub fn import_records(&self, records: &[RawRecord]) -> Result<usize> {
        let (_, token) = self.settings.credentials()?;
        let data = serde_json::to_string(records).map_err(|error| decode(&error))?;
        let body = self.post(&import_form(token, data))?;
        imported_count(&body)
    }

    fn post(&self, form: &[(&'static str, String)]) -> Result<Value> {
        let (url, _) = self.settings.credentials()?;
        let endpoint = api_endpoint(url);
        let content = form
            .iter()
            .find(|(name, _)| *name == "content")
            .map_or("", |(_, value)| value.as_str());
        debug!(endpoint, content, "sending REDCap API request");

        let response = self
            .client
            .post(&endpoint)
            .form(form)
            .send()
            .map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IngestError::Http {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }
        response.json().map_err(network)
    }
}

impl RecordSource for RedcapClient {
    fn name(&self) -> &'static str {
        "redcap"
    }

    fn origin(&self) -> Origin {
        Origin::Redcap
    }

    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        self.export_records(None)
    }
}

fn api_endpoint(url: &str) -> String {
    format!("{}/api/", url.trim_end_matches('/'))
}

fn export_records_form(token: &str, record_id: Option<&str>) -> Form {
    let mut form: Form = vec![
        ("token", token.to_string()),
        ("content", "record".to_string()),
        ("action", "export".to_string()),
        ("format", "json".to_string()),
        ("type", "flat".to_string()),
        ("rawOrLabel", "raw".to_string()),
        ("rawOrLabelHeaders", "raw".to_string()),
        ("exportCheckboxLabel", "false".to_string()),
        ("exportSurveyFields", "false".to_string()),
        ("exportDataAccessGroups", "false".to_string()),
        ("returnFormat", "json".to_string()),
    ];
    if let Some(id) = record_id {
        form.push(("records[0]", id.to_string()));
    }
    form
}

fn metadata_form(token: &str) -> Form {
    vec![
        ("token", token.to_string()),
        ("content", "metadata".to_string()),
        ("format", "json".to_string()),
        ("returnFormat", "json".to_string()),
    ]
}

fn import_form(token: &str, data: String) -> Form {
    vec![
        ("token", token.to_string()),
        ("content", "record".to_string()),
        ("action", "import".to_string()),
        ("format", "json".to_string()),
        ("type", "flat".to_string()),
        ("overwriteBehavior", "normal".to_string()),
        ("forceAutoNumber", "false".to_string()),
        ("data", data),
        ("returnContent", "count".to_string()),
        ("returnFormat", "json".to_string()),
    ]
}

fn imported_count(body: &Value) -> Result<usize> {
    let count = body.get("count").and_then(|count| match count {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    });
    count
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| IngestError::Decode {
            service: SERVICE,
            message: format!("import response has no count: {body}"),
        })
}

fn network(error: reqwest::Error) -> IngestError {
    if error.is_decode() {
        return decode(&error);
    }
    IngestError::Network {
        service: SERVICE,
        message: error.to_string(),
    }
}

fn decode(error: &dyn std::error::Error) -> IngestError {
    IngestError::Decode {
        service: SERVICE,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn param<'a>(form: &'a Form, name: &str) -> Option<&'a str> {
        form.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn export_form_requests_raw_flat_records() {
        let form = export_records_form("abc", None);
        assert_eq!(param(&form, "content"), Some("record"));
        assert_eq!(param(&form, "action"), Some("export"));
        assert_eq!(param(&form, "type"), Some("flat"));
        assert_eq!(param(&form, "rawOrLabel"), Some("raw"));
        assert_eq!(param(&form, "exportCheckboxLabel"), Some("false"));
        assert_eq!(param(&form, "records[0]"), None);

        let single = export_records_form("abc", Some("12"));
        assert_eq!(param(&single, "records[0]"), Some("12"));
    }

    #[test]
    fn import_form_overwrites_normally_and_counts() {
        let form = import_form("abc", "[]".to_string());
        assert_eq!(param(&form, "action"), Some("import"));
        assert_eq!(param(&form, "overwriteBehavior"), Some("normal"));
        assert_eq!(param(&form, "forceAutoNumber"), Some("false"));
        assert_eq!(param(&form, "returnContent"), Some("count"));
        assert_eq!(param(&form, "data"), Some("[]"));
    }

    #[test]
    fn placeholders_count_as_unconfigured() {
        assert!(!RedcapSettings::default().is_configured());
        assert!(!RedcapSettings::new("your_redcap_url", "real-token").is_configured());
        assert!(!RedcapSettings::new("https://redcap.example.org", "your_redcap_api_token").is_configured());
        assert!(!RedcapSettings::new("https://redcap.example.org", "  ").is_configured());
        assert!(RedcapSettings::new("https://redcap.example.org", "real-token").is_configured());
    }

    #[test]
    fn unconfigured_client_fails_without_network() {
        let client = RedcapClient::new(RedcapSettings::default()).unwrap();
        let err = client.export_records(None).unwrap_err();
        assert!(matches!(err, IngestError::NotConfigured { service: "REDCap", .. }));
    }

    #[test]
    fn debug_output_hides_token() {
        let settings = RedcapSettings::new("https://redcap.example.org", "secret-token");
        let debug = format!("{settings:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn endpoint_appends_api_path() {
        assert_eq!(api_endpoint("https://redcap.example.org/"), "https://redcap.example.org/api/");
        assert_eq!(api_endpoint("https://redcap.example.org"), "https://redcap.example.org/api/");
    }

    #[test]
    fn import_count_accepts_number_or_text() {
        assert_eq!(imported_count(&json!({"count": 2})).unwrap(), 2);
        assert_eq!(imported_count(&json!({"count": "3"})).unwrap(), 3);
        assert!(imported_count(&json!({"error": "bad"})).is_err());
    }

    #[test]
    fn field_choices_parse_coded_options() {
        let field: RedcapField = serde_json::from_value(json!({
            "field_name": "sexo",
            "form_name": "datos_demograficos",
            "field_type": "radio",
            "field_label": "Sexo",
            "select_choices_or_calculations": "1, Masculino | 2, Femenino",
            "required_field": "y"
        }))
        .unwrap();
        assert_eq!(
            field.choices(),
            [
                ("1".to_string(), "Masculino".to_string()),
                ("2".to_string(), "Femenino".to_string())
            ]
        );
        assert_eq!(field.extra.get("required_field"), Some(&json!("y")));
    }
}
