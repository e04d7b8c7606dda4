//! Supabase (PostgREST) client for the hosted patient table.

use std::fmt;
use std::time::Duration;

use cadasil_model::RawRecord;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::snapshot::Origin;
use crate::source::{RecordSource, rows_from_json};

const SERVICE: &str = "Supabase";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Table queried when none is configured.
pub const DEFAULT_TABLE: &str = "patients";

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub table: Option<String>,
}

impl SupabaseSettings {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            anon_key: Some(anon_key.into()),
            table: None,
        }
    }

    pub fn table(&self) -> &str {
        self.table
            .as_deref()
            .map(str::trim)
            .filter(|table| !table.is_empty())
            .unwrap_or(DEFAULT_TABLE)
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let url = present(self.url.as_deref()).ok_or_else(|| IngestError::NotConfigured {
            service: SERVICE,
            reason: "project URL is missing".to_string(),
        })?;
        let key = present(self.anon_key.as_deref()).ok_or_else(|| IngestError::NotConfigured {
            service: SERVICE,
            reason: "anon key is missing".to_string(),
        })?;
        Ok((url, key))
    }
}

impl fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field("table", &self.table)
            .finish()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Reads every row of the patient table, newest first.
pub struct SupabaseClient {
    client: Client,
    settings: SupabaseSettings,
}

impl SupabaseClient {
    pub fn new(settings: SupabaseSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(network)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &SupabaseSettings {
        &self.settings
    }

    pub fn fetch_patients(&self) -> Result<Vec<RawRecord>> {
        let (url, key) = self.settings.credentials()?;
        let endpoint = table_endpoint(url, self.settings.table());
        debug!(endpoint, "querying Supabase table");

        let response = self
            .client
            .get(&endpoint)
            .header("apikey", key)
            .bearer_auth(key)
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
        let body = response.json().map_err(network)?;
        let rows = rows_from_json(body, SERVICE)?;
        info!(records = rows.len(), table = self.settings.table(), "fetched Supabase rows");
        Ok(rows)
    }
}

impl RecordSource for SupabaseClient {
    fn name(&self) -> &'static str {
        "supabase"
    }

    fn origin(&self) -> Origin {
        Origin::Supabase
    }

    fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        self.fetch_patients()
    }
}

fn table_endpoint(url: &str, table: &str) -> String {
    format!(
        "{}/rest/v1/{table}?select=*&order=created_at.desc",
        url.trim_end_matches('/')
    )
}

fn network(error: reqwest::Error) -> IngestError {
    if error.is_decode() {
        return IngestError::Decode {
            service: SERVICE,
            message: error.to_string(),
        };
    }
    IngestError::Network {
        service: SERVICE,
        message: error.to_string(),
    }
}
