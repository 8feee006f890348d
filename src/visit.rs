//! Consent-gated visitor logging, client side.
//!
//! The flow resolves the public IP, then posts a [`VisitorRecord`] to the
//! logging endpoint. Only a transport failure of that post counts; the
//! record then goes to a local fallback list that is never trimmed.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::contact::null_as_empty;
use crate::ui::store::{KeyValueStore, VISITORS_KEY};

pub const IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";
pub const LOG_VISITOR_PATH: &str = "/api/log-visitor";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisitorRecord {
    #[serde(deserialize_with = "null_as_empty")]
    pub ip: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub timestamp: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub user_agent: String,
}

impl VisitorRecord {
    pub fn new(ip: String, at: DateTime<Utc>, url: String, user_agent: String) -> Self {
        Self {
            ip,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            url,
            user_agent,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IpLookupReply {
    pub ip: String,
}

#[derive(Debug, Error)]
pub enum VisitError {
    #[error("ip lookup failed: {0}")]
    Lookup(String),
    #[error("visitor log transport failed: {0}")]
    Transport(String),
}

/// Network side of the visit logger.
#[allow(async_fn_in_trait)]
pub trait VisitTransport {
    async fn lookup_ip(&self) -> Result<String, VisitError>;

    /// Must only fail on transport errors, never on the response status.
    async fn post_record(&self, record: &VisitorRecord) -> Result<(), VisitError>;
}

/// Where the record came from at call time.
pub struct PageContext {
    pub url: String,
    pub user_agent: String,
    pub now: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum VisitOutcome {
    NoConsent,
    Logged(VisitorRecord),
    StoredFallback(VisitorRecord),
    Abandoned(String),
}

pub async fn log_visit<T, S>(
    transport: &T,
    store: &mut S,
    consent_given: bool,
    page: PageContext,
) -> VisitOutcome
where
    T: VisitTransport,
    S: KeyValueStore,
{
    if !consent_given {
        return VisitOutcome::NoConsent;
    }

    let ip = match transport.lookup_ip().await {
        Ok(ip) => ip,
        Err(error) => return VisitOutcome::Abandoned(error.to_string()),
    };

    let record = VisitorRecord::new(ip, page.now, page.url, page.user_agent);

    match transport.post_record(&record).await {
        Ok(()) => VisitOutcome::Logged(record),
        Err(_) => {
            append_fallback(store, &record);
            VisitOutcome::StoredFallback(record)
        }
    }
}

pub fn fallback_records(store: &impl KeyValueStore) -> Vec<VisitorRecord> {
    store
        .get(VISITORS_KEY)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub fn append_fallback(store: &mut impl KeyValueStore, record: &VisitorRecord) {
    let mut records = fallback_records(store);
    records.push(record.clone());

    if let Ok(encoded) = serde_json::to_string(&records) {
        store.set(VISITORS_KEY, &encoded);
    }
}
