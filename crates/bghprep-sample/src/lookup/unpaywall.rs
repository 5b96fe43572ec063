//! Unpaywall v2 metadata client

use bghprep_core::{LookupError, get_text};
use serde_json::Value;

use super::{MetadataLookup, MetadataRecord};

pub const DEFAULT_UNPAYWALL_URL: &str = "https://api.unpaywall.org/v2";

/// Blocking client for `GET {base}/{doi}?email={email}`.
#[derive(Debug, Clone)]
pub struct UnpaywallClient {
    base_url: String,
    email: String,
}

impl UnpaywallClient {
    pub fn new(base_url: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
        }
    }

    fn url_for(&self, doi: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), escape_doi(doi))
    }
}

impl MetadataLookup for UnpaywallClient {
    fn lookup(&self, doi: &str) -> Result<Option<MetadataRecord>, LookupError> {
        let response = get_text(&self.url_for(doi), &[("email", self.email.as_str())])?;
        let record = parse_record(&response.body);
        if record.is_none() {
            log::debug!("unpaywall: no record for {doi} (HTTP {})", response.status);
        }
        Ok(record)
    }
}

/// Parse an Unpaywall body.
///
/// Objects with an `error` key (the service's not-found shape) and bodies
/// that are not JSON objects (gateway error pages) both mean "no metadata".
pub fn parse_record(body: &str) -> Option<MetadataRecord> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) if !map.contains_key("error") => Some(map),
        Ok(_) => None,
        Err(e) => {
            log::debug!("unpaywall: unparseable body: {e}");
            None
        }
    }
}

/// Escape the few characters that would end the URL path early.
///
/// DOIs keep their `/` separators; Unpaywall expects them unescaped.
fn escape_doi(doi: &str) -> String {
    let mut out = String::with_capacity(doi.len());
    for c in doi.trim().chars() {
        match c {
            '%' => out.push_str("%25"),
            '?' => out.push_str("%3F"),
            '#' => out.push_str("%23"),
            _ => out.push(c),
        }
    }
    out
}
