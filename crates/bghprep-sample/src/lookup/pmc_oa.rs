//! PMC OA web service client
//!
//! `GET oa.fcgi?id={pmcid}&format=pdf` answers with a small XML document:
//!
//! ```text
//! <OA><responseDate>..</responseDate><request id="PMC13901" format="pdf">..</request>
//!   <records returned-count="1" total-count="1">
//!     <record id="PMC13901" citation="..." license="none" retracted="no">
//!       <link format="pdf" updated="..." href="ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/.../x.pdf" />
//!     </record>
//!   </records>
//! </OA>
//! ```
//!
//! or `<OA>..<error code="idIsNotOpenAccess">..</error></OA>`.

use bghprep_core::{LookupError, RetryPolicy, get_text, retry_with_backoff};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::PdfLocator;

pub const DEFAULT_PMC_OA_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/oa/oa.fcgi";

const ENDPOINT: &str = "pmc-oa";

/// Parsed OA service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OaResponse {
    /// The service refused the ID (not open access, unknown, malformed)
    Error { code: String, message: String },
    Records(Vec<OaRecord>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OaRecord {
    pub id: String,
    pub links: Vec<OaLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaLink {
    pub format: String,
    pub href: String,
}

impl OaResponse {
    /// Href of the first link in record order, if the response has one.
    pub fn first_link_href(&self) -> Option<&str> {
        match self {
            Self::Error { .. } => None,
            Self::Records(records) => records
                .iter()
                .flat_map(|r| r.links.iter())
                .map(|l| l.href.as_str())
                .find(|href| !href.is_empty()),
        }
    }
}

/// Blocking OA client with bounded retry on transient failures.
#[derive(Debug, Clone)]
pub struct PmcOaClient {
    base_url: String,
    retry: RetryPolicy,
}

impl PmcOaClient {
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            retry,
        }
    }
}

impl PdfLocator for PmcOaClient {
    fn locate(&self, pmc_id: &str) -> Result<OaResponse, LookupError> {
        let label = format!("{ENDPOINT} {pmc_id}");
        retry_with_backoff(&label, self.retry, || {
            let response =
                get_text(&self.base_url, &[("id", pmc_id), ("format", "pdf")])?.reject_transient()?;
            parse_oa_response(&response.body)
        })
    }
}

/// Parse an OA service body.
pub fn parse_oa_response(xml: &str) -> Result<OaResponse, LookupError> {
    parse(xml).map_err(|message| LookupError::Parse {
        endpoint: ENDPOINT,
        message,
    })
}

fn parse(xml: &str) -> Result<OaResponse, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut saw_root = false;
    let mut error = None;
    let mut records = Vec::new();
    let mut current: Option<OaRecord> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(format!("XML error at byte {}: {e}", reader.buffer_position())),
        };
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"OA" => saw_root = true,
                b"error" => {
                    let code = attr(&e, b"code").unwrap_or_default();
                    let message = reader
                        .read_text(e.name())
                        .map_err(|err| format!("error text: {err}"))?
                        .trim()
                        .to_string();
                    error = Some((code, message));
                }
                b"record" => current = Some(record_from(&e)),
                b"link" => push_link(&mut current, &e),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"OA" => saw_root = true,
                b"error" => error = Some((attr(&e, b"code").unwrap_or_default(), String::new())),
                b"record" => records.push(record_from(&e)),
                b"link" => push_link(&mut current, &e),
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"record" => {
                records.extend(current.take());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err("missing <OA> root element".to_string());
    }
    Ok(match error {
        Some((code, message)) => OaResponse::Error { code, message },
        None => OaResponse::Records(records),
    })
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| match a.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

fn record_from(e: &BytesStart<'_>) -> OaRecord {
    OaRecord {
        id: attr(e, b"id").unwrap_or_default(),
        links: Vec::new(),
    }
}

fn push_link(current: &mut Option<OaRecord>, e: &BytesStart<'_>) {
    // Links outside a <record> carry no meaning
    let Some(record) = current.as_mut() else {
        return;
    };
    record.links.push(OaLink {
        format: attr(e, b"format").unwrap_or_else(|| "pdf".to_string()),
        href: attr(e, b"href").unwrap_or_default(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF_RECORD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OA><responseDate>2023-01-10 08:18:31</responseDate><request id="PMC5334499" format="pdf">https://www.ncbi.nlm.nih.gov/pmc/utils/oa/oa.fcgi?id=PMC5334499&amp;format=pdf</request>
<records returned-count="1" total-count="1">
<record id="PMC5334499" citation="World J Radiol. 2017 Feb 28; 9(2):27-33" license="CC BY-NC" retracted="no">
<link format="pdf" updated="2017-03-03 03:24:47" href="ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/7f/3c/WJR-9-27.PMC5334499.pdf" />
</record>
</records>
</OA>"#;

    const NOT_OPEN_ACCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OA><responseDate>2023-01-10 08:20:02</responseDate><request id="PMC1234">https://www.ncbi.nlm.nih.gov/pmc/utils/oa/oa.fcgi?id=PMC1234&amp;format=pdf</request><error code="idIsNotOpenAccess">identifier 'PMC1234' is not Open Access</error></OA>"#;

    #[test]
    fn parse_pdf_record() {
        let response = parse_oa_response(PDF_RECORD).unwrap();
        let OaResponse::Records(records) = &response else {
            panic!("expected records, got {response:?}");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "PMC5334499");
        assert_eq!(records[0].links[0].format, "pdf");
        assert_eq!(
            response.first_link_href(),
            Some("ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/7f/3c/WJR-9-27.PMC5334499.pdf")
        );
    }

    #[test]
    fn parse_error_response() {
        let response = parse_oa_response(NOT_OPEN_ACCESS).unwrap();
        assert_eq!(
            response,
            OaResponse::Error {
                code: "idIsNotOpenAccess".to_string(),
                message: "identifier 'PMC1234' is not Open Access".to_string(),
            }
        );
        assert!(response.first_link_href().is_none());
    }

    #[test]
    fn record_without_link_has_no_href() {
        let xml = r#"<OA><records returned-count="1"><record id="PMC1" license="none"></record></records></OA>"#;
        let response = parse_oa_response(xml).unwrap();
        assert!(response.first_link_href().is_none());
    }

    #[test]
    fn empty_records_has_no_href() {
        let xml = r#"<OA><records returned-count="0" total-count="0"/></OA>"#;
        assert_eq!(parse_oa_response(xml).unwrap(), OaResponse::Records(Vec::new()));
    }

    #[test]
    fn first_link_across_multiple_records() {
        let xml = r#"<OA><records>
<record id="PMC1"/>
<record id="PMC2"><link format="pdf" href="ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/a/b.pdf"/><link format="pdf" href="ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/c/d.pdf"/></record>
</records></OA>"#;
        let response = parse_oa_response(xml).unwrap();
        assert_eq!(
            response.first_link_href(),
            Some("ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/a/b.pdf")
        );
    }

    #[test]
    fn missing_root_is_parse_error() {
        let err = parse_oa_response("<html><body>Service Unavailable</body></html>").unwrap_err();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("<OA>"));
    }

    #[test]
    fn malformed_xml_is_parse_error() {
        assert!(parse_oa_response("<OA><records><record id=\"x\"></records></OA>").is_err());
    }

    #[test]
    fn malformed_endpoint_fails_without_backoff() {
        // An hour-long backoff would stall the test if the error were retried
        let client = PmcOaClient::new(
            "not a url",
            RetryPolicy {
                max_retries: 5,
                base_delay: std::time::Duration::from_secs(3600),
            },
        );
        let err = client.locate("PMC1").unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    #[ignore]
    fn locate_live_pmcid() {
        let client = PmcOaClient::new(DEFAULT_PMC_OA_URL, RetryPolicy::default());
        let response = client.locate("PMC5334499").unwrap();
        assert!(response.first_link_href().is_some());
    }
}
