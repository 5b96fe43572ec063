//! Remote lookup adapters
//!
//! The router talks to both services through these traits, so it can be
//! driven by in-memory fakes in tests.

pub mod pmc_oa;
pub mod unpaywall;

use bghprep_core::LookupError;
use serde_json::{Map, Value};

pub use pmc_oa::{OaLink, OaRecord, OaResponse, PmcOaClient};
pub use unpaywall::UnpaywallClient;

/// A metadata record as returned by the service, key order preserved.
pub type MetadataRecord = Map<String, Value>;

/// DOI → metadata record.
pub trait MetadataLookup {
    /// `Ok(None)` when the service reports the DOI as unknown or errored.
    /// `Err` only for transport failures.
    fn lookup(&self, doi: &str) -> Result<Option<MetadataRecord>, LookupError>;
}

/// PMC ID → PDF location response.
pub trait PdfLocator {
    fn locate(&self, pmc_id: &str) -> Result<OaResponse, LookupError>;
}

impl<T: MetadataLookup + ?Sized> MetadataLookup for &T {
    fn lookup(&self, doi: &str) -> Result<Option<MetadataRecord>, LookupError> {
        (**self).lookup(doi)
    }
}

impl<T: PdfLocator + ?Sized> PdfLocator for &T {
    fn locate(&self, pmc_id: &str) -> Result<OaResponse, LookupError> {
        (**self).locate(pmc_id)
    }
}
