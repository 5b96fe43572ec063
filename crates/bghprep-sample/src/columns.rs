//! Identifier column selection
//!
//! Columns are addressed by position by default (PMID = 0, PMCID = 8,
//! DOI = 10, the layout of the yearly PubMed CSV exports). A selector may
//! instead name a header cell; names are resolved once per file.

use anyhow::{Result, bail};
use csv::StringRecord;
use serde::Deserialize;

/// A column addressed by 0-based index or by header name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelector {
    Index(usize),
    Name(String),
}

impl ColumnSelector {
    fn resolve(&self, header: &StringRecord) -> Result<usize> {
        match self {
            Self::Index(idx) => Ok(*idx),
            Self::Name(name) => match header.iter().position(|h| h.trim() == name) {
                Some(idx) => Ok(idx),
                None => bail!("column {name:?} not found in header"),
            },
        }
    }
}

/// Where the three identifiers live in each row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub pubmed_id: ColumnSelector,
    pub pmc_id: ColumnSelector,
    pub doi: ColumnSelector,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            pubmed_id: ColumnSelector::Index(0),
            pmc_id: ColumnSelector::Index(8),
            doi: ColumnSelector::Index(10),
        }
    }
}

impl ColumnMap {
    /// Resolve selectors to positions against `header`.
    pub fn resolve(&self, header: &StringRecord) -> Result<ResolvedColumns> {
        Ok(ResolvedColumns {
            pubmed_id: self.pubmed_id.resolve(header)?,
            pmc_id: self.pmc_id.resolve(header)?,
            doi: self.doi.resolve(header)?,
        })
    }
}

/// Column positions after header resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub pubmed_id: usize,
    pub pmc_id: usize,
    pub doi: usize,
}

impl ResolvedColumns {
    /// Pull the identifiers out of `record`. Missing cells read as empty.
    pub fn extract<'r>(&self, record: &'r StringRecord) -> RowIds<'r> {
        RowIds {
            pubmed_id: record.get(self.pubmed_id).unwrap_or_default(),
            pmc_id: record.get(self.pmc_id).unwrap_or_default(),
            doi: record.get(self.doi).unwrap_or_default(),
        }
    }
}

/// Identifiers of one sampled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowIds<'a> {
    pub pubmed_id: &'a str,
    pub pmc_id: &'a str,
    pub doi: &'a str,
}
