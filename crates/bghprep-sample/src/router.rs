//! Row classification: metadata first, then PDF location

use std::io::Write;

use anyhow::{Context, Result};

use crate::columns::RowIds;
use crate::counters::{Outcome, RunCounters};
use crate::lookup::{MetadataLookup, PdfLocator};
use crate::manifest::ManifestLine;
use crate::sinks::OutputSinks;

/// Routes sampled rows through the two lookups into the sinks.
#[derive(Debug)]
pub struct RowRouter<M, P> {
    metadata: M,
    pdf: P,
}

impl<M: MetadataLookup, P: PdfLocator> RowRouter<M, P> {
    pub fn new(metadata: M, pdf: P) -> Self {
        Self { metadata, pdf }
    }

    /// Classify one row, write its output, and count it.
    ///
    /// First match wins:
    /// 1. DOI present and Unpaywall has a non-empty record → metadata sink
    /// 2. no PMID → discard
    /// 3. OA error / no link → dump `doi,pmc_id`
    /// 4. OA link → manifest line
    ///
    /// An OA lookup that exhausts its retries counts as failed. Metadata
    /// transport errors and sink I/O errors are returned.
    pub fn route<W: Write>(
        &self,
        ids: &RowIds<'_>,
        sinks: &mut OutputSinks<W>,
        counters: &mut RunCounters,
    ) -> Result<Outcome> {
        counters.begin_row();
        let outcome = self.classify(ids, sinks)?;
        counters.record(outcome);
        Ok(outcome)
    }

    fn classify<W: Write>(&self, ids: &RowIds<'_>, sinks: &mut OutputSinks<W>) -> Result<Outcome> {
        if !ids.doi.is_empty() {
            let record = self
                .metadata
                .lookup(ids.doi)
                .with_context(|| format!("Unpaywall lookup failed for {}", ids.doi))?;
            if let Some(record) = record.filter(|r| !r.is_empty()) {
                sinks.write_metadata(&record).context("Failed to write metadata record")?;
                return Ok(Outcome::Metadata);
            }
        }

        if ids.pubmed_id.is_empty() {
            return Ok(Outcome::Discard);
        }

        let response = match self.pdf.locate(ids.pmc_id) {
            Ok(response) => response,
            Err(e) => {
                log::warn!("PMC OA lookup failed for {:?}: {e}", ids.pmc_id);
                return Ok(Outcome::Failed);
            }
        };

        match response.first_link_href() {
            None => {
                sinks
                    .write_dump(ids.doi, ids.pmc_id)
                    .context("Failed to write dump row")?;
                Ok(Outcome::NoPdf)
            }
            Some(href) => {
                let line = ManifestLine::new(href, ids.pmc_id, ids.pubmed_id);
                sinks.write_manifest(&line).context("Failed to write manifest line")?;
                Ok(Outcome::Manifest)
            }
        }
    }
}
