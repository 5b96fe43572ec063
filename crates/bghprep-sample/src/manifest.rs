//! biblio-glutton-harvester manifest lines

use std::fmt;

/// Origin + base path of PMC OA file links.
pub const PMC_FTP_PREFIX: &str = "ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/";

/// Same tree served over HTTPS; newer OA responses link here.
const PMC_HTTPS_PREFIX: &str = "https://ftp.ncbi.nlm.nih.gov/pub/pmc/";

/// First line of every manifest; the harvester skips it.
pub const MANIFEST_HEADER: &str = "DatePlaceholder";

/// Path of a PMC file relative to the OA tree root.
///
/// Hrefs outside the tree are returned unchanged.
pub fn relative_path(href: &str) -> &str {
    href.strip_prefix(PMC_FTP_PREFIX)
        .or_else(|| href.strip_prefix(PMC_HTTPS_PREFIX))
        .unwrap_or(href)
}

/// One tab-separated manifest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestLine<'a> {
    pub relative_path: &'a str,
    pub pmc_id: &'a str,
    pub pubmed_id: &'a str,
}

impl<'a> ManifestLine<'a> {
    pub fn new(href: &'a str, pmc_id: &'a str, pubmed_id: &'a str) -> Self {
        Self {
            relative_path: relative_path(href),
            pmc_id,
            pubmed_id,
        }
    }
}

impl fmt::Display for ManifestLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\tCitationPlaceholder\t{}\tPMID:{}\tLicensePlaceholder",
            self.relative_path, self.pmc_id, self.pubmed_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ftp_prefix() {
        assert_eq!(
            relative_path("ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/foo/bar.pdf"),
            "foo/bar.pdf"
        );
    }

    #[test]
    fn strips_https_prefix() {
        assert_eq!(
            relative_path("https://ftp.ncbi.nlm.nih.gov/pub/pmc/oa_pdf/ab/cd/x.pdf"),
            "oa_pdf/ab/cd/x.pdf"
        );
    }

    #[test]
    fn foreign_href_unchanged() {
        assert_eq!(relative_path("https://example.org/x.pdf"), "https://example.org/x.pdf");
    }

    #[test]
    fn formats_five_fields() {
        let line = ManifestLine::new(
            "ftp://ftp.ncbi.nlm.nih.gov/pub/pmc/foo/bar.pdf",
            "PMC123",
            "456",
        );
        assert_eq!(
            line.to_string(),
            "foo/bar.pdf\tCitationPlaceholder\tPMC123\tPMID:456\tLicensePlaceholder"
        );
        assert_eq!(line.to_string().split('\t').count(), 5);
    }
}
