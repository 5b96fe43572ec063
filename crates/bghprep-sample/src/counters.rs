//! Per-run classification counters

/// Terminal bucket of one sampled row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Unpaywall returned a record
    Metadata,
    /// PMC OA returned a PDF link
    Manifest,
    /// No DOI hit and no PMID
    Discard,
    /// PMC OA answered, but with no PDF
    NoPdf,
    /// PMC OA lookup exhausted its retries
    Failed,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Metadata => "upw",
            Self::Manifest => "pmc",
            Self::Discard => "discard",
            Self::NoPdf => "no_pdf",
            Self::Failed => "failed",
        }
    }
}

/// Counts for one (field, year) run.
///
/// `total` is bumped when a row starts; every finished row then lands in
/// exactly one bucket, so a completed run satisfies [`RunCounters::is_balanced`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunCounters {
    pub total: usize,
    pub upw: usize,
    pub pmc: usize,
    pub discard: usize,
    pub no_pdf: usize,
    pub failed: usize,
}

impl RunCounters {
    pub fn begin_row(&mut self) {
        self.total += 1;
    }

    pub fn record(&mut self, outcome: Outcome) {
        let bucket = match outcome {
            Outcome::Metadata => &mut self.upw,
            Outcome::Manifest => &mut self.pmc,
            Outcome::Discard => &mut self.discard,
            Outcome::NoPdf => &mut self.no_pdf,
            Outcome::Failed => &mut self.failed,
        };
        *bucket += 1;
    }

    /// Every started row reached a bucket.
    pub fn is_balanced(&self) -> bool {
        self.total == self.upw + self.pmc + self.discard + self.no_pdf + self.failed
    }
}

impl std::ops::AddAssign for RunCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.upw += rhs.upw;
        self.pmc += rhs.pmc;
        self.discard += rhs.discard;
        self.no_pdf += rhs.no_pdf;
        self.failed += rhs.failed;
    }
}
