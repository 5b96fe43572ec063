//! Per-run output sinks: metadata JSONL, harvester manifest, dump CSV

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::lookup::MetadataRecord;
use crate::manifest::{MANIFEST_HEADER, ManifestLine};

/// The three writers of one run.
///
/// Generic over the writer so the router can be tested against memory
/// buffers. Dropping without [`OutputSinks::finish`] still closes files,
/// but buffered data may be lost.
pub struct OutputSinks<W: Write> {
    metadata: W,
    manifest: W,
    dump: csv::Writer<W>,
    dump_rows: usize,
}

impl<W: Write> std::fmt::Debug for OutputSinks<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSinks")
            .field("dump_rows", &self.dump_rows)
            .finish_non_exhaustive()
    }
}

impl<W: Write> OutputSinks<W> {
    /// Wrap the writers and emit the manifest header line.
    pub fn new(metadata: W, mut manifest: W, dump: W) -> io::Result<Self> {
        writeln!(manifest, "{MANIFEST_HEADER}")?;
        Ok(Self {
            metadata,
            manifest,
            dump: csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(dump),
            dump_rows: 0,
        })
    }

    /// Append one compact JSON object and a newline.
    pub fn write_metadata(&mut self, record: &MetadataRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.metadata, record)?;
        self.metadata.write_all(b"\n")
    }

    pub fn write_manifest(&mut self, line: &ManifestLine<'_>) -> io::Result<()> {
        writeln!(self.manifest, "{line}")
    }

    pub fn write_dump(&mut self, doi: &str, pmc_id: &str) -> io::Result<()> {
        self.dump.write_record([doi, pmc_id])?;
        self.dump_rows += 1;
        Ok(())
    }

    pub fn dump_rows(&self) -> usize {
        self.dump_rows
    }

    /// Flush everything and hand the writers back.
    pub fn finish(mut self) -> io::Result<FinishedSinks<W>> {
        self.metadata.flush()?;
        self.manifest.flush()?;
        let dump = self.dump.into_inner().map_err(|e| e.into_error())?;
        Ok(FinishedSinks {
            metadata: self.metadata,
            manifest: self.manifest,
            dump,
            dump_rows: self.dump_rows,
        })
    }
}

/// Writers returned by [`OutputSinks::finish`].
#[derive(Debug)]
pub struct FinishedSinks<W> {
    pub metadata: W,
    pub manifest: W,
    pub dump: W,
    pub dump_rows: usize,
}

/// File-backed sinks.
pub type FileSinks = OutputSinks<BufWriter<File>>;

impl FileSinks {
    /// Create (truncate) the three output files.
    pub fn create(metadata: &Path, manifest: &Path, dump: &Path) -> io::Result<Self> {
        let open = |path: &Path| File::create(path).map(BufWriter::new);
        Self::new(open(metadata)?, open(manifest)?, open(dump)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory_sinks() -> OutputSinks<Vec<u8>> {
        OutputSinks::new(Vec::new(), Vec::new(), Vec::new()).unwrap()
    }

    #[test]
    fn manifest_starts_with_placeholder() {
        let out = memory_sinks().finish().unwrap();
        assert_eq!(String::from_utf8(out.manifest).unwrap(), "DatePlaceholder\n");
        assert!(out.metadata.is_empty());
        assert!(out.dump.is_empty());
    }

    #[test]
    fn metadata_one_object_per_line() {
        let mut sinks = memory_sinks();
        for doi in ["10.1/a", "10.1/b"] {
            let value = json!({ "doi": doi, "is_oa": true });
            sinks.write_metadata(value.as_object().unwrap()).unwrap();
        }
        let out = sinks.finish().unwrap();
        let text = String::from_utf8(out.metadata).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![r#"{"doi":"10.1/a","is_oa":true}"#, r#"{"doi":"10.1/b","is_oa":true}"#]);
    }

    #[test]
    fn dump_rows_are_comma_separated() {
        let mut sinks = memory_sinks();
        sinks.write_dump("10.1/x", "PMC9").unwrap();
        sinks.write_dump("", "PMC10").unwrap();
        assert_eq!(sinks.dump_rows(), 2);
        let out = sinks.finish().unwrap();
        assert_eq!(String::from_utf8(out.dump).unwrap(), "10.1/x,PMC9\n,PMC10\n");
        assert_eq!(out.dump_rows, 2);
    }

    #[test]
    fn file_sinks_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ["m.jsonl", "p.txt", "d.csv"].map(|name| dir.path().join(name));
        let sinks = FileSinks::create(&paths[0], &paths[1], &paths[2]).unwrap();
        sinks.finish().unwrap();
        assert!(paths.iter().all(|p| p.exists()));
        assert_eq!(std::fs::read_to_string(&paths[1]).unwrap(), "DatePlaceholder\n");
    }
}
