//! Newline counting without loading the file into memory

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read chunk size (8MB)
const CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Count `\n` terminators in `path`, reading fixed-size chunks.
///
/// With `has_header`, the first line is not counted (saturating at zero).
pub fn count_lines(path: &Path, has_header: bool) -> io::Result<usize> {
    let file = File::open(path)?;
    let count = count_newlines(file)?;
    Ok(if has_header { count.saturating_sub(1) } else { count })
}

fn count_newlines(mut reader: impl Read) -> io::Result<usize> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut count = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        count += buf[..n].iter().filter(|&&b| b == b'\n').count();
    }
    Ok(count)
}
