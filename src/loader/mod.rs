//! Line-oriented rule loading.
//!
//! Reads one rule record per line from any reader and builds a
//! [`RuleIndex`]. Blank lines are ignored, as are `#` comment lines when the
//! [`LoaderConfig`] allows them. Gzip-compressed input is detected from its
//! magic bytes and decompressed transparently.

mod config;

pub use config::{ErrorPolicy, LoaderConfig};

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::Path;

use crate::error::RuleError;
use crate::index::{RuleIndex, RuleIndexBuilder};
use crate::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Result of a successful load.
#[derive(Debug)]
pub struct LoadReport {
    /// The frozen index
    pub index: RuleIndex,
    /// Rule lines folded into the index
    pub loaded: usize,
    /// Lines rejected under [`ErrorPolicy::Skip`], each an [`Error::Line`]
    pub skipped: Vec<Error>,
}

impl LoadReport {
    /// Check if every non-blank line was loaded.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Loads rule records from readers and files.
///
/// # Examples
/// ```
/// use fwrule::{Direction, Protocol, RuleLoader};
///
/// let text = "# web\ninbound,tcp,80,192.168.1.1-192.168.1.5\n";
/// let report = RuleLoader::default().load(text.as_bytes()).unwrap();
///
/// assert_eq!(report.loaded, 1);
/// assert!(report
///     .index
///     .accept(Direction::Inbound, Protocol::Tcp, 80, "192.168.1.2")
///     .unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleLoader {
    config: LoaderConfig,
}

impl RuleLoader {
    /// Create a loader with the specified configuration.
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Get the loader configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load rules from a file. Gzip files are decompressed.
    pub fn open(&self, path: &Path) -> Result<LoadReport> {
        let report = self.load(File::open(path)?)?;
        log::info!(
            "Loaded {} rules from {:?} ({} skipped)",
            report.loaded,
            path,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Load rules from a reader. Gzip streams are decompressed.
    pub fn load<R: Read>(&self, mut reader: R) -> Result<LoadReport> {
        let mut prefix = Vec::with_capacity(GZIP_MAGIC.len());
        reader
            .by_ref()
            .take(GZIP_MAGIC.len() as u64)
            .read_to_end(&mut prefix)?;
        let gzip = is_gzip(&prefix);
        let reader = Cursor::new(prefix).chain(reader);

        if gzip {
            self.load_lines(BufReader::new(GzDecoder::new(reader)))
        } else {
            self.load_lines(BufReader::new(reader))
        }
    }

    fn load_lines<B: BufRead>(&self, reader: B) -> Result<LoadReport> {
        let mut builder = RuleIndexBuilder::new();
        let mut skipped = Vec::new();

        for line in numbered_lines(reader) {
            let (line_no, text) = line?;
            let result = match text {
                Ok(text) => {
                    let record = text.trim();
                    if record.is_empty() || (self.config.allow_comments && record.starts_with('#'))
                    {
                        continue;
                    }
                    builder.ingest(record)
                }
                Err(lossy) => Err(RuleError::InvalidEncoding.into_error(lossy.trim())),
            };

            if let Err(e) = result {
                let e = e.at_line(line_no);
                match self.config.error_policy {
                    ErrorPolicy::Abort => return Err(e),
                    ErrorPolicy::Skip => {
                        log::warn!("Skipping rule: {}", e);
                        skipped.push(e);
                    }
                }
            }
        }

        let loaded = builder.rule_count();
        Ok(LoadReport {
            index: builder.build(),
            loaded,
            skipped,
        })
    }
}

fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Split a reader into 1-based numbered lines.
///
/// A line that is not valid UTF-8 comes back as `Err` holding its lossy text,
/// so callers can report it against its line number.
pub(crate) fn numbered_lines<B: BufRead>(
    reader: B,
) -> impl Iterator<Item = io::Result<(usize, std::result::Result<String, String>)>> {
    reader.split(b'\n').enumerate().map(|(idx, raw)| {
        let text = String::from_utf8(raw?)
            .map_err(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
        Ok((idx + 1, text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Protocol};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const RULES: &str = "\
inbound,tcp,80,192.168.1.2
outbound,tcp,10000-20000,192.168.10.11
inbound,udp,53,192.168.1.1-192.168.2.5
outbound,udp,1000-2000,52.12.48.92
";

    #[test]
    fn test_load_rules() {
        let report = RuleLoader::default().load(RULES.as_bytes()).unwrap();
        assert_eq!(report.loaded, 4);
        assert!(report.is_clean());

        let index = &report.index;
        assert!(index.accept(Direction::Inbound, Protocol::Tcp, 80, "192.168.1.2").unwrap());
        assert!(index.accept(Direction::Inbound, Protocol::Udp, 53, "192.168.2.1").unwrap());
        assert!(index
            .accept(Direction::Outbound, Protocol::Tcp, 10234, "192.168.10.11")
            .unwrap());
        assert!(!index.accept(Direction::Inbound, Protocol::Tcp, 81, "192.168.1.2").unwrap());
        assert!(!index.accept(Direction::Inbound, Protocol::Udp, 24, "52.12.48.92").unwrap());
    }

    #[test]
    fn test_blank_lines_comments_and_crlf() {
        let text = "# header\r\n\r\n  inbound,tcp,80,1.1.1.1  \r\n# inbound,tcp,81,1.1.1.1\r\n";
        let report = RuleLoader::default().load(text.as_bytes()).unwrap();
        assert_eq!(report.loaded, 1);
        assert!(report
            .index
            .accept(Direction::Inbound, Protocol::Tcp, 80, "1.1.1.1")
            .unwrap());
        assert!(!report
            .index
            .accept(Direction::Inbound, Protocol::Tcp, 81, "1.1.1.1")
            .unwrap());
    }

    #[test]
    fn test_comments_disallowed() {
        let config = LoaderConfig::new(ErrorPolicy::Abort, false);
        let err = RuleLoader::new(config)
            .load("# header\ninbound,tcp,80,1.1.1.1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, Error::Line { line: 1, .. }));
    }

    #[test]
    fn test_abort_reports_line() {
        let text = "inbound,tcp,80,1.1.1.1\n\ninbound,tcp,80,1.1.1.300\n";
        let err = RuleLoader::default().load(text.as_bytes()).unwrap_err();
        assert!(err.is_malformed_rule());
        assert!(matches!(err, Error::Line { line: 3, .. }));
    }

    #[test]
    fn test_skip_collects_errors() {
        let text = "inbound,tcp,80,1.1.1.1\nbogus\ninbound,tcp,90-80,1.1.1.1\ninbound,udp,53,8.8.8.8\n";
        let loader = RuleLoader::new(LoaderConfig::with_policy(ErrorPolicy::Skip));
        let report = loader.load(text.as_bytes()).unwrap();

        assert_eq!(report.loaded, 2);
        assert!(!report.is_clean());
        let lines: Vec<usize> = report
            .skipped
            .iter()
            .map(|e| match e {
                Error::Line { line, .. } => *line,
                other => panic!("unexpected error: {other:?}"),
            })
            .collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(report
            .index
            .accept(Direction::Inbound, Protocol::Udp, 53, "8.8.8.8")
            .unwrap());
    }

    #[test]
    fn test_load_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(RULES.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let report = RuleLoader::default().load(&compressed[..]).unwrap();
        assert_eq!(report.loaded, 4);
        assert!(report
            .index
            .accept(Direction::Outbound, Protocol::Udp, 1500, "52.12.48.92")
            .unwrap());
    }

    /// Hands out at most one byte per read call.
    struct TrickleReader<'a>(&'a [u8]);

    impl Read for TrickleReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match (self.0.split_first(), buf.first_mut()) {
                (Some((&byte, rest)), Some(slot)) => {
                    *slot = byte;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_skip_invalid_utf8_line() {
        let text = b"inbound,tcp,80,1.1.1.1\ninbound,tcp,81,1.1.1.\xff\ninbound,tcp,82,1.1.1.1\n";
        let loader = RuleLoader::new(LoaderConfig::with_policy(ErrorPolicy::Skip));
        let report = loader.load(&text[..]).unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.skipped.len(), 1);
        let skipped = &report.skipped[0];
        assert!(skipped.is_malformed_rule());
        assert!(matches!(skipped, Error::Line { line: 2, .. }));
        assert!(report
            .index
            .accept(Direction::Inbound, Protocol::Tcp, 82, "1.1.1.1")
            .unwrap());
        assert!(!report
            .index
            .accept(Direction::Inbound, Protocol::Tcp, 81, "1.1.1.1")
            .unwrap());
    }

    #[test]
    fn test_abort_invalid_utf8_line() {
        let text = b"inbound,tcp,80,1.1.1.1\n\xfe\xff\n";
        let err = RuleLoader::default().load(&text[..]).unwrap_err();
        match err {
            Error::Line { line: 2, source } => assert!(matches!(
                *source,
                Error::MalformedRule {
                    source: RuleError::InvalidEncoding,
                    ..
                }
            )),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_gzip_one_byte_reads() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"inbound,tcp,80,1.1.1.1\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let report = RuleLoader::default()
            .load(TrickleReader(&compressed))
            .unwrap();
        assert_eq!(report.loaded, 1);
        assert!(report
            .index
            .accept(Direction::Inbound, Protocol::Tcp, 80, "1.1.1.1")
            .unwrap());
    }

    #[test]
    fn test_load_text_one_byte_reads() {
        let report = RuleLoader::default()
            .load(TrickleReader(RULES.as_bytes()))
            .unwrap();
        assert_eq!(report.loaded, 4);
    }

    #[test]
    fn test_single_byte_input() {
        let report = RuleLoader::default().load(&b"\n"[..]).unwrap();
        assert_eq!(report.loaded, 0);
    }

    #[test]
    fn test_empty_input() {
        let report = RuleLoader::default().load(&b""[..]).unwrap();
        assert_eq!(report.loaded, 0);
        assert!(report.index.is_empty());
    }
}
