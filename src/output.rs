//! Result link emission
//!
//! Standard output is the result channel: one absolute URL per line,
//! streamed as extracted, nothing else. All diagnostics go through tracing,
//! which the binary points at stderr.

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Context, Result};
use url::Url;

/// Sink the pagination engine streams extracted hrefs into
pub trait LinkSink {
    /// Offers one href for emission
    ///
    /// # Returns
    /// `true` when a line was actually written, `false` when the href was
    /// suppressed (duplicate or unparseable).
    fn emit(&mut self, href: &str) -> Result<bool>;
}

/// Collects raw hrefs without normalization; handy in tests
impl LinkSink for Vec<String> {
    fn emit(&mut self, href: &str) -> Result<bool> {
        self.push(href.to_string());
        Ok(true)
    }
}

/// Line-per-URL printer with normalization and in-run de-duplication
///
/// Each href is parsed and re-serialized so equivalent spellings collapse
/// to one form. Hrefs that do not parse as absolute URLs are skipped with a
/// warning; a URL already emitted in this run is silently suppressed (the
/// widget can repeat a result across page boundaries). Every emitted line
/// is flushed so downstream consumers see links as they are found.
pub struct LinkPrinter<W: Write> {
    out: W,
    seen: HashSet<String>,
    emitted: u64,
    duplicates: u64,
}

impl<W: Write> LinkPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            seen: HashSet::new(),
            emitted: 0,
            duplicates: 0,
        }
    }

    /// Lines written so far
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Repeat URLs suppressed so far
    #[must_use]
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }
}

impl<W: Write> LinkSink for LinkPrinter<W> {
    fn emit(&mut self, href: &str) -> Result<bool> {
        let url = match Url::parse(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("skipping unparseable href {href:?}: {e}");
                return Ok(false);
            }
        };

        let normalized = url.as_str().to_owned();
        if !self.seen.insert(normalized.clone()) {
            self.duplicates += 1;
            tracing::debug!("suppressing duplicate {normalized}");
            return Ok(false);
        }

        writeln!(self.out, "{normalized}").context("failed to write result link")?;
        self.out.flush().context("failed to flush result link")?;
        self.emitted += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(printer: &LinkPrinter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(printer.out.clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn emits_one_line_per_url() {
        let mut printer = LinkPrinter::new(Vec::new());
        assert!(printer.emit("http://example.com/a").unwrap());
        assert!(printer.emit("http://example.com/b").unwrap());
        assert_eq!(
            printed(&printer),
            vec!["http://example.com/a", "http://example.com/b"]
        );
        assert_eq!(printer.emitted(), 2);
    }

    #[test]
    fn normalizes_by_reserializing() {
        let mut printer = LinkPrinter::new(Vec::new());
        assert!(printer.emit("HTTP://Example.COM/Path").unwrap());
        assert!(printer.emit("http://example.com").unwrap());
        assert_eq!(
            printed(&printer),
            vec!["http://example.com/Path", "http://example.com/"]
        );
    }

    #[test]
    fn suppresses_duplicates_across_the_run() {
        let mut printer = LinkPrinter::new(Vec::new());
        assert!(printer.emit("http://example.com/a").unwrap());
        assert!(!printer.emit("http://example.com/a").unwrap());
        assert!(!printer.emit("HTTP://example.com/a").unwrap());
        assert_eq!(printed(&printer), vec!["http://example.com/a"]);
        assert_eq!(printer.emitted(), 1);
        assert_eq!(printer.duplicates(), 2);
    }

    #[test]
    fn skips_hrefs_that_are_not_absolute_urls() {
        let mut printer = LinkPrinter::new(Vec::new());
        assert!(!printer.emit("/relative/path").unwrap());
        assert!(!printer.emit("").unwrap());
        assert!(!printer.emit("not a url").unwrap());
        assert_eq!(printer.emitted(), 0);
        assert!(printed(&printer).is_empty());
    }
}
