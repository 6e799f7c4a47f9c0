//! Directory scanning for DCLGEN files.
//!
//! Walks a directory tree, sniffs candidate files, parses each one and
//! collects successes alongside per-file failures. One malformed file
//! never aborts the scan; the report's value depends on best-effort
//! coverage of everything else.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::parser::{DclgenParser, TableDeclaration};
use crate::{DclgenError, DclgenResult};

/// Content marker that identifies a DCLGEN file regardless of extension.
const CONTENT_MARKER: &str = "DCLGEN TABLE";

/// Extensions treated as DCLGEN candidates without a content sniff.
const DEFAULT_EXTENSIONS: [&str; 5] = ["dclgen", "cpy", "cob", "cbl", "inc"];

/// Scan options.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Cooperative cancellation: when set to true, the walk stops and the
    /// stats gathered so far are returned.
    pub cancel_flag: Option<Arc<AtomicBool>>,
}

/// A successfully parsed file.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub table: TableDeclaration,
}

/// A file that looked like a DCLGEN but could not be parsed or read.
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Aggregate result of one directory scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    /// Candidate files for which a parse was attempted.
    pub files_attempted: usize,
    /// Successful parses, in walk order.
    pub parsed: Vec<ParsedFile>,
    /// Per-file failures, in walk order.
    pub failures: Vec<ScanFailure>,
}

/// Scanner for directories of DCLGEN files.
#[derive(Debug, Default)]
pub struct Scanner {
    parser: DclgenParser,
    options: ScanOptions,
}

impl Scanner {
    /// Create a scanner with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with options.
    pub fn with_options(options: ScanOptions) -> Self {
        Self {
            parser: DclgenParser::new(),
            options,
        }
    }

    /// Scan a directory tree for DCLGEN files.
    ///
    /// Fails only when `root` is not a directory; everything below that is
    /// recorded per file in the returned [`ScanStats`].
    pub fn scan_directory(&self, root: &Path) -> DclgenResult<ScanStats> {
        if !root.is_dir() {
            return Err(DclgenError::NotADirectory(root.to_path_buf()));
        }

        let mut stats = ScanStats::default();
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            if self.cancelled() {
                info!("scan cancelled, returning partial results");
                break;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            self.process_file(entry.path(), &mut stats);
        }

        info!(
            attempted = stats.files_attempted,
            parsed = stats.parsed.len(),
            failed = stats.failures.len(),
            "scan complete"
        );
        Ok(stats)
    }

    fn cancelled(&self) -> bool {
        self.options
            .cancel_flag
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn process_file(&self, path: &Path, stats: &mut ScanStats) {
        let by_extension = has_candidate_extension(path);
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                // Unreadable files only count when the extension marked
                // them as candidates; binary files elsewhere are skipped.
                if by_extension {
                    stats.files_attempted += 1;
                    stats.failures.push(ScanFailure {
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
                return;
            }
        };

        if !by_extension && !content.contains(CONTENT_MARKER) {
            return;
        }

        debug!(path = %path.display(), "parsing candidate");
        stats.files_attempted += 1;
        match self.parser.parse(&content) {
            Ok(table) => stats.parsed.push(ParsedFile {
                path: path.to_path_buf(),
                table,
            }),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "parse failed");
                stats.failures.push(ScanFailure {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
    }
}

fn has_candidate_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_lowercase();
            DEFAULT_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}
