use memmap2::Mmap;
use regex::bytes::{Regex, RegexBuilder};
use std::fs::File;
use std::path::Path;
use tracing::{trace, warn};

use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;

/// How the runtime's regex engine consumes its haystack
///
/// Matching a memory-mapped file is only safe with an engine that takes
/// explicit start/end offsets. A sentinel-seeking engine would scan past the
/// end of the mapping whenever the file contains no terminator byte, so on a
/// runtime without a bounded primitive the matcher refuses to decide rather
/// than attempt it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPrimitive {
    /// The engine evaluates an explicit byte range
    Bounded,
    /// No bounded evaluation available; mapped files cannot be matched
    Unsupported,
}

impl MatchPrimitive {
    /// One-time capability probe for the current runtime
    ///
    /// The `regex` engine only ever evaluates caller-provided slices, so the
    /// probe is unconditional here; `Unsupported` stays constructible for
    /// embedders swapping in a different engine.
    pub fn detect() -> Self {
        Self::Bounded
    }
}

/// Why the matcher could not produce an authoritative answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndeterminateReason {
    /// The pattern failed to compile
    BadPattern,
    /// The file vanished or could not be read
    Io,
    /// The runtime lacks a bounded-length match primitive
    UnsupportedPlatform,
}

/// Tri-state result of matching one file
///
/// `Matched` and `NotMatched` are authoritative. `Indeterminate` tells the
/// caller to decide through an independent path; treating it as `NotMatched`
/// silently drops files the matcher never examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NotMatched,
    Indeterminate(IndeterminateReason),
}

impl MatchOutcome {
    /// Whether this outcome may be recorded as a final answer
    pub fn is_authoritative(&self) -> bool {
        !matches!(self, Self::Indeterminate(_))
    }
}

/// Evaluates a compiled pattern against whole file contents
///
/// Files are mapped read-only and private; the pattern runs over the exact
/// byte extent. Patterns are byte-oriented with multi-line anchors, so
/// `^`/`$` match at line boundaries and non-UTF-8 content is searched as-is.
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    regex: Regex,
    primitive: MatchPrimitive,
    metrics: ScanMetrics,
}

impl ContentMatcher {
    /// Compiles `pattern` with the runtime's detected match primitive
    pub fn compile(pattern: &str) -> ScanResult<Self> {
        Self::with_primitive(pattern, MatchPrimitive::detect())
    }

    /// Compiles `pattern` against an explicit primitive capability
    pub fn with_primitive(pattern: &str, primitive: MatchPrimitive) -> ScanResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .map_err(|e| ScanError::invalid_pattern(e.to_string()))?;
        Ok(Self::from_regex_with_primitive(regex, primitive))
    }

    /// Wraps a precompiled pattern handle
    pub fn from_regex(regex: Regex) -> Self {
        Self::from_regex_with_primitive(regex, MatchPrimitive::detect())
    }

    fn from_regex_with_primitive(regex: Regex, primitive: MatchPrimitive) -> Self {
        Self {
            regex,
            primitive,
            metrics: ScanMetrics::new(),
        }
    }

    /// Replaces the metrics handle, sharing counters with the caller's
    pub fn with_metrics(mut self, metrics: ScanMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Gets the current scan metrics
    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Tests the file at `path` against the compiled pattern
    ///
    /// The file handle and mapping are released on every exit path. An
    /// unreadable file yields `Indeterminate(Io)`, never a false
    /// `NotMatched`.
    pub fn matches(&self, path: &Path) -> MatchOutcome {
        trace!("Matching file: {}", path.display());

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Cannot open {}: {}", path.display(), e);
                return self.indeterminate(IndeterminateReason::Io);
            }
        };
        let len = match file.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("Cannot stat {}: {}", path.display(), e);
                return self.indeterminate(IndeterminateReason::Io);
            }
        };

        // A zero-length file cannot be mapped; the pattern runs against the
        // empty haystack directly
        if len == 0 {
            return self.outcome(self.regex.is_match(b""));
        }

        if self.primitive == MatchPrimitive::Unsupported {
            return self.indeterminate(IndeterminateReason::UnsupportedPlatform);
        }

        let map = match unsafe { Mmap::map(&file) } {
            Ok(map) => map,
            Err(e) => {
                warn!("Cannot map {}: {}", path.display(), e);
                return self.indeterminate(IndeterminateReason::Io);
            }
        };
        self.metrics.record_mmap(len);

        self.outcome(self.regex.is_match(&map))
    }

    fn outcome(&self, matched: bool) -> MatchOutcome {
        self.metrics.record_match_outcome(matched);
        if matched {
            MatchOutcome::Matched
        } else {
            MatchOutcome::NotMatched
        }
    }

    fn indeterminate(&self, reason: IndeterminateReason) -> MatchOutcome {
        self.metrics.record_indeterminate();
        MatchOutcome::Indeterminate(reason)
    }
}

/// One-shot convenience: compile `pattern` and test `path`
///
/// A pattern that fails to compile folds into
/// `Indeterminate(BadPattern)` so the caller can route the file through its
/// fallback matching path.
pub fn match_file(path: &Path, pattern: &str) -> MatchOutcome {
    match ContentMatcher::compile(pattern) {
        Ok(matcher) => matcher.matches(path),
        Err(e) => {
            warn!("Pattern rejected: {}", e);
            MatchOutcome::Indeterminate(IndeterminateReason::BadPattern)
        }
    }
}
