//! Static route extraction from a source tree.
//!
//! 1. walk the tree (read-only, restricted directories are recorded, not fatal)
//! 2. detect the dominant technology by template match count
//! 3. extract `(path, file, line, methods)` from that technology's files
//! 4. drop low-entropy paths, dedup first-seen

use crate::core::constraints::char_codes;
use crate::core::registry::{EndpointRecord, EndpointRegistry};
use crate::core::signatures::{Signature, Technology, signatures};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directory names never descended into.
pub const DEFAULT_IGNORED_DIRS: [&str; 5] = [".git", "node_modules", "target", "__pycache__", ".venv"];

const MIN_CODE_STD_DEV: f64 = 10.0;
const MIN_CODE_RANGE: f64 = 32.0;

/// Files of a source tree, plus the entries that could not be read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceTree {
    pub root: PathBuf,
    pub files: Vec<PathBuf>,
    /// Directories whose listing failed (permission denied and the like).
    pub restricted: Vec<PathBuf>,
}

impl SourceTree {
    pub fn walk(root: &Path, extra_ignored: &[String]) -> Self {
        let mut tree = SourceTree {
            root: root.to_path_buf(),
            ..Default::default()
        };
        tree.collect(root, extra_ignored);
        tree.files.sort();
        tree.restricted.sort();
        tree
    }

    fn collect(&mut self, dir: &Path, extra_ignored: &[String]) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "restricted directory");
                self.restricted.push(dir.to_path_buf());
                return;
            }
        };
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
                if DEFAULT_IGNORED_DIRS.contains(&name) || extra_ignored.iter().any(|i| i == name) {
                    continue;
                }
                self.collect(&path, extra_ignored);
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                // Symlinked directories are never descended into, so link
                // cycles cannot re-walk the tree.
                self.files.push(path);
            }
        }
    }

    pub fn files_with_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a PathBuf> {
        self.files
            .iter()
            .filter(move |p| p.extension().is_some_and(|e| e == ext))
    }
}

/// Match totals per technology, in detection order.
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub technology: Technology,
    pub scores: Vec<(Technology, usize)>,
}

/// Pick the technology with the most template matches. The first technology
/// reaching the maximum wins, so an empty tree detects `Flask`.
pub fn detect_technology(tree: &SourceTree, sigs: &[Signature]) -> Detection {
    let scores: Vec<(Technology, usize)> = sigs
        .iter()
        .map(|sig| {
            let total = tree
                .files_with_extension(sig.technology.extension())
                .filter_map(|file| read_source(file))
                .map(|content| sig.count(&content))
                .sum();
            (sig.technology, total)
        })
        .collect();

    let mut best = (Technology::ALL[0], 0usize);
    for (i, (tech, score)) in scores.iter().enumerate() {
        if i == 0 || *score > best.1 {
            best = (*tech, *score);
        }
    }
    Detection {
        technology: best.0,
        scores,
    }
}

/// Accept a route path iff it is longer than one character, its character
/// codes have a population standard deviation above 10, and their range
/// exceeds 32.
pub fn path_passes_constraints(path: &str) -> bool {
    let codes = char_codes(path);
    if codes.len() <= 1 {
        return false;
    }
    let n = codes.len() as f64;
    let mean = codes.iter().sum::<f64>() / n;
    let variance = codes.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    let max = codes.iter().copied().fold(f64::MIN, f64::max);
    let min = codes.iter().copied().fold(f64::MAX, f64::min);
    variance.sqrt() > MIN_CODE_STD_DEV && (max - min) > MIN_CODE_RANGE
}

/// 1-based line of the byte `offset` in `content`.
pub fn line_of(content: &str, offset: usize) -> usize {
    content.as_bytes()[..offset.min(content.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// Outcome of a static scan.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub detection: Detection,
    pub endpoints: Vec<EndpointRecord>,
    pub files_scanned: usize,
    /// Matches dropped by the path constraint filter.
    pub filtered: usize,
    pub restricted: Vec<PathBuf>,
}

pub fn extract(root: &Path, extra_ignored: &[String]) -> Extraction {
    let tree = SourceTree::walk(root, extra_ignored);
    let detection = detect_technology(&tree, signatures());
    let sig = Signature::of(detection.technology);

    let mut registry = EndpointRegistry::new();
    let mut files_scanned = 0;
    let mut filtered = 0;
    for file in tree.files_with_extension(detection.technology.extension()) {
        let Some(content) = read_source(file) else {
            continue;
        };
        files_scanned += 1;
        for route in sig.matches(&content) {
            if !path_passes_constraints(&route.path) {
                debug!(path = %route.path, file = %file.display(), "route filtered");
                filtered += 1;
                continue;
            }
            let line = line_of(&content, route.offset);
            registry.insert(EndpointRecord::from_source(
                route.path,
                file.clone(),
                line,
                route.methods,
            ));
        }
    }

    info!(
        technology = %detection.technology,
        files = files_scanned,
        endpoints = registry.len(),
        filtered,
        "static extraction complete"
    );
    Extraction {
        detection,
        endpoints: registry.into_records(),
        files_scanned,
        filtered,
        restricted: tree.restricted,
    }
}

/// `extract_endpoints(root)`: the deduplicated static endpoint list.
pub fn extract_endpoints(root: &Path) -> Vec<EndpointRecord> {
    extract(root, &[]).endpoints
}

fn read_source(file: &Path) -> Option<String> {
    match fs::read_to_string(file) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(file = %file.display(), error = %e, "skipping unreadable file");
            None
        }
    }
}
