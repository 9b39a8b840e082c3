//! Knowledge base loader: documents to paragraph-level passages

use std::path::Path;

use tracing::info;
use tracing::warn;

use crate::models::Passage;

/// Result of loading a knowledge base directory.
///
/// Unreadable files are reported, not fatal: the remaining documents still
/// produce a usable (if degraded) corpus.
#[derive(Debug, Default)]
pub struct LoadedKnowledgeBase {
    pub passages: Vec<Passage>,
    pub failed_files: Vec<String>,
}

/// Load every file in a directory into passages.
///
/// Files are visited in sorted name order so that passage ordering and ids
/// are deterministic for identical input.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> crate::Result<LoadedKnowledgeBase> {
    let mut entries: Vec<_> = std::fs::read_dir(&dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    let mut loaded = LoadedKnowledgeBase::default();
    for path in entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                loaded
                    .passages
                    .extend(split_into_passages(&name, &strip_markup(&raw)));
            }
            Err(e) => {
                warn!("Skipping unreadable knowledge base file {name}: {e}");
                loaded.failed_files.push(name);
            }
        }
    }

    info!(
        "Loaded {} passages from {} ({} file(s) failed)",
        loaded.passages.len(),
        dir.as_ref().display(),
        loaded.failed_files.len()
    );

    Ok(loaded)
}

/// Split markup-stripped text into paragraph passages.
///
/// Paragraphs are blank-line separated; whitespace-only paragraphs are
/// discarded and do not consume an index. Pure and deterministic.
pub fn split_into_passages(source_file: &str, text: &str) -> Vec<Passage> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .enumerate()
        .map(|(idx, paragraph)| Passage::new(source_file, idx, paragraph.to_string()))
        .collect()
}

/// Remove HTML tags from raw document text.
///
/// The knowledge base ships as HTML; retrieval operates on the visible text
/// only. Tag contents are dropped, everything else is kept verbatim.
pub fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
