//! Recursive character splitting.
//!
//! Text is cut on the coarsest separator that occurs in it (paragraphs, then
//! lines, then words, then single characters). Pieces that still exceed the
//! chunk size are split again with the next separator; small neighbouring
//! pieces are merged back up to the chunk size, carrying up to `chunk_overlap`
//! characters of the previous chunk into the next one. Lengths are counted in
//! characters, not bytes.

use std::collections::VecDeque;

use crate::document::Document;
use crate::error::{RecoError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A retrievable slice of a [`Document`], tagged with its employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub employe: String,
}

#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RecursiveCharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RecoError::Configuration(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RecoError::Configuration(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        self.split_text(&document.text)
            .into_iter()
            .map(|text| Chunk {
                text,
                employe: document.metadata.employe.clone(),
            })
            .collect()
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.split_document(doc))
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();

        // Falls back to the last separator ("" = per character) when none occurs.
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut pending: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }

        chunks
    }

    /// Greedily packs pieces into chunks of at most `chunk_size` characters,
    /// seeding each new chunk with trailing pieces of the previous one up to
    /// `chunk_overlap` characters.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut out, &window);
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }
        push_trimmed(&mut out, &window);

        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_trimmed(out: &mut Vec<String>, window: &VecDeque<&str>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Splits before every occurrence of `separator`, so each separator stays at
/// the start of the piece that follows it. An empty separator splits into
/// characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces.retain(|p| !p.is_empty());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = RecursiveCharacterSplitter::default();
        let chunks = splitter.split_text("Employé: Jean\nScore: 72\n");
        assert_eq!(chunks, vec!["Employé: Jean\nScore: 72".to_string()]);
    }

    #[test]
    fn chunks_respect_size_and_prefer_line_boundaries() {
        let splitter = RecursiveCharacterSplitter::new(30, 0).unwrap();
        let text = "première ligne de texte\ndeuxième ligne de texte\ntroisième ligne";
        let chunks = splitter.split_text(text);

        assert_eq!(
            chunks,
            vec![
                "première ligne de texte".to_string(),
                "deuxième ligne de texte".to_string(),
                "troisième ligne".to_string(),
            ]
        );
    }

    #[test]
    fn neighbouring_chunks_overlap() {
        let splitter = RecursiveCharacterSplitter::new(20, 10).unwrap();
        let text = "un deux trois quatre cinq six sept huit neuf dix";
        let chunks = splitter.split_text(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 20, "chunk too long: {chunk:?}");
        }
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').next_back().unwrap();
            assert!(
                pair[1].contains(last_word),
                "{:?} does not overlap {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveCharacterSplitter::new(4, 1).unwrap();
        let chunks = splitter.split_text("ééééééééé");

        assert!(chunks.iter().all(|c| char_len(c) <= 4));
        let rebuilt: usize = chunks.iter().map(|c| char_len(c)).sum();
        assert!(rebuilt >= 9);
    }

    #[test]
    fn default_splitter_uses_thousand_and_hundred() {
        let splitter = RecursiveCharacterSplitter::default();
        assert_eq!(splitter.chunk_size(), 1000);
        assert_eq!(splitter.chunk_overlap(), 100);

        let custom = RecursiveCharacterSplitter::new(200, 20).unwrap();
        assert_eq!((custom.chunk_size(), custom.chunk_overlap()), (200, 20));
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        assert!(RecursiveCharacterSplitter::new(100, 100).is_err());
        assert!(RecursiveCharacterSplitter::new(0, 0).is_err());
    }

    #[test]
    fn chunks_keep_document_metadata() {
        let splitter = RecursiveCharacterSplitter::new(12, 0).unwrap();
        let doc = Document {
            text: "Employé: Marie\nScore: 85".to_string(),
            metadata: DocumentMetadata {
                employe: "Marie".to_string(),
            },
        };
        let chunks = splitter.split_document(&doc);

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.employe == "Marie"));
    }

    #[test]
    fn separators_stay_with_following_piece() {
        assert_eq!(split_keeping_separator("a b c", " "), vec!["a", " b", " c"]);
        assert_eq!(split_keeping_separator(" a", " "), vec![" a"]);
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }
}
