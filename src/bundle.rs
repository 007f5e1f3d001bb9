//! Translation dictionaries and dictionary assembly.
//!
//! A `Bundle` is a parsed dictionary: the lookup side of a join. The
//! `Assembler` is the other direction, collecting phrases extracted from
//! documents and writing them back out as a dictionary file, either fresh
//! or merged with an existing bundle.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use crate::fragment::FragmentSequence;
use crate::scan::ScanReport;
use crate::xliff;
use crate::Result;

/// One `trans-unit` from a dictionary file.
#[derive(Debug)]
pub struct TranslationEntry {
    pub(crate) source: String,
    pub(crate) target_text: String,
    pub(crate) target: FragmentSequence,
    pub(crate) line: usize,
    pub(crate) col: usize,
}

impl TranslationEntry {
    /// The phrase as extracted from a document: escaped text with
    /// placeholder markers for inline elements.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The translated phrase in the same wire form.
    pub fn target(&self) -> &str {
        &self.target_text
    }

    /// 1-based position of the entry in the dictionary file.
    pub fn location(&self) -> (usize, usize) {
        (self.line, self.col)
    }
}

/// A parsed translation dictionary, indexed by source phrase.
#[derive(Debug)]
pub struct Bundle {
    entries: Vec<TranslationEntry>,
    index: HashMap<String, usize>,
    source_language: Option<String>,
    target_language: Option<String>,
    /// Recoverable problems found while parsing, in file order.
    pub warnings: Vec<String>,
}

impl Bundle {
    /// Parse an XLIFF 1.2 dictionary. Fails on a missing or mismatched
    /// format version and on files with no usable entries; per-entry
    /// problems are collected as warnings instead. When two entries share
    /// a source phrase the first one wins.
    pub fn parse(text: &str, path: &str) -> Result<Self> {
        let parsed = xliff::parse_dictionary(text, path)?;
        let mut warnings = parsed.warnings;

        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for entry in parsed.entries {
            match index.entry(entry.source.clone()) {
                Entry::Occupied(_) => {
                    warnings.push(format!(
                        "{path}:{}:{}: duplicate source entry, keeping the first",
                        entry.line, entry.col
                    ));
                }
                Entry::Vacant(slot) => {
                    slot.insert(entries.len());
                    entries.push(entry);
                }
            }
        }

        Ok(Self {
            entries,
            index,
            source_language: parsed.source_language,
            target_language: parsed.target_language,
            warnings,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by exact source phrase.
    pub fn get(&self, source: &str) -> Option<&TranslationEntry> {
        self.index.get(source).map(|&i| &self.entries[i])
    }

    /// Entries in dictionary file order.
    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    pub fn target_language(&self) -> Option<&str> {
        self.target_language.as_deref()
    }
}

/// Accumulates extracted phrases across documents and writes dictionary
/// files. Duplicate phrases collapse to one entry, first occurrence wins;
/// output is sorted by source phrase for deterministic diffs.
#[derive(Debug, Default)]
pub struct Assembler {
    phrases: Vec<String>,
    seen: HashSet<String>,
    language: Option<String>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct phrases collected so far.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Fold one document's scan results in. The first document language
    /// seen becomes the dictionary's source language.
    pub fn add_report(&mut self, report: &ScanReport) {
        for phrase in &report.phrases {
            if self.seen.insert(phrase.clone()) {
                self.phrases.push(phrase.clone());
            }
        }
        if self.language.is_none() {
            self.language.clone_from(&report.language);
        }
    }

    /// Write a fresh dictionary template. With `copy`, each target is
    /// filled with its own source text instead of the `TODO` placeholder.
    pub fn write_template<W: Write>(&self, copy: bool, out: &mut W) -> io::Result<()> {
        let mut pairs: Vec<(String, String)> = self
            .phrases
            .iter()
            .map(|source| {
                let target = if copy {
                    source.clone()
                } else {
                    "TODO".to_string()
                };
                (source.clone(), target)
            })
            .collect();
        pairs.sort();

        xliff::write_dictionary(
            out,
            self.language.as_deref().unwrap_or("TODO"),
            "TODO",
            &pairs,
        )
    }

    /// Merge the collected phrases with an existing dictionary and write
    /// the result. Phrases already translated keep their targets; new
    /// phrases get the placeholder (or their source text with `copy`);
    /// entries for phrases that no longer occur anywhere are dropped
    /// unless `keep` is set.
    pub fn write_update<W: Write>(
        &self,
        bundle: &Bundle,
        copy: bool,
        keep: bool,
        out: &mut W,
    ) -> io::Result<()> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(self.phrases.len());
        for source in &self.phrases {
            let target = match bundle.get(source) {
                Some(entry) => entry.target_text.clone(),
                None if copy => source.clone(),
                None => "TODO".to_string(),
            };
            pairs.push((source.clone(), target));
        }
        if keep {
            for entry in bundle.entries() {
                if !self.seen.contains(&entry.source) {
                    pairs.push((entry.source.clone(), entry.target_text.clone()));
                }
            }
        }
        pairs.sort();

        let source_language = bundle
            .source_language()
            .or(self.language.as_deref())
            .unwrap_or("TODO");
        xliff::write_dictionary(
            out,
            source_language,
            bundle.target_language().unwrap_or("TODO"),
            &pairs,
        )
    }
}
