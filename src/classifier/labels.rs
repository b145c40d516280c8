// SPDX-License-Identifier: MPL-2.0
//! ImageNet-1k label table loading.
//!
//! The label file is a plain text list with one class per line. Two formats
//! are accepted:
//!
//! - synset format: `n02123045 tabby, tabby cat` (WordNet id prefix)
//! - plain format: `tabby, tabby cat`
//!
//! The WordNet id is stripped; the remaining text is the display label.

use std::path::Path;

/// Ordered class labels, indexed by the model's output position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Parses a label table from file contents.
    ///
    /// Empty lines are skipped. Lines without a synset prefix are taken
    /// verbatim, so plain label lists work too.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let labels = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| strip_synset_id(line).to_string())
            .collect();
        Self { labels }
    }

    /// Loads and parses a label table from disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error message if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        Ok(Self::parse(&content))
    }

    /// The label at model output index `idx`, or a numeric placeholder when
    /// the table is shorter than the model's class count.
    #[must_use]
    pub fn label_for(&self, idx: usize) -> String {
        self.labels
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("class {idx}"))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Strips a leading WordNet synset id (`n` + 8 digits) if present.
fn strip_synset_id(line: &str) -> &str {
    let mut chars = line.char_indices();
    match chars.next() {
        Some((_, 'n')) => {}
        _ => return line,
    }

    let mut digits = 0;
    let mut rest_start = line.len();
    for (i, c) in chars {
        if c.is_ascii_digit() {
            digits += 1;
        } else {
            rest_start = i;
            break;
        }
    }

    if digits == 8 {
        line[rest_start..].trim_start()
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_synset_format() {
        let table = LabelTable::parse("n02123045 tabby, tabby cat\nn02123159 tiger cat\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.label_for(0), "tabby, tabby cat");
        assert_eq!(table.label_for(1), "tiger cat");
    }

    #[test]
    fn parses_plain_format() {
        let table = LabelTable::parse("tabby cat\ntiger cat\nEgyptian cat\n");
        assert_eq!(table.len(), 3);
        assert_eq!(table.label_for(2), "Egyptian cat");
    }

    #[test]
    fn skips_empty_lines() {
        let table = LabelTable::parse("tabby cat\n\n\ntiger cat\n");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn out_of_range_index_gets_placeholder() {
        let table = LabelTable::parse("only one\n");
        assert_eq!(table.label_for(963), "class 963");
    }

    #[test]
    fn labels_starting_with_n_are_not_stripped() {
        // "night owl" starts with 'n' but has no 8-digit id
        let table = LabelTable::parse("night owl\nn123 partial id\n");
        assert_eq!(table.label_for(0), "night owl");
        assert_eq!(table.label_for(1), "n123 partial id");
    }

    #[test]
    fn load_missing_file_errors() {
        let err = LabelTable::load(Path::new("/nonexistent/labels.txt"));
        assert!(err.is_err());
    }
}
