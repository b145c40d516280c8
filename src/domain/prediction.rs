// SPDX-License-Identifier: MPL-2.0
//! Prediction types returned by the classifier.
//!
//! A [`PredictionSet`] is an ordered list of label/score pairs. The ordering
//! invariant (scores non-increasing) is enforced at construction so the UI
//! can treat the first element as the headline prediction without re-sorting.

/// Lower bound for the user-selectable result count.
pub const TOP_K_MIN: u8 = 1;

/// Upper bound for the user-selectable result count.
pub const TOP_K_MAX: u8 = 10;

/// Default result count when no preference is configured.
pub const TOP_K_DEFAULT: u8 = 5;

/// A single classification result: a class label and its confidence score.
///
/// Scores are probabilities in `[0, 1]` (softmax output).
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    label: String,
    score: f32,
}

impl Prediction {
    /// Creates a prediction, clamping the score into `[0, 1]`.
    #[must_use]
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score: score.clamp(0.0, 1.0),
        }
    }

    /// The human-readable class label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The confidence score in `[0, 1]`.
    #[must_use]
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Formats the score as a percentage with two decimals, e.g. `87.34%`.
    #[must_use]
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.score * 100.0)
    }
}

/// An ordered set of predictions, scores non-increasing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSet {
    items: Vec<Prediction>,
}

impl PredictionSet {
    /// Builds a set from unordered predictions, sorting by descending score.
    ///
    /// The sort is stable: equal scores keep their input order, which keeps
    /// label ordering deterministic for repeated calls on the same output.
    #[must_use]
    pub fn from_unsorted(mut items: Vec<Prediction>) -> Self {
        items.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { items }
    }

    /// The headline prediction (highest score), if any.
    #[must_use]
    pub fn top(&self) -> Option<&Prediction> {
        self.items.first()
    }

    /// The highest score in the set, used to scale relative bars.
    #[must_use]
    pub fn max_score(&self) -> f32 {
        self.top().map_or(0.0, Prediction::score)
    }

    /// Truncates the set to at most `k` entries.
    #[must_use]
    pub fn truncated(mut self, k: usize) -> Self {
        self.items.truncate(k);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a PredictionSet {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> PredictionSet {
        PredictionSet::from_unsorted(vec![
            Prediction::new("tiger cat", 0.05),
            Prediction::new("tabby cat", 0.91),
            Prediction::new("Egyptian cat", 0.02),
        ])
    }

    #[test]
    fn from_unsorted_orders_by_descending_score() {
        let set = sample_set();
        let scores: Vec<f32> = set.iter().map(Prediction::score).collect();
        assert_eq!(scores, vec![0.91, 0.05, 0.02]);
    }

    #[test]
    fn top_is_first_element() {
        let set = sample_set();
        let top = set.top().expect("set is non-empty");
        assert_eq!(top.label(), "tabby cat");
        assert_eq!(top, set.iter().next().unwrap());
    }

    #[test]
    fn percent_formats_two_decimals() {
        let p = Prediction::new("tabby cat", 0.8734);
        assert_eq!(p.percent(), "87.34%");
    }

    #[test]
    fn headline_percent_for_tabby_cat_scenario() {
        let set = sample_set();
        assert_eq!(set.top().unwrap().percent(), "91.00%");
    }

    #[test]
    fn score_is_clamped_to_unit_interval() {
        assert_eq!(Prediction::new("x", 1.5).score(), 1.0);
        assert_eq!(Prediction::new("x", -0.2).score(), 0.0);
    }

    #[test]
    fn truncated_caps_length() {
        let set = sample_set().truncated(1);
        assert_eq!(set.len(), 1);
        assert_eq!(set.top().unwrap().label(), "tabby cat");
    }

    #[test]
    fn truncate_beyond_length_is_noop() {
        let set = sample_set().truncated(10);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn empty_set_has_no_top() {
        let set = PredictionSet::default();
        assert!(set.top().is_none());
        assert!(set.is_empty());
        assert_eq!(set.max_score(), 0.0);
    }

    #[test]
    fn stable_sort_keeps_equal_scores_in_input_order() {
        let set = PredictionSet::from_unsorted(vec![
            Prediction::new("a", 0.5),
            Prediction::new("b", 0.5),
        ]);
        let labels: Vec<&str> = set.iter().map(Prediction::label).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }
}
