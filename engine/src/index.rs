use crate::tokenizer::tokenize;
use std::collections::HashMap;

pub type TermId = u32;

/// One record's normalized weight for a term.
#[derive(Debug, Clone, Copy)]
pub struct Posting {
    pub position: u32,
    pub weight: f32,
}

/// TF-IDF vector-space index over food names.
///
/// The vocabulary excludes stop-words and is capped at a maximum term
/// count, keeping the terms most frequent across the corpus. Each corpus
/// position owns an L2-normalized weight vector, stored as per-term
/// posting lists; cosine similarity is then a dot product accumulated
/// over the query's terms. Built once after corpus construction and never
/// mutated.
#[derive(Debug)]
pub struct TfIdfIndex {
    dictionary: HashMap<String, TermId>,
    idf: Vec<f32>,
    postings: HashMap<TermId, Vec<Posting>>,
}

impl TfIdfIndex {
    /// Build the index over `names`. Returns `None` when no name produces
    /// a single indexable term; callers treat that as a permanently
    /// unavailable matcher, not a fatal error.
    pub fn build<S: AsRef<str>>(names: &[S], max_terms: usize) -> Option<Self> {
        if names.is_empty() || max_terms == 0 {
            return None;
        }
        let tokenized: Vec<Vec<String>> = names.iter().map(|n| tokenize(n.as_ref())).collect();

        // Document and corpus frequency per term.
        let mut df: HashMap<&str, u32> = HashMap::new();
        let mut cf: HashMap<&str, u32> = HashMap::new();
        for terms in &tokenized {
            let mut seen: Vec<&str> = Vec::new();
            for term in terms {
                *cf.entry(term.as_str()).or_insert(0) += 1;
                if !seen.contains(&term.as_str()) {
                    *df.entry(term.as_str()).or_insert(0) += 1;
                    seen.push(term.as_str());
                }
            }
        }
        if df.is_empty() {
            return None;
        }

        // Vocabulary capped by descending corpus frequency, alphabetical on
        // ties, so term ids are deterministic across builds.
        let mut vocab: Vec<&str> = df.keys().copied().collect();
        vocab.sort_by(|a, b| cf[b].cmp(&cf[a]).then(a.cmp(b)));
        vocab.truncate(max_terms);

        let num_docs = names.len() as u32;
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut idf: Vec<f32> = Vec::with_capacity(vocab.len());
        for (tid, term) in vocab.iter().enumerate() {
            dictionary.insert((*term).to_string(), tid as TermId);
            // Smoothed idf keeps terms present in every record above zero,
            // which preserves the exact-name round trip on tiny corpora.
            idf.push((1.0 + num_docs as f32 / df[term] as f32).ln());
        }

        // Per-record tf-idf vectors, L2-normalized, emitted as postings.
        let mut postings: HashMap<TermId, Vec<Posting>> = HashMap::new();
        for (position, terms) in tokenized.iter().enumerate() {
            let mut tf: HashMap<TermId, u32> = HashMap::new();
            for term in terms {
                if let Some(&tid) = dictionary.get(term.as_str()) {
                    *tf.entry(tid).or_insert(0) += 1;
                }
            }
            let weights: Vec<(TermId, f32)> = tf
                .into_iter()
                .map(|(tid, raw)| {
                    let tf = 1.0 + (raw as f32).ln();
                    (tid, tf * idf[tid as usize])
                })
                .collect();
            let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            if norm == 0.0 {
                continue;
            }
            for (tid, w) in weights {
                postings.entry(tid).or_default().push(Posting {
                    position: position as u32,
                    weight: w / norm,
                });
            }
        }
        // Records are visited in order, so each list is already sorted by
        // position.

        Some(Self {
            dictionary,
            idf,
            postings,
        })
    }

    /// Cosine similarity of `query` against every record, descending score
    /// with ties broken by ascending corpus position. Terms outside the
    /// vocabulary contribute nothing; a query that projects to the zero
    /// vector yields no candidates.
    pub fn score(&self, query: &str) -> Vec<(usize, f32)> {
        let mut tf: HashMap<TermId, u32> = HashMap::new();
        for term in tokenize(query) {
            if let Some(&tid) = self.dictionary.get(term.as_str()) {
                *tf.entry(tid).or_insert(0) += 1;
            }
        }
        if tf.is_empty() {
            return Vec::new();
        }

        let mut q_weights: Vec<(TermId, f32)> = tf
            .into_iter()
            .map(|(tid, raw)| {
                let tf = 1.0 + (raw as f32).ln();
                (tid, tf * self.idf[tid as usize])
            })
            .collect();
        let norm = q_weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        for (_, w) in q_weights.iter_mut() {
            *w /= norm;
        }

        let mut scores: HashMap<u32, f32> = HashMap::new();
        for (tid, q_w) in &q_weights {
            if let Some(plist) = self.postings.get(tid) {
                for p in plist {
                    *scores.entry(p.position).or_insert(0.0) += p.weight * q_w;
                }
            }
        }

        let mut ranked: Vec<(usize, f32)> = scores
            .into_iter()
            .map(|(pos, s)| (pos as usize, s.min(1.0)))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked
    }

    pub fn vocabulary_len(&self) -> usize {
        self.dictionary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_corpus_has_no_index() {
        let names: Vec<String> = Vec::new();
        assert!(TfIdfIndex::build(&names, 1000).is_none());
    }

    #[test]
    fn stopword_only_names_have_no_index() {
        assert!(TfIdfIndex::build(&["the", "and a"], 1000).is_none());
    }

    #[test]
    fn exact_name_scores_highest() {
        let names = ["Grilled Chicken Breast", "Brown Rice", "Chicken Soup"];
        let index = TfIdfIndex::build(&names, 1000).unwrap();
        let ranked = index.score("Grilled Chicken Breast");
        assert_eq!(ranked[0].0, 0);
        assert!(ranked[0].1 >= 0.99);
    }

    #[test]
    fn ties_break_on_lowest_position() {
        let names = ["Apple Pie", "Apple Pie", "Cherry Pie"];
        let index = TfIdfIndex::build(&names, 1000).unwrap();
        let ranked = index.score("apple pie");
        assert_eq!(ranked[0].0, 0);
        assert_eq!(ranked[1].0, 1);
    }

    #[test]
    fn out_of_vocabulary_query_matches_nothing() {
        let names = ["Brown Rice"];
        let index = TfIdfIndex::build(&names, 1000).unwrap();
        assert!(index.score("unobtainium").is_empty());
        assert!(index.score("").is_empty());
    }

    #[test]
    fn vocabulary_cap_keeps_most_frequent_terms() {
        let names = ["rice bowl", "rice salad", "rice cake", "quinoa"];
        let index = TfIdfIndex::build(&names, 1).unwrap();
        assert_eq!(index.vocabulary_len(), 1);
        // "rice" survives the cap, "quinoa" does not.
        assert!(!index.score("rice").is_empty());
        assert!(index.score("quinoa").is_empty());
    }
}
