use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokenize a food name or query into stemmed terms using NFKC
/// normalization, lowercasing, and stop-word removal.
///
/// Names and queries go through this same pipeline so that a record's own
/// name always projects onto the identical term set at lookup time.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    let mut terms = Vec::new();
    for mat in RE.find_iter(&normalized) {
        let token = mat.as_str();
        if is_stopword(token) {
            continue;
        }
        terms.push(STEMMER.stem(token).to_string());
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_stems() {
        let terms = tokenize("Grilled Chicken Breasts");
        assert!(terms.contains(&"chicken".to_string()));
        assert!(terms.contains(&"breast".to_string()));
    }

    #[test]
    fn folds_unicode_and_case() {
        // NFKC unifies composed/decomposed forms and lowercasing folds
        // case; diacritics themselves are preserved.
        let terms = tokenize("CAFE\u{301} Latte");
        assert!(terms.contains(&"café".to_string()));
        assert!(terms.contains(&"latt".to_string()) || terms.contains(&"latte".to_string()));
    }

    #[test]
    fn filters_stopwords() {
        let terms = tokenize("a bowl of rice and the beans");
        assert!(!terms.contains(&"of".to_string()));
        assert!(!terms.contains(&"the".to_string()));
        assert!(terms.contains(&"rice".to_string()));
    }

    #[test]
    fn empty_input_yields_no_terms() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
