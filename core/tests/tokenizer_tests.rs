use kwsearch_core::tokenizer::{Normalizer, NormalizerConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn it_normalizes_and_stems() {
    let words = Normalizer::default().normalize("Running Runners RUN! The dog's bowl.");
    assert!(words.contains(&"run".to_string()));
    // apostrophe is stripped, not split on
    assert!(words.contains(&"dog".to_string()) || words.contains(&"dogs".to_string()));
    assert!(!words.iter().any(|w| w.contains('\'') || w.contains('!')));
}

#[test]
fn it_filters_stopwords() {
    let words = Normalizer::default().normalize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words.len(), 5);
}

const VOCABULARY: &[&str] = &[
    "outs", "overs", "ons", "ifs", "downs", "offs", "agreed", "agreement", "running", "dogs",
    "chased", "cats", "escape", "expectations", "quietly", "places", "generously", "generalization",
    "relational", "conditional", "hopefulness", "organization", "universities", "crying", "flies",
    "dying", "happily", "national", "operational", "feudalism", "sensibility", "adjustable", "replacement",
    "communism", "activation", "probate", "electricity", "connections", "argued", "troubled", "sized",
    "hoping", "filing", "controlling", "skies", "news", "atlas", "cosmos", "bias", "andes", "gently",
    "abundantly", "ponies", "caresses", "detective", "vault", "thieves", "robbers", "Heist!", "The",
];

fn assert_stable(n: &Normalizer, text: &str) {
    let once = n.normalize(text);
    let twice = n.normalize(&once.join(" "));
    assert_eq!(once, twice, "normalizing {text:?} again changed its tokens");
}

#[test]
fn normalizing_twice_is_stable() {
    let n = Normalizer::default();
    for word in VOCABULARY {
        assert_stable(&n, word);
    }
    assert_stable(&n, &VOCABULARY.join(" "));
    assert_stable(&n, "Running dogs chased the cats!");
}

#[test]
fn stems_never_land_on_stopwords() {
    let n = Normalizer::default();
    for word in VOCABULARY {
        for token in n.normalize(word) {
            assert!(!n.is_stopword(&token), "{word:?} produced stopword token {token:?}");
        }
    }
    assert!(n.normalize("outs overs ons ifs downs offs").is_empty());
}

#[test]
fn stopwords_can_come_from_a_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stopwords.txt");
    fs::write(&path, "quick\n\n  Brown \n").unwrap();
    let config = NormalizerConfig::default().with_stopwords_file(&path).unwrap();
    let words = Normalizer::new(config).normalize("The quick brown fox");
    // "the" is no longer a stopword once the file replaces the defaults
    assert_eq!(words, vec!["the".to_string(), "fox".to_string()]);
}

#[test]
fn stopword_file_entries_lose_their_punctuation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stopwords.txt");
    fs::write(&path, "don't\nIt's\n").unwrap();
    let config = NormalizerConfig::default().with_stopwords_file(&path).unwrap();
    let n = Normalizer::new(config);
    assert!(n.is_stopword("dont"));
    assert_eq!(n.normalize("Don't stop, it's late"), vec!["stop".to_string(), "late".to_string()]);
}

#[test]
fn missing_stopword_file_is_reported() {
    let dir = tempdir().unwrap();
    let err = NormalizerConfig::default()
        .with_stopwords_file(dir.path().join("nope.txt"))
        .unwrap_err();
    assert_eq!(err.kind(), kwsearch_core::ErrorKind::Persistence);
}

#[test]
fn compatibility_folding_is_opt_in() {
    let plain = Normalizer::default();
    let folded = Normalizer::new(NormalizerConfig { fold_compatibility: true, ..NormalizerConfig::default() });
    assert_eq!(folded.normalize("\u{FB01}nance"), plain.normalize("finance"));
    assert_ne!(plain.normalize("\u{FB01}nance"), plain.normalize("finance"));
}
