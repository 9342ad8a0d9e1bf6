use playforge::alphabet::Alphabet;
use playforge::consts::CRIB_SCALE;
use playforge::scorer::{load_ngrams, CribScorer, Scorer};
use rstest::rstest;
use std::fs::File;
use std::io::Write;

fn classic() -> Alphabet {
    Alphabet::standard(5).unwrap()
}

fn crib_scorer(crib: &str) -> Scorer {
    let a = classic();
    Scorer::Crib(CribScorer::new(a.strict(crib).unwrap(), 0, 0).unwrap())
}

#[rstest]
#[case::exact("ATTACKATDAWN", 25_000)]
#[case::half_wrong("ATTACKXXXXXX", 12_500)]
#[case::alternating("AXTXCXAXDXWX", 12_500)]
#[case::one_wrong("ATTACKATDAWX", 22_917)]
#[case::all_wrong("XXXXXXXXXXXX", 0)]
#[case::longer_candidate("ATTACKATDAWNQQ", 25_000)]
fn test_crib_scores(#[case] candidate: &str, #[case] expected: i64) {
    let scorer = crib_scorer("ATTACKATDAWN");
    assert_eq!(scorer.score(&classic().sanitize(candidate)), expected);
}

#[test]
fn test_crib_scale_is_the_maximum() {
    let scorer = crib_scorer("HELLO");
    assert_eq!(scorer.score(&classic().sanitize("HELLO")), CRIB_SCALE);
}

#[test]
fn test_crib_offset_range() {
    let a = classic();
    let scorer = Scorer::Crib(CribScorer::new(a.strict("DAWN").unwrap(), 0, 8).unwrap());
    assert_eq!(scorer.score(&a.sanitize("ATTACKATDAWN")), CRIB_SCALE);

    let fixed = Scorer::Crib(CribScorer::new(a.strict("DAWN").unwrap(), 0, 7).unwrap());
    assert!(fixed.score(&a.sanitize("ATTACKATDAWN")) < CRIB_SCALE);
}

#[test]
fn test_ngram_fitness_prefers_language() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("trigrams.tsv");
    let mut f = File::create(&path).unwrap();
    for (gram, count) in [
        ("THE", 10_000),
        ("HEA", 900),
        ("EAT", 700),
        ("ATT", 600),
        ("TTA", 300),
        ("TAC", 200),
        ("ACK", 500),
        ("AND", 8_000),
        ("ING", 7_000),
    ] {
        writeln!(f, "{}\t{}", gram, count).unwrap();
    }
    drop(f);

    let a = classic();
    let table = load_ngrams(&path, &a).unwrap();
    assert_eq!(table.order(), 3);
    let scorer = Scorer::Ngrams(table);

    let english = scorer.score(&a.sanitize("THEATTACK"));
    let noise = scorer.score(&a.sanitize("QZVKWPQXZ"));
    assert!(english > noise, "{} <= {}", english, noise);
    assert_eq!(noise, 0);

    // More matching windows, higher fitness.
    assert!(scorer.score(&a.sanitize("THETHE")) > scorer.score(&a.sanitize("THE")));
}

#[test]
fn test_missing_ngram_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let res = load_ngrams(dir.path().join("absent.tsv"), &classic());
    assert!(res.is_err());
}
