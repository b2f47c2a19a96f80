// tests/similarity_props.rs
use news_digest_engine::normalize::normalize;
use news_digest_engine::similarity::similarity;

const SAMPLES: &[&str] = &[
    "OpenAI announces new model",
    "OpenAI announces new model today",
    "Completely different news story",
    "NVIDIA chip supply update",
    "",
    "a",
    "  Mixed CASE — with punctuation!!  ",
];

#[test]
fn similarity_is_symmetric_over_sample_pairs() {
    for a in SAMPLES {
        for b in SAMPLES {
            assert_eq!(
                similarity(a, b),
                similarity(b, a),
                "asymmetric for {a:?} / {b:?}"
            );
        }
    }
}

#[test]
fn similarity_identity_is_exactly_one() {
    for a in SAMPLES {
        assert_eq!(similarity(a, a), 1.0, "identity failed for {a:?}");
    }
}

#[test]
fn disjoint_trigram_sets_score_exactly_zero() {
    assert_eq!(similarity("abcdef", "uvwxyz"), 0.0);
    assert_eq!(similarity("first one", "zqx jkw"), 0.0);
}

#[test]
fn normalization_is_idempotent() {
    for a in SAMPLES {
        let once = normalize(a);
        assert_eq!(normalize(&once), once, "not idempotent for {a:?}");
    }
}

#[test]
fn near_duplicate_headlines_score_high() {
    let s = similarity(
        "OpenAI announces new model",
        "OpenAI announces new model today",
    );
    assert!(s >= 0.35, "expected clusterable similarity, got {s}");
}
