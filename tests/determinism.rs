use confidence::{ConfidenceEngine, EngineConfig};

fn stub_engine() -> ConfidenceEngine {
    ConfidenceEngine::from_config(&EngineConfig::stub()).expect("stub engine")
}

#[test]
fn repeated_scoring_is_bit_identical() {
    let engine = stub_engine();
    let question = "Which element has atomic number 1?";
    let options = ["Hydrogen", "Helium", "Oxygen", "Carbon"];

    let first = engine.score_all(question, &options, "Hydrogen").unwrap();
    for _ in 0..5 {
        let again = engine.score_all(question, &options, "Hydrogen").unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn two_engines_agree_on_the_same_inputs() {
    let a = stub_engine();
    let b = stub_engine();
    let question = "What force keeps planets in orbit?";
    let options = ["Gravity", "Magnetism", "Friction"];

    assert_eq!(
        a.score_all(question, &options, "Gravity").unwrap(),
        b.score_all(question, &options, "Gravity").unwrap()
    );
}

#[test]
fn embeddings_are_stable_across_batch_shapes() {
    let engine = stub_engine();

    let alone = engine.embed(&["photosynthesis"]).unwrap();
    let grouped = engine
        .embed(&["respiration", "photosynthesis", "osmosis"])
        .unwrap();

    assert_eq!(alone[0].vector, grouped[1].vector);
}

#[test]
fn embedding_norms_hold_for_varied_inputs() {
    let engine = stub_engine();
    let texts = [
        "a",
        "Hello 世界",
        "What is the powerhouse of the cell?",
        "!@#$%^&*()",
    ];

    for e in engine.embed(&texts).unwrap() {
        assert!((e.l2_norm() - 1.0).abs() < 1e-5, "norm {}", e.l2_norm());
    }
}

#[test]
fn serialized_scores_roundtrip() -> anyhow::Result<()> {
    let engine = stub_engine();
    let scores = engine.score_all(
        "Which ocean is the largest?",
        &["Pacific", "Atlantic"],
        "Pacific",
    )?;

    let json = serde_json::to_string(&scores)?;
    let back: std::collections::HashMap<String, f32> = serde_json::from_str(&json)?;

    assert_eq!(scores, back);
    Ok(())
}
