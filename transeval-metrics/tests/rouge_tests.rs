use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use rstest::rstest;
use transeval_core::{MetricInput, RougeType, ScoreValue, Scorer};
use transeval_metrics::calculators::RougeCalculator;

async fn rouge(calculator: &RougeCalculator, predicted: &str, references: &[&str]) -> Vec<(String, f64)> {
    let input = MetricInput::new(
        predicted,
        references.iter().map(|r| r.to_string()).collect(),
    );
    match calculator.compute(&input).await.unwrap().value {
        ScoreValue::Components(parts) => parts,
        other => panic!("expected ROUGE components, got {:?}", other),
    }
}

fn component(parts: &[(String, f64)], key: &str) -> f64 {
    parts
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, score)| *score)
        .unwrap_or_else(|| panic!("missing component {}", key))
}

// ===== Defaults =====

#[tokio::test]
async fn test_rouge_default_components() {
    let calculator = RougeCalculator::default();
    let parts = rouge(&calculator, "the cat sat on the mat", &["the cat sat on the mat"]).await;

    let keys: Vec<&str> = parts.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["rouge1", "rouge2", "rougeL", "rougeLsum"]);
    for (key, score) in &parts {
        assert_relative_eq!(*score, 1.0, epsilon = 1e-9);
        assert!(!key.is_empty());
    }
}

#[test]
fn test_rouge_fields() {
    let calculator = RougeCalculator::default();
    assert_eq!(
        calculator.fields(),
        vec![
            "Metric_rouge_rouge1".to_string(),
            "Metric_rouge_rouge2".to_string(),
            "Metric_rouge_rougeL".to_string(),
            "Metric_rouge_rougeLsum".to_string(),
        ]
    );
}

// ===== Partial Overlap =====

#[rstest]
#[case(RougeType::N(1), 0.6)]
#[case(RougeType::N(2), 0.25)]
#[case(RougeType::L, 0.6)]
#[case(RougeType::LSum, 0.6)]
fn test_rouge_partial_overlap(#[case] rouge_type: RougeType, #[case] expected: f64) {
    let calculator = RougeCalculator::default();
    let score = calculator.score_type(rouge_type, "the cat sat on mat", "the dog sat on floor");
    assert_relative_eq!(score.fmeasure, expected, epsilon = 1e-9);
}

#[test]
fn test_rouge1_precision_vs_recall() {
    let calculator = RougeCalculator::rouge_1();
    let score = calculator.score_type(RougeType::N(1), "the cat sat on the mat and played", "the cat sat");

    assert_relative_eq!(score.precision, 3.0 / 8.0, epsilon = 1e-9);
    assert_relative_eq!(score.recall, 1.0, epsilon = 1e-9);
}

#[tokio::test]
async fn test_rouge_no_overlap() {
    let calculator = RougeCalculator::default();
    let parts = rouge(&calculator, "hello world", &["goodbye universe"]).await;

    assert!(parts.iter().all(|(_, score)| *score == 0.0));
}

// ===== Tokenization =====

#[test]
fn test_rouge_ignores_case_and_punctuation() {
    let calculator = RougeCalculator::rouge_l();
    let score = calculator.score_type(RougeType::L, "The cat, sat!", "the cat sat");
    assert_relative_eq!(score.fmeasure, 1.0, epsilon = 1e-9);
}

#[tokio::test]
async fn test_rouge_korean_sample() {
    let calculator = RougeCalculator::default();
    let parts = rouge(&calculator, "이것은 예시 번역입니다.", &["이것은 예시 번역입니다."]).await;
    assert_relative_eq!(component(&parts, "rouge1"), 1.0, epsilon = 1e-9);

    let parts = rouge(&calculator, "또 다른 예시 번역입니다.", &["이것은 또 다른 예시입니다."]).await;
    // "또" and "다른" shared out of four tokens on each side
    assert_relative_eq!(component(&parts, "rouge1"), 0.5, epsilon = 1e-9);
    assert_relative_eq!(component(&parts, "rouge2"), 1.0 / 3.0, epsilon = 1e-9);
}

// ===== Summary-level LCS =====

#[test]
fn test_rouge_lsum_rewards_sentence_reordering() {
    let calculator = RougeCalculator::default();
    let predicted = "on the mat\nthe cat sat";
    let reference = "the cat sat on the mat";

    let rouge_l = calculator.score_type(RougeType::L, predicted, reference);
    let rouge_lsum = calculator.score_type(RougeType::LSum, predicted, reference);

    assert_relative_eq!(rouge_l.fmeasure, 0.5, epsilon = 1e-9);
    assert_relative_eq!(rouge_lsum.fmeasure, 1.0, epsilon = 1e-9);
}

#[test]
fn test_rouge_lsum_clips_repeated_tokens() {
    let calculator = RougeCalculator::default();
    // "the" appears twice in the prediction but once in the reference
    let score = calculator.score_type(RougeType::LSum, "the cat\nthe dog", "the cat");

    assert_relative_eq!(score.recall, 1.0, epsilon = 1e-9);
    assert_relative_eq!(score.precision, 0.5, epsilon = 1e-9);
}

#[test]
fn test_rouge_lsum_union_over_tied_alignments() {
    let calculator = RougeCalculator::default();
    let score = calculator.score_type(RougeType::LSum, "b a\nb", "a b");

    assert_relative_eq!(score.precision, 2.0 / 3.0, epsilon = 1e-9);
    assert_relative_eq!(score.recall, 1.0, epsilon = 1e-9);
    assert_relative_eq!(score.fmeasure, 0.8, epsilon = 1e-9);
}

// ===== Multiple References =====

#[tokio::test]
async fn test_rouge_best_reference_per_type() {
    let calculator = RougeCalculator::default();
    let parts = rouge(&calculator, "a b c", &["x y z", "a b c"]).await;

    assert!(parts.iter().all(|(_, score)| (*score - 1.0).abs() < 1e-9));
}

#[tokio::test]
async fn test_rouge_empty_prediction_scores_zero() {
    let calculator = RougeCalculator::default();
    let parts = rouge(&calculator, "", &["a b"]).await;
    assert!(parts.iter().all(|(_, score)| *score == 0.0));
}

#[tokio::test]
async fn test_rouge_metadata_has_precision_and_recall() {
    let calculator = RougeCalculator::rouge_2();
    let input = MetricInput::new("the cat sat", vec!["the cat ran".to_string()]);
    let result = calculator.compute(&input).await.unwrap();

    let rouge2 = &result.metadata["scores"]["rouge2"];
    assert_eq!(rouge2["precision"], 0.5);
    assert_eq!(rouge2["recall"], 0.5);
}
