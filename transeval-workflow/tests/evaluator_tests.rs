use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use transeval_core::{
    Corpus, EvalError, MetricId, MetricInput, MetricsConfig, Reference, Result, ScoreResult,
    Scorer, ValidationMode,
};
use transeval_metrics::{BleuCalculator, MetricRegistry, TerCalculator};
use transeval_workflow::*;

/// Fails on any prediction containing "boom".
struct FlakyScorer {
    id: MetricId,
    fields: Vec<String>,
}

#[async_trait]
impl Scorer for FlakyScorer {
    fn id(&self) -> MetricId {
        self.id
    }

    fn fields(&self) -> Vec<String> {
        self.fields.clone()
    }

    async fn compute(&self, input: &MetricInput) -> Result<ScoreResult> {
        if input.predicted.contains("boom") {
            return Err(EvalError::metric(self.id.as_str(), "backend exploded"));
        }
        Ok(ScoreResult::components(
            vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)],
            serde_json::Value::Null,
        ))
    }
}

fn sample_corpus() -> Corpus {
    Corpus::new(
        vec![
            "이것은 예시 번역입니다.".to_string(),
            "또 다른 예시 번역입니다.".to_string(),
        ],
        vec![
            Reference::from(vec!["이것은 예시 번역입니다."]),
            Reference::from(vec!["이것은 또 다른 예시입니다."]),
        ],
    )
}

fn corpus(predictions: &[&str], references: Vec<Reference>) -> Corpus {
    Corpus::new(predictions.iter().map(|p| p.to_string()).collect(), references)
}

fn standard_registry() -> MetricRegistry {
    MetricRegistry::standard(&MetricsConfig::default()).unwrap()
}

// ===== End to End =====

#[tokio::test]
async fn test_sample_corpus_scores() {
    let mut evaluator =
        TranslationEvaluator::new(sample_corpus(), standard_registry(), ValidationMode::Strict)
            .unwrap();

    let rows = evaluator.compute_scores().await.to_vec();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].sentence_references, "이것은 예시 번역입니다.");
    assert_eq!(rows[0].sentence_predictions, "이것은 예시 번역입니다.");
    assert_eq!(rows[1].sentence_references, "이것은 또 다른 예시입니다.");

    let bleu0 = rows[0].get("Metric_bleu").flatten().unwrap();
    let bleu1 = rows[1].get("Metric_bleu").flatten().unwrap();
    assert!((bleu0 - 1.0).abs() < 1e-9);
    assert!(bleu1 < bleu0);

    let rouge0 = rows[0].get("Metric_rouge_rouge1").flatten().unwrap();
    let rouge1 = rows[1].get("Metric_rouge_rouge1").flatten().unwrap();
    assert!(rouge1 < rouge0);

    assert_eq!(rows[0].get("Metric_ter"), Some(Some(0.0)));
    assert!(evaluator.failures().is_empty());
}

#[tokio::test]
async fn test_row_columns_follow_registration_order() {
    let mut evaluator =
        TranslationEvaluator::new(sample_corpus(), standard_registry(), ValidationMode::Lenient)
            .unwrap();
    let rows = evaluator.compute_scores().await;

    assert_eq!(
        rows[0].metric_columns().collect::<Vec<_>>(),
        vec![
            "Metric_bleu",
            "Metric_meteor",
            "Metric_ter",
            "Metric_rouge_rouge1",
            "Metric_rouge_rouge2",
            "Metric_rouge_rougeL",
            "Metric_rouge_rougeLsum",
        ]
    );
}

// ===== Row Contract =====

#[tokio::test]
async fn test_one_row_per_pair_with_stable_index() {
    let predictions = ["a", "b c", "d e f", "g", "h i"];
    let references = predictions.iter().map(|p| Reference::from(*p)).collect();
    let mut evaluator = TranslationEvaluator::new(
        corpus(&predictions, references),
        standard_registry(),
        ValidationMode::Lenient,
    )
    .unwrap();

    let rows = evaluator.compute_scores().await;

    assert_eq!(rows.len(), predictions.len());
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.index, i);
        assert_eq!(row.sentence_predictions, predictions[i]);
    }
}

#[tokio::test]
async fn test_reference_display_forms() {
    let corpus = corpus(
        &["x", "y"],
        vec![
            Reference::from("single, with comma"),
            Reference::from(vec!["first", "second", "third"]),
        ],
    );
    let mut evaluator =
        TranslationEvaluator::new(corpus, standard_registry(), ValidationMode::Lenient).unwrap();
    let rows = evaluator.compute_scores().await;

    assert_eq!(rows[0].sentence_references, "single, with comma");
    assert_eq!(rows[1].sentence_references, "first ||| second ||| third");
}

// ===== Validation =====

#[tokio::test]
async fn test_length_mismatch_fails_before_scoring() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.csv");

    let result = TranslationEvaluator::new(
        corpus(&["a", "b"], vec![Reference::from("a")]),
        standard_registry(),
        ValidationMode::Lenient,
    );

    assert!(matches!(result, Err(EvalError::InvalidInput(_))));
    assert!(!output.exists());
}

#[test]
fn test_strict_mode_rejects_ragged_references() {
    let result = TranslationEvaluator::new(
        corpus(
            &["a", "b"],
            vec![Reference::from(vec!["a", "aa"]), Reference::from(vec!["b"])],
        ),
        standard_registry(),
        ValidationMode::Strict,
    );

    assert!(matches!(result, Err(EvalError::InvalidInput(_))));
}

// ===== Fault Isolation =====

#[tokio::test]
async fn test_failed_metric_nulls_only_its_fields() {
    let registry = MetricRegistry::builder()
        .register(TerCalculator::default())
        .register(FlakyScorer {
            id: MetricId::Rouge,
            fields: vec!["Metric_rouge_a".to_string(), "Metric_rouge_b".to_string()],
        })
        .build()
        .unwrap();

    let corpus = corpus(
        &["fine", "boom here", "fine again"],
        vec!["fine".into(), "boom here".into(), "fine again".into()],
    );
    let mut evaluator =
        TranslationEvaluator::new(corpus, registry, ValidationMode::Lenient).unwrap();
    let rows = evaluator.compute_scores().await.to_vec();

    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].get("Metric_rouge_a"), Some(Some(1.0)));
    assert_eq!(rows[0].get("Metric_rouge_b"), Some(Some(2.0)));

    assert_eq!(rows[1].get("Metric_rouge_a"), Some(None));
    assert_eq!(rows[1].get("Metric_rouge_b"), Some(None));
    assert_eq!(rows[1].get("Metric_ter"), Some(Some(0.0)));
    assert_eq!(rows[1].sentence_predictions, "boom here");

    assert_eq!(rows[2].get("Metric_rouge_a"), Some(Some(1.0)));

    let failures = evaluator.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].metric, MetricId::Rouge);
    assert_eq!(failures[0].row, 1);
    assert!(failures[0].message.contains("backend exploded"));
}

#[tokio::test]
async fn test_empty_prediction_nulls_bleu_only() {
    let mut evaluator = TranslationEvaluator::new(
        corpus(&["", "the cat"], vec!["the cat".into(), "the cat".into()]),
        standard_registry(),
        ValidationMode::Lenient,
    )
    .unwrap();
    let rows = evaluator.compute_scores().await.to_vec();

    assert_eq!(rows[0].get("Metric_bleu"), Some(None));
    assert_eq!(rows[0].get("Metric_meteor"), Some(Some(0.0)));
    assert_eq!(rows[0].get("Metric_ter"), Some(Some(100.0)));
    assert_eq!(rows[0].get("Metric_rouge_rouge1"), Some(Some(0.0)));
    assert!(rows[1].get("Metric_bleu").flatten().is_some());

    assert_eq!(evaluator.failures().len(), 1);
    assert_eq!(evaluator.failures()[0].metric, MetricId::Bleu);
}

#[tokio::test]
async fn test_row_without_references_keeps_running() {
    let mut evaluator = TranslationEvaluator::new(
        corpus(&["a", "b"], vec![Reference::Multiple(vec![]), "b".into()]),
        standard_registry(),
        ValidationMode::Lenient,
    )
    .unwrap();
    let rows = evaluator.compute_scores().await.to_vec();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].sentence_references, "");
    assert!(rows[0].scores.iter().all(|(_, value)| value.is_none()));
    assert!(rows[1].scores.iter().all(|(_, value)| value.is_some()));
    assert_eq!(evaluator.failures().len(), 4);
}

// ===== Idempotence =====

#[tokio::test]
async fn test_recomputing_gives_identical_rows() {
    let mut evaluator =
        TranslationEvaluator::new(sample_corpus(), standard_registry(), ValidationMode::Lenient)
            .unwrap();

    let first = evaluator.compute_scores().await.to_vec();
    let second = evaluator.compute_scores().await.to_vec();

    assert_eq!(first, second);
    assert_eq!(evaluator.results().len(), 2);
}

#[tokio::test]
async fn test_report_carries_rows_and_failures() {
    let mut evaluator = TranslationEvaluator::new(
        corpus(&["", "the cat"], vec!["the cat".into(), "the cat".into()]),
        standard_registry(),
        ValidationMode::Lenient,
    )
    .unwrap();
    evaluator.compute_scores().await;

    let report = evaluator.report();
    assert_eq!(report.rows.as_slice(), evaluator.results());
    assert_eq!(report.failures.as_slice(), evaluator.failures());
    assert_eq!(report.failures[0].row, 0);
}

// ===== Persistence =====

#[tokio::test]
async fn test_save_to_csv() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("nested").join("scores.csv");

    let registry = MetricRegistry::builder()
        .register(BleuCalculator::default())
        .build()
        .unwrap();
    let mut evaluator = TranslationEvaluator::new(sample_corpus(), registry, ValidationMode::Strict)
        .unwrap()
        .with_output_path(&output);
    evaluator.compute_scores().await;

    let written = evaluator.save_to_csv().unwrap();
    assert!(written.is_absolute());
    assert!(written.ends_with("scores.csv"));

    let mut reader = csv::Reader::from_path(&written).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(
        header,
        vec!["index", "sentence_references", "sentence_predictions", "Metric_bleu"]
    );

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][0], "0");
    assert_eq!(&records[0][1], "이것은 예시 번역입니다.");
    assert_eq!(&records[0][3], "1.0");
    assert_eq!(&records[1][0], "1");
}

#[test]
fn test_default_output_path() {
    let evaluator =
        TranslationEvaluator::new(sample_corpus(), standard_registry(), ValidationMode::Lenient)
            .unwrap();
    assert_eq!(evaluator.output_path().to_str(), Some(DEFAULT_OUTPUT_PATH));
    assert!(evaluator.results().is_empty());
}

#[tokio::test]
async fn test_score_corpus_free_function() {
    let registry = MetricRegistry::builder()
        .register(TerCalculator::default())
        .build()
        .unwrap();

    let report = score_corpus(&sample_corpus(), &registry).await;

    assert_eq!(report.rows.len(), 2);
    assert!(report.failures.is_empty());
    assert!(report.rows[1].get("Metric_ter").flatten().unwrap() > 0.0);
}
