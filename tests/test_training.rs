//! Integration tests for metrics, splitting and the model orchestrator

use hevea_ml::dataset::{encode_clone_groups, matrix_from_rows, Dataset};
use hevea_ml::training::{
    build_classifier, k_fold_split, train_test_indices, ClassificationMetrics, Classifier, ModelType,
    RegressionMetrics, TrainEngine, TrainingConfig,
};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Three well separated clusters of marker-like values
fn three_clones(n_per_class: usize) -> (Array2<f64>, Array1<usize>) {
    let centers = [[0.0, 0.0, 1.0], [4.0, 4.0, 0.0], [0.0, 8.0, 2.0]];
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..n_per_class {
        for (class, c) in centers.iter().enumerate() {
            let jitter = (i as f64 * 0.37).sin() * 0.3;
            rows.push(vec![c[0] + jitter, c[1] - jitter, c[2] + jitter * 0.5]);
            labels.push(class);
        }
    }
    (matrix_from_rows(&rows).unwrap(), Array1::from_vec(labels))
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn test_scenario_confusion_matrix() {
    let m = ClassificationMetrics::compute(&[0, 0, 1, 1], &[0, 1, 1, 1]).unwrap();
    assert_eq!(m.confusion_matrix, vec![vec![1, 1], vec![0, 2]]);
    assert_eq!(m.accuracy, 0.75);
}

#[test]
fn test_perfect_prediction() {
    let labels = [2usize, 0, 1, 1, 2];
    let m = ClassificationMetrics::compute(&labels, &labels).unwrap();
    assert_eq!(m.accuracy, 1.0);
    assert_eq!(m.balanced_accuracy, 1.0);
    for (i, row) in m.confusion_matrix.iter().enumerate() {
        for (j, &cell) in row.iter().enumerate() {
            if i != j {
                assert_eq!(cell, 0);
            }
        }
    }

    let r = RegressionMetrics::compute(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!((r.r2, r.rmse, r.mae), (1.0, 0.0, 0.0));
}

#[test]
fn test_predicting_the_mean_scores_zero_r2() {
    let r = RegressionMetrics::compute(&[1.0, 2.0, 3.0, 4.0], &[2.5, 2.5, 2.5, 2.5]).unwrap();
    assert!(r.r2.abs() < 1e-12);
}

// ============================================================================
// Splitting
// ============================================================================

#[test]
fn test_scenario_seventy_thirty() {
    let split = train_test_indices(10, 0.3, true, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
    assert_eq!((split.train.len(), split.test.len()), (7, 3));
}

#[test]
fn test_scenario_five_folds_of_two() {
    let folds = k_fold_split(10, 5, true, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
    assert_eq!(folds.len(), 5);
    assert!(folds.iter().all(|f| f.test_indices.len() == 2));
}

// ============================================================================
// Orchestrator
// ============================================================================

#[test]
fn test_orchestrator_skips_unknown_ids() {
    let (x, y) = three_clones(10);
    let engine = TrainEngine::new(TrainingConfig::new().with_random_seed(42));
    let results = engine.train_models(&["rf", "bogus-id", "knn"], &x, &y, None).unwrap();

    assert_eq!(results.len(), 2);
    let mut ids: Vec<&str> = results.iter().map(|r| r.model_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["knn", "rf"]);
}

#[test]
fn test_every_model_trains_on_separable_clones() {
    let (x, y) = three_clones(12);
    let engine = TrainEngine::new(TrainingConfig::new().with_random_seed(7));
    let ids: Vec<&str> = ModelType::ALL.iter().map(|m| m.id()).collect();
    let results = engine.train_models(&ids, &x, &y, None).unwrap();

    assert_eq!(results.len(), ModelType::ALL.len());
    for r in &results {
        assert!((0.0..=1.0).contains(&r.accuracy), "{} accuracy out of range", r.name);
        assert_eq!(r.n_test(), 11);
    }
    // trained models separate the clusters; the random projection is not trained
    for r in results.iter().filter(|r| r.model_id != "mlp") {
        assert!(r.accuracy >= 0.8, "{} scored {}", r.name, r.accuracy);
    }
}

#[test]
fn test_single_class_request_aborts() {
    let x = Array2::from_shape_fn((6, 2), |(i, j)| (i + j) as f64);
    let y = Array1::from_elem(6, 3usize);
    let err = TrainEngine::default().train_models(&["rf"], &x, &y, None).unwrap_err();
    assert!(err.to_string().contains("insufficient classes"));
}

#[test]
fn test_sparse_labels_stay_within_label_set() {
    let (x, y) = three_clones(10);
    let y = y.mapv(|class| if class == 0 { 0 } else { 1_000_000 });
    let engine = TrainEngine::new(TrainingConfig::new().with_random_seed(4));
    let results = engine.train_models(&["knn", "mlp"], &x, &y, None).unwrap();

    assert_eq!(results.len(), 2);
    for r in &results {
        assert!(r.classes.iter().all(|c| [0, 1_000_000].contains(c)), "{} classes {:?}", r.name, r.classes);
        assert_eq!(r.confusion_matrix.len(), r.classes.len());
        assert_eq!(r.confusion_matrix.iter().flatten().sum::<usize>(), r.n_test());
    }
}

#[test]
fn test_failing_models_do_not_stop_siblings() {
    let x = Array2::from_shape_fn((30, 3), |(i, j)| 2e6 + (i * 997 + j * 131) as f64);
    let y: Array1<f64> = (0..30).map(|i| (i % 7) as f64).collect();
    let results = TrainEngine::new(TrainingConfig::new().with_random_seed(6))
        .train_regression_models(&x, &y, &["Linear Regression", "Ridge Regression", "Random Forest"])
        .unwrap();

    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Random Forest"]);
}

#[test]
fn test_classifier_factory_respects_trait_seam() {
    let (x, y) = three_clones(6);
    for model in ModelType::ALL {
        let mut clf = build_classifier(model, 5);
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.predict(&x).unwrap().len(), x.nrows());
    }
}

#[test]
fn test_regression_on_marker_table() {
    let x = Array2::from_shape_fn((30, 4), |(i, j)| ((i * 7 + j * 3) % 5) as f64);
    let y: Array1<f64> = x.rows().into_iter().map(|r| r[0] * 1.5 - r[2] + 3.0).collect();

    let engine = TrainEngine::new(TrainingConfig::new().with_random_seed(9));
    let results = engine
        .train_regression_models(&x, &y, &["Linear Regression", "Ridge Regression", "Random Forest"])
        .unwrap();

    assert_eq!(results.len(), 3);
    let linear = &results[0];
    assert!(linear.r2_score > 0.8, "linear r2 = {}", linear.r2_score);
    assert_eq!(linear.residuals().len(), 9);
}

#[test]
fn test_clone_dataset_end_to_end() {
    let clones = ["RRIM 600", "GT1", "RRIM 901", "GT1 b", "RRIM 2020", "GT1 c", "RRIM 3", "GT1 d"];
    let features: Vec<Vec<f64>> = clones
        .iter()
        .enumerate()
        .map(|(i, name)| if name.starts_with("RRIM") { vec![i as f64 * 0.1, 1.0] } else { vec![5.0, 6.0 + i as f64 * 0.1] })
        .collect();
    let dataset = Dataset { features, clones: clones.iter().map(|s| s.to_string()).collect(), ..Default::default() };

    let y = dataset.class_labels().unwrap();
    assert_eq!(y, encode_clone_groups(&clones));

    let x = dataset.feature_matrix().unwrap();
    let results = TrainEngine::new(TrainingConfig::new().with_random_seed(2))
        .train_models(&["nb", "dt"], &x, &y, None)
        .unwrap();
    assert_eq!(results.len(), 2);
}
