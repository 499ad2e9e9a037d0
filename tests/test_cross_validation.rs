//! Integration tests for the cross-validation runner

use hevea_ml::training::{mean_and_std, ModelType, TrainEngine, TrainingConfig};
use ndarray::{Array1, Array2};

fn two_groups(n: usize) -> (Array2<f64>, Array1<usize>) {
    let x = Array2::from_shape_fn((n, 3), |(i, j)| {
        let shift = if i % 2 == 0 { 0.0 } else { 5.0 };
        shift + ((i + 2 * j) % 7) as f64 * 0.1
    });
    let y = Array1::from_iter((0..n).map(|i| i % 2));
    (x, y)
}

#[test]
fn test_every_model_id_cross_validates() {
    let (x, y) = two_groups(30);
    let engine = TrainEngine::new(TrainingConfig::new().with_random_seed(13));

    for model in ModelType::ALL {
        let cv = engine.cross_validate(model.id(), &x, &y, 3, None).unwrap();
        assert_eq!(cv.n_folds, 3);
        assert_eq!(cv.model_name, model.display_name());

        // each fold scores its whole test block, no nested split
        let tested: usize = cv.fold_results.iter().map(|r| r.n_test()).sum();
        assert_eq!(tested, 30);

        let (mean, std) = mean_and_std(&cv.scores);
        assert_eq!(cv.mean_score, mean);
        assert_eq!(cv.std_score, std);
        assert!((0.0..=1.0).contains(&cv.mean_score));
    }
}

#[test]
fn test_seeded_cross_validation_repeats() {
    let (x, y) = two_groups(24);
    let run = || {
        TrainEngine::new(TrainingConfig::new().with_random_seed(4))
            .cross_validate("rf", &x, &y, 4, None)
            .unwrap()
            .scores
    };
    assert_eq!(run(), run());
}

#[test]
fn test_too_many_folds_is_rejected() {
    let (x, y) = two_groups(6);
    let err = TrainEngine::default().cross_validate("knn", &x, &y, 10, None).unwrap_err();
    assert!(err.is_validation());

    let err = TrainEngine::default().cross_validate("knn", &x, &y, 1, None).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_json_shape() {
    let (x, y) = two_groups(12);
    let cv = TrainEngine::new(TrainingConfig::new().with_random_seed(1))
        .cross_validate("nb", &x, &y, 3, None)
        .unwrap();
    let json = serde_json::to_value(&cv).unwrap();
    assert_eq!(json["nFolds"], 3);
    assert_eq!(json["foldResults"].as_array().unwrap().len(), 3);
    assert!(json["meanScore"].is_number());
}
