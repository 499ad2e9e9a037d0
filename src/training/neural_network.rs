//! Neural networks
//!
//! [`NeuralNetwork`] is a configurable dense classifier trained with
//! mini-batch back-propagation. [`RandomProjectionMlp`] is the untrained
//! placeholder that answers for the `mlp` model id: one random ReLU layer,
//! no learning.

use super::linear_models::argmax;
use super::models::Classifier;
use super::scaler::StandardScaler;
use crate::error::{HeveaError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Hidden-layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Tanh => z.mapv(f64::tanh),
        }
    }

    fn derivative(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Sigmoid => z.mapv(|v| {
                let s = 1.0 / (1.0 + (-v).exp());
                s * (1.0 - s)
            }),
            Activation::Tanh => z.mapv(|v| 1.0 - v.tanh().powi(2)),
        }
    }
}

/// One hidden layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub neurons: usize,
    pub activation: Activation,
    /// Fraction of units zeroed during training
    pub dropout: f64,
}

impl LayerConfig {
    pub fn new(neurons: usize, activation: Activation, dropout: f64) -> Self {
        Self {
            neurons,
            activation,
            dropout,
        }
    }

    /// 64 → 32 → 16 ReLU stack with dropout on the first two layers
    pub fn default_stack() -> Vec<LayerConfig> {
        vec![
            LayerConfig::new(64, Activation::Relu, 0.2),
            LayerConfig::new(32, Activation::Relu, 0.2),
            LayerConfig::new(16, Activation::Relu, 0.0),
        ]
    }
}

/// Training schedule for [`NeuralNetwork`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Fraction of rows held out for validation
    pub validation_split: f64,
    pub early_stopping: bool,
    /// Epochs without a validation-accuracy improvement before stopping
    pub patience: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub random_seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            epochs: 30,
            batch_size: 32,
            learning_rate: 0.001,
            validation_split: 0.2,
            early_stopping: true,
            patience: 5,
            random_seed: None,
        }
    }
}

impl NetworkConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_validation_split(mut self, split: f64) -> Self {
        self.validation_split = split;
        self
    }

    pub fn with_early_stopping(mut self, enabled: bool, patience: usize) -> Self {
        self.early_stopping = enabled;
        self.patience = patience;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    fn validate(&self, layers: &[LayerConfig]) -> Result<()> {
        let invalid = |name: &str, value: String, reason: &str| HeveaError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        };

        if self.epochs == 0 {
            return Err(invalid("epochs", "0".into(), "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "0".into(), "must be at least 1"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(invalid(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be positive",
            ));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(invalid(
                "validation_split",
                self.validation_split.to_string(),
                "must be in [0, 1)",
            ));
        }
        if layers.is_empty() {
            return Err(invalid("layers", "[]".into(), "need at least one hidden layer"));
        }
        for (i, layer) in layers.iter().enumerate() {
            if layer.neurons == 0 {
                return Err(invalid(&format!("layers[{}].neurons", i), "0".into(), "must be at least 1"));
            }
            if !(0.0..1.0).contains(&layer.dropout) {
                return Err(invalid(
                    &format!("layers[{}].dropout", i),
                    layer.dropout.to_string(),
                    "must be in [0, 1)",
                ));
            }
        }
        Ok(())
    }
}

/// Metrics recorded after one epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochMetrics {
    /// 1-based epoch number
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
}

/// Write-only JSON snapshot of a trained network's configuration and history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkExport {
    pub layers: Vec<LayerConfig>,
    pub training_config: NetworkConfig,
    pub training_history: Vec<EpochMetrics>,
    pub best_accuracy: f64,
}

impl NetworkExport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Intermediate values of one forward pass
struct ForwardPass {
    /// Layer inputs; the last entry is the softmax output
    activations: Vec<Array2<f64>>,
    /// Hidden-layer pre-activations
    pre_activations: Vec<Array2<f64>>,
    /// Inverted-dropout masks, `None` where no dropout was applied
    masks: Vec<Option<Array2<f64>>>,
}

impl ForwardPass {
    fn output(&self) -> &Array2<f64> {
        // activations always holds the input plus one entry per layer
        &self.activations[self.activations.len() - 1]
    }
}

/// Dense softmax classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetwork {
    pub layers: Vec<LayerConfig>,
    pub config: NetworkConfig,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    scaler: StandardScaler,
    /// Sorted distinct training labels; output unit `i` scores `classes[i]`
    classes: Vec<usize>,
    history: Vec<EpochMetrics>,
    best_accuracy: f64,
}

impl NeuralNetwork {
    pub fn new(layers: Vec<LayerConfig>, config: NetworkConfig) -> Self {
        Self {
            layers,
            config,
            weights: Vec::new(),
            biases: Vec::new(),
            scaler: StandardScaler::new(),
            classes: Vec::new(),
            history: Vec::new(),
            best_accuracy: 0.0,
        }
    }

    /// Train on `x`, holding out `validation_split` of the rows
    ///
    /// The softmax has one output per distinct label, so labels need not be
    /// contiguous or start at zero.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&[EpochMetrics]> {
        self.config.validate(&self.layers)?;
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(HeveaError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples < 2 || x.ncols() == 0 {
            return Err(HeveaError::ValidationError(format!(
                "need at least 2 samples and 1 feature, got {}x{}",
                n_samples,
                x.ncols()
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(HeveaError::ValidationError(
                "network inputs must be finite".to_string(),
            ));
        }

        let mut rng = match self.config.random_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let x_norm = self.scaler.fit_transform(x)?;
        self.classes = distinct_classes(y);
        let encoded = encode_labels(y, &self.classes);

        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(&mut rng);
        let val_size = (n_samples as f64 * self.config.validation_split).floor() as usize;
        let train_size = n_samples - val_size;
        let (train_idx, val_idx) = order.split_at(train_size);

        let x_train = x_norm.select(Axis(0), train_idx);
        let y_train: Vec<usize> = train_idx.iter().map(|&i| encoded[i]).collect();
        let x_val = x_norm.select(Axis(0), val_idx);
        let y_val: Vec<usize> = val_idx.iter().map(|&i| encoded[i]).collect();

        self.initialize_weights(x.ncols(), &mut rng);
        self.history.clear();
        self.best_accuracy = 0.0;

        let mut patience_counter = 0;
        let mut batch_order: Vec<usize> = (0..train_size).collect();

        for epoch in 1..=self.config.epochs {
            batch_order.shuffle(&mut rng);

            let mut epoch_loss = 0.0;
            let mut correct = 0;

            for batch in batch_order.chunks(self.config.batch_size) {
                let x_batch = x_train.select(Axis(0), batch);
                let y_batch: Vec<usize> = batch.iter().map(|&i| y_train[i]).collect();

                let pass = self.forward(&x_batch, Some(&mut rng));
                let (loss, hits) = score_batch(pass.output(), &y_batch);
                epoch_loss += loss;
                correct += hits;

                self.backward(&pass, &y_batch);
            }

            if self.weights.iter().any(|w| w.iter().any(|v| !v.is_finite())) {
                return Err(HeveaError::TrainingError(format!(
                    "network weights diverged at epoch {}",
                    epoch
                )));
            }

            let accuracy = correct as f64 / train_size as f64;
            let loss = epoch_loss / train_size as f64;
            let (val_loss, val_accuracy) = if val_size > 0 {
                let pass = self.forward(&x_val, None);
                let (l, hits) = score_batch(pass.output(), &y_val);
                (l / val_size as f64, hits as f64 / val_size as f64)
            } else {
                (loss, accuracy)
            };

            debug!(epoch, loss, accuracy, val_loss, val_accuracy, "epoch finished");
            self.history.push(EpochMetrics {
                epoch,
                loss,
                accuracy,
                val_loss,
                val_accuracy,
            });

            if val_accuracy > self.best_accuracy {
                self.best_accuracy = val_accuracy;
                patience_counter = 0;
            } else {
                patience_counter += 1;
            }

            if self.config.early_stopping && patience_counter >= self.config.patience {
                info!(epoch, best_accuracy = self.best_accuracy, "early stopping");
                break;
            }
        }

        info!(
            epochs = self.history.len(),
            best_accuracy = self.best_accuracy,
            "network training finished"
        );
        Ok(&self.history)
    }

    /// Xavier-style uniform weights in ±sqrt(2 / (fan_in + fan_out)), zero biases
    fn initialize_weights(&mut self, n_features: usize, rng: &mut ChaCha8Rng) {
        self.weights.clear();
        self.biases.clear();

        let mut sizes = vec![n_features];
        sizes.extend(self.layers.iter().map(|l| l.neurons));
        sizes.push(self.classes.len());

        for pair in sizes.windows(2) {
            let (n_in, n_out) = (pair[0], pair[1]);
            let scale = (2.0 / (n_in + n_out) as f64).sqrt();
            self.weights.push(Array2::from_shape_fn((n_in, n_out), |_| {
                (rng.gen::<f64>() * 2.0 - 1.0) * scale
            }));
            self.biases.push(Array1::zeros(n_out));
        }
    }

    /// Dropout is applied only when a generator is supplied
    fn forward(&self, x: &Array2<f64>, mut rng: Option<&mut ChaCha8Rng>) -> ForwardPass {
        let mut activations = vec![x.clone()];
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut masks = Vec::with_capacity(self.layers.len());

        for (l, layer) in self.layers.iter().enumerate() {
            let z = activations[l].dot(&self.weights[l]) + &self.biases[l];
            let mut a = layer.activation.apply(&z);

            let mask = match rng.as_deref_mut() {
                Some(rng) if layer.dropout > 0.0 => {
                    let keep = 1.0 / (1.0 - layer.dropout);
                    let mask = Array2::from_shape_fn(a.raw_dim(), |_| {
                        if rng.gen::<f64>() < layer.dropout {
                            0.0
                        } else {
                            keep
                        }
                    });
                    a *= &mask;
                    Some(mask)
                }
                _ => None,
            };

            pre_activations.push(z);
            masks.push(mask);
            activations.push(a);
        }

        let last = self.layers.len();
        let logits = activations[last].dot(&self.weights[last]) + &self.biases[last];
        activations.push(softmax(logits));

        ForwardPass {
            activations,
            pre_activations,
            masks,
        }
    }

    /// One gradient step on the batch-averaged cross-entropy; `labels` are
    /// class indices
    fn backward(&mut self, pass: &ForwardPass, labels: &[usize]) {
        let batch = labels.len() as f64;
        let mut delta = pass.output().clone();
        for (row, &label) in labels.iter().enumerate() {
            delta[[row, label]] -= 1.0;
        }
        delta /= batch;

        for l in (0..self.weights.len()).rev() {
            let grad_w = pass.activations[l].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));

            if l > 0 {
                let hidden = l - 1;
                let mut next = delta.dot(&self.weights[l].t())
                    * self.layers[hidden].activation.derivative(&pass.pre_activations[hidden]);
                if let Some(mask) = &pass.masks[hidden] {
                    next *= mask;
                }
                delta = next;
            }

            self.weights[l].scaled_add(-self.config.learning_rate, &grad_w);
            self.biases[l].scaled_add(-self.config.learning_rate, &grad_b);
        }
    }

    /// Softmax probabilities, one column per entry of [`classes`](Self::classes)
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.weights.is_empty() {
            return Err(HeveaError::ModelNotFitted);
        }
        let x_norm = self.scaler.transform(x)?;
        let pass = self.forward(&x_norm, None);
        Ok(pass.output().clone())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row.iter().copied())])
            .collect())
    }

    /// Labels seen during the last fit, in output order
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn history(&self) -> &[EpochMetrics] {
        &self.history
    }

    /// Best validation accuracy seen during the last fit
    pub fn best_accuracy(&self) -> f64 {
        self.best_accuracy
    }

    pub fn export(&self) -> NetworkExport {
        NetworkExport {
            layers: self.layers.clone(),
            training_config: self.config.clone(),
            training_history: self.history.clone(),
            best_accuracy: self.best_accuracy,
        }
    }
}

fn softmax(mut z: Array2<f64>) -> Array2<f64> {
    for mut row in z.rows_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row /= sum;
    }
    z
}

fn distinct_classes(y: &Array1<usize>) -> Vec<usize> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Position of each label in the sorted class list
fn encode_labels(y: &Array1<usize>, classes: &[usize]) -> Vec<usize> {
    y.iter()
        .map(|label| classes.binary_search(label).unwrap_or(0))
        .collect()
}

/// Summed cross-entropy and number of argmax hits against class indices
fn score_batch(probs: &Array2<f64>, labels: &[usize]) -> (f64, usize) {
    let mut loss = 0.0;
    let mut hits = 0;
    for (row, &label) in probs.rows().into_iter().zip(labels) {
        loss -= (row[label] + 1e-10).ln();
        if argmax(row.iter().copied()) == label {
            hits += 1;
        }
    }
    (loss, hits)
}

/// Single random hidden layer evaluated without any training
///
/// Weights are uniform in [0, 1); the hidden width is
/// `(n_features + n_classes) / 2`, with one output per distinct training
/// label. The predicted class is the label of the largest output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomProjectionMlp {
    pub random_state: Option<u64>,
    scaler: StandardScaler,
    classes: Vec<usize>,
    hidden: Option<Array2<f64>>,
    output: Option<Array2<f64>>,
}

impl Default for RandomProjectionMlp {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomProjectionMlp {
    pub fn new() -> Self {
        Self {
            random_state: None,
            scaler: StandardScaler::new(),
            classes: Vec::new(),
            hidden: None,
            output: None,
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Draws the weights; the labels only fix the output classes
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(HeveaError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(HeveaError::ValidationError("empty training set".to_string()));
        }

        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        self.scaler.fit(x)?;
        let n_features = x.ncols();
        self.classes = distinct_classes(y);
        let n_classes = self.classes.len();
        let hidden_size = ((n_features + n_classes) / 2).max(1);

        self.hidden = Some(Array2::from_shape_fn((n_features, hidden_size), |_| rng.gen::<f64>()));
        self.output = Some(Array2::from_shape_fn((hidden_size, n_classes), |_| rng.gen::<f64>()));
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let (hidden, output) = match (&self.hidden, &self.output) {
            (Some(h), Some(o)) => (h, o),
            _ => return Err(HeveaError::ModelNotFitted),
        };
        let scores = self.scaler.transform(x)?.dot(hidden).mapv(|v| v.max(0.0)).dot(output);
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row.iter().copied())])
            .collect())
    }
}

impl Classifier for RandomProjectionMlp {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        RandomProjectionMlp::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        RandomProjectionMlp::predict(self, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn clusters() -> (Array2<f64>, Array1<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            let jitter = (i % 5) as f64 * 0.1;
            let (cx, cy, label) = match i % 3 {
                0 => (0.0, 0.0, 0),
                1 => (4.0, 0.0, 1),
                _ => (2.0, 4.0, 2),
            };
            rows.extend([cx + jitter, cy - jitter]);
            labels.push(label);
        }
        (
            Array2::from_shape_vec((30, 2), rows).unwrap(),
            Array1::from_vec(labels),
        )
    }

    #[test]
    fn test_network_learns_clusters() {
        let (x, y) = clusters();
        let layers = vec![LayerConfig::new(8, Activation::Tanh, 0.0)];
        let config = NetworkConfig::default()
            .with_epochs(200)
            .with_batch_size(4)
            .with_learning_rate(0.1)
            .with_early_stopping(false, 0)
            .with_random_seed(5);

        let mut net = NeuralNetwork::new(layers, config);
        let history = net.fit(&x, &y).unwrap();
        assert_eq!(history.len(), 200);
        assert_eq!(history[0].epoch, 1);

        let pred = net.predict(&x).unwrap();
        let correct = pred.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 27, "only {} of 30 correct", correct);
    }

    #[test]
    fn test_early_stopping_caps_history() {
        let (x, y) = clusters();
        let config = NetworkConfig::default()
            .with_epochs(50)
            .with_early_stopping(true, 2)
            .with_random_seed(1);
        let mut net = NeuralNetwork::new(LayerConfig::default_stack(), config);
        net.fit(&x, &y).unwrap();

        assert!(net.history().len() <= 50);
        assert!(net.history().iter().all(|h| (0.0..=1.0).contains(&h.val_accuracy)));
        let best = net.history().iter().map(|h| h.val_accuracy).fold(0.0, f64::max);
        assert_eq!(net.best_accuracy(), best);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = clusters();
        let mut net = NeuralNetwork::new(
            vec![LayerConfig::new(4, Activation::Sigmoid, 0.5)],
            NetworkConfig::default().with_epochs(3).with_random_seed(2),
        );
        net.fit(&x, &y).unwrap();
        let proba = net.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 3);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_export_shape() {
        let (x, y) = clusters();
        let mut net = NeuralNetwork::new(
            vec![LayerConfig::new(4, Activation::Relu, 0.2)],
            NetworkConfig::default().with_epochs(2).with_random_seed(3),
        );
        net.fit(&x, &y).unwrap();

        let json: serde_json::Value = serde_json::from_str(&net.export().to_json().unwrap()).unwrap();
        assert_eq!(json["layers"][0]["activation"], "relu");
        assert_eq!(json["layers"][0]["neurons"], 4);
        assert_eq!(json["trainingConfig"]["batchSize"], 32);
        assert!(json["trainingHistory"][0].get("valAccuracy").is_some());
        assert!(json.get("bestAccuracy").is_some());
    }

    #[test]
    fn test_invalid_configuration() {
        let (x, y) = clusters();
        let mut net = NeuralNetwork::new(vec![], NetworkConfig::default());
        assert!(matches!(net.fit(&x, &y), Err(HeveaError::InvalidParameter { .. })));

        let mut net = NeuralNetwork::new(
            vec![LayerConfig::new(4, Activation::Relu, 1.0)],
            NetworkConfig::default(),
        );
        assert!(net.fit(&x, &y).is_err());
        assert!(matches!(
            NeuralNetwork::new(LayerConfig::default_stack(), NetworkConfig::default())
                .predict(&x),
            Err(HeveaError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_random_projection_is_seeded_placeholder() {
        let (x, y) = clusters();
        let run = || {
            let mut mlp = RandomProjectionMlp::new().with_random_state(17);
            mlp.fit(&x, &y).unwrap();
            mlp.predict(&x).unwrap()
        };
        let pred = run();
        assert_eq!(pred, run());
        assert!(pred.iter().all(|&p| p < 3));
    }

    #[test]
    fn test_sparse_labels_map_back_to_classes() {
        let (x, y) = clusters();
        let sparse = y.mapv(|label| [7usize, 300, 1_000_000][label]);

        let mut mlp = RandomProjectionMlp::new().with_random_state(1);
        mlp.fit(&x, &sparse).unwrap();
        assert_eq!(mlp.output.as_ref().unwrap().ncols(), 3);
        let pred = mlp.predict(&x).unwrap();
        assert!(pred.iter().all(|p| [7, 300, 1_000_000].contains(p)));

        let mut net = NeuralNetwork::new(
            vec![LayerConfig::new(8, Activation::Tanh, 0.0)],
            NetworkConfig::default()
                .with_epochs(200)
                .with_batch_size(4)
                .with_learning_rate(0.1)
                .with_early_stopping(false, 0)
                .with_random_seed(5),
        );
        net.fit(&x, &sparse).unwrap();
        assert_eq!(net.classes(), &[7, 300, 1_000_000]);
        assert_eq!(net.predict_proba(&x).unwrap().ncols(), 3);
        let pred = net.predict(&x).unwrap();
        let correct = pred.iter().zip(sparse.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 27, "only {} of 30 correct", correct);
    }

    #[test]
    fn test_random_projection_unfitted() {
        let mlp = RandomProjectionMlp::new();
        assert!(mlp.predict(&array![[1.0]]).is_err());
    }
}
