//! # ObjectPlaceNet
//!
//! Placement plausibility classifier over cached region features.
//!
//! The target object (foreground feature plus its box) forms the attention
//! query; every reference object in the background (feature plus box) forms a
//! key/value. The attended context, the target embedding and, optionally, the
//! mean reference embedding are concatenated and classified into
//! `num_classes` placement classes, where class `1` is a plausible placement.

use std::path::Path;

use burn::{
    nn::{
        Linear, LinearConfig, Relu,
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
    },
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
};

use crate::{
    batch::PlacementInputs,
    config::{BOX_DIM, ObjectPlaceNetConfig},
    error::{ModelError, ModelResult},
    predictor::Predictor,
};

/// Logits and attention weights of one forward pass.
#[derive(Debug, Clone)]
pub struct PlacementOutput<B: Backend> {
    /// Class logits, shape `[batch_size, num_classes]`.
    pub logits: Tensor<B, 2>,
    /// Target-to-reference attention, shape `[batch_size, heads, 1, refer_num]`.
    pub weights: Tensor<B, 4>,
}

#[derive(Module, Debug)]
pub struct ObjectPlaceNet<B: Backend> {
    target_embed: Linear<B>,
    refer_embed: Linear<B>,
    relation: MultiHeadAttention<B>,
    fc: Linear<B>,
    head: Linear<B>,
    activation: Relu,
    feat_dim: usize,
    hidden_dim: usize,
    use_global_feature: bool,
}

impl ObjectPlaceNetConfig {
    /// Initializes an `ObjectPlaceNet` with random weights.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ModelResult<ObjectPlaceNet<B>> {
        self.validate()?;

        let in_dim = self.feat_dim + BOX_DIM;
        Ok(ObjectPlaceNet {
            target_embed: LinearConfig::new(in_dim, self.hidden_dim).init(device),
            refer_embed: LinearConfig::new(in_dim, self.hidden_dim).init(device),
            relation: MultiHeadAttentionConfig::new(self.hidden_dim, self.attention_head)
                .with_dropout(0.0)
                .init(device),
            fc: LinearConfig::new(self.classifier_in_dim(), self.hidden_dim).init(device),
            head: LinearConfig::new(self.hidden_dim, self.num_classes).init(device),
            activation: Relu::new(),
            feat_dim: self.feat_dim,
            hidden_dim: self.hidden_dim,
            use_global_feature: !self.without_global_feature,
        })
    }

    /// Builds the network and loads a checkpoint saved with
    /// `NamedMpkFileRecorder<FullPrecisionSettings>`.
    ///
    /// The recorder resolves the path with the `.mpk` extension.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::WeightLoadingFailed`] if the file cannot be decoded
    /// into this network's record or its parameter count differs from the
    /// configured architecture.
    pub fn load_checkpoint<B: Backend>(
        &self,
        checkpoint: &Path,
        device: &Device<B>,
    ) -> ModelResult<ObjectPlaceNet<B>> {
        let model = self.init::<B>(device)?;
        let expected_params = model.num_params();

        tracing::info!(path = %checkpoint.display(), "loading pretrained weights");
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let model = model
            .load_file(checkpoint.to_path_buf(), &recorder, device)
            .map_err(|e| ModelError::WeightLoadingFailed {
                path: checkpoint.to_path_buf(),
                reason: e.to_string(),
            })?;

        let loaded_params = model.num_params();
        if loaded_params != expected_params {
            return Err(ModelError::WeightLoadingFailed {
                path: checkpoint.to_path_buf(),
                reason: format!(
                    "checkpoint holds {loaded_params} parameters, architecture expects {expected_params}"
                ),
            });
        }
        Ok(model)
    }
}

impl<B: Backend> ObjectPlaceNet<B> {
    /// Runs the classifier.
    ///
    /// # Shapes
    ///
    /// - target boxes `[B, 4]`, reference boxes `[B, R, 4]`
    /// - target features `[B, F]`, reference features `[B, R, F]`
    /// - output logits `[B, num_classes]`
    pub fn forward(&self, inputs: PlacementInputs<B>) -> PlacementOutput<B> {
        let PlacementInputs {
            target_boxes,
            refer_boxes,
            target_feats,
            refer_feats,
        } = inputs;
        let [batch_size, _] = target_feats.dims();

        let target = Tensor::cat(vec![target_feats, target_boxes], 1);
        let target = self.activation.forward(self.target_embed.forward(target));

        let refer = Tensor::cat(vec![refer_feats, refer_boxes], 2);
        let refer = self.activation.forward(self.refer_embed.forward(refer));

        let query = target.clone().unsqueeze_dim::<3>(1);
        let relation = self
            .relation
            .forward(MhaInput::new(query, refer.clone(), refer.clone()));
        let context = relation.context.reshape([batch_size, self.hidden_dim]);

        let mut features = vec![target, context];
        if self.use_global_feature {
            features.push(refer.mean_dim(1).reshape([batch_size, self.hidden_dim]));
        }

        let x = self.activation.forward(self.fc.forward(Tensor::cat(features, 1)));
        PlacementOutput {
            logits: self.head.forward(x),
            weights: relation.weights,
        }
    }

    fn check_inputs(&self, inputs: &PlacementInputs<B>) -> ModelResult<()> {
        let batch_size = inputs.batch_size();
        let refer_num = inputs.refer_feats.dims()[1];

        let checks = [
            (
                "target_feats",
                [batch_size, self.feat_dim].to_vec(),
                inputs.target_feats.dims().to_vec(),
            ),
            (
                "refer_feats",
                [batch_size, refer_num, self.feat_dim].to_vec(),
                inputs.refer_feats.dims().to_vec(),
            ),
            (
                "target_boxes",
                [batch_size, BOX_DIM].to_vec(),
                inputs.target_boxes.dims().to_vec(),
            ),
            (
                "refer_boxes",
                [batch_size, refer_num, BOX_DIM].to_vec(),
                inputs.refer_boxes.dims().to_vec(),
            ),
        ];

        for (input, expected, actual) in checks {
            if expected != actual {
                return Err(ModelError::InvalidTensorShape {
                    input,
                    expected: format!("{expected:?}"),
                    actual: format!("{actual:?}"),
                });
            }
        }
        Ok(())
    }
}

impl<B: Backend> Predictor<B> for ObjectPlaceNet<B> {
    fn predict(&self, inputs: PlacementInputs<B>) -> ModelResult<Vec<i64>> {
        self.check_inputs(&inputs)?;

        let output = self.forward(inputs);
        let labels = output.logits.argmax(1).flatten::<1>(0, 1);
        Ok(labels.into_data().iter::<i64>().collect())
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::{Distribution, Tolerance};

    use super::*;
    use crate::tests::TestBackend;

    fn small_config() -> ObjectPlaceNetConfig {
        ObjectPlaceNetConfig::new()
            .with_feat_dim(16)
            .with_hidden_dim(8)
            .with_attention_head(2)
            .with_refer_num(3)
    }

    fn random_inputs(
        batch_size: usize,
        refer_num: usize,
        feat_dim: usize,
    ) -> PlacementInputs<TestBackend> {
        let device = Default::default();
        let uniform = Distribution::Uniform(0.0, 1.0);
        PlacementInputs::new(
            Tensor::random([batch_size, 4], uniform, &device),
            Tensor::random([batch_size, refer_num, 4], uniform, &device),
            Tensor::random([batch_size, feat_dim], uniform, &device),
            Tensor::random([batch_size, refer_num, feat_dim], uniform, &device),
        )
    }

    #[test]
    fn forward_produces_class_logits() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device).unwrap();

        let output = model.forward(random_inputs(4, 3, 16));

        assert_eq!(output.logits.dims(), [4, 2]);
        assert_eq!(output.weights.dims(), [4, 2, 1, 3]);
    }

    #[test]
    fn forward_without_global_feature() {
        let device = Default::default();
        let model = small_config()
            .with_without_global_feature(true)
            .init::<TestBackend>(&device)
            .unwrap();

        let output = model.forward(random_inputs(2, 3, 16));

        assert_eq!(output.logits.dims(), [2, 2]);
    }

    #[test]
    fn predict_returns_one_label_per_pair() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device).unwrap();

        let labels = model.predict(random_inputs(5, 3, 16)).unwrap();

        assert_eq!(labels.len(), 5);
        assert!(labels.iter().all(|&label| label == 0 || label == 1));
    }

    #[test]
    fn predict_rejects_wrong_feature_width() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device).unwrap();

        match model.predict(random_inputs(2, 3, 12)) {
            Err(ModelError::InvalidTensorShape { input, .. }) => {
                assert_eq!(input, "target_feats");
            }
            other => panic!("Expected InvalidTensorShape error, got {other:?}"),
        }
    }

    #[test]
    fn checkpoint_round_trip() {
        let device = Default::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.mpk");

        let config = small_config();
        let model = config.init::<TestBackend>(&device).unwrap();
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        model.clone().save_file(path.clone(), &recorder).unwrap();

        let loaded = config.load_checkpoint::<TestBackend>(&path, &device).unwrap();
        let inputs = random_inputs(3, 3, 16);
        let expected = model.forward(inputs.clone()).logits;
        let actual = loaded.forward(inputs).logits;

        expected
            .into_data()
            .assert_approx_eq::<f32>(&actual.into_data(), Tolerance::default());
    }

    #[test]
    fn undecodable_checkpoint_is_a_load_error() {
        let device = Default::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mpk");
        std::fs::write(&path, b"not a checkpoint").unwrap();

        let result = small_config().load_checkpoint::<TestBackend>(&path, &device);

        assert!(matches!(result, Err(ModelError::WeightLoadingFailed { .. })));
    }
}
