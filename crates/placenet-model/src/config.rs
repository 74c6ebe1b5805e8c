use burn::prelude::*;

use crate::error::{ModelError, ModelResult};

/// Number of coordinates describing a box (`x1 y1 x2 y2`).
pub const BOX_DIM: usize = 4;

/// Hyperparameters of `ObjectPlaceNet`.
///
/// Defaults are those the released evaluation checkpoints were trained with.
#[derive(Config, Debug)]
pub struct ObjectPlaceNetConfig {
    /// Dimension of the cached target and reference features.
    #[config(default = 2048)]
    pub feat_dim: usize,
    /// Number of reference objects attended to per pair.
    #[config(default = 5)]
    pub refer_num: usize,
    #[config(default = 16)]
    pub attention_head: usize,
    #[config(default = 512)]
    pub hidden_dim: usize,
    #[config(default = 2)]
    pub num_classes: usize,
    /// Drop the mean reference embedding from the classifier input.
    #[config(default = false)]
    pub without_global_feature: bool,
}

impl ObjectPlaceNetConfig {
    /// Check that the hyperparameters describe a buildable network.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfiguration`] for zero-sized dimensions,
    /// a hidden size not divisible by the head count, or fewer than two classes.
    pub fn validate(&self) -> ModelResult<()> {
        let invalid = |reason: String| Err(ModelError::InvalidConfiguration { reason });

        if self.feat_dim == 0 || self.hidden_dim == 0 {
            return invalid("feat_dim and hidden_dim must be non-zero".to_owned());
        }
        if self.refer_num == 0 {
            return invalid("refer_num must be at least 1".to_owned());
        }
        if self.attention_head == 0 || self.hidden_dim % self.attention_head != 0 {
            return invalid(format!(
                "hidden_dim ({}) must be divisible by attention_head ({})",
                self.hidden_dim, self.attention_head
            ));
        }
        if self.num_classes < 2 {
            return invalid(format!(
                "num_classes must be at least 2, got {}",
                self.num_classes
            ));
        }
        Ok(())
    }

    /// Width of the classifier input.
    pub const fn classifier_in_dim(&self) -> usize {
        if self.without_global_feature {
            self.hidden_dim * 2
        } else {
            self.hidden_dim * 3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        let config = ObjectPlaceNetConfig::new();

        assert!(config.validate().is_ok());
        assert_eq!(config.refer_num, 5);
        assert_eq!(config.attention_head, 16);
        assert_eq!(config.classifier_in_dim(), 512 * 3);
    }

    #[test]
    fn indivisible_heads_are_rejected() {
        let config = ObjectPlaceNetConfig::new()
            .with_hidden_dim(100)
            .with_attention_head(16);

        match config.validate() {
            Err(ModelError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("divisible"));
            }
            other => panic!("Expected InvalidConfiguration error, got {other:?}"),
        }
    }

    #[test]
    fn zero_references_are_rejected() {
        let config = ObjectPlaceNetConfig::new().with_refer_num(0);

        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn single_class_is_rejected() {
        let config = ObjectPlaceNetConfig::new().with_num_classes(1);

        assert!(config.validate().is_err());
    }

    #[test]
    fn global_feature_switch_changes_classifier_width() {
        let config = ObjectPlaceNetConfig::new().with_without_global_feature(true);

        assert_eq!(config.classifier_in_dim(), 512 * 2);
    }
}
