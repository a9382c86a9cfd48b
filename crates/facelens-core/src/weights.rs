use serde::Serialize;
use thiserror::Error;

/// A face-recognition model the backend can blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Arcface,
    Adaface,
    Elasticface,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Arcface, Model::Adaface, Model::Elasticface];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Arcface => "arcface",
            Model::Adaface => "adaface",
            Model::Elasticface => "elasticface",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(String);

impl std::str::FromStr for Model {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "arcface" => Ok(Model::Arcface),
            "adaface" => Ok(Model::Adaface),
            "elasticface" => Ok(Model::Elasticface),
            other => Err(UnknownModel(other.to_string())),
        }
    }
}

/// Per-model blending weights sent with a compare request.
///
/// The backend expects exactly these three keys. Renormalization after a
/// single-weight change is best-effort: weights are rescaled so the sum
/// returns to 1.0; a zero total leaves the mapping untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelWeights {
    arcface: f64,
    adaface: f64,
    elasticface: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            arcface: 0.33,
            adaface: 0.33,
            elasticface: 0.34,
        }
    }
}

impl ModelWeights {
    pub fn get(&self, model: Model) -> f64 {
        match model {
            Model::Arcface => self.arcface,
            Model::Adaface => self.adaface,
            Model::Elasticface => self.elasticface,
        }
    }

    /// Set one weight and renormalize the whole mapping.
    pub fn set(&mut self, model: Model, value: f64) {
        let value = value.clamp(0.0, 1.0);
        match model {
            Model::Arcface => self.arcface = value,
            Model::Adaface => self.adaface = value,
            Model::Elasticface => self.elasticface = value,
        }
        self.normalize();
    }

    pub fn sum(&self) -> f64 {
        self.arcface + self.adaface + self.elasticface
    }

    fn normalize(&mut self) {
        let total = self.sum();
        if total > f64::EPSILON {
            self.arcface /= total;
            self.adaface /= total;
            self.elasticface /= total;
        }
    }

    pub fn iter(&self) -> [(Model, f64); 3] {
        [
            (Model::Arcface, self.arcface),
            (Model::Adaface, self.adaface),
            (Model::Elasticface, self.elasticface),
        ]
    }

    /// JSON object for the multipart `model_weights` field.
    pub fn to_json(&self) -> String {
        // Serialization of three f64 fields cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = ModelWeights::default();
        assert_eq!(w.get(Model::Arcface), 0.33);
        assert_eq!(w.get(Model::Adaface), 0.33);
        assert_eq!(w.get(Model::Elasticface), 0.34);
        assert!((w.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_renormalizes_to_one() {
        let mut w = ModelWeights::default();
        w.set(Model::Arcface, 0.9);
        assert!((w.sum() - 1.0).abs() < 1e-9);
        // The raised weight dominates after rescaling.
        assert!(w.get(Model::Arcface) > w.get(Model::Adaface));
        assert!(w.get(Model::Arcface) > w.get(Model::Elasticface));
    }

    #[test]
    fn test_set_all_zero_leaves_weights_unchanged() {
        let mut w = ModelWeights::default();
        w.set(Model::Arcface, 0.0);
        w.set(Model::Adaface, 0.0);
        w.set(Model::Elasticface, 0.0);
        // Last set hits a zero total: no renormalization possible.
        assert_eq!(w.sum(), 0.0);
    }

    #[test]
    fn test_set_clamps_out_of_range() {
        let mut w = ModelWeights::default();
        w.set(Model::Adaface, 5.0);
        assert!((w.sum() - 1.0).abs() < 1e-9);
        assert!(w.get(Model::Adaface) <= 1.0);
    }

    #[test]
    fn test_json_has_exactly_the_fixed_keys() {
        let json = ModelWeights::default().to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["adaface", "arcface", "elasticface"]);
    }

    #[test]
    fn test_model_round_trip() {
        for m in Model::ALL {
            assert_eq!(m.as_str().parse::<Model>().unwrap(), m);
        }
        assert!("facenet".parse::<Model>().is_err());
    }
}
