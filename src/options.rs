use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub content: f64,
    pub structure: f64,
    pub position: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            content: 0.4,
            structure: 0.2,
            position: 0.4,
        }
    }
}

impl ScoreWeights {
    #[must_use]
    pub fn combine(&self, content: f64, structure: f64, position: f64) -> f64 {
        content * self.content + structure * self.structure + position * self.position
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalOptions {
    /// Scores at or above this pass.
    pub pass_threshold: f64,
    /// Fuzzy similarity must be strictly above this to count.
    pub fuzzy_threshold: f64,
    pub weights: ScoreWeights,
    /// How many cell texts a reason lists before summarizing the rest.
    pub max_listed: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            pass_threshold: 0.8,
            fuzzy_threshold: 0.8,
            weights: ScoreWeights::default(),
            max_listed: 5,
        }
    }
}

impl EvalOptions {
    pub fn validate(&self) -> Result<(), EvalError> {
        for (name, value) in [
            ("pass_threshold", self.pass_threshold),
            ("fuzzy_threshold", self.fuzzy_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvalError::InvalidOption(format!(
                    "{name} must be within 0..=1, got {value}"
                )));
            }
        }

        let ScoreWeights {
            content,
            structure,
            position,
        } = self.weights;
        if [content, structure, position]
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(EvalError::InvalidOption(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        if content + structure + position <= 0.0 {
            return Err(EvalError::InvalidOption(
                "weights must not all be zero".to_string(),
            ));
        }

        if self.max_listed == 0 {
            return Err(EvalError::InvalidOption(
                "max_listed must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
