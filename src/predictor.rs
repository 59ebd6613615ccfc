use std::path::Path;

use machine_learning::{
    Result, artifacts::ModelArtifact, encoding::EncoderSet, features::TripRecord,
};

/// The loaded encoders and model. Read-only once built.
#[derive(Debug)]
pub struct Predictor {
    encoders: EncoderSet,
    model: ModelArtifact,
}

impl Predictor {
    /// Creates a new `Predictor` from already loaded artifacts.
    ///
    /// # Errors
    /// If either artifact is invalid.
    pub fn new(encoders: EncoderSet, model: ModelArtifact) -> Result<Self> {
        encoders.validate()?;
        model.validate()?;

        Ok(Self { encoders, model })
    }

    /// Loads the model and encoders artifacts.
    pub fn load<M, E>(model_path: M, encoders_path: E) -> Result<Self>
    where
        M: AsRef<Path>,
        E: AsRef<Path>,
    {
        let model = ModelArtifact::load(model_path)?;
        let encoders = EncoderSet::load(encoders_path)?;
        Self::new(encoders, model)
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    /// Predicts the price of a trip. Unseen labels take their encoder's fallback class.
    pub fn predict(&self, trip: &TripRecord) -> Result<f64> {
        let x = trip.encode(&self.encoders)?;
        self.model.predict(x.view())
    }
}
