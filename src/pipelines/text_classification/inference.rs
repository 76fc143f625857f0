use std::{collections::HashMap, fs, path::Path, sync::Mutex};

use burn::{
    config::Config as _,
    data::dataloader::batcher::Batcher as _,
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::{backend::Backend, Tensor},
};

use crate::models::flair::{self, Model};

use super::{Batcher, ClassifierError, Flair, Vocabulary, FLAIRS};

/// The model configuration inside an artifact directory
pub static CONFIG_FILE: &str = "config.json";

/// The model weights inside an artifact directory; the recorder adds the `.mpk` extension
pub static MODEL_FILE: &str = "model";

/// Predicted flair keyed by the caller's identifier
pub type Predictions = HashMap<String, Flair>;

/// Weights are stored without loss of precision so outputs match the trained model
type ModelRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// The process-wide inference context.
///
/// Built once at startup and never mutated. Forward passes go through a single lock around the
/// model, while tokenizing and padding happen outside of it.
pub struct Classifier<B: Backend> {
    /// The trained model, one forward pass at a time
    model: Mutex<Model<B>>,

    /// Turns titles into normalized token tensors
    batcher: Batcher<B>,

    /// The configuration the model was built with
    config: flair::Config,
}

impl<B: Backend> Classifier<B> {
    /// Assemble a classifier from an already-built model and vocabulary
    pub fn new(
        model: Model<B>,
        vocabulary: Vocabulary,
        config: flair::Config,
        device: B::Device,
    ) -> Result<Self, ClassifierError> {
        if config.n_classes != FLAIRS.len() {
            return Err(ClassifierError::Config(format!(
                "the model predicts {} classes but there are {} flairs",
                config.n_classes,
                FLAIRS.len()
            )));
        }

        let batcher = Batcher::new(vocabulary, &config, device);

        Ok(Self {
            model: Mutex::new(model),
            batcher,
            config,
        })
    }

    /// Load the configuration, vocabulary and weights from an artifact directory
    pub fn load(artifact_dir: impl AsRef<Path>, device: B::Device) -> Result<Self, ClassifierError> {
        let artifact_dir = artifact_dir.as_ref();

        log::info!("Loading config...");

        let config_file = artifact_dir.join(CONFIG_FILE);
        let config = flair::Config::load(&config_file)
            .map_err(|e| ClassifierError::artifact(&config_file, e))?;

        log::info!("Loading vocabulary...");

        let vocabulary = Vocabulary::load(artifact_dir, config.vocab_size)?;

        log::info!("Loading weights...");

        let model_file = artifact_dir.join(MODEL_FILE);
        let record = ModelRecorder::new()
            .load(model_file.clone(), &device)
            .map_err(|e| ClassifierError::artifact(model_file.with_extension("mpk"), e))?;

        log::info!("Creating model...");

        let model = config.init::<B>(&device).load_record(record);

        Self::new(model, vocabulary, config, device)
    }

    /// Write the configuration and weights of a model into an artifact directory
    pub fn save(
        model: Model<B>,
        config: &flair::Config,
        artifact_dir: impl AsRef<Path>,
    ) -> Result<(), ClassifierError> {
        let artifact_dir = artifact_dir.as_ref();

        fs::create_dir_all(artifact_dir).map_err(|e| ClassifierError::artifact(artifact_dir, e))?;

        let config_file = artifact_dir.join(CONFIG_FILE);
        config
            .save(&config_file)
            .map_err(|e| ClassifierError::artifact(&config_file, e))?;

        let model_file = artifact_dir.join(MODEL_FILE);
        ModelRecorder::new()
            .record(model.into_record(), model_file.clone())
            .map_err(|e| ClassifierError::artifact(model_file.with_extension("mpk"), e))?;

        Ok(())
    }

    /// Tokenize, normalize, and run every title through the model as a single batch
    fn forward(&self, titles: &[String]) -> Result<Tensor<B, 2>, ClassifierError> {
        let item = self.batcher.batch(titles.to_vec());

        let model = self.model.lock().map_err(|_| ClassifierError::Poisoned)?;

        Ok(model.infer(item.tokens))
    }

    /// The probability of every flair for each title, in class index order
    pub fn distributions(&self, titles: &[String]) -> Result<Vec<Vec<f32>>, ClassifierError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let values = self.forward(titles)?.into_data().convert::<f32>().value;

        Ok(values
            .chunks(self.config.n_classes)
            .map(|row| row.to_vec())
            .collect())
    }

    /// The attention each title's steps receive, `max_seq_len` weights per title
    pub fn attention(&self, titles: &[String]) -> Result<Vec<Vec<f32>>, ClassifierError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let item = self.batcher.batch(titles.to_vec());

        let weights = {
            let model = self.model.lock().map_err(|_| ClassifierError::Poisoned)?;

            model.attention_weights(item.tokens)
        };

        Ok(weights
            .into_data()
            .convert::<f32>()
            .value
            .chunks(self.config.max_seq_len)
            .map(|row| row.to_vec())
            .collect())
    }

    /// Predict a flair for every title, keyed by the identifier at the same position.
    ///
    /// Titles that tokenize to nothing still get a flair. Mismatched lengths fail the whole call.
    pub fn predict(&self, titles: &[String], ids: &[String]) -> Result<Predictions, ClassifierError> {
        if titles.len() != ids.len() {
            return Err(ClassifierError::ShapeMismatch {
                titles: titles.len(),
                ids: ids.len(),
            });
        }

        if titles.is_empty() {
            return Ok(Predictions::new());
        }

        let class_indexes = self
            .forward(titles)?
            .argmax(1)
            .into_data()
            .convert::<i64>()
            .value;

        class_indexes
            .into_iter()
            .zip(ids)
            .map(|(index, id)| {
                let flair = Flair::from_index(index as usize).ok_or_else(|| {
                    ClassifierError::Inference(format!("class index {index} has no flair"))
                })?;

                Ok((id.clone(), flair))
            })
            .collect()
    }
}
