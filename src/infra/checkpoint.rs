// ============================================================
// Layer 6: Checkpoint Manager
// ============================================================
// Saves and restores model parameters using burn's recorder.
//
// What gets saved, per model name:
//   1. {model_name}-{epoch}.mpk.gz     every parameter at that epoch
//   2. {model_name}-{epoch}.meta.json  layer sizes of that checkpoint
//   3. {model_name}.latest.json        name + epoch of the latest save
//   4. {model_name}.config.json        hyperparameters of the run
//
// Several models can share one directory. Pointer and config are
// kept per model, so `latest` and the architecture used to reload
// a checkpoint always belong to the checkpoint's own model. Model
// names never contain '.', so `{model}.latest.json` cannot clash
// with a checkpoint of another model.
//
// Every checkpoint is kept; a later save never removes an
// earlier one. Parameters are written at full precision so a
// run resumed from a checkpoint continues from bit-identical
// weights.
//
// File naming convention:
//   mlp/checkpoints/
//     model-0.mpk.gz
//     model-0.meta.json
//     model-100.mpk.gz
//     model-100.meta.json
//     ...
//     model.latest.json
//     model.config.json
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, bail, Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{Mlp, MlpShape};

/// Checkpoint name that resolves to a model's most recent save
pub const LATEST: &str = "latest";

const POINTER_SUFFIX: &str = ".latest.json";
const CONFIG_SUFFIX:  &str = ".config.json";
const META_SUFFIX:    &str = ".meta.json";

/// Contents of `{model_name}.latest.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointPointer {
    pub model: String,
    /// Checkpoint name without extension, e.g. `model-100`
    pub name: String,
    pub epoch: usize,
}

impl CheckpointPointer {
    /// Split a checkpoint name such as `my-model-100` into model and epoch.
    pub fn parse(name: &str) -> Result<Self> {
        let (model, epoch) = name
            .rsplit_once('-')
            .and_then(|(model, epoch)| Some((model, epoch.parse::<usize>().ok()?)))
            .filter(|(model, _)| !model.is_empty())
            .ok_or_else(|| anyhow!("'{name}' is not a checkpoint name of the form <model>-<epoch>"))?;
        Ok(Self { model: model.to_string(), name: name.to_string(), epoch })
    }
}

/// `{model_name}-{epoch}`
pub fn checkpoint_name(model_name: &str, epoch: usize) -> String {
    format!("{model_name}-{epoch}")
}

type ParamRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save every parameter of `model` as `{model_name}-{epoch}`, with
    /// its layer sizes alongside, and point `{model_name}.latest.json`
    /// at it.
    pub fn save_model<B: Backend>(
        &self,
        model:      &Mlp<B>,
        model_name: &str,
        epoch:      usize,
    ) -> Result<PathBuf> {
        let name = checkpoint_name(model_name, epoch);
        // The recorder appends its own extension
        let path = self.dir.join(&name);

        ParamRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        self.write_json(&format!("{name}{META_SUFFIX}"), &model.shape())?;

        let pointer = CheckpointPointer { model: model_name.to_string(), name, epoch };
        self.write_json(&format!("{model_name}{POINTER_SUFFIX}"), &pointer)?;

        tracing::debug!("Saved checkpoint '{}'", pointer.name);
        Ok(path)
    }

    /// Restore the parameters saved under `name` into `model`.
    ///
    /// Fails without touching `model` when the checkpoint was saved
    /// from a network with different layer sizes.
    pub fn load_model<B: Backend>(
        &self,
        model:  Mlp<B>,
        name:   &str,
        device: &B::Device,
    ) -> Result<Mlp<B>> {
        let path = self.dir.join(name);
        tracing::info!("Loading checkpoint '{}'", path.display());

        let saved: MlpShape = self
            .read_json(&format!("{name}{META_SUFFIX}"))
            .with_context(|| format!("Cannot load checkpoint '{name}'. Has the model been trained?"))?;
        let expected = model.shape();
        if saved != expected {
            bail!(
                "checkpoint '{}' holds a {} -> {} x {} network but the model is {} -> {} x {}",
                name,
                saved.n_feat, saved.n_hidden, saved.n_node,
                expected.n_feat, expected.n_hidden, expected.n_node,
            );
        }

        let record = ParamRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Has the model been trained?", path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// The most recently saved checkpoint of `model_name`.
    pub fn latest(&self, model_name: &str) -> Result<CheckpointPointer> {
        self.read_json(&format!("{model_name}{POINTER_SUFFIX}")).with_context(|| {
            format!("No checkpoint of '{model_name}' in '{}'. Have you run 'train' first?", self.dir.display())
        })
    }

    /// Names of every model with at least one checkpoint here, sorted.
    pub fn models(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot list '{}'", self.dir.display()))?;

        let mut models = Vec::new();
        for entry in entries {
            let file_name = entry?.file_name();
            if let Some(model) = file_name.to_str().and_then(|f| f.strip_suffix(POINTER_SUFFIX)) {
                models.push(model.to_string());
            }
        }
        models.sort();
        Ok(models)
    }

    /// Resolve `latest` or an explicit checkpoint name.
    ///
    /// `model` scopes the lookup: `latest` means that model's latest
    /// save, and an explicit name must belong to it. Without a model,
    /// `latest` is only accepted when the directory holds one model.
    pub fn resolve(&self, checkpoint: &str, model: Option<&str>) -> Result<CheckpointPointer> {
        if checkpoint == LATEST {
            return match model {
                Some(model) => self.latest(model),
                None => self.latest(&self.only_model()?),
            };
        }

        let pointer = CheckpointPointer::parse(checkpoint)?;
        if let Some(model) = model {
            if pointer.model != model {
                bail!("checkpoint '{}' belongs to model '{}', not '{}'", checkpoint, pointer.model, model);
            }
        }
        Ok(pointer)
    }

    fn only_model(&self) -> Result<String> {
        let mut models = self.models()?;
        match models.len() {
            0 => bail!("No checkpoints in '{}'. Have you run 'train' first?", self.dir.display()),
            1 => Ok(models.remove(0)),
            _ => bail!(
                "'{}' holds checkpoints of several models ({}); name one with --model",
                self.dir.display(),
                models.join(", ")
            ),
        }
    }

    /// Store `cfg` as `{model_name}.config.json`.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(&format!("{}{CONFIG_SUFFIX}", cfg.model_name), cfg)?;
        tracing::debug!("Saved training config of '{}'", cfg.model_name);
        Ok(())
    }

    pub fn load_config(&self, model_name: &str) -> Result<TrainConfig> {
        self.read_json(&format!("{model_name}{CONFIG_SUFFIX}")).with_context(|| {
            format!("Cannot read the config of '{model_name}'. Make sure you have run 'train' first.")
        })
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        fs::write(&path, serde_json::to_string_pretty(value)?)
            .with_context(|| format!("Failed to write '{}'", path.display()))
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("'{}' is malformed", path.display()))
    }
}
