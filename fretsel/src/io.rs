use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fretcore::data::Dataset;

use crate::error::{Result, SelError};
use crate::pipeline::Pipeline;

/// Raw photon stream of one channel: timestamps in clock ticks and detector ids.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPhotons {
    pub times: Vec<u64>,
    pub detectors: Vec<u8>,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| SelError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| SelError::json(path, e))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| SelError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| SelError::json(path, e))?;
    writer.flush().map_err(|e| SelError::io(path, e))?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Read a dataset and check its array lengths and period bins.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset: Dataset = read_json(path)?;
    dataset.validate()?;
    debug!(
        "loaded {} dataset with {} channel(s) from {}",
        dataset.mode(),
        dataset.nch(),
        path.display()
    );
    Ok(dataset)
}

pub fn load_pipeline(path: &Path) -> Result<Pipeline> {
    let pipeline: Pipeline = read_json(path)?;
    debug!("loaded {} selection step(s) from {}", pipeline.steps.len(), path.display());
    Ok(pipeline)
}
