use std::path::Path;

use crate::error::Result;
use crate::model::FlightDataset;

/// Save a dataset to a JSON file, creating parent directories.
pub fn save_dataset(dataset: &FlightDataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(dataset)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<FlightDataset> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
