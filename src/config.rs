use crate::{binder::{ViewBounds, project_rect}, error::AppError};
use geo::{Rect, coord};
use serde::Deserialize;
use std::{fs, io, path::Path};

/// Geographic extent in degrees.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GeoExtent {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoExtent {
    pub fn to_view_bounds(&self) -> ViewBounds {
        project_rect(Rect::new(
            coord! { x: self.lon_min, y: self.lat_min },
            coord! { x: self.lon_max, y: self.lat_max },
        ))
    }
}

/// Settings read from `config.json` in the data directory; missing keys keep defaults.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub zipcodes: Vec<String>,
    /// City-wide view shown until a road is selected.
    pub default_view: GeoExtent,
    pub model_file: String,
    pub units_file: String,
    pub currency: String,
    pub log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zipcodes: ["8000", "8200", "8210", "8230"].map(String::from).to_vec(),
            default_view: GeoExtent {
                lat_min: 56.13,
                lat_max: 56.18,
                lon_min: 10.18,
                lon_max: 10.26,
            },
            model_file: "model.json".into(),
            units_file: "units.json".into(),
            currency: "kr.".into(),
            log_file: "estate_atlas.log".into(),
        }
    }
}

impl Config {
    pub const FILE_NAME: &'static str = "config.json";

    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self, AppError> {
        let path = data_dir.as_ref().join(Self::FILE_NAME);
        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| AppError::Json { path, source }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}
