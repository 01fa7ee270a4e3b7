use crate::error::AppError;
use serde::Deserialize;
use std::{fs, path::Path};

/// Model input: unit details plus the access-point coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitFeatures {
    pub rooms: u32,
    pub size: f64,
    pub build_year: u32,
    pub latitude: f64,
    pub longitude: f64,
}

/// Black-box sale price predictor.
pub trait PriceModel {
    fn predict(&self, features: &UnitFeatures) -> f64;
}

/// Linear model exported as JSON coefficients.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LinearPriceModel {
    pub intercept: f64,
    pub rooms: f64,
    pub size: f64,
    pub build_year: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl LinearPriceModel {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let model = serde_json::from_slice(&bytes).map_err(|source| AppError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded price model");
        Ok(model)
    }
}

impl PriceModel for LinearPriceModel {
    fn predict(&self, f: &UnitFeatures) -> f64 {
        self.intercept
            + self.rooms * f64::from(f.rooms)
            + self.size * f.size
            + self.build_year * f64::from(f.build_year)
            + self.latitude * f.latitude
            + self.longitude * f.longitude
    }
}

/// Formats a predicted price; millions get one decimal.
pub fn format_price(value: f64, currency: &str) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1} mln {}", value / 1_000_000.0, currency)
    } else {
        format!("{:.0} {}", value, currency)
    }
}
