use crate::error::{CascadeError, Level};
use geo::{Coord, Rect};

pub type RoadName = String;
pub type AddressLabel = String;

/// Road candidate. `bbox` is geographic: `x` is longitude, `y` is latitude.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadRecord {
    pub id: String,
    pub bbox: Rect<f64>,
}

/// Address candidate. `access_point` is `(lon, lat)` as `(x, y)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AddressRecord {
    pub id: String,
    pub access_point: Coord<f64>,
}

/// Label-keyed options kept in insertion order.
///
/// Labels are unique: the first record inserted under a label wins and later
/// duplicates are dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct Options<R> {
    entries: Vec<(String, R)>,
}

impl<R> Default for Options<R> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<R> Options<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the label was already taken.
    pub fn insert(&mut self, label: impl Into<String>, record: R) -> bool {
        let label = label.into();
        if self.contains(&label) {
            tracing::warn!(%label, "duplicate option label, keeping the first");
            return false;
        }
        self.entries.push((label, record));
        true
    }

    pub fn get(&self, label: &str) -> Option<&R> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, r)| r)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> {
        self.entries.iter().map(|(l, r)| (l.as_str(), r))
    }

    /// Labels sorted lexicographically, as presented to the user.
    pub fn sorted_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.iter().map(|(l, _)| l.clone()).collect();
        labels.sort();
        labels
    }
}

impl<R> FromIterator<(String, R)> for Options<R> {
    fn from_iter<I: IntoIterator<Item = (String, R)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (label, record) in iter {
            options.insert(label, record);
        }
        options
    }
}

/// Emitted by a successful top-down selection; the orchestrator reacts to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionEvent {
    ZipcodeChanged(Option<String>),
    RoadChanged(Option<RoadName>),
    AddressChanged(Option<AddressLabel>),
}

/// Selection path captured when a fetch is issued.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    pub zipcode: Option<String>,
    pub road: Option<RoadName>,
    pub address: Option<AddressLabel>,
}

impl Scope {
    /// Whether `self` and `other` agree on every level down to `level`.
    fn matches_through(&self, other: &Scope, level: Level) -> bool {
        self.zipcode == other.zipcode
            && (level < Level::Road || self.road == other.road)
            && (level < Level::Address || self.address == other.address)
    }
}

/// The zipcode → road → address → prediction cascade.
#[derive(Clone, Debug)]
pub struct SelectionState {
    zipcodes: Vec<String>,
    zipcode: Option<String>,
    road_options: Options<RoadRecord>,
    road: Option<RoadName>,
    address_options: Options<AddressRecord>,
    address: Option<AddressLabel>,
    prediction: Option<f64>,
}

impl SelectionState {
    pub fn new(zipcodes: Vec<String>) -> Self {
        Self {
            zipcodes,
            zipcode: None,
            road_options: Options::new(),
            road: None,
            address_options: Options::new(),
            address: None,
            prediction: None,
        }
    }

    pub fn zipcodes(&self) -> &[String] {
        &self.zipcodes
    }

    pub fn zipcode(&self) -> Option<&str> {
        self.zipcode.as_deref()
    }

    pub fn road_options(&self) -> &Options<RoadRecord> {
        &self.road_options
    }

    pub fn road(&self) -> Option<&str> {
        self.road.as_deref()
    }

    /// Record of the selected road.
    pub fn road_record(&self) -> Option<&RoadRecord> {
        self.road.as_deref().and_then(|r| self.road_options.get(r))
    }

    pub fn address_options(&self) -> &Options<AddressRecord> {
        &self.address_options
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn address_record(&self) -> Option<&AddressRecord> {
        self.address.as_deref().and_then(|a| self.address_options.get(a))
    }

    pub fn prediction(&self) -> Option<f64> {
        self.prediction
    }

    pub fn scope(&self) -> Scope {
        Scope {
            zipcode: self.zipcode.clone(),
            road: self.road.clone(),
            address: self.address.clone(),
        }
    }

    pub fn set_zipcode(&mut self, zipcode: Option<&str>) -> Result<SelectionEvent, CascadeError> {
        if let Some(z) = zipcode {
            if !self.zipcodes.iter().any(|valid| valid == z) {
                return Err(CascadeError::InvalidSelection {
                    level: Level::Zipcode,
                    value: z.to_string(),
                });
            }
        }
        self.clear_below(Level::Zipcode);
        self.zipcode = zipcode.map(str::to_string);
        Ok(SelectionEvent::ZipcodeChanged(self.zipcode.clone()))
    }

    pub fn set_road(&mut self, road: Option<&str>) -> Result<SelectionEvent, CascadeError> {
        if self.zipcode.is_none() {
            return Err(CascadeError::PreconditionViolated {
                level: Level::Road,
                requires: Level::Zipcode,
            });
        }
        if let Some(r) = road {
            if !self.road_options.contains(r) {
                return Err(CascadeError::InvalidSelection {
                    level: Level::Road,
                    value: r.to_string(),
                });
            }
        }
        self.clear_below(Level::Road);
        self.road = road.map(str::to_string);
        Ok(SelectionEvent::RoadChanged(self.road.clone()))
    }

    pub fn set_address(&mut self, address: Option<&str>) -> Result<SelectionEvent, CascadeError> {
        if self.road.is_none() {
            return Err(CascadeError::PreconditionViolated {
                level: Level::Address,
                requires: Level::Road,
            });
        }
        if let Some(a) = address {
            if !self.address_options.contains(a) {
                return Err(CascadeError::InvalidSelection {
                    level: Level::Address,
                    value: a.to_string(),
                });
            }
        }
        self.clear_below(Level::Address);
        self.address = address.map(str::to_string);
        Ok(SelectionEvent::AddressChanged(self.address.clone()))
    }

    /// Applies a road fetch issued under `scope`.
    ///
    /// A road that is no longer offered is deselected along with everything below it.
    pub fn set_road_options(
        &mut self,
        scope: &Scope,
        options: Options<RoadRecord>,
    ) -> Result<(), CascadeError> {
        if !scope.matches_through(&self.scope(), Level::Zipcode) {
            return Err(CascadeError::StaleResult { level: Level::Road });
        }
        if self.zipcode.is_none() {
            return Err(CascadeError::PreconditionViolated {
                level: Level::Road,
                requires: Level::Zipcode,
            });
        }
        self.road_options = options;
        if self.road.as_deref().is_some_and(|r| !self.road_options.contains(r)) {
            self.clear_below(Level::Road);
            self.road = None;
        }
        Ok(())
    }

    /// Applies an address fetch issued under `scope`.
    pub fn set_address_options(
        &mut self,
        scope: &Scope,
        options: Options<AddressRecord>,
    ) -> Result<(), CascadeError> {
        if !scope.matches_through(&self.scope(), Level::Road) {
            return Err(CascadeError::StaleResult {
                level: Level::Address,
            });
        }
        if self.road.is_none() {
            return Err(CascadeError::PreconditionViolated {
                level: Level::Address,
                requires: Level::Road,
            });
        }
        self.address_options = options;
        if self
            .address
            .as_deref()
            .is_some_and(|a| !self.address_options.contains(a))
        {
            self.clear_below(Level::Address);
            self.address = None;
        }
        Ok(())
    }

    pub fn set_prediction(&mut self, scope: &Scope, prediction: Option<f64>) -> Result<(), CascadeError> {
        if !scope.matches_through(&self.scope(), Level::Address) {
            return Err(CascadeError::StaleResult {
                level: Level::Prediction,
            });
        }
        if self.address.is_none() {
            return Err(CascadeError::PreconditionViolated {
                level: Level::Prediction,
                requires: Level::Address,
            });
        }
        self.prediction = prediction;
        Ok(())
    }

    /// Clears every field strictly below `level`.
    fn clear_below(&mut self, level: Level) {
        if level < Level::Road {
            self.road_options.clear();
            self.road = None;
        }
        if level < Level::Address {
            self.address_options.clear();
            self.address = None;
        }
        self.prediction = None;
    }

    /// Cascade consistency, checked by tests after every mutation.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        let zip_ok = self.zipcode.is_some() || (self.road.is_none() && self.road_options.is_empty());
        let road_ok = self.road.is_some() || (self.address.is_none() && self.address_options.is_empty());
        let address_ok = self.address.is_some() || self.prediction.is_none();
        let keys_ok = self.road.as_deref().is_none_or(|r| self.road_options.contains(r))
            && self.address.as_deref().is_none_or(|a| self.address_options.contains(a));
        zip_ok && road_ok && address_ok && keys_ok
    }
}
