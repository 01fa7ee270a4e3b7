//! Session wiring between selection events, fetch collaborators and the map binder.
//!
//! Fetches do not run inside the triggering event. Each selection queues a ticket
//! stamped with the selection [`Scope`] of that moment; tickets are executed later by
//! [`Orchestrator::run_next`]. A result whose scope has been superseded is dropped by
//! the selection setters.

use crate::{
    binder::{GeoBinder, RenderPoint, ViewBounds},
    data::{AddressLookup, RoadLookup, UnitLookup},
    error::{CascadeError, CollaboratorError},
    price_model::{PriceModel, UnitFeatures, format_price},
    selection::{AddressRecord, Options, RoadRecord, Scope, SelectionEvent, SelectionState},
};
use geo::Coord;
use std::collections::VecDeque;

/// External services a session talks to.
pub struct Collaborators {
    pub roads: Box<dyn RoadLookup>,
    pub addresses: Box<dyn AddressLookup>,
    pub units: Box<dyn UnitLookup>,
    pub model: Box<dyn PriceModel>,
}

#[derive(Clone, Debug, PartialEq)]
enum Fetch {
    Roads {
        scope: Scope,
        zipcode: String,
    },
    Addresses {
        scope: Scope,
        road_id: String,
    },
    Prediction {
        scope: Scope,
        address_id: String,
        access_point: Coord<f64>,
    },
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderModel {
    pub zipcode_options: Vec<String>,
    pub road_options: Vec<String>,
    pub address_options: Vec<String>,
    pub zipcode: Option<String>,
    pub road: Option<String>,
    pub address: Option<String>,
    pub points: Vec<RenderPoint>,
    pub bounds: ViewBounds,
    pub prediction: Option<String>,
    /// Fetches are still queued.
    pub loading: bool,
}

pub struct Orchestrator {
    selection: SelectionState,
    binder: GeoBinder,
    collaborators: Collaborators,
    pending: VecDeque<Fetch>,
    currency: String,
    model: RenderModel,
}

impl Orchestrator {
    pub fn new(
        zipcodes: Vec<String>,
        default_bounds: ViewBounds,
        currency: impl Into<String>,
        collaborators: Collaborators,
    ) -> Self {
        let selection = SelectionState::new(zipcodes);
        let mut binder = GeoBinder::new(default_bounds);
        binder.rebind(&selection);
        let currency = currency.into();
        let model = build_model(&selection, &binder, &currency, false);
        Self {
            selection,
            binder,
            collaborators,
            pending: VecDeque::new(),
            currency,
            model,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn render_model(&self) -> &RenderModel {
        &self.model
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn select_zipcode(&mut self, zipcode: Option<&str>) -> Result<(), CascadeError> {
        let event = self.selection.set_zipcode(zipcode)?;
        self.dispatch(event);
        Ok(())
    }

    pub fn select_road(&mut self, road: Option<&str>) -> Result<(), CascadeError> {
        let event = self.selection.set_road(road)?;
        self.dispatch(event);
        Ok(())
    }

    pub fn select_address(&mut self, address: Option<&str>) -> Result<(), CascadeError> {
        let event = self.selection.set_address(address)?;
        self.dispatch(event);
        Ok(())
    }

    /// Queues the fetch the event calls for, then republishes the render model.
    fn dispatch(&mut self, event: SelectionEvent) {
        tracing::info!(?event, "selection changed");
        let scope = self.selection.scope();
        let fetch = match event {
            SelectionEvent::ZipcodeChanged(Some(zipcode)) => Some(Fetch::Roads { scope, zipcode }),
            SelectionEvent::RoadChanged(Some(_)) => self.selection.road_record().map(|road| Fetch::Addresses {
                scope,
                road_id: road.id.clone(),
            }),
            SelectionEvent::AddressChanged(Some(_)) => {
                self.selection.address_record().map(|address| Fetch::Prediction {
                    scope,
                    address_id: address.id.clone(),
                    access_point: address.access_point,
                })
            }
            _ => None,
        };
        if let Some(fetch) = fetch {
            tracing::debug!(?fetch, "fetch issued");
            self.pending.push_back(fetch);
        }
        self.publish();
    }

    /// Executes the oldest queued fetch. Returns `false` when nothing was queued.
    pub fn run_next(&mut self) -> bool {
        let Some(fetch) = self.pending.pop_front() else {
            return false;
        };
        let applied = match fetch {
            Fetch::Roads { scope, zipcode } => {
                let options = self.fetch_roads(&zipcode);
                self.selection.set_road_options(&scope, options)
            }
            Fetch::Addresses { scope, road_id } => {
                let options = self.fetch_addresses(&road_id);
                self.selection.set_address_options(&scope, options)
            }
            Fetch::Prediction {
                scope,
                address_id,
                access_point,
            } => {
                let prediction = self.resolve_prediction(&address_id, access_point);
                self.selection.set_prediction(&scope, prediction)
            }
        };
        match applied {
            Ok(()) => {}
            Err(e @ CascadeError::StaleResult { .. }) => tracing::debug!("{e}"),
            Err(e) => tracing::error!("fetch result rejected: {e}"),
        }
        self.publish();
        true
    }

    /// Drains the queue, including fetches queued while draining.
    pub fn run_pending(&mut self) {
        while self.run_next() {}
    }

    fn fetch_roads(&self, zipcode: &str) -> Options<RoadRecord> {
        let entries = self.collaborators.roads.fetch_roads(zipcode).unwrap_or_else(|e| {
            log_unavailable(&e);
            Vec::new()
        });
        tracing::info!(zipcode, roads = entries.len(), "roads fetched");
        entries
            .into_iter()
            .map(|entry| {
                let bbox = entry.bbox_rect();
                (entry.name, RoadRecord { id: entry.id, bbox })
            })
            .collect()
    }

    fn fetch_addresses(&self, road_id: &str) -> Options<AddressRecord> {
        let entries = self.collaborators.addresses.fetch_addresses(road_id).unwrap_or_else(|e| {
            log_unavailable(&e);
            Vec::new()
        });
        tracing::info!(road_id, addresses = entries.len(), "addresses fetched");
        entries
            .into_iter()
            .map(|entry| {
                (
                    entry.label,
                    AddressRecord {
                        id: entry.id,
                        access_point: entry.coordinates,
                    },
                )
            })
            .collect()
    }

    fn resolve_prediction(&self, address_id: &str, access_point: Coord<f64>) -> Option<f64> {
        let unit = match self.collaborators.units.fetch_unit(address_id) {
            Ok(Some(unit)) => unit,
            Ok(None) => {
                tracing::info!(address_id, "no unit registered at address");
                return None;
            }
            Err(e) => {
                log_unavailable(&e);
                return None;
            }
        };
        let features = UnitFeatures {
            rooms: unit.rooms,
            size: unit.size,
            build_year: unit.build_year,
            latitude: access_point.y,
            longitude: access_point.x,
        };
        let price = self.collaborators.model.predict(&features);
        if !price.is_finite() {
            tracing::warn!(address_id, price, "model returned a non-finite price");
            return None;
        }
        tracing::info!(address_id, price, "prediction resolved");
        Some(price)
    }

    fn publish(&mut self) {
        self.binder.rebind(&self.selection);
        self.model = build_model(&self.selection, &self.binder, &self.currency, !self.pending.is_empty());
    }
}

fn log_unavailable(e: &CollaboratorError) {
    tracing::warn!("{e}");
}

fn build_model(selection: &SelectionState, binder: &GeoBinder, currency: &str, loading: bool) -> RenderModel {
    let mut zipcode_options = selection.zipcodes().to_vec();
    zipcode_options.sort();
    RenderModel {
        zipcode_options,
        road_options: selection.road_options().sorted_labels(),
        address_options: selection.address_options().sorted_labels(),
        zipcode: selection.zipcode().map(str::to_string),
        road: selection.road().map(str::to_string),
        address: selection.address().map(str::to_string),
        points: binder.points().to_vec(),
        bounds: binder.bounds(),
        prediction: selection.prediction().map(|p| format_price(p, currency)),
        loading,
    }
}
