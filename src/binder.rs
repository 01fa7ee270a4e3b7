use crate::{
    projection::project,
    selection::{AddressRecord, Options, RoadRecord, SelectionState},
};
use geo::{Rect, coord};

/// Geographic padding applied around a road's bbox, in degrees.
pub const BBOX_MARGIN_DEG: f64 = 0.001;

/// Planar (projected) view rectangle.
pub type ViewBounds = Rect<f64>;

/// One plotted address.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub predicted_value: Option<f64>,
}

/// Projects a geographic rectangle (`x` = lon, `y` = lat) corner by corner.
pub fn project_rect(geo_rect: Rect<f64>) -> ViewBounds {
    let (min_x, min_y) = project(geo_rect.min().y, geo_rect.min().x);
    let (max_x, max_y) = project(geo_rect.max().y, geo_rect.max().x);
    Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y })
}

/// One point per address option, in insertion order. Only `selected` gets `prediction`.
pub fn compute_render_points(
    address_options: &Options<AddressRecord>,
    selected: Option<&str>,
    prediction: Option<f64>,
) -> Vec<RenderPoint> {
    address_options
        .iter()
        .map(|(label, record)| {
            let (x, y) = project(record.access_point.y, record.access_point.x);
            RenderPoint {
                x,
                y,
                label: label.to_string(),
                predicted_value: if selected == Some(label) { prediction } else { None },
            }
        })
        .collect()
}

/// `default` without a road, otherwise the road's bbox padded by [`BBOX_MARGIN_DEG`].
pub fn compute_view_bounds(selected_road: Option<&RoadRecord>, default: ViewBounds) -> ViewBounds {
    let Some(road) = selected_road else {
        return default;
    };
    let (min, max) = (road.bbox.min(), road.bbox.max());
    project_rect(Rect::new(
        coord! { x: min.x - BBOX_MARGIN_DEG, y: min.y - BBOX_MARGIN_DEG },
        coord! { x: max.x + BBOX_MARGIN_DEG, y: max.y + BBOX_MARGIN_DEG },
    ))
}

/// Point dataset and view bounds bound to the map.
///
/// Both are replaced wholesale on every [`GeoBinder::rebind`]; points carry no
/// identity between rebinds.
#[derive(Clone, Debug)]
pub struct GeoBinder {
    default_bounds: ViewBounds,
    points: Vec<RenderPoint>,
    bounds: ViewBounds,
}

impl GeoBinder {
    pub fn new(default_bounds: ViewBounds) -> Self {
        Self {
            default_bounds,
            points: Vec::new(),
            bounds: default_bounds,
        }
    }

    pub fn rebind(&mut self, selection: &SelectionState) {
        self.points = compute_render_points(
            selection.address_options(),
            selection.address(),
            selection.prediction(),
        );
        self.bounds = compute_view_bounds(selection.road_record(), self.default_bounds);
    }

    pub fn points(&self) -> &[RenderPoint] {
        &self.points
    }

    pub fn bounds(&self) -> ViewBounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn aarhus() -> ViewBounds {
        project_rect(Rect::new(coord! { x: 10.18, y: 56.13 }, coord! { x: 10.26, y: 56.18 }))
    }

    fn road() -> RoadRecord {
        RoadRecord {
            id: "r1".into(),
            bbox: Rect::new(coord! { x: 10.200, y: 56.150 }, coord! { x: 10.210, y: 56.156 }),
        }
    }

    fn options() -> Options<AddressRecord> {
        ["Vestergade 9", "Allégade 1", "Nørregade 4"]
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                (
                    label.to_string(),
                    AddressRecord {
                        id: format!("a{i}"),
                        access_point: coord! { x: 10.20 + i as f64 * 0.002, y: 56.15 },
                    },
                )
            })
            .collect()
    }

    #[test]
    fn default_view_covers_aarhus() {
        let b = aarhus();
        assert!((b.min().x - 1_133_232.416_275_525).abs() < 1e-6);
        assert!((b.max().y - 7_594_332.331_970_287).abs() < 1e-6);
    }

    #[test]
    fn no_road_keeps_default_bounds() {
        assert_eq!(compute_view_bounds(None, aarhus()), aarhus());
    }

    #[test]
    fn road_bounds_are_padded() {
        let padded = compute_view_bounds(Some(&road()), aarhus());
        let tight = project_rect(road().bbox);
        assert!(padded.min().x < tight.min().x);
        assert!(padded.min().y < tight.min().y);
        assert!(padded.max().x > tight.max().x);
        assert!(padded.max().y > tight.max().y);
    }

    #[test]
    fn points_follow_insertion_order() {
        let points = compute_render_points(&options(), None, None);
        let labels: Vec<&str> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Vestergade 9", "Allégade 1", "Nørregade 4"]);
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
        assert!(points.iter().all(|p| p.predicted_value.is_none()));
    }

    #[test]
    fn prediction_attaches_to_selected_only() {
        let points = compute_render_points(&options(), Some("Allégade 1"), Some(3_150_000.0));
        let values: Vec<Option<f64>> = points.iter().map(|p| p.predicted_value).collect();
        assert_eq!(values, vec![None, Some(3_150_000.0), None]);
    }

    #[test]
    fn point_matches_projection() {
        let points = compute_render_points(&options(), None, None);
        let (x, y) = project(56.15, 10.20);
        assert_eq!((points[0].x, points[0].y), (x, y));
    }

    #[test]
    fn rebind_replaces_dataset() {
        let mut state = SelectionState::new(vec!["8000".into()]);
        let mut binder = GeoBinder::new(aarhus());
        binder.rebind(&state);
        assert!(binder.points().is_empty());
        assert_eq!(binder.bounds(), aarhus());

        state.set_zipcode(Some("8000")).unwrap();
        let mut roads = Options::new();
        roads.insert("Vestergade", road());
        state.set_road_options(&state.scope(), roads).unwrap();
        state.set_road(Some("Vestergade")).unwrap();
        state.set_address_options(&state.scope(), options()).unwrap();
        binder.rebind(&state);
        assert_eq!(binder.points().len(), 3);
        assert_eq!(binder.bounds(), compute_view_bounds(Some(&road()), aarhus()));

        state.set_zipcode(None).unwrap();
        binder.rebind(&state);
        assert!(binder.points().is_empty());
        assert_eq!(binder.bounds(), aarhus());
    }
}
