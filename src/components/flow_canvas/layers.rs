use crate::flow::{intensity_color, lane_count, lane_offsets, ArcStyle, IntensityBin, ParticlePath, SpawnCandidate};
use crate::geometry::LatLon;
use crate::models::{format_count, FlowArc, FlowDataset, PassengerFlowDataset, RouteShape};
use std::collections::HashMap;
use std::rc::Rc;

const OD_STATION_RADIUS: f64 = 6.0;
const SELECTED_STATION_RADIUS: f64 = 9.0;
const HOURLY_STATION_BASE_RADIUS: f64 = 4.0;
const HOURLY_STATION_RADIUS_GAIN: f64 = 5.0;

/// One OD arc with its resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLayer {
    pub origin: LatLon,
    pub destination: LatLon,
    pub intensity: f64,
    pub color: String,
    pub width: f64,
    pub glow_width: f64,
    /// Lane offsets; a single zero lane unless a station is selected
    pub lanes: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationGlyph {
    pub name: String,
    pub position: LatLon,
    pub radius: f64,
    pub fill: String,
    pub selected: bool,
    /// Tooltip text, first line is the station name
    pub tooltip: Vec<String>,
}

/// Everything the frame draws that only changes when data or filters change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowLayers {
    pub routes: Vec<Rc<RouteShape>>,
    /// Intensity of each entry of `routes`, from the hourly station flow
    pub route_intensity: Vec<f64>,
    pub route_colors: HashMap<String, String>,
    pub arcs: Vec<ArcLayer>,
    pub stations: Vec<StationGlyph>,
}

/// Data the layers are derived from
pub struct LayerInputs<'a> {
    pub routes: &'a [Rc<RouteShape>],
    pub dataset: Option<&'a FlowDataset>,
    /// Arcs that passed the filters
    pub arcs: &'a [FlowArc],
    pub selected: Option<&'a str>,
    pub hourly: Option<(&'a PassengerFlowDataset, u32)>,
    pub style: ArcStyle,
}

impl FlowLayers {
    #[must_use]
    pub fn build(inputs: &LayerInputs<'_>) -> Self {
        let routes: Vec<Rc<RouteShape>> = inputs.routes.iter().filter(|r| r.is_drawable()).map(Rc::clone).collect();
        let route_intensity = routes
            .iter()
            .map(|route| {
                inputs
                    .hourly
                    .map_or(0.0, |(flow, hour)| flow.route_intensity(&route.path, hour))
            })
            .collect();
        let route_colors = inputs
            .routes
            .iter()
            .map(|route| (route.id.clone(), route.color.clone()))
            .collect();

        Self {
            routes,
            route_intensity,
            route_colors,
            arcs: arc_layers(inputs),
            stations: station_glyphs(inputs),
        }
    }

    /// Whether both layers carry particles along the same geometry, so a
    /// change of intensities alone does not reset the animation
    #[must_use]
    pub fn same_paths(&self, other: &Self) -> bool {
        self.routes.len() == other.routes.len()
            && self.arcs.len() == other.arcs.len()
            && self
                .routes
                .iter()
                .zip(&other.routes)
                .all(|(a, b)| Rc::ptr_eq(&a.path, &b.path) || a.path == b.path)
            && self.arcs.iter().zip(&other.arcs).all(|(a, b)| {
                a.origin == b.origin && a.destination == b.destination && a.lanes == b.lanes
            })
    }

    /// Particle paths for the current layers: one per drawable route and one per arc lane.
    ///
    /// Route polylines are shared with the loaded routes; arcs get fresh paths.
    #[must_use]
    pub fn spawn_candidates(&self) -> Vec<SpawnCandidate> {
        let routes = self
            .routes
            .iter()
            .zip(&self.route_intensity)
            .filter(|(_, intensity)| **intensity > 0.0)
            .map(|(route, intensity)| {
                SpawnCandidate::new(Rc::new(ParticlePath::Polyline(Rc::clone(&route.path))), *intensity)
            });

        let arcs = self.arcs.iter().flat_map(|arc| {
            arc.lanes.iter().map(move |lane_offset| {
                let path = ParticlePath::Arc {
                    origin: arc.origin,
                    destination: arc.destination,
                    lane_offset: *lane_offset,
                };
                SpawnCandidate::new(Rc::new(path), arc.intensity)
            })
        });

        routes.chain(arcs).collect()
    }
}

fn arc_layers(inputs: &LayerInputs<'_>) -> Vec<ArcLayer> {
    let Some(dataset) = inputs.dataset else {
        return Vec::new();
    };
    let max_value = dataset.max_value();

    inputs
        .arcs
        .iter()
        .map(|arc| {
            let intensity = dataset.normalized_value(arc);
            let lanes = if inputs.selected.is_some() {
                lane_offsets(lane_count(arc.value)).collect()
            } else {
                vec![0.0]
            };
            ArcLayer {
                origin: arc.origin.position,
                destination: arc.destination.position,
                intensity,
                color: intensity_color(intensity),
                width: inputs.style.stroke_width(arc.value, max_value),
                glow_width: inputs.style.glow_width(arc.value, max_value),
                lanes,
            }
        })
        .collect()
}

fn station_glyphs(inputs: &LayerInputs<'_>) -> Vec<StationGlyph> {
    let mut glyphs = Vec::new();

    if let Some((flow, hour)) = inputs.hourly {
        let totals = flow.hour_totals(hour);
        for station in flow.stations() {
            let (entry, exit, intensity) = totals
                .get(station.name.as_str())
                .map_or((0, 0, 0.0), |e| (e.entry, e.exit, flow.station_intensity(e)));
            glyphs.push(StationGlyph {
                name: station.name.clone(),
                position: station.position,
                radius: HOURLY_STATION_BASE_RADIUS + intensity * HOURLY_STATION_RADIUS_GAIN,
                fill: IntensityBin::from_intensity(intensity).color(),
                selected: inputs.selected == Some(station.name.as_str()),
                tooltip: vec![
                    station.name.clone(),
                    format!("Boarding: {entry}"),
                    format!("Alighting: {exit}"),
                ],
            });
        }
    }

    if let Some(dataset) = inputs.dataset {
        let totals = dataset.station_totals(inputs.selected);
        for station in dataset.stations() {
            if glyphs.iter().any(|g| g.name == station.name) {
                continue;
            }
            let selected = inputs.selected == Some(station.name.as_str());
            let stats = totals.get(&station.name).copied().unwrap_or_default();

            let mut tooltip = vec![
                station.name.clone(),
                format!("Origin total: {}", format_count(stats.origin_total)),
                format!("Destination total: {}", format_count(stats.destination_total)),
            ];
            if let Some(selected_name) = inputs.selected.filter(|_| !selected) {
                tooltip.push(format!("From {selected_name}: {}", format_count(stats.from_selected)));
                tooltip.push(format!("To {selected_name}: {}", format_count(stats.to_selected)));
            }

            glyphs.push(StationGlyph {
                name: station.name.clone(),
                position: station.position,
                radius: if selected { SELECTED_STATION_RADIUS } else { OD_STATION_RADIUS },
                fill: station.line_color.clone(),
                selected,
                tooltip,
            });
        }
    }

    glyphs
}
