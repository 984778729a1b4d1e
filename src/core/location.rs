//! This module resolves a building coordinate into the county and town that contain it.

use crate::errors::EstimationError;
use serde::Deserialize;
use std::io::Read;

const BOUNDARY_EPS: f64 = 1e-9;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TownBoundary {
    pub town_code: u64,
    pub county: String,
    pub town: String,
    /// exterior rings as `[longitude, latitude]` vertices
    rings: Vec<Vec<[f64; 2]>>,
}

/// Administrative town boundaries, searched in file order.
#[derive(Clone, Debug, Default)]
pub struct TownBoundaries {
    towns: Vec<TownBoundary>,
}

impl TownBoundaries {
    pub(crate) fn from_json(json: impl Read) -> Result<Self, EstimationError> {
        let towns: Vec<TownBoundary> = serde_json::from_reader(json).map_err(|err| {
            EstimationError::data(format!("Could not read town boundaries: {err}"))
        })?;

        Ok(Self { towns })
    }

    /// County and town of the first town whose boundary contains the point. Points on a
    /// boundary line belong to the town.
    pub fn locate(&self, longitude: f64, latitude: f64) -> Result<(String, String), EstimationError> {
        self.towns
            .iter()
            .find(|town| {
                town.rings
                    .iter()
                    .any(|ring| is_point_inside_ring([longitude, latitude], ring, true))
            })
            .map(|town| (town.county.clone(), town.town.clone()))
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "No town contains the building coordinate ({longitude}, {latitude})."
                ))
            })
    }
}

/// Checks if a point lies inside a closed ring using ray casting.
///
/// If `boundary_in` is true, points on an edge or vertex are considered inside.
fn is_point_inside_ring(point: [f64; 2], ring: &[[f64; 2]], boundary_in: bool) -> bool {
    if ring.len() < 3 {
        return false;
    }

    if is_point_on_boundary(point, ring) {
        return boundary_in;
    }

    let [x, y] = point;
    let mut inside = false;
    for (start, end) in ring_edges(ring) {
        let ([x1, y1], [x2, y2]) = (start, end);
        if (y1 > y) != (y2 > y) {
            let x_crossing = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
            if x < x_crossing {
                inside = !inside;
            }
        }
    }

    inside
}

fn is_point_on_boundary(point: [f64; 2], ring: &[[f64; 2]]) -> bool {
    ring_edges(ring).any(|(start, end)| is_point_on_segment(point, start, end))
}

fn is_point_on_segment(point: [f64; 2], start: [f64; 2], end: [f64; 2]) -> bool {
    let [px, py] = point;
    let [x1, y1] = start;
    let [x2, y2] = end;

    let cross = (x2 - x1) * (py - y1) - (y2 - y1) * (px - x1);
    if cross.abs() > BOUNDARY_EPS {
        return false;
    }

    px >= x1.min(x2) - BOUNDARY_EPS
        && px <= x1.max(x2) + BOUNDARY_EPS
        && py >= y1.min(y2) - BOUNDARY_EPS
        && py <= y1.max(y2) + BOUNDARY_EPS
}

/// Edges of a ring, closing it when the last vertex does not repeat the first.
fn ring_edges(ring: &[[f64; 2]]) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
    let closing = match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if first != last => Some((*last, *first)),
        _ => None,
    };

    ring.windows(2)
        .map(|pair| (pair[0], pair[1]))
        .chain(closing)
}
