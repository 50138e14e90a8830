//! Stitching result edges into closed, nested rings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tessel_kernel_math::{ccw_angle, Point2, Tolerance, Vec2};
use tracing::trace;

use crate::boolean::BooleanOp;
use crate::error::{PolygonError, Result};
use crate::polygon::Polygon;
use crate::sweep::{EventId, SweepEvent};

/// One ring of a Boolean result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPath {
    /// The ring: counter-clockwise at even depth, clockwise at odd depth.
    pub polygon: Polygon,
    /// Index of this ring in the result.
    pub path_id: usize,
    /// Number of rings enclosing this one.
    pub depth: usize,
    /// Innermost enclosing ring.
    pub parent: Option<usize>,
}

impl ResultPath {
    /// Holes sit at odd depth.
    pub fn is_hole(&self) -> bool {
        self.depth % 2 == 1
    }
}

/// Orient a ring for its depth.
fn orient(polygon: &mut Polygon, depth: usize) {
    if depth % 2 == 0 {
        polygon.ensure_ccw();
    } else {
        polygon.ensure_cw();
    }
}

/// Build rings from the sorted result events of a sweep.
///
/// Each ring starts at the lowest unprocessed edge leaving the leftmost
/// unprocessed point and turns, at every vertex, onto the edge with the
/// smallest counter-clockwise interior angle. Its depth comes from the
/// nearest result edge below its start.
pub(crate) fn compute_paths(
    events: &mut [SweepEvent],
    result: &[EventId],
    op: BooleanOp,
    tol: &Tolerance,
) -> Result<Vec<ResultPath>> {
    let n = result.len();
    let position: HashMap<EventId, usize> = result.iter().enumerate().map(|(i, &e)| (e, i)).collect();
    let partner: Vec<usize> = result
        .iter()
        .map(|&e| position.get(&events[e].other).copied().unwrap_or(usize::MAX))
        .collect();

    let mut paths: Vec<ResultPath> = Vec::new();
    for i in 0..n {
        if events[result[i]].processed {
            continue;
        }
        let start = lowest_local_line(events, result, &partner, i, tol);
        let path_id = paths.len();
        let (depth, parent) = compute_depth(events, result[start], &paths);

        let start_point = events[result[start]].point;
        let mut points = vec![start_point];
        let mut pos = start;
        let mut consumed = Vec::new();
        let mut steps = 0;
        loop {
            let other = partner[pos];
            if other == usize::MAX {
                return Err(PolygonError::UnpairedResultEvent {
                    op,
                    point: events[result[pos]].point,
                });
            }
            for p in [pos, other] {
                consumed.push(p);
                let e = &mut events[result[p]];
                e.processed = true;
                e.path_id = Some(path_id);
                e.parent_path_id = parent;
                e.depth = depth;
            }
            let here = events[result[other]].point;
            if tol.points_equal_2d(&here, &start_point) {
                break;
            }
            points.push(here);
            steps += 1;
            let incoming = here - events[result[pos]].point;
            pos = match next_position(events, result, &partner, other, &incoming, tol) {
                Some(next) if steps <= n => next,
                _ => {
                    return Err(PolygonError::PathNotClosed {
                        op,
                        path_id,
                        point: here,
                    })
                }
            };
        }

        let mut polygon = Polygon::new(points);
        if polygon.len() < 3 || tol.is_zero(polygon.area()) {
            trace!(path_id, "dropping degenerate path");
            for p in consumed {
                events[result[p]].path_id = None;
            }
            continue;
        }
        orient(&mut polygon, depth);
        paths.push(ResultPath {
            polygon,
            path_id,
            depth,
            parent,
        });
    }
    Ok(paths)
}

/// Positions of unprocessed result events at the same point as `at`.
fn same_point_candidates(events: &[SweepEvent], result: &[EventId], at: usize, tol: &Tolerance) -> Vec<usize> {
    let p = events[result[at]].point;
    let mut found = Vec::new();
    let mut i = at;
    while i > 0 && tol.points_equal_2d(&events[result[i - 1]].point, &p) {
        i -= 1;
    }
    while i < result.len() && tol.points_equal_2d(&events[result[i]].point, &p) {
        if !events[result[i]].processed {
            found.push(i);
        }
        i += 1;
    }
    found
}

/// Among the unprocessed left events at the point of `at`, the one whose
/// edge leaves lowest.
fn lowest_local_line(events: &[SweepEvent], result: &[EventId], partner: &[usize], at: usize, tol: &Tolerance) -> usize {
    let p = events[result[at]].point;
    same_point_candidates(events, result, at, tol)
        .into_iter()
        .filter(|&i| events[result[i]].left && partner[i] != usize::MAX)
        .map(|i| {
            let d = events[result[partner[i]]].point - p;
            (i, d.y.atan2(d.x))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(at, |(i, _)| i)
}

/// The unprocessed edge leaving the point of `at` with the smallest
/// counter-clockwise interior angle to the edge we arrived on.
fn next_position(
    events: &[SweepEvent],
    result: &[EventId],
    partner: &[usize],
    at: usize,
    incoming: &Vec2,
    tol: &Tolerance,
) -> Option<usize> {
    let here: Point2 = events[result[at]].point;
    let back = -incoming;
    same_point_candidates(events, result, at, tol)
        .into_iter()
        .filter(|&i| partner[i] != usize::MAX)
        .map(|i| {
            let out = events[result[partner[i]]].point - here;
            (i, ccw_angle(&out, &back))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(i, _)| i)
}

/// Depth and parent of a path from the nearest result edge below its start.
///
/// If the region just above that edge is inside the edge's own ring, the
/// new path nests one level deeper inside it; otherwise it is a sibling.
fn compute_depth(events: &[SweepEvent], start: EventId, paths: &[ResultPath]) -> (usize, Option<usize>) {
    let mut below = events[start].prev_in_result;
    while let Some(b) = below {
        if let Some(lower) = events[b].path_id.and_then(|id| paths.iter().find(|p| p.path_id == id)) {
            let inside_lower = events[b].enters_result != lower.is_hole();
            return if inside_lower {
                (lower.depth + 1, Some(lower.path_id))
            } else {
                (lower.depth, lower.parent)
            };
        }
        below = events[b].prev_in_result;
    }
    (0, None)
}

/// Assign depth and parent to rings that are known not to cross, by
/// containment, and orient each for its depth.
pub fn nest_rings(polygons: Vec<Polygon>) -> Vec<ResultPath> {
    let areas: Vec<f64> = polygons.iter().map(Polygon::area).collect();
    let samples: Vec<Point2> = polygons
        .iter()
        .map(|p| p.points.first().copied().unwrap_or_else(Point2::origin))
        .collect();
    let containers: Vec<Vec<usize>> = (0..polygons.len())
        .map(|i| {
            (0..polygons.len())
                .filter(|&j| j != i && areas[j] > areas[i] && polygons[j].contains_point(&samples[i]))
                .collect()
        })
        .collect();

    polygons
        .into_iter()
        .enumerate()
        .map(|(i, mut polygon)| {
            let depth = containers[i].len();
            let parent = containers[i]
                .iter()
                .copied()
                .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
            orient(&mut polygon, depth);
            ResultPath {
                polygon,
                path_id: i,
                depth,
                parent,
            }
        })
        .collect()
}
