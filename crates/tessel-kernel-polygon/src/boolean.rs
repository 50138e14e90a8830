//! Planar Boolean operations on polygon sets by plane sweep.
//!
//! Each edge of the subject and clip sets is decomposed into a pair of
//! sweep events. Events are processed left to right; intersections
//! between neighbouring active edges split them in place so that, once
//! the sweep is done, no two edges cross. Each edge knows whether it lies
//! inside the other set, which decides its membership in the result.
//! The surviving edges are stitched into nested rings by
//! [`crate::path`].

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tessel_kernel_math::{Point2, Tolerance};
use tracing::{debug, trace};

use crate::error::{PolygonError, Result};
use crate::line::{line_intercept, SegmentIntersection};
use crate::path::{compute_paths, nest_rings, ResultPath};
use crate::polygon::Polygon;
use crate::simplify::simplify;
use crate::sweep::{
    compare_events, is_vertical, other_point, EdgeType, EventId, OrderedSweepEventList, PolygonType,
    SweepEvent, SweepList,
};

/// Type of Boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    /// Union: everything covered by either set.
    Union,
    /// Intersection: only what both sets cover.
    Intersection,
    /// Difference: the subject with the clip removed.
    Difference,
    /// Exclusive or: covered by exactly one set.
    Xor,
}

/// Tuning for the Boolean engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BooleanSettings {
    /// Distance below which points coincide and edges are collinear.
    pub tolerance: f64,
    /// Run [`simplify`] over both inputs before sweeping.
    pub simplify_inputs: bool,
}

impl Default for BooleanSettings {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT.linear,
            simplify_inputs: false,
        }
    }
}

impl BooleanSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(PolygonError::InvalidSettings("tolerance must be positive".into()));
        }
        Ok(())
    }
}

/// How the intersection check between two neighbours turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Nothing to do.
    Disjoint,
    /// A crossing or partial overlap was split; fields stay valid.
    Split,
    /// The edges share their left endpoint and overlap; both neighbours
    /// must recompute their fields.
    GoBack,
}

/// State of one Boolean operation.
struct Sweep {
    op: BooleanOp,
    tol: Tolerance,
    events: Vec<SweepEvent>,
    queue: OrderedSweepEventList,
    list: SweepList,
}

impl Sweep {
    fn new(op: BooleanOp, tol: Tolerance) -> Self {
        Self {
            op,
            tol,
            events: Vec::new(),
            queue: OrderedSweepEventList::new(),
            list: SweepList::new(),
        }
    }

    /// Create the event pairs of one input set.
    fn add_polygons(&mut self, polygons: &[Polygon], polygon: PolygonType) {
        for (contour, ring) in polygons.iter().enumerate() {
            let ring = ring.without_duplicate_points(&self.tol);
            if ring.len() < 3 || self.tol.is_zero(ring.area()) {
                trace!(contour, "skipping degenerate input ring");
                continue;
            }
            for (a, b) in ring.edges() {
                if self.tol.points_equal_2d(&a, &b) {
                    continue;
                }
                let id = self.events.len();
                let mut start = SweepEvent::new(a, false, true, polygon, contour, id + 1);
                let mut end = SweepEvent::new(b, false, false, polygon, contour, id);
                if crate::line::lex_less(&a, &b) {
                    start.left = true;
                } else {
                    end.left = true;
                }
                self.events.push(start);
                self.events.push(end);
                self.queue.push(&self.events, id);
                self.queue.push(&self.events, id + 1);
            }
        }
    }

    fn run(&mut self) -> Result<Vec<EventId>> {
        let mut sorted = Vec::with_capacity(self.events.len());
        while let Some(id) = self.queue.pop(&self.events) {
            sorted.push(id);
            if self.events[id].left {
                self.process_left(id);
            } else {
                self.process_right(id)?;
            }
        }
        debug!(op = ?self.op, events = self.events.len(), "sweep finished");
        Ok(sorted)
    }

    fn process_left(&mut self, id: EventId) {
        let pos = self.list.insert(&self.events, id, &self.tol);
        self.set_information(pos);

        if let Some(next) = self.list.next(pos) {
            if self.check_and_resolve_intersection(id, next) == Resolution::GoBack {
                self.set_information(pos);
                self.set_information(pos + 1);
            }
        }
        if let Some(prev) = self.list.previous(pos) {
            if self.check_and_resolve_intersection(prev, id) == Resolution::GoBack {
                self.set_information(pos - 1);
                self.set_information(pos);
            }
        }
    }

    fn process_right(&mut self, id: EventId) -> Result<()> {
        let left = self.events[id].other;
        let pos = self
            .list
            .find(left)
            .ok_or(PolygonError::SweepLineCorrupted {
                op: self.op,
                point: self.events[id].point,
            })?;
        let prev = self.list.previous(pos);
        let next = self.list.next(pos);
        self.list.remove(pos);
        if let (Some(prev), Some(next)) = (prev, next) {
            self.check_and_resolve_intersection(prev, next);
        }
        Ok(())
    }

    /// Derive the transition flags of the edge at `pos` from the edge
    /// directly below it, then decide its membership in the result.
    fn set_information(&mut self, pos: usize) {
        let Some(id) = self.list.get(pos) else {
            return;
        };
        let below = self.list.previous(pos);
        let (in_out, other_in_out) = match below {
            None => (false, true),
            Some(prev) => {
                let p = &self.events[prev];
                if p.polygon == self.events[id].polygon {
                    (!p.in_out, p.other_in_out)
                } else if is_vertical(&self.events, prev) {
                    (!p.other_in_out, !p.in_out)
                } else {
                    (!p.other_in_out, p.in_out)
                }
            }
        };
        let prev_in_result = self.list.previous_in_result(&self.events, pos);

        let e = &mut self.events[id];
        e.in_out = in_out;
        e.other_in_out = other_in_out;
        e.prev_in_result = prev_in_result;
        e.in_result = membership(self.op, e);
        e.enters_result = e.in_result && result_above(self.op, e);
    }

    /// Split neighbouring edges `a` (below) and `b` (above) where they
    /// meet so that no two active edges cross.
    fn check_and_resolve_intersection(&mut self, a: EventId, b: EventId) -> Resolution {
        let a_end = other_point(&self.events, a);
        let b_end = other_point(&self.events, b);
        let (a_start, b_start) = (self.events[a].point, self.events[b].point);
        let tol = self.tol;

        match line_intercept(&a_start, &a_end, &b_start, &b_end, &tol) {
            SegmentIntersection::None => Resolution::Disjoint,
            SegmentIntersection::Point(p) => {
                if (tol.points_equal_2d(&a_start, &b_start)) || (tol.points_equal_2d(&a_end, &b_end)) {
                    return Resolution::Disjoint;
                }
                let mut split = false;
                if !tol.points_equal_2d(&a_start, &p) && !tol.points_equal_2d(&a_end, &p) {
                    self.divide_segment(a, p);
                    split = true;
                }
                if !tol.points_equal_2d(&b_start, &p) && !tol.points_equal_2d(&b_end, &p) {
                    self.divide_segment(b, p);
                    split = true;
                }
                if split {
                    trace!(x = p.x, y = p.y, "split crossing edges");
                    Resolution::Split
                } else {
                    Resolution::Disjoint
                }
            }
            SegmentIntersection::Overlap(..) => self.resolve_overlap(a, b),
        }
    }

    /// Segment two collinear overlapping edges into shared prefix, overlap
    /// and remainder pieces.
    ///
    /// Once the shared piece starts at a common left end, edges from
    /// different inputs become one transition edge plus a non-contributing
    /// copy. Edges from the same input cancel under even-odd parity, so
    /// both stop contributing.
    fn resolve_overlap(&mut self, a: EventId, b: EventId) -> Resolution {
        let tol = self.tol;
        let (a_right, b_right) = (self.events[a].other, self.events[b].other);
        let left_coincide = tol.points_equal_2d(&self.events[a].point, &self.events[b].point);
        let right_coincide = tol.points_equal_2d(&self.events[a_right].point, &self.events[b_right].point);

        let mut order: Vec<EventId> = Vec::with_capacity(4);
        if !left_coincide {
            if compare_events(&self.events, a, b) == Ordering::Greater {
                order.extend([b, a]);
            } else {
                order.extend([a, b]);
            }
        }
        if !right_coincide {
            if compare_events(&self.events, a_right, b_right) == Ordering::Greater {
                order.extend([b_right, a_right]);
            } else {
                order.extend([a_right, b_right]);
            }
        }

        if left_coincide {
            let same = self.events[a].in_out == self.events[b].in_out;
            self.events[b].edge_type = EdgeType::NonContributing;
            self.events[a].edge_type = if self.events[a].polygon == self.events[b].polygon {
                EdgeType::NonContributing
            } else if same {
                EdgeType::SameTransition
            } else {
                EdgeType::DifferentTransition
            };
            self.events[a].duplicate = Some(b);
            self.events[b].duplicate = Some(a);
            if !right_coincide {
                // order holds the two right events; trim the longer edge
                let longer = self.events[order[1]].other;
                let at = self.events[order[0]].point;
                self.divide_segment(longer, at);
            }
            trace!(a, b, same, "coincident edges share their left end");
            return Resolution::GoBack;
        }

        if right_coincide {
            let at = self.events[order[1]].point;
            self.divide_segment(order[0], at);
            return Resolution::Split;
        }

        if order[0] != self.events[order[3]].other {
            // partial overlap: neither edge contains the other
            let (first_at, second_at) = (self.events[order[1]].point, self.events[order[2]].point);
            self.divide_segment(order[0], first_at);
            self.divide_segment(order[1], second_at);
        } else {
            // one edge contains the other
            let first_at = self.events[order[1]].point;
            self.divide_segment(order[0], first_at);
            let remainder = self.events[order[3]].other;
            let second_at = self.events[order[2]].point;
            self.divide_segment(remainder, second_at);
        }
        Resolution::Split
    }

    /// Split the edge whose left event is `left` at `p`, creating a new
    /// right event for the lower piece and a new left event for the upper.
    fn divide_segment(&mut self, left: EventId, p: Point2) {
        let right = self.events[left].other;
        let (from_left, polygon, contour) = {
            let e = &self.events[left];
            (e.from, e.polygon, e.contour)
        };
        let from_right = self.events[right].from;

        let r = self.events.len();
        let l = r + 1;
        self.events.push(SweepEvent::new(p, false, from_right, polygon, contour, left));
        self.events.push(SweepEvent::new(p, true, from_left, polygon, contour, right));
        self.events[left].other = r;
        self.events[right].other = l;

        // rounding can put the new left event after its own right partner
        if compare_events(&self.events, l, right) == Ordering::Greater {
            self.events[right].left = true;
            self.events[l].left = false;
        }

        self.queue.update(&mut self.events, right);
        self.queue.push(&self.events, l);
        self.queue.push(&self.events, r);
    }

    /// Result events in sweep order, with the pairing and even-count
    /// invariants checked.
    fn collect_result(&self, sorted: &[EventId]) -> Result<Vec<EventId>> {
        let mut result: Vec<EventId> = sorted
            .iter()
            .copied()
            .filter(|&id| {
                let e = &self.events[id];
                let in_result = if e.left {
                    e.in_result
                } else {
                    self.events[e.other].in_result
                };
                in_result && !self.tol.points_equal_2d(&e.point, &other_point(&self.events, id))
            })
            .collect();
        // overlap splits can leave the order locally unsorted
        result.sort_by(|&a, &b| compare_events(&self.events, a, b));

        let members: std::collections::HashSet<EventId> = result.iter().copied().collect();
        for &id in &result {
            if !members.contains(&self.events[id].other) {
                return Err(PolygonError::UnpairedResultEvent {
                    op: self.op,
                    point: self.events[id].point,
                });
            }
        }

        let mut counts: HashMap<(u64, u64), (Point2, usize)> = HashMap::new();
        for &id in &result {
            let p = self.events[id].point;
            let key = ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits());
            counts.entry(key).or_insert((p, 0)).1 += 1;
        }
        let mut odd: Vec<(Point2, usize)> = counts.into_values().filter(|(_, c)| c % 2 == 1).collect();
        odd.sort_by(|a, b| a.0.x.total_cmp(&b.0.x).then(a.0.y.total_cmp(&b.0.y)));
        if let Some(&(point, count)) = odd.first() {
            return Err(PolygonError::OddPointCount {
                op: self.op,
                point,
                count,
            });
        }
        Ok(result)
    }
}

/// Whether an edge belongs to the result of `op`.
fn membership(op: BooleanOp, e: &SweepEvent) -> bool {
    match e.edge_type {
        EdgeType::Normal => match op {
            BooleanOp::Union => e.other_in_out,
            BooleanOp::Intersection => !e.other_in_out,
            BooleanOp::Difference => e.is_subject() == e.other_in_out,
            BooleanOp::Xor => true,
        },
        EdgeType::SameTransition => matches!(op, BooleanOp::Union | BooleanOp::Intersection),
        EdgeType::DifferentTransition => op == BooleanOp::Difference,
        EdgeType::NonContributing => false,
    }
}

/// Whether the region just above a result edge is part of the result.
fn result_above(op: BooleanOp, e: &SweepEvent) -> bool {
    let this_in = !e.in_out;
    let that_in = !e.other_in_out;
    match op {
        BooleanOp::Union => this_in || that_in,
        BooleanOp::Intersection => this_in && that_in,
        BooleanOp::Xor => this_in != that_in,
        BooleanOp::Difference => {
            if e.is_subject() {
                this_in && !that_in
            } else {
                that_in && !this_in
            }
        }
    }
}

/// Combine `subject` and `clip` with `op`.
///
/// Rings are implicitly closed and may be wound either way. Rings with
/// fewer than three distinct points are discarded. The result rings are
/// simple, counter-clockwise at even depth and clockwise at odd depth,
/// each tagged with its path id, depth and enclosing path.
pub fn boolean_operation(
    subject: &[Polygon],
    clip: &[Polygon],
    op: BooleanOp,
    settings: &BooleanSettings,
) -> Result<Vec<ResultPath>> {
    settings.validate()?;
    let tol = Tolerance::linear(settings.tolerance);
    let (subject, clip) = if settings.simplify_inputs {
        (simplify(subject, &tol), simplify(clip, &tol))
    } else {
        (subject.to_vec(), clip.to_vec())
    };

    if op == BooleanOp::Union && clip.iter().all(|p| p.len() < 3) {
        let kept: Vec<Polygon> = simplify(&subject, &tol)
            .into_iter()
            .filter(|p| p.len() >= 3 && !tol.is_zero(p.area()))
            .collect();
        return Ok(nest_rings(kept));
    }

    let mut sweep = Sweep::new(op, tol);
    sweep.add_polygons(&subject, PolygonType::Subject);
    sweep.add_polygons(&clip, PolygonType::Clip);
    debug!(?op, edges = sweep.events.len() / 2, "boolean sweep started");

    let sorted = sweep.run()?;
    let result = sweep.collect_result(&sorted)?;
    let paths = compute_paths(&mut sweep.events, &result, op, &tol)?;
    debug!(?op, paths = paths.len(), "boolean paths reconstructed");
    Ok(paths)
}

/// Run [`boolean_operation`] and keep only the rings.
pub fn boolean(subject: &[Polygon], clip: &[Polygon], op: BooleanOp) -> Result<Vec<Polygon>> {
    boolean_operation(subject, clip, op, &BooleanSettings::default())
        .map(|paths| paths.into_iter().map(|p| p.polygon).collect())
}

/// Everything covered by either set.
pub fn union(subject: &[Polygon], clip: &[Polygon]) -> Result<Vec<Polygon>> {
    boolean(subject, clip, BooleanOp::Union)
}

/// What both sets cover.
pub fn intersection(subject: &[Polygon], clip: &[Polygon]) -> Result<Vec<Polygon>> {
    boolean(subject, clip, BooleanOp::Intersection)
}

/// The subject with the clip removed.
pub fn difference(subject: &[Polygon], clip: &[Polygon]) -> Result<Vec<Polygon>> {
    boolean(subject, clip, BooleanOp::Difference)
}

/// Covered by exactly one of the sets.
pub fn xor(subject: &[Polygon], clip: &[Polygon]) -> Result<Vec<Polygon>> {
    boolean(subject, clip, BooleanOp::Xor)
}

/// Run independent Boolean operations in parallel.
pub fn boolean_batch(
    jobs: &[(Vec<Polygon>, Vec<Polygon>, BooleanOp)],
    settings: &BooleanSettings,
) -> Vec<Result<Vec<ResultPath>>> {
    jobs.par_iter()
        .map(|(subject, clip, op)| boolean_operation(subject, clip, *op, settings))
        .collect()
}
