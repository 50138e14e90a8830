//! Sweep events, the ordered event queue and the active sweep list.
//!
//! Every input edge becomes a pair of events addressed by index into a
//! shared arena. The queue hands them out left to right; the sweep list
//! keeps the edges crossing the current sweep position ordered bottom to
//! top.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tessel_kernel_math::{cross_2d, Point2, Tolerance};

/// Index of an event in the sweep arena.
pub type EventId = usize;

/// Which input set an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonType {
    /// First operand.
    Subject,
    /// Second operand.
    Clip,
}

/// Classification of an edge with respect to coincident edges of the
/// other input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeType {
    /// No coincident partner.
    #[default]
    Normal,
    /// The dropped member of a coincident pair.
    NonContributing,
    /// Kept member of a coincident pair whose polygons lie on the same side.
    SameTransition,
    /// Kept member of a coincident pair whose polygons lie on opposite sides.
    DifferentTransition,
}

/// One endpoint of an input edge.
#[derive(Debug, Clone)]
pub struct SweepEvent {
    /// Position of the endpoint.
    pub point: Point2,
    /// Left (first in sweep order) endpoint of its edge.
    pub left: bool,
    /// This endpoint is the start of the edge as written in the input ring.
    pub from: bool,
    /// Input set of the edge.
    pub polygon: PolygonType,
    /// Ring index within its input set.
    pub contour: usize,
    /// The other endpoint of the same edge.
    pub other: EventId,
    /// The edge is an inside→outside transition of its own polygon going
    /// upward, i.e. the region just above it is outside its polygon.
    pub in_out: bool,
    /// The edge lies outside the other polygon.
    pub other_in_out: bool,
    /// The edge belongs to the result.
    pub in_result: bool,
    /// The region just above the edge belongs to the result.
    pub enters_result: bool,
    /// Coincidence classification.
    pub edge_type: EdgeType,
    /// Geometrically identical edge from the other input, when one exists.
    pub duplicate: Option<EventId>,
    /// Nearest non-vertical result edge below this one when it was inserted.
    pub prev_in_result: Option<EventId>,
    /// Consumed by path reconstruction.
    pub processed: bool,
    /// Output path this event was assigned to.
    pub path_id: Option<usize>,
    /// Parent of that path.
    pub parent_path_id: Option<usize>,
    /// Nesting depth of that path.
    pub depth: usize,
    version: u32,
}

impl SweepEvent {
    /// New unpaired event; `other` is fixed up by the caller.
    pub fn new(point: Point2, left: bool, from: bool, polygon: PolygonType, contour: usize, other: EventId) -> Self {
        Self {
            point,
            left,
            from,
            polygon,
            contour,
            other,
            in_out: false,
            other_in_out: true,
            in_result: false,
            enters_result: false,
            edge_type: EdgeType::Normal,
            duplicate: None,
            prev_in_result: None,
            processed: false,
            path_id: None,
            parent_path_id: None,
            depth: 0,
            version: 0,
        }
    }

    /// The edge runs left to right in its input ring.
    pub fn left_to_right(&self) -> bool {
        self.left == self.from
    }

    /// Whether this is the subject polygon's edge.
    pub fn is_subject(&self) -> bool {
        self.polygon == PolygonType::Subject
    }
}

/// Endpoint of `id`'s partner.
pub(crate) fn other_point(events: &[SweepEvent], id: EventId) -> Point2 {
    events[events[id].other].point
}

/// The edge of `id` is vertical.
pub(crate) fn is_vertical(events: &[SweepEvent], id: EventId) -> bool {
    events[id].point.x == other_point(events, id).x
}

/// The edge of `id` passes strictly below `p`.
pub(crate) fn is_below(events: &[SweepEvent], id: EventId, p: &Point2) -> bool {
    let e = &events[id];
    let o = other_point(events, id);
    if e.left {
        cross_2d(&e.point, &o, p) > 0.0
    } else {
        cross_2d(&o, &e.point, p) > 0.0
    }
}

/// Snapshot of the fields that order an event in the queue.
#[derive(Debug, Clone, Copy)]
struct EventKey {
    id: EventId,
    point: Point2,
    other_point: Point2,
    left: bool,
    subject: bool,
}

impl EventKey {
    fn of(events: &[SweepEvent], id: EventId) -> Self {
        let e = &events[id];
        Self {
            id,
            point: e.point,
            other_point: other_point(events, id),
            left: e.left,
            subject: e.is_subject(),
        }
    }

    fn is_below(&self, p: &Point2) -> bool {
        let area = cross_2d(&self.point, &self.other_point, p);
        if self.left {
            area > 0.0
        } else {
            area < 0.0
        }
    }
}

/// Coordinate order in which `-0.0 == 0.0`.
fn cmp_coord(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn compare_keys(a: &EventKey, b: &EventKey) -> Ordering {
    match cmp_coord(a.point.x, b.point.x).then(cmp_coord(a.point.y, b.point.y)) {
        Ordering::Equal => {}
        ord => return ord,
    }
    // right endpoints are processed before left ones at a shared point
    if a.left != b.left {
        return if a.left { Ordering::Greater } else { Ordering::Less };
    }
    if cross_2d(&a.point, &a.other_point, &b.other_point) != 0.0 {
        return if a.is_below(&b.other_point) {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    match (a.subject, b.subject) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.id.cmp(&b.id),
    }
}

/// Total order of events in the sweep: by x, then y, then right before
/// left, then the lower edge first, then subject before clip.
pub fn compare_events(events: &[SweepEvent], a: EventId, b: EventId) -> Ordering {
    compare_keys(&EventKey::of(events, a), &EventKey::of(events, b))
}

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    key: EventKey,
    version: u32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap
        compare_keys(&other.key, &self.key).then(other.version.cmp(&self.version))
    }
}

/// Priority queue of pending events.
///
/// Events whose ordering fields change while queued (a partner replaced
/// by a split, a left/right swap) are pushed again with a bumped version;
/// the stale entries are discarded when popped.
#[derive(Debug, Default)]
pub struct OrderedSweepEventList {
    heap: BinaryHeap<QueueEntry>,
}

impl OrderedSweepEventList {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id` with its current ordering fields.
    pub fn push(&mut self, events: &[SweepEvent], id: EventId) {
        self.heap.push(QueueEntry {
            key: EventKey::of(events, id),
            version: events[id].version,
        });
    }

    /// Re-queue `id` after its ordering fields changed.
    pub fn update(&mut self, events: &mut [SweepEvent], id: EventId) {
        events[id].version += 1;
        self.push(events, id);
    }

    /// Next event in sweep order.
    pub fn pop(&mut self, events: &[SweepEvent]) -> Option<EventId> {
        while let Some(entry) = self.heap.pop() {
            if entry.version == events[entry.key.id].version {
                return Some(entry.key.id);
            }
        }
        None
    }

    /// Number of queued entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// No entries left.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Signed distance of `p` above the left-to-right line of edge `id`.
fn above_distance(events: &[SweepEvent], id: EventId, p: &Point2) -> f64 {
    let from = events[id].point;
    let to = other_point(events, id);
    cross_2d(&from, &to, p) / (to - from).norm()
}

/// Order of two left events in the sweep list: the edge lower at the
/// current sweep position comes first.
pub fn compare_segments(events: &[SweepEvent], a: EventId, b: EventId, tol: &Tolerance) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let ea = &events[a];
    let eb = &events[b];
    let a_other = other_point(events, a);
    let b_other = other_point(events, b);

    if !tol.collinear(&ea.point, &a_other, &eb.point) || !tol.collinear(&ea.point, &a_other, &b_other) {
        if ea.point == eb.point {
            return if is_below(events, a, &b_other) {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if ea.point.x == eb.point.x {
            return if ea.point.y < eb.point.y {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        // whichever edge entered the sweep later is placed relative to the other
        if compare_events(events, a, b) == Ordering::Greater {
            let mut d = above_distance(events, b, &ea.point);
            if d.abs() < tol.linear {
                d = above_distance(events, b, &a_other);
            }
            return if d > 0.0 { Ordering::Greater } else { Ordering::Less };
        }
        let mut d = above_distance(events, a, &eb.point);
        if d.abs() < tol.linear {
            d = above_distance(events, a, &b_other);
        }
        return if d > 0.0 { Ordering::Less } else { Ordering::Greater };
    }

    if ea.polygon != eb.polygon {
        return if ea.is_subject() {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    if ea.point == eb.point {
        if a_other == b_other {
            return a.cmp(&b);
        }
        return ea.contour.cmp(&eb.contour).then(a.cmp(&b));
    }
    compare_events(events, a, b)
}

/// Edges crossing the sweep position, bottom to top.
///
/// Backed by a sorted `Vec`: insertion is a binary search plus a shift and
/// [`Self::find`] is a linear scan, so both cost O(n) in the number of
/// active edges. The sweep is quadratic in the worst case, when most edges
/// are active at once.
#[derive(Debug, Default)]
pub struct SweepList {
    items: Vec<EventId>,
}

impl SweepList {
    /// Empty sweep list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the left event `id` at its ordered position and return it.
    pub fn insert(&mut self, events: &[SweepEvent], id: EventId, tol: &Tolerance) -> usize {
        let pos = self
            .items
            .partition_point(|&e| compare_segments(events, e, id, tol) == Ordering::Less);
        self.items.insert(pos, id);
        pos
    }

    /// Position of `id`, if present.
    pub fn find(&self, id: EventId) -> Option<usize> {
        self.items.iter().position(|&e| e == id)
    }

    /// Remove the entry at `pos`.
    pub fn remove(&mut self, pos: usize) -> EventId {
        self.items.remove(pos)
    }

    /// Event at `pos`.
    pub fn get(&self, pos: usize) -> Option<EventId> {
        self.items.get(pos).copied()
    }

    /// Edge directly above `pos`.
    pub fn next(&self, pos: usize) -> Option<EventId> {
        self.items.get(pos + 1).copied()
    }

    /// Edge directly below `pos`.
    pub fn previous(&self, pos: usize) -> Option<EventId> {
        pos.checked_sub(1).and_then(|p| self.items.get(p).copied())
    }

    /// Nearest edge below `pos` from the other input.
    pub fn previous_other(&self, events: &[SweepEvent], pos: usize) -> Option<EventId> {
        let polygon = events[self.items[pos]].polygon;
        self.items[..pos].iter().rev().copied().find(|&e| events[e].polygon != polygon)
    }

    /// Nearest edge below `pos` from the same input.
    pub fn previous_same(&self, events: &[SweepEvent], pos: usize) -> Option<EventId> {
        let polygon = events[self.items[pos]].polygon;
        self.items[..pos].iter().rev().copied().find(|&e| events[e].polygon == polygon)
    }

    /// Nearest non-vertical edge below `pos` that is part of the result.
    pub fn previous_in_result(&self, events: &[SweepEvent], pos: usize) -> Option<EventId> {
        self.items[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&e| events[e].in_result && !is_vertical(events, e))
    }

    /// Number of active edges.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// No active edges.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(events: &mut Vec<SweepEvent>, a: (f64, f64), b: (f64, f64), polygon: PolygonType) -> EventId {
        let l = events.len();
        events.push(SweepEvent::new(Point2::new(a.0, a.1), true, true, polygon, 0, l + 1));
        events.push(SweepEvent::new(Point2::new(b.0, b.1), false, false, polygon, 0, l));
        l
    }

    #[test]
    fn test_queue_orders_by_x_then_y() {
        let mut events = Vec::new();
        let a = edge(&mut events, (1.0, 0.0), (2.0, 0.0), PolygonType::Subject);
        let b = edge(&mut events, (0.0, 5.0), (3.0, 5.0), PolygonType::Subject);
        let c = edge(&mut events, (0.0, 1.0), (3.0, 1.0), PolygonType::Clip);
        let mut queue = OrderedSweepEventList::new();
        for id in 0..events.len() {
            queue.push(&events, id);
        }
        let order: Vec<_> = std::iter::from_fn(|| queue.pop(&events)).collect();
        assert_eq!(order[0], c);
        assert_eq!(order[1], b);
        assert_eq!(order[2], a);
        assert_eq!(order.len(), 6);
    }

    #[test]
    fn test_right_before_left_at_shared_point() {
        let mut events = Vec::new();
        let a = edge(&mut events, (0.0, 0.0), (1.0, 0.0), PolygonType::Subject);
        let b = edge(&mut events, (1.0, 0.0), (2.0, 1.0), PolygonType::Subject);
        assert_eq!(compare_events(&events, a + 1, b), Ordering::Less);
    }

    #[test]
    fn test_lower_edge_first_at_shared_left_point() {
        let mut events = Vec::new();
        let up = edge(&mut events, (0.0, 0.0), (1.0, 1.0), PolygonType::Subject);
        let down = edge(&mut events, (0.0, 0.0), (1.0, -1.0), PolygonType::Subject);
        assert_eq!(compare_events(&events, down, up), Ordering::Less);
    }

    #[test]
    fn test_stale_entries_are_skipped() {
        let mut events = Vec::new();
        let a = edge(&mut events, (0.0, 0.0), (1.0, 0.0), PolygonType::Subject);
        let mut queue = OrderedSweepEventList::new();
        queue.push(&events, a);
        events[a].point = Point2::new(5.0, 0.0);
        queue.update(&mut events, a);
        assert_eq!(queue.pop(&events), Some(a));
        assert_eq!(queue.pop(&events), None);
    }

    #[test]
    fn test_sweep_list_orders_bottom_to_top() {
        let tol = Tolerance::DEFAULT;
        let mut events = Vec::new();
        let low = edge(&mut events, (0.0, 0.0), (4.0, 0.0), PolygonType::Subject);
        let high = edge(&mut events, (0.0, 2.0), (4.0, 2.0), PolygonType::Subject);
        let mid = edge(&mut events, (1.0, 1.0), (3.0, 1.0), PolygonType::Clip);
        let mut list = SweepList::new();
        list.insert(&events, low, &tol);
        list.insert(&events, high, &tol);
        let pos = list.insert(&events, mid, &tol);
        assert_eq!(pos, 1);
        assert_eq!(list.previous(pos), Some(low));
        assert_eq!(list.next(pos), Some(high));
        assert_eq!(list.previous_other(&events, pos), Some(low));
        assert_eq!(list.previous_same(&events, 2), Some(low));
        assert_eq!(list.previous_in_result(&events, pos), None);
        events[low].in_result = true;
        assert_eq!(list.previous_in_result(&events, pos), Some(low));
    }

    #[test]
    fn test_left_to_right() {
        let e = SweepEvent::new(Point2::origin(), true, false, PolygonType::Clip, 0, 1);
        assert!(!e.left_to_right());
    }
}
