//! Cross-tick selection bookkeeping for one or more controller rays.
//!
//! Every tick each ray keeps only its nearest hit. The union of those hits is the
//! set of intersected objects for the tick; comparing it with the previous tick's
//! set gives the objects that were entered and exited. Membership is per object,
//! so two controllers pointing at the same object produce one enter and one exit.

use std::fmt::Debug;

use super::{nearest_hit, Candidate, PickResult, Ray};

/// Receives selection transitions
pub trait SelectionSink<Id> {
    fn on_selection_enter(&mut self, id: &Id);
    fn on_selection_exit(&mut self, id: &Id);
}

/// A recorded selection transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent<Id> {
    Enter(Id),
    Exit(Id),
}

impl<Id: Clone> SelectionSink<Id> for Vec<SelectionEvent<Id>> {
    fn on_selection_enter(&mut self, id: &Id) {
        self.push(SelectionEvent::Enter(id.clone()));
    }

    fn on_selection_exit(&mut self, id: &Id) {
        self.push(SelectionEvent::Exit(id.clone()));
    }
}

/// What changed during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDelta<Id> {
    /// Nearest hit per ray, in ray order
    pub hits: Vec<Option<PickResult<Id>>>,
    /// Newly intersected objects, in order of the first ray that hit them
    pub entered: Vec<Id>,
    /// Objects no ray hits anymore, in the order they were intersected before
    pub exited: Vec<Id>,
}

impl<Id> SelectionDelta<Id> {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Tracks which objects are currently pointed at
#[derive(Debug, Clone)]
pub struct SelectionTracker<Id> {
    intersected: Vec<Id>,
}

impl<Id> Default for SelectionTracker<Id> {
    fn default() -> Self {
        Self {
            intersected: Vec::new(),
        }
    }
}

impl<Id: Clone + PartialEq + Debug> SelectionTracker<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects intersected as of the last tick
    pub fn current(&self) -> &[Id] {
        &self.intersected
    }

    pub fn is_intersected(&self, id: &Id) -> bool {
        self.intersected.contains(id)
    }

    /// Forget the current set without reporting exits
    pub fn clear(&mut self) {
        self.intersected.clear();
    }

    /// Cast every ray and diff the result against the previous tick
    pub fn update(&mut self, rays: &[Ray], candidates: &[Candidate<Id>]) -> SelectionDelta<Id> {
        let hits: Vec<Option<PickResult<Id>>> =
            rays.iter().map(|ray| nearest_hit(ray, candidates)).collect();

        let mut current: Vec<Id> = Vec::with_capacity(hits.len());
        for hit in hits.iter().flatten() {
            if !current.contains(&hit.id) {
                current.push(hit.id.clone());
            }
        }

        let entered = current
            .iter()
            .filter(|id| !self.intersected.contains(id))
            .cloned()
            .collect();
        let exited = self
            .intersected
            .iter()
            .filter(|id| !current.contains(id))
            .cloned()
            .collect();

        self.intersected = current;

        SelectionDelta {
            hits,
            entered,
            exited,
        }
    }

    /// [`update`](Self::update), then hand exits and enters to `sink`
    pub fn tick(
        &mut self,
        rays: &[Ray],
        candidates: &[Candidate<Id>],
        sink: &mut dyn SelectionSink<Id>,
    ) -> SelectionDelta<Id> {
        let delta = self.update(rays, candidates);

        for id in &delta.exited {
            log::debug!("Selection exit: {:?}", id);
            sink.on_selection_exit(id);
        }
        for id in &delta.entered {
            log::debug!("Selection enter: {:?}", id);
            sink.on_selection_enter(id);
        }

        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::picking::{Bounds, AABB};
    use cgmath::Vector3;

    /// Box centered on the -Z axis whose near face is `distance` away from the origin
    fn box_at(id: &'static str, x: f32, distance: f32) -> Candidate<&'static str> {
        Candidate::new(
            id,
            Bounds::Box(AABB::new(
                Vector3::new(x - 0.5, -0.5, -distance - 1.0),
                Vector3::new(x + 0.5, 0.5, -distance),
            )),
        )
    }

    fn ray_at(x: f32) -> Ray {
        Ray::new(Vector3::new(x, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0))
    }

    fn ray_missing() -> Ray {
        Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0))
    }

    #[test]
    fn test_enter_then_exit() {
        let candidates = vec![box_at("X", 0.0, 2.0), box_at("Y", 0.0, 5.0)];
        let mut tracker = SelectionTracker::new();
        let mut events: Vec<SelectionEvent<&str>> = Vec::new();

        // Ray A hits X at 2 and Y at 5, ray B hits nothing
        let delta = tracker.tick(&[ray_at(0.0), ray_missing()], &candidates, &mut events);
        assert_eq!(delta.entered, vec!["X"]);
        assert!(delta.exited.is_empty());
        assert_eq!(delta.hits[0].as_ref().map(|h| h.id), Some("X"));
        assert_eq!(delta.hits[0].as_ref().map(|h| h.distance), Some(2.0));
        assert!(delta.hits[1].is_none());
        assert!(tracker.is_intersected(&"X"));
        assert!(!tracker.is_intersected(&"Y"));

        // Ray A now misses everything
        let delta = tracker.tick(&[ray_missing(), ray_missing()], &candidates, &mut events);
        assert!(delta.entered.is_empty());
        assert_eq!(delta.exited, vec!["X"]);
        assert!(tracker.current().is_empty());

        assert_eq!(
            events,
            vec![SelectionEvent::Enter("X"), SelectionEvent::Exit("X")]
        );
    }

    #[test]
    fn test_two_rays_on_one_object_fire_once() {
        let candidates = vec![Candidate::new(
            "Z",
            Bounds::Box(AABB::new(Vector3::new(-3.0, -1.0, -4.0), Vector3::new(3.0, 1.0, -3.0))),
        )];
        let mut tracker = SelectionTracker::new();
        let mut events: Vec<SelectionEvent<&str>> = Vec::new();

        let delta = tracker.tick(&[ray_at(-1.0), ray_at(1.0)], &candidates, &mut events);
        assert_eq!(delta.entered, vec!["Z"]);
        assert_eq!(events, vec![SelectionEvent::Enter("Z")]);

        // One controller leaves; the object is still held by the other
        let delta = tracker.tick(&[ray_missing(), ray_at(1.0)], &candidates, &mut events);
        assert!(delta.is_empty());

        tracker.tick(&[ray_missing(), ray_missing()], &candidates, &mut events);
        assert_eq!(
            events,
            vec![SelectionEvent::Enter("Z"), SelectionEvent::Exit("Z")]
        );
    }

    #[test]
    fn test_steady_hit_fires_nothing() {
        let candidates = vec![box_at("X", 0.0, 2.0)];
        let mut tracker = SelectionTracker::new();

        assert_eq!(tracker.update(&[ray_at(0.0)], &candidates).entered, vec!["X"]);
        assert!(tracker.update(&[ray_at(0.0)], &candidates).is_empty());
    }

    #[test]
    fn test_switching_targets_exits_and_enters() {
        let candidates = vec![box_at("L", -2.0, 2.0), box_at("R", 2.0, 2.0)];
        let mut tracker = SelectionTracker::new();
        let mut events: Vec<SelectionEvent<&str>> = Vec::new();

        tracker.tick(&[ray_at(-2.0)], &candidates, &mut events);
        let delta = tracker.tick(&[ray_at(2.0)], &candidates, &mut events);
        assert_eq!(delta.entered, vec!["R"]);
        assert_eq!(delta.exited, vec!["L"]);
        // Exits are reported before enters
        assert_eq!(
            events,
            vec![
                SelectionEvent::Enter("L"),
                SelectionEvent::Exit("L"),
                SelectionEvent::Enter("R"),
            ]
        );
    }

    #[test]
    fn test_no_rays_or_no_candidates() {
        let mut tracker = SelectionTracker::<&str>::new();
        assert!(tracker.update(&[], &[]).is_empty());
        let delta = tracker.update(&[ray_at(0.0)], &[]);
        assert!(delta.is_empty());
        assert_eq!(delta.hits, vec![None]);
    }

    #[test]
    fn test_clear_is_silent() {
        let candidates = vec![box_at("X", 0.0, 2.0)];
        let mut tracker = SelectionTracker::new();
        tracker.update(&[ray_at(0.0)], &candidates);
        tracker.clear();
        let delta = tracker.update(&[ray_missing()], &candidates);
        assert!(delta.exited.is_empty());
    }
}
