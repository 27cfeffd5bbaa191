// Copyright (c) 2026 rezky_nightky

use std::collections::BTreeMap;

use crossterm::style::Color;
use rand::rngs::StdRng;
use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;
use crate::entities::Entity;
use crate::frame::Frame;
use crate::geometry::Point;

/// Handle to an entity owned by a [`Scene`]. Stable for the lifetime of
/// the entity; slots are recycled after removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityId(usize);

/// Verdict an entity returns from its per-frame update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fate {
    Keep,
    Remove,
}

/// Capability contract for everything the scene simulates.
///
/// `update` runs against an immutable view of the scene with the entity
/// itself temporarily absent, so neighbor queries never observe the
/// entity mid-update and never alias its mutable borrow.
pub trait Drawable {
    fn draw(&self, scene: &Scene, frame: &mut Frame);
    fn update(&mut self, scene: &Scene, rng: &mut StdRng) -> Fate;
    fn pos(&self) -> Point;
    fn size(&self) -> Point;
    #[allow(dead_code)]
    fn transform(&mut self, dx: i32, dy: i32);
    /// Depth layer, fixed at construction. Used only for bucketing.
    fn layer(&self) -> i32;
}

/// Common drawable state embedded in every entity variant.
#[derive(Clone, Debug)]
pub struct Body {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub sprite: String,
    pub style: Option<Color>,
    pub invisible: bool,
    pub layer: i32,
}

impl Body {
    pub fn new(x: i32, y: i32, w: i32, h: i32, sprite: impl Into<String>, layer: i32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            sprite: sprite.into(),
            style: None,
            invisible: false,
            layer,
        }
    }

    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Point {
        Point::new(self.w, self.h)
    }

    pub fn transform(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Renders the multi-line sprite. Characters advance the column by
    /// their display width; zero-width marks ride along as a combining
    /// char on the next drawn cell; lines are truncated at the right
    /// edge of the surface.
    pub fn draw(&self, scene: &Scene, frame: &mut Frame) {
        if self.invisible {
            return;
        }
        let fg = self.style.or(scene.default_fg);
        for (i, line) in self.sprite.split('\n').enumerate() {
            let row = self.y + i as i32;
            if row < 0 || row >= scene.max_height {
                continue;
            }
            let mut col = self.x;
            let mut pending: Option<char> = None;
            for ch in line.chars() {
                let w = UnicodeWidthChar::width(ch).unwrap_or(0) as i32;
                if w == 0 {
                    pending = pending.or(Some(ch));
                    continue;
                }
                if col >= scene.max_width {
                    break;
                }
                let comb = pending.take();
                if col >= 0 {
                    frame.set(
                        col as u16,
                        row as u16,
                        Cell {
                            ch,
                            comb,
                            fg,
                            bg: scene.default_bg,
                        },
                    );
                }
                col += w;
            }
        }
    }
}

/// Owns every entity, bucketed by depth layer. Buckets keep insertion
/// order; layers draw in ascending numeric order.
pub struct Scene {
    pub max_width: i32,
    pub max_height: i32,
    pub default_fg: Option<Color>,
    pub default_bg: Option<Color>,
    slots: Vec<Option<Entity>>,
    free: Vec<usize>,
    layers: BTreeMap<i32, Vec<EntityId>>,
}

impl Scene {
    pub fn new(max_width: i32, max_height: i32) -> Self {
        Self {
            max_width,
            max_height,
            default_fg: Some(Color::White),
            default_bg: Some(Color::Black),
            slots: Vec::new(),
            free: Vec::new(),
            layers: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, entity: Entity) -> EntityId {
        let layer = entity.layer();
        let id = match self.free.pop() {
            Some(i) => {
                self.slots[i] = Some(entity);
                EntityId(i)
            }
            None => {
                self.slots.push(Some(entity));
                EntityId(self.slots.len() - 1)
            }
        };
        self.layers.entry(layer).or_default().push(id);
        id
    }

    /// Identity-based removal. Removing an id that is no longer present
    /// is a no-op.
    pub fn remove(&mut self, id: EntityId) {
        let Some(entity) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        self.unlink(id, entity.layer());
    }

    fn unlink(&mut self, id: EntityId, layer: i32) {
        if let Some(bucket) = self.layers.get_mut(&layer) {
            bucket.retain(|&other| other != id);
            if bucket.is_empty() {
                self.layers.remove(&layer);
            }
        }
        self.free.push(id.0);
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances every entity by one frame. The id list is snapshotted up
    /// front, so each entity updates at most once per pass even when
    /// updates add or remove entities.
    pub fn update_all(&mut self, rng: &mut StdRng) {
        let ids: Vec<EntityId> = self
            .layers
            .values()
            .flat_map(|bucket| bucket.iter().copied())
            .collect();

        for id in ids {
            let Some(mut entity) = self.slots.get_mut(id.0).and_then(Option::take) else {
                continue;
            };
            match entity.update(self, rng) {
                Fate::Keep => self.slots[id.0] = Some(entity),
                Fate::Remove => self.unlink(id, entity.layer()),
            }
        }
    }

    /// Draws layers in ascending order so higher layers occlude lower
    /// ones, insertion order within a layer.
    pub fn draw_all(&self, frame: &mut Frame) {
        for bucket in self.layers.values() {
            for &id in bucket {
                if let Some(entity) = self.get(id) {
                    entity.draw(self, frame);
                }
            }
        }
    }

    /// First entity matching the predicate. Iteration order across
    /// layers is an implementation detail; callers must not rely on
    /// which match wins when several qualify.
    #[allow(dead_code)]
    pub fn find_first(&self, pred: impl Fn(&Entity) -> bool) -> Option<&Entity> {
        self.layers
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter_map(|&id| self.get(id))
            .find(|entity| pred(entity))
    }

    #[allow(dead_code)]
    pub fn filter_all(&self, pred: impl Fn(&Entity) -> bool) -> Vec<&Entity> {
        self.layers
            .values()
            .flat_map(|bucket| bucket.iter())
            .filter_map(|&id| self.get(id))
            .filter(|entity| pred(entity))
            .collect()
    }

    /// Matching entities restricted to one layer, in bucket order.
    /// A layer with no entities yields an empty result.
    pub fn filter_by_layer(&self, layer: i32, pred: impl Fn(&Entity) -> bool) -> Vec<&Entity> {
        let Some(bucket) = self.layers.get(&layer) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter_map(|&id| self.get(id))
            .filter(|entity| pred(entity))
            .collect()
    }
}
