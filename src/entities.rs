// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use rand::{rngs::StdRng, Rng};

use crate::frame::Frame;
use crate::geometry::Point;
use crate::scene::{Body, Drawable, Fate, Scene};

pub const FAR_FLAKE_LAYER: i32 = -1;
pub const WIND_LAYER: i32 = 0;
pub const FLAKE_LAYER: i32 = 1;

const BASE_HP: i32 = 50;
const GROUND_DIM_STEP: i32 = 5;
const MIN_BRIGHTNESS: i32 = 25;

fn gray(level: i32) -> Color {
    let v = level.clamp(0, 255) as u8;
    Color::Rgb { r: v, g: v, b: v }
}

/// Signed speed of the first wind zone covering `(x, y)`, if any.
///
/// A zone at column `wx` with width `w` covers the half-open span
/// `wx - w < x <= wx` on its exact row.
fn first_wind_speed(scene: &Scene, x: i32, y: i32) -> Option<i32> {
    let winds = scene.filter_by_layer(WIND_LAYER, |e| {
        if e.as_wind().is_none() {
            return false;
        }
        let p = e.pos();
        let s = e.size();
        p.y == y && x <= p.x && x > p.x - s.x
    });
    winds.first().and_then(|e| e.as_wind()).map(Wind::speed)
}

/// Every simulated entity, tagged by kind so queries can branch on the
/// variant instead of downcasting.
#[derive(Clone, Debug)]
pub enum Entity {
    Flake(Flake),
    FarFlake(FarFlake),
    Wind(Wind),
}

impl Entity {
    pub fn body(&self) -> &Body {
        match self {
            Entity::Flake(f) => &f.body,
            Entity::FarFlake(f) => &f.body,
            Entity::Wind(w) => &w.body,
        }
    }

    fn body_mut(&mut self) -> &mut Body {
        match self {
            Entity::Flake(f) => &mut f.body,
            Entity::FarFlake(f) => &mut f.body,
            Entity::Wind(w) => &mut w.body,
        }
    }

    pub fn is_flake(&self) -> bool {
        matches!(self, Entity::Flake(_))
    }

    #[allow(dead_code)]
    pub fn is_far_flake(&self) -> bool {
        matches!(self, Entity::FarFlake(_))
    }

    pub fn as_wind(&self) -> Option<&Wind> {
        match self {
            Entity::Wind(w) => Some(w),
            _ => None,
        }
    }
}

impl Drawable for Entity {
    fn draw(&self, scene: &Scene, frame: &mut Frame) {
        self.body().draw(scene, frame);
    }

    fn update(&mut self, scene: &Scene, rng: &mut StdRng) -> Fate {
        match self {
            Entity::Flake(f) => f.update(scene, rng),
            Entity::FarFlake(f) => f.update(scene, rng),
            Entity::Wind(w) => w.update(scene, rng),
        }
    }

    fn pos(&self) -> Point {
        self.body().pos()
    }

    fn size(&self) -> Point {
        self.body().size()
    }

    fn transform(&mut self, dx: i32, dy: i32) {
        self.body_mut().transform(dx, dy);
    }

    fn layer(&self) -> i32 {
        self.body().layer
    }
}

/// Foreground particle. Falls, stacks on other flakes, and melts away
/// after resting on the ground for its hit-point budget.
#[derive(Clone, Debug)]
pub struct Flake {
    pub(crate) body: Body,
    pub(crate) speed: i32,
    pub(crate) hp: i32,
    pub(crate) brightness: i32,
    /// Sideways drift direction, flipped on every unblown fall.
    /// Carried but not yet applied to the column.
    pub(crate) swing: i32,
}

impl Flake {
    pub fn spawn(x: i32, ch: char, rng: &mut StdRng) -> Entity {
        let y = rng.random_range(0..2);
        let brightness = 255 - rng.random_range(0..100);
        let mut body = Body::new(x, y, 1, 1, ch.to_string(), FLAKE_LAYER);
        body.style = Some(gray(brightness));
        let swing = if rng.random_bool(0.5) { 1 } else { -1 };
        Entity::Flake(Self {
            body,
            speed: 1,
            hp: BASE_HP + rng.random_range(0..25),
            brightness,
            swing,
        })
    }

    #[allow(dead_code)]
    pub fn hp(&self) -> i32 {
        self.hp
    }
}

impl Drawable for Flake {
    fn draw(&self, scene: &Scene, frame: &mut Frame) {
        self.body.draw(scene, frame);
    }

    fn update(&mut self, scene: &Scene, _rng: &mut StdRng) -> Fate {
        if self.hp <= 0 {
            return Fate::Remove;
        }

        let ground = scene.max_height - 1;
        let col = self.body.x;
        let mut next = self.body.y + self.speed;

        // Stack: refuse to land on another flake in the same column,
        // sliding up until the cell above it is free.
        while next > self.body.y {
            let target = Point::new(col, next);
            let occupied = !scene
                .filter_by_layer(FLAKE_LAYER, |e| e.is_flake() && e.pos() == target)
                .is_empty();
            if !occupied {
                break;
            }
            next -= 1;
        }

        let old_y = self.body.y;
        self.body.y = next.min(ground);

        let mut blown = false;
        if let Some(speed) = first_wind_speed(scene, self.body.x, self.body.y) {
            // No clamping: a gust may carry a flake off either edge.
            self.body.x += speed;
            blown = true;
        }

        if self.body.y == ground {
            self.hp -= 1;
            self.brightness = (self.brightness - GROUND_DIM_STEP).max(MIN_BRIGHTNESS);
            self.body.style = Some(gray(self.brightness));
        }

        if old_y != self.body.y && !blown {
            self.swing = -self.swing;
        }

        Fate::Keep
    }

    fn pos(&self) -> Point {
        self.body.pos()
    }

    fn size(&self) -> Point {
        self.body.size()
    }

    fn transform(&mut self, dx: i32, dy: i32) {
        self.body.transform(dx, dy);
    }

    fn layer(&self) -> i32 {
        self.body.layer
    }
}

/// Background parallax particle. Shimmers instead of melting and sinks
/// at its own pace; recycled once it drifts below the field.
#[derive(Clone, Debug)]
pub struct FarFlake {
    pub(crate) body: Body,
    pub(crate) speed: i32,
    pub(crate) brightness: i32,
}

impl FarFlake {
    pub fn spawn(x: i32, ch: char, rng: &mut StdRng) -> Entity {
        let brightness = rng.random_range(1..=30);
        let speed = rng.random_range(1..=2);
        let mut body = Body::new(x, 0, 1, 1, ch.to_string(), FAR_FLAKE_LAYER);
        body.style = Some(gray(brightness));
        Entity::FarFlake(Self {
            body,
            speed,
            brightness,
        })
    }
}

impl Drawable for FarFlake {
    fn draw(&self, scene: &Scene, frame: &mut Frame) {
        self.body.draw(scene, frame);
    }

    fn update(&mut self, scene: &Scene, rng: &mut StdRng) -> Fate {
        self.brightness = (self.brightness + rng.random_range(-10..=10)).clamp(0, 255);
        self.body.style = Some(gray(self.brightness));

        if let Some(speed) = first_wind_speed(scene, self.body.x, self.body.y) {
            self.body.x += speed;
        }

        self.body.y += self.speed;
        if self.body.y > scene.max_height - 1 {
            return Fate::Remove;
        }
        Fate::Keep
    }

    fn pos(&self) -> Point {
        self.body.pos()
    }

    fn size(&self) -> Point {
        self.body.size()
    }

    fn transform(&mut self, dx: i32, dy: i32) {
        self.body.transform(dx, dy);
    }

    fn layer(&self) -> i32 {
        self.body.layer
    }
}

/// Invisible horizontal force zone. Slides across the field at constant
/// signed speed and expires once no part of it remains inside.
#[derive(Clone, Debug)]
pub struct Wind {
    pub(crate) body: Body,
    pub(crate) speed: i32,
}

impl Wind {
    pub fn spawn(max_height: i32, rng: &mut StdRng) -> Entity {
        let band = (max_height - 10).max(1);
        let y = rng.random_range(0..band);
        let w = rng.random_range(1..=20);
        // Positive only for now; a negative speed would enter from the
        // right edge instead.
        let speed = rng.random_range(3..=12);
        let mut body = Body::new(0, y, w, 1, "", WIND_LAYER);
        body.invisible = true;
        Entity::Wind(Self { body, speed })
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }
}

impl Drawable for Wind {
    fn draw(&self, scene: &Scene, frame: &mut Frame) {
        self.body.draw(scene, frame);
    }

    fn update(&mut self, scene: &Scene, _rng: &mut StdRng) -> Fate {
        self.body.x += self.speed;

        let gone = if self.speed >= 0 {
            self.body.x - self.body.w + 1 >= scene.max_width
        } else {
            self.body.x < 0
        };
        if gone {
            return Fate::Remove;
        }
        Fate::Keep
    }

    fn pos(&self) -> Point {
        self.body.pos()
    }

    fn size(&self) -> Point {
        self.body.size()
    }

    fn transform(&mut self, dx: i32, dy: i32) {
        self.body.transform(dx, dy);
    }

    fn layer(&self) -> i32 {
        self.body.layer
    }
}

/// Seeds one line of input text: every character becomes a flake at a
/// fresh column plus a far-flake offset slightly to the side.
pub fn seed_line(scene: &mut Scene, rng: &mut StdRng, line: &str) {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return;
    }

    let mut x = rng.random_range(0..5);
    for (ix, &ch) in chars.iter().enumerate() {
        let gap = if ix == 0 {
            rng.random_range(0..2)
        } else {
            let span = (scene.max_width / chars.len() as i32).max(1);
            rng.random_range(1..=span)
        };
        x += gap;

        scene.add(Flake::spawn(x, ch, rng));

        let mut offset = rng.random_range(1..=4);
        if rng.random_bool(0.5) {
            offset = -offset;
        }
        scene.add(FarFlake::spawn(x + offset, ch, rng));
    }
}

/// One wind zone per playfield row.
pub fn gust(scene: &mut Scene, rng: &mut StdRng) {
    for _ in 0..scene.max_height {
        scene.add(Wind::spawn(scene.max_height, rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    fn flake(x: i32, y: i32, hp: i32) -> Flake {
        Flake {
            body: Body::new(x, y, 1, 1, "*", FLAKE_LAYER),
            speed: 1,
            hp,
            brightness: 200,
            swing: 1,
        }
    }

    fn wind(x: i32, y: i32, w: i32, speed: i32) -> Entity {
        let mut body = Body::new(x, y, w, 1, "", WIND_LAYER);
        body.invisible = true;
        Entity::Wind(Wind { body, speed })
    }

    #[test]
    fn wind_span_is_half_open() {
        let mut scene = Scene::new(40, 12);
        scene.add(wind(10, 2, 3, 4));

        for tx in [8, 9, 10] {
            assert_eq!(first_wind_speed(&scene, tx, 2), Some(4), "tx={}", tx);
        }
        assert_eq!(first_wind_speed(&scene, 7, 2), None);
        assert_eq!(first_wind_speed(&scene, 11, 2), None);
        // wrong row never matches
        assert_eq!(first_wind_speed(&scene, 9, 3), None);
    }

    #[test]
    fn falling_flake_stops_above_an_occupied_cell() {
        let mut scene = Scene::new(20, 10);
        scene.add(Entity::Flake(flake(5, 5, 10)));

        let mut f = flake(5, 4, 10);
        let fate = f.update(&scene, &mut rng());
        assert_eq!(fate, Fate::Keep);
        // candidate row 5 is taken, so it holds at 4
        assert_eq!(f.body.y, 4);
    }

    #[test]
    fn flake_never_falls_below_the_ground_row() {
        let scene = Scene::new(20, 10);
        let mut f = flake(3, 8, 10);
        let mut r = rng();

        for _ in 0..5 {
            f.update(&scene, &mut r);
            assert!(f.body.y <= 9);
        }
        assert_eq!(f.body.y, 9);
    }

    #[test]
    fn grounded_flake_loses_hp_and_dims() {
        let scene = Scene::new(20, 10);
        let mut f = flake(3, 9, 10);
        let before = f.brightness;

        f.update(&scene, &mut rng());
        assert_eq!(f.hp, 9);
        assert_eq!(f.brightness, before - 5);

        // brightness floors rather than going black
        f.brightness = 26;
        f.update(&scene, &mut rng());
        f.update(&scene, &mut rng());
        assert_eq!(f.brightness, 25);
    }

    #[test]
    fn exhausted_flake_leaves_the_scene_and_reupdates_are_harmless() {
        let mut scene = Scene::new(20, 10);
        let id = scene.add(Entity::Flake(flake(3, 9, 1)));
        let mut r = rng();

        // first pass burns the last hit point on the ground
        scene.update_all(&mut r);
        assert_eq!(scene.filter_all(|e| e.is_flake()).len(), 1);

        // second pass observes hp == 0 and removes it
        scene.update_all(&mut r);
        assert!(scene.filter_all(|e| e.is_flake()).is_empty());
        assert!(scene.get(id).is_none());

        // further passes and redundant removals are no-ops
        scene.update_all(&mut r);
        scene.remove(id);
    }

    #[test]
    fn wind_displaces_flakes_on_its_row_without_clamping() {
        let mut scene = Scene::new(20, 10);
        // zone covering columns 16..=18 on the ground row
        scene.add(wind(18, 9, 3, 7));

        let mut f = flake(17, 8, 10);
        f.update(&scene, &mut rng());
        assert_eq!(f.body.y, 9);
        // blown past the right edge; nothing clamps the column
        assert_eq!(f.body.x, 24);
    }

    #[test]
    fn far_flake_rides_wind_and_keeps_sinking() {
        let mut scene = Scene::new(20, 10);
        scene.add(wind(5, 2, 4, 3));

        let mut ff = FarFlake {
            body: Body::new(4, 2, 1, 1, "*", FAR_FLAKE_LAYER),
            speed: 1,
            brightness: 15,
        };
        let fate = ff.update(&scene, &mut rng());
        assert_eq!(fate, Fate::Keep);
        assert_eq!(ff.body.x, 7);
        assert_eq!(ff.body.y, 3);
        assert!((0..=255).contains(&ff.brightness));
    }

    #[test]
    fn far_flake_below_the_field_is_recycled() {
        let scene = Scene::new(20, 10);
        let mut ff = FarFlake {
            body: Body::new(4, 9, 1, 1, "*", FAR_FLAKE_LAYER),
            speed: 2,
            brightness: 15,
        };
        assert_eq!(ff.update(&scene, &mut rng()), Fate::Remove);
    }

    #[test]
    fn wind_moves_by_signed_speed_and_expires_off_field() {
        let scene = Scene::new(20, 10);
        let mut body = Body::new(0, 3, 4, 1, "", WIND_LAYER);
        body.invisible = true;
        let mut w = Wind { body, speed: 6 };

        assert_eq!(w.update(&scene, &mut rng()), Fate::Keep);
        assert_eq!(w.body.x, 6);
        assert_eq!(w.update(&scene, &mut rng()), Fate::Keep);
        assert_eq!(w.body.x, 12);
        assert_eq!(w.update(&scene, &mut rng()), Fate::Keep);
        // trailing edge clears column 19 on this step
        assert_eq!(w.update(&scene, &mut rng()), Fate::Remove);
    }

    #[test]
    fn gust_spawns_one_zone_per_row_inside_the_field() {
        let mut scene = Scene::new(40, 14);
        gust(&mut scene, &mut rng());

        let zones = scene.filter_by_layer(WIND_LAYER, |_| true);
        assert_eq!(zones.len(), 14);
        for z in zones {
            assert_eq!(z.pos().x, 0);
            assert!((0..14).contains(&z.pos().y));
            let w = z.as_wind().unwrap();
            assert!((1..=20).contains(&z.size().x));
            assert!((3..=12).contains(&w.speed()));
        }
    }

    #[test]
    fn seeding_hi_spawns_a_flake_and_far_flake_per_char() {
        let mut scene = Scene::new(40, 12);
        let mut r = rng();
        seed_line(&mut scene, &mut r, "hi");

        let flakes = scene.filter_by_layer(FLAKE_LAYER, |e| e.is_flake());
        let far = scene.filter_by_layer(FAR_FLAKE_LAYER, |e| e.is_far_flake());
        assert_eq!(flakes.len(), 2);
        assert_eq!(far.len(), 2);

        assert_ne!(flakes[0].pos().x, flakes[1].pos().x);
        for f in flakes {
            if let Entity::Flake(f) = f {
                assert!(f.hp() > 0);
            }
        }
    }

    #[test]
    fn seeding_an_empty_line_spawns_nothing() {
        let mut scene = Scene::new(40, 12);
        seed_line(&mut scene, &mut rng(), "");
        assert!(scene.is_empty());
    }
}
