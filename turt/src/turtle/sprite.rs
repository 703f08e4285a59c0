//! Headless turtle

use super::canvas::{Canvas, Color, Point, Polygon, Segment};
use super::Turtle;
use crate::config::Config;

/// In-progress animated move
#[derive(Debug, Clone, Copy)]
struct Glide {
    target: Point,
}

/// A turtle that records what it draws into a [`Canvas`]
#[derive(Debug, Clone)]
pub struct Sprite {
    home: Point,
    position: Point,
    heading: f64,
    pen_down: bool,
    visible: bool,
    color: Color,
    speed: f64,
    default_speed: f64,
    glide: Option<Glide>,
    polygon: Option<Vec<Point>>,
    canvas: Canvas,
}

impl Sprite {
    /// A turtle at the centre of the configured screen
    pub fn new(config: &Config) -> Self {
        let home = Point::new(config.screen_width / 2.0, config.screen_height / 2.0);
        Sprite {
            home,
            position: home,
            heading: 0.0,
            pen_down: true,
            visible: true,
            color: Color::default(),
            speed: config.turtle_speed,
            default_speed: config.turtle_speed,
            glide: None,
            polygon: None,
            canvas: Canvas::default(),
        }
    }

    /// Return home and wipe the canvas
    pub fn reset(&mut self) {
        self.position = self.home;
        self.heading = 0.0;
        self.pen_down = true;
        self.visible = true;
        self.color = Color::default();
        self.speed = self.default_speed;
        self.glide = None;
        self.polygon = None;
        self.canvas.clear();
    }

    /// Advance any glide by `dt` seconds of movement
    pub fn update(&mut self, dt: f64) {
        let Some(glide) = self.glide else {
            return;
        };
        let step = self.speed * dt;
        let remaining = self.position.distance(glide.target);
        if step >= remaining {
            self.position = glide.target;
            self.glide = None;
        } else {
            self.position = self.position.lerp(glide.target, step / remaining);
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Where the turtle will be once any glide finishes
    pub fn destination(&self) -> Point {
        self.glide.map_or(self.position, |g| g.target)
    }

    fn move_to(&mut self, target: Point) {
        self.stop_glide();
        if self.pen_down && target != self.position {
            self.canvas.segments.push(Segment {
                from: self.position,
                to: target,
                color: self.color,
            });
        }
        if self.speed > 0.0 {
            self.glide = Some(Glide { target });
        } else {
            self.position = target;
        }
    }
}

impl Turtle for Sprite {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, to: Point) {
        self.move_to(to);
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn set_heading(&mut self, degrees: f64) {
        self.heading = degrees.rem_euclid(360.0);
    }

    fn forward(&mut self, distance: f64) {
        self.stop_glide();
        let radians = self.heading.to_radians();
        let target = Point::new(
            self.position.x + radians.sin() * distance,
            self.position.y - radians.cos() * distance,
        );
        self.move_to(target);
    }

    fn pen_down(&self) -> bool {
        self.pen_down
    }

    fn set_pen_down(&mut self, down: bool) {
        self.pen_down = down;
    }

    fn visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn speed(&self) -> f64 {
        self.speed
    }

    fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    fn begin_polygon(&mut self) {
        self.polygon = Some(vec![self.destination()]);
    }

    fn add_vertex(&mut self) -> bool {
        let at = self.destination();
        match &mut self.polygon {
            Some(vertices) => {
                vertices.push(at);
                true
            }
            None => false,
        }
    }

    fn end_polygon(&mut self) -> usize {
        let Some(vertices) = self.polygon.take() else {
            return 0;
        };
        let count = vertices.len();
        if count >= 3 {
            self.canvas.polygons.push(Polygon {
                vertices,
                color: self.color,
            });
        }
        count
    }

    fn gliding(&self) -> bool {
        self.glide.is_some()
    }

    fn stop_glide(&mut self) {
        if let Some(glide) = self.glide.take() {
            self.position = glide.target;
        }
    }
}
