//! The turtle: the drawing capability exposed to programs.
//!
//! [`Turtle`] is the boundary between the interpreter and whatever renders
//! the drawing. [`Sprite`] is the headless implementation used by the CLI,
//! the REPL and tests.

mod canvas;
mod sprite;

pub use canvas::{Canvas, Color, Point, Polygon, Segment};
pub use sprite::Sprite;

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the turtle driven by a program
pub type TurtleRef = Rc<RefCell<dyn Turtle>>;

/// Drawing capability driven by the drawing library.
///
/// Movement may be animated: after [`Turtle::forward`] or
/// [`Turtle::set_position`] the turtle can report [`Turtle::gliding`] until
/// the host has advanced it far enough. The interpreter does not start a
/// new statement while the turtle is gliding.
pub trait Turtle {
    fn position(&self) -> Point;
    fn set_position(&mut self, to: Point);

    /// Heading in degrees; 0 points up the screen, angles grow clockwise
    fn heading(&self) -> f64;
    fn set_heading(&mut self, degrees: f64);

    /// Move along the current heading; negative distances move backwards
    fn forward(&mut self, distance: f64);

    fn pen_down(&self) -> bool;
    fn set_pen_down(&mut self, down: bool);

    fn visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);

    /// Glide speed in pixels per second; 0 moves instantly
    fn speed(&self) -> f64;
    fn set_speed(&mut self, speed: f64);

    /// Start recording a polygon, discarding any unfinished one
    fn begin_polygon(&mut self);
    /// Record the current position; false when no polygon is open
    fn add_vertex(&mut self) -> bool;
    /// Close the open polygon, returning how many vertices it had.
    /// Polygons with fewer than three vertices are not drawn.
    fn end_polygon(&mut self) -> usize;

    fn gliding(&self) -> bool;
    /// Finish any glide immediately
    fn stop_glide(&mut self);
}
