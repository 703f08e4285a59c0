//! The drawing library: controls the turtle

use super::{expect_number, Library};
use crate::interp::{InterpResult, Interpreter, RuntimeError, Value};
use crate::turtle::{Color, Point, Turtle};

pub fn drawing() -> Library {
    Library::new("drawing")
        .function("getX", builtin_get_x)
        .function("getY", builtin_get_y)
        .function("setPos", builtin_set_pos)
        .function("forward", builtin_forward)
        .function("back", builtin_back)
        .function("getAngle", builtin_get_angle)
        .function("setAngle", builtin_set_angle)
        .function("turn", builtin_turn)
        .function("hide", builtin_hide)
        .function("show", builtin_show)
        .function("penUp", builtin_pen_up)
        .function("penDown", builtin_pen_down)
        .function("setColor", builtin_set_color)
        .function("setSpeed", builtin_set_speed)
        .function("beginPoly", builtin_begin_poly)
        .function("addVertex", builtin_add_vertex)
        .function("endPoly", builtin_end_poly)
}

fn builtin_get_x(_: &mut Interpreter, turtle: &mut dyn Turtle) -> f64 {
    turtle.position().x
}

fn builtin_get_y(_: &mut Interpreter, turtle: &mut dyn Turtle) -> f64 {
    turtle.position().y
}

fn builtin_set_pos(
    _: &mut Interpreter,
    turtle: &mut dyn Turtle,
    x: Value,
    y: Value,
) -> InterpResult<()> {
    let to = Point::new(expect_number("setPos", &x)?, expect_number("setPos", &y)?);
    turtle.set_position(to);
    Ok(())
}

fn builtin_forward(
    _: &mut Interpreter,
    turtle: &mut dyn Turtle,
    distance: Value,
) -> InterpResult<()> {
    turtle.forward(expect_number("forward", &distance)?);
    Ok(())
}

fn builtin_back(_: &mut Interpreter, turtle: &mut dyn Turtle, distance: Value) -> InterpResult<()> {
    turtle.forward(-expect_number("back", &distance)?);
    Ok(())
}

fn builtin_get_angle(_: &mut Interpreter, turtle: &mut dyn Turtle) -> f64 {
    turtle.heading()
}

fn builtin_set_angle(
    _: &mut Interpreter,
    turtle: &mut dyn Turtle,
    degrees: Value,
) -> InterpResult<()> {
    turtle.set_heading(expect_number("setAngle", &degrees)?);
    Ok(())
}

/// Clockwise for positive angles
fn builtin_turn(_: &mut Interpreter, turtle: &mut dyn Turtle, degrees: Value) -> InterpResult<()> {
    let heading = turtle.heading() + expect_number("turn", &degrees)?;
    turtle.set_heading(heading);
    Ok(())
}

fn builtin_hide(_: &mut Interpreter, turtle: &mut dyn Turtle) {
    turtle.set_visible(false);
}

fn builtin_show(_: &mut Interpreter, turtle: &mut dyn Turtle) {
    turtle.set_visible(true);
}

fn builtin_pen_up(_: &mut Interpreter, turtle: &mut dyn Turtle) {
    turtle.set_pen_down(false);
}

fn builtin_pen_down(_: &mut Interpreter, turtle: &mut dyn Turtle) {
    turtle.set_pen_down(true);
}

fn color_component(value: &Value) -> InterpResult<u8> {
    let n = expect_number("setColor", value)?;
    if n.fract() != 0.0 || !(0.0..=255.0).contains(&n) {
        return Err(RuntimeError::invalid_argument(
            "setColor",
            "components must be whole numbers from 0 to 255.",
        ));
    }
    Ok(n as u8)
}

fn builtin_set_color(
    _: &mut Interpreter,
    turtle: &mut dyn Turtle,
    r: Value,
    g: Value,
    b: Value,
) -> InterpResult<()> {
    let color = Color::rgb(color_component(&r)?, color_component(&g)?, color_component(&b)?);
    turtle.set_color(color);
    Ok(())
}

/// Pixels per second; 0 moves instantly
fn builtin_set_speed(
    _: &mut Interpreter,
    turtle: &mut dyn Turtle,
    speed: Value,
) -> InterpResult<()> {
    let speed = expect_number("setSpeed", &speed)?;
    if speed < 0.0 || !speed.is_finite() {
        return Err(RuntimeError::invalid_argument(
            "setSpeed",
            "requires a finite, non-negative speed.",
        ));
    }
    turtle.set_speed(speed);
    Ok(())
}

fn builtin_begin_poly(_: &mut Interpreter, turtle: &mut dyn Turtle) {
    turtle.begin_polygon();
}

fn builtin_add_vertex(_: &mut Interpreter, turtle: &mut dyn Turtle) -> InterpResult<()> {
    if turtle.add_vertex() {
        Ok(())
    } else {
        Err(RuntimeError::invalid_argument(
            "addVertex",
            "called before beginPoly().",
        ))
    }
}

fn builtin_end_poly(_: &mut Interpreter, turtle: &mut dyn Turtle) -> InterpResult<()> {
    let vertices = turtle.end_polygon();
    if vertices < 3 {
        return Err(RuntimeError::invalid_argument(
            "endPoly",
            &format!("needs at least 3 vertices, got {vertices}."),
        ));
    }
    Ok(())
}
