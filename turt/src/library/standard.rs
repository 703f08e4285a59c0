//! The standard library: output, arrays, strings and math

use super::{expect_array, expect_number, Library};
use crate::interp::{integer_index, InterpResult, Interpreter, RuntimeError, Value};
use crate::turtle::Turtle;

pub fn standard() -> Library {
    Library::new("standard")
        .function("print", builtin_print)
        .function("size", builtin_size)
        .function("pushBack", builtin_push_back)
        .function("pushFront", builtin_push_front)
        .function("popBack", builtin_pop_back)
        .function("popFront", builtin_pop_front)
        .function("get", builtin_get)
        .function("set", builtin_set)
        .function("toString", builtin_to_string)
        .function("toNumber", builtin_to_number)
        .function("floor", builtin_floor)
        .function("round", builtin_round)
        .function("abs", builtin_abs)
        .function("sqrt", builtin_sqrt)
        .function("sin", builtin_sin)
        .function("cos", builtin_cos)
        .function("min", builtin_min)
        .function("max", builtin_max)
        .constant("PI", Value::Number(std::f64::consts::PI))
}

fn builtin_print(interp: &mut Interpreter, _: &mut dyn Turtle, value: Value) {
    interp.print(&value.to_string());
}

/// Array length or string length in characters
fn builtin_size(_: &mut Interpreter, _: &mut dyn Turtle, value: Value) -> InterpResult<f64> {
    match &value {
        Value::Array(array) => Ok(array.borrow().size() as f64),
        Value::Str(s) => Ok(s.chars().count() as f64),
        _ => Err(RuntimeError::invalid_argument(
            "size",
            "requires an array or a string.",
        )),
    }
}

fn builtin_push_back(
    _: &mut Interpreter,
    _: &mut dyn Turtle,
    array: Value,
    value: Value,
) -> InterpResult<f64> {
    let array = expect_array("pushBack", &array)?;
    Ok(array.borrow_mut().push_back(value) as f64)
}

fn builtin_push_front(
    _: &mut Interpreter,
    _: &mut dyn Turtle,
    array: Value,
    value: Value,
) -> InterpResult<f64> {
    let array = expect_array("pushFront", &array)?;
    Ok(array.borrow_mut().push_front(value) as f64)
}

fn builtin_pop_back(_: &mut Interpreter, _: &mut dyn Turtle, array: Value) -> InterpResult<Value> {
    let array = expect_array("popBack", &array)?;
    Ok(array.borrow_mut().pop_back())
}

fn builtin_pop_front(_: &mut Interpreter, _: &mut dyn Turtle, array: Value) -> InterpResult<Value> {
    let array = expect_array("popFront", &array)?;
    Ok(array.borrow_mut().pop_front())
}

fn builtin_get(
    _: &mut Interpreter,
    _: &mut dyn Turtle,
    array: Value,
    index: Value,
) -> InterpResult<Value> {
    let array = expect_array("get", &array)?;
    let index = integer_index(&index)?;
    array.borrow().get(index)
}

/// Returns the stored value
fn builtin_set(
    _: &mut Interpreter,
    _: &mut dyn Turtle,
    array: Value,
    index: Value,
    value: Value,
) -> InterpResult<Value> {
    let array = expect_array("set", &array)?;
    let index = integer_index(&index)?;
    array.borrow_mut().set(index, value.clone())?;
    Ok(value)
}

fn builtin_to_string(_: &mut Interpreter, _: &mut dyn Turtle, value: Value) -> Value {
    match value {
        Value::Str(_) => value,
        other => Value::string(&other.to_string()),
    }
}

/// Null when the string does not hold a finite number
fn builtin_to_number(_: &mut Interpreter, _: &mut dyn Turtle, value: Value) -> Value {
    match &value {
        Value::Number(_) => value,
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map_or(Value::Null, Value::Number),
        _ => Value::Null,
    }
}

fn builtin_floor(_: &mut Interpreter, _: &mut dyn Turtle, n: Value) -> InterpResult<f64> {
    Ok(expect_number("floor", &n)?.floor())
}

/// Halves round away from zero
fn builtin_round(_: &mut Interpreter, _: &mut dyn Turtle, n: Value) -> InterpResult<f64> {
    Ok(expect_number("round", &n)?.round())
}

fn builtin_abs(_: &mut Interpreter, _: &mut dyn Turtle, n: Value) -> InterpResult<f64> {
    Ok(expect_number("abs", &n)?.abs())
}

fn builtin_sqrt(_: &mut Interpreter, _: &mut dyn Turtle, n: Value) -> InterpResult<f64> {
    let n = expect_number("sqrt", &n)?;
    if n < 0.0 {
        return Err(RuntimeError::invalid_argument(
            "sqrt",
            "requires a non-negative number.",
        ));
    }
    Ok(n.sqrt())
}

/// Sine of an angle in degrees
fn builtin_sin(_: &mut Interpreter, _: &mut dyn Turtle, degrees: Value) -> InterpResult<f64> {
    Ok(expect_number("sin", &degrees)?.to_radians().sin())
}

/// Cosine of an angle in degrees
fn builtin_cos(_: &mut Interpreter, _: &mut dyn Turtle, degrees: Value) -> InterpResult<f64> {
    Ok(expect_number("cos", &degrees)?.to_radians().cos())
}

fn builtin_min(_: &mut Interpreter, _: &mut dyn Turtle, a: Value, b: Value) -> InterpResult<f64> {
    Ok(expect_number("min", &a)?.min(expect_number("min", &b)?))
}

fn builtin_max(_: &mut Interpreter, _: &mut dyn Turtle, a: Value, b: Value) -> InterpResult<f64> {
    Ok(expect_number("max", &a)?.max(expect_number("max", &b)?))
}
