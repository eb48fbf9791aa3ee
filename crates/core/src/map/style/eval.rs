//! Evaluates style expressions against a feature's properties.
//!
//! Mirrors the renderer for every operator [`Expr`] can hold, so icon names,
//! offsets and filters can be checked without a map view.

use serde_json::Value;

use crate::map::style::exp::{ArrayType, Coercion, Color, Exp, Expr, Interpolation, JsonObject, ResolvedImage};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: Value },

    #[error("index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("unbound variable `{0}`")]
    UnboundVariable(String),

    #[error("`{0}` needs at least one stop")]
    MissingStops(&'static str),
}

fn mismatch(expected: &'static str, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        found: found.clone(),
    }
}

/// Evaluate `expr` for a feature with `properties` at `zoom`.
pub fn evaluate(expr: &Expr, properties: &JsonObject, zoom: f64) -> Result<Value, EvalError> {
    Context {
        properties,
        zoom,
        scopes: Vec::new(),
    }
    .eval(expr)
}

struct Context<'a> {
    properties: &'a JsonObject,
    zoom: f64,
    scopes: Vec<(String, Value)>,
}

impl Context<'_> {
    fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) | Expr::Bare(value) => Ok(value.clone()),
            Expr::Get { property, object } => {
                let key = self.eval_string(property)?;
                let found = match object {
                    Some(object) => {
                        let object = self.eval(object)?;
                        object
                            .as_object()
                            .ok_or_else(|| mismatch("object", &object))?
                            .get(&key)
                            .cloned()
                    }
                    None => self.properties.get(&key).cloned(),
                };
                Ok(found.unwrap_or(Value::Null))
            }
            Expr::Has { property, object } => {
                let key = self.eval_string(property)?;
                let found = match object {
                    Some(object) => {
                        let object = self.eval(object)?;
                        object
                            .as_object()
                            .ok_or_else(|| mismatch("object", &object))?
                            .contains_key(&key)
                    }
                    None => self.properties.contains_key(&key),
                };
                Ok(Value::Bool(found))
            }
            Expr::Zoom => Ok(Value::from(self.zoom)),
            Expr::Not(inner) => Ok(Value::Bool(!self.eval_bool(inner)?)),
            Expr::Any(items) => {
                for item in items {
                    if self.eval_bool(item)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Expr::All(items) => {
                for item in items {
                    if !self.eval_bool(item)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Expr::Eq(lhs, rhs) => {
                let (lhs, rhs) = (self.eval(lhs)?, self.eval(rhs)?);
                Ok(Value::Bool(values_equal(&lhs, &rhs)))
            }
            Expr::NotEq(lhs, rhs) => {
                let (lhs, rhs) = (self.eval(lhs)?, self.eval(rhs)?);
                Ok(Value::Bool(!values_equal(&lhs, &rhs)))
            }
            Expr::Ge(lhs, rhs) => {
                let (lhs, rhs) = (self.eval(lhs)?, self.eval(rhs)?);
                let result = match (&lhs, &rhs) {
                    (Value::Number(a), Value::Number(b)) => a.as_f64() >= b.as_f64(),
                    (Value::String(a), Value::String(b)) => a >= b,
                    _ => return Err(mismatch("two numbers or two strings", &rhs)),
                };
                Ok(Value::Bool(result))
            }
            Expr::In { needle, haystack } => {
                let (needle, haystack) = (self.eval(needle)?, self.eval(haystack)?);
                let found = match &haystack {
                    Value::Array(items) => items.iter().any(|item| values_equal(item, &needle)),
                    Value::String(text) => needle
                        .as_str()
                        .map(|needle| text.contains(needle))
                        .ok_or_else(|| mismatch("string", &needle))?,
                    other => return Err(mismatch("array or string", other)),
                };
                Ok(Value::Bool(found))
            }
            Expr::Case { branches, fallback } => {
                for (condition, output) in branches {
                    if self.eval_bool(condition)? {
                        return self.eval(output);
                    }
                }
                self.eval(fallback)
            }
            Expr::Match {
                input,
                branches,
                fallback,
            } => {
                let input = self.eval(input)?;
                for (label, output) in branches {
                    let hit = match label {
                        Value::Array(labels) => labels.iter().any(|l| values_equal(l, &input)),
                        label => values_equal(label, &input),
                    };
                    if hit {
                        return self.eval(output);
                    }
                }
                self.eval(fallback)
            }
            Expr::Step { input, base, stops } => {
                let input = self.eval_number(input)?;
                let mut chosen: &Expr = base;
                for (threshold, output) in stops {
                    if input < *threshold {
                        break;
                    }
                    chosen = output;
                }
                self.eval(chosen)
            }
            Expr::Interpolate {
                interpolation,
                input,
                stops,
            } => self.interpolate(*interpolation, input, stops),
            Expr::Concat(items) => {
                let mut out = String::new();
                for item in items {
                    out.push_str(&display(&self.eval(item)?));
                }
                Ok(Value::String(out))
            }
            Expr::Downcase(inner) => Ok(Value::String(self.eval_string(inner)?.to_lowercase())),
            Expr::At { index, array } => {
                let index = self.eval_number(index)?;
                let array = self.eval(array)?;
                let items = array.as_array().ok_or_else(|| mismatch("array", &array))?;
                if index < 0.0 || index.fract() != 0.0 {
                    return Err(mismatch("non-negative integer index", &Value::from(index)));
                }
                let index = index as usize;
                items
                    .get(index)
                    .cloned()
                    .ok_or(EvalError::IndexOutOfBounds {
                        index,
                        len: items.len(),
                    })
            }
            Expr::Length(inner) => {
                let value = self.eval(inner)?;
                let len = match &value {
                    Value::Array(items) => items.len(),
                    Value::String(text) => text.chars().count(),
                    other => return Err(mismatch("array or string", other)),
                };
                Ok(Value::from(len as f64))
            }
            Expr::Product(items) => {
                let mut product = 1.0;
                for item in items {
                    product *= self.eval_number(item)?;
                }
                Ok(Value::from(product))
            }
            Expr::Let { bindings, body } => {
                let depth = self.scopes.len();
                for (name, value) in bindings {
                    let value = self.eval(value)?;
                    self.scopes.push((name.clone(), value));
                }
                let result = self.eval(body);
                self.scopes.truncate(depth);
                result
            }
            Expr::Var(name) => self
                .scopes
                .iter()
                .rev()
                .find(|(bound, _)| bound == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| EvalError::UnboundVariable(name.clone())),
            Expr::Array {
                item_type,
                length,
                value,
            } => {
                let value = self.eval(value)?;
                let items = value.as_array().ok_or_else(|| mismatch("array", &value))?;
                if length.is_some_and(|length| length != items.len()) {
                    return Err(mismatch("array of the asserted length", &value));
                }
                let typed = items.iter().all(|item| match item_type {
                    ArrayType::String => item.is_string(),
                    ArrayType::Number => item.is_number(),
                    ArrayType::Boolean => item.is_boolean(),
                });
                if !typed {
                    return Err(mismatch(item_type_name(*item_type), &value));
                }
                Ok(value)
            }
            Expr::Coerce { kind, value } => {
                let value = self.eval(value)?;
                let valid = match kind {
                    Coercion::String | Coercion::Image => value.is_string(),
                    Coercion::Number => value.is_number(),
                    Coercion::Boolean => value.is_boolean(),
                };
                if valid {
                    Ok(value)
                } else {
                    Err(mismatch((*kind).into(), &value))
                }
            }
        }
    }

    fn interpolate(
        &mut self,
        interpolation: Interpolation,
        input: &Expr,
        stops: &[(f64, Expr)],
    ) -> Result<Value, EvalError> {
        let input = self.eval_number(input)?;
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return Err(EvalError::MissingStops("interpolate"));
        };
        if input <= first.0 {
            return self.eval(&first.1);
        }
        if input >= last.0 {
            return self.eval(&last.1);
        }

        let upper_index = stops
            .iter()
            .position(|(stop, _)| *stop > input)
            .unwrap_or(stops.len() - 1);
        let (lower, upper) = (&stops[upper_index - 1], &stops[upper_index]);
        let t = interpolation_factor(interpolation, input, lower.0, upper.0);

        let from = self.eval(&lower.1)?;
        let to = self.eval(&upper.1)?;
        lerp(&from, &to, t)
    }

    fn eval_bool(&mut self, expr: &Expr) -> Result<bool, EvalError> {
        let value = self.eval(expr)?;
        value.as_bool().ok_or_else(|| mismatch("boolean", &value))
    }

    fn eval_number(&mut self, expr: &Expr) -> Result<f64, EvalError> {
        let value = self.eval(expr)?;
        value.as_f64().ok_or_else(|| mismatch("number", &value))
    }

    fn eval_string(&mut self, expr: &Expr) -> Result<String, EvalError> {
        match self.eval(expr)? {
            Value::String(text) => Ok(text),
            other => Err(mismatch("string", &other)),
        }
    }
}

fn item_type_name(item_type: ArrayType) -> &'static str {
    match item_type {
        ArrayType::String => "array of strings",
        ArrayType::Number => "array of numbers",
        ArrayType::Boolean => "array of booleans",
    }
}

/// Numbers compare by value so `1` and `1.0` are equal.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}

fn interpolation_factor(interpolation: Interpolation, input: f64, lower: f64, upper: f64) -> f64 {
    let span = upper - lower;
    let progress = input - lower;
    match interpolation {
        Interpolation::Exponential(base) if (base - 1.0).abs() > f64::EPSILON => {
            (base.powf(progress) - 1.0) / (base.powf(span) - 1.0)
        }
        _ => progress / span,
    }
}

fn lerp(from: &Value, to: &Value, t: f64) -> Result<Value, EvalError> {
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
            Ok(Value::from(a + (b - a) * t))
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => a
            .iter()
            .zip(b)
            .map(|(a, b)| lerp(a, b, t))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => Err(mismatch("interpolatable numbers or arrays", to)),
    }
}

// ============================================================================
// Typed results
// ============================================================================

/// Converts an evaluated value into the Rust type an expression promises.
pub trait ExpOutput {
    type Output;

    fn from_value(value: Value) -> Result<Self::Output, EvalError>;
}

fn string_output(value: Value) -> Result<String, EvalError> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(mismatch("string", &other)),
    }
}

impl ExpOutput for String {
    type Output = String;

    fn from_value(value: Value) -> Result<String, EvalError> {
        string_output(value)
    }
}

impl ExpOutput for ResolvedImage {
    type Output = String;

    fn from_value(value: Value) -> Result<String, EvalError> {
        string_output(value)
    }
}

impl ExpOutput for Color {
    type Output = String;

    fn from_value(value: Value) -> Result<String, EvalError> {
        string_output(value)
    }
}

impl ExpOutput for bool {
    type Output = bool;

    fn from_value(value: Value) -> Result<bool, EvalError> {
        value.as_bool().ok_or_else(|| mismatch("boolean", &value))
    }
}

impl ExpOutput for f64 {
    type Output = f64;

    fn from_value(value: Value) -> Result<f64, EvalError> {
        value.as_f64().ok_or_else(|| mismatch("number", &value))
    }
}

impl ExpOutput for Vec<f64> {
    type Output = Vec<f64>;

    fn from_value(value: Value) -> Result<Vec<f64>, EvalError> {
        value
            .as_array()
            .and_then(|items| items.iter().map(Value::as_f64).collect())
            .ok_or_else(|| mismatch("array of numbers", &value))
    }
}

impl ExpOutput for Vec<String> {
    type Output = Vec<String>;

    fn from_value(value: Value) -> Result<Vec<String>, EvalError> {
        value
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .ok_or_else(|| mismatch("array of strings", &value))
    }
}

impl<T: ExpOutput> Exp<T> {
    pub fn evaluate(&self, properties: &JsonObject, zoom: f64) -> Result<T::Output, EvalError> {
        T::from_value(evaluate(self.expr(), properties, zoom)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::style::exp::{self, LetVariable, lit_num, lit_str, xy};
    use crate::map::style::properties::keys;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn props(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_get_and_case() {
        let properties = props(json!({ "name": "Davis", "isTerminal": false }));
        let label = exp::case(
            vec![(exp::get(keys::IS_TERMINAL), exp::get(keys::NAME))],
            lit_str("fallback"),
        );
        assert_eq!(label.evaluate(&properties, 12.0).unwrap(), "fallback");

        let missing: Exp<String> = exp::get(keys::ROUTE_ID);
        assert!(missing.evaluate(&properties, 12.0).is_err());
    }

    #[test]
    fn test_step_uses_last_passed_threshold() {
        let width = exp::step(
            exp::zoom(),
            lit_num(3.0),
            vec![(13.0, lit_num(4.0)), (15.0, lit_num(6.0))],
        );
        let empty = JsonObject::new();
        assert_eq!(width.evaluate(&empty, 12.9).unwrap(), 3.0);
        assert_eq!(width.evaluate(&empty, 13.0).unwrap(), 4.0);
        assert_eq!(width.evaluate(&empty, 20.0).unwrap(), 6.0);
    }

    #[test]
    fn test_interpolate_linear_and_exponential() {
        let empty = JsonObject::new();
        let linear = exp::interpolate(
            Interpolation::Linear,
            exp::zoom(),
            vec![(10.0, lit_num(0.0)), (20.0, lit_num(10.0))],
        );
        assert_relative_eq!(linear.evaluate(&empty, 15.0).unwrap(), 5.0);
        assert_relative_eq!(linear.evaluate(&empty, 5.0).unwrap(), 0.0);
        assert_relative_eq!(linear.evaluate(&empty, 25.0).unwrap(), 10.0);

        let exponential = exp::interpolate(
            Interpolation::Exponential(2.0),
            exp::zoom(),
            vec![(0.0, lit_num(0.0)), (2.0, lit_num(3.0))],
        );
        // (2^1 - 1) / (2^2 - 1) = 1/3 of the way
        assert_relative_eq!(exponential.evaluate(&empty, 1.0).unwrap(), 1.0);

        let offsets = exp::interpolate(
            Interpolation::Linear,
            exp::zoom(),
            vec![(10.0, xy(0.0, 0.0)), (20.0, xy(2.0, 4.0))],
        );
        assert_eq!(offsets.evaluate(&empty, 15.0).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_let_var_and_lists() {
        let properties = props(json!({ "mapRoutes": ["BUS"] }));
        let lhs = LetVariable::<Vec<String>>::new("lhs");
        let first_is_bus = exp::let_in(
            &lhs,
            exp::get(keys::MAP_ROUTES),
            exp::eq(exp::at(0, exp::var(&lhs)), lit_str("BUS")),
        );
        assert!(first_is_bus.evaluate(&properties, 0.0).unwrap());

        let out_of_range: Exp<String> = exp::at(3, exp::get(keys::MAP_ROUTES));
        assert_eq!(
            out_of_range.evaluate(&properties, 0.0),
            Err(EvalError::IndexOutOfBounds { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_concat_downcase_and_in() {
        let properties = props(json!({ "allRouteDirections": ["Red/0", "Red/1"] }));
        let name = exp::concat(vec![
            lit_str("alert-small-"),
            exp::downcase(lit_str("ORANGE")),
            lit_str("-"),
            exp::string(lit_num(2.0)),
        ]);
        // `string` asserts, it does not convert
        assert!(name.evaluate(&properties, 0.0).is_err());

        let name = exp::concat(vec![lit_str("stop-"), lit_num(2.0).downcast()]);
        assert_eq!(name.evaluate(&properties, 0.0).unwrap(), "stop-2");

        let served = exp::is_in(lit_str("Red/1"), exp::get(keys::ALL_ROUTE_DIRECTIONS));
        assert!(served.evaluate(&properties, 0.0).unwrap());
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let properties = props(json!({ "sortOrder": 1 }));
        let is_one = exp::eq(exp::get(keys::SORT_ORDER.as_number()), lit_num(1.0));
        assert!(is_one.evaluate(&properties, 0.0).unwrap());
    }
}
