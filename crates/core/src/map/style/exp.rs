//! Style expressions.
//!
//! [`Expr`] is the untyped tree; [`Exp<T>`] tags it with the type the
//! renderer will produce so layer properties can only be given expressions
//! of the right kind. Builders never reorder or merge branches: the first
//! matching `case` branch wins and `step`/`interpolate` stops must already be
//! ascending.

use std::fmt;
use std::marker::PhantomData;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::map::style::properties::FeatureProperty;

// ============================================================================
// Untyped tree
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interpolation {
    Linear,
    Exponential(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ArrayType {
    String,
    Number,
    Boolean,
}

/// Type assertions (`["string", ...]` and friends).
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Coercion {
    String,
    Number,
    Boolean,
    Image,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A constant. Arrays and objects are wrapped in `["literal", ...]`.
    Literal(Value),
    /// Raw JSON emitted exactly as given.
    Bare(Value),
    Get {
        property: Box<Expr>,
        object: Option<Box<Expr>>,
    },
    Has {
        property: Box<Expr>,
        object: Option<Box<Expr>>,
    },
    Zoom,
    Not(Box<Expr>),
    Any(Vec<Expr>),
    All(Vec<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    NotEq(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    In {
        needle: Box<Expr>,
        haystack: Box<Expr>,
    },
    Case {
        branches: Vec<(Expr, Expr)>,
        fallback: Box<Expr>,
    },
    Match {
        input: Box<Expr>,
        branches: Vec<(Value, Expr)>,
        fallback: Box<Expr>,
    },
    Step {
        input: Box<Expr>,
        base: Box<Expr>,
        stops: Vec<(f64, Expr)>,
    },
    Interpolate {
        interpolation: Interpolation,
        input: Box<Expr>,
        stops: Vec<(f64, Expr)>,
    },
    Concat(Vec<Expr>),
    Downcase(Box<Expr>),
    At {
        index: Box<Expr>,
        array: Box<Expr>,
    },
    Length(Box<Expr>),
    Product(Vec<Expr>),
    Let {
        bindings: Vec<(String, Expr)>,
        body: Box<Expr>,
    },
    Var(String),
    Array {
        item_type: ArrayType,
        length: Option<usize>,
        value: Box<Expr>,
    },
    Coerce {
        kind: Coercion,
        value: Box<Expr>,
    },
}

fn op<I>(name: &str, args: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut array = vec![Value::from(name)];
    array.extend(args);
    Value::Array(array)
}

impl Expr {
    /// Serialize to the renderer's nested-array form.
    pub fn to_json(&self) -> Value {
        match self {
            Expr::Literal(value @ (Value::Array(_) | Value::Object(_))) => {
                json!(["literal", value])
            }
            Expr::Literal(value) | Expr::Bare(value) => value.clone(),
            Expr::Get { property, object } => op(
                "get",
                std::iter::once(property.to_json()).chain(object.iter().map(|o| o.to_json())),
            ),
            Expr::Has { property, object } => op(
                "has",
                std::iter::once(property.to_json()).chain(object.iter().map(|o| o.to_json())),
            ),
            Expr::Zoom => op("zoom", []),
            Expr::Not(inner) => op("!", [inner.to_json()]),
            Expr::Any(items) => op("any", items.iter().map(Expr::to_json)),
            Expr::All(items) => op("all", items.iter().map(Expr::to_json)),
            Expr::Eq(lhs, rhs) => op("==", [lhs.to_json(), rhs.to_json()]),
            Expr::NotEq(lhs, rhs) => op("!=", [lhs.to_json(), rhs.to_json()]),
            Expr::Ge(lhs, rhs) => op(">=", [lhs.to_json(), rhs.to_json()]),
            Expr::In { needle, haystack } => op("in", [needle.to_json(), haystack.to_json()]),
            Expr::Case { branches, fallback } => op(
                "case",
                branches
                    .iter()
                    .flat_map(|(condition, output)| [condition.to_json(), output.to_json()])
                    .chain(std::iter::once(fallback.to_json())),
            ),
            Expr::Match {
                input,
                branches,
                fallback,
            } => op(
                "match",
                std::iter::once(input.to_json())
                    .chain(
                        branches
                            .iter()
                            .flat_map(|(label, output)| [label.clone(), output.to_json()]),
                    )
                    .chain(std::iter::once(fallback.to_json())),
            ),
            Expr::Step { input, base, stops } => op(
                "step",
                [input.to_json(), base.to_json()].into_iter().chain(
                    stops
                        .iter()
                        .flat_map(|(threshold, output)| [json!(threshold), output.to_json()]),
                ),
            ),
            Expr::Interpolate {
                interpolation,
                input,
                stops,
            } => {
                let kind = match interpolation {
                    Interpolation::Linear => json!(["linear"]),
                    Interpolation::Exponential(base) => json!(["exponential", base]),
                };
                op(
                    "interpolate",
                    [kind, input.to_json()].into_iter().chain(
                        stops
                            .iter()
                            .flat_map(|(stop, output)| [json!(stop), output.to_json()]),
                    ),
                )
            }
            Expr::Concat(items) => op("concat", items.iter().map(Expr::to_json)),
            Expr::Downcase(inner) => op("downcase", [inner.to_json()]),
            Expr::At { index, array } => op("at", [index.to_json(), array.to_json()]),
            Expr::Length(inner) => op("length", [inner.to_json()]),
            Expr::Product(items) => op("*", items.iter().map(Expr::to_json)),
            Expr::Let { bindings, body } => op(
                "let",
                bindings
                    .iter()
                    .flat_map(|(name, value)| [Value::from(name.as_str()), value.to_json()])
                    .chain(std::iter::once(body.to_json())),
            ),
            Expr::Var(name) => op("var", [Value::from(name.as_str())]),
            Expr::Array {
                item_type,
                length,
                value,
            } => {
                let item_type: &'static str = (*item_type).into();
                let mut args = vec![Value::from(item_type)];
                if let Some(length) = length {
                    args.push(json!(length));
                }
                args.push(value.to_json());
                op("array", args)
            }
            Expr::Coerce { kind, value } => {
                let name: &'static str = (*kind).into();
                op(name, [value.to_json()])
            }
        }
    }
}

// ============================================================================
// Typed wrapper
// ============================================================================

/// Output type of an image expression.
pub enum ResolvedImage {}

/// Output type of a color expression.
pub enum Color {}

/// Object-valued property, e.g. `routeIds`.
pub type JsonObject = serde_json::Map<String, Value>;

/// `[x, y]` pixel or em offset.
pub type Offset = Vec<f64>;

pub struct Exp<T> {
    expr: Expr,
    _output: PhantomData<fn() -> T>,
}

impl<T> Exp<T> {
    pub fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            _output: PhantomData,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }

    pub fn to_json(&self) -> Value {
        self.expr.to_json()
    }

    /// Reinterpret the output type without changing the tree.
    pub fn downcast<U>(self) -> Exp<U> {
        Exp::from_expr(self.expr)
    }

    fn boxed(self) -> Box<Expr> {
        Box::new(self.expr)
    }
}

impl<T> Clone for Exp<T> {
    fn clone(&self) -> Self {
        Self::from_expr(self.expr.clone())
    }
}

impl<T> PartialEq for Exp<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl<T> fmt::Debug for Exp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exp({})", self.to_json())
    }
}

impl<T> Serialize for Exp<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Exp<String> {
    fn from(value: &str) -> Self {
        lit(value)
    }
}

impl From<String> for Exp<String> {
    fn from(value: String) -> Self {
        lit(value)
    }
}

impl From<f64> for Exp<f64> {
    fn from(value: f64) -> Self {
        lit(value)
    }
}

impl From<bool> for Exp<bool> {
    fn from(value: bool) -> Self {
        lit(value)
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn lit<T>(value: impl Into<Value>) -> Exp<T> {
    Exp::from_expr(Expr::Literal(value.into()))
}

pub fn lit_str(value: impl Into<String>) -> Exp<String> {
    lit(value.into())
}

pub fn lit_num(value: f64) -> Exp<f64> {
    lit(value)
}

pub fn lit_bool(value: bool) -> Exp<bool> {
    lit(value)
}

/// Literal string list, e.g. the right hand side of `in`.
pub fn lit_strings<S: AsRef<str>>(values: &[S]) -> Exp<Vec<String>> {
    lit(values
        .iter()
        .map(|value| Value::from(value.as_ref()))
        .collect::<Vec<_>>())
}

pub fn color(hex: impl Into<String>) -> Exp<Color> {
    lit(hex.into())
}

pub fn get<T>(property: FeatureProperty<T>) -> Exp<T> {
    Exp::from_expr(Expr::Get {
        property: Box::new(Expr::Literal(property.key().into())),
        object: None,
    })
}

/// Look up a computed key inside an object-valued expression.
pub fn get_in<T, O>(property: Exp<String>, object: Exp<O>) -> Exp<T> {
    Exp::from_expr(Expr::Get {
        property: property.boxed(),
        object: Some(object.boxed()),
    })
}

pub fn has_in<O>(property: Exp<String>, object: Exp<O>) -> Exp<bool> {
    Exp::from_expr(Expr::Has {
        property: property.boxed(),
        object: Some(object.boxed()),
    })
}

pub fn zoom() -> Exp<f64> {
    Exp::from_expr(Expr::Zoom)
}

pub fn not(value: Exp<bool>) -> Exp<bool> {
    Exp::from_expr(Expr::Not(value.boxed()))
}

pub fn any(items: Vec<Exp<bool>>) -> Exp<bool> {
    Exp::from_expr(Expr::Any(items.into_iter().map(Exp::into_expr).collect()))
}

pub fn all(items: Vec<Exp<bool>>) -> Exp<bool> {
    Exp::from_expr(Expr::All(items.into_iter().map(Exp::into_expr).collect()))
}

pub fn eq<T>(lhs: Exp<T>, rhs: Exp<T>) -> Exp<bool> {
    Exp::from_expr(Expr::Eq(lhs.boxed(), rhs.boxed()))
}

pub fn not_eq<T>(lhs: Exp<T>, rhs: Exp<T>) -> Exp<bool> {
    Exp::from_expr(Expr::NotEq(lhs.boxed(), rhs.boxed()))
}

pub fn ge<T>(lhs: Exp<T>, rhs: Exp<T>) -> Exp<bool> {
    Exp::from_expr(Expr::Ge(lhs.boxed(), rhs.boxed()))
}

pub fn is_in<T>(needle: Exp<T>, haystack: Exp<Vec<T>>) -> Exp<bool> {
    Exp::from_expr(Expr::In {
        needle: needle.boxed(),
        haystack: haystack.boxed(),
    })
}

pub fn case<T>(branches: Vec<(Exp<bool>, Exp<T>)>, fallback: Exp<T>) -> Exp<T> {
    Exp::from_expr(Expr::Case {
        branches: branches
            .into_iter()
            .map(|(condition, output)| (condition.expr, output.expr))
            .collect(),
        fallback: fallback.boxed(),
    })
}

pub fn match_labels<T, I>(input: Exp<I>, branches: Vec<(Value, Exp<T>)>, fallback: Exp<T>) -> Exp<T> {
    Exp::from_expr(Expr::Match {
        input: input.boxed(),
        branches: branches
            .into_iter()
            .map(|(label, output)| (label, output.expr))
            .collect(),
        fallback: fallback.boxed(),
    })
}

pub fn step<T>(input: Exp<f64>, base: Exp<T>, stops: Vec<(f64, Exp<T>)>) -> Exp<T> {
    Exp::from_expr(Expr::Step {
        input: input.boxed(),
        base: base.boxed(),
        stops: stops
            .into_iter()
            .map(|(threshold, output)| (threshold, output.expr))
            .collect(),
    })
}

pub fn interpolate<T>(
    interpolation: Interpolation,
    input: Exp<f64>,
    stops: Vec<(f64, Exp<T>)>,
) -> Exp<T> {
    Exp::from_expr(Expr::Interpolate {
        interpolation,
        input: input.boxed(),
        stops: stops
            .into_iter()
            .map(|(stop, output)| (stop, output.expr))
            .collect(),
    })
}

pub fn concat(items: Vec<Exp<String>>) -> Exp<String> {
    Exp::from_expr(Expr::Concat(items.into_iter().map(Exp::into_expr).collect()))
}

pub fn downcase(value: Exp<String>) -> Exp<String> {
    Exp::from_expr(Expr::Downcase(value.boxed()))
}

pub fn at<T>(index: usize, array: Exp<Vec<T>>) -> Exp<T> {
    Exp::from_expr(Expr::At {
        index: Box::new(Expr::Literal(json!(index))),
        array: array.boxed(),
    })
}

pub fn length<T>(array: Exp<Vec<T>>) -> Exp<f64> {
    Exp::from_expr(Expr::Length(array.boxed()))
}

pub fn product(items: Vec<Exp<f64>>) -> Exp<f64> {
    Exp::from_expr(Expr::Product(items.into_iter().map(Exp::into_expr).collect()))
}

/// Name for a `let` binding, typed by the bound value.
pub struct LetVariable<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> LetVariable<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }
}

pub fn let_in<B, T>(variable: &LetVariable<B>, value: Exp<B>, body: Exp<T>) -> Exp<T> {
    Exp::from_expr(Expr::Let {
        bindings: vec![(variable.name.to_string(), value.expr)],
        body: body.boxed(),
    })
}

pub fn var<T>(variable: &LetVariable<T>) -> Exp<T> {
    Exp::from_expr(Expr::Var(variable.name.to_string()))
}

pub fn string<T>(value: Exp<T>) -> Exp<String> {
    coerce(Coercion::String, value)
}

pub fn boolean<T>(value: Exp<T>) -> Exp<bool> {
    coerce(Coercion::Boolean, value)
}

pub fn number<T>(value: Exp<T>) -> Exp<f64> {
    coerce(Coercion::Number, value)
}

pub fn image(value: Exp<String>) -> Exp<ResolvedImage> {
    coerce(Coercion::Image, value)
}

fn coerce<T, U>(kind: Coercion, value: Exp<T>) -> Exp<U> {
    Exp::from_expr(Expr::Coerce {
        kind,
        value: value.boxed(),
    })
}

/// Literal `[x, y]` offset wrapped in an array assertion. Offset layout
/// properties only accept this form, never per-element expressions.
pub fn xy(x: f64, y: f64) -> Exp<Offset> {
    Exp::from_expr(Expr::Array {
        item_type: ArrayType::Number,
        length: Some(2),
        value: Box::new(Expr::Bare(json!([x, y]))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::style::properties::keys;

    #[test]
    fn test_literals() {
        assert_eq!(lit_str("BUS").to_json(), json!("BUS"));
        assert_eq!(lit_num(1.5).to_json(), json!(1.5));
        assert_eq!(
            lit_strings(&["Suspension", "Shuttle"]).to_json(),
            json!(["literal", ["Suspension", "Shuttle"]])
        );
    }

    #[test]
    fn test_get_and_lookup() {
        assert_eq!(get(keys::MAP_ROUTES).to_json(), json!(["get", "mapRoutes"]));
        let nested: Exp<Vec<String>> = get_in(lit_str("GREEN"), get(keys::ROUTE_IDS));
        assert_eq!(
            nested.to_json(),
            json!(["get", "GREEN", ["get", "routeIds"]])
        );
    }

    #[test]
    fn test_case_keeps_branch_order() {
        let exp = case(
            vec![
                (get(keys::IS_SELECTED), lit_str("selected")),
                (get(keys::IS_TERMINAL), lit_str("terminal")),
            ],
            lit_str(""),
        );
        assert_eq!(
            exp.to_json(),
            json!([
                "case",
                ["get", "isSelected"],
                "selected",
                ["get", "isTerminal"],
                "terminal",
                ""
            ])
        );
    }

    #[test]
    fn test_step_and_interpolate() {
        let width = step(zoom(), lit_num(3.0), vec![(15.0, lit_num(4.0))]);
        assert_eq!(width.to_json(), json!(["step", ["zoom"], 3.0, 15.0, 4.0]));

        let size = interpolate(
            Interpolation::Exponential(1.5),
            zoom(),
            vec![(11.5, lit_num(0.25)), (14.0, lit_num(1.0))],
        );
        assert_eq!(
            size.to_json(),
            json!([
                "interpolate",
                ["exponential", 1.5],
                ["zoom"],
                11.5,
                0.25,
                14.0,
                1.0
            ])
        );
    }

    #[test]
    fn test_xy_is_literal_array() {
        assert_eq!(
            xy(26.0, -13.0).to_json(),
            json!(["array", "number", 2, [26.0, -13.0]])
        );
    }

    #[test]
    fn test_let_and_coercions() {
        let lhs = LetVariable::<Vec<String>>::new("lhs");
        let exp = let_in(&lhs, get(keys::MAP_ROUTES), length(var(&lhs)));
        assert_eq!(
            exp.to_json(),
            json!(["let", "lhs", ["get", "mapRoutes"], ["length", ["var", "lhs"]]])
        );
        assert_eq!(
            image(lit_str("map-stop-pin")).to_json(),
            json!(["image", "map-stop-pin"])
        );
        assert_eq!(
            string(at(0, get(keys::MAP_ROUTES))).to_json(),
            json!(["string", ["at", 0, ["get", "mapRoutes"]]])
        );
    }

    #[test]
    fn test_match_serializes_labels_in_place() {
        let exp: Exp<String> = match_labels(
            get(keys::LOCATION_TYPE),
            vec![
                (json!("ENTRANCE_EXIT"), lit_str("entrance")),
                (json!(["STOP", "BOARDING_AREA"]), lit_str("platform")),
            ],
            lit_str(""),
        );
        assert_eq!(
            exp.to_json(),
            json!([
                "match",
                ["get", "locationType"],
                "ENTRANCE_EXIT",
                "entrance",
                ["STOP", "BOARDING_AREA"],
                "platform",
                ""
            ])
        );
    }
}
