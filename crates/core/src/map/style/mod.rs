//! Typed style expressions, feature properties and layer descriptions.

pub mod eval;
pub mod exp;
pub mod layer;
pub mod properties;

pub use eval::{EvalError, ExpOutput, evaluate};
pub use exp::{Color, Exp, Expr, JsonObject, Offset, ResolvedImage};
pub use layer::{LineJoin, LineLayer, SymbolLayer, TextAnchor, TextJustify};
pub use properties::{FeatureProperties, FeaturePropertiesBuilder, FeatureProperty, keys};
