//! Feature property keys shared by the feature builders and the layers that
//! read them.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde_json::Value;

use crate::map::style::exp::JsonObject;

/// A property key tagged with the type stored under it.
pub struct FeatureProperty<T> {
    key: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> FeatureProperty<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _type: PhantomData,
        }
    }

    pub const fn key(&self) -> &'static str {
        self.key
    }
}

impl FeatureProperty<i64> {
    /// The same key, read as a plain number by style expressions.
    pub const fn as_number(self) -> FeatureProperty<f64> {
        FeatureProperty::new(self.key)
    }
}

impl<T> Clone for FeatureProperty<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FeatureProperty<T> {}

impl<T> std::fmt::Debug for FeatureProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FeatureProperty").field(&self.key).finish()
    }
}

pub mod keys {
    use super::FeatureProperty;
    use std::collections::BTreeMap;

    pub const ID: FeatureProperty<String> = FeatureProperty::new("id");
    pub const NAME: FeatureProperty<String> = FeatureProperty::new("name");
    pub const SORT_ORDER: FeatureProperty<i64> = FeatureProperty::new("sortOrder");

    // Stops
    pub const IS_SELECTED: FeatureProperty<bool> = FeatureProperty::new("isSelected");
    pub const IS_TERMINAL: FeatureProperty<bool> = FeatureProperty::new("isTerminal");
    /// `MapStopRoute` names, most prominent first
    pub const MAP_ROUTES: FeatureProperty<Vec<String>> = FeatureProperty::new("mapRoutes");
    /// Route ids keyed by `MapStopRoute` name
    pub const ROUTE_IDS: FeatureProperty<BTreeMap<String, Vec<String>>> =
        FeatureProperty::new("routeIds");
    /// `StopAlertState` name keyed by `MapStopRoute` name
    pub const SERVICE_STATUS: FeatureProperty<BTreeMap<String, String>> =
        FeatureProperty::new("serviceStatus");
    /// `"<route id>/<direction id>"`
    pub const ALL_ROUTE_DIRECTIONS: FeatureProperty<Vec<String>> =
        FeatureProperty::new("allRouteDirections");

    // Route lines
    pub const ROUTE_ID: FeatureProperty<String> = FeatureProperty::new("routeId");
    pub const ROUTE_TYPE: FeatureProperty<String> = FeatureProperty::new("routeType");
    pub const ROUTE_SORT_KEY: FeatureProperty<f64> = FeatureProperty::new("routeSortKey");
    pub const ROUTE_COLOR: FeatureProperty<String> = FeatureProperty::new("routeColor");
    pub const ALERT_STATE: FeatureProperty<String> = FeatureProperty::new("alertState");

    // Child stops
    pub const LOCATION_TYPE: FeatureProperty<String> = FeatureProperty::new("locationType");
}

/// Conversion between property values and JSON.
pub trait PropertyValue: Sized {
    fn into_json(self) -> Value;
    fn from_json(value: &Value) -> Option<Self>;
}

impl PropertyValue for String {
    fn into_json(self) -> Value {
        Value::String(self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl PropertyValue for bool {
    fn into_json(self) -> Value {
        Value::Bool(self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl PropertyValue for f64 {
    fn into_json(self) -> Value {
        Value::from(self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl PropertyValue for i64 {
    fn into_json(self) -> Value {
        Value::from(self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl PropertyValue for Vec<String> {
    fn into_json(self) -> Value {
        Value::Array(self.into_iter().map(Value::String).collect())
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(String::from_json).collect()
    }
}

impl<V: PropertyValue> PropertyValue for BTreeMap<String, V> {
    fn into_json(self) -> Value {
        Value::Object(
            self.into_iter()
                .map(|(key, value)| (key, value.into_json()))
                .collect(),
        )
    }

    fn from_json(value: &Value) -> Option<Self> {
        value
            .as_object()?
            .iter()
            .map(|(key, value)| Some((key.clone(), V::from_json(value)?)))
            .collect()
    }
}

/// Property bag of a single feature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureProperties(JsonObject);

impl FeatureProperties {
    pub fn get<T: PropertyValue>(&self, property: FeatureProperty<T>) -> Option<T> {
        self.0.get(property.key()).and_then(T::from_json)
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    pub fn into_object(self) -> JsonObject {
        self.0
    }
}

impl From<JsonObject> for FeatureProperties {
    fn from(data: JsonObject) -> Self {
        Self(data)
    }
}

#[derive(Debug, Default)]
pub struct FeaturePropertiesBuilder {
    data: JsonObject,
}

impl FeaturePropertiesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: PropertyValue>(&mut self, property: FeatureProperty<T>, value: T) -> &mut Self {
        self.data.insert(property.key().to_string(), value.into_json());
        self
    }

    pub fn build(self) -> FeatureProperties {
        FeatureProperties(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_round_trips_typed_values() {
        let mut builder = FeaturePropertiesBuilder::new();
        builder
            .put(keys::ID, "place-north".to_string())
            .put(keys::IS_TERMINAL, true)
            .put(keys::SORT_ORDER, -2)
            .put(
                keys::MAP_ROUTES,
                vec!["ORANGE".to_string(), "GREEN".to_string()],
            )
            .put(
                keys::ROUTE_IDS,
                BTreeMap::from([("GREEN".to_string(), vec!["Green-D".to_string()])]),
            );
        let properties = builder.build();

        assert_eq!(properties.get(keys::ID).as_deref(), Some("place-north"));
        assert_eq!(properties.get(keys::IS_TERMINAL), Some(true));
        assert_eq!(properties.get(keys::SORT_ORDER), Some(-2));
        assert_eq!(properties.as_object()["sortOrder"], json!(-2));
        assert_eq!(
            properties.get(keys::ROUTE_IDS).unwrap()["GREEN"],
            vec!["Green-D".to_string()]
        );
        assert_eq!(properties.get(keys::NAME), None);
        assert_eq!(
            properties.as_object()["mapRoutes"],
            json!(["ORANGE", "GREEN"])
        );
    }

    #[test]
    fn test_mismatched_type_reads_as_none() {
        let properties = FeatureProperties::from(
            json!({ "isTerminal": "yes" }).as_object().cloned().unwrap(),
        );
        assert_eq!(properties.get(keys::IS_TERMINAL), None);
    }
}
