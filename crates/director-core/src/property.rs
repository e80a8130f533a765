//! Typed property cells exposed by nodes

use crate::identity::ActorId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A selected value of a named enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    /// Name of the enumeration type (participates in type checking)
    pub type_name: String,
    /// Currently selected variant
    pub value: String,
}

impl EnumValue {
    /// Create a new enum value
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}

/// A typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Property {
    /// Boolean value
    Bool(bool),
    /// Integer value (counts, indices)
    Int(i64),
    /// Floating point value (durations, amounts)
    Float(f64),
    /// String value
    String(String),
    /// Reference to a host actor, or no actor
    Actor(Option<ActorId>),
    /// Enumeration value
    Enum(EnumValue),
    /// Nested group of named properties
    Group(PropertySet),
    /// Array of properties
    Array(Vec<Property>),
}

/// A map of property names to values
///
/// Uses IndexMap to preserve declaration order (deterministic iteration and serialization)
pub type PropertySet = IndexMap<String, Property>;

/// The declared type of a property
///
/// Two properties are type compatible when their `PropertyType`s are equal.
/// Enumerations are only compatible with the same enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    String,
    Actor,
    Enum(String),
    Group,
    Array,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Bool => write!(f, "bool"),
            PropertyType::Int => write!(f, "int"),
            PropertyType::Float => write!(f, "float"),
            PropertyType::String => write!(f, "string"),
            PropertyType::Actor => write!(f, "actor"),
            PropertyType::Enum(name) => write!(f, "enum<{}>", name),
            PropertyType::Group => write!(f, "group"),
            PropertyType::Array => write!(f, "array"),
        }
    }
}

impl Property {
    /// Get the declared type of this property
    pub fn property_type(&self) -> PropertyType {
        match self {
            Property::Bool(_) => PropertyType::Bool,
            Property::Int(_) => PropertyType::Int,
            Property::Float(_) => PropertyType::Float,
            Property::String(_) => PropertyType::String,
            Property::Actor(_) => PropertyType::Actor,
            Property::Enum(e) => PropertyType::Enum(e.type_name.clone()),
            Property::Group(_) => PropertyType::Group,
            Property::Array(_) => PropertyType::Array,
        }
    }

    /// Convert to `target`, if the value can be stored there
    ///
    /// Only identity and integer to float widening are accepted.
    pub fn coerce_to(self, target: &PropertyType) -> Option<Property> {
        match (self, target) {
            (Property::Int(i), PropertyType::Float) => Some(Property::Float(i as f64)),
            (value, target) if value.property_type() == *target => Some(value),
            _ => None,
        }
    }

    /// Try to get this property as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Property::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this property as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Property::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this property as a float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Property::Float(f) => Some(*f),
            Property::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this property as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this property as an actor reference
    pub fn as_actor(&self) -> Option<ActorId> {
        match self {
            Property::Actor(actor) => *actor,
            _ => None,
        }
    }

    /// Try to get this property as an enum value
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Property::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Try to get this property as a group
    pub fn as_group(&self) -> Option<&PropertySet> {
        match self {
            Property::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Try to get this property as an array
    pub fn as_array(&self) -> Option<&[Property]> {
        match self {
            Property::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the type name of this property
    pub fn type_name(&self) -> &'static str {
        match self {
            Property::Bool(_) => "bool",
            Property::Int(_) => "int",
            Property::Float(_) => "float",
            Property::String(_) => "string",
            Property::Actor(_) => "actor",
            Property::Enum(_) => "enum",
            Property::Group(_) => "group",
            Property::Array(_) => "array",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Bool(b) => write!(f, "{}", b),
            Property::Int(i) => write!(f, "{}", i),
            Property::Float(fl) => write!(f, "{}", fl),
            Property::String(s) => write!(f, "\"{}\"", s),
            Property::Actor(Some(id)) => write!(f, "{}", id),
            Property::Actor(None) => write!(f, "actor:none"),
            Property::Enum(e) => write!(f, "{}::{}", e.type_name, e.value),
            Property::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Property::Group(group) => {
                write!(f, "{{")?;
                for (i, (k, v)) in group.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Property {
    fn from(b: bool) -> Self {
        Property::Bool(b)
    }
}

impl From<i64> for Property {
    fn from(i: i64) -> Self {
        Property::Int(i)
    }
}

impl From<i32> for Property {
    fn from(i: i32) -> Self {
        Property::Int(i as i64)
    }
}

impl From<f64> for Property {
    fn from(f: f64) -> Self {
        Property::Float(f)
    }
}

impl From<f32> for Property {
    fn from(f: f32) -> Self {
        Property::Float(f as f64)
    }
}

impl From<String> for Property {
    fn from(s: String) -> Self {
        Property::String(s)
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Property::String(s.to_string())
    }
}

impl From<ActorId> for Property {
    fn from(id: ActorId) -> Self {
        Property::Actor(Some(id))
    }
}

impl From<EnumValue> for Property {
    fn from(e: EnumValue) -> Self {
        Property::Enum(e)
    }
}

impl<T: Into<Property>> From<Vec<T>> for Property {
    fn from(vec: Vec<T>) -> Self {
        Property::Array(vec.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_accessors() {
        assert_eq!(Property::Bool(true).as_bool(), Some(true));
        assert_eq!(Property::Int(42).as_int(), Some(42));
        assert_eq!(Property::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Property::Int(42).as_float(), Some(42.0));
        assert_eq!(Property::String("hello".into()).as_str(), Some("hello"));
        assert_eq!(Property::Actor(Some(ActorId(7))).as_actor(), Some(ActorId(7)));
        assert_eq!(Property::Actor(None).as_actor(), None);
        assert_eq!(Property::Bool(true).as_int(), None);
    }

    #[test]
    fn test_property_types() {
        assert_eq!(Property::Bool(false).property_type(), PropertyType::Bool);
        assert_eq!(Property::from(3i64).property_type(), PropertyType::Int);
        assert_ne!(
            Property::Int(1).property_type(),
            Property::Float(1.0).property_type()
        );

        let a = Property::Enum(EnumValue::new("Axis", "X"));
        let b = Property::Enum(EnumValue::new("Axis", "Y"));
        let c = Property::Enum(EnumValue::new("Color", "Red"));
        assert_eq!(a.property_type(), b.property_type());
        assert_ne!(a.property_type(), c.property_type());
    }

    #[test]
    fn test_coerce_to_declared_type() {
        assert_eq!(
            Property::Int(9).coerce_to(&PropertyType::Float),
            Some(Property::Float(9.0))
        );
        assert_eq!(
            Property::Bool(true).coerce_to(&PropertyType::Bool),
            Some(Property::Bool(true))
        );
        assert_eq!(Property::Float(2.5).coerce_to(&PropertyType::Int), None);
        assert_eq!(Property::Int(3).coerce_to(&PropertyType::Bool), None);
        assert_eq!(
            Property::Enum(EnumValue::new("Axis", "X")).coerce_to(&PropertyType::Enum("Color".into())),
            None
        );
    }

    #[test]
    fn test_property_display() {
        let mut group = PropertySet::new();
        group.insert("count".into(), Property::Int(2));
        group.insert("items".into(), vec![1i64, 2].into());
        assert_eq!(
            format!("{}", Property::Group(group)),
            "{count: 2, items: [1, 2]}"
        );
        assert_eq!(format!("{}", Property::Actor(None)), "actor:none");
    }
}
