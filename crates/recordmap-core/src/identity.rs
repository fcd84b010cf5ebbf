//! Model kinds and record identities

use crate::error::{Error, Result};
use crate::value::{Value, ValueMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Canonical identifier of a model kind (e.g. `"Item"`, `"Person"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindId(pub String);

impl KindId {
    /// Create a new kind ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KindId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for KindId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One hashable component of a record identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityValue {
    /// Integer component, the usual `id`
    Int(i64),
    /// String component (slugs, oversized numeric ids)
    Str(String),
    /// Boolean component
    Bool(bool),
}

impl fmt::Display for IdentityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityValue::Int(i) => write!(f, "{}", i),
            IdentityValue::Str(s) => write!(f, "{:?}", s),
            IdentityValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Ordered identity tuple of a record within its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(Vec<IdentityValue>);

impl Identity {
    /// Create an identity from its ordered components
    pub fn new(parts: Vec<IdentityValue>) -> Self {
        Self(parts)
    }

    /// Components in declaration order
    pub fn parts(&self) -> &[IdentityValue] {
        &self.0
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no components
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, ")")
    }
}

/// Closure computing identity components from a payload
///
/// Components are returned in order; `None` (or `Some(Value::Null)`) marks a
/// missing component.
#[derive(Clone)]
pub struct IdentityFn(Rc<dyn Fn(&ValueMap) -> Vec<Option<Value>>>);

impl IdentityFn {
    /// Wrap a closure as an identity rule
    pub fn new(f: impl Fn(&ValueMap) -> Vec<Option<Value>> + 'static) -> Self {
        Self(Rc::new(f))
    }

    fn call(&self, payload: &ValueMap) -> Vec<Option<Value>> {
        (self.0)(payload)
    }
}

impl fmt::Debug for IdentityFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityFn(..)")
    }
}

/// How a kind derives its identity from a payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IdentityRule {
    /// Dot-separated field paths, one per component (`"id"`, `"product.id"`)
    Fields(Vec<String>),
    /// Identity computed in code; not expressible in RON
    #[serde(skip)]
    Custom(IdentityFn),
}

impl Default for IdentityRule {
    fn default() -> Self {
        IdentityRule::Fields(vec!["id".to_string()])
    }
}

impl IdentityRule {
    /// Single-field identity
    pub fn field(path: impl Into<String>) -> Self {
        IdentityRule::Fields(vec![path.into()])
    }

    /// Composite identity from several field paths
    pub fn fields<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdentityRule::Fields(paths.into_iter().map(Into::into).collect())
    }

    /// Identity computed by a closure
    pub fn custom(f: impl Fn(&ValueMap) -> Vec<Option<Value>> + 'static) -> Self {
        IdentityRule::Custom(IdentityFn::new(f))
    }

    /// Compute the identity of `payload` for `kind`
    ///
    /// Fails if any component is absent or null, or is not an int, string or
    /// bool.
    pub fn identity_of(&self, kind: &KindId, payload: &ValueMap) -> Result<Identity> {
        let components: Vec<(String, Option<Value>)> = match self {
            IdentityRule::Fields(paths) => paths
                .iter()
                .map(|path| (path.clone(), lookup_path(payload, path).cloned()))
                .collect(),
            IdentityRule::Custom(f) => f
                .call(payload)
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("#{}", i), v))
                .collect(),
        };

        if components.is_empty() {
            return Err(Error::Identity {
                kind: kind.to_string(),
                component: "<none>".to_string(),
            });
        }

        let mut parts = Vec::with_capacity(components.len());
        for (component, value) in components {
            let part = match value {
                None | Some(Value::Null) => {
                    return Err(Error::Identity {
                        kind: kind.to_string(),
                        component,
                    })
                }
                Some(Value::Int(i)) => IdentityValue::Int(i),
                Some(Value::String(s)) => IdentityValue::Str(s),
                Some(Value::Bool(b)) => IdentityValue::Bool(b),
                Some(other) => {
                    return Err(Error::InvalidIdentity {
                        kind: kind.to_string(),
                        component,
                        got: other.type_name().to_string(),
                    })
                }
            };
            parts.push(part);
        }

        Ok(Identity(parts))
    }
}

/// Follow a dot-separated path through nested maps
pub fn lookup_path<'a>(payload: &'a ValueMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = payload.get(segments.next()?)?;
    for segment in segments {
        current = current.as_map()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload;

    #[test]
    fn test_kind_id() {
        let id = KindId::new("Item");
        assert_eq!(id.as_str(), "Item");
        assert_eq!(format!("{}", id), "Item");
        assert_eq!(KindId::from("Item"), id);
    }

    #[test]
    fn test_default_rule_uses_id() {
        let kind = KindId::new("Simple");
        let identity = IdentityRule::default()
            .identity_of(&kind, &payload! { "id" => 123, "name" => "Hi" })
            .unwrap();
        assert_eq!(identity.parts(), &[IdentityValue::Int(123)]);
    }

    #[test]
    fn test_nested_path_identity() {
        let kind = KindId::new("Item");
        let rule = IdentityRule::fields(["product.id", "number"]);
        let identity = rule
            .identity_of(
                &kind,
                &payload! { "number" => 4, "product" => payload! { "id" => 9 } },
            )
            .unwrap();
        assert_eq!(
            identity,
            Identity::new(vec![IdentityValue::Int(9), IdentityValue::Int(4)])
        );
        assert_eq!(identity.to_string(), "(9, 4)");
    }

    #[test]
    fn test_missing_component_is_rejected() {
        let kind = KindId::new("Complex");
        let rule = IdentityRule::fields(["one", "two"]);
        let err = rule.identity_of(&kind, &payload! { "one" => 123 }).unwrap_err();
        assert!(err.to_string().contains("identity cannot be nil"));
        assert!(err.to_string().contains("two"));

        let err = rule
            .identity_of(&kind, &payload! { "one" => 1, "two" => Value::Null })
            .unwrap_err();
        assert!(matches!(err, Error::Identity { .. }));
    }

    #[test]
    fn test_missing_parent_container() {
        let kind = KindId::new("Item");
        let rule = IdentityRule::fields(["product.id", "number"]);
        assert!(rule.identity_of(&kind, &payload! { "number" => 1 }).is_err());
        assert!(rule
            .identity_of(&kind, &payload! { "number" => 1, "product" => "flat" })
            .is_err());
    }

    #[test]
    fn test_custom_rule() {
        let kind = KindId::new("Slugged");
        let rule = IdentityRule::custom(|p| {
            vec![p
                .get("slug")
                .and_then(Value::as_str)
                .map(|s| Value::from(s.to_lowercase()))]
        });

        let a = rule.identity_of(&kind, &payload! { "slug" => "ABC" }).unwrap();
        let b = rule.identity_of(&kind, &payload! { "slug" => "abc" }).unwrap();
        assert_eq!(a, b);
        assert!(rule.identity_of(&kind, &payload! {}).is_err());
    }

    #[test]
    fn test_float_component_is_invalid() {
        let kind = KindId::new("Simple");
        let err = IdentityRule::default()
            .identity_of(&kind, &payload! { "id" => 1.5 })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentity { .. }));
    }
}
