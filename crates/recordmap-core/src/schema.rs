//! Attribute schemas declared per model kind

use crate::error::{Error, Result};
use crate::identity::{IdentityRule, KindId};
use serde::{Deserialize, Serialize};

/// Declared conversion applied to a raw payload value on write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coercion {
    /// Enumerated token, e.g. `"backlog"`
    Symbol,
    /// Timestamp from RFC 3339 text or Unix seconds
    Time,
    /// Integer from an int or numeric text
    Integer,
    /// Float from a number or numeric text
    Float,
    /// Boolean from a bool or `"true"`/`"false"`
    Boolean,
    /// Text from a string or a scalar's display form
    Text,
    /// Nested record resolved through the client under this kind
    Model(KindId),
    /// Every element coerced with the inner tag
    List(Box<Coercion>),
}

impl Coercion {
    /// Nested model coercion for `kind`
    pub fn model(kind: impl Into<KindId>) -> Self {
        Coercion::Model(kind.into())
    }

    /// List coercion with `inner` applied to each element
    pub fn list(inner: Coercion) -> Self {
        Coercion::List(Box::new(inner))
    }

    /// Name used in coercion error messages
    pub fn describe(&self) -> String {
        match self {
            Coercion::Symbol => "symbol".to_string(),
            Coercion::Time => "time".to_string(),
            Coercion::Integer => "integer".to_string(),
            Coercion::Float => "float".to_string(),
            Coercion::Boolean => "boolean".to_string(),
            Coercion::Text => "text".to_string(),
            Coercion::Model(kind) => format!("{} payload", kind),
            Coercion::List(inner) => format!("list of {}", inner.describe()),
        }
    }
}

/// Definition of one attribute on a model kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute (payload field) name
    pub name: String,
    /// Conversion applied on write; `None` stores the raw value
    #[serde(default)]
    pub coercion: Option<Coercion>,
    /// Only settable while the attribute holds no value
    #[serde(default)]
    pub read_only: bool,
}

impl AttributeDef {
    /// Create an uncoerced, writable attribute
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coercion: None,
            read_only: false,
        }
    }

    /// Set the coercion type
    pub fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }

    /// Make this attribute read-only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// Definition of a model kind: its attributes and identity policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDef {
    /// Canonical kind identifier
    pub kind: KindId,
    /// Declared attributes, in declaration order
    #[serde(default)]
    attributes: Vec<AttributeDef>,
    /// How the identity is derived from a payload
    #[serde(default)]
    pub identity: IdentityRule,
    /// Whether instances of this kind go through the identity map
    #[serde(default = "default_identity_map")]
    pub identity_map: bool,
    /// Drop undeclared payload fields instead of storing them
    #[serde(default)]
    pub strict: bool,
}

fn default_identity_map() -> bool {
    true
}

impl ModelDef {
    /// Create a definition with no attributes and the default `id` identity
    pub fn new(kind: impl Into<KindId>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
            identity: IdentityRule::default(),
            identity_map: true,
            strict: false,
        }
    }

    /// Register an attribute definition
    ///
    /// Attribute names are unique within a kind.
    pub fn define(mut self, attribute: AttributeDef) -> Result<Self> {
        if self.attribute(&attribute.name).is_some() {
            return Err(Error::DuplicateAttribute {
                kind: self.kind.to_string(),
                name: attribute.name,
            });
        }
        self.attributes.push(attribute);
        Ok(self)
    }

    /// Declare an uncoerced, writable attribute
    pub fn attr(self, name: impl Into<String>) -> Result<Self> {
        self.define(AttributeDef::new(name))
    }

    /// Declare a coerced, writable attribute
    pub fn typed(self, name: impl Into<String>, coercion: Coercion) -> Result<Self> {
        self.define(AttributeDef::new(name).with_coercion(coercion))
    }

    /// Declare an uncoerced, read-only attribute
    pub fn read_only(self, name: impl Into<String>) -> Result<Self> {
        self.define(AttributeDef::new(name).read_only())
    }

    /// Declare a coerced, read-only attribute
    pub fn read_only_typed(self, name: impl Into<String>, coercion: Coercion) -> Result<Self> {
        self.define(AttributeDef::new(name).with_coercion(coercion).read_only())
    }

    /// Set the identity rule
    pub fn with_identity(mut self, identity: IdentityRule) -> Self {
        self.identity = identity;
        self
    }

    /// Opt this kind out of the identity map
    pub fn without_identity_map(mut self) -> Self {
        self.identity_map = false;
        self
    }

    /// Restrict instances to declared attributes
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Declared attributes, in declaration order
    pub fn definitions(&self) -> &[AttributeDef] {
        &self.attributes
    }

    /// Look up an attribute definition by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check declared attribute names for duplicates
    ///
    /// Needed for definitions built through deserialization, which bypass
    /// [`ModelDef::define`].
    pub fn validate(&self) -> Result<()> {
        for (i, attribute) in self.attributes.iter().enumerate() {
            if self.attributes[..i].iter().any(|a| a.name == attribute.name) {
                return Err(Error::DuplicateAttribute {
                    kind: self.kind.to_string(),
                    name: attribute.name.clone(),
                });
            }
        }
        Ok(())
    }
}
