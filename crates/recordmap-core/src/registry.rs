//! Symbolic kind names resolved to model definitions

use crate::error::{Error, Result};
use crate::identity::KindId;
use crate::schema::{AttributeDef, ModelDef};
use std::collections::HashMap;
use std::rc::Rc;

/// A model kind given by name or by definition
#[derive(Debug, Clone)]
pub enum KindRef {
    /// Kind looked up in the registry by id
    Name(KindId),
    /// Definition passed directly
    Def(Rc<ModelDef>),
}

impl KindRef {
    /// Canonical kind identifier
    pub fn kind_id(&self) -> &KindId {
        match self {
            KindRef::Name(id) => id,
            KindRef::Def(def) => &def.kind,
        }
    }
}

impl From<&str> for KindRef {
    fn from(s: &str) -> Self {
        KindRef::Name(KindId::new(s))
    }
}

impl From<String> for KindRef {
    fn from(s: String) -> Self {
        KindRef::Name(KindId::new(s))
    }
}

impl From<KindId> for KindRef {
    fn from(id: KindId) -> Self {
        KindRef::Name(id)
    }
}

impl From<&KindId> for KindRef {
    fn from(id: &KindId) -> Self {
        KindRef::Name(id.clone())
    }
}

impl From<Rc<ModelDef>> for KindRef {
    fn from(def: Rc<ModelDef>) -> Self {
        KindRef::Def(def)
    }
}

impl From<&Rc<ModelDef>> for KindRef {
    fn from(def: &Rc<ModelDef>) -> Self {
        KindRef::Def(Rc::clone(def))
    }
}

/// Table of model definitions by kind
#[derive(Debug, Default, Clone)]
pub struct Registry {
    defs: HashMap<KindId, Rc<ModelDef>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; kind ids are unique
    pub fn register(&mut self, def: ModelDef) -> Result<Rc<ModelDef>> {
        def.validate()?;
        if self.defs.contains_key(&def.kind) {
            return Err(Error::DuplicateDefinition(def.kind.to_string()));
        }
        let def = Rc::new(def);
        self.defs.insert(def.kind.clone(), Rc::clone(&def));
        Ok(def)
    }

    /// Builder-style [`Registry::register`]
    pub fn with(mut self, def: ModelDef) -> Result<Self> {
        self.register(def)?;
        Ok(self)
    }

    /// Resolve a kind to its registered definition
    ///
    /// A definition reference resolves to the registered definition of the
    /// same kind, so both forms share identity map entries. An unregistered
    /// definition resolves to itself.
    pub fn resolve(&self, kind: &KindRef) -> Result<Rc<ModelDef>> {
        let id = kind.kind_id();
        match (self.defs.get(id), kind) {
            (Some(def), _) => Ok(Rc::clone(def)),
            (None, KindRef::Def(def)) => Ok(Rc::clone(def)),
            (None, KindRef::Name(_)) => Err(Error::Resolution(id.to_string())),
        }
    }

    /// Get the registered definition of a kind
    pub fn get(&self, kind: &KindId) -> Option<&Rc<ModelDef>> {
        self.defs.get(kind)
    }

    /// Declared attributes of a kind, in declaration order
    pub fn definitions_of(&self, kind: impl Into<KindRef>) -> Result<&[AttributeDef]> {
        let kind = kind.into();
        self.defs
            .get(kind.kind_id())
            .map(|def| def.definitions())
            .ok_or_else(|| Error::Resolution(kind.kind_id().to_string()))
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&KindId> {
        let mut kinds: Vec<_> = self.defs.keys().collect();
        kinds.sort();
        kinds
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Check if no kind is registered
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
