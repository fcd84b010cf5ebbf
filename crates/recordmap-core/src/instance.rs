//! Model instances and shared instance handles

use crate::attr::{Attr, Symbol};
use crate::client::{Client, Session};
use crate::identity::{Identity, KindId};
use crate::schema::ModelDef;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A single record: coerced attribute values plus its identity
pub struct ModelInstance {
    def: Rc<ModelDef>,
    /// Fixed at creation; `None` for kinds outside the identity map
    identity: Option<Identity>,
    attributes: IndexMap<String, Attr>,
    client: Weak<Session>,
}

impl ModelInstance {
    pub(crate) fn new(def: Rc<ModelDef>, identity: Option<Identity>, client: Weak<Session>) -> Self {
        Self {
            def,
            identity,
            attributes: IndexMap::new(),
            client,
        }
    }

    /// Kind of this instance
    pub fn kind(&self) -> &KindId {
        &self.def.kind
    }

    /// Definition this instance was built from
    pub fn def(&self) -> &ModelDef {
        &self.def
    }

    /// Identity fixed at creation
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Get a stored attribute; null values read as absent
    pub fn get(&self, name: &str) -> Option<&Attr> {
        self.attributes.get(name).filter(|a| !a.is_absent())
    }

    /// Check whether `name` holds a non-absent value
    pub fn is_populated(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stored attributes in first-write order, including nulls
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attr)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Write one attribute, honoring read-only protection
    ///
    /// Returns false when the write was ignored.
    pub(crate) fn write(&mut self, name: String, value: Attr) -> bool {
        let read_only = self.def.attribute(&name).is_some_and(|a| a.read_only);
        if read_only && self.is_populated(&name) {
            return false;
        }
        self.attributes.insert(name, value);
        true
    }
}

impl fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInstance")
            .field("kind", &self.def.kind)
            .field("identity", &self.identity)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Shared handle to a model instance
///
/// Every holder of a handle observes merges performed through the owning
/// client. Equality is reference identity.
#[derive(Clone)]
pub struct ModelRef(Rc<RefCell<ModelInstance>>);

impl ModelRef {
    pub(crate) fn new(instance: ModelInstance) -> Self {
        Self(Rc::new(RefCell::new(instance)))
    }

    /// Check whether both handles point at the same instance
    pub fn ptr_eq(&self, other: &ModelRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Run `f` with a borrow of the instance
    pub fn with<R>(&self, f: impl FnOnce(&ModelInstance) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Kind of the instance
    pub fn kind(&self) -> KindId {
        self.0.borrow().kind().clone()
    }

    /// Identity of the instance, if it is identity-mapped
    pub fn identity(&self) -> Option<Identity> {
        self.0.borrow().identity().cloned()
    }

    /// Client that produced this instance, if it is still alive
    pub fn client(&self) -> Option<Client> {
        self.0.borrow().client.upgrade().map(Client::from_session)
    }

    /// Get a copy of an attribute; null reads as absent
    pub fn get(&self, name: &str) -> Option<Attr> {
        self.0.borrow().get(name).cloned()
    }

    /// Check whether `name` holds a non-absent value
    pub fn has(&self, name: &str) -> bool {
        self.0.borrow().is_populated(name)
    }

    /// Get a text or uncoerced string attribute
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.0.borrow().get(name).and_then(Attr::as_str).map(str::to_string)
    }

    /// Get a symbol attribute
    pub fn get_symbol(&self, name: &str) -> Option<Symbol> {
        self.0.borrow().get(name).and_then(Attr::as_symbol).cloned()
    }

    /// Get a time attribute
    pub fn get_time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.0.borrow().get(name).and_then(Attr::as_time)
    }

    /// Get an integer attribute
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.0.borrow().get(name).and_then(Attr::as_int)
    }

    /// Get a numeric attribute as a float
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.0.borrow().get(name).and_then(Attr::as_float)
    }

    /// Get a boolean attribute
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.borrow().get(name).and_then(Attr::as_bool)
    }

    /// Get a nested model handle
    pub fn get_model(&self, name: &str) -> Option<ModelRef> {
        self.0.borrow().get(name).and_then(Attr::as_model).cloned()
    }

    /// Get a list attribute
    pub fn get_list(&self, name: &str) -> Option<Vec<Attr>> {
        self.0
            .borrow()
            .get(name)
            .and_then(Attr::as_list)
            .map(<[Attr]>::to_vec)
    }

    /// Names of all non-absent attributes
    pub fn attribute_names(&self) -> Vec<String> {
        self.0
            .borrow()
            .attributes()
            .filter(|(_, v)| !v.is_absent())
            .map(|(k, _)| k.to_string())
            .collect()
    }

    pub(crate) fn is_populated(&self, name: &str) -> bool {
        self.0.borrow().is_populated(name)
    }

    /// Apply already-coerced writes in order
    pub(crate) fn apply(&self, writes: Vec<(String, Attr)>) {
        let mut instance = self.0.borrow_mut();
        for (name, value) in writes {
            instance.write(name, value);
        }
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Nested models are printed by kind and identity only
        match self.0.try_borrow() {
            Ok(instance) => f
                .debug_struct("ModelRef")
                .field("kind", instance.kind())
                .field("identity", &instance.identity())
                .finish(),
            Err(_) => f.write_str("ModelRef(<borrowed>)"),
        }
    }
}
