//! Client session: turns payloads into identity-mapped model instances
//!
//! The [`Client`] owns the [`Registry`] of model definitions and exactly one
//! [`IdentityMap`]. [`Client::model`] is the single entry point through which
//! instances are created and updated:
//!
//! ```text
//! payload ─► resolve kind ─► identity ─► identity map ─┬─ miss: create, register
//!                                                       └─ hit:  merge in place
//! ```
//!
//! Nested model attributes recurse into [`Client::model`], so a person
//! embedded in an item is the same instance as that person fetched directly.

use crate::attr::{coerce_scalar, Attr};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::identity::{Identity, IdentityRule, KindId};
use crate::identity_map::{IdentityMap, Lookup};
use crate::instance::{ModelInstance, ModelRef};
use crate::registry::{KindRef, Registry};
use crate::schema::{Coercion, ModelDef};
use crate::value::{Value, ValueMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// State shared between a client and the instances it produced
pub(crate) struct Session {
    registry: Registry,
    config: ClientConfig,
    identity_map: RefCell<IdentityMap>,
}

/// Handle to a client session
///
/// Cloning the handle shares the session. Instances keep a weak reference
/// back to it, reachable through [`ModelRef::client`].
///
/// Nested model attributes hold strong handles. Records that reference each
/// other (directly or through a chain) keep one another alive after the map
/// is cleared and the client dropped.
#[derive(Clone)]
pub struct Client {
    session: Rc<Session>,
}

impl Client {
    /// Create a client with the default configuration
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, ClientConfig::default())
    }

    /// Create a client with an explicit configuration
    pub fn with_config(registry: Registry, config: ClientConfig) -> Self {
        Self {
            session: Rc::new(Session {
                registry,
                config,
                identity_map: RefCell::new(IdentityMap::new()),
            }),
        }
    }

    pub(crate) fn from_session(session: Rc<Session>) -> Self {
        Self { session }
    }

    /// Definitions this client resolves kinds against
    pub fn registry(&self) -> &Registry {
        &self.session.registry
    }

    /// Session-wide configuration
    pub fn config(&self) -> &ClientConfig {
        &self.session.config
    }

    /// Check whether two handles share a session
    pub fn same_session(&self, other: &Client) -> bool {
        Rc::ptr_eq(&self.session, &other.session)
    }

    /// Convert a payload into the model instance for its record
    ///
    /// For identity-mapped kinds, equal identities yield the same instance
    /// until [`Client::clear_identity_map`]; a repeated payload is merged into
    /// it. Other kinds get a fresh instance on every call.
    pub fn model(&self, kind: impl Into<KindRef>, payload: &ValueMap) -> Result<ModelRef> {
        let def = self.session.registry.resolve(&kind.into())?;

        if !self.uses_identity_map(&def) {
            let instance = self.build(&def, None);
            self.merge(&def, &instance, payload)?;
            return Ok(instance);
        }

        let identity = def.identity.identity_of(&def.kind, payload)?;
        let (instance, lookup) = self
            .session
            .identity_map
            .borrow_mut()
            .lookup_or_insert(&def.kind, &identity, || {
                self.build(&def, Some(identity.clone()))
            });

        if let Err(err) = self.merge(&def, &instance, payload) {
            if lookup == Lookup::Created {
                self.session
                    .identity_map
                    .borrow_mut()
                    .remove(&def.kind, &identity);
            }
            return Err(err);
        }

        if lookup == Lookup::Created {
            tracing::debug!(
                target: "recordmap::client",
                kind = %def.kind,
                %identity,
                "registered new instance"
            );
        }
        Ok(instance)
    }

    /// Convert a sequence of payloads, stopping at the first error
    pub fn model_all<'a, I>(&self, kind: impl Into<KindRef>, payloads: I) -> Result<Vec<ModelRef>>
    where
        I: IntoIterator<Item = &'a ValueMap>,
    {
        let kind = kind.into();
        payloads
            .into_iter()
            .map(|payload| self.model(kind.clone(), payload))
            .collect()
    }

    /// Look up a live instance without touching it
    pub fn cached(&self, kind: impl Into<KindRef>, identity: &Identity) -> Result<Option<ModelRef>> {
        let def = self.session.registry.resolve(&kind.into())?;
        Ok(self
            .session
            .identity_map
            .borrow()
            .get(&def.kind, identity)
            .cloned())
    }

    /// Forget every cached instance
    ///
    /// Handles obtained earlier stay readable but are no longer returned.
    /// Instances nothing else references are freed.
    pub fn clear_identity_map(&self) {
        self.session.identity_map.borrow_mut().clear();
    }

    /// Number of instances currently in the identity map
    pub fn identity_map_len(&self) -> usize {
        self.session.identity_map.borrow().len()
    }

    fn uses_identity_map(&self, def: &ModelDef) -> bool {
        def.identity_map && self.session.config.identity_map()
    }

    fn build(&self, def: &Rc<ModelDef>, identity: Option<Identity>) -> ModelRef {
        ModelRef::new(ModelInstance::new(
            Rc::clone(def),
            identity,
            Rc::downgrade(&self.session),
        ))
    }

    /// Merge `payload` into `instance`
    ///
    /// Every field is coerced before anything is written, so a failure leaves
    /// the instance untouched. Absent fields are kept; populated read-only
    /// attributes are skipped before coercion.
    fn merge(&self, def: &ModelDef, instance: &ModelRef, payload: &ValueMap) -> Result<()> {
        let strict = def.strict || self.session.config.strict_attributes();
        let mut writes = Vec::with_capacity(payload.len());

        for (name, raw) in payload {
            let Some(attribute) = def.attribute(name) else {
                if !strict {
                    writes.push((name.clone(), Attr::Value(raw.clone())));
                }
                continue;
            };

            if attribute.read_only && instance.is_populated(name) {
                tracing::debug!(
                    target: "recordmap::client",
                    kind = %def.kind,
                    attribute = %name,
                    "ignoring write to populated read-only attribute"
                );
                continue;
            }

            let value = match &attribute.coercion {
                Some(coercion) => self.coerce(def, name, coercion, raw)?,
                None => Attr::Value(raw.clone()),
            };
            writes.push((name.clone(), value));
        }

        instance.apply(writes);
        Ok(())
    }

    fn coerce(&self, def: &ModelDef, attribute: &str, coercion: &Coercion, raw: &Value) -> Result<Attr> {
        if raw.is_null() {
            return Ok(Attr::Value(Value::Null));
        }

        match (coercion, raw) {
            (Coercion::Model(kind), Value::Map(nested)) => self.model(kind, nested).map(Attr::Model),
            (Coercion::Model(kind), Value::Int(_) | Value::String(_) | Value::Bool(_)) => {
                match self.identity_fragment(kind, raw)? {
                    Some(nested) => self.model(kind, &nested).map(Attr::Model),
                    None => Err(coercion_error(def, attribute, coercion, raw)),
                }
            }
            (Coercion::List(inner), Value::List(items)) => items
                .iter()
                .map(|item| self.coerce(def, attribute, inner, item))
                .collect::<Result<Vec<_>>>()
                .map(Attr::List),
            (Coercion::Model(_) | Coercion::List(_), _) => {
                Err(coercion_error(def, attribute, coercion, raw))
            }
            (scalar, _) => {
                coerce_scalar(scalar, raw).ok_or_else(|| coercion_error(def, attribute, coercion, raw))
            }
        }
    }

    /// Expand a bare identity value into a payload for `kind`
    ///
    /// Only kinds identified by one top-level field accept a bare value.
    fn identity_fragment(&self, kind: &KindId, raw: &Value) -> Result<Option<ValueMap>> {
        let def = self.session.registry.resolve(&KindRef::from(kind))?;
        match &def.identity {
            IdentityRule::Fields(paths) if paths.len() == 1 && !paths[0].contains('.') => {
                let mut payload = ValueMap::new();
                payload.insert(paths[0].clone(), raw.clone());
                Ok(Some(payload))
            }
            _ => Ok(None),
        }
    }
}

fn coercion_error(def: &ModelDef, attribute: &str, coercion: &Coercion, raw: &Value) -> Error {
    Error::Coercion {
        kind: def.kind.to_string(),
        attribute: attribute.to_string(),
        expected: coercion.describe(),
        got: format!("{} {}", raw.type_name(), raw),
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("kinds", &self.session.registry.kinds())
            .field("config", &self.session.config)
            .field("identity_map_len", &self.identity_map_len())
            .finish()
    }
}
