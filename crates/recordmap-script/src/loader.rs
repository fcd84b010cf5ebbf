//! RON definition loader

use crate::error::{Error, Result};
use recordmap_core::{ClientConfig, ModelDef, Registry};
use std::fs;
use std::path::Path;

/// Loader for RON model definitions
///
/// Collects definitions from strings, files and directories into a
/// [`Registry`]. Kind ids must be unique across everything loaded.
pub struct Loader {
    registry: Registry,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    /// Load a `(models: [...])` file from a RON string
    pub fn load_models_str(&mut self, content: &str) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct ModelFile {
            models: Vec<ModelDef>,
        }

        let file: ModelFile = ron::from_str(content)?;
        for def in file.models {
            self.register(def)?;
        }
        Ok(())
    }

    /// Load a single model definition from a RON string
    pub fn load_model_str(&mut self, content: &str) -> Result<()> {
        let def: ModelDef = ron::from_str(content)?;
        self.register(def)
    }

    /// Load a single RON file, either a model list or one definition
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        tracing::debug!(target: "recordmap::script", path = %path.display(), "loading definitions");

        if content.contains("models:") {
            return self.load_models_str(&content);
        }
        self.load_model_str(&content).map_err(|err| match err {
            Error::Ron(e) => Error::InvalidSchema(format!(
                "{}: not a model list or model definition ({})",
                path.display(),
                e
            )),
            other => other,
        })
    }

    /// Load all RON files from a directory, recursively
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        // Sorted so duplicate errors name the same file on every platform
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.is_dir() {
                self.load_directory(&file_path)?;
            } else if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the registry
    pub fn finish(self) -> Registry {
        self.registry
    }

    /// Get the current registry (for inspection during loading)
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn register(&mut self, def: ModelDef) -> Result<()> {
        match self.registry.register(def) {
            Ok(_) => Ok(()),
            Err(recordmap_core::Error::DuplicateDefinition(kind)) => {
                Err(Error::DuplicateDefinition(kind))
            }
            Err(other) => Err(other.into()),
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a client configuration from a RON string
pub fn load_config_str(content: &str) -> Result<ClientConfig> {
    Ok(ron::from_str(content)?)
}

/// Read a client configuration file
pub fn load_config_file(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let content = fs::read_to_string(path)?;
    load_config_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordmap_core::{Coercion, IdentityRule, KindId};

    #[test]
    fn test_load_models() {
        let content = r#"
        (
            models: [
                (
                    kind: "Item",
                    identity: Fields(["product.id", "number"]),
                    attributes: [
                        (name: "number", read_only: true),
                        (name: "product", coercion: Some(Model("Product")), read_only: true),
                        (name: "status", coercion: Some(Symbol)),
                        (name: "title"),
                    ],
                ),
                (
                    kind: "Product",
                    attributes: [(name: "name")],
                ),
            ]
        )
        "#;

        let mut loader = Loader::new();
        loader.load_models_str(content).unwrap();

        let registry = loader.finish();
        let item = registry.get(&KindId::new("Item")).unwrap();
        assert_eq!(item.definitions().len(), 4);
        assert!(item.attribute("number").unwrap().read_only);
        assert_eq!(
            item.attribute("product").unwrap().coercion,
            Some(Coercion::model("Product"))
        );
        assert!(matches!(&item.identity, IdentityRule::Fields(p) if p.len() == 2));

        let product = registry.get(&KindId::new("Product")).unwrap();
        assert!(product.identity_map);
        assert!(matches!(&product.identity, IdentityRule::Fields(p) if p == &["id"]));
    }

    #[test]
    fn test_load_single_model() {
        let content = r#"
        (
            kind: "Disabled",
            identity_map: false,
            attributes: [(name: "name")],
        )
        "#;

        let mut loader = Loader::new();
        loader.load_model_str(content).unwrap();

        let disabled = loader.registry().get(&KindId::new("Disabled")).unwrap();
        assert!(!disabled.identity_map);
        assert!(!disabled.strict);
    }

    #[test]
    fn test_duplicate_kind() {
        let mut loader = Loader::new();
        loader.load_model_str(r#"(kind: "Person")"#).unwrap();
        let err = loader.load_model_str(r#"(kind: "Person")"#).unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(ref k) if k == "Person"));
    }

    #[test]
    fn test_duplicate_attribute() {
        let mut loader = Loader::new();
        let err = loader
            .load_model_str(r#"(kind: "Person", attributes: [(name: "email"), (name: "email")])"#)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Core(recordmap_core::Error::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn test_load_config() {
        let config = load_config_str("(identity_map: false)").unwrap();
        assert!(!config.identity_map());
        assert!(!config.strict_attributes());

        let config = load_config_str("(strict_attributes: true)").unwrap();
        assert!(config.identity_map());
        assert!(config.strict_attributes());
    }
}
