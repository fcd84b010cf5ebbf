//! Identity map behavior observed through `Client::model`

use recordmap_core::{payload, Client, Error, IdentityRule, ModelDef, Registry, Value};
use std::rc::Rc;

fn fixtures() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            ModelDef::new("Simple")
                .attr("name")
                .and_then(|d| d.read_only("token"))
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            ModelDef::new("Complex")
                .attr("message")
                .unwrap()
                .with_identity(IdentityRule::fields(["one", "two"])),
        )
        .unwrap();
    registry
        .register(ModelDef::new("Disabled").attr("name").unwrap().without_identity_map())
        .unwrap();
    registry
}

fn client() -> Client {
    Client::new(fixtures())
}

#[test]
fn test_allows_creation_of_new_models() {
    let client = client();
    let model = client.model("Simple", &payload! { "id" => 123, "name" => "Hi" }).unwrap();
    assert_eq!(model.get_str("name").as_deref(), Some("Hi"));
    assert_eq!(model.get_int("id"), Some(123));
}

#[test]
fn test_rejects_nil_identity() {
    let client = client();
    let err = client.model("Simple", &payload! {}).unwrap_err();
    assert!(err.to_string().contains("identity cannot be nil"));

    let err = client.model("Simple", &payload! { "id" => Value::Null }).unwrap_err();
    assert!(matches!(err, Error::Identity { .. }));
    assert_eq!(client.identity_map_len(), 0);
}

#[test]
fn test_rejects_partial_composite_identity() {
    let client = client();
    let err = client.model("Complex", &payload! { "one" => 123 }).unwrap_err();
    assert!(err.to_string().contains("identity cannot be nil"));
    assert_eq!(client.identity_map_len(), 0);
}

#[test]
fn test_clearing_the_map_yields_new_instances() {
    let client = client();
    let old = client.model("Simple", &payload! { "id" => 123, "name" => "Hi" }).unwrap();

    client.clear_identity_map();
    assert_eq!(client.identity_map_len(), 0);

    let new = client.model("Simple", &payload! { "id" => 123, "name" => "Other" }).unwrap();
    assert!(!new.ptr_eq(&old));
    assert_eq!(old.get_str("name").as_deref(), Some("Hi"));
    assert_eq!(new.get_str("name").as_deref(), Some("Other"));
}

#[test]
fn test_handles_complex_identities() {
    let client = client();
    let new = client.model("Complex", &payload! { "one" => 1, "two" => 2 }).unwrap();
    let updated = client
        .model("Complex", &payload! { "one" => 1, "two" => 2, "message" => "stuff" })
        .unwrap();

    assert!(updated.ptr_eq(&new));
    assert_eq!(new.get_str("message").as_deref(), Some("stuff"));

    let swapped = client.model("Complex", &payload! { "one" => 2, "two" => 1 }).unwrap();
    assert!(!swapped.ptr_eq(&new));
}

#[test]
fn test_looks_up_by_definition_or_name() {
    let registry = fixtures();
    let simple = Rc::clone(registry.get(&"Simple".into()).unwrap());
    let client = Client::new(registry);

    let new = client.model(&simple, &payload! { "id" => 27 }).unwrap();
    let updated = client.model("Simple", &payload! { "id" => 27, "name" => "stuff" }).unwrap();

    assert!(updated.ptr_eq(&new));
    assert_eq!(new.get_str("name").as_deref(), Some("stuff"));
}

#[test]
fn test_unregistered_definition_is_usable_directly() {
    let client = client();
    let adhoc = Rc::new(ModelDef::new("Adhoc").attr("name").unwrap());

    let a = client.model(&adhoc, &payload! { "id" => 1, "name" => "x" }).unwrap();
    let b = client.model(&adhoc, &payload! { "id" => 1 }).unwrap();
    assert!(a.ptr_eq(&b));
    assert!(client.model("Adhoc", &payload! { "id" => 1 }).is_err());
}

#[test]
fn test_disabled_kinds_bypass_the_map() {
    let client = client();
    let a = client.model("Disabled", &payload! { "name" => "Ohai" }).unwrap();
    let b = client.model("Disabled", &payload! { "name" => "Ohai" }).unwrap();

    assert_eq!(a.get_str("name").as_deref(), Some("Ohai"));
    assert!(!a.ptr_eq(&b));
}

mod with_existing_model {
    use super::*;
    use recordmap_core::ModelRef;

    fn existing(client: &Client) -> ModelRef {
        client
            .model("Simple", &payload! { "id" => 123, "name" => "Hi", "token" => "orig" })
            .unwrap()
    }

    #[test]
    fn test_preserves_identity() {
        let client = client();
        let existing = existing(&client);
        let updated = client.model("Simple", &payload! { "id" => 123, "name" => "Hi" }).unwrap();
        assert!(updated.ptr_eq(&existing));
    }

    #[test]
    fn test_updates_existing_attributes() {
        let client = client();
        let existing = existing(&client);
        let holder = existing.clone();

        client.model("Simple", &payload! { "id" => 123, "name" => "Bye" }).unwrap();

        assert_eq!(existing.get_str("name").as_deref(), Some("Bye"));
        assert_eq!(holder.get_str("name").as_deref(), Some("Bye"));
    }

    #[test]
    fn test_keeps_missing_attributes() {
        let client = client();
        let existing = existing(&client);

        client.model("Simple", &payload! { "id" => 123 }).unwrap();

        assert_eq!(existing.get_str("name").as_deref(), Some("Hi"));
    }

    #[test]
    fn test_inserts_new_attributes() {
        let client = client();
        let existing = existing(&client);
        assert!(existing.get("other").is_none());

        client.model("Simple", &payload! { "id" => 123, "other" => "stuff" }).unwrap();

        assert_eq!(existing.get_str("other").as_deref(), Some("stuff"));
    }

    #[test]
    fn test_protects_read_only_attributes() {
        let client = client();
        let existing = existing(&client);

        client
            .model("Simple", &payload! { "id" => 123, "token" => "changed", "name" => "Bye" })
            .unwrap();

        assert_eq!(existing.get_str("token").as_deref(), Some("orig"));
        assert_eq!(existing.get_str("name").as_deref(), Some("Bye"));
    }

    #[test]
    fn test_null_is_stored_for_mutable_attributes() {
        let client = client();
        let existing = existing(&client);

        client.model("Simple", &payload! { "id" => 123, "name" => Value::Null }).unwrap();

        assert!(existing.get("name").is_none());
        assert!(!existing.has("name"));
    }
}
