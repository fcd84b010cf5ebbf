//! Issue Tracker Example
//!
//! Demonstrates recordmap with issue-tracker payloads. A canned API stands in
//! for the HTTP layer; every listing is turned into identity-mapped models, so
//! an item fetched twice (or a person embedded in several items) is a single
//! instance.
//!
//! Run with `RUST_LOG=recordmap=debug` to watch cache hits and misses.

use recordmap_core::{payload_from_json, Client, ModelRef, ValueMap};
use recordmap_script::{load_config_str, Loader};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Canned responses in place of the HTTP endpoints
struct CannedApi;

impl CannedApi {
    fn get_items(&self, product_id: i64) -> Vec<ValueMap> {
        vec![
            payload_from_json(json!({
                "number": 1,
                "product": { "id": product_id, "name": "Widgets" },
                "created_by": { "id": 10, "first_name": "Ada", "last_name": "Lovelace" },
                "title": "Widgets wobble",
                "type": "defect",
                "status": "backlog",
                "score": "M",
                "tags": ["ui"],
                "created_at": "2013-06-14T22:52:07+00:00",
                "last_modified": "2013-06-14T22:52:07+00:00",
                "email": { "discussion": "item-1@example.com" },
            })),
            payload_from_json(json!({
                "number": 2,
                "product": { "id": product_id },
                "created_by": { "id": 11, "first_name": "Grace", "last_name": "Hopper" },
                "assigned_to": { "id": 10 },
                "title": "Widgets need polish",
                "type": "story",
                "status": "in-progress",
                "created_at": "2013-06-15T08:00:00+00:00",
            })),
        ]
    }

    fn get_child_items(&self, product_id: i64, number: i64) -> Vec<ValueMap> {
        vec![payload_from_json(json!({
            "number": number * 100,
            "product": { "id": product_id },
            "created_by": { "id": 11 },
            "parent": number,
            "title": "Wobble sub-task",
            "type": "task",
            "status": "backlog",
        }))]
    }
}

/// Child items of `item`, resolved through the client that produced it
fn children(api: &CannedApi, item: &ModelRef) -> recordmap_core::Result<Vec<ModelRef>> {
    let (Some(client), Some(product), Some(number)) = (
        item.client(),
        item.get_model("product"),
        item.get_int("number"),
    ) else {
        return Ok(Vec::new());
    };
    let product_id = product.get_int("id").unwrap_or_default();
    client.model_all("Item", &api.get_child_items(product_id, number))
}

/// Full name of a person, skipping absent parts
fn person_name(person: &ModelRef) -> String {
    ["first_name", "last_name"]
        .iter()
        .filter_map(|field| person.get_str(field))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Address for one part of an item, e.g. `"discussion"` or `"files"`
fn email_for(item: &ModelRef, task: &str) -> Option<String> {
    item.get("email")?
        .as_value()?
        .as_map()?
        .get(task)?
        .as_str()
        .map(str::to_string)
}

fn load_client() -> recordmap_script::Result<Client> {
    let mut loader = Loader::new();
    loader.load_models_str(include_str!("../defs/models.ron"))?;
    let config = load_config_str(include_str!("../defs/client.ron"))?;
    Ok(Client::with_config(loader.finish(), config))
}

fn describe(item: &ModelRef) -> String {
    let assignee = item
        .get_model("assigned_to")
        .map(|p| person_name(&p))
        .unwrap_or_else(|| "nobody".to_string());
    format!(
        "#{} {:<22} [{}] assigned to {}",
        item.get_int("number").unwrap_or_default(),
        item.get_str("title").unwrap_or_default(),
        item.get_symbol("status")
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        assignee,
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Recordmap Issue Tracker Example ===\n");

    let client = load_client()?;

    let api = CannedApi;

    let items = client.model_all("Item", &api.get_items(1))?;
    println!("Fetched {} items:", items.len());
    for item in &items {
        println!("  {}", describe(item));
    }

    // The assignee of #2 is the author of #1
    let ada = items[0].get_model("created_by");
    let assignee = items[1].get_model("assigned_to");
    println!(
        "\nAuthor of #1 is the assignee of #2: {}",
        matches!((&ada, &assignee), (Some(a), Some(b)) if a.ptr_eq(b))
    );
    if let Some(address) = email_for(&items[0], "discussion") {
        println!("Discuss #1 at {}", address);
    }

    println!("\nRe-fetching with an updated status...");
    let mut refreshed = api.get_items(1);
    refreshed[0].insert("status".into(), "completed".into());
    // Read-only, ignored on merge
    refreshed[0].insert("created_at".into(), "2020-01-01T00:00:00+00:00".into());
    let again = client.model_all("Item", &refreshed)?;

    println!("  same instance: {}", again[0].ptr_eq(&items[0]));
    println!("  {}", describe(&items[0]));
    if let Some(created) = items[0].get_time("created_at") {
        println!("  created_at (unchanged): {}", created.to_rfc3339());
    }

    println!("\nChildren of #1:");
    for child in children(&api, &items[0])? {
        println!("  {}", describe(&child));
    }

    println!("\nIdentity map holds {} instances", client.identity_map_len());
    client.clear_identity_map();
    let fresh = client.model_all("Item", &api.get_items(1))?;
    println!(
        "After clearing: new instance = {}, old instance still reads status = {}",
        !fresh[0].ptr_eq(&items[0]),
        items[0]
            .get_symbol("status")
            .map(|s| s.to_string())
            .unwrap_or_default(),
    );

    Ok(())
}
