//! Integration tests for association resolution.
//!
//! These tests verify that has-many, has-one and belongs-to lookups hit the
//! right nested URLs, that resolved associations are fetched once per
//! record, and that derived types resolve associations in their own
//! namespace.

use reactive_resource::rest::{
    AssociationKind, AssociationOptions, Params, ResourceRegistry, ResourceType,
};
use reactive_resource::{ResourceClient, ResourceConfig, ResourceError, SiteUrl};
use serde_json::{json, Map, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Registers the directory API plus a `ChildResource` namespace.
fn create_registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry
        .register(ResourceType::new("Lawyer").has_one("headshot").has_many("addresses"))
        .unwrap();
    registry
        .register(ResourceType::new("Doctor").has_one("headshot").has_many("addresses"))
        .unwrap();
    registry
        .register(
            ResourceType::new("Headshot")
                .singleton()
                .belongs_to("lawyer")
                .belongs_to("doctor"),
        )
        .unwrap();
    registry
        .register(
            ResourceType::new("Address")
                .belongs_to("lawyer")
                .belongs_to("doctor")
                .has_many("phones"),
        )
        .unwrap();
    registry
        .register(ResourceType::new("Phone").belongs_to("address"))
        .unwrap();

    registry.derive("Address", "ChildResource::Address").unwrap();
    registry.derive("Phone", "ChildResource::Phone").unwrap();
    registry
        .type_mut("ChildResource::Address")
        .unwrap()
        .declare(
            AssociationKind::BelongsTo,
            "lawyer",
            AssociationOptions::class_name("Lawyer"),
        );
    registry
}

fn create_client(server: &MockServer) -> ResourceClient {
    let config = ResourceConfig::builder()
        .site(SiteUrl::new(server.uri()).unwrap())
        .prefix("/api/1/")
        .build()
        .unwrap();
    ResourceClient::new(config, create_registry()).unwrap()
}

fn attributes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

// ============================================================================
// Has-many and Has-one
// ============================================================================

#[tokio::test]
async fn test_has_many_hits_nested_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/lawyers/1/addresses.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"address": {"id": 1}}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let mut lawyer = client
        .new_record("Lawyer", attributes(json!({"id": 1})))
        .unwrap();

    let addresses = lawyer
        .get_related(&client, "addresses")
        .await
        .unwrap()
        .as_many()
        .unwrap();

    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].resource_type(), "Address");
    assert_eq!(addresses[0].get("lawyer_id"), Some(&json!(1)));
}

#[tokio::test]
async fn test_has_one_hits_singleton_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/lawyers/1/headshot.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"headshot": {"headshot_url": "blah"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let mut lawyer = client
        .new_record("Lawyer", attributes(json!({"id": 1})))
        .unwrap();

    let headshot = lawyer
        .get_related(&client, "headshot")
        .await
        .unwrap()
        .as_one()
        .unwrap();

    assert_eq!(headshot.get("headshot_url"), Some(&json!("blah")));
}

#[tokio::test]
async fn test_has_many_requires_saved_owner() {
    let server = MockServer::start().await;
    let client = create_client(&server);
    let mut lawyer = client.new_record("Lawyer", Map::new()).unwrap();

    let result = lawyer.get_related(&client, "addresses").await;

    assert!(matches!(result, Err(ResourceError::MissingForeignKey { .. })));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_has_one_requires_singleton_target() {
    let server = MockServer::start().await;
    let mut client = create_client(&server);
    client.registry_mut().type_mut("Lawyer").unwrap().declare(
        AssociationKind::HasOne,
        "address",
        AssociationOptions::default(),
    );
    let mut lawyer = client
        .new_record("Lawyer", attributes(json!({"id": 1})))
        .unwrap();

    let result = lawyer.get_related(&client, "address").await;

    assert!(matches!(
        result,
        Err(ResourceError::PathResolutionFailed { .. })
    ));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// ============================================================================
// Belongs-to
// ============================================================================

#[tokio::test]
async fn test_belongs_to_is_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/doctors/2/addresses/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"address": {"id": "3"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let mut phone = client.new_record("Phone", Map::new()).unwrap();
    phone.set_foreign_key("doctor", 2).unwrap();
    phone.set_foreign_key("address", 3).unwrap();
    assert_eq!(phone.get_foreign_key("address").unwrap(), Some(&json!(3)));

    let first = phone.get_related(&client, "address").await.unwrap().clone();
    let second = phone.get_related(&client, "address").await.unwrap().clone();

    assert_eq!(first, second);
    let address = first.as_one().unwrap();
    assert_eq!(address.id(), Some(&json!("3")));
    assert_eq!(address.get("doctor_id"), Some(&json!(2)));
}

#[tokio::test]
async fn test_belongs_to_without_foreign_key() {
    let server = MockServer::start().await;
    let client = create_client(&server);
    let mut phone = client.new_record("Phone", Map::new()).unwrap();

    let result = phone.get_related(&client, "address").await;

    match result {
        Err(ResourceError::MissingForeignKey { foreign_key, .. }) => {
            assert_eq!(foreign_key, "address_id");
        }
        other => panic!("expected MissingForeignKey, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undeclared_association_is_rejected() {
    let server = MockServer::start().await;
    let client = create_client(&server);
    let mut phone = client.new_record("Phone", Map::new()).unwrap();

    assert!(matches!(
        phone.get_related(&client, "carrier").await,
        Err(ResourceError::UnknownAssociation { .. })
    ));
    assert!(matches!(
        phone.get_foreign_key("carrier"),
        Err(ResourceError::UnknownAssociation { .. })
    ));
}

// ============================================================================
// Caching and Reload
// ============================================================================

#[tokio::test]
async fn test_reload_clears_cached_associations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/lawyers/1.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"lawyer": {"id": 1, "name": "Ada"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1/lawyers/1/addresses.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let mut lawyer = client
        .new_record("Lawyer", attributes(json!({"id": 1, "stale": true})))
        .unwrap();

    lawyer.get_related(&client, "addresses").await.unwrap();
    lawyer.get_related(&client, "addresses").await.unwrap();
    assert!(lawyer.cached_related("addresses").is_some());

    client.reload(&mut lawyer).await.unwrap();
    assert!(lawyer.cached_related("addresses").is_none());
    assert!(lawyer.get("stale").is_none());
    assert_eq!(lawyer.get("name"), Some(&json!("Ada")));

    lawyer.get_related(&client, "addresses").await.unwrap();
}

// ============================================================================
// Derived Types
// ============================================================================

#[test]
fn test_derived_type_inherits_associations() {
    let registry = create_registry();
    let child = registry.lookup("ChildResource::Address").unwrap();

    let attributes: Vec<&str> = child
        .associations()
        .iter()
        .map(|association| association.attribute())
        .collect();
    assert_eq!(attributes, vec!["lawyer", "doctor", "phones"]);
    assert!(child
        .associations()
        .iter()
        .all(|association| association.owning_type() == "ChildResource::Address"));
}

#[test]
fn test_derived_type_prefers_sibling_in_namespace() {
    let registry = create_registry();
    let phones = registry
        .association("ChildResource::Address", "phones")
        .unwrap();

    assert_eq!(
        phones.resolved_target_type(&registry).unwrap().name(),
        "ChildResource::Phone"
    );
}

#[test]
fn test_derived_type_follows_class_name_override() {
    let registry = create_registry();
    let lawyer = registry
        .association("ChildResource::Address", "lawyer")
        .unwrap();

    assert_eq!(lawyer.resolved_target_type(&registry).unwrap().name(), "Lawyer");
}

#[tokio::test]
async fn test_derived_types_build_nested_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/lawyers/1/addresses/2/phones/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"phone": {"id": 3}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let mut params = Params::new();
    params.insert("lawyer_id".to_string(), json!(1));
    params.insert("address_id".to_string(), json!(2));

    let phone = client
        .find("ChildResource::Phone", 3, &params)
        .await
        .unwrap();

    assert_eq!(phone.resource_type(), "ChildResource::Phone");
    assert_eq!(phone.get("lawyer_id"), Some(&json!(1)));
}

#[test]
fn test_blank_singleton_id_is_omitted() {
    let registry = create_registry();
    let config = ResourceConfig::builder()
        .site(SiteUrl::new("https://api.avvo.com/").unwrap())
        .prefix("/api/1/")
        .build()
        .unwrap();
    let paths = reactive_resource::rest::ResourcePaths::new(&registry, &config);

    assert_eq!(
        paths
            .element_path("Headshot", Some(&json!("")), &Params::new())
            .unwrap(),
        "/api/1/headshot.json"
    );
}
