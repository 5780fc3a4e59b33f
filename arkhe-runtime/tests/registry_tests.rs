use arkhe_model::{Entity, EntityRef, ValueKind};
use arkhe_runtime::{EntityRegistry, PolicyKind, RegistryConfig, RuntimeError};
use pretty_assertions::assert_eq;

fn planet(name: &str, population: f64) -> Entity {
    Entity::builder(format!("Planet_{name}"), ValueKind::Vector)
        .scalar("name", name)
        .scalar("population", population)
        .build()
        .unwrap()
}

// ── Registration ─────────────────────────────────────────────────

#[test]
fn register_returns_shared_handle() {
    let mut registry = EntityRegistry::new();
    let handle = registry.register(planet("Trantor", 4.0e10)).unwrap();
    let fetched = registry.get("Planet_Trantor").unwrap();
    assert!(handle.ptr_eq(fetched));
    assert_eq!(registry.len(), 1);
}

#[test]
fn duplicate_id_rejected_by_default() {
    let mut registry = EntityRegistry::new();
    registry.register(planet("Terminus", 1.0e6)).unwrap();
    let err = registry.register(planet("Terminus", 2.0e6)).unwrap_err();
    assert!(matches!(err, RuntimeError::DuplicateId(ref id) if id.as_str() == "Planet_Terminus"));
    let kept = registry.require("Planet_Terminus").unwrap();
    assert_eq!(kept.read().quantity("population").unwrap(), 1.0e6);
}

#[test]
fn duplicate_id_replaces_when_uniqueness_disabled() {
    let mut registry = EntityRegistry::with_config(RegistryConfig {
        enforce_unique_ids: false,
    });
    registry.register(planet("Terminus", 1.0e6)).unwrap();
    registry.register(planet("Terminus", 2.0e6)).unwrap();
    assert_eq!(registry.len(), 1);
    let kept = registry.require("Planet_Terminus").unwrap();
    assert_eq!(kept.read().quantity("population").unwrap(), 2.0e6);
}

#[test]
fn registering_same_handle_twice_is_allowed() {
    let mut registry = EntityRegistry::new();
    let handle = EntityRef::new(planet("Kalgan", 1.0));
    registry.register_ref(handle.clone()).unwrap();
    registry.register_ref(handle).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn require_unknown_entity_fails() {
    let registry = EntityRegistry::new();
    let err = registry.require("Planet_Solaria").unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownEntity(ref id) if id == "Planet_Solaria"));
}

#[test]
fn ids_are_sorted() {
    let mut registry = EntityRegistry::new();
    registry.register(planet("Trantor", 1.0)).unwrap();
    registry.register(planet("Aurora", 1.0)).unwrap();
    registry.register(planet("Kalgan", 1.0)).unwrap();
    let ids: Vec<&str> = registry.ids().into_iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["Planet_Aurora", "Planet_Kalgan", "Planet_Trantor"]);
}

#[test]
fn removed_entity_outlives_registry_entry() {
    let mut registry = EntityRegistry::new();
    let handle = registry.register(planet("Siwenna", 5.0)).unwrap();
    let removed = registry.remove("Planet_Siwenna").unwrap();
    assert!(registry.is_empty());
    assert!(!registry.contains("Planet_Siwenna"));
    assert!(removed.ptr_eq(&handle));
    assert_eq!(handle.read().quantity("population").unwrap(), 5.0);
}

// ── Handovers from registered ids ────────────────────────────────

#[test]
fn handover_between_registered_entities() {
    let mut registry = EntityRegistry::new();
    registry.register(planet("Trantor", 4.0e10)).unwrap();
    registry.register(planet("Terminus", 1.0e6)).unwrap();

    let migration = registry
        .handover(
            "Migration",
            "Planet_Trantor",
            "Planet_Terminus",
            PolicyKind::Conservative,
            |src| Ok(src.quantity("population")? / 1.0e4),
            None,
        )
        .unwrap();
    assert_eq!(migration.execute().unwrap().value, 4.0e6);
    assert_eq!(migration.target().id().as_str(), "Planet_Terminus");
}

#[test]
fn handover_with_unregistered_target_fails() {
    let mut registry = EntityRegistry::new();
    registry.register(planet("Trantor", 4.0e10)).unwrap();
    let err = registry
        .handover(
            "Migration",
            "Planet_Trantor",
            "Planet_Nowhere",
            PolicyKind::Conservative,
            |_| Ok(0.0),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownEntity(_)));
}

#[test]
fn registry_handover_applies_fidelity_rules() {
    let mut registry = EntityRegistry::new();
    registry.register(planet("Trantor", 1.0)).unwrap();
    registry.register(planet("Terminus", 1.0)).unwrap();
    let err = registry
        .handover(
            "Influence",
            "Planet_Trantor",
            "Planet_Terminus",
            PolicyKind::Transmutative,
            |_| Ok(0.9),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, RuntimeError::MissingFidelity { .. }));
}
