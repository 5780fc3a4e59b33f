use arkhe_model::{Entity, EntityRef, ValueKind};
use arkhe_runtime::{
    ConfigError, ConservationCheck, ConservativeTransfer, DEFAULT_TOLERANCE, EntityRegistry, Handover,
    RuntimeConfig, RuntimeError, TransferDirection,
};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_from_reads_file() {
    let file = write_config(
        r#"
[conservation]
tolerance = 0.5

[registry]
enforce-unique-ids = false
"#,
    );
    let config = RuntimeConfig::load_from(file.path());
    assert_eq!(config.conservation.tolerance, 0.5);
    assert!(!config.registry.enforce_unique_ids);
}

#[test]
fn load_from_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig::load_from(dir.path().join("arkhe.toml"));
    assert_eq!(config, RuntimeConfig::default());
}

#[test]
fn load_from_malformed_file_falls_back_to_defaults() {
    let file = write_config("this is = = not toml");
    let config = RuntimeConfig::load_from(file.path());
    assert_eq!(config, RuntimeConfig::default());
}

#[test]
fn read_is_strict() {
    let file = write_config("[conservation]\ntolerance = \"tight\"\n");
    assert!(matches!(RuntimeConfig::read(file.path()).unwrap_err(), ConfigError::Parse(_)));

    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        RuntimeConfig::read(dir.path().join("missing.toml")).unwrap_err(),
        ConfigError::Io(_)
    ));
}

#[test]
fn partial_file_keeps_other_defaults() {
    let file = write_config("[registry]\nenforce-unique-ids = false\n");
    let config = RuntimeConfig::load_from(file.path());
    assert_eq!(config.conservation.tolerance, 1e-9);
    assert!(!config.registry.enforce_unique_ids);
}

#[test]
fn config_drives_registry_policy() {
    let config = RuntimeConfig::parse("[registry]\nenforce-unique-ids = false\n").unwrap();
    let mut registry = EntityRegistry::with_config(config.registry);
    let entity = || {
        Entity::builder("Robot_NS2", ValueKind::Scalar)
            .scalar("brain_potential", 0.5)
            .build()
            .unwrap()
    };
    registry.register(entity()).unwrap();
    assert!(registry.register(entity()).is_ok());
}

fn reservoir(id: &str, level: f64) -> EntityRef {
    Entity::builder(id, ValueKind::Scalar)
        .scalar("level", level)
        .build()
        .unwrap()
        .into()
}

#[test]
fn config_tolerance_drives_transfer() {
    let file = write_config("[conservation]\ntolerance = 0.5\n");
    let config = RuntimeConfig::read(file.path()).unwrap();

    let transfer = ConservativeTransfer::new("level", "level", TransferDirection::SourceToTarget)
        .with_config(&config.conservation);
    assert_eq!(transfer.tolerance(), 0.5);
    assert_eq!(
        ConservativeTransfer::new("level", "level", TransferDirection::SourceToTarget).tolerance(),
        DEFAULT_TOLERANCE
    );

    let upper = reservoir("Upper", 10.0);
    let lower = reservoir("Lower", 2.0);
    let handover = Handover::conservative("Drain", &upper, &lower, |_| Ok(3.0)).unwrap();
    let outcome = handover.execute().unwrap();
    let record = transfer.apply(&handover, &outcome).unwrap();
    assert_eq!((record.after_source, record.after_target), (7.0, 5.0));
}

#[test]
fn config_tolerance_changes_verification_outcome() {
    let config = RuntimeConfig::parse("[conservation]\ntolerance = 0.5\n").unwrap();
    let upper = reservoir("Upper", 10.0);
    let lower = reservoir("Lower", 2.0);
    let handover = Handover::conservative("Seep", &upper, &lower, |_| Ok(1.0)).unwrap();
    let check = ConservationCheck::capture(&handover, "level", "level").unwrap();

    // Evaporation loses a quarter unit on the way.
    let moved = handover.execute().unwrap().value;
    upper.write().set_attribute("level", 10.0 - moved).unwrap();
    lower.write().set_attribute("level", 2.0 + moved - 0.25).unwrap();

    let strict = check.verify(&handover, DEFAULT_TOLERANCE).unwrap_err();
    assert!(matches!(strict, RuntimeError::ConservationViolated { .. }));
    assert!(check.verify(&handover, config.conservation.tolerance).is_ok());
}
