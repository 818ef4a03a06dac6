use super::*;
use std::path::PathBuf;
use sw_core::{KeyspaceName, TableName};
use sw_db::{Catalog, DuckDbBackend, Session, VersionStore};

fn migration(name: &str, content: &str) -> Migration {
    Migration::new(PathBuf::from(format!("/project/migrations/{name}")), content).unwrap()
}

fn migrations() -> Vec<Migration> {
    vec![
        migration("v1_users.sql", "CREATE TABLE users (id INT, name VARCHAR);"),
        migration(
            "v2_orders.sql",
            "-- orders\nCREATE TABLE orders (id INT, user_id INT);\nINSERT INTO orders VALUES (1, 1);",
        ),
        migration("v3_audit.sql", "CREATE TABLE audit (entry VARCHAR);"),
    ]
}

fn version_table() -> VersionTable {
    VersionTable::new(KeyspaceName::new("app"), TableName::new("database_migrations"))
}

fn states(db: &DuckDbBackend) -> Vec<(i32, MigrationState)> {
    db.read_versions(&version_table())
        .unwrap()
        .iter()
        .map(|r| (r.version, r.state))
        .collect()
}

fn has_table(db: &DuckDbBackend, name: &str) -> bool {
    db.query_count(&format!(
        "SELECT * FROM information_schema.tables WHERE table_schema = 'app' AND table_name = '{name}'"
    ))
    .unwrap()
        > 0
}

#[test]
fn test_migrate_fresh_database() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    let applied = migrator.migrate(None, false).unwrap();

    assert_eq!(
        applied.iter().map(|a| a.version).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(applied.iter().all(|a| a.state == MigrationState::Succeeded));
    assert_eq!(
        states(&db),
        vec![
            (1, MigrationState::Succeeded),
            (2, MigrationState::Succeeded),
            (3, MigrationState::Succeeded),
        ]
    );
    assert!(has_table(&db, "users"));
    assert_eq!(db.query_count("SELECT * FROM app.orders").unwrap(), 1);
}

#[test]
fn test_migrate_is_noop_when_up_to_date() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    migrator.migrate(None, false).unwrap();
    assert!(migrator.migrate(None, false).unwrap().is_empty());
    assert_eq!(states(&db).len(), 3);
}

#[test]
fn test_migrate_to_target_then_rest() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    let first = migrator.migrate(Some("1"), false).unwrap();
    assert_eq!(first.len(), 1);
    assert!(has_table(&db, "users"));
    assert!(!has_table(&db, "orders"));

    let rest = migrator.migrate(None, false).unwrap();
    assert_eq!(
        rest.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
        vec!["v2_orders.sql", "v3_audit.sql"]
    );
}

#[test]
fn test_migrate_rejects_invalid_target() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    for target in ["0", "4", "v1_users.sql"] {
        let err = migrator.migrate(Some(target), false).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidTargetVersion { .. }));
    }
    assert!(states(&db).is_empty());
}

#[test]
fn test_failing_statement_stops_and_records_failure() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = vec![
        migration("v1_users.sql", "CREATE TABLE users (id INT);"),
        migration(
            "v2_broken.sql",
            "CREATE TABLE a (id INT); SELEC broken; CREATE TABLE b (id INT);",
        ),
        migration("v3_audit.sql", "CREATE TABLE audit (entry VARCHAR);"),
    ];
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    let err = migrator.migrate(None, false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "[M001] Migration failed, cannot continue (version 2): v2_broken.sql"
    );
    assert_eq!(
        states(&db),
        vec![(1, MigrationState::Succeeded), (2, MigrationState::Failed)]
    );
    assert!(has_table(&db, "a"));
    assert!(!has_table(&db, "b"));
    assert!(!has_table(&db, "audit"));

    // Without force the failed record blocks every later run
    let err = migrator.migrate(None, false).unwrap_err();
    assert!(matches!(err, MigrationError::FailedMigration { version: 2, .. }));
}

#[test]
fn test_force_retries_failed_version() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let broken = vec![
        migration("v1_users.sql", "CREATE TABLE users (id INT);"),
        migration("v2_orders.sql", "CREATE TABLE orders (id INTEGR);"),
    ];
    Migrator::new(&db, version_table(), &profile, &broken)
        .migrate(None, false)
        .unwrap_err();

    let fixed = vec![
        migration("v1_users.sql", "CREATE TABLE users (id INT);"),
        migration("v2_orders.sql", "CREATE TABLE orders (id INTEGER);"),
    ];
    let migrator = Migrator::new(&db, version_table(), &profile, &fixed);
    let applied = migrator.migrate(None, true).unwrap();

    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].version, 2);
    let stored = db.read_versions(&version_table()).unwrap();
    assert_eq!(stored[1].state, MigrationState::Succeeded);
    assert_eq!(stored[1].content, "CREATE TABLE orders (id INTEGER);");
}

#[test]
fn test_force_without_failure_is_plain_migrate() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    assert_eq!(migrator.migrate(None, true).unwrap().len(), 3);
    assert!(migrator.migrate(None, true).unwrap().is_empty());
}

#[test]
fn test_force_does_not_override_in_progress() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let table = version_table();
    db.create_keyspace(&table.keyspace, &profile).unwrap();
    db.create_version_table(&table).unwrap();
    db.try_insert(&table, &VersionRecord::claim(1, &local[0]))
        .unwrap();

    let migrator = Migrator::new(&db, table, &profile, &local);
    let err = migrator.migrate(None, true).unwrap_err();
    assert!(matches!(
        err,
        MigrationError::ConcurrentMigration { version: 1, .. }
    ));
    assert!(!has_table(&db, "users"));
}

#[test]
fn test_apply_migration_rejects_occupied_slot() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let table = version_table();
    db.create_keyspace(&table.keyspace, &profile).unwrap();
    db.create_version_table(&table).unwrap();
    db.use_keyspace(&table.keyspace).unwrap();
    db.try_insert(&table, &VersionRecord::claim(1, &local[0]))
        .unwrap();

    let migrator = Migrator::new(&db, table, &profile, &local);
    let err = migrator.apply_migration(1, &local[0], false).unwrap_err();

    assert!(matches!(err, MigrationError::ConcurrentMigration { .. }));
    assert!(!has_table(&db, "users"));
    assert_eq!(states(&db), vec![(1, MigrationState::InProgress)]);
}

#[test]
fn test_baseline_requires_keyspace() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    let err = migrator.baseline(None).unwrap_err();
    assert!(matches!(err, MigrationError::KeyspaceMissing { .. }));
    assert!(!db.keyspace_exists(&KeyspaceName::new("app")).unwrap());
}

#[test]
fn test_baseline_skips_without_running() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    db.create_keyspace(&KeyspaceName::new("app"), &profile)
        .unwrap();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    let applied = migrator.baseline(Some("2")).unwrap();
    assert!(applied.iter().all(|a| a.state == MigrationState::Skipped));
    assert_eq!(
        states(&db),
        vec![(1, MigrationState::Skipped), (2, MigrationState::Skipped)]
    );
    assert!(!has_table(&db, "users"));

    // A later migrate only runs what was not baselined
    let applied = migrator.migrate(None, false).unwrap();
    assert_eq!(applied.len(), 1);
    assert!(has_table(&db, "audit"));
    assert!(!has_table(&db, "orders"));
}

#[test]
fn test_baseline_is_idempotent() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);
    migrator.migrate(None, false).unwrap();
    let before = db.read_versions(&version_table()).unwrap();

    assert!(migrator.baseline(None).unwrap().is_empty());
    assert!(migrator.baseline(Some("2")).unwrap().is_empty());
    assert_eq!(db.read_versions(&version_table()).unwrap(), before);
}

#[test]
fn test_reset_rebuilds_keyspace() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);
    migrator.migrate(None, false).unwrap();
    db.execute("INSERT INTO app.users VALUES (1, 'ada')").unwrap();
    let old_ids: Vec<_> = db
        .read_versions(&version_table())
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();

    let applied = migrator.reset(Some("2")).unwrap();

    assert_eq!(applied.len(), 2);
    assert_eq!(db.query_count("SELECT * FROM app.users").unwrap(), 0);
    assert!(!has_table(&db, "audit"));
    let stored = db.read_versions(&version_table()).unwrap();
    assert!(stored.iter().all(|r| !old_ids.contains(&r.id)));
}

#[test]
fn test_reset_with_invalid_target_keeps_data() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);
    migrator.migrate(None, false).unwrap();

    assert!(migrator.reset(Some("9")).is_err());
    assert!(has_table(&db, "users"));
    assert_eq!(states(&db).len(), 3);
}

#[test]
fn test_status_never_creates_anything() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    assert!(matches!(
        migrator.status().unwrap(),
        StatusReport::KeyspaceMissing { .. }
    ));
    assert!(!db.keyspace_exists(&KeyspaceName::new("app")).unwrap());

    db.create_keyspace(&KeyspaceName::new("app"), &profile)
        .unwrap();
    assert!(matches!(
        migrator.status().unwrap(),
        StatusReport::TableMissing { .. }
    ));
    assert!(!db.table_exists(&version_table()).unwrap());
}

#[test]
fn test_status_reports_confirmed_and_pending() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let migrator = Migrator::new(&db, version_table(), &profile, &local);
    migrator.migrate(Some("1"), false).unwrap();

    let StatusReport::Ready(summary) = migrator.status().unwrap() else {
        panic!("expected a ready report");
    };
    assert_eq!(summary.current_version, Some(1));
    assert_eq!(summary.latest_version, 3);
    assert_eq!(summary.applied.len(), 1);
    assert!(!summary.is_up_to_date());
    assert_eq!(
        summary
            .pending
            .iter()
            .map(|p| (p.version, p.name.as_str()))
            .collect::<Vec<_>>(),
        vec![(2, "v2_orders.sql"), (3, "v3_audit.sql")]
    );
    assert_eq!(summary.pending[0].checksum, local[1].checksum().to_hex());
}

#[test]
fn test_status_tolerates_failed_and_in_progress() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = migrations();
    let table = version_table();
    db.create_keyspace(&table.keyspace, &profile).unwrap();
    db.create_version_table(&table).unwrap();
    db.try_insert(&table, &VersionRecord::claim(1, &local[0]))
        .unwrap();

    let migrator = Migrator::new(&db, table, &profile, &local);
    let StatusReport::Ready(summary) = migrator.status().unwrap() else {
        panic!("expected a ready report");
    };
    assert_eq!(summary.current_version, None);
    assert_eq!(summary.applied[0].state, MigrationState::InProgress);
    assert_eq!(summary.pending.len(), 3);
}

#[test]
fn test_executable_migration_runs_registered_script() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = vec![
        migration("v1_users.sql", "CREATE TABLE users (id INT);"),
        migration("v2_seed.rs", "pub fn execute(..) {}"),
    ];
    let mut scripts = ScriptRegistry::new();
    scripts.register("v2_seed", |session| {
        session.execute("INSERT INTO users VALUES (1), (2)")?;
        Ok(())
    });

    let migrator = Migrator::new(&db, version_table(), &profile, &local).with_scripts(&scripts);
    migrator.migrate(None, false).unwrap();

    assert_eq!(db.query_count("SELECT * FROM app.users").unwrap(), 2);
    assert_eq!(states(&db)[1], (2, MigrationState::Succeeded));
}

#[test]
fn test_executable_migration_without_script_fails() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = vec![migration("v1_seed.rs", "pub fn execute(..) {}")];
    let migrator = Migrator::new(&db, version_table(), &profile, &local);

    let err = migrator.migrate(None, false).unwrap_err();
    assert!(matches!(err, MigrationError::FailedMigration { version: 1, .. }));
    assert_eq!(states(&db), vec![(1, MigrationState::Failed)]);
}

#[test]
fn test_script_error_is_recorded_as_failure() {
    let db = DuckDbBackend::in_memory().unwrap();
    let profile = Profile::default();
    let local = vec![migration("v1_seed.rs", "pub fn execute(..) {}")];
    let mut scripts = ScriptRegistry::new();
    scripts.register("v1_seed.rs", |_| {
        Err(ScriptError::Failed("source data unavailable".to_string()))
    });

    let migrator = Migrator::new(&db, version_table(), &profile, &local).with_scripts(&scripts);
    assert!(migrator.migrate(None, false).is_err());
    assert_eq!(states(&db), vec![(1, MigrationState::Failed)]);
}
