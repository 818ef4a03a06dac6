use super::*;
use chrono::TimeZone;
use tempfile::TempDir;

fn project_in(dir: &std::path::Path, extra_config: &str) -> Project {
    std::fs::write(
        dir.join("stepwise.yml"),
        format!("keyspace: app\nmigrations_path: migrations\n{extra_config}"),
    )
    .unwrap();
    Project::load(dir).unwrap()
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
}

#[test]
fn test_clean_description() {
    assert_eq!(clean_description("create users table"), "create_users_table");
    assert_eq!(clean_description("add  index -- orders!"), "add_index_orders_");
    assert_eq!(clean_description("already_clean"), "already_clean");
}

#[test]
fn test_generate_first_declarative_migration() {
    let dir = TempDir::new().unwrap();
    let project = project_in(dir.path(), "");

    let path = generate(&project, "create users", MigrationFormat::Declarative, fixed_now()).unwrap();
    assert_eq!(path, dir.path().join("migrations/v1_create_users.sql"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("/* Migration for keyspace app."));
    assert!(content.contains("Version 1 - 2024-03-01T12:30:00+00:00"));
    assert!(content.contains("create users */"));
    assert!(content.ends_with('\n'));
}

#[test]
fn test_generate_numbers_after_existing_migrations() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("migrations")).unwrap();
    std::fs::write(dir.path().join("migrations/v1_a.sql"), "SELECT 1;").unwrap();
    std::fs::write(dir.path().join("migrations/v2_b.sql"), "SELECT 2;").unwrap();
    let project = project_in(dir.path(), "");

    let path = generate(&project, "third", MigrationFormat::Declarative, fixed_now()).unwrap();
    assert_eq!(path.file_name().unwrap(), "v3_third.sql");
}

#[test]
fn test_generate_executable_migration() {
    let dir = TempDir::new().unwrap();
    let project = project_in(dir.path(), "");

    let path = generate(&project, "backfill", MigrationFormat::Executable, fixed_now()).unwrap();
    assert_eq!(path.extension().unwrap(), "rs");
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("pub fn execute(session: &dyn sw_db::Session)"));
}

#[test]
fn test_generate_uses_custom_templates() {
    let dir = TempDir::new().unwrap();
    let project = project_in(
        dir.path(),
        "new_migration_name: \"{{ next_version }}-{{ desc }}\"\nnew_migration_text: \"-- {{ keyspace }}: {{ full_desc }}\"\n",
    );

    let path = generate(&project, "Add orders", MigrationFormat::Declarative, fixed_now()).unwrap();
    assert_eq!(path.file_name().unwrap(), "1-Add_orders.sql");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "-- app: Add orders\n");
}

#[test]
fn test_generate_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let project = project_in(dir.path(), "");
    std::fs::create_dir_all(dir.path().join("migrations")).unwrap();
    std::fs::write(dir.path().join("migrations/v1_init.sql"), "keep me").unwrap();

    // The project was loaded before the file appeared, so version 1 is chosen again
    let err = generate(&project, "init", MigrationFormat::Declarative, fixed_now()).unwrap_err();
    assert!(matches!(err, CoreError::MigrationExists { .. }));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("migrations/v1_init.sql")).unwrap(),
        "keep me"
    );
}
