//! Round trips against real databases.
//!
//! Run with: DDL_MIGRATE_TEST_CONFIG=pg.yaml cargo test --package ddl-migrate -- live --ignored
//!
//! The config file uses the normal YAML format; `database.type` picks the
//! backend. Tables are named `ddl_live_*` and dropped at the end.

use crate::config::Config;
use crate::core::schema::{Table, TableAttribute, TableAttributeType};
use crate::core::traits::SchemaConnection;
use crate::drivers::ConnectionImpl;
use crate::error::MigrateError;
use crate::executor::{FailureKind, MigrationExecutor, MigrationStep, StepOutcome};

fn config() -> Config {
    let path = std::env::var("DDL_MIGRATE_TEST_CONFIG")
        .expect("DDL_MIGRATE_TEST_CONFIG must point to a config file");
    Config::load(path).expect("Failed to load config")
}

fn steps() -> Vec<MigrationStep> {
    let parent = Table::builder("ddl_live_parent")
        .attribute(TableAttribute::new("pk", TableAttributeType::Int).primary_key())
        .attribute(TableAttribute::with_length("code", TableAttributeType::Varchar, 20))
        .build()
        .unwrap();
    let child = Table::builder("ddl_live_child")
        .attribute(TableAttribute::new("pk", TableAttributeType::Long).primary_key())
        .attribute(TableAttribute::decimal("money", 8, 2).not_null())
        .attribute(TableAttribute::new("created", TableAttributeType::Timestamp))
        .attribute(
            TableAttribute::new("address_fk", TableAttributeType::Int)
                .references("ddl_live_parent", "pk"),
        )
        .build()
        .unwrap();

    vec![
        MigrationStep::CreateTable { table: parent },
        MigrationStep::CreateTable { table: child },
        MigrationStep::AddColumns {
            table: "ddl_live_child".into(),
            attributes: vec![
                TableAttribute::new("parent_fk", TableAttributeType::Int)
                    .references("ddl_live_parent", "pk"),
                TableAttribute::new("active", TableAttributeType::Boolean),
            ],
        },
        MigrationStep::AddUniqueConstraint {
            table: "ddl_live_parent".into(),
            name: "ddl_live_parent_code_key".into(),
            columns: vec!["code".into()],
        },
    ]
}

fn drops() -> Vec<MigrationStep> {
    vec![
        MigrationStep::DropColumn {
            table: "ddl_live_child".into(),
            column: "active".into(),
        },
        MigrationStep::DropTable {
            table: "ddl_live_child".into(),
        },
        MigrationStep::DropTable {
            table: "ddl_live_parent".into(),
        },
    ]
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn live_apply_is_idempotent() {
    let config = config();
    let mut options = config.migration.clone();
    options.constraint_policy = crate::config::ConstraintPolicy::SkipExisting;
    let executor = MigrationExecutor::from_config(&config)
        .unwrap()
        .with_options(options);

    let conn = ConnectionImpl::connect(&config.database).await.unwrap();
    let first = executor.run(conn, &steps()).await.unwrap();
    println!("{}", first.ddl());
    assert!(first.is_success(), "{:#?}", first.steps);
    assert_eq!(first.applied(), 4);
    assert!(first.steps[1]
        .ddl
        .contains("FOREIGN KEY (address_fk) REFERENCES ddl_live_parent(pk)"));

    let conn = ConnectionImpl::connect(&config.database).await.unwrap();
    let second = executor.run(conn, &steps()).await.unwrap();
    assert!(second.is_success(), "{:#?}", second.steps);
    assert_eq!(second.skipped(), 4);

    let conn = ConnectionImpl::connect(&config.database).await.unwrap();
    let cleanup = executor.run(conn, &drops()).await.unwrap();
    assert!(cleanup.is_success(), "{:#?}", cleanup.steps);
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn live_drop_refuses_non_empty_table() {
    let config = config();
    let executor = MigrationExecutor::from_config(&config).unwrap();
    let table = Table::builder("ddl_live_rows")
        .attribute(TableAttribute::new("pk", TableAttributeType::Int).primary_key())
        .attribute(TableAttribute::new("n", TableAttributeType::Int))
        .build()
        .unwrap();

    let conn = ConnectionImpl::connect(&config.database).await.unwrap();
    let created = executor
        .run(conn, &[MigrationStep::CreateTable { table }])
        .await
        .unwrap();
    assert!(created.is_success(), "{:#?}", created.steps);

    let conn = ConnectionImpl::connect(&config.database).await.unwrap();
    conn.execute("INSERT INTO ddl_live_rows (pk, n) VALUES (1, 1)")
        .await
        .unwrap();
    let drop = [MigrationStep::DropTable {
        table: "ddl_live_rows".into(),
    }];
    let report = executor.run(conn, &drop).await.unwrap();
    assert!(matches!(
        report.steps[0].outcome,
        StepOutcome::Failed {
            kind: FailureKind::SchemaConflict,
            ..
        }
    ));

    let conn = ConnectionImpl::connect(&config.database).await.unwrap();
    assert_eq!(
        conn.query_count("SELECT COUNT(*) FROM ddl_live_rows", &[])
            .await
            .unwrap(),
        1
    );
    conn.execute("DELETE FROM ddl_live_rows").await.unwrap();
    let report = executor.run(conn, &drop).await.unwrap();
    assert!(report.is_success(), "{:#?}", report.steps);
}

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn live_calls_after_close_fail() {
    let config = config();
    let conn = ConnectionImpl::connect(&config.database).await.unwrap();
    conn.ping().await.unwrap();

    conn.close().await;
    let err = conn.execute("SELECT 1").await.unwrap_err();
    assert!(matches!(err, MigrateError::Execution { .. }));
    assert!(conn.ping().await.is_err());
}
