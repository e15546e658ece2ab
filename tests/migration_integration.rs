//! Integration tests for the extract, print, parse and diff pipeline.
//!
//! Every property is checked against all supported dialects.

use ddlsync::dialect::dialect;
use ddlsync::migrate::{AutoApprove, EngineConfig, MigrationEngine, Outcome, SchemaSource, Sink};
use ddlsync::schema::{DialectKind, Operation, OperationKind, Schema};
use pretty_assertions::assert_eq;

const ALL: [DialectKind; 3] = [DialectKind::Postgres, DialectKind::MySql, DialectKind::Spanner];

const BLOG: &str = r#"
#[ddl(table = "authors", index = "CREATE INDEX authors_name ON authors (name)")]
pub struct Author {
    #[pk]
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub active: bool,
}

#[ddl(
    table = "posts",
    constraint = "CONSTRAINT posts_author_fk FOREIGN KEY (author_id) REFERENCES authors (id) ON DELETE CASCADE",
    index = "CREATE INDEX posts_author ON posts (author_id, published_at DESC)"
)]
pub struct Post {
    #[pk]
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub body: Option<String>,
    pub score: f64,
    pub cover: Option<Vec<u8>>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    #[db = "-"]
    pub cached_html: String,
}

#[ddl(primary_key = "post_id, tag")]
pub struct PostTag {
    pub post_id: i64,
    pub tag: String,
}
"#;

fn engine(kind: DialectKind) -> MigrationEngine {
    MigrationEngine::new(EngineConfig::new().dialect(kind)).unwrap()
}

fn rust(source: &str) -> SchemaSource {
    SchemaSource::RustText(source.to_string())
}

/// Destination DDL in `kind`, generated from Rust declarations.
fn ddl(kind: DialectKind, source: &str) -> SchemaSource {
    SchemaSource::DdlText(engine(kind).generate(&rust(source)).unwrap())
}

fn operations(kind: DialectKind, source: &str, destination: &SchemaSource) -> Vec<Operation> {
    engine(kind)
        .diff(&rust(source), destination)
        .unwrap()
        .operations()
        .to_vec()
}

fn kinds(operations: &[Operation]) -> Vec<OperationKind> {
    operations.iter().map(Operation::kind).collect()
}

fn load(kind: DialectKind, source: &SchemaSource) -> Schema {
    engine(kind).load(source).unwrap()
}

// ==================== Round Trip Tests ====================

#[test]
fn test_print_then_parse_is_equivalent() {
    for kind in ALL {
        let d = dialect(kind);
        let model = d.canonicalize(&load(kind, &rust(BLOG))).unwrap();

        let printed = d.print_schema(&model).unwrap();
        let parsed = d.canonicalize(&d.parse(&printed).unwrap()).unwrap();

        assert!(
            parsed.equivalent(&model),
            "{} round trip changed the schema:\n{}",
            kind,
            printed
        );
        assert_eq!(parsed.len(), 3);
    }
}

#[test]
fn test_generated_script_reparses_to_same_tables() {
    for kind in ALL {
        let parsed = load(kind, &ddl(kind, BLOG));
        let names: Vec<&str> = parsed.table_names().collect();
        assert_eq!(names, vec!["authors", "posts", "post_tag"], "{}", kind);
        assert_eq!(
            parsed.table("post_tag").unwrap().primary_key_columns(),
            ["post_id".to_string(), "tag".to_string()]
        );
    }
}

// ==================== Differ Tests ====================

#[test]
fn test_identical_schemas_have_no_operations() {
    for kind in ALL {
        let ops = operations(kind, BLOG, &ddl(kind, BLOG));
        assert!(ops.is_empty(), "{}: {:?}", kind, ops);
    }
}

#[test]
fn test_extra_source_column_adds_it() {
    let before = "struct Users { #[pk] id: i64, email: String }";
    let after = "struct Users { #[pk] id: i64, email: String, nickname: Option<String> }";

    for kind in ALL {
        let ops = operations(kind, after, &ddl(kind, before));
        assert_eq!(ops.len(), 1, "{}: {:?}", kind, ops);
        match &ops[0] {
            Operation::AddColumn { table, column } => {
                assert_eq!(table, "users");
                assert_eq!(column.name, "nickname");
                assert!(column.nullable);
            }
            other => panic!("{}: unexpected {:?}", kind, other),
        }
    }
}

#[test]
fn test_destination_only_column_is_dropped() {
    let before = "struct Users { #[pk] id: i64, email: String, age: Option<i32> }";
    let after = "struct Users { #[pk] id: i64, email: String }";

    for kind in ALL {
        let ops = operations(kind, after, &ddl(kind, before));
        assert_eq!(
            ops,
            vec![Operation::DropColumn {
                table: "users".to_string(),
                column: "age".to_string(),
            }],
            "{}",
            kind
        );
    }
}

#[test]
fn test_record_against_empty_destination() {
    let record = r#"
        pub struct Record {
            #[pk]
            pub ID: i64,
            pub Email: String,
        }
    "#;

    for kind in ALL {
        let ops = operations(kind, record, &SchemaSource::DdlText(String::new()));
        assert_eq!(kinds(&ops), vec![OperationKind::CreateTable], "{}", kind);

        let Operation::CreateTable(table) = &ops[0] else {
            unreachable!()
        };
        let columns: Vec<&str> = table.columns().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["ID", "Email"]);
        assert_eq!(table.primary_key_columns(), ["ID".to_string()]);
    }
}

#[test]
fn test_removed_legacy_field_is_dropped() {
    let before = r#"
        pub struct Account {
            #[pk]
            pub id: i64,
            pub Legacy: Option<String>,
            pub email: String,
        }
    "#;
    let after = r#"
        pub struct Account {
            #[pk]
            pub id: i64,
            pub email: String,
        }
    "#;

    for kind in ALL {
        let ops = operations(kind, after, &ddl(kind, before));
        assert_eq!(
            ops,
            vec![Operation::DropColumn {
                table: "account".to_string(),
                column: "Legacy".to_string(),
            }],
            "{}",
            kind
        );
    }
}

#[test]
fn test_foreign_key_dropped_before_referenced_table() {
    let before = r#"
        #[ddl(table = "orgs")]
        struct Org { #[pk] id: i64, name: String }

        #[ddl(
            table = "users",
            constraint = "CONSTRAINT users_org_fk FOREIGN KEY (org_id) REFERENCES orgs (id)"
        )]
        struct User { #[pk] id: i64, org_id: i64 }
    "#;
    let after = r#"
        #[ddl(table = "users")]
        struct User { #[pk] id: i64, org_id: i64 }
    "#;

    for kind in ALL {
        let ops = operations(kind, after, &ddl(kind, before));
        let fk = ops
            .iter()
            .position(|op| {
                matches!(op, Operation::DropConstraint { table, constraint }
                    if table == "users" && constraint.is_foreign_key())
            })
            .unwrap_or_else(|| panic!("{}: no foreign key drop in {:?}", kind, ops));
        let table = ops
            .iter()
            .position(|op| matches!(op, Operation::DropTable { table } if table == "orgs"))
            .unwrap_or_else(|| panic!("{}: no table drop in {:?}", kind, ops));
        assert!(fk < table, "{}: {:?}", kind, ops);
    }
}

#[test]
fn test_new_tables_follow_foreign_keys() {
    for kind in ALL {
        let ops = operations(kind, BLOG, &SchemaSource::DdlText(String::new()));
        let created: Vec<&str> = ops
            .iter()
            .filter(|op| op.kind() == OperationKind::CreateTable)
            .map(Operation::table)
            .collect();
        let authors = created.iter().position(|t| *t == "authors").unwrap();
        let posts = created.iter().position(|t| *t == "posts").unwrap();
        assert!(authors < posts, "{}: {:?}", kind, created);
    }
}

#[test]
fn test_operations_converge_on_source() {
    let before = r#"
        #[ddl(table = "users", index = "CREATE INDEX users_email ON users (email)")]
        struct User { #[pk] id: i64, email: String, legacy: Option<String> }
    "#;
    let after = r#"
        #[ddl(table = "users", index = "CREATE INDEX users_email ON users (email, id)")]
        struct User { #[pk] id: i64, email: String, joined: Option<i64> }

        #[ddl(table = "sessions", constraint = "CONSTRAINT sessions_user_fk FOREIGN KEY (user_id) REFERENCES users (id)")]
        struct Session { #[pk] token: String, user_id: i64 }
    "#;

    for kind in ALL {
        let d = dialect(kind);
        let destination = load(kind, &ddl(kind, before));
        let source = load(kind, &rust(after));
        let ops = operations(kind, after, &ddl(kind, before));

        let migrated = d
            .canonicalize(&destination)
            .unwrap()
            .apply_with(&ops, d.apply_rules())
            .unwrap();
        assert!(
            migrated.equivalent(&d.canonicalize(&source).unwrap()),
            "{}: {:?}",
            kind,
            ops
        );
    }
}

#[test]
fn test_dropped_table_with_indexes_converges() {
    let before = r#"
        #[ddl(table = "users")]
        struct User { #[pk] id: i64, email: String }

        #[ddl(table = "audit", index = "CREATE INDEX audit_user ON audit (user_id)")]
        struct Audit { #[pk] id: i64, user_id: i64 }
    "#;
    let after = r#"
        #[ddl(table = "users")]
        struct User { #[pk] id: i64, email: String }
    "#;

    for kind in ALL {
        let d = dialect(kind);
        let destination = load(kind, &ddl(kind, before));
        let ops = operations(kind, after, &ddl(kind, before));
        let expected = if kind == DialectKind::Spanner {
            vec![OperationKind::DropIndex, OperationKind::DropTable]
        } else {
            vec![OperationKind::DropTable]
        };
        assert_eq!(kinds(&ops), expected, "{}", kind);

        let migrated = d
            .canonicalize(&destination)
            .unwrap()
            .apply_with(&ops, d.apply_rules())
            .unwrap();
        assert!(
            migrated.equivalent(&d.canonicalize(&load(kind, &rust(after))).unwrap()),
            "{}: {:?}",
            kind,
            ops
        );
    }
}

// ==================== Emitter Tests ====================

#[test]
fn test_apply_writes_migration_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("migration.sql");
    let before = "struct Users { #[pk] id: i64 }";
    let after = "struct Users { #[pk] id: i64, email: String }";

    for kind in ALL {
        let outcome = engine(kind)
            .apply(
                &rust(after),
                &ddl(kind, before),
                Sink::File(target.clone()),
                &mut AutoApprove,
            )
            .unwrap();
        let Outcome::Applied { script, .. } = outcome else {
            panic!("{}: migration was not applied", kind);
        };
        assert_eq!(script.statements().len(), 1);
        let written = std::fs::read_to_string(&target).unwrap();
        assert_eq!(written, script.to_string());
        assert!(written.contains("ADD"), "{}: {}", kind, written);
    }
}
