use super::*;
use crate::compiler::PostgresCompiler;
use crate::state::Payload;
use crate::test_support::RecordingExecutor;
use crate::values;
use serde_json::json;

fn builder() -> QueryBuilder<PostgresCompiler, RecordingExecutor> {
    QueryBuilder::new(Arc::new(PostgresCompiler), Arc::new(RecordingExecutor::default()))
}

#[test]
fn projection_with_equality() {
    let q = builder()
        .table("users")
        .select(["id", "name"])
        .where_eq("id", 7i32)
        .compile()
        .unwrap();
    assert_eq!(q.sql, "SELECT id, name FROM users WHERE id = $1");
    assert_eq!(q.params, values![7i32]);
}

#[test]
fn in_list_with_order_and_limit() {
    let q = builder()
        .table("users")
        .where_in("status", ["active", "pending"])
        .order_by("created_at", SortDirection::Desc)
        .limit(10)
        .compile()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM users WHERE status IN ($1, $2) ORDER BY created_at DESC LIMIT 10"
    );
    assert_eq!(q.params, values!["active", "pending"]);
}

#[test]
fn update_with_predicate() {
    let q = builder()
        .table("users")
        .update(Payload::new().set("name", "X"))
        .where_eq("id", 1i32)
        .compile()
        .unwrap();
    assert_eq!(q.sql, "UPDATE users SET name = $1 WHERE id = $2");
    assert_eq!(q.params, values!["X", 1i32]);
}

#[test]
fn delete_without_predicate_is_rejected() {
    let err = builder().table("users").delete().to_sql().unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn update_without_predicate_is_rejected() {
    let err = builder()
        .table("users")
        .update([("name", "X")])
        .compile()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: UPDATE requires at least one WHERE condition"
    );
}

#[test]
fn missing_table_is_rejected() {
    let err = builder().select(["id"]).compile().unwrap_err();
    assert_eq!(err.to_string(), "Validation error: table is required");
}

#[test]
fn empty_table_name_is_rejected_at_compile_time() {
    // Setting an empty name is accepted; compiling is not.
    let qb = builder().table("");
    assert_eq!(qb.state().table(), "");
    assert!(qb.compile().unwrap_err().is_validation());
}

#[test]
fn insert_with_empty_payload_is_rejected() {
    let err = builder().table("users").insert(Payload::new()).compile().unwrap_err();
    assert!(err.to_string().contains("INSERT requires a non-empty payload"));
}

#[test]
fn empty_in_list_matches_nothing() {
    let q = builder()
        .table("users")
        .where_in("id", Vec::<i64>::new())
        .where_eq("active", true)
        .compile()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM users WHERE (1=0) AND (active = $1)");
    assert_eq!(q.params, values![true]);
}

#[test]
fn raw_fragments_share_numbering() {
    let q = builder()
        .table("events")
        .where_raw("kind = ? OR kind = ?", ["login", "logout"])
        .where_eq("user_id", 42i64)
        .where_raw("created_at > now() - interval '1 day'", values![])
        .where_raw("score BETWEEN ? AND ?", values![1i32, 9i32])
        .compile()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM events WHERE (kind = $1 OR kind = $2) AND (user_id = $3) \
         AND (created_at > now() - interval '1 day') AND (score BETWEEN $4 AND $5)"
    );
    assert_eq!(q.params, values!["login", "logout", 42i64, 1i32, 9i32]);
}

#[test]
fn delete_scoped_by_tenant_keeps_or_grouped() {
    let q = builder()
        .table("docs")
        .where_raw("owner = ? OR shared = ?", values![1i64, true])
        .where_eq("tenant_id", 5i64)
        .delete()
        .compile()
        .unwrap();
    assert_eq!(
        q.sql,
        "DELETE FROM docs WHERE (owner = $1 OR shared = $2) AND (tenant_id = $3)"
    );
    assert_eq!(q.params, values![1i64, true, 5i64]);
}

#[test]
fn update_scoped_by_tenant_keeps_or_grouped() {
    let sql = builder()
        .table("docs")
        .update([("archived", true)])
        .where_eq("tenant_id", 5i64)
        .where_raw("owner = ? OR shared = ?", values![1i64, true])
        .to_sql()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE docs SET archived = $1 WHERE (tenant_id = $2) AND (owner = $3 OR shared = $4)"
    );
}

#[test]
fn raw_fragment_count_mismatch_fails_fast() {
    let err = builder()
        .table("users")
        .where_raw("a = ? AND b = ?", values![1i32])
        .compile()
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn owned_column_names_are_accepted() {
    let alias = "u";
    let q = builder()
        .table(format!("users {alias}"))
        .where_eq(format!("{alias}.id"), 3i64)
        .where_in(String::from("u.status"), ["active"])
        .where_raw(format!("{alias}.deleted_at IS NULL"), values![])
        .order_by(format!("{alias}.id"), SortDirection::Asc)
        .compile()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM users u WHERE (u.id = $1) AND (u.status IN ($2)) \
         AND (u.deleted_at IS NULL) ORDER BY u.id ASC"
    );
}

#[test]
fn limit_and_offset_last_write_wins() {
    let sql = builder()
        .table("users")
        .limit(5)
        .offset(1)
        .limit(20)
        .offset(40)
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM users LIMIT 20 OFFSET 40");
}

#[test]
fn projection_accumulates() {
    let sql = builder()
        .table("users")
        .select(["id"])
        .column("name")
        .select(vec!["email".to_string()])
        .to_sql()
        .unwrap();
    assert_eq!(sql, "SELECT id, name, email FROM users");
}

#[test]
fn table_overwrites() {
    let sql = builder().table("a").table("b").to_sql().unwrap();
    assert_eq!(sql, "SELECT * FROM b");
}

#[test]
fn last_statement_kind_wins() {
    let q = builder()
        .table("users")
        .update([("name", "X")])
        .insert([("name", "Y")])
        .compile()
        .unwrap();
    assert_eq!(q.sql, "INSERT INTO users (name) VALUES ($1)");
    assert_eq!(q.params, values!["Y"]);
}

#[test]
fn compile_is_repeatable() {
    let qb = builder()
        .table("users")
        .where_in("id", [1i64, 2, 3])
        .order_by_asc("id");
    assert_eq!(qb.compile().unwrap(), qb.compile().unwrap());
}

#[test]
fn clone_does_not_share_state() {
    let original = builder().table("users").where_eq("id", 1i32);
    let before = original.compile().unwrap();

    let clone = original
        .clone()
        .select(["name"])
        .where_eq("active", true)
        .order_by_desc("id")
        .limit(1);

    assert_eq!(original.compile().unwrap(), before);
    assert_eq!(
        clone.to_sql().unwrap(),
        "SELECT name FROM users WHERE (id = $1) AND (active = $2) ORDER BY id DESC LIMIT 1"
    );

    // And the other direction.
    let original = original.table("accounts");
    assert_eq!(clone.state().table(), "users");
    assert_eq!(original.state().table(), "accounts");
}

#[test]
fn clone_shares_executor() {
    let qb = builder();
    let clone = qb.clone();
    assert!(Arc::ptr_eq(qb.executor(), clone.executor()));
    assert!(Arc::ptr_eq(qb.compiler(), clone.compiler()));
}

#[tokio::test]
async fn execute_hands_compiled_pair_to_executor() {
    let exec = Arc::new(RecordingExecutor::returning(vec![json!({"id": 7})]));
    let qb = QueryBuilder::new(Arc::new(PostgresCompiler), Arc::clone(&exec))
        .table("users")
        .where_eq("id", 7i32);

    let rows = qb.execute().await.unwrap();

    assert_eq!(rows, vec![json!({"id": 7})]);
    assert_eq!(
        exec.calls(),
        vec![("SELECT * FROM users WHERE id = $1".to_string(), values![7i32])]
    );
}

#[tokio::test]
async fn validation_failure_never_reaches_executor() {
    let exec = Arc::new(RecordingExecutor::default());
    let qb = QueryBuilder::new(Arc::new(PostgresCompiler), Arc::clone(&exec))
        .table("users")
        .delete();

    let err = qb.execute().await.unwrap_err();

    assert!(err.is_validation());
    assert!(exec.calls().is_empty());
}

#[tokio::test]
async fn executor_failure_is_wrapped_with_statement() {
    let exec = Arc::new(RecordingExecutor::failing("duplicate key"));
    let qb = QueryBuilder::new(Arc::new(PostgresCompiler), exec)
        .table("users")
        .insert([("email", "a@example.com")]);

    let err = qb.execute().await.unwrap_err();

    assert!(err.is_execution());
    assert_eq!(err.failed_sql(), Some("INSERT INTO users (email) VALUES ($1)"));
}

#[tokio::test]
async fn fetch_opt_returns_first_row() {
    let exec = Arc::new(RecordingExecutor::returning(vec![json!(1), json!(2)]));
    let qb = QueryBuilder::new(Arc::new(PostgresCompiler), exec).table("t");
    assert_eq!(qb.fetch_opt().await.unwrap(), Some(json!(1)));
}
