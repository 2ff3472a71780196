use std::sync::Arc;

use chrono::NaiveDate;
use datagrid_core::prelude::*;
use datagrid_core::DataTablesConfig;
use datagrid_sql::{IdentifierPolicy, SqlBackend, SqlEntity, SqlQuery};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
struct Account {
    id: i64,
    name: String,
    email: String,
    active: bool,
    joined: NaiveDate,
}

impl Entity for Account {
    fn table_name() -> &'static str {
        "account"
    }

    fn register_accessors(accessors: &mut Accessors<Self>) {
        accessors
            .register("getId", |a: &Account| a.id)
            .register("getName", |a: &Account| a.name.clone())
            .register("getEmail", |a: &Account| a.email.clone())
            .register("isActive", |a: &Account| a.active)
            .register("getJoined", |a: &Account| a.joined);
    }
}

impl SqlEntity for Account {
    fn columns() -> &'static [&'static str] {
        &["id", "name", "email", "active", "joined"]
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            active: row.get("active")?,
            joined: row.get("joined")?,
        })
    }
}

type Handlers = FieldHandlers<Account, SqlQuery<Account>>;
type Table = DataTable<Account, SqlBackend<Account>>;

const SCHEMA: &str = "
CREATE TABLE account (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    active INTEGER NOT NULL,
    joined TEXT NOT NULL
);
INSERT INTO account VALUES (1, 'alice', 'alice@example.com', 1, '2024-01-15');
INSERT INTO account VALUES (2, 'bob',   'bob@example.com',   0, '2023-06-01');
INSERT INTO account VALUES (3, 'carol', 'carol@corp.io',     1, '2022-11-30');
INSERT INTO account VALUES (4, 'dave',  'dave@corp.io',      1, '2024-03-02');
INSERT INTO account VALUES (5, 'erin',  'erin@example.com',  0, '2021-08-19');
";

fn backend() -> SqlBackend<Account> {
    let backend = SqlBackend::new(rusqlite::Connection::open_in_memory().unwrap());
    backend.execute_batch(SCHEMA).unwrap();
    backend
}

fn columns(names: &[&str]) -> Vec<Column> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(i as i32, *name))
        .collect()
}

fn ids(response: &DataTablesResponse) -> Vec<i64> {
    response
        .data
        .iter()
        .map(|row| row[0].as_i64().unwrap())
        .collect()
}

#[test]
fn first_page_ordered_desc() {
    let table = DataTable::new(backend(), Handlers::builder().build());
    let params = Parameters::new(2, columns(&["id", "name", "joined"]))
        .page(0, 2)
        .order_by(1, "desc");

    let response = table.ajax_result(&params).unwrap();
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "draw": 2,
            "recordsTotal": 5,
            "recordsFiltered": 5,
            "data": [[5, "erin", "19/08/2021"], [4, "dave", "02/03/2024"]],
        })
    );
}

#[test]
fn search_handlers_become_predicates() {
    let handlers = Handlers::builder()
        .global_search(|q, term| q.add_predicate(Filter::contains("email", term)))
        .search("active", |q, term| q.add_predicate(Filter::eq("active", term == "true")))
        .build();
    let table = DataTable::new(backend(), handlers);

    let params = Parameters::new(
        1,
        vec![Column::new(0, "id"), Column::new(1, "active").with_search("true")],
    )
    .search("CORP");
    let response = table.ajax_result(&params).unwrap();
    assert_eq!(response.records_total, 5);
    assert_eq!(response.records_filtered, 2);
    assert_eq!(ids(&response), vec![3, 4]);
}

#[test]
fn raw_predicate_from_handler() {
    let handlers = Handlers::builder()
        .search("name", |q, term| {
            q.where_raw("length(\"name\") <= ?", [term.parse::<i64>().unwrap_or(0)])
        })
        .build();
    let table = DataTable::new(backend(), handlers);

    let params = Parameters::new(
        1,
        vec![Column::new(0, "id"), Column::new(1, "name").with_search("3")],
    );
    let response = table.ajax_result(&params).unwrap();
    assert_eq!(ids(&response), vec![2]);
}

#[test]
fn initial_filter_and_multi_order() {
    let handlers = Handlers::builder()
        .initial_filter(|q| q.add_predicate(Filter::eq("active", true)))
        .build();
    let table = DataTable::new(backend(), handlers);

    let params = Parameters::new(1, columns(&["id", "email"]))
        .order_by(1, "desc")
        .order_by(0, "asc");
    let response = table.ajax_result(&params).unwrap();
    assert_eq!(response.records_total, 3);
    assert_eq!(ids(&response), vec![4, 3, 1]);
}

#[test]
fn offset_without_limit() {
    let table = DataTable::new(backend(), Handlers::builder().build());
    let params = Parameters::new(1, columns(&["id"])).page(3, -1).order_by(0, "asc");

    let response = table.ajax_result(&params).unwrap();
    assert_eq!(ids(&response), vec![4, 5]);
    assert_eq!(response.records_filtered, 5);
}

#[test]
fn max_page_length_applies_to_sql() {
    let config = DataTablesConfig {
        max_page_length: Some(2),
        ..DataTablesConfig::default()
    };
    let table = DataTable::new(backend(), Handlers::builder().build()).with_config(config);

    let response = table
        .ajax_result(&Parameters::new(1, columns(&["id"])).order_by(0, "asc"))
        .unwrap();
    assert_eq!(ids(&response), vec![1, 2]);
}

#[test]
fn hostile_column_name_is_rejected() {
    let table = DataTable::new(backend(), Handlers::builder().build());
    let params =
        Parameters::new(1, columns(&["id", "name; DROP TABLE account"])).order_by(1, "asc");

    let err = table.ajax_result(&params).unwrap_err();
    assert!(matches!(err, DataTableError::Backend(_)));
    assert!(!err.is_client_error());

    // The table is still there.
    let response = table.ajax_result(&Parameters::new(1, columns(&["id"]))).unwrap();
    assert_eq!(response.records_total, 5);
}

#[test]
fn validate_policy_leaves_identifiers_bare() {
    let table = DataTable::new(
        backend().identifier_policy(IdentifierPolicy::Validate),
        Handlers::builder().build(),
    );
    let response = table
        .ajax_result(&Parameters::new(1, columns(&["id"])).order_by(0, "desc").page(0, 1))
        .unwrap();
    assert_eq!(ids(&response), vec![5]);
}

#[test]
fn paged_list_maps_rows() {
    let table = DataTable::new(backend(), Handlers::builder().build());
    let page = table
        .paged_list(&Parameters::new(1, columns(&["id"])).page(0, 1).order_by(0, "asc"))
        .unwrap();
    assert_eq!(page.filtered_count, 5);
    assert_eq!(
        page.items,
        vec![Account {
            id: 1,
            name: "alice".into(),
            email: "alice@example.com".into(),
            active: true,
            joined: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }]
    );
}

#[tokio::test]
async fn async_request_on_shared_connection() {
    let backend = backend();
    let table: Arc<Table> = Arc::new(DataTable::new(backend.clone(), Handlers::builder().build()));

    backend
        .execute_batch("INSERT INTO account VALUES (6, 'frank', 'frank@corp.io', 1, '2020-02-02');")
        .unwrap();

    let future = table
        .ajax_request_async(
            br#"{
                "draw": 3,
                "columns": [{"data": 0, "name": "id"}],
                "order": [{"column": 0, "dir": "desc"}],
                "length": 1
            }"#,
        )
        .unwrap();
    let response = future.await.unwrap();
    assert_eq!(response.records_total, 6);
    assert_eq!(ids(&response), vec![6]);
}

#[test]
fn file_database_shared_between_backends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.db");
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch(SCHEMA)
        .unwrap();

    let shared =
        SqlBackend::<Account>::new(rusqlite::Connection::open(&path).unwrap()).connection();
    let table = DataTable::new(
        SqlBackend::from_shared(shared.clone()),
        Handlers::builder().build(),
    );
    let other: SqlBackend<Account> = SqlBackend::from_shared(shared);
    other
        .execute_batch("DELETE FROM account WHERE active = 0;")
        .unwrap();

    let response = table.ajax_result(&Parameters::new(1, columns(&["id"]))).unwrap();
    assert_eq!(response.records_total, 3);
}

// ── Backend agreement ───────────────────────────────────────────────────

fn memory_accounts() -> Vec<Account> {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    let mut stmt = conn.prepare("SELECT * FROM account ORDER BY id").unwrap();
    let rows = stmt.query_map([], |row| Account::from_row(row)).unwrap();
    rows.collect::<rusqlite::Result<Vec<_>>>().unwrap()
}

fn count_with<B: QueryBackend>(backend: &B, filter: Filter) -> u64 {
    let mut query = backend.new_query();
    query.add_predicate(filter);
    query.count().unwrap()
}

#[test]
fn like_filters_agree_across_backends() {
    let sql = backend();
    let memory = datagrid_core::MemoryBackend::new(memory_accounts());

    let cases = [
        (Filter::like("name", "A%"), 0),
        (Filter::like("name", "a%"), 1),
        (Filter::like("name", "_a%"), 2),
        (Filter::like("email", "%@corp.io"), 2),
        (Filter::like("email", "%@CORP.IO"), 0),
        (Filter::ilike("email", "%@CORP.IO"), 2),
        (Filter::like("name", "%*%"), 0),
    ];
    for (filter, expected) in cases {
        assert_eq!(count_with(&sql, filter.clone()), expected, "sqlite {filter:?}");
        assert_eq!(count_with(&memory, filter.clone()), expected, "memory {filter:?}");
    }
}
