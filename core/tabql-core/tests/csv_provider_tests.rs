// CSV Provider Tests
//
// CsvProvider + QueryEngine: 파일을 통한 INSERT/DELETE 왕복 검증

use std::fs;
use tabql_core::{CsvProvider, ProviderError, QueryEngine, TableProvider, TabqlError, Value, row};
use tempfile::tempdir;

fn seed(dir: &std::path::Path) {
    fs::write(
        dir.join("users.csv"),
        "id,name,age\n1,Alice,30\n2,Bob,25\n3,Carol,41\n",
    )
    .unwrap();
    fs::write(
        dir.join("orders.csv"),
        "order_id,user_id,total\n10,2,9.5\n11,1,3.25\n",
    )
    .unwrap();
}

#[test]
fn select_over_csv_files() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let engine = QueryEngine::new(CsvProvider::new(dir.path()));

    let rows = engine
        .query("SELECT name FROM users WHERE age > 26 ORDER BY name DESC")
        .unwrap();
    assert_eq!(rows, vec![row! { "name" => "Carol" }, row! { "name" => "Alice" }]);

    let rows = engine
        .query(
            "SELECT users.name, orders.total FROM users \
             JOIN orders ON users.id = orders.user_id",
        )
        .unwrap();
    assert_eq!(
        rows,
        vec![
            row! { "users.name" => "Alice", "orders.total" => 3.25 },
            row! { "users.name" => "Bob", "orders.total" => 9.5 },
        ]
    );
}

#[test]
fn insert_persists_to_file() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let engine = QueryEngine::new(CsvProvider::new(dir.path()));

    let result = engine
        .execute("INSERT INTO users (id, name, age) VALUES (4, 'Dave', 52)")
        .unwrap();
    assert_eq!(result.affected(), Some(1));

    // fresh provider reads what the first one wrote
    let reopened = CsvProvider::new(dir.path());
    let table = reopened.fetch_table("users").unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(
        table.rows()[3],
        row! { "id" => 4, "name" => "Dave", "age" => 52 }
    );

    let text = fs::read_to_string(dir.path().join("users.csv")).unwrap();
    assert!(text.starts_with("id,name,age\n"));
    assert!(text.contains("4,Dave,52"));
}

#[test]
fn insert_with_missing_columns_writes_nulls() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let engine = QueryEngine::new(CsvProvider::new(dir.path()));

    engine
        .execute("INSERT INTO users (id, name) VALUES (5, 'Eve')")
        .unwrap();
    let rows = engine.query("SELECT name, age FROM users WHERE id = 5").unwrap();
    assert_eq!(rows, vec![row! { "name" => "Eve", "age" => Value::Null }]);
}

#[test]
fn delete_rewrites_file() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let engine = QueryEngine::new(CsvProvider::new(dir.path()));

    let result = engine.execute("DELETE FROM users WHERE age < 31").unwrap();
    assert_eq!(result.affected(), Some(2));

    let names = engine.query("SELECT name FROM users").unwrap();
    assert_eq!(names, vec![row! { "name" => "Carol" }]);

    let text = fs::read_to_string(dir.path().join("users.csv")).unwrap();
    assert!(!text.contains("Alice"));
    assert!(!text.contains("Bob"));
}

#[test]
fn delete_everything_keeps_header() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let provider = CsvProvider::new(dir.path());
    let engine = QueryEngine::new(provider.clone());

    assert_eq!(engine.execute("DELETE FROM users").unwrap().affected(), Some(3));

    let table = provider.fetch_table("users").unwrap();
    assert!(table.is_empty());
    assert_eq!(table.columns(), &["id", "name", "age"]);

    // the table is still usable
    engine
        .execute("INSERT INTO users (id, name, age) VALUES (9, 'Zed', 20)")
        .unwrap();
    assert_eq!(provider.fetch_table("users").unwrap().len(), 1);
}

#[test]
fn create_table_then_insert() {
    let dir = tempdir().unwrap();
    let provider = CsvProvider::new(dir.path().join("data"));
    provider.create_table("notes", ["id", "body"]).unwrap();

    let engine = QueryEngine::new(provider);
    engine
        .execute("INSERT INTO notes (id, body) VALUES (1, 'hello world')")
        .unwrap();
    let rows = engine.query("SELECT body FROM notes").unwrap();
    assert_eq!(rows, vec![row! { "body" => "hello world" }]);
    assert_eq!(engine.provider().table_names().unwrap(), vec!["notes"]);
}

#[test]
fn semicolon_delimited_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("t.csv"), "k;v\n1;a\n2;b\n").unwrap();
    let engine = QueryEngine::new(CsvProvider::new(dir.path()).with_delimiter(b';'));

    engine.execute("INSERT INTO t (k, v) VALUES (3, 'c')").unwrap();
    let text = fs::read_to_string(dir.path().join("t.csv")).unwrap();
    assert!(text.contains("3;c"));
    assert_eq!(engine.query("SELECT * FROM t").unwrap().len(), 3);
}

#[test]
fn rewrites_keep_existing_cell_text() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("t.csv"), "zip,price\n007,1.50\n010,2.00\n").unwrap();
    let engine = QueryEngine::new(CsvProvider::new(dir.path()));

    engine
        .execute("INSERT INTO t (zip, price) VALUES ('020', '3.25')")
        .unwrap();
    let text = fs::read_to_string(dir.path().join("t.csv")).unwrap();
    assert_eq!(text, "zip,price\n007,1.50\n010,2.00\n020,3.25\n");

    // filtering still sees numbers
    assert_eq!(engine.execute("DELETE FROM t WHERE zip = 10").unwrap().affected(), Some(1));
    let text = fs::read_to_string(dir.path().join("t.csv")).unwrap();
    assert_eq!(text, "zip,price\n007,1.50\n020,3.25\n");
}

#[test]
fn table_names_cannot_leave_the_root() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("data");
    fs::create_dir_all(&root).unwrap();
    fs::write(dir.path().join("secret.csv"), "k\n1\n").unwrap();
    let engine = QueryEngine::new(CsvProvider::new(&root));

    assert!(engine.query("SELECT * FROM ../secret").is_err());
    assert!(matches!(
        engine.provider().fetch_table("../secret").unwrap_err(),
        TabqlError::Provider(ProviderError::InvalidTableName(_))
    ));
    assert!(engine.provider().create_table("..", ["k"]).is_err());
}
