// Query Integration Tests
//
// 종단 간 통합 테스트: SQL 텍스트 → QueryEngine → MemoryProvider

use tabql_core::sql::{JoinType, SelectField};
use tabql_core::{
    EngineConfig, ExecutionError, MemoryProvider, ParseError, ProviderError, QueryEngine,
    QueryResult, Row, TableProvider, TabqlError, Value, WhereMode, parse_insert, parse_select,
    row,
};

// ─── Helpers ────────────────────────────────────────────

fn provider() -> MemoryProvider {
    let provider = MemoryProvider::new();
    provider.register_rows(
        "users",
        vec![
            row! { "id" => 1, "name" => "A", "age" => 30 },
            row! { "id" => 2, "name" => "B", "age" => 25 },
        ],
    );
    provider.register_rows(
        "emp",
        vec![
            row! { "dept" => "X", "salary" => 100 },
            row! { "dept" => "X", "salary" => 300 },
            row! { "dept" => "Y", "salary" => 250 },
        ],
    );
    provider.register_rows(
        "orders",
        vec![
            row! { "order_id" => 10, "user_id" => 2, "total" => 9.5 },
            row! { "order_id" => 11, "user_id" => 1, "total" => 3.0 },
            row! { "order_id" => 12, "user_id" => 2, "total" => 1.5 },
            row! { "order_id" => 13, "user_id" => 7, "total" => 4.0 },
        ],
    );
    provider
}

fn engine() -> QueryEngine<MemoryProvider> {
    QueryEngine::new(provider())
}

fn query(sql: &str) -> Vec<Row> {
    engine().query(sql).unwrap()
}

fn column(rows: &[Row], name: &str) -> Vec<Value> {
    rows.iter().map(|r| r.get(name).cloned().unwrap_or(Value::Null)).collect()
}

// ═══════════════════════════════════════════════════════════
// SELECT 기본
// ═══════════════════════════════════════════════════════════

#[test]
fn select_with_where_projects_named_column() {
    assert_eq!(
        query("SELECT name FROM users WHERE age > 26"),
        vec![row! { "name" => "A" }]
    );
}

#[test]
fn select_star_returns_all_columns_in_order() {
    let rows = query("SELECT * FROM users");
    assert_eq!(rows.len(), 2);
    let columns: Vec<&str> = rows[0].columns().collect();
    assert_eq!(columns, vec!["id", "name", "age"]);
}

#[test]
fn select_keywords_are_case_insensitive() {
    assert_eq!(
        query("select name from users where age > 26;"),
        vec![row! { "name" => "A" }]
    );
}

#[test]
fn like_wildcards() {
    let engine = engine();
    engine
        .execute("INSERT INTO users (id, name, age) VALUES (3, 'Anna', 19)")
        .unwrap();

    let rows = engine.query("SELECT id FROM users WHERE name LIKE 'A%'").unwrap();
    assert_eq!(column(&rows, "id"), vec![Value::Int64(1), Value::Int64(3)]);

    let rows = engine.query("SELECT id FROM users WHERE name LIKE 'A_n_'").unwrap();
    assert_eq!(column(&rows, "id"), vec![Value::Int64(3)]);

    let rows = engine.query("SELECT id FROM users WHERE name LIKE 'a%'").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn like_case_insensitive_config() {
    let engine = engine().with_config(EngineConfig::default().with_like_case_insensitive(true));
    let rows = engine.query("SELECT id FROM users WHERE name LIKE 'b'").unwrap();
    assert_eq!(column(&rows, "id"), vec![Value::Int64(2)]);
}

// ═══════════════════════════════════════════════════════════
// WHERE 불리언 의미
// ═══════════════════════════════════════════════════════════

#[test]
fn and_binds_tighter_than_or() {
    // age = 30 OR (age = 25 AND name = 'Z')
    let rows = query("SELECT name FROM users WHERE age = 30 OR age = 25 AND name = 'Z'");
    assert_eq!(rows, vec![row! { "name" => "A" }]);
}

#[test]
fn parentheses_group_predicates() {
    let rows = query("SELECT name FROM users WHERE (age = 30 OR age = 25) AND name = 'B'");
    assert_eq!(rows, vec![row! { "name" => "B" }]);
}

#[test]
fn conjunctive_mode_ands_every_comparison() {
    let engine = engine().with_config(EngineConfig::default().with_where_mode(WhereMode::Conjunctive));
    let rows = engine
        .query("SELECT name FROM users WHERE age = 30 OR age = 25")
        .unwrap();
    assert!(rows.is_empty());

    let rows = engine
        .query("SELECT name FROM users WHERE age > 20 OR name = 'B'")
        .unwrap();
    assert_eq!(rows, vec![row! { "name" => "B" }]);
}

#[test]
fn null_comparisons_are_false() {
    let engine = engine();
    engine
        .execute("INSERT INTO users (id, name) VALUES (3, 'C')")
        .unwrap();
    let rows = engine.query("SELECT id FROM users WHERE age != 30").unwrap();
    assert_eq!(column(&rows, "id"), vec![Value::Int64(2)]);
}

#[test]
fn large_integer_comparisons_are_exact() {
    // 2^53 and 2^53 + 1 collapse to the same f64
    let provider = MemoryProvider::new();
    provider.register_rows(
        "big",
        vec![
            row! { "id" => 9_007_199_254_740_992i64 },
            row! { "id" => 9_007_199_254_740_993i64 },
        ],
    );
    let engine = QueryEngine::new(provider);
    let expected = vec![row! { "id" => 9_007_199_254_740_993i64 }];

    let eq = engine.query("SELECT id FROM big WHERE id = 9007199254740993").unwrap();
    assert_eq!(eq, expected);
    let gt = engine.query("SELECT id FROM big WHERE id > 9007199254740992").unwrap();
    assert_eq!(gt, expected);
}

// ═══════════════════════════════════════════════════════════
// GROUP BY / 집계
// ═══════════════════════════════════════════════════════════

#[test]
fn group_by_counts_in_first_appearance_order() {
    let provider = MemoryProvider::new();
    provider.register_rows(
        "emp",
        vec![row! { "dept" => "X" }, row! { "dept" => "X" }, row! { "dept" => "Y" }],
    );
    let rows = QueryEngine::new(provider)
        .query("SELECT dept, COUNT(*) FROM emp GROUP BY dept")
        .unwrap();
    assert_eq!(
        rows,
        vec![
            row! { "dept" => "X", "COUNT(*)" => 2 },
            row! { "dept" => "Y", "COUNT(*)" => 1 },
        ]
    );
}

#[test]
fn aggregate_functions_over_groups() {
    let rows = query(
        "SELECT dept, SUM(salary), AVG(salary), MIN(salary), MAX(salary), MEDIAN(salary) \
         FROM emp GROUP BY dept",
    );
    assert_eq!(
        rows[0],
        row! {
            "dept" => "X",
            "SUM(salary)" => 400,
            "AVG(salary)" => 200.0,
            "MIN(salary)" => 100,
            "MAX(salary)" => 300,
            "MEDIAN(salary)" => 200.0,
        }
    );
    assert_eq!(rows[1].get("SUM(salary)"), Some(&Value::Int64(250)));
}

#[test]
fn aggregate_without_group_by_is_one_group() {
    let rows = query("SELECT COUNT(*), SUM(salary) FROM emp");
    assert_eq!(rows, vec![row! { "COUNT(*)" => 3, "SUM(salary)" => 650 }]);
}

#[test]
fn order_by_aggregate_column() {
    let rows = query("SELECT dept, COUNT(*) FROM emp GROUP BY dept ORDER BY COUNT(*) ASC");
    assert_eq!(
        column(&rows, "dept"),
        vec![Value::from("Y"), Value::from("X")]
    );
}

#[test]
fn sum_over_text_is_type_mismatch() {
    let err = engine().query("SELECT SUM(name) FROM users").unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Execution(ExecutionError::TypeMismatch { .. })
    ));
}

#[test]
fn count_field_includes_nulls() {
    let provider = MemoryProvider::new();
    provider.register_rows(
        "t",
        vec![
            row! { "g" => "a", "v" => 1 },
            row! { "g" => "a", "v" => Value::Null },
            row! { "g" => "b", "v" => Value::Null },
        ],
    );
    let rows = QueryEngine::new(provider)
        .query("SELECT g, COUNT(v), COUNT(*) FROM t GROUP BY g")
        .unwrap();
    assert_eq!(
        rows,
        vec![
            row! { "g" => "a", "COUNT(v)" => 2, "COUNT(*)" => 2 },
            row! { "g" => "b", "COUNT(v)" => 1, "COUNT(*)" => 1 },
        ]
    );
}

// ═══════════════════════════════════════════════════════════
// JOIN
// ═══════════════════════════════════════════════════════════

#[test]
fn inner_join_emits_matching_pairs_only() {
    let rows = query(
        "SELECT users.name, orders.order_id FROM users \
         INNER JOIN orders ON users.id = orders.user_id",
    );
    // driving (left) table order, then matched table order
    assert_eq!(
        rows,
        vec![
            row! { "users.name" => "A", "orders.order_id" => 11 },
            row! { "users.name" => "B", "orders.order_id" => 10 },
            row! { "users.name" => "B", "orders.order_id" => 12 },
        ]
    );
}

#[test]
fn left_join_keeps_unmatched_left_rows() {
    let provider = provider();
    provider.register_rows(
        "orders",
        vec![row! { "order_id" => 10, "user_id" => 2, "total" => 9.5 }],
    );
    let rows = QueryEngine::new(provider)
        .query("SELECT * FROM users LEFT JOIN orders ON users.id = orders.user_id")
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("users.id"), Some(&Value::Int64(1)));
    assert_eq!(rows[0].get("orders.order_id"), Some(&Value::Null));
    assert_eq!(rows[0].get("orders.total"), Some(&Value::Null));
    assert_eq!(rows[1].get("orders.total"), Some(&Value::Float64(9.5)));
}

#[test]
fn right_join_keeps_unmatched_right_rows() {
    let rows = query(
        "SELECT orders.order_id, users.name FROM users \
         RIGHT JOIN orders ON users.id = orders.user_id",
    );
    assert_eq!(
        column(&rows, "orders.order_id"),
        vec![
            Value::Int64(10),
            Value::Int64(11),
            Value::Int64(12),
            Value::Int64(13)
        ]
    );
    assert_eq!(rows[3].get("users.name"), Some(&Value::Null));
}

#[test]
fn join_resolves_unqualified_fields() {
    let rows = query(
        "SELECT name, total FROM users JOIN orders ON orders.user_id = users.id \
         WHERE total > 2 ORDER BY total DESC",
    );
    assert_eq!(
        rows,
        vec![
            row! { "name" => "B", "total" => 9.5 },
            row! { "name" => "A", "total" => 3.0 },
        ]
    );
}

#[test]
fn join_then_group_by() {
    let rows = query(
        "SELECT users.name, COUNT(*), SUM(orders.total) FROM users \
         JOIN orders ON users.id = orders.user_id GROUP BY users.name",
    );
    assert_eq!(
        rows,
        vec![
            row! { "users.name" => "A", "COUNT(*)" => 1, "SUM(orders.total)" => 3.0 },
            row! { "users.name" => "B", "COUNT(*)" => 2, "SUM(orders.total)" => 11.0 },
        ]
    );
}

#[test]
fn ambiguous_unqualified_field_after_join() {
    let provider = provider();
    provider.register_rows("pets", vec![row! { "id" => 1, "owner" => 1 }]);
    let err = QueryEngine::new(provider)
        .query("SELECT id FROM users JOIN pets ON users.id = pets.owner")
        .unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Execution(ExecutionError::AmbiguousField { .. })
    ));
}

#[test]
fn join_parses_kind_and_keys() {
    let stmt = parse_select("SELECT * FROM users LEFT OUTER JOIN orders ON orders.user_id = users.id")
        .unwrap();
    let join = stmt.join.unwrap();
    assert_eq!(join.kind, JoinType::Left);
    assert_eq!(join.table, "orders");
    assert_eq!(join.left_key.table, "users");
    assert_eq!(join.right_key.column, "user_id");
}

#[test]
fn left_join_against_empty_declared_table() {
    let provider = provider();
    provider.create_table("orders", ["order_id", "user_id", "total"]);
    let rows = QueryEngine::new(provider)
        .query(
            "SELECT users.name, orders.total FROM users \
             LEFT JOIN orders ON users.id = orders.user_id",
        )
        .unwrap();
    assert_eq!(
        rows,
        vec![
            row! { "users.name" => "A", "orders.total" => Value::Null },
            row! { "users.name" => "B", "orders.total" => Value::Null },
        ]
    );
}

#[test]
fn self_join_is_rejected() {
    let err = engine()
        .query("SELECT * FROM users JOIN users ON users.id = users.id")
        .unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Parse(ParseError::InvalidSyntax { .. })
    ));
}

// ═══════════════════════════════════════════════════════════
// DISTINCT / ORDER BY / LIMIT
// ═══════════════════════════════════════════════════════════

#[test]
fn distinct_keeps_first_occurrence_order() {
    let rows = query("SELECT DISTINCT dept FROM emp");
    assert_eq!(rows, vec![row! { "dept" => "X" }, row! { "dept" => "Y" }]);
}

#[test]
fn order_by_multiple_keys() {
    let rows = query("SELECT dept, salary FROM emp ORDER BY dept DESC, salary ASC");
    assert_eq!(
        column(&rows, "salary"),
        vec![Value::Int64(250), Value::Int64(100), Value::Int64(300)]
    );
}

#[test]
fn order_by_nulls_placement_is_configurable() {
    let provider = provider();
    provider
        .insert_row("users", &["id".to_string()], &["3".to_string()])
        .unwrap();

    let first = QueryEngine::new(provider).query("SELECT id FROM users ORDER BY age").unwrap();
    assert_eq!(column(&first, "id")[0], Value::Int64(3));

    let provider = self::provider();
    provider
        .insert_row("users", &["id".to_string()], &["3".to_string()])
        .unwrap();
    let last = QueryEngine::new(provider)
        .with_config(EngineConfig::default().with_nulls_first(false))
        .query("SELECT id FROM users ORDER BY age")
        .unwrap();
    assert_eq!(column(&last, "id")[2], Value::Int64(3));
}

#[test]
fn limit_truncates_and_clamps() {
    assert_eq!(query("SELECT * FROM emp LIMIT 2").len(), 2);
    assert_eq!(query("SELECT * FROM emp LIMIT 10").len(), 3);
    assert!(query("SELECT * FROM emp LIMIT 0").is_empty());
    assert!(query("SELECT * FROM emp LIMIT -1").is_empty());
}

#[test]
fn order_by_column_outside_projection() {
    let rows = query("SELECT name FROM users ORDER BY age");
    assert_eq!(rows, vec![row! { "name" => "B" }, row! { "name" => "A" }]);

    let rows = query("SELECT name FROM users ORDER BY age DESC LIMIT 1");
    assert_eq!(rows, vec![row! { "name" => "A" }]);
}

// ═══════════════════════════════════════════════════════════
// INSERT / DELETE
// ═══════════════════════════════════════════════════════════

#[test]
fn insert_parses_columns_and_values() {
    let stmt = parse_insert("INSERT INTO t (a,b) VALUES (1,'x')").unwrap();
    assert_eq!(stmt.table, "t");
    assert_eq!(stmt.columns, vec!["a", "b"]);
    assert_eq!(stmt.values, vec!["1", "x"]);
}

#[test]
fn insert_and_delete_round_trip() {
    let engine = engine();
    let inserted = engine
        .execute("INSERT INTO users (id, name, age) VALUES (3, \"C\", 41)")
        .unwrap();
    assert_eq!(inserted.affected(), Some(1));
    assert_eq!(engine.query("SELECT * FROM users").unwrap().len(), 3);

    let deleted = engine.execute("DELETE FROM users WHERE age >= 30").unwrap();
    assert_eq!(deleted.affected(), Some(2));
    assert_eq!(
        engine.query("SELECT name FROM users").unwrap(),
        vec![row! { "name" => "B" }]
    );

    let all = engine.execute("DELETE FROM users").unwrap();
    assert!(matches!(all, QueryResult::Deleted(r) if r.deleted == 1));
}

#[test]
fn insert_unknown_column_is_provider_error() {
    let err = engine()
        .execute("INSERT INTO users (email) VALUES ('x')")
        .unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Provider(ProviderError::UnknownColumn { .. })
    ));
}

// ═══════════════════════════════════════════════════════════
// 오류 처리
// ═══════════════════════════════════════════════════════════

#[test]
fn errors_surface_with_their_category() {
    let engine = engine();

    let err = engine.query("SELECT FROM users").unwrap_err();
    assert!(matches!(err, TabqlError::Parse(ParseError::InvalidSyntax { .. })));

    let err = engine.query("SELECT * FROM users WHERE age == 3").unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Execution(ExecutionError::UnsupportedOperator(_))
    ));

    let err = engine
        .query("SELECT * FROM users FULL JOIN orders ON users.id = orders.user_id")
        .unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Execution(ExecutionError::UnsupportedJoinType(_))
    ));

    let err = engine.execute("UPDATE users SET age = 1").unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Execution(ExecutionError::UnsupportedQueryType(_))
    ));

    let err = engine.query("SELECT email FROM users").unwrap_err();
    assert!(matches!(
        err,
        TabqlError::Execution(ExecutionError::MissingField(ref f)) if f == "email"
    ));

    let err = engine.query("SELECT * FROM nowhere").unwrap_err();
    assert_eq!(err.to_string(), "table 'nowhere' not found");
}

#[test]
fn aggregate_field_names_render_canonically() {
    let stmt = parse_select("SELECT count(*), avg(age) FROM users").unwrap();
    let names: Vec<String> = stmt.fields.iter().map(SelectField::name).collect();
    assert_eq!(names, vec!["COUNT(*)", "AVG(age)"]);
}
