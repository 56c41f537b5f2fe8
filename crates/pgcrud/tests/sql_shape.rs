use pgcrud::builder::{
    build_insert_data, build_insert_query, build_select_query, build_set_clause,
    build_where_clause,
};
use pgcrud::{
    ColumnMap, Condition, JoinBuilder, Payload, QueryOptions, Record, WhereExpr, args,
    placeholder::to_numbered,
};

#[derive(Debug, Clone, Record)]
struct User {
    id: i64,
    #[crud(column = "firstName")]
    first_name: String,
    #[crud(column = "lastName")]
    last_name: String,
    email: String,
    #[crud(skip)]
    password: String,
    #[crud(column = "createdAt")]
    created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Payload)]
struct ProductUpdate {
    name: String,
    description: Option<String>,
    price: f64,
    quantity: i32,
    #[crud(via = "i64")]
    views: u32,
}

#[test]
fn derived_columns_follow_declaration_order() {
    let columns: Vec<_> = User::columns().iter().map(|c| c.column).collect();
    assert_eq!(
        columns,
        vec!["id", "firstName", "lastName", "email", "password", "createdAt"]
    );

    let map = ColumnMap::of::<User>();
    assert_eq!(map.width(), 6);
    assert_eq!(
        map.writable_columns().collect::<Vec<_>>(),
        vec!["firstName", "lastName", "email"]
    );
}

#[test]
fn insert_leaves_out_identity_timestamp_and_skipped_fields() {
    let user = User {
        id: 42,
        first_name: "Ada".into(),
        last_name: String::new(),
        email: "ada@example.com".into(),
        password: "hash".into(),
        created_at: chrono::NaiveDateTime::default(),
    };
    let data = build_insert_data(&user).unwrap();
    assert_eq!(data.values.len(), 3);
    assert_eq!(
        build_insert_query("users", &data, Some("id")),
        "INSERT INTO users (firstName, lastName, email) VALUES (?, ?, ?) RETURNING id"
    );
}

#[test]
fn update_skips_empty_strings_and_none_but_writes_zeroes() {
    let patch = ProductUpdate {
        name: String::new(),
        description: None,
        price: 0.0,
        quantity: 0,
        views: 7,
    };
    let (set, values) = build_set_clause(&patch).unwrap();
    assert_eq!(set, "price = ?, quantity = ?, views = ?");
    assert_eq!(values.len(), 3);

    let cleared = ProductUpdate {
        name: "Desk".into(),
        description: Some(String::new()),
        ..patch
    };
    let (set, _) = build_set_clause(&cleared).unwrap();
    assert_eq!(set, "name = ?, description = ?, price = ?, quantity = ?, views = ?");
}

#[derive(Payload)]
struct Relabel {
    label: &'static str,
    rank: i32,
}

#[test]
fn empty_str_slices_are_left_out_of_updates() {
    let (set, values) = build_set_clause(&Relabel { label: "", rank: 3 }).unwrap();
    assert_eq!(set, "rank = ?");
    assert_eq!(values.len(), 1);

    let (set, _) = build_set_clause(&Relabel { label: "gold", rank: 3 }).unwrap();
    assert_eq!(set, "label = ?, rank = ?");
}

#[test]
fn structured_filter_numbers_in_argument_order() {
    let opts = QueryOptions::new()
        .filter(WhereExpr::and(vec![
            Condition::eq("status", "active").unwrap().into(),
            WhereExpr::or(vec![
                Condition::gte("price", 10.0_f64).unwrap().into(),
                Condition::is_null("discontinued_at").unwrap().into(),
            ]),
        ]))
        .order_by("price DESC")
        .limit(10);
    let (where_clause, args) = build_where_clause(&opts);
    let sql = build_select_query("products", &opts, &where_clause);
    assert_eq!(args.len(), 2);
    assert_eq!(
        to_numbered(&sql),
        "SELECT * FROM products WHERE status = $1 AND (price >= $2 OR discontinued_at IS NULL) \
         ORDER BY price DESC LIMIT 10"
    );
}

#[test]
fn join_builder_renders_base_joins_where_order_limit_offset() {
    let builder = JoinBuilder::new("orders")
        .select("orders.id, users.email, products.name")
        .inner_join("users", "users.id = orders.user_id")
        .left_join("products", "products.id = orders.product_id")
        .where_raw("orders.total > ? AND users.email LIKE ?", args![50_i64, "%@corp.io"])
        .order_by("orders.id DESC")
        .limit(25)
        .offset(50);

    assert_eq!(
        to_numbered(&builder.to_sql()),
        "SELECT orders.id, users.email, products.name FROM orders \
         INNER JOIN users ON users.id = orders.user_id \
         LEFT JOIN products ON products.id = orders.product_id \
         WHERE orders.total > $1 AND users.email LIKE $2 \
         ORDER BY orders.id DESC LIMIT 25 OFFSET 50"
    );
}
