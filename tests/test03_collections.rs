use std::sync::Arc;

use sql_access::impl_record;
use sql_access::prelude::*;
use sql_access::test_support::{ScriptedBackend, StatementOutcome, StubDriver};

#[derive(Debug, Default)]
struct Order {
    id: Option<i64>,
    total: Option<f64>,
    status: Option<String>,
}

impl_record! {
    Order {
        fields {
            id => "Id",
            total => "Total",
            status => "Status",
        }
    }
}

fn fixture() -> (Registry, ScriptedBackend) {
    let backend = ScriptedBackend::new();
    let registry = Registry::new()
        .with_provider(
            "scripted",
            Arc::new(StubDriver::new("@")),
            Arc::new(backend.clone()),
        )
        .with_connection(ConnectionDescriptor::new("main", "scripted", "mem://"));
    (registry, backend)
}

#[tokio::test]
async fn reads_every_row_into_new_records() {
    let (registry, backend) = fixture();
    backend.respond(
        "select Id, Total from Orders",
        StatementOutcome::default().rows(RowSet::with_rows(
            ["Id", "Total"],
            vec![
                vec![RowValue::Int(1), RowValue::Float(9.5)],
                vec![RowValue::Int(2), RowValue::Float(20.0)],
            ],
        )),
    );

    let response = CollectionQuery::<Order>::new()
        .connection("main")
        .text("select Id, Total from Orders")
        .execute(&registry, None)
        .await
        .unwrap();

    assert_eq!(response.count, 2);
    let records = response.records;
    let orders = records.lock();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].id, Some(1));
    assert_eq!(orders[1].total, Some(20.0));
}

#[tokio::test]
async fn second_query_updates_existing_records_in_place() {
    let (registry, backend) = fixture();
    backend.respond(
        "select Id, Total from Orders",
        StatementOutcome::default().rows(RowSet::with_rows(
            ["Id", "Total"],
            vec![
                vec![RowValue::Int(1), RowValue::Float(9.5)],
                vec![RowValue::Int(2), RowValue::Float(20.0)],
            ],
        )),
    );
    backend.respond(
        "select Status from OrderStatuses",
        StatementOutcome::default().rows(RowSet::with_rows(
            ["Status"],
            vec![
                vec![RowValue::Text("shipped".into())],
                vec![RowValue::Text("pending".into())],
            ],
        )),
    );

    let orders: Shared<Vec<Order>> = Shared::new(Vec::new());

    CollectionQuery::new()
        .connection("main")
        .text("select Id, Total from Orders")
        .instances(&orders)
        .execute(&registry, None)
        .await
        .unwrap();

    CollectionQuery::new()
        .connection("main")
        .text("select Status from OrderStatuses")
        .instances(&orders)
        .execute(&registry, None)
        .await
        .unwrap();

    let records = orders.lock();
    assert_eq!(records.len(), 2);
    // First query's values survive the second, disjoint-column query.
    assert_eq!(records[0].id, Some(1));
    assert_eq!(records[0].status.as_deref(), Some("shipped"));
    assert_eq!(records[1].total, Some(20.0));
    assert_eq!(records[1].status.as_deref(), Some("pending"));
}

#[tokio::test]
async fn empty_cursor_reports_zero_and_leaves_the_collection_alone() {
    let (registry, backend) = fixture();
    backend.respond(
        "select Id from Orders where 1 = 0",
        StatementOutcome::default().rows(RowSet::with_rows(["Id"], vec![])),
    );

    let orders = Shared::new(vec![Order {
        id: Some(42),
        ..Order::default()
    }]);

    let response = CollectionQuery::new()
        .connection("main")
        .text("select Id from Orders where 1 = 0")
        .instances(&orders)
        .execute(&registry, None)
        .await
        .unwrap();

    // No rows were read; the collection itself is untouched.
    assert_eq!(response.count, 0);
    assert_eq!(orders.lock()[0].id, Some(42));
}

#[tokio::test]
async fn count_output_parameter_overrides_the_collection_length() {
    let (registry, backend) = fixture();
    backend.respond(
        "dbo.GetOrdersPage",
        StatementOutcome::default()
            .rows(RowSet::with_rows(
                ["Id"],
                vec![vec![RowValue::Int(1)], vec![RowValue::Int(2)]],
            ))
            .out_value("@count", 250i64),
    );

    let response = CollectionQuery::<Order>::new()
        .connection("main")
        .stored_procedure("dbo.GetOrdersPage")
        .parameter("page", 1i64)
        .parameters([Parameter::new("count", RowValue::Null).output()])
        .execute(&registry, None)
        .await
        .unwrap();

    assert_eq!(response.records.lock().len(), 2);
    assert_eq!(response.count, 250);
}
