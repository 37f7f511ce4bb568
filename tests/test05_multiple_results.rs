use std::sync::Arc;

use sql_access::impl_record;
use sql_access::prelude::*;
use sql_access::test_support::{ScriptedBackend, StatementOutcome, StubDriver};

#[derive(Debug, Default)]
struct Customer {
    id: Option<i64>,
    name: Option<String>,
}

#[derive(Debug, Default)]
struct Order {
    id: Option<i64>,
    total: Option<f64>,
}

impl_record! {
    Customer {
        fields {
            id => "Id",
            name => "Name",
        }
    }
}

impl_record! {
    Order {
        fields {
            id => "Id",
            total => "Total",
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
async fn each_result_set_feeds_its_reader_in_order() {
    let (registry, backend) = fixture();
    backend.respond(
        "dbo.GetCustomerWithOrders",
        StatementOutcome::default()
            .rows(RowSet::with_rows(
                ["Id", "Name"],
                vec![vec![RowValue::Int(7), RowValue::Text("Ada".into())]],
            ))
            .rows(RowSet::with_rows(
                ["Id", "Total"],
                vec![
                    vec![RowValue::Int(100), RowValue::Float(9.5)],
                    vec![RowValue::Int(101), RowValue::Float(20.0)],
                ],
            )),
    );

    let customer_set = ObjectResultSet::<Customer>::new();
    let orders_set = CollectionResultSet::<Order>::new();
    let customer = customer_set.data();
    let orders = orders_set.data();

    let response = MultipleResultsCommand::new()
        .connection("main")
        .stored_procedure("dbo.GetCustomerWithOrders")
        .parameter("id", 7i64)
        .result_set(customer_set)
        .result_set(orders_set)
        .execute(&registry, None)
        .await
        .unwrap();

    assert_eq!(response.rows_read, 3);
    assert_eq!(customer.lock().name.as_deref(), Some("Ada"));
    let orders = orders.lock();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[1].total, Some(20.0));
}

#[tokio::test]
async fn missing_trailing_result_sets_read_as_empty() {
    let (registry, backend) = fixture();
    backend.respond(
        "dbo.GetCustomerWithOrders",
        StatementOutcome::default().rows(RowSet::with_rows(
            ["Id", "Name"],
            vec![vec![RowValue::Int(7), RowValue::Text("Ada".into())]],
        )),
    );

    let customer_set = ObjectResultSet::<Customer>::new();
    let orders_set = CollectionResultSet::<Order>::new();
    let customer = customer_set.data();
    let orders = orders_set.data();

    let response = MultipleResultsCommand::new()
        .connection("main")
        .stored_procedure("dbo.GetCustomerWithOrders")
        .result_set(customer_set)
        .result_set(orders_set)
        .execute(&registry, None)
        .await
        .unwrap();

    assert_eq!(response.rows_read, 1);
    assert_eq!(customer.lock().id, Some(7));
    assert!(orders.lock().is_empty());
}

#[tokio::test]
async fn an_empty_first_result_set_leaves_the_record_at_default() {
    let (registry, backend) = fixture();
    backend.respond(
        "dbo.GetCustomerWithOrders",
        StatementOutcome::default()
            .rows(RowSet::with_rows(["Id", "Name"], vec![]))
            .rows(RowSet::with_rows(
                ["Id", "Total"],
                vec![vec![RowValue::Int(100), RowValue::Float(1.0)]],
            )),
    );

    let customer_set = ObjectResultSet::<Customer>::new();
    let customer = customer_set.data();

    let response = MultipleResultsCommand::new()
        .connection("main")
        .stored_procedure("dbo.GetCustomerWithOrders")
        .result_set(customer_set)
        .result_set(CollectionResultSet::<Order>::new())
        .execute(&registry, None)
        .await
        .unwrap();

    assert_eq!(response.rows_read, 1);
    assert!(customer.lock().id.is_none());
}
