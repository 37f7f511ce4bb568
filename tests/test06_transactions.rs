use std::sync::Arc;

use sql_access::impl_record;
use sql_access::prelude::*;
use sql_access::test_support::{BackendEvent, ScriptedBackend, StatementOutcome, StubDriver};

#[derive(Debug, Default)]
struct Invoice {
    id: Option<i64>,
}

impl_record! {
    Invoice {
        fields {
            id => "Id",
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
        .with_connection(ConnectionDescriptor::new("main", "scripted", "mem://"))
        .with_connection(ConnectionDescriptor::new("other", "scripted", "mem2://"))
        .with_coordinator(Arc::new(backend.clone()));
    (registry, backend)
}

#[tokio::test]
async fn local_transaction_runs_every_command_on_one_session() {
    let (registry, backend) = fixture();
    backend.respond("insert into Invoices", StatementOutcome::affected(1));
    backend.respond("insert into InvoiceLines", StatementOutcome::affected(2));

    Transaction::local()
        .connection("main")
        .isolation(IsolationLevel::Serializable)
        .command(
            NonQueryCommand::new().text("insert into Invoices"),
        )
        .command(
            NonQueryCommand::new().text("insert into InvoiceLines"),
        )
        .execute(&registry)
        .await
        .unwrap();

    assert_eq!(
        backend.events(),
        vec![
            BackendEvent::Opened,
            BackendEvent::Began(IsolationLevel::Serializable),
            BackendEvent::Ran("insert into Invoices".into()),
            BackendEvent::Ran("insert into InvoiceLines".into()),
            BackendEvent::Committed,
        ]
    );
}

#[tokio::test]
async fn a_failing_command_rolls_the_unit_back() {
    let (registry, backend) = fixture();
    backend.respond("insert into Invoices", StatementOutcome::affected(1));
    backend.respond_with("boom", |_| {
        Err(DataAccessError::ExecutionError("deadlock victim".into()))
    });

    let result = Transaction::local()
        .connection("main")
        .command(NonQueryCommand::new().text("insert into Invoices"))
        .command(NonQueryCommand::new().text("boom"))
        .command(NonQueryCommand::new().text("never runs"))
        .execute(&registry)
        .await;

    assert!(matches!(result, Err(DataAccessError::ExecutionError(_))));
    let events = backend.events();
    assert_eq!(events.last(), Some(&BackendEvent::RolledBack));
    assert!(!events.contains(&BackendEvent::Ran("never runs".into())));
}

#[tokio::test]
async fn a_command_on_a_different_connection_is_rejected_up_front() {
    let (registry, backend) = fixture();

    let result = Transaction::local()
        .connection("main")
        .command(
            NonQueryCommand::new()
                .connection("other")
                .text("insert into Invoices"),
        )
        .execute(&registry)
        .await;

    assert!(matches!(result, Err(DataAccessError::ConfigError(_))));
    // Rejected before anything touched the backend.
    assert!(backend.events().is_empty());
}

#[tokio::test]
async fn a_local_transaction_requires_a_connection() {
    let (registry, _backend) = fixture();

    let result = Transaction::local()
        .command(NonQueryCommand::new().text("insert into Invoices"))
        .execute(&registry)
        .await;

    assert!(matches!(result, Err(DataAccessError::ConfigError(_))));
}

#[tokio::test]
async fn values_flow_between_commands_through_a_shared_record_and_hooks() {
    let (registry, backend) = fixture();
    backend.respond(
        "insert into Invoices",
        StatementOutcome::affected(1).out_value("@id", 41i64),
    );
    backend.respond_with("insert into InvoiceLines where Invoice = @invoiceId", |s| {
        match s.parameters[0].value.scalar() {
            Some(RowValue::Int(41)) => Ok(StatementOutcome::affected(1)),
            other => Err(DataAccessError::ExecutionError(format!(
                "unexpected invoice id: {other:?}"
            ))),
        }
    });

    let invoice = Shared::new(Invoice::default());
    let handle = invoice.clone();

    Transaction::local()
        .connection("main")
        .command(
            NonQueryCommand::new()
                .text("insert into Invoices")
                .record(&invoice)
                .parameters([Parameter::new("id", RowValue::Null).output()])
                .map_output_parameters([OutputParameterMap::new("id", "Id")]),
        )
        .command(
            NonQueryCommand::new()
                .text("insert into InvoiceLines where Invoice = @invoiceId")
                .on_before_executed(move |ctx| {
                    let id = handle.lock().id.unwrap_or_default();
                    ctx.set_parameter("invoiceId", id);
                }),
        )
        .execute(&registry)
        .await
        .unwrap();

    assert_eq!(invoice.lock().id, Some(41));
}

#[tokio::test]
async fn distributed_transaction_completes_its_scope() {
    let (registry, backend) = fixture();
    backend.respond("insert into Invoices", StatementOutcome::affected(1));
    backend.respond("insert into Audit", StatementOutcome::affected(1));

    Transaction::distributed(Scope::RequiresNew)
        .connection("main")
        .command(NonQueryCommand::new().text("insert into Invoices"))
        .command(
            NonQueryCommand::new()
                .connection("other")
                .text("insert into Audit"),
        )
        .execute(&registry)
        .await
        .unwrap();

    let events = backend.events();
    assert_eq!(events.first(), Some(&BackendEvent::ScopeBegan(Scope::RequiresNew)));
    assert_eq!(events.last(), Some(&BackendEvent::ScopeCompleted));
    // Each command opened its own connection under the scope.
    assert_eq!(
        events.iter().filter(|e| **e == BackendEvent::Opened).count(),
        2
    );
}

#[tokio::test]
async fn distributed_failure_abandons_the_scope() {
    let (registry, backend) = fixture();
    backend.respond_with("boom", |_| {
        Err(DataAccessError::ExecutionError("constraint violation".into()))
    });

    let result = Transaction::distributed(Scope::Required)
        .connection("main")
        .command(NonQueryCommand::new().text("boom"))
        .execute(&registry)
        .await;

    assert!(matches!(result, Err(DataAccessError::ExecutionError(_))));
    assert_eq!(backend.events().last(), Some(&BackendEvent::ScopeAbandoned));
}

#[tokio::test]
async fn distributed_transaction_requires_a_coordinator() {
    let backend = ScriptedBackend::new();
    let registry = Registry::new()
        .with_provider(
            "scripted",
            Arc::new(StubDriver::new("@")),
            Arc::new(backend.clone()),
        )
        .with_connection(ConnectionDescriptor::new("main", "scripted", "mem://"));

    let result = Transaction::distributed(Scope::Required)
        .connection("main")
        .command(NonQueryCommand::new().text("insert into Invoices"))
        .execute(&registry)
        .await;

    assert!(matches!(result, Err(DataAccessError::ConfigError(_))));
}
