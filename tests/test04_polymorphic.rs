use std::sync::{Arc, LazyLock};

use sql_access::mapping::TypeMap;
use sql_access::prelude::*;
use sql_access::test_support::{ScriptedBackend, StatementOutcome, StubDriver};

/// One table holding two kinds of contact, discriminated by the Kind column.
#[derive(Debug)]
enum Contact {
    Person { name: Option<String> },
    Company { name: Option<String>, vat: Option<String> },
}

impl Default for Contact {
    fn default() -> Self {
        Contact::Person { name: None }
    }
}

static CONTACT_PATHS: LazyLock<Vec<String>> =
    LazyLock::new(|| vec!["Name".to_string(), "Vat".to_string()]);

impl Record for Contact {
    fn static_paths() -> &'static [String] {
        &CONTACT_PATHS
    }

    fn paths(&self) -> &'static [String] {
        &CONTACT_PATHS
    }

    fn field(&self, path: &str) -> Option<RowValue> {
        match (self, path) {
            (Contact::Person { name }, "Name") | (Contact::Company { name, .. }, "Name") => {
                Some(name.as_deref().map_or(RowValue::Null, RowValue::from))
            }
            (Contact::Company { vat, .. }, "Vat") => {
                Some(vat.as_deref().map_or(RowValue::Null, RowValue::from))
            }
            _ => None,
        }
    }

    fn assign(&mut self, path: &str, value: RowValue) -> Result<(), DataAccessError> {
        match (self, path) {
            (Contact::Person { name }, "Name") | (Contact::Company { name, .. }, "Name") => {
                *name = value.as_text().map(str::to_string);
                Ok(())
            }
            (Contact::Company { vat, .. }, "Vat") => {
                *vat = value.as_text().map(str::to_string);
                Ok(())
            }
            // Columns a variant does not carry are skipped, like any other
            // unmapped column.
            (Contact::Person { .. }, "Vat") => Ok(()),
            _ => Err(DataAccessError::MappingError(format!(
                "unknown field path: {path}"
            ))),
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

fn contact_rows(rows: Vec<Vec<RowValue>>) -> RowSet {
    RowSet::with_rows(["Kind", "Name", "Vat"], rows)
}

#[tokio::test]
async fn discriminator_selects_the_variant_per_row() {
    let (registry, backend) = fixture();
    backend.respond(
        "select Kind, Name, Vat from Contacts",
        StatementOutcome::default().rows(contact_rows(vec![
            vec![
                RowValue::Int(1),
                RowValue::Text("Ada".into()),
                RowValue::Null,
            ],
            vec![
                RowValue::Int(2),
                RowValue::Text("Acme".into()),
                RowValue::Text("GB123".into()),
            ],
        ])),
    );

    let response = CollectionQuery::<Contact>::new()
        .connection("main")
        .text("select Kind, Name, Vat from Contacts")
        .map_types(
            TypeMap::new(0)
                .entry(|| Contact::Person { name: None })
                .entry(|| Contact::Company {
                    name: None,
                    vat: None,
                }),
        )
        .execute(&registry, None)
        .await
        .unwrap();

    let records = response.records;
    let contacts = records.lock();
    assert!(
        matches!(&contacts[0], Contact::Person { name } if name.as_deref() == Some("Ada"))
    );
    assert!(matches!(
        &contacts[1],
        Contact::Company { name, vat }
            if name.as_deref() == Some("Acme") && vat.as_deref() == Some("GB123")
    ));
}

#[tokio::test]
async fn unknown_discriminator_fails_the_read() {
    let (registry, backend) = fixture();
    backend.respond(
        "select Kind, Name, Vat from Contacts",
        StatementOutcome::default().rows(contact_rows(vec![vec![
            RowValue::Int(9),
            RowValue::Null,
            RowValue::Null,
        ]])),
    );

    let result = CollectionQuery::<Contact>::new()
        .connection("main")
        .text("select Kind, Name, Vat from Contacts")
        .map_types(TypeMap::new(0).entry(|| Contact::Person { name: None }))
        .execute(&registry, None)
        .await;

    assert!(matches!(
        result,
        Err(DataAccessError::UnknownDiscriminator(9))
    ));
}
