use lazy_static::lazy_static;
use rolodex::{Directory, Exchange, Gateway, PersonId, PersonRecord, Request};
use rolodex_test::{
    all_people::AllPeople,
    edit_person::{edit_person::Variables, EditPerson},
    Counter, CountingExchange
};
use serde_json::json;

lazy_static! {
    static ref SEEDED: Vec<PersonRecord> = vec![
        PersonRecord::new("1", "John Smith"),
        PersonRecord::new("2", "Sara Smith"),
        PersonRecord::new("3", "Budd Deey")
    ];
}

fn build_gateway() -> Gateway<impl Exchange> {
    Gateway::builder(Directory::seeded())
        .with_default_exchanges()
        .build()
}

fn edit(id: &str, name: &str) -> Variables {
    Variables {
        id: Some(id.to_string()),
        name: Some(name.to_string())
    }
}

#[tokio::test]
async fn test_list_people() {
    let gateway = build_gateway();

    use rolodex_test::all_people::all_people::Variables;
    let response = gateway.query(AllPeople, Variables).await.unwrap();
    assert!(response.errors.is_none(), "Query returned errors");

    let people = response.data.expect("Query didn't return any data").people;
    let people: Vec<PersonRecord> = people
        .into_iter()
        .map(|person| PersonRecord::new(person.id, person.name))
        .collect();
    assert_eq!(&people, &*SEEDED, "Returned the wrong people");
}

#[tokio::test]
async fn test_edit_then_list() {
    let gateway = build_gateway();

    let response = gateway.query(EditPerson, edit("2", "Jane Doe")).await.unwrap();
    assert!(response.errors.is_none(), "Mutation returned errors");
    let edited = response.data.unwrap().edit_person.expect("Person was not returned");
    assert_eq!(edited.id, "2");
    assert_eq!(edited.name, "Jane Doe");

    let people = gateway.directory().list_people();
    assert_eq!(people[0], SEEDED[0]);
    assert_eq!(people[1], PersonRecord::new("2", "Jane Doe"));
    assert_eq!(people[2], SEEDED[2]);
}

#[tokio::test]
async fn test_edit_missing_person() {
    let gateway = build_gateway();

    let response = gateway.query(EditPerson, edit("99", "Nobody")).await.unwrap();
    assert!(
        response.data.unwrap().edit_person.is_none(),
        "Missing person should resolve to null"
    );
    let errors = response.errors.expect("Mutation should report an error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), Some("NOT_FOUND"));
    assert_eq!(errors[0].message, "No person found with id \"99\"");

    assert_eq!(gateway.directory().list_people(), *SEEDED);
}

#[tokio::test]
async fn test_edit_is_idempotent() {
    let gateway = build_gateway();

    for _ in 0..2 {
        let response = gateway
            .query(EditPerson, edit("1", "John Smith"))
            .await
            .unwrap();
        assert!(response.errors.is_none());
        assert_eq!(gateway.directory().list_people(), *SEEDED);
    }
}

#[tokio::test]
async fn test_ids_are_not_coerced() {
    let gateway = build_gateway();

    let response = gateway.query(EditPerson, edit("01", "Someone")).await.unwrap();
    assert_eq!(response.errors.unwrap()[0].code(), Some("NOT_FOUND"));
    assert_eq!(gateway.directory().list_people(), *SEEDED);
}

#[tokio::test]
async fn test_missing_arguments() {
    let gateway = build_gateway();

    let variables = Variables {
        id: Some("1".to_string()),
        name: None
    };
    let response = gateway.query(EditPerson, variables).await.unwrap();
    let errors = response.errors.expect("Mutation should report an error");
    assert_eq!(errors[0].code(), Some("INVALID_ARGUMENT"));
    assert_eq!(gateway.directory().list_people(), *SEEDED);
}

#[tokio::test]
async fn test_read_after_write() {
    let gateway = build_gateway();

    for i in 0..20 {
        let name = format!("John #{}", i);
        let response = gateway
            .execute(Request::new(format!(
                "mutation {{ editPerson(id: \"1\", name: \"{}\") {{ name }} }}",
                name
            )))
            .await;
        assert!(response.errors.is_none());

        let response = gateway.execute(Request::new("{ people { name } }")).await;
        assert_eq!(response.data.unwrap()["people"][0]["name"], json!(name));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads_and_writes() {
    let gateway = build_gateway();
    let names: Vec<String> = (0..50).map(|i| format!("Sara #{}", i)).collect();

    let writer = {
        let gateway = gateway.clone();
        let names = names.clone();
        tokio::spawn(async move {
            for name in names {
                let response = gateway.query(EditPerson, edit("2", &name)).await.unwrap();
                assert!(response.errors.is_none());
                // Any read issued now has to see the edit.
                let current = gateway.directory().get(&PersonId::from("2")).unwrap();
                assert_eq!(current.name, name);
            }
        })
    };

    let readers = (0..4).map(|_| {
        let gateway = gateway.clone();
        let names = names.clone();
        tokio::spawn(async move {
            use rolodex_test::all_people::all_people::Variables;
            for _ in 0..50 {
                let people = gateway
                    .query(AllPeople, Variables)
                    .await
                    .unwrap()
                    .data
                    .unwrap()
                    .people;
                assert_eq!(people.len(), 3);
                assert_eq!(people[0].name, "John Smith");
                assert_eq!(people[2].name, "Budd Deey");
                assert!(people[1].name == "Sara Smith" || names.contains(&people[1].name));
            }
        })
    });

    let readers = futures::future::join_all(readers);
    let (writer, readers) = futures::join!(writer, readers);
    writer.unwrap();
    for reader in readers {
        reader.unwrap();
    }

    assert_eq!(
        gateway.directory().get(&PersonId::from("2")).unwrap().name,
        "Sara #49"
    );
    assert_eq!(gateway.directory().len(), 3);
}

#[tokio::test]
async fn test_rejected_requests_never_reach_exchanges() {
    let counter = Counter::sync();
    let gateway = Gateway::builder(Directory::seeded())
        .with_exchange(rolodex::exchanges::ResolveExchange)
        .with_exchange(CountingExchange(counter.clone()))
        .build();

    let response = gateway.execute(Request::new("{ people { id email } }")).await;
    assert!(response.data.is_none());
    assert_eq!(
        response.errors.unwrap()[0].code(),
        Some("GRAPHQL_VALIDATION_FAILED")
    );

    let response = gateway
        .execute(Request::new(
            "mutation { editPerson(id: \"1\", name: \"X\") { id nope } }"
        ))
        .await;
    assert!(response.data.is_none());
    assert_eq!(gateway.directory().list_people(), *SEEDED);

    let response = gateway.execute(Request::new("{ people { id }")).await;
    assert_eq!(
        response.errors.unwrap()[0].code(),
        Some("GRAPHQL_PARSE_FAILED")
    );
    assert_eq!(Counter::get_sync(&counter), 0);

    gateway.execute(Request::new("{ people { id } }")).await;
    assert_eq!(Counter::get_sync(&counter), 1);
}

#[tokio::test]
async fn test_missing_resolver() {
    let gateway = Gateway::builder(Directory::seeded()).build();

    let response = gateway.execute(Request::new("{ people { id } }")).await;
    assert!(response.data.is_none());
    assert_eq!(
        response.errors.unwrap()[0].code(),
        Some("INTERNAL_SERVER_ERROR")
    );
}

#[tokio::test]
async fn test_wire_envelope() {
    let gateway = build_gateway();

    let request: Request = serde_json::from_value(json!({
        "query": "query Named($who: String) { editPerson: people { id } } mutation Edit($who: String) { editPerson(id: $who, name: \"Zed\") { id name } }",
        "variables": { "who": "3" },
        "operationName": "Edit"
    }))
    .unwrap();
    let response = gateway.execute(request).await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({ "data": { "editPerson": { "id": "3", "name": "Zed" } } })
    );

    let response = gateway
        .execute(Request::new(
            "mutation {\n  editPerson(id: \"42\", name: \"Nobody\") { id }\n}"
        ))
        .await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "data": { "editPerson": null },
            "errors": [{
                "message": "No person found with id \"42\"",
                "locations": [{ "line": 2, "column": 3 }],
                "path": ["editPerson"],
                "extensions": { "code": "NOT_FOUND" }
            }]
        })
    );
}

#[tokio::test]
async fn test_selection_shaping() {
    let gateway = build_gateway();

    let response = gateway
        .execute(
            Request::new(
                "query Shaped($withId: Boolean!) {
                    first: people { ...Named id @include(if: $withId) }
                    people { ... on Person { __typename } name @skip(if: true) }
                }
                fragment Named on Person { name }"
            )
            .with_variables(json!({ "withId": false }).as_object().unwrap().clone())
        )
        .await;
    assert!(response.errors.is_none());
    let data = response.data.unwrap();
    assert_eq!(data["first"][1], json!({ "name": "Sara Smith" }));
    assert_eq!(data["people"][2], json!({ "__typename": "Person" }));
}

#[tokio::test]
async fn test_mistyped_ids_never_edit() {
    let gateway = build_gateway();

    let document = "mutation ($id: ID) { editPerson(id: $id, name: \"Coerced\") { id name } }";
    for id in &[json!(2), json!("2")] {
        let response = gateway
            .execute(
                Request::new(document)
                    .with_variables(json!({ "id": id }).as_object().unwrap().clone())
            )
            .await;
        assert!(response.data.is_none());
        assert!(response.errors.is_some());
    }

    let response = gateway
        .execute(Request::new(
            "mutation {
                first: editPerson(id: \"1\", name: \"Early\") { id }
                second: editPerson(id: 3, name: \"Late\") { id }
            }"
        ))
        .await;
    assert!(response.data.is_none());
    assert_eq!(
        response.errors.unwrap()[0].code(),
        Some("GRAPHQL_VALIDATION_FAILED")
    );

    assert_eq!(gateway.directory().list_people(), *SEEDED);
}
