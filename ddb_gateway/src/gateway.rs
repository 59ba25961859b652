//! Generic item operations against a named DynamoDB table.
//!
//! Every operation is a single linear pass: validate the inputs, acquire a
//! call-local client for the requested deployment context, issue one remote
//! call and translate the result. There are no retries and no state shared
//! between calls.
//!
//! Each operation also has a `*_with` variant that takes any implementor of
//! the relevant [`crate::ddb`] trait instead of a deployment context. That is
//! the seam consumers with their own client lifecycle (and the tests) go
//! through.

use std::collections::HashMap;

use aws_sdk_dynamodb::model::{AttributeValue, Select};
use aws_sdk_dynamodb::output::PutItemOutput;
use common_macros::hash_map;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client;
use crate::ddb::delete_item::{DeleteItem, DeleteItemInput};
use crate::ddb::get_item::{GetItem, GetItemInput};
use crate::ddb::put_item::{PutItem, PutItemInput};
use crate::ddb::query::{Query, QueryInput};
use crate::error::GatewayError;
use crate::expression::EqualityCondition;
use crate::key::KeyValue;

/// Client able to serve every gateway operation. Implemented by
/// [`Adapter`](crate::ddb::Adapter) and by any test double providing the four
/// op traits.
pub trait ItemStoreClient: GetItem + PutItem + Query + DeleteItem + Send + Sync {}
impl<T: GetItem + PutItem + Query + DeleteItem + Send + Sync> ItemStoreClient for T {}

/// Builds the single-attribute key map for point lookups and deletes.
///
/// Only string keys are accepted by the current contract. The check runs
/// before the client is acquired, so a rejected key never causes remote
/// traffic.
fn string_key(
    key_name: &str,
    key_value: &KeyValue,
) -> Result<HashMap<String, AttributeValue>, GatewayError> {
    match key_value {
        KeyValue::String(_) => Ok(hash_map! {
            key_name.to_owned() => key_value.attribute_value(),
        }),
        other => Err(GatewayError::UnsupportedKeyType(other.kind())),
    }
}

/// Retrieves the item identified by `key_name == key_value` from `table`.
///
/// Returns `Ok(None)` when no item matches; absence is not an error.
pub async fn fetch_by_key<T>(
    key_name: &str,
    key_value: &KeyValue,
    table: &str,
    deployment: &str,
) -> Result<Option<T>, GatewayError>
where
    T: DeserializeOwned,
{
    let key = string_key(key_name, key_value)?;
    let db = client::for_deployment(deployment).await?;
    get_and_decode(&db, key, table).await
}

/// [`fetch_by_key`] against a caller-supplied client.
pub async fn fetch_by_key_with<C, T>(
    db: &C,
    key_name: &str,
    key_value: &KeyValue,
    table: &str,
) -> Result<Option<T>, GatewayError>
where
    C: GetItem + Sync,
    T: DeserializeOwned,
{
    let key = string_key(key_name, key_value)?;
    get_and_decode(db, key, table).await
}

async fn get_and_decode<C, T>(
    db: &C,
    key: HashMap<String, AttributeValue>,
    table: &str,
) -> Result<Option<T>, GatewayError>
where
    C: GetItem + Sync,
    T: DeserializeOwned,
{
    let input = GetItemInput::builder().table_name(table).key(key).build();
    let output = db.get_item(input).await.map_err(|e| {
        tracing::error!(error = ?e, "GetItem call failed.");
        GatewayError::RemoteOperation(e.into())
    })?;

    match output.item {
        None => Ok(None),
        Some(item) if item.is_empty() => Ok(None),
        Some(item) => Ok(Some(
            serde_ddb::from_hashmap(item).map_err(GatewayError::Decode)?,
        )),
    }
}

/// Queries the named secondary index of `table` for items where
/// `key_name == key_value`.
///
/// The comparison value may be any key type. Only the first page of matches
/// is returned; the store's page limit bounds the result and further pages
/// are never followed. No match decodes to an empty vector.
pub async fn fetch_by_secondary_index<T>(
    key_name: &str,
    key_value: &KeyValue,
    index: &str,
    table: &str,
    deployment: &str,
) -> Result<Vec<T>, GatewayError>
where
    T: DeserializeOwned,
{
    let condition = EqualityCondition::new(key_name, key_value)?;
    let db = client::for_deployment(deployment).await?;
    query_and_decode(&db, condition, index, table).await
}

/// [`fetch_by_secondary_index`] against a caller-supplied client.
pub async fn fetch_by_secondary_index_with<C, T>(
    db: &C,
    key_name: &str,
    key_value: &KeyValue,
    index: &str,
    table: &str,
) -> Result<Vec<T>, GatewayError>
where
    C: Query + Sync,
    T: DeserializeOwned,
{
    let condition = EqualityCondition::new(key_name, key_value)?;
    query_and_decode(db, condition, index, table).await
}

async fn query_and_decode<C, T>(
    db: &C,
    condition: EqualityCondition,
    index: &str,
    table: &str,
) -> Result<Vec<T>, GatewayError>
where
    C: Query + Sync,
    T: DeserializeOwned,
{
    let input = QueryInput::builder()
        .table_name(table)
        .index_name(index)
        .key_condition_expression(condition.expression())
        .expression_attribute_names(condition.attribute_names())
        .expression_attribute_values(condition.attribute_values())
        .select(Select::AllProjectedAttributes)
        .build();
    let output = db.query(input).await.map_err(|e| {
        tracing::error!(error = ?e, "Query call failed.");
        GatewayError::RemoteOperation(e.into())
    })?;

    serde_ddb::from_items(output.items.unwrap_or_default()).map_err(GatewayError::Decode)
}

/// Writes `item` to `table`, fully replacing any existing item with the same
/// key.
///
/// The write is unconditional: no existence check and no concurrency
/// condition. Returns the store's write receipt.
pub async fn upsert<T>(
    item: &T,
    table: &str,
    deployment: &str,
) -> Result<PutItemOutput, GatewayError>
where
    T: Serialize,
{
    let attributes = serde_ddb::to_hashmap(item).map_err(GatewayError::Encode)?;
    let db = client::for_deployment(deployment).await?;
    put_attributes(&db, attributes, table).await
}

/// [`upsert`] against a caller-supplied client.
pub async fn upsert_with<C, T>(
    db: &C,
    item: &T,
    table: &str,
) -> Result<PutItemOutput, GatewayError>
where
    C: PutItem + Sync,
    T: Serialize,
{
    let attributes = serde_ddb::to_hashmap(item).map_err(GatewayError::Encode)?;
    put_attributes(db, attributes, table).await
}

async fn put_attributes<C>(
    db: &C,
    attributes: HashMap<String, AttributeValue>,
    table: &str,
) -> Result<PutItemOutput, GatewayError>
where
    C: PutItem + Sync,
{
    let input = PutItemInput::builder()
        .table_name(table)
        .item(attributes)
        .build();
    db.put_item(input).await.map_err(|e| {
        tracing::error!(error = ?e, "PutItem call failed.");
        GatewayError::RemoteOperation(e.into())
    })
}

/// Deletes the item identified by `key_name == key_value` from `table`.
///
/// The delete is unconditional; deleting a key that holds no item succeeds.
pub async fn delete(
    key_name: &str,
    key_value: &KeyValue,
    table: &str,
    deployment: &str,
) -> Result<(), GatewayError> {
    let key = string_key(key_name, key_value)?;
    let db = client::for_deployment(deployment).await?;
    delete_key(&db, key, table).await
}

/// [`delete`] against a caller-supplied client.
pub async fn delete_with<C>(
    db: &C,
    key_name: &str,
    key_value: &KeyValue,
    table: &str,
) -> Result<(), GatewayError>
where
    C: DeleteItem + Sync,
{
    let key = string_key(key_name, key_value)?;
    delete_key(db, key, table).await
}

async fn delete_key<C>(
    db: &C,
    key: HashMap<String, AttributeValue>,
    table: &str,
) -> Result<(), GatewayError>
where
    C: DeleteItem + Sync,
{
    let input = DeleteItemInput::builder().table_name(table).key(key).build();
    db.delete_item(input).await.map_err(|e| {
        tracing::error!(error = ?e, "DeleteItem call failed.");
        GatewayError::RemoteOperation(e.into())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use aws_sdk_dynamodb::error::{DeleteItemError, GetItemError, PutItemError, QueryError};
    use aws_sdk_dynamodb::output::{DeleteItemOutput, GetItemOutput, QueryOutput};
    use aws_sdk_dynamodb::types::SdkError;
    use serde::Deserialize;

    use super::*;

    const TABLE: &str = "Courses";
    const KEY_ATTR: &str = "Id";

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Instructor {
        name: String,
        tenured: bool,
    }

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct CourseRecord {
        id: String,
        title: String,
        credits: u32,
        instructor: Option<Instructor>,
    }

    fn course(id: &str, title: &str) -> CourseRecord {
        CourseRecord {
            id: id.to_owned(),
            title: title.to_owned(),
            credits: 6,
            instructor: Some(Instructor {
                name: "V. Barbu".to_owned(),
                tenured: true,
            }),
        }
    }

    /// In-memory stand-in for the DynamoDB client. Items live in per-table
    /// vectors keyed by the `Id` attribute; every trait call bumps the call
    /// counter so tests can assert that rejected inputs caused no remote
    /// traffic.
    #[derive(Default)]
    struct FakeStore {
        tables: Mutex<HashMap<String, Vec<HashMap<String, AttributeValue>>>>,
        indexes: Vec<String>,
        remote_calls: AtomicUsize,
    }

    impl FakeStore {
        fn with_index(index: &str) -> Self {
            FakeStore {
                indexes: vec![index.to_owned()],
                ..FakeStore::default()
            }
        }

        fn remote_calls(&self) -> usize {
            self.remote_calls.load(Ordering::SeqCst)
        }

        fn items_in(&self, table: &str) -> usize {
            self.tables
                .lock()
                .unwrap()
                .get(table)
                .map(Vec::len)
                .unwrap_or(0)
        }
    }

    fn matches_key(
        item: &HashMap<String, AttributeValue>,
        key: &HashMap<String, AttributeValue>,
    ) -> bool {
        key.iter().all(|(name, value)| item.get(name) == Some(value))
    }

    #[async_trait]
    impl GetItem for FakeStore {
        async fn get_item(
            &self,
            input: GetItemInput,
        ) -> Result<GetItemOutput, SdkError<GetItemError>> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            let tables = self.tables.lock().unwrap();
            let found = tables
                .get(&input.table_name)
                .and_then(|items| items.iter().find(|item| matches_key(item, &input.key)))
                .cloned();
            Ok(GetItemOutput::builder().set_item(found).build())
        }
    }

    #[async_trait]
    impl PutItem for FakeStore {
        async fn put_item(
            &self,
            input: PutItemInput,
        ) -> Result<PutItemOutput, SdkError<PutItemError>> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            let mut tables = self.tables.lock().unwrap();
            let items = tables.entry(input.table_name).or_default();
            if let Some(id) = input.item.get(KEY_ATTR) {
                items.retain(|item| item.get(KEY_ATTR) != Some(id));
            }
            items.push(input.item);
            Ok(PutItemOutput::builder().build())
        }
    }

    #[async_trait]
    impl Query for FakeStore {
        async fn query(&self, input: QueryInput) -> Result<QueryOutput, SdkError<QueryError>> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            if !self.indexes.contains(&input.index_name) {
                return Err(SdkError::ConstructionFailure(
                    format!("no index named {}", input.index_name).into(),
                ));
            }
            let attr = input
                .expression_attribute_names
                .get("#k")
                .cloned()
                .expect("key condition must name its attribute");
            let value = input
                .expression_attribute_values
                .get(":v")
                .cloned()
                .expect("key condition must carry its comparison value");
            let tables = self.tables.lock().unwrap();
            let matching = tables
                .get(&input.table_name)
                .map(|items| {
                    items
                        .iter()
                        .filter(|item| item.get(&attr) == Some(&value))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Ok(QueryOutput::builder().set_items(Some(matching)).build())
        }
    }

    #[async_trait]
    impl DeleteItem for FakeStore {
        async fn delete_item(
            &self,
            input: DeleteItemInput,
        ) -> Result<DeleteItemOutput, SdkError<DeleteItemError>> {
            self.remote_calls.fetch_add(1, Ordering::SeqCst);
            let mut tables = self.tables.lock().unwrap();
            if let Some(items) = tables.get_mut(&input.table_name) {
                items.retain(|item| !matches_key(item, &input.key));
            }
            Ok(DeleteItemOutput::builder().build())
        }
    }

    #[tokio::test]
    async fn non_string_key_is_rejected_before_any_remote_call() {
        let store = FakeStore::default();

        for key_value in [
            KeyValue::Number("42".to_owned()),
            KeyValue::Binary(vec![1, 2, 3]),
        ] {
            let err = fetch_by_key_with::<_, CourseRecord>(&store, KEY_ATTR, &key_value, TABLE)
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::UnsupportedKeyType(_)));

            let err = delete_with(&store, KEY_ATTR, &key_value, TABLE)
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::UnsupportedKeyType(_)));
        }

        assert_eq!(store.remote_calls(), 0);
    }

    #[tokio::test]
    async fn fetch_by_key_misses_cleanly() {
        let store = FakeStore::default();

        let found: Option<CourseRecord> =
            fetch_by_key_with(&store, KEY_ATTR, &KeyValue::from("cs-101"), TABLE)
                .await
                .unwrap();

        assert_eq!(found, None);
        assert_eq!(store.remote_calls(), 1);
    }

    #[tokio::test]
    async fn upsert_then_fetch_round_trips_nested_items() {
        let store = FakeStore::default();
        let record = course("cs-101", "Operating Systems");

        upsert_with(&store, &record, TABLE).await.unwrap();

        let found: Option<CourseRecord> =
            fetch_by_key_with(&store, KEY_ATTR, &KeyValue::from("cs-101"), TABLE)
                .await
                .unwrap();

        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn upsert_replaces_the_existing_item() {
        let store = FakeStore::default();

        upsert_with(&store, &course("cs-101", "Operating Systems"), TABLE)
            .await
            .unwrap();
        upsert_with(&store, &course("cs-101", "Distributed Systems"), TABLE)
            .await
            .unwrap();

        assert_eq!(store.items_in(TABLE), 1);

        let found: Option<CourseRecord> =
            fetch_by_key_with(&store, KEY_ATTR, &KeyValue::from("cs-101"), TABLE)
                .await
                .unwrap();
        assert_eq!(found.unwrap().title, "Distributed Systems");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = FakeStore::default();

        delete_with(&store, KEY_ATTR, &KeyValue::from("cs-101"), TABLE)
            .await
            .unwrap();

        upsert_with(&store, &course("cs-101", "Operating Systems"), TABLE)
            .await
            .unwrap();
        delete_with(&store, KEY_ATTR, &KeyValue::from("cs-101"), TABLE)
            .await
            .unwrap();

        let found: Option<CourseRecord> =
            fetch_by_key_with(&store, KEY_ATTR, &KeyValue::from("cs-101"), TABLE)
                .await
                .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn secondary_index_query_returns_the_matching_page() {
        let store = FakeStore::with_index("TitleIndex");

        upsert_with(&store, &course("cs-101", "Operating Systems"), TABLE)
            .await
            .unwrap();
        upsert_with(&store, &course("cs-102", "Operating Systems"), TABLE)
            .await
            .unwrap();
        upsert_with(&store, &course("cs-103", "Compilers"), TABLE)
            .await
            .unwrap();

        let matching: Vec<CourseRecord> = fetch_by_secondary_index_with(
            &store,
            "Title",
            &KeyValue::from("Operating Systems"),
            "TitleIndex",
            TABLE,
        )
        .await
        .unwrap();

        assert_eq!(matching.len(), 2);

        let none: Vec<CourseRecord> = fetch_by_secondary_index_with(
            &store,
            "Title",
            &KeyValue::from("Databases"),
            "TitleIndex",
            TABLE,
        )
        .await
        .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn unknown_index_surfaces_the_remote_error() {
        let store = FakeStore::with_index("TitleIndex");

        let err = fetch_by_secondary_index_with::<_, CourseRecord>(
            &store,
            "Title",
            &KeyValue::from("Operating Systems"),
            "NoSuchIndex",
            TABLE,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GatewayError::RemoteOperation(_)));
    }

    #[tokio::test]
    async fn empty_key_name_fails_expression_construction() {
        let store = FakeStore::with_index("TitleIndex");

        let err = fetch_by_secondary_index_with::<_, CourseRecord>(
            &store,
            "",
            &KeyValue::from("Operating Systems"),
            "TitleIndex",
            TABLE,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GatewayError::ExpressionBuild(_)));
        assert_eq!(store.remote_calls(), 0);
    }

    #[tokio::test]
    async fn concurrent_upserts_do_not_interfere() {
        let store = Arc::new(FakeStore::default());

        let tasks: Vec<_> = (0..50)
            .map(|n| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let record = course(&format!("cs-{}", n), "Operating Systems");
                    upsert_with(&*store, &record, TABLE).await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.items_in(TABLE), 50);
        assert_eq!(store.remote_calls(), 50);

        let found: Option<CourseRecord> =
            fetch_by_key_with(&*store, KEY_ATTR, &KeyValue::from("cs-17"), TABLE)
                .await
                .unwrap();
        assert_eq!(found.unwrap().id, "cs-17");
    }
}
