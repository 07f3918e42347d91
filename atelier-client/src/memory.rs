//! In-memory data provider
//!
//! Behaves like the hosted API closely enough for pipeline tests:
//! server-assigned snowflake ids, audit timestamps, version
//! compare-and-swap on order headers, filtered list queries, and
//! programmable per-operation failures.

use crate::provider::DataProvider;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{Value, json};
use shared::util::{now_millis, snowflake_id};
use shared::{ListQuery, ProviderError, ProviderResult, Resource};
use std::cmp::Ordering;

/// Operations a failure rule can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOp {
    Create,
    Update,
    Delete,
    List,
}

/// One observed provider call, logged before execution
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderCall {
    pub op: ProviderOp,
    pub resource: Resource,
    pub id: Option<i64>,
}

#[derive(Debug, Clone)]
struct FailureRule {
    error: ProviderError,
    /// None fails every matching call; Some(n) fails the next n
    remaining: Option<u32>,
}

/// In-memory tables keyed by (resource, id)
#[derive(Debug, Default)]
pub struct MemoryProvider {
    rows: DashMap<(Resource, i64), Value>,
    failures: DashMap<(Resource, ProviderOp), FailureRule>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every matching call until [`clear_failures`](Self::clear_failures)
    pub fn fail_on(&self, resource: Resource, op: ProviderOp, error: ProviderError) {
        self.failures.insert(
            (resource, op),
            FailureRule {
                error,
                remaining: None,
            },
        );
    }

    /// Fail only the next matching call
    pub fn fail_once(&self, resource: Resource, op: ProviderOp, error: ProviderError) {
        self.failures.insert(
            (resource, op),
            FailureRule {
                error,
                remaining: Some(1),
            },
        );
    }

    /// Remove all armed failure rules
    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Insert a record directly, assigning missing server fields.
    /// Returns the record id.
    ///
    /// Panics if `values` is not a JSON object; this is a fixture API.
    pub fn seed(&self, resource: Resource, values: Value) -> i64 {
        let Value::Object(mut map) = values else {
            panic!("seed expects a JSON object");
        };

        let id = map
            .get("id")
            .and_then(Value::as_i64)
            .unwrap_or_else(snowflake_id);
        map.insert("id".to_string(), json!(id));
        if resource == Resource::Orders {
            map.entry("version".to_string()).or_insert(json!(1));
            map.entry("total_amount".to_string()).or_insert(json!(0.0));
        }
        let now = now_millis();
        map.entry("created_at".to_string()).or_insert(json!(now));
        map.entry("updated_at".to_string()).or_insert(json!(now));

        self.rows.insert((resource, id), Value::Object(map));
        id
    }

    /// Stored record, if present
    pub fn record(&self, resource: Resource, id: i64) -> Option<Value> {
        self.rows.get(&(resource, id)).map(|e| e.value().clone())
    }

    /// Number of stored records of a resource
    pub fn count(&self, resource: Resource) -> usize {
        self.rows.iter().filter(|e| e.key().0 == resource).count()
    }

    /// Every call attempted so far, in order
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    /// Number of attempted calls of one kind
    pub fn calls_for(&self, resource: Resource, op: ProviderOp) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.resource == resource && c.op == op)
            .count()
    }

    fn log(&self, op: ProviderOp, resource: Resource, id: Option<i64>) {
        self.calls.lock().push(ProviderCall { op, resource, id });
    }

    fn take_failure(&self, resource: Resource, op: ProviderOp) -> Option<ProviderError> {
        let key = (resource, op);
        let mut rule = self.failures.get_mut(&key)?;
        let error = rule.error.clone();
        match &mut rule.remaining {
            None => Some(error),
            Some(n) => {
                *n -= 1;
                let exhausted = *n == 0;
                drop(rule);
                if exhausted {
                    self.failures.remove(&key);
                }
                Some(error)
            }
        }
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    async fn create(&self, resource: Resource, values: Value) -> ProviderResult<Value> {
        self.log(ProviderOp::Create, resource, None);
        if let Some(err) = self.take_failure(resource, ProviderOp::Create) {
            return Err(err);
        }

        let Value::Object(mut map) = values else {
            return Err(ProviderError::validation("Payload must be a JSON object"));
        };

        let id = snowflake_id();
        map.insert("id".to_string(), json!(id));
        if resource == Resource::Orders {
            map.insert("version".to_string(), json!(1));
            // Column default; the hosted API always returns the total
            map.entry("total_amount".to_string()).or_insert(json!(0.0));
        }
        let now = now_millis();
        map.insert("created_at".to_string(), json!(now));
        map.insert("updated_at".to_string(), json!(now));

        let record = Value::Object(map);
        self.rows.insert((resource, id), record.clone());
        Ok(record)
    }

    async fn update(&self, resource: Resource, id: i64, values: Value) -> ProviderResult<Value> {
        self.log(ProviderOp::Update, resource, Some(id));
        if let Some(err) = self.take_failure(resource, ProviderOp::Update) {
            return Err(err);
        }

        let Value::Object(values) = values else {
            return Err(ProviderError::validation("Payload must be a JSON object"));
        };

        let key = (resource, id);
        let mut entry = self
            .rows
            .get_mut(&key)
            .ok_or_else(|| ProviderError::not_found(resource, id))?;
        let row = entry
            .value_mut()
            .as_object_mut()
            .ok_or_else(|| ProviderError::unknown(format!("{resource} {id} is not an object")))?;

        // Order headers enforce compare-and-swap on the version column
        let mut bumped_version = None;
        if resource == Resource::Orders {
            let current = row.get("version").and_then(Value::as_i64).unwrap_or(0);
            match values.get("version").and_then(Value::as_i64) {
                None => {
                    return Err(ProviderError::validation(
                        "order updates must carry the loaded version",
                    ));
                }
                Some(sent) if sent != current => {
                    return Err(ProviderError::version_conflict(resource, id));
                }
                Some(_) => bumped_version = Some(current + 1),
            }
        }

        for (k, v) in values {
            // Server-owned columns are never writable through the payload
            if k == "id" || k == "created_at" || k == "version" {
                continue;
            }
            row.insert(k, v);
        }
        if let Some(next) = bumped_version {
            row.insert("version".to_string(), json!(next));
        }
        row.insert("updated_at".to_string(), json!(now_millis()));

        Ok(Value::Object(row.clone()))
    }

    async fn delete_one(&self, resource: Resource, id: i64) -> ProviderResult<()> {
        self.log(ProviderOp::Delete, resource, Some(id));
        if let Some(err) = self.take_failure(resource, ProviderOp::Delete) {
            return Err(err);
        }

        self.rows
            .remove(&(resource, id))
            .ok_or_else(|| ProviderError::not_found(resource, id))?;
        Ok(())
    }

    async fn get_list(&self, resource: Resource, query: ListQuery) -> ProviderResult<Vec<Value>> {
        self.log(ProviderOp::List, resource, None);
        if let Some(err) = self.take_failure(resource, ProviderOp::List) {
            return Err(err);
        }

        let mut records: Vec<Value> = self
            .rows
            .iter()
            .filter(|e| e.key().0 == resource)
            .map(|e| e.value().clone())
            .collect();

        if let Some(filter) = query.filter.as_ref().and_then(Value::as_object) {
            records.retain(|r| filter.iter().all(|(k, v)| r.get(k) == Some(v)));
        }

        sort_records(&mut records, query.sort.as_deref().unwrap_or("id"));

        if let Some(limit) = query.limit {
            let page = query.page.unwrap_or(1).max(1) as usize;
            let limit = limit as usize;
            records = records
                .into_iter()
                .skip((page - 1) * limit)
                .take(limit)
                .collect();
        }

        Ok(records)
    }
}

/// Sort by a field name; a "_desc" suffix reverses the order
fn sort_records(records: &mut [Value], sort: &str) {
    let (field, descending) = match sort.strip_suffix("_desc") {
        Some(field) => (field, true),
        None => (sort, false),
    };
    records.sort_by(|a, b| compare_fields(a.get(field), b.get(field)));
    if descending {
        records.reverse();
    }
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            } else if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
                x.cmp(y)
            } else {
                Ordering::Equal
            }
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
