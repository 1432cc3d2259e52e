//! An in-memory stand-in for the json-server data service.

use anyhow::anyhow;
use serde_json::{json, Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::network::{Method, Request, Response, Transport};

#[derive(Default)]
pub struct FakeBackend {
    collections: RefCell<BTreeMap<String, Vec<Value>>>,
    requests: RefCell<Vec<Request>>,
    next_id: Cell<u64>,
    offline: Cell<bool>,
}

fn id_of(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn field_text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn reply(status: u16, body: Value) -> Response {
    Response {
        status,
        body: body.to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: &str, record: Value) {
        self.collections
            .borrow_mut()
            .entry(collection.to_owned())
            .or_default()
            .push(record);
    }

    pub fn records(&self, collection: &str) -> Vec<Value> {
        self.collections
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn go_offline(&self) {
        self.offline.set(true);
    }

    fn handle(&self, request: &Request) -> Response {
        let mut segments = request.path.trim_matches('/').splitn(2, '/');
        let collection = segments.next().unwrap_or_default().to_owned();
        let id = segments.next().map(str::to_owned);
        let mut collections = self.collections.borrow_mut();
        let records = collections.entry(collection).or_default();

        match (request.method, id) {
            (Method::Get, None) => {
                let found: Vec<Value> = records
                    .iter()
                    .filter(|record| {
                        request.query.iter().all(|(key, value)| {
                            field_text(record, key).as_deref() == Some(value.as_str())
                        })
                    })
                    .cloned()
                    .collect();
                reply(200, Value::Array(found))
            }
            (Method::Get, Some(id)) => records
                .iter()
                .find(|record| id_of(record).as_deref() == Some(id.as_str()))
                .map_or_else(|| reply(404, json!({})), |record| reply(200, record.clone())),
            (Method::Post, None) => {
                let mut record = request.body.clone().unwrap_or(Value::Object(Map::new()));
                if id_of(&record).is_none() {
                    self.next_id.set(self.next_id.get() + 1);
                    record["id"] = Value::String(format!("gen-{}", self.next_id.get()));
                }
                records.push(record.clone());
                reply(201, record)
            }
            (Method::Patch, Some(id)) => {
                let Some(record) = records
                    .iter_mut()
                    .find(|record| id_of(record).as_deref() == Some(id.as_str()))
                else {
                    return reply(404, json!({}));
                };
                if let (Some(target), Some(Value::Object(changes))) =
                    (record.as_object_mut(), request.body.as_ref())
                {
                    for (key, value) in changes {
                        target.insert(key.clone(), value.clone());
                    }
                }
                reply(200, record.clone())
            }
            _ => reply(404, json!({})),
        }
    }
}

impl Transport for FakeBackend {
    async fn send(&self, request: Request) -> anyhow::Result<Response> {
        self.requests.borrow_mut().push(request.clone());
        if self.offline.get() {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.handle(&request))
    }
}
