//! In-memory `RestClient` for provider tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fortios_core::mapper::Record;

use crate::client::{ClientError, ClientResult, RestClient};

/// Stores objects keyed by `<path>/<mkey>` (or `<path>` for singletons)
/// and records the last request body and vdom.
#[derive(Default)]
pub struct MemoryClient {
    objects: Mutex<HashMap<String, Record>>,
    next_id: Mutex<u64>,
    last_body: Mutex<Option<Record>>,
    last_vdom: Mutex<Option<String>>,
    failing: Mutex<bool>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, mkey: Option<&str>, record: serde_json::Value) {
        let record = record.as_object().cloned().unwrap_or_default();
        self.objects.lock().unwrap().insert(key(path, mkey), record);
    }

    pub fn object(&self, path: &str, mkey: Option<&str>) -> Option<Record> {
        self.objects.lock().unwrap().get(&key(path, mkey)).cloned()
    }

    pub fn last_body(&self) -> Option<Record> {
        self.last_body.lock().unwrap().clone()
    }

    pub fn last_vdom(&self) -> Option<String> {
        self.last_vdom.lock().unwrap().clone()
    }

    /// Make every following request fail with HTTP 500
    pub fn fail_requests(&self) {
        *self.failing.lock().unwrap() = true;
    }

    fn record_request(&self, body: Option<&Record>, vdom: Option<&str>) -> ClientResult<()> {
        *self.last_vdom.lock().unwrap() = vdom.map(|v| v.to_string());
        if let Some(body) = body {
            *self.last_body.lock().unwrap() = Some(body.clone());
        }
        if *self.failing.lock().unwrap() {
            return Err(ClientError::Api {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

fn key(path: &str, mkey: Option<&str>) -> String {
    match mkey {
        Some(mkey) => format!("{}/{}", path, mkey),
        None => path.to_string(),
    }
}

/// The mkey a body names, if any
fn body_mkey(body: &Record) -> Option<String> {
    ["name", "id"]
        .iter()
        .filter_map(|k| body.get(*k))
        .find_map(crate::utils::json_to_mkey)
}

fn mkey_response(mkey: &str) -> Record {
    let mut response = Record::new();
    let value = match mkey.parse::<u64>() {
        Ok(n) => serde_json::Value::from(n),
        Err(_) => serde_json::Value::String(mkey.to_string()),
    };
    response.insert("mkey".to_string(), value);
    response
}

#[async_trait]
impl RestClient for MemoryClient {
    async fn create(&self, path: &str, mut body: Record, vdom: Option<&str>) -> ClientResult<Record> {
        self.record_request(Some(&body), vdom)?;
        let mkey = match body_mkey(&body) {
            Some(mkey) => mkey,
            None => {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                body.insert("id".to_string(), serde_json::Value::from(*next_id));
                next_id.to_string()
            }
        };
        body.insert("q_origin_key".to_string(), serde_json::Value::String(mkey.clone()));
        self.objects
            .lock()
            .unwrap()
            .insert(key(path, Some(&mkey)), body);
        Ok(mkey_response(&mkey))
    }

    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> ClientResult<Option<Record>> {
        self.record_request(None, vdom)?;
        Ok(self.object(path, mkey))
    }

    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        body: Record,
        vdom: Option<&str>,
    ) -> ClientResult<Record> {
        self.record_request(Some(&body), vdom)?;
        let mut objects = self.objects.lock().unwrap();
        let mut record = objects.remove(&key(path, mkey)).unwrap_or_default();
        record.extend(body);

        let new_mkey = mkey.map(|old| body_mkey(&record).unwrap_or_else(|| old.to_string()));
        objects.insert(key(path, new_mkey.as_deref()), record);
        Ok(new_mkey.map(|m| mkey_response(&m)).unwrap_or_default())
    }

    async fn delete(&self, path: &str, mkey: &str, vdom: Option<&str>) -> ClientResult<()> {
        self.record_request(None, vdom)?;
        match self.objects.lock().unwrap().remove(&key(path, Some(mkey))) {
            Some(_) => Ok(()),
            None => Err(ClientError::Api {
                status: 404,
                message: format!("{}/{} not found", path, mkey),
            }),
        }
    }
}
