//! In-memory fakes for the fetcher, store and throttle collaborators.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    error::{FetchError, StoreError},
    fetch::{RawRecord, RecordFetcher},
    normalize::SchemeRecord,
    store::{Listing, RecordStore, StoredRecord},
    sync::Throttle,
};

#[derive(Default)]
pub struct FakeFetcher {
    pub records: HashMap<String, Vec<RawRecord>>,
    pub failing: Vec<String>,
}

#[async_trait]
impl RecordFetcher for FakeFetcher {
    async fn fetch(&self, district: &str, _limit: u32) -> Result<Vec<RawRecord>, FetchError> {
        if self.failing.iter().any(|d| d == district) {
            return Err(FetchError::Status(503));
        }

        Ok(self.records.get(district).cloned().unwrap_or_default())
    }
}

pub struct FakeStore {
    pub documents: Mutex<Vec<StoredRecord>>,
    fail_inserts: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Self::failing_first(0)
    }

    /// A store that rejects the first `n` inserts, then behaves.
    pub fn failing_first(n: usize) -> Arc<Self> {
        Arc::new(Self {
            documents: Mutex::new(Vec::new()),
            fail_inserts: AtomicUsize::new(n),
            next_id: AtomicUsize::new(1),
        })
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn insert(&self, record: &SchemeRecord) -> Result<String, StoreError> {
        let remaining = self.fail_inserts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_inserts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Rejected {
                status: 409,
                message: "document already exists".to_string(),
            });
        }

        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.documents.lock().unwrap().push(StoredRecord {
            id: id.clone(),
            record: record.clone(),
        });

        Ok(id)
    }

    async fn replace(&self, id: &str, record: &SchemeRecord) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().unwrap();

        match documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                doc.record = record.clone();
                Ok(())
            }
            None => Err(StoreError::Rejected {
                status: 404,
                message: "document not found".to_string(),
            }),
        }
    }

    async fn list(&self, filter: Option<(&str, &str)>) -> Result<Listing, StoreError> {
        let documents: Vec<StoredRecord> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| match filter {
                Some(("district", value)) => d.record.district == value,
                Some(_) => false,
                None => true,
            })
            .cloned()
            .collect();

        Ok(Listing {
            total: documents.len(),
            documents,
        })
    }
}

#[derive(Default)]
pub struct CountingThrottle {
    pub pauses: AtomicUsize,
}

#[async_trait]
impl Throttle for CountingThrottle {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}
