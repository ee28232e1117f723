//! Hosted document-store client.
//!
//! Speaks the store's REST API directly: one collection of scheme records,
//! addressed by project/database/collection identifiers with key auth headers
//! on every request. The service never deletes documents.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{config::Config, error::StoreError, normalize::SchemeRecord};

/// A record as the store returns it, document id included.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredRecord {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(flatten)]
    pub record: SchemeRecord,
}

#[derive(Deserialize, Debug, Default)]
pub struct Listing {
    pub total: usize,
    #[serde(default)]
    pub documents: Vec<StoredRecord>,
}

#[derive(Deserialize)]
struct CreatedDocument {
    #[serde(rename = "$id")]
    id: String,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new document, returning its id.
    async fn insert(&self, record: &SchemeRecord) -> Result<String, StoreError>;

    /// Overwrite an existing document in place. Only used in upsert mode.
    async fn replace(&self, id: &str, record: &SchemeRecord) -> Result<(), StoreError>;

    /// List documents, optionally restricted by an equality filter on a
    /// single field.
    async fn list(&self, filter: Option<(&str, &str)>) -> Result<Listing, StoreError>;
}

pub struct DocumentStore {
    client: Client,
    documents_url: String,
    project: String,
    key: String,
}

impl DocumentStore {
    pub fn new(config: &Config) -> Self {
        let documents_url = format!(
            "{}/databases/{}/collections/{}/documents",
            config.store_endpoint, config.store_database, config.store_collection
        );

        Self {
            client: Client::new(),
            documents_url,
            project: config.store_project.clone(),
            key: config.store_key.clone(),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("X-Appwrite-Project", &self.project)
            .header("X-Appwrite-Key", &self.key)
    }
}

#[async_trait]
impl RecordStore for DocumentStore {
    async fn insert(&self, record: &SchemeRecord) -> Result<String, StoreError> {
        let response = self
            .request(Method::POST, &self.documents_url)
            .json(&json!({ "documentId": "unique()", "data": record }))
            .send()
            .await?;

        let created: CreatedDocument = accept(response).await?.json().await?;
        Ok(created.id)
    }

    async fn replace(&self, id: &str, record: &SchemeRecord) -> Result<(), StoreError> {
        let url = format!("{}/{id}", self.documents_url);

        let response = self
            .request(Method::PATCH, &url)
            .json(&json!({ "data": record }))
            .send()
            .await?;

        accept(response).await?;
        Ok(())
    }

    /// The store caps an unqualified listDocuments call at 25 rows, so every
    /// page asks for an explicit limit and offset, and pages are walked until
    /// the full matching set is in hand.
    async fn list(&self, filter: Option<(&str, &str)>) -> Result<Listing, StoreError> {
        let mut documents = Vec::new();
        let mut total = 0;

        loop {
            let mut request = self
                .request(Method::GET, &self.documents_url)
                .query(&page_query(LIST_PAGE_SIZE, documents.len()));

            if let Some((field, value)) = filter {
                request = request.query(&[("queries[]", equality_query(field, value))]);
            }

            let response = request.send().await?;
            let page: Listing = accept(response).await?.json().await?;

            total = page.total;
            let fetched = page.documents.len();
            documents.extend(page.documents);

            if fetched < LIST_PAGE_SIZE || documents.len() >= total {
                break;
            }
        }

        Ok(Listing { total, documents })
    }
}

/// Rows fetched per listDocuments page.
const LIST_PAGE_SIZE: usize = 100;

fn equality_query(field: &str, value: &str) -> String {
    format!("equal(\"{field}\", [\"{value}\"])")
}

fn page_query(limit: usize, offset: usize) -> [(&'static str, String); 2] {
    [
        ("queries[]", format!("limit({limit})")),
        ("queries[]", format!("offset({offset})")),
    ]
}

async fn accept(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}
