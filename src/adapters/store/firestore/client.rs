//! Firestore REST client
//!
//! Thin wrapper over the Firestore v1 REST API for a single collection.

use super::models::{ordered_by_nombre_query, FirestoreDocument, RunQueryItem};
use crate::adapters::identity::TokenProvider;
use crate::config::{FirebaseConfig, SecretString};
use crate::domain::{Patient, PatientId, PatientUpdate, Result, StoreError};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Firestore client bound to one project, database and collection
pub struct FirestoreClient {
    client: Client,
    documents_url: String,
    documents: Url,
    collection: String,
    api_key: SecretString,
    tokens: Arc<dyn TokenProvider>,
}

impl FirestoreClient {
    /// Create a client from configuration
    ///
    /// Requests carry the signed-in user's ID token when `tokens` has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot carry document paths.
    pub fn new(config: &FirebaseConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StoreError::ConnectionFailed(format!("HTTP client: {e}")))?;

        let documents_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.firestore_base_url.trim_end_matches('/'),
            config.project_id,
            config.database_id
        );
        let documents = Url::parse(&documents_url)
            .map_err(|e| StoreError::ConnectionFailed(format!("Firestore URL: {e}")))?;
        if documents.cannot_be_a_base() {
            return Err(StoreError::ConnectionFailed(format!(
                "Firestore URL cannot hold document paths: {documents_url}"
            ))
            .into());
        }

        Ok(Self {
            client,
            documents_url,
            documents,
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
            tokens,
        })
    }

    /// Collection this client reads and writes
    pub fn collection(&self) -> &str {
        &self.collection
    }

    // Segments are percent-encoded, so keys with reserved characters stay one segment.
    fn document_url(&self, id: &PatientId) -> Url {
        let mut url = self.documents.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&self.collection)
                .push(id.as_str());
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.query(&[("key", self.api_key.expose_secret().as_str())]);
        match self.tokens.bearer_token() {
            Some(token) => request.bearer_auth(token.expose_secret().as_str()),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        on_failure: fn(String) -> StoreError,
    ) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = format!("status {status}: {body}");
        let error = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StoreError::PermissionDenied(message)
            }
            StatusCode::NOT_FOUND => StoreError::DocumentNotFound(message),
            _ => on_failure(message),
        };
        Err(error.into())
    }

    /// Fetch the whole collection ordered by `nombre`
    pub async fn run_query(&self) -> Result<Vec<Patient>> {
        let url = format!("{}:runQuery", self.documents_url);
        tracing::debug!(collection = %self.collection, "Running Firestore query");

        let request = self
            .client
            .post(&url)
            .json(&ordered_by_nombre_query(&self.collection));
        let response = self.send(request, StoreError::QueryFailed).await?;

        let items: Vec<RunQueryItem> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|doc| doc.to_patient())
            .collect()
    }

    /// Create a document with an auto-generated key
    pub async fn create_document(&self, patient: &Patient) -> Result<PatientId> {
        let url = format!("{}/{}", self.documents_url, self.collection);
        let body = FirestoreDocument::from_patient(patient)?;

        let request = self.client.post(&url).json(&body);
        let response = self.send(request, StoreError::InsertFailed).await?;

        let created: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        created.document_id().ok_or_else(|| {
            StoreError::InvalidResponse(format!(
                "created document without a usable name: {:?}",
                created.name
            ))
            .into()
        })
    }

    /// Write the present fields of `changes` onto an existing document
    pub async fn patch_document(&self, id: &PatientId, changes: &PatientUpdate) -> Result<()> {
        let body = FirestoreDocument::from_update(changes)?;

        let mut params: Vec<(&str, &str)> = changes
            .field_paths()
            .into_iter()
            .map(|path| ("updateMask.fieldPaths", path))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let request = self
            .client
            .patch(self.document_url(id))
            .query(&params)
            .json(&body);
        self.send(request, StoreError::UpdateFailed).await?;
        Ok(())
    }

    /// Delete a document
    pub async fn delete_document(&self, id: &PatientId) -> Result<()> {
        let request = self.client.delete(self.document_url(id));
        self.send(request, StoreError::DeleteFailed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    struct NoToken;

    impl TokenProvider for NoToken {
        fn bearer_token(&self) -> Option<SecretString> {
            None
        }
    }

    fn client() -> FirestoreClient {
        let mut config = FirebaseConfig::new("demo-clinic", secret_string("key".to_string()));
        config.firestore_base_url = "http://localhost:8080/".to_string();
        FirestoreClient::new(&config, Arc::new(NoToken)).unwrap()
    }

    #[test]
    fn test_document_url_appends_collection_and_key() {
        let url = client().document_url(&PatientId::new("abc123").unwrap());
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/projects/demo-clinic/databases/(default)/documents/pacientes/abc123"
        );
    }

    #[test]
    fn test_document_url_encodes_reserved_characters() {
        let url = client().document_url(&PatientId::new("a b?c#d%e").unwrap());
        assert_eq!(url.path_segments().unwrap().last(), Some("a%20b%3Fc%23d%25e"));
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }
}
