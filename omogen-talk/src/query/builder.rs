//! Fluent builder for remote operations
//!
//! Modifiers (`with`, `canonicalize`, `filter`, `query_raw`) take and return
//! the builder; terminal operations consume it. A builder is obtained from
//! [`OmogenClient`] for every call.

use base64::Engine;
use log::{debug, info, warn};
use tokio::io::AsyncWrite;

use crate::client::OmogenClient;
use crate::constants::WHERE_CONNECTOR;
use crate::descriptor::{EntityDescriptor, OperationKind};
use crate::entity::Entity;
use crate::error::{OmogenError, Result};
use crate::query::document::DocumentFile;
use crate::query::request::{Method, QueryRequest};
use crate::relations::RelationTree;
use crate::response::{ApiResponse, PdaResponse};
use crate::transport::{HttpRequest, MultipartPart};

pub struct QueryBuilder<'a> {
    client: &'a OmogenClient,
    entity: Entity,
    request: QueryRequest,
}

impl<'a> QueryBuilder<'a> {
    /// Builder operating on `entity`, authenticated with `token`
    pub fn new(client: &'a OmogenClient, entity: Entity, token: Option<&str>) -> Self {
        Self {
            client,
            entity,
            request: QueryRequest::new(token.map(str::to_string)),
        }
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        self.entity.descriptor()
    }

    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    // === Modifiers ===

    /// Embed related records in the response, given as dotted paths
    pub fn with<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match RelationTree::from_paths(paths).encode() {
            Some(look) => self.request.options.look = Some(look),
            None => debug!("Empty relation list, no expansion requested"),
        }
        self
    }

    /// Ask the store for normalized field names
    pub fn canonicalize(mut self) -> Self {
        self.request.options.canonicalize = true;
        self
    }

    /// Ask for full records rather than identifiers
    pub fn with_data(mut self) -> Self {
        self.request.options.data = true;
        self
    }

    /// `query=<type> dont le <column> <operator> <value>`
    pub fn filter(self, column: &str, operator: &str, value: &str) -> Self {
        let expression = format!("{} {} {} {}", WHERE_CONNECTOR, column, operator, value);
        self.query_raw(&expression)
    }

    /// `query=<type> <expression>`
    pub fn query_raw(mut self, expression: &str) -> Self {
        let clause = format!("query={} {}", self.descriptor().class_name, expression);
        self.request.set_fragment(clause.trim_end());
        self
    }

    // === Reads ===

    /// Decoded API envelope of the current read, without materialization
    pub async fn get_results_raw(mut self) -> Result<ApiResponse> {
        self.request.set_method(Method::Get);
        let (client, _, http) = self.finalize();
        let response = client.transport().send(http).await?;
        ApiResponse::decode(&response.text())?.require_object()
    }

    /// Run the read and materialize every registered record
    pub async fn get(self) -> Result<Vec<Entity>> {
        let client = self.client;
        let response = self.get_results_raw().await?;
        Ok(client.registry().materialize_all(response.records()))
    }

    pub async fn first(self) -> Result<Option<Entity>> {
        Ok(self.get().await?.into_iter().next())
    }

    pub async fn count(self) -> Result<usize> {
        Ok(self.get().await?.len())
    }

    /// Every record of the type, with full data
    pub async fn all(mut self) -> Result<Vec<Entity>> {
        let clause = format!("query={}", self.descriptor().class_name);
        self.request.set_fragment(clause);
        self.request.options.data = true;
        self.get().await
    }

    pub async fn find(mut self, id: &str) -> Result<Option<Entity>> {
        self.request.set_fragment(format!("object={}", id));
        self.request.suppress_id();
        if self.descriptor().persist_class {
            self.request.options.class = Some(self.descriptor().class.clone());
        }
        self.first().await
    }

    /// Like [`QueryBuilder::find`], failing when nothing matches
    pub async fn find_or_fail(self, id: &str) -> Result<Entity> {
        let class_name = self.descriptor().class_name.clone();
        self.find(id).await?.ok_or_else(|| OmogenError::NotFound {
            class_name,
            id: id.to_string(),
        })
    }

    pub async fn many<S: AsRef<str>>(mut self, ids: &[S]) -> Result<Vec<Entity>> {
        let ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        self.request.set_fragment(format!("object={}", ids.join(" ")));
        self.request.suppress_id();
        self.get().await
    }

    // === Writes ===

    /// Create the builder's entity, or send its pending changes
    pub async fn create_or_update(mut self) -> Result<Entity> {
        self.request.set_method(Method::Put);

        let descriptor = self.entity.shared_descriptor();
        let is_update = self.entity.has_changes();
        if descriptor.persist_class || !is_update {
            self.request.options.class = Some(descriptor.class.clone());
        }

        self.request.set_fragment(format!(
            "{}={}",
            descriptor.primary_key,
            self.entity.id().unwrap_or_default()
        ));
        self.request.suppress_id();

        let converted = descriptor.convert(OperationKind::Write, self.entity.pending());
        if !converted.unconverted.is_empty() {
            debug!(
                "{}: not sending unmapped fields {:?}",
                descriptor.class_name,
                converted.unconverted.keys().collect::<Vec<_>>()
            );
        }
        self.request.options.form = converted
            .converted
            .iter()
            .map(|(field, value)| (field.clone(), value.to_wire()))
            .collect();

        let (client, mut entity, http) = self.finalize();
        let response = client.transport().send(http).await?;
        let response = PdaResponse::decode(&response.text()).into_result()?;

        if !response.ignored_fields.is_empty() {
            warn!(
                "{} {}: fields ignored by the remote store: {:?}",
                descriptor.class_name,
                response.id.as_deref().unwrap_or("?"),
                response.ignored_fields
            );
        }

        entity.persisted(response.id.as_deref());
        info!(
            "{} {} {}",
            if is_update { "Updated" } else { "Saved" },
            descriptor.class_name,
            entity.id().unwrap_or("?")
        );
        Ok(entity)
    }

    pub async fn delete(mut self, id: &str) -> Result<PdaResponse> {
        self.request.set_method(Method::Delete);
        let descriptor = self.entity.shared_descriptor();
        self.request
            .set_fragment(format!("{}={}", descriptor.primary_key, id));
        self.request.suppress_id();
        if descriptor.persist_class {
            self.request.options.class = Some(descriptor.class.clone());
        }

        let (client, _, http) = self.finalize();
        let response = client.transport().send(http).await?;
        PdaResponse::decode(&response.text()).into_result()
    }

    /// Attach a file to `field` of the builder's entity
    ///
    /// The payload has exactly four parts: type tag, identifier, the field
    /// holding the file reference, and the reference carrying the bytes.
    pub async fn upload_document(mut self, field: &str, file: DocumentFile) -> Result<PdaResponse> {
        self.request.set_method(Method::Put);

        let descriptor = self.entity.shared_descriptor();
        let id = self
            .entity
            .id()
            .ok_or_else(|| OmogenError::MissingIdentifier(descriptor.class_name.clone()))?
            .to_string();
        let reference = file.reference();

        self.request.options.multipart = Some(vec![
            MultipartPart::Text {
                name: "class".to_string(),
                contents: descriptor.class.clone(),
            },
            MultipartPart::Text {
                name: "id".to_string(),
                contents: id,
            },
            MultipartPart::Text {
                name: field.to_string(),
                contents: reference.clone(),
            },
            MultipartPart::File {
                name: reference,
                file_name: file.file_name,
                bytes: file.contents,
            },
        ]);

        let (client, _, http) = self.finalize();
        let response = client.transport().send(http).await?;
        PdaResponse::decode(&response.text()).into_result()
    }

    // === Documents ===

    /// Stream the document addressed by `path` into `sink`
    pub async fn get_document(
        mut self,
        path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64> {
        self.request.set_method(Method::Doc);
        self.request.set_fragment(path);
        let (client, _, http) = self.finalize();
        client.transport().download(http, sink).await
    }

    /// Fetch the document addressed by `path`, base64-encoded
    pub async fn get_encoded_document(mut self, path: &str) -> Result<String> {
        self.request.set_method(Method::Doc);
        self.request.set_fragment(path);
        let (client, _, http) = self.finalize();
        let response = client.transport().send(http).await?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&response.body))
    }

    /// Prepend the identifier when the type needs it, then compose the request
    fn finalize(mut self) -> (&'a OmogenClient, Entity, HttpRequest) {
        let descriptor = self.entity.descriptor();
        if descriptor.id_required && !self.request.is_id_suppressed() {
            if let Some(id) = self.entity.id() {
                let clause = format!("{}={}", descriptor.primary_key, id);
                self.request.prepend(clause);
            }
        }

        let http = self.request.into_http(&self.client.config().endpoint());
        debug!("Omogen request target: {}", http.url);
        (self.client, self.entity, http)
    }
}

impl std::fmt::Debug for QueryBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("class_name", &self.descriptor().class_name)
            .field("request", &self.request)
            .finish()
    }
}
