//! Omogen client: configuration, transport and type registry in one place
//!
//! The client hands out a fresh [`QueryBuilder`] for every operation; a
//! builder is consumed by its terminal call and never reused.

use std::sync::Arc;

use log::debug;

use crate::config::OmogenConfig;
use crate::descriptor::{EntityDescriptor, OperationKind};
use crate::entity::Entity;
use crate::error::Result;
use crate::query::{DocumentFile, QueryBuilder};
use crate::registry::TypeRegistry;
use crate::response::PdaResponse;
use crate::transport::{ReqwestTransport, Transport};

pub struct OmogenClient {
    config: OmogenConfig,
    registry: Arc<TypeRegistry>,
    transport: Arc<dyn Transport>,
}

impl OmogenClient {
    /// Client over HTTP
    pub fn new(config: OmogenConfig, registry: TypeRegistry) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, registry, Arc::new(transport)))
    }

    pub fn with_transport(
        config: OmogenConfig,
        registry: TypeRegistry,
        transport: Arc<dyn Transport>,
    ) -> Self {
        debug!(
            "Omogen client on {} with {} entity types",
            config.endpoint(),
            registry.len()
        );
        Self {
            config,
            registry: Arc::new(registry),
            transport,
        }
    }

    pub fn config(&self) -> &OmogenConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Empty, new entity of a registered type
    pub fn entity(&self, class_name: &str) -> Result<Entity> {
        Ok(Entity::new(self.registry.require(class_name)?))
    }

    /// Fresh builder for a registered type
    pub fn query(&self, class_name: &str, token: Option<&str>) -> Result<QueryBuilder<'_>> {
        Ok(self.builder_for(self.entity(class_name)?, token))
    }

    /// Fresh builder for a descriptor, registered or not
    pub fn query_descriptor(
        &self,
        descriptor: Arc<EntityDescriptor>,
        token: Option<&str>,
    ) -> QueryBuilder<'_> {
        self.builder_for(Entity::new(descriptor), token)
    }

    /// Fresh builder operating on an existing entity
    pub fn builder_for(&self, entity: Entity, token: Option<&str>) -> QueryBuilder<'_> {
        QueryBuilder::new(self, entity, token)
    }

    /// Create or update an entity
    pub async fn save(&self, entity: Entity, token: Option<&str>) -> Result<Entity> {
        self.builder_for(entity, token).create_or_update().await
    }

    pub async fn delete(&self, class_name: &str, id: &str, token: Option<&str>) -> Result<PdaResponse> {
        self.query(class_name, token)?.delete(id).await
    }

    /// Upload several files onto an entity with an admin session
    ///
    /// Field names are local and go through the write conversion table. Each
    /// file is sent by its own builder.
    pub async fn upload_documents(
        &self,
        entity: &Entity,
        files: Vec<(String, DocumentFile)>,
    ) -> Result<Vec<PdaResponse>> {
        let token = self.admin_token().await?;
        let conversions = &entity.descriptor().conversions;

        let mut responses = Vec::with_capacity(files.len());
        for (field, file) in files {
            let remote = conversions.rename(OperationKind::Write, &field).to_string();
            let response = self
                .builder_for(entity.clone(), Some(&token))
                .upload_document(&remote, file)
                .await?;
            responses.push(response);
        }
        Ok(responses)
    }
}

impl std::fmt::Debug for OmogenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmogenClient")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
