use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use qdrant_client;
use self::qdrant_client::qdrant::value::Kind as QdrantValueKind;
use self::qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, PointStruct, SearchPoints, UpsertPointsBuilder,
    VectorParams, Vectors, WithPayloadSelector, WithVectorsSelector,
};
use self::qdrant_client::{Payload, Qdrant, QdrantError};

use crate::domain::page::{PageMetadata, PageToUpsert, SearchResult};
use crate::domain::vector_repository::VectorRepository;

/// Stored point payload: page content plus flattened metadata.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct PagePayload {
    content: String,
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    crawl_date: String,
}

pub struct VectorDb {
    client: Box<Qdrant>,
    collection_name: String,
    vector_size: u64,
}

impl VectorDb {
    pub fn new(client: Box<Qdrant>, collection_name: String, vector_size: u64) -> Result<Self> {
        if collection_name.is_empty() {
            return Err(anyhow!("Collection name cannot be empty"));
        }
        if vector_size == 0 {
            return Err(anyhow!("Vector size must be greater than zero"));
        }
        Ok(Self {
            client,
            collection_name,
            vector_size,
        })
    }

    /// Creates the cosine-distance collection sized for this instance's
    /// vectors. A collection that already exists is fine; any other
    /// creation failure propagates and aborts startup.
    pub async fn initialize_collection(&self) -> Result<()> {
        log::info!(
            "Creating collection '{}' with size {} and distance Cosine...",
            self.collection_name,
            self.vector_size
        );

        let vector_params = VectorParams {
            size: self.vector_size,
            distance: Distance::Cosine.into(),
            ..Default::default()
        };
        let create_builder =
            CreateCollectionBuilder::new(self.collection_name.clone()).vectors_config(vector_params);

        match self.client.create_collection(create_builder).await {
            Ok(_) => {
                log::info!("Created collection '{}'.", self.collection_name);
                Ok(())
            }
            Err(QdrantError::ResponseError { status })
                if status.code() == tonic::Code::AlreadyExists =>
            {
                log::info!("Collection '{}' already exists.", self.collection_name);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to create collection '{}': {}", self.collection_name, e);
                Err(anyhow!("Failed to create collection: {}", e))
            }
        }
    }

    /// Upserts one point per page, each as its own write. The point id is a
    /// UUIDv5 of the page URL, so the same page always lands on the same id.
    pub async fn upsert_pages_impl(&self, pages: &[PageToUpsert]) -> Result<()> {
        if pages.is_empty() {
            log::info!("No pages provided for upsert.");
            return Ok(());
        }

        for page in pages {
            let payload_struct = PagePayload {
                content: page.content.clone(),
                url: page.url.clone(),
                title: page.metadata.title.clone(),
                description: page.metadata.description.clone(),
                language: page.metadata.language.clone(),
                crawl_date: page.metadata.crawl_date.clone(),
            };
            let payload_value = serde_json::to_value(payload_struct)
                .map_err(|e| anyhow!("Failed to serialize payload for '{}': {}", page.url, e))?;
            let payload = Payload::try_from(payload_value)
                .map_err(|e| anyhow!("Failed to convert payload for '{}': {}", page.url, e))?;

            let point_id = PointId::from(page_point_id(&page.url).to_string());
            let point = PointStruct {
                id: Some(point_id),
                vectors: Some(Vectors::from(page.vector.clone())),
                payload: payload.into(),
            };

            let upsert_builder =
                UpsertPointsBuilder::new(self.collection_name.clone(), vec![point]).wait(true);
            self.client
                .upsert_points(upsert_builder)
                .await
                .map_err(|e| anyhow!("Qdrant upsert failed for '{}': {}", page.url, e))?;
            log::debug!("Upserted point for {}", page.url);
        }

        log::info!(
            "Upserted {} points into collection '{}'.",
            pages.len(),
            self.collection_name
        );
        Ok(())
    }

    pub async fn search_impl(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if query_vector.len() as u64 != self.vector_size {
            return Err(anyhow!(
                "Query vector dimension ({}) does not match collection dimension ({})",
                query_vector.len(),
                self.vector_size
            ));
        }

        log::info!(
            "Searching in collection '{}' with limit {}...",
            self.collection_name,
            limit
        );

        let search_request = SearchPoints {
            collection_name: self.collection_name.clone(),
            vector: query_vector,
            limit: limit as u64,
            with_payload: Some(WithPayloadSelector {
                selector_options: Some(
                    qdrant_client::qdrant::with_payload_selector::SelectorOptions::Enable(true),
                ),
            }),
            with_vectors: Some(WithVectorsSelector {
                selector_options: Some(
                    qdrant_client::qdrant::with_vectors_selector::SelectorOptions::Enable(false),
                ),
            }),
            ..Default::default()
        };

        let response = self
            .client
            .search_points(search_request)
            .await
            .map_err(|e| anyhow!("Qdrant search failed: {}", e))?;

        let results = response
            .result
            .into_iter()
            .filter_map(|scored_point| {
                if scored_point.payload.is_empty() {
                    log::warn!(
                        "Search result point {:?} has no payload, skipping.",
                        scored_point.id
                    );
                    return None;
                }
                let json_value = payload_map_to_json(scored_point.payload);
                match serde_json::from_value::<PagePayload>(json_value) {
                    Ok(payload) => Some(SearchResult {
                        score: scored_point.score,
                        content: payload.content,
                        url: payload.url,
                        metadata: PageMetadata {
                            title: payload.title,
                            description: payload.description,
                            language: payload.language,
                            crawl_date: payload.crawl_date,
                        },
                    }),
                    Err(e) => {
                        log::error!(
                            "Failed to deserialize payload from search result {:?}: {}",
                            scored_point.id,
                            e
                        );
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        log::info!("Search returned {} results.", results.len());
        Ok(results)
    }
}

/// Deterministic point id for a page URL (UUIDv5 in the URL namespace).
pub fn page_point_id(url: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes())
}

fn payload_map_to_json(
    payload_map: std::collections::HashMap<String, qdrant_client::qdrant::Value>,
) -> serde_json::Value {
    let mut json_map = serde_json::Map::new();
    for (key, value) in payload_map {
        json_map.insert(key, qdrant_value_to_json(value));
    }
    serde_json::Value::Object(json_map)
}

fn qdrant_value_to_json(value: qdrant_client::qdrant::Value) -> serde_json::Value {
    match value.kind {
        Some(QdrantValueKind::NullValue(_)) | None => serde_json::Value::Null,
        Some(QdrantValueKind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(QdrantValueKind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(QdrantValueKind::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(QdrantValueKind::StringValue(s)) => serde_json::Value::String(s),
        Some(QdrantValueKind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(qdrant_value_to_json).collect(),
        ),
        Some(QdrantValueKind::StructValue(s)) => payload_map_to_json(s.fields),
    }
}

#[async_trait]
impl VectorRepository for VectorDb {
    async fn upsert_pages(&self, pages: &[PageToUpsert]) -> Result<()> {
        self.upsert_pages_impl(pages).await
    }

    async fn search(&self, query_vector: Vec<f32>, limit: usize) -> Result<Vec<SearchResult>> {
        self.search_impl(query_vector, limit).await
    }
}
