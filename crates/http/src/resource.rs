//! Generic CRUD resource.
//!
//! One implementation of list/create/retrieve/replace/amend/delete serves every
//! entity; a [`Resource`] only names its collection, declares its [`Schema`]
//! and turns validated fields into the entity's draft.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use libris_db::{Entity, RecordId, Repository};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::schema::{expect_object, Schema, ValidatedFields};

/// Prefix shared by every resource collection.
pub const API_PREFIX: &str = "/v1";

/// Draft type of a resource's entity.
pub type DraftOf<R> = <<R as Resource>::Entity as Entity>::Draft;

pub trait Resource: Send + Sync + 'static {
    type Entity: Entity;

    /// Collection segment under [`API_PREFIX`], e.g. `books`.
    fn collection(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    fn draft(&self, fields: ValidatedFields) -> Result<DraftOf<Self>, AppError>;
}

/// `/v1/<collection>`
pub fn collection_path(collection: &str) -> String {
    format!("{API_PREFIX}/{collection}")
}

pub struct ResourceState<R: Resource> {
    resource: Arc<R>,
    repository: Arc<dyn Repository<R::Entity>>,
}

impl<R: Resource> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            repository: self.repository.clone(),
        }
    }
}

impl<R: Resource> ResourceState<R> {
    fn draft_from(&self, body: &Value) -> Result<DraftOf<R>, AppError> {
        let fields = self
            .resource
            .schema()
            .validate(body)
            .map_err(AppError::invalid)?;
        self.resource.draft(fields)
    }

    fn record_id(&self, id: Result<Path<RecordId>, PathRejection>) -> Result<RecordId, AppError> {
        // Non-numeric ids cannot name a record
        id.map(|Path(id)| id)
            .map_err(|_| AppError::not_found(format!("{} not found", R::Entity::LABEL)))
    }
}

/// Build the router for one resource collection.
pub fn routes<R: Resource>(resource: Arc<R>, repository: Arc<dyn Repository<R::Entity>>) -> Router {
    let base = collection_path(resource.collection());
    let state = ResourceState {
        resource,
        repository,
    };

    Router::new()
        .route(&base, get(list::<R>))
        .route(&format!("{base}/create"), post(create::<R>))
        .route(
            &format!("{base}/{{id}}"),
            get(retrieve::<R>)
                .put(replace::<R>)
                .patch(amend::<R>)
                .delete(destroy::<R>),
        )
        .with_state(state)
}

async fn list<R: Resource>(
    State(state): State<ResourceState<R>>,
) -> Result<Json<Vec<R::Entity>>, AppError> {
    Ok(Json(state.repository.list().await?))
}

async fn create<R: Resource>(
    State(state): State<ResourceState<R>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<R::Entity>), AppError> {
    let Json(body) = body?;
    let draft = state.draft_from(&body)?;
    let record = state.repository.create(draft).await?;

    tracing::info!(resource = R::Entity::TABLE, id = record.id(), "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn retrieve<R: Resource>(
    State(state): State<ResourceState<R>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<R::Entity>, AppError> {
    let id = state.record_id(id)?;
    Ok(Json(state.repository.get(id).await?))
}

/// Full replace: the body must satisfy the same rules as create.
async fn replace<R: Resource>(
    State(state): State<ResourceState<R>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<R::Entity>, AppError> {
    let id = state.record_id(id)?;
    let Json(body) = body?;
    // Unknown ids answer 404 before the body is judged
    state.repository.get(id).await?;
    let draft = state.draft_from(&body)?;
    let record = state.repository.update(id, draft).await?;

    tracing::info!(resource = R::Entity::TABLE, id, "record replaced");
    Ok(Json(record))
}

/// Partial update: body fields overlay the stored record, then the merged
/// record is validated like create.
async fn amend<R: Resource>(
    State(state): State<ResourceState<R>>,
    id: Result<Path<RecordId>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<R::Entity>, AppError> {
    let id = state.record_id(id)?;
    let Json(body) = body?;
    let current = state.repository.get(id).await?;

    let patch = expect_object(&body).map_err(AppError::invalid)?;
    let mut merged = serde_json::to_value(&current).map_err(anyhow::Error::from)?;
    if let Some(fields) = merged.as_object_mut() {
        for (name, value) in patch.iter().filter(|(name, _)| name.as_str() != "id") {
            fields.insert(name.clone(), value.clone());
        }
    }

    let draft = state.draft_from(&merged)?;
    let record = state.repository.update(id, draft).await?;

    tracing::info!(
        resource = R::Entity::TABLE,
        id,
        fields = patch.len(),
        "record amended"
    );
    Ok(Json(record))
}

async fn destroy<R: Resource>(
    State(state): State<ResourceState<R>>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = state.record_id(id)?;
    state.repository.delete(id).await?;

    tracing::info!(resource = R::Entity::TABLE, id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// OpenAPI fragment (paths + component schemas) for a resource.
pub fn openapi_fragment<R: Resource>(resource: &R) -> Value {
    let base = collection_path(resource.collection());
    let label = R::Entity::LABEL;
    let tag = resource.collection();
    let draft_name = format!("{label}Fields");

    let mut record_schema = resource.schema().describe();
    record_schema["properties"]["id"] = json!({"type": "integer", "readOnly": true});
    if let Some(required) = record_schema["required"].as_array_mut() {
        required.insert(0, json!("id"));
    }

    let record_ref = json!({"$ref": format!("#/components/schemas/{label}")});
    let draft_ref = json!({"$ref": format!("#/components/schemas/{draft_name}")});
    let error_ref = json!({"$ref": "#/components/schemas/ErrorResponse"});

    let json_content = |schema: &Value| json!({"application/json": {"schema": schema}});
    let error_response = |description: &str| {
        json!({"description": description, "content": json_content(&error_ref)})
    };
    let id_parameter = json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": {"type": "integer"}
    }]);

    json!({
        "paths": {
            base.clone(): {
                "get": {
                    "summary": format!("List {tag}"),
                    "tags": [tag],
                    "responses": {
                        "200": {
                            "description": format!("Every {}", label.to_lowercase()),
                            "content": json_content(&json!({"type": "array", "items": record_ref}))
                        }
                    }
                }
            },
            format!("{base}/create"): {
                "post": {
                    "summary": format!("Create a {}", label.to_lowercase()),
                    "tags": [tag],
                    "requestBody": {"required": true, "content": json_content(&draft_ref)},
                    "responses": {
                        "201": {"description": "Created", "content": json_content(&record_ref)},
                        "400": error_response("Validation error")
                    }
                }
            },
            format!("{base}/{{id}}"): {
                "parameters": id_parameter,
                "get": {
                    "summary": format!("Retrieve a {}", label.to_lowercase()),
                    "tags": [tag],
                    "responses": {
                        "200": {"description": "Found", "content": json_content(&record_ref)},
                        "404": error_response("Not found")
                    }
                },
                "put": {
                    "summary": format!("Replace a {}", label.to_lowercase()),
                    "tags": [tag],
                    "requestBody": {"required": true, "content": json_content(&draft_ref)},
                    "responses": {
                        "200": {"description": "Replaced", "content": json_content(&record_ref)},
                        "400": error_response("Validation error"),
                        "404": error_response("Not found")
                    }
                },
                "patch": {
                    "summary": format!("Update some fields of a {}", label.to_lowercase()),
                    "tags": [tag],
                    "requestBody": {"required": true, "content": json_content(&json!({"type": "object"}))},
                    "responses": {
                        "200": {"description": "Updated", "content": json_content(&record_ref)},
                        "400": error_response("Validation error"),
                        "404": error_response("Not found")
                    }
                },
                "delete": {
                    "summary": format!("Delete a {}", label.to_lowercase()),
                    "tags": [tag],
                    "responses": {
                        "204": {"description": "Deleted"},
                        "404": error_response("Not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                label: record_schema,
                draft_name: resource.schema().describe()
            }
        }
    })
}
