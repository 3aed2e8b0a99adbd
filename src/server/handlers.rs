//! Generic REST handlers shared by every metadata kind
//!
//! Each handler is generic over the row type and pulls its
//! [`EntityService`] out of [`EntityState`]; the descriptor in
//! [`descriptor`](super::descriptor) instantiates them once per kind.

use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::core::cascade::{CascadeReport, RowRef};
use crate::core::entity::{Entity, MetaEntity};
use crate::core::error::{MetaResult, ValidationError};
use crate::core::query::{Page, PageRequest, QueryParams, SearchCriteria};
use crate::core::service::EntityService;
use crate::csv::{self, ImportSummary};
use crate::server::extract::{Payload, QueryArgs};

/// Router state for the routes of one kind
pub struct EntityState<T: MetaEntity> {
    pub service: EntityService<T>,
}

impl<T: MetaEntity> Clone for EntityState<T> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<T: MetaEntity> EntityState<T> {
    pub fn new(service: EntityService<T>) -> Self {
        Self { service }
    }

    fn page(&self, params: &QueryParams) -> PageRequest {
        PageRequest::from_params(params, self.service.pagination())
    }
}

/// Body returned by every mutating route
#[derive(Debug, Serialize)]
pub struct MutationResponse<T> {
    pub message: String,

    #[serde(rename = "ID")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,

    /// Rows whose flag changed, the target included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<usize>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cascaded: Vec<RowRef>,

    /// Shared rows a restore left deleted because another parent is deleted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub held: Vec<RowRef>,
}

impl<T> MutationResponse<T> {
    fn item(message: String, id: &str, item: T) -> Self {
        Self {
            message,
            id: id.to_string(),
            item: Some(item),
            affected: None,
            cascaded: Vec::new(),
            held: Vec::new(),
        }
    }

    fn cascade(message: String, report: CascadeReport) -> Self {
        Self {
            message,
            affected: Some(report.affected()),
            id: report.root.id,
            item: None,
            cascaded: report.descendants,
            held: report.held,
        }
    }
}

/// GET /{plural}
pub async fn list_entities<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    QueryArgs(params): QueryArgs<QueryParams>,
) -> MetaResult<Json<Page<T>>> {
    let page = state.page(&params);
    Ok(Json(state.service.list(page).await?))
}

/// GET /{plural}/all
pub async fn list_all_entities<T: MetaEntity>(
    State(state): State<EntityState<T>>,
) -> MetaResult<Json<Page<T>>> {
    let items = state.service.list_all().await?;
    let total = items.len();
    Ok(Json(Page { items, total }))
}

/// GET /{plural}/by_* with the parent id under the kind's query key
pub async fn list_by_parent<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    QueryArgs(params): QueryArgs<QueryParams>,
    QueryArgs(query): QueryArgs<HashMap<String, String>>,
) -> MetaResult<Json<Page<T>>> {
    let criteria = SearchCriteria::from_query(&query, T::search_scope());
    let parent_id = criteria.parent_id.ok_or_else(|| ValidationError::MissingArgument {
        argument: T::search_scope()
            .map(|scope| scope.query_key)
            .unwrap_or("parent id")
            .to_string(),
    })?;

    let page = state.page(&params);
    Ok(Json(state.service.list_by_parent(&parent_id, page).await?))
}

/// GET /{singular}/search
pub async fn search_entities<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    QueryArgs(params): QueryArgs<QueryParams>,
    QueryArgs(query): QueryArgs<HashMap<String, String>>,
) -> MetaResult<Json<Page<T>>> {
    let criteria = SearchCriteria::from_query(&query, T::search_scope());
    let page = state.page(&params);
    Ok(Json(state.service.search(criteria, page).await?))
}

/// POST /{singular}
pub async fn create_entity<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    Payload(draft): Payload<T::Draft>,
) -> MetaResult<(StatusCode, Json<MutationResponse<T>>)> {
    let entity = state.service.create(draft).await?;
    let id = entity.id().to_string();
    let message = format!("{} created", T::KIND);
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::item(message, &id, entity)),
    ))
}

/// GET /{singular}/{id}
pub async fn get_entity<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<String>,
) -> MetaResult<Json<T>> {
    Ok(Json(state.service.get(&id).await?))
}

/// PUT /{singular}/{id}
pub async fn update_entity<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<String>,
    Payload(patch): Payload<T::Patch>,
) -> MetaResult<Json<MutationResponse<T>>> {
    let entity = state.service.update(&id, patch).await?;
    let message = format!("{} updated", T::KIND);
    Ok(Json(MutationResponse::item(message, &id, entity)))
}

/// DELETE /{singular}/{id}
pub async fn soft_delete_entity<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<String>,
) -> MetaResult<Json<MutationResponse<T>>> {
    let report = state.service.soft_delete(&id).await?;
    let message = format!("{} and related records soft deleted", T::KIND);
    Ok(Json(MutationResponse::cascade(message, report)))
}

/// PUT /{singular}/restore/{id}
pub async fn restore_entity<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<String>,
) -> MetaResult<Json<MutationResponse<T>>> {
    let report = state.service.restore(&id).await?;
    let message = format!("{} and related records restored", T::KIND);
    Ok(Json(MutationResponse::cascade(message, report)))
}

/// DELETE /{singular}/permanent_delete/{id}
pub async fn hard_delete_entity<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    Path(id): Path<String>,
) -> MetaResult<Json<MutationResponse<T>>> {
    let entity = state.service.hard_delete(&id).await?;
    let message = format!("{} permanently deleted", T::KIND);
    Ok(Json(MutationResponse::item(message, &id, entity)))
}

/// GET /{plural}/export
pub async fn export_entities<T: MetaEntity>(
    State(state): State<EntityState<T>>,
) -> MetaResult<Response> {
    let body = csv::export_csv(&state.service).await?;
    let disposition = format!("attachment; filename=\"{}.csv\"", T::KIND.plural());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// POST /{plural}/import with the CSV file as the raw body
pub async fn import_entities<T: MetaEntity>(
    State(state): State<EntityState<T>>,
    body: Bytes,
) -> MetaResult<(StatusCode, Json<ImportSummary>)> {
    let text = csv::decode(&body)?;
    let summary = csv::import_csv(&state.service, text).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}
