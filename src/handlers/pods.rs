use axum::{
    extract::{Path, Query},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::links::{next_link, Link, PageParams};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::Pod;
use crate::database::pods::{self, ListParams, NewPod, PodChanges, SortDir, SORT_COLUMNS};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// API representation of a pod. Summary views omit the timestamps.
#[derive(Debug, Serialize)]
pub struct PodView {
    pub uuid: Uuid,
    pub name: String,
    pub desc: Option<String>,
    pub bay_uuid: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub links: Vec<Link>,
}

impl PodView {
    fn from_pod(pod: &Pod, base_url: &str, expand: bool) -> Self {
        Self {
            uuid: pod.uuid,
            name: pod.name.clone(),
            desc: pod.desc.clone(),
            bay_uuid: pod.bay_uuid,
            created_at: expand.then_some(pod.created_at),
            updated_at: expand.then_some(pod.updated_at),
            links: Link::resource_links(base_url, "pods", &pod.uuid.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PodCollection {
    pub pods: Vec<PodView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub marker: Option<Uuid>,
    pub sort_key: Option<String>,
    pub sort_dir: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePod {
    pub name: String,
    pub desc: Option<String>,
    pub bay_uuid: Option<Uuid>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePod {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub bay_uuid: Option<Uuid>,
}

/// GET /v1/pods - paginated pod listing, summary fields only
pub async fn pods_list(
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<PodCollection> {
    pods_collection(headers, query, false).await
}

/// GET /v1/pods/detail - paginated pod listing with all fields
pub async fn pods_detail(
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<PodCollection> {
    pods_collection(headers, query, true).await
}

async fn pods_collection(
    headers: HeaderMap,
    query: ListQuery,
    expand: bool,
) -> ApiResult<PodCollection> {
    let limit = validate_limit(query.limit)?;
    let sort_key = validate_sort_key(query.sort_key.as_deref())?;
    let sort_dir = validate_sort_dir(query.sort_dir.as_deref())?;

    let params = ListParams {
        limit,
        marker: query.marker,
        sort_key: sort_key.clone(),
        sort_dir,
    };

    let pool = DatabaseManager::pool().await?;
    let rows = pods::list(&pool, &params).await?;

    let base_url = base_url(&headers);
    let resource = if expand { "pods/detail" } else { "pods" };
    let page = PageParams {
        limit,
        sort_key,
        sort_dir: match sort_dir {
            SortDir::Asc => "asc".to_string(),
            SortDir::Desc => "desc".to_string(),
        },
    };
    let next = next_link(
        &base_url,
        resource,
        &page,
        rows.last().map(|p| p.uuid.to_string()).as_deref(),
        rows.len(),
    );

    let pods = rows
        .iter()
        .map(|p| PodView::from_pod(p, &base_url, expand))
        .collect();

    Ok(ApiResponse::success(PodCollection { pods, next }))
}

/// GET /v1/pods/:uuid - show a single pod
pub async fn pod_get(headers: HeaderMap, Path(pod_uuid): Path<Uuid>) -> ApiResult<PodView> {
    let pool = DatabaseManager::pool().await?;
    let pod = pods::get_by_uuid(&pool, pod_uuid)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Pod {} could not be found", pod_uuid)))?;

    Ok(ApiResponse::success(PodView::from_pod(
        &pod,
        &base_url(&headers),
        true,
    )))
}

/// POST /v1/pods - create a pod, 201 with Location header
pub async fn pod_create(headers: HeaderMap, Json(body): Json<CreatePod>) -> ApiResult<PodView> {
    if body.name.trim().is_empty() {
        return Err(ApiError::bad_request("Pod name must not be empty"));
    }

    let pool = DatabaseManager::pool().await?;
    let pod = pods::insert(
        &pool,
        &NewPod {
            name: body.name,
            desc: body.desc,
            bay_uuid: body.bay_uuid,
        },
    )
    .await?;

    let location = format!("/v1/pods/{}", pod.uuid);
    Ok(ApiResponse::created(
        PodView::from_pod(&pod, &base_url(&headers), true),
        location,
    ))
}

/// PATCH /v1/pods/:uuid - partial update
pub async fn pod_patch(
    headers: HeaderMap,
    Path(pod_uuid): Path<Uuid>,
    Json(body): Json<UpdatePod>,
) -> ApiResult<PodView> {
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Pod name must not be empty"));
        }
    }

    let pool = DatabaseManager::pool().await?;
    let changes = PodChanges {
        name: body.name,
        desc: body.desc,
        bay_uuid: body.bay_uuid,
    };
    let pod = pods::update(&pool, pod_uuid, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Pod {} could not be found", pod_uuid)))?;

    Ok(ApiResponse::success(PodView::from_pod(
        &pod,
        &base_url(&headers),
        true,
    )))
}

/// DELETE /v1/pods/:uuid - 204 on success
pub async fn pod_delete(Path(pod_uuid): Path<Uuid>) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    let deleted = pods::delete(&pool, pod_uuid).await?;
    if !deleted {
        return Err(ApiError::not_found(format!(
            "Pod {} could not be found",
            pod_uuid
        )));
    }
    Ok(ApiResponse::<()>::no_content())
}

fn validate_limit(limit: Option<i64>) -> Result<i64, ApiError> {
    let max = config::config().api.max_limit;
    match limit {
        Some(l) if l <= 0 => Err(ApiError::bad_request("Limit must be positive")),
        Some(l) => Ok(l.min(max)),
        None => Ok(max),
    }
}

fn validate_sort_key(sort_key: Option<&str>) -> Result<String, ApiError> {
    let key = sort_key.unwrap_or("id");
    if SORT_COLUMNS.contains(&key) {
        Ok(key.to_string())
    } else {
        Err(ApiError::bad_request(format!(
            "Invalid sort_key '{}'",
            key
        )))
    }
}

fn validate_sort_dir(sort_dir: Option<&str>) -> Result<SortDir, ApiError> {
    match sort_dir.unwrap_or("asc") {
        "asc" => Ok(SortDir::Asc),
        "desc" => Ok(SortDir::Desc),
        other => Err(ApiError::bad_request(format!(
            "Invalid sort direction '{}', acceptable values are 'asc' or 'desc'",
            other
        ))),
    }
}

fn base_url(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| format!("http://{}", host))
        .unwrap_or_else(|| "http://localhost:9511".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_dir_validation() {
        assert_eq!(validate_sort_dir(None).unwrap(), SortDir::Asc);
        assert_eq!(validate_sort_dir(Some("desc")).unwrap(), SortDir::Desc);
        assert!(validate_sort_dir(Some("sideways")).is_err());
    }

    #[test]
    fn sort_key_validation() {
        assert_eq!(validate_sort_key(None).unwrap(), "id");
        assert_eq!(validate_sort_key(Some("name")).unwrap(), "name");
        assert!(validate_sort_key(Some("bay_uuid; DROP TABLE pod")).is_err());
    }

    #[test]
    fn negative_limit_rejected() {
        assert!(validate_limit(Some(0)).is_err());
        assert!(validate_limit(Some(-5)).is_err());
    }

    #[test]
    fn summary_view_hides_timestamps() {
        let pod = Pod {
            id: 1,
            uuid: Uuid::new_v4(),
            name: "web".to_string(),
            desc: None,
            bay_uuid: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let view = PodView::from_pod(&pod, "http://h", false);
        assert!(view.created_at.is_none());
        let expanded = PodView::from_pod(&pod, "http://h", true);
        assert!(expanded.created_at.is_some());
        assert_eq!(expanded.links.len(), 2);
    }
}
