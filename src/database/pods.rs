use sqlx::PgPool;
use uuid::Uuid;

use super::models::Pod;

/// Sort direction for collection listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Columns a listing may sort by. Guards the identifiers interpolated into
/// the query string.
pub const SORT_COLUMNS: &[&str] = &["id", "uuid", "name", "created_at", "updated_at"];

#[derive(Debug, Clone)]
pub struct ListParams {
    pub limit: i64,
    pub marker: Option<Uuid>,
    pub sort_key: String,
    pub sort_dir: SortDir,
}

#[derive(Debug, Clone)]
pub struct NewPod {
    pub name: String,
    pub desc: Option<String>,
    pub bay_uuid: Option<Uuid>,
}

/// Partial update; None leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct PodChanges {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub bay_uuid: Option<Uuid>,
}

const POD_COLUMNS: &str = "id, uuid, name, \"desc\", bay_uuid, created_at, updated_at";

/// Keyset-paginated listing. The marker is the uuid of the last pod of the
/// previous page; rows strictly after the marker row in the requested order
/// are returned.
pub async fn list(pool: &PgPool, params: &ListParams) -> Result<Vec<Pod>, sqlx::Error> {
    debug_assert!(SORT_COLUMNS.contains(&params.sort_key.as_str()));

    let dir = params.sort_dir.as_sql();
    let sort_col = params.sort_key.as_str();

    let sql = match params.marker {
        Some(_) => {
            let cmp = match params.sort_dir {
                SortDir::Asc => ">",
                SortDir::Desc => "<",
            };
            format!(
                "SELECT {cols} FROM pod \
                 WHERE ({key}, id) {cmp} (SELECT m.{key}, m.id FROM pod m WHERE m.uuid = $1) \
                 ORDER BY {key} {dir}, id {dir} LIMIT $2",
                cols = POD_COLUMNS,
                key = sort_col,
                cmp = cmp,
                dir = dir
            )
        }
        None => format!(
            "SELECT {cols} FROM pod ORDER BY {key} {dir}, id {dir} LIMIT $1",
            cols = POD_COLUMNS,
            key = sort_col,
            dir = dir
        ),
    };

    let query = sqlx::query_as::<_, Pod>(&sql);
    let rows = match params.marker {
        Some(marker) => query.bind(marker).bind(params.limit).fetch_all(pool).await?,
        None => query.bind(params.limit).fetch_all(pool).await?,
    };
    Ok(rows)
}

pub async fn get_by_uuid(pool: &PgPool, uuid: Uuid) -> Result<Option<Pod>, sqlx::Error> {
    let sql = format!("SELECT {} FROM pod WHERE uuid = $1", POD_COLUMNS);
    sqlx::query_as::<_, Pod>(&sql)
        .bind(uuid)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, new_pod: &NewPod) -> Result<Pod, sqlx::Error> {
    let sql = format!(
        "INSERT INTO pod (uuid, name, \"desc\", bay_uuid, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, now(), now()) RETURNING {}",
        POD_COLUMNS
    );
    sqlx::query_as::<_, Pod>(&sql)
        .bind(Uuid::new_v4())
        .bind(&new_pod.name)
        .bind(&new_pod.desc)
        .bind(new_pod.bay_uuid)
        .fetch_one(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    uuid: Uuid,
    changes: &PodChanges,
) -> Result<Option<Pod>, sqlx::Error> {
    let sql = format!(
        "UPDATE pod SET \
         name = COALESCE($2, name), \
         \"desc\" = COALESCE($3, \"desc\"), \
         bay_uuid = COALESCE($4, bay_uuid), \
         updated_at = now() \
         WHERE uuid = $1 RETURNING {}",
        POD_COLUMNS
    );
    sqlx::query_as::<_, Pod>(&sql)
        .bind(uuid)
        .bind(&changes.name)
        .bind(&changes.desc)
        .bind(changes.bay_uuid)
        .fetch_optional(pool)
        .await
}

/// Returns true when a row was deleted.
pub async fn delete(pool: &PgPool, uuid: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pod WHERE uuid = $1")
        .bind(uuid)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
