use serde::Serialize;

/// Hypermedia link attached to API resources and collections.
#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

impl Link {
    /// Versioned self link, e.g. `http://host/v1/pods/<uuid>`.
    pub fn make_link(rel: &str, base_url: &str, resource: &str, id: &str) -> Link {
        Link {
            href: format!("{}/v1/{}/{}", base_url.trim_end_matches('/'), resource, id),
            rel: rel.to_string(),
        }
    }

    /// Unversioned bookmark link, e.g. `http://host/pods/<uuid>`.
    pub fn make_bookmark(base_url: &str, resource: &str, id: &str) -> Link {
        Link {
            href: format!("{}/{}/{}", base_url.trim_end_matches('/'), resource, id),
            rel: "bookmark".to_string(),
        }
    }

    /// The standard self/bookmark pair for a resource.
    pub fn resource_links(base_url: &str, resource: &str, id: &str) -> Vec<Link> {
        vec![
            Link::make_link("self", base_url, resource, id),
            Link::make_bookmark(base_url, resource, id),
        ]
    }
}

/// Parameters echoed into a collection's `next` link.
#[derive(Debug, Clone)]
pub struct PageParams {
    pub limit: i64,
    pub sort_key: String,
    pub sort_dir: String,
}

/// URL for the next page of a collection, or None when the returned page was
/// short (meaning there is nothing further to fetch).
pub fn next_link(
    base_url: &str,
    resource: &str,
    params: &PageParams,
    last_uuid: Option<&str>,
    returned: usize,
) -> Option<String> {
    if (returned as i64) < params.limit {
        return None;
    }
    let marker = last_uuid?;
    Some(format!(
        "{}/v1/{}?limit={}&marker={}&sort_key={}&sort_dir={}",
        base_url.trim_end_matches('/'),
        resource,
        params.limit,
        marker,
        params.sort_key,
        params.sort_dir
    ))
}
