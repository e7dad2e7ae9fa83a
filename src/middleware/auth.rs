use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::error::ApiError;

/// Sentinel value the upstream token validator sets once it has verified
/// the credential. Anything else means the identity is not trusted.
const IDENTITY_STATUS_CONFIRMED: &str = "Confirmed";

/// Identity and authorization payload resolved from trusted proxy headers.
///
/// Built once per request by the identity middleware and attached to the
/// request extensions; immutable after construction and discarded when the
/// request completes.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub auth_token: Option<String>,
    pub auth_token_info: Option<Value>,
    pub user_id: String,
    pub user_name: String,
    pub project_id: Option<String>,
    pub domain_name: Option<String>,
    pub user_domain_id: String,
    pub project_domain_id: String,
    pub roles: Vec<String>,
    pub auth_url: String,
}

impl RequestContext {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Token metadata blob injected into the request extensions by the upstream
/// token-validation layer. Not a client-visible header.
#[derive(Clone, Debug)]
pub struct TokenInfo(pub Value);

#[derive(Debug, Error)]
pub enum ResolverConfigError {
    #[error("invalid identity service URL '{url}': {source}")]
    InvalidAuthUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("invalid public route pattern '{pattern}': {source}")]
    InvalidPublicRoute {
        pattern: String,
        source: regex::Error,
    },
}

/// Resolves the identity of each inbound request from trust headers.
///
/// Constructed once at startup from [`AuthConfig`] and shared via router
/// state; holds only read-only data, so it is safe for unbounded parallel
/// use.
#[derive(Clone, Debug)]
pub struct IdentityResolver {
    enabled: bool,
    public_endpoints: Vec<Regex>,
    default_auth_url: String,
}

impl IdentityResolver {
    /// Build a resolver, validating the configured identity-service URL and
    /// compiling the public route patterns. Failure here is a fatal startup
    /// error, never a per-request one.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ResolverConfigError> {
        url::Url::parse(&config.auth_url).map_err(|source| ResolverConfigError::InvalidAuthUrl {
            url: config.auth_url.clone(),
            source,
        })?;

        // Patterns are anchored at the start of the path. An empty route
        // list means no endpoint is public.
        let mut public_endpoints = Vec::with_capacity(config.public_routes.len());
        for pattern in &config.public_routes {
            let anchored = format!("^(?:{})", pattern);
            let re = Regex::new(&anchored).map_err(|source| {
                ResolverConfigError::InvalidPublicRoute {
                    pattern: pattern.clone(),
                    source,
                }
            })?;
            public_endpoints.push(re);
        }

        Ok(Self {
            enabled: config.enable_authentication,
            public_endpoints,
            default_auth_url: config.auth_url.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the path is reachable without authentication.
    pub fn is_endpoint_public(&self, path: &str) -> bool {
        self.public_endpoints.iter().any(|re| re.is_match(path))
    }

    /// Map the trust headers to a [`RequestContext`], or reject with 401.
    ///
    /// Pure besides logging; each request is resolved independently with no
    /// state carried across calls.
    pub fn resolve(
        &self,
        headers: &HeaderMap,
        token_info: Option<&TokenInfo>,
    ) -> Result<RequestContext, ApiError> {
        let user_id = match header_value(headers, "x-user-id") {
            Some(id) => id,
            None => {
                tracing::debug!("X-User-Id header was not found in the request");
                return Err(ApiError::unauthorized("Not authorized"));
            }
        };

        let roles = self.roles_from_headers(headers);

        let project_id = header_value(headers, "x-project-id");
        let user_name = header_value(headers, "x-user-name").unwrap_or_default();
        let domain_name = header_value(headers, "x-domain-name");
        let project_domain_id = header_value(headers, "x-project-domain-id").unwrap_or_default();
        let user_domain_id = header_value(headers, "x-user-domain-id").unwrap_or_default();

        let auth_token = header_value(headers, "x-auth-token")
            .or_else(|| header_value(headers, "x-storage-token"));

        let auth_url = header_value(headers, "x-auth-url")
            .unwrap_or_else(|| self.default_auth_url.clone());

        match header_value(headers, "x-identity-status").as_deref() {
            Some(IDENTITY_STATUS_CONFIRMED) => Ok(RequestContext {
                auth_token,
                auth_token_info: token_info.map(|info| info.0.clone()),
                user_id,
                user_name,
                project_id,
                domain_name,
                user_domain_id,
                project_domain_id,
                roles,
                auth_url,
            }),
            _ => {
                tracing::debug!("the provided identity is not confirmed");
                Err(ApiError::unauthorized(
                    "Not authorized. Identity not confirmed.",
                ))
            }
        }
    }

    /// Role list from `X-Roles`, falling back to the deprecated singular
    /// `X-Role` header. Values are comma-split and trimmed either way.
    fn roles_from_headers(&self, headers: &HeaderMap) -> Vec<String> {
        let raw = match header_value(headers, "x-roles") {
            Some(roles) => roles,
            None => {
                let fallback = header_value(headers, "x-role").unwrap_or_default();
                if !fallback.is_empty() {
                    tracing::warn!("X-Roles is missing. Using deprecated X-Role header");
                }
                fallback
            }
        };

        raw.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Identity middleware: attaches a [`RequestContext`] to authenticated
/// requests, passes public or auth-disabled requests through unresolved, and
/// rejects everything else with 401.
pub async fn identity_middleware(
    State(resolver): State<IdentityResolver>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !resolver.is_enabled() {
        return Ok(next.run(request).await);
    }

    if resolver.is_endpoint_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token_info = request.extensions().get::<TokenInfo>().cloned();
    let context = resolver.resolve(request.headers(), token_info.as_ref())?;
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
