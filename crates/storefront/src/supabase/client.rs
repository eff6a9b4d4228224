//! Low-level REST client for the hosted backend.
//!
//! Wraps `reqwest` with the headers and `Prefer` conventions PostgREST
//! expects. Table-specific APIs build on the generic verbs here.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::SupabaseConfig;
use crate::supabase::SupabaseError;

/// How many bytes of an error body to keep for diagnostics.
const ERROR_BODY_LIMIT: usize = 500;

/// Client for the hosted backend's REST interface.
///
/// Cheaply cloneable; all clones share one connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a new client from configuration.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        let rest_url = format!(
            "{}/rest/v1",
            config.project_url.as_str().trim_end_matches('/')
        );

        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                rest_url,
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{table}", self.inner.rest_url);
        self.inner
            .client
            .request(method, url)
            .header("apikey", &self.inner.anon_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.inner.anon_key),
            )
            .header("Content-Type", "application/json")
    }

    /// Select rows from a table.
    ///
    /// `filters` are raw PostgREST query pairs, e.g.
    /// `("user_id", "eq.<uuid>")` or `("order", "created_at.desc")`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend answers with a
    /// non-success status, or the rows do not parse.
    #[instrument(skip(self, filters), fields(table = %table))]
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<T>, SupabaseError> {
        let response = self
            .request(reqwest::Method::GET, table)
            .query(filters)
            .send()
            .await?;

        let body = check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert rows into a table, returning the inserted representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the rows.
    #[instrument(skip(self, rows), fields(table = %table))]
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        rows: &B,
    ) -> Result<Vec<T>, SupabaseError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;

        let body = check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert-or-merge rows keyed by `on_conflict` columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the rows.
    #[instrument(skip(self, rows), fields(table = %table))]
    pub async fn upsert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        on_conflict: &str,
        rows: &B,
    ) -> Result<(), SupabaseError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    /// Update rows matching `filters` with a partial body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the patch.
    #[instrument(skip(self, patch, filters), fields(table = %table))]
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        patch: &B,
    ) -> Result<(), SupabaseError> {
        let response = self
            .request(reqwest::Method::PATCH, table)
            .query(filters)
            .json(patch)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    /// Delete rows matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    #[instrument(skip(self, filters), fields(table = %table))]
    pub async fn delete(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<(), SupabaseError> {
        let response = self
            .request(reqwest::Method::DELETE, table)
            .query(filters)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Map a response to its body, converting failure statuses to errors.
async fn check_status(response: reqwest::Response) -> Result<String, SupabaseError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(SupabaseError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(ERROR_BODY_LIMIT).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(SupabaseError::Api {
            status: status.as_u16(),
            message: body.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }

    Ok(body)
}

/// Build an `in.(…)` filter value from a list of IDs.
#[must_use]
pub(crate) fn in_filter<I: std::fmt::Display>(ids: impl IntoIterator<Item = I>) -> String {
    let joined = ids
        .into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({joined})")
}

/// Build an `eq.…` filter value.
#[must_use]
pub(crate) fn eq_filter<I: std::fmt::Display>(id: I) -> String {
    format!("eq.{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_filter() {
        let filter = in_filter(["a", "b", "c"]);
        assert_eq!(filter, "in.(a,b,c)");
    }

    #[test]
    fn test_in_filter_single() {
        assert_eq!(in_filter(["only"]), "in.(only)");
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq_filter("x"), "eq.x");
    }
}
