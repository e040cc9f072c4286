//! PostgREST client for the `sales` and `sale_ratings` tables.

use std::rc::Rc;

use async_trait::async_trait;
use edge_core::percent_encode;
use edge_data::{DependencyTag, FetchClient, FetchError, HttpTransport};
use sales_core::{catalog::Sale, source::SaleSource, SaleId, SalesError};
use sales_rating::{StoreError, VoteCounts, VoteDirection, VoteStore};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SupabaseConfig};

/// Client for one Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    fetch: FetchClient,
}

#[derive(Serialize)]
struct VoteArgs<'a> {
    sale_uuid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_vote: Option<VoteDirection>,
}

/// RPC replies come back as a row or as a one-row set, depending on how the
/// function was declared.
#[derive(Deserialize)]
#[serde(untagged)]
enum CountsReply {
    Row(VoteCounts),
    Rows(Vec<VoteCounts>),
}

impl SupabaseClient {
    /// Connect on the platform's default transport.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreSetupError> {
        config.validate()?;
        let fetch = FetchClient::new()?;
        Ok(Self::configure(fetch, config))
    }

    /// Connect on an explicit transport.
    pub fn with_transport(
        config: &SupabaseConfig,
        transport: Rc<dyn HttpTransport>,
    ) -> Result<Self, StoreSetupError> {
        config.validate()?;
        Ok(Self::configure(FetchClient::with_transport(transport), config))
    }

    fn configure(fetch: FetchClient, config: &SupabaseConfig) -> Self {
        let key = config.anon_key.trim();
        Self {
            fetch: fetch
                .with_base_url(config.rest_url())
                .with_default_header("apikey", key)
                .with_default_header("authorization", format!("Bearer {}", key)),
        }
    }

    /// All sales, newest first.
    pub async fn list_sales(&self) -> Result<Vec<Sale>, FetchError> {
        self.fetch
            .get_json("/sales?select=*&order=created_at.desc", DependencyTag::Sales)
            .await
    }

    /// One sale by id.
    pub async fn get_sale(&self, id: &SaleId) -> Result<Option<Sale>, FetchError> {
        let url = format!("/sales?select=*&id=eq.{}&limit=1", percent_encode(id.as_str()));
        let rows: Vec<Sale> = self.fetch.get_json(&url, DependencyTag::Sales).await?;
        Ok(rows.into_iter().next())
    }

    /// Raw counts row for a sale, if one exists.
    pub async fn rating_counts(&self, id: &SaleId) -> Result<Option<VoteCounts>, FetchError> {
        let url = format!(
            "/sale_ratings?select=hot_votes,cold_votes&sale_id=eq.{}",
            percent_encode(id.as_str())
        );
        let rows: Vec<VoteCounts> = self.fetch.get_json(&url, DependencyTag::Ratings).await?;
        Ok(rows.into_iter().next())
    }

    /// Call `vote_hot` or `vote_cold` and return the new counts.
    pub async fn call_vote(
        &self,
        id: &SaleId,
        direction: VoteDirection,
        previous: Option<VoteDirection>,
    ) -> Result<VoteCounts, StoreError> {
        let url = format!("/rpc/vote_{}", direction.as_str());
        let args = VoteArgs {
            sale_uuid: id.as_str(),
            previous_vote: previous.filter(|p| *p != direction),
        };
        let reply: CountsReply = self
            .fetch
            .post_json(&url, &args, DependencyTag::Votes)
            .await
            .map_err(store_error)?;
        match reply {
            CountsReply::Row(counts) => Ok(counts),
            CountsReply::Rows(rows) => rows
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::Malformed(format!("{} returned no rows", url))),
        }
    }
}

/// Why a client could not be built.
#[derive(Debug, thiserror::Error)]
pub enum StoreSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] FetchError),
}

fn store_error(e: FetchError) -> StoreError {
    match e {
        FetchError::Http { status, url } => StoreError::Rejected {
            status,
            message: url,
        },
        FetchError::Deserialization(msg) => StoreError::Malformed(msg),
        FetchError::Timeout(msg) | FetchError::Connection(msg) | FetchError::Request(msg) => {
            StoreError::Unavailable(msg)
        }
    }
}

#[async_trait(?Send)]
impl SaleSource for SupabaseClient {
    async fn fetch_sales(&self) -> Result<Vec<Sale>, SalesError> {
        self.list_sales().await.map_err(|e| match e {
            FetchError::Deserialization(msg) => SalesError::Serialization(msg),
            other => SalesError::Fetch(other.to_string()),
        })
    }
}

#[async_trait(?Send)]
impl VoteStore for SupabaseClient {
    async fn get_counts(&self, sale: &SaleId) -> Result<Option<VoteCounts>, StoreError> {
        self.rating_counts(sale).await.map_err(store_error)
    }

    async fn cast_vote(
        &self,
        sale: &SaleId,
        direction: VoteDirection,
        previous: Option<VoteDirection>,
    ) -> Result<VoteCounts, StoreError> {
        self.call_vote(sale, direction, previous).await
    }
}
