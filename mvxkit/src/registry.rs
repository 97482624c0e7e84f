//! Agent registry reads.
//!
//! Three contracts make up the registry: identity (agent NFTs and their
//! registration files), reputation (scores and completed job counts) and
//! validation (job proofs). Scores are stored scaled by 100.

use alloy::primitives::U256;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{SecondsFormat, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::address::Address;
use crate::api::{NetworkProvider, NftQuery};
use crate::codec::{self, ARG_SEPARATOR};
use crate::error::{Error, Result};

/// View returning an agent's score times 100.
pub const VIEW_REPUTATION_SCORE: &str = "getReputationScore";
/// View returning an agent's completed job count.
pub const VIEW_TOTAL_JOBS: &str = "getTotalJobs";
/// View returning `01` for a verified job.
pub const VIEW_JOB_VERIFIED: &str = "is_job_verified";
/// Identity view returning the agent record, empty when unregistered.
pub const VIEW_AGENT: &str = "get_agent";

/// Agent NFTs fetched to rank by reputation.
pub const TOP_RATED_POOL: usize = 20;
/// Identity registry transactions scanned for a manifest.
pub const MANIFEST_SCAN: usize = 50;

const DATA_URI_PREFIX: &str = "data:application/json;base64,";
const SCORE_SCALE: f64 = 100.0;

/// Contract addresses of the three registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryAddresses {
    /// Identity registry.
    pub identity: Address,
    /// Reputation registry.
    pub reputation: Address,
    /// Validation registry.
    pub validation: Address,
}

impl Default for RegistryAddresses {
    fn default() -> Self {
        let placeholder = crate::transaction::builder::PLACEHOLDER_SENDER;
        Self {
            identity: Address::zero(),
            reputation: placeholder,
            validation: placeholder,
        }
    }
}

/// Reputation snapshot of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReputation {
    /// Agent NFT nonce.
    pub agent_id: u64,
    /// Score on a 0-100 scale.
    pub reputation_score: f64,
    /// Completed jobs.
    pub total_completed_jobs: u64,
    /// RFC 3339 time of the read.
    pub last_sync: String,
}

/// Status of one registry in a [`TrustSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryVerification {
    /// Registry name.
    pub registry: String,
    /// Registry-specific status word.
    pub status: String,
}

/// Aggregated trust view of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustSummary {
    /// Agent NFT nonce.
    pub agent_id: u64,
    /// Score on a 0-100 scale.
    pub reputation_score: f64,
    /// Completed jobs.
    pub total_completed_jobs: u64,
    /// Trust label, see [`trust_label`].
    pub status: String,
    /// Per-registry statuses.
    pub verifications: Vec<RegistryVerification>,
}

/// Agent ranked by reputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedAgent {
    /// NFT identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// NFT nonce.
    pub nonce: u64,
    /// Score on a 0-100 scale.
    pub reputation_score: f64,
    /// Media URL.
    pub uri: String,
}

/// Agent found by text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentListing {
    /// NFT identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// NFT nonce.
    pub nonce: u64,
    /// Current owner.
    pub owner: Option<String>,
    /// Media URL.
    pub uri: String,
    /// Collection identifier.
    pub collection: Option<String>,
    /// Mint timestamp.
    pub timestamp: Option<i64>,
    /// Score on a 0-100 scale.
    pub reputation_score: f64,
}

/// Outcome of a manifest lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestLookup {
    /// The identity registry has no recent transactions.
    NoTransactions,
    /// No matching registration in the scanned history.
    NotFound,
    /// Manifest fields, with an inline JSON registration file merged in.
    Found(Map<String, Value>),
}

/// Label for a 0-100 score.
#[must_use]
pub fn trust_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "highly_trusted"
    } else if score >= 50.0 {
        "trusted"
    } else if score > 0.0 {
        "emerging"
    } else {
        "unrated"
    }
}

/// Read access to the agent registries.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    provider: NetworkProvider,
    addresses: RegistryAddresses,
}

impl AgentRegistry {
    /// Registry reader over `provider`.
    #[must_use]
    pub const fn new(provider: NetworkProvider, addresses: RegistryAddresses) -> Self {
        Self {
            provider,
            addresses,
        }
    }

    /// Registry contract addresses.
    #[must_use]
    pub const fn addresses(&self) -> &RegistryAddresses {
        &self.addresses
    }

    /// Score on a 0-100 scale; an empty return value is zero.
    ///
    /// # Errors
    ///
    /// Upstream failures or undecodable return data.
    pub async fn reputation_score(&self, agent: u64) -> Result<f64> {
        let raw = self
            .view_number(self.addresses.reputation, VIEW_REPUTATION_SCORE, agent)
            .await?;
        Ok(to_f64(&raw)? / SCORE_SCALE)
    }

    /// Completed jobs; an empty return value is zero.
    ///
    /// # Errors
    ///
    /// Upstream failures, undecodable return data or a count above `u64`.
    pub async fn total_jobs(&self, agent: u64) -> Result<u64> {
        let raw = self
            .view_number(self.addresses.reputation, VIEW_TOTAL_JOBS, agent)
            .await?;
        u64::try_from(raw).map_err(|_| Error::validation("total jobs overflow u64"))
    }

    /// Score and job count together.
    ///
    /// # Errors
    ///
    /// As [`AgentRegistry::reputation_score`] and [`AgentRegistry::total_jobs`].
    pub async fn reputation(&self, agent: u64) -> Result<AgentReputation> {
        let (score, jobs) = futures::try_join!(self.reputation_score(agent), self.total_jobs(agent))?;
        Ok(AgentReputation {
            agent_id: agent,
            reputation_score: score,
            total_completed_jobs: jobs,
            last_sync: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Whether the validation registry marks `job_id` verified.
    ///
    /// # Errors
    ///
    /// Upstream failures or undecodable return data.
    pub async fn is_job_verified(&self, job_id: &str) -> Result<bool> {
        let output = self
            .provider
            .query_contract(
                &self.addresses.validation,
                VIEW_JOB_VERIFIED,
                &[codec::encode_text(job_id)],
            )
            .await?;
        let Some(first) = output.first() else {
            return Ok(false);
        };
        Ok(codec::decode_return_data(first)?.first() == Some(&1))
    }

    /// Whether the identity registry knows the agent.
    ///
    /// # Errors
    ///
    /// Upstream failures.
    pub async fn is_registered(&self, agent: u64) -> Result<bool> {
        let output = self
            .provider
            .query_contract(&self.addresses.identity, VIEW_AGENT, &[codec::encode_nonce(agent)])
            .await?;
        Ok(output.first().is_some())
    }

    /// Score, jobs and identity presence folded into one view.
    ///
    /// # Errors
    ///
    /// Any failing registry read.
    pub async fn trust_summary(&self, agent: u64) -> Result<TrustSummary> {
        let (score, jobs, registered) = futures::try_join!(
            self.reputation_score(agent),
            self.total_jobs(agent),
            self.is_registered(agent)
        )?;
        let active = score > 0.0 || jobs > 0;
        Ok(TrustSummary {
            agent_id: agent,
            reputation_score: score,
            total_completed_jobs: jobs,
            status: trust_label(score).to_owned(),
            verifications: vec![
                RegistryVerification {
                    registry: "Identity".to_owned(),
                    status: if registered { "verified" } else { "unregistered" }.to_owned(),
                },
                RegistryVerification {
                    registry: "Reputation".to_owned(),
                    status: if active { "active" } else { "inactive" }.to_owned(),
                },
            ],
        })
    }

    /// Agent NFTs ranked by score, highest first.
    ///
    /// `category` narrows the NFT search unless it is empty or `all`. Agents
    /// whose score cannot be read are left out.
    ///
    /// # Errors
    ///
    /// Failure of the NFT search itself.
    pub async fn top_rated(&self, category: &str, limit: usize) -> Result<Vec<RatedAgent>> {
        let search = if category.eq_ignore_ascii_case("all") {
            ""
        } else {
            category.trim()
        };
        let items = self
            .provider
            .search_nfts(&NftQuery::agents(search, TOP_RATED_POOL))
            .await?;

        let candidates: Vec<_> = items
            .into_iter()
            .filter_map(|item| Some((item.identifier.clone()?, item.nonce?, item)))
            .collect();
        let scores = join_all(
            candidates
                .iter()
                .map(|(_, nonce, _)| self.reputation_score(*nonce)),
        )
        .await;

        let mut agents: Vec<RatedAgent> = candidates
            .into_iter()
            .zip(scores)
            .filter_map(|((id, nonce, item), score)| match score {
                Ok(score) => Some(RatedAgent {
                    uri: item.url.clone().unwrap_or_default(),
                    name: item.name.unwrap_or_default(),
                    id,
                    nonce,
                    reputation_score: score,
                }),
                Err(e) => {
                    debug!(nonce, error = %e, "skipping agent without readable score");
                    None
                }
            })
            .collect();
        agents.sort_by(|a, b| b.reputation_score.total_cmp(&a.reputation_score));
        agents.truncate(limit);
        Ok(agents)
    }

    /// Agent NFTs matching `query`, with scores, filtered by `min_trust`.
    ///
    /// An unreadable score counts as zero.
    ///
    /// # Errors
    ///
    /// Failure of the NFT search itself.
    pub async fn search_agents(
        &self,
        query: &str,
        min_trust: Option<f64>,
        limit: usize,
    ) -> Result<Vec<AgentListing>> {
        let items = self
            .provider
            .search_nfts(&NftQuery::agents(query, limit))
            .await?;
        let items: Vec<_> = items
            .into_iter()
            .filter(|item| item.identifier.is_some())
            .collect();
        let scores = join_all(
            items
                .iter()
                .map(|item| self.reputation_score(item.nonce.unwrap_or_default())),
        )
        .await;

        Ok(items
            .into_iter()
            .zip(scores)
            .map(|(item, score)| AgentListing {
                id: item.identifier.unwrap_or_default(),
                name: item.name.unwrap_or_default(),
                nonce: item.nonce.unwrap_or_default(),
                owner: item.owner,
                uri: item.url.unwrap_or_default(),
                collection: item.collection,
                timestamp: item.timestamp,
                reputation_score: score.unwrap_or_default(),
            })
            .filter(|agent| min_trust.is_none_or(|min| agent.reputation_score >= min))
            .collect())
    }

    /// Newest registration file of `agent` from the identity registry history.
    ///
    /// Scans the latest transactions to the identity registry, newest first.
    /// An `update_agent` call naming this agent wins over any
    /// `register_agent` call, which is only used as a fallback.
    ///
    /// # Errors
    ///
    /// Upstream failures, or a matching call with fewer than three arguments.
    pub async fn manifest(&self, agent: u64) -> Result<ManifestLookup> {
        let txs = self
            .provider
            .transactions_to(&self.addresses.identity, MANIFEST_SCAN)
            .await?;
        if txs.is_empty() {
            return Ok(ManifestLookup::NoTransactions);
        }

        let calls: Vec<String> = txs.iter().map(crate::api::TransactionSummary::data_text).collect();
        let Some(data) = calls
            .iter()
            .find(|data| is_update_of(data, agent))
            .or_else(|| calls.iter().find(|data| data.starts_with("register_agent@")))
        else {
            return Ok(ManifestLookup::NotFound);
        };

        parse_manifest(data).map(ManifestLookup::Found)
    }

    async fn view_number(&self, contract: Address, view: &str, agent: u64) -> Result<U256> {
        let output = self
            .provider
            .query_contract(&contract, view, &[codec::encode_nonce(agent)])
            .await?;
        match output.first() {
            Some(first) => codec::decode_biguint(&codec::decode_return_data(first)?),
            None => Ok(U256::ZERO),
        }
    }
}

fn is_update_of(data: &str, agent: u64) -> bool {
    let Some(rest) = data.strip_prefix("update_agent@") else {
        return false;
    };
    let nonce_hex = rest.split(ARG_SEPARATOR).next().unwrap_or_default();
    u64::from_str_radix(nonce_hex, 16).is_ok_and(|nonce| nonce == agent)
}

/// Parse a `register_agent@name@uri@pk[@..]` or `update_agent@nonce@uri@pk[@..]`
/// data field into manifest fields.
///
/// # Errors
///
/// Returns [`Error::Validation`] for fewer than three arguments or bad hex.
pub fn parse_manifest(data: &str) -> Result<Map<String, Value>> {
    let (function, args) = codec::parse_data_field(data);
    if args.len() < 3 {
        return Err(Error::validation(
            "Invalid registration data format. Expected: function@name@uri@pk",
        ));
    }

    let name = if function == "update_agent" {
        let nonce = u64::from_str_radix(&args[0], 16)
            .map_err(|e| Error::validation(format!("invalid agent nonce: {e}")))?;
        format!("Agent #{nonce}")
    } else {
        codec::decode_text(&args[0])?
    };
    let uri = codec::decode_text(&args[1])?;

    let mut manifest = Map::new();
    manifest.insert("name".to_owned(), Value::String(name));
    manifest.insert("uri".to_owned(), Value::String(uri.clone()));
    manifest.insert("public_key".to_owned(), Value::String(args[2].clone()));

    if let Some(encoded) = uri.strip_prefix(DATA_URI_PREFIX)
        && let Ok(bytes) = BASE64.decode(encoded)
        && let Ok(Value::Object(file)) = serde_json::from_slice::<Value>(&bytes)
    {
        manifest.extend(file);
    }
    Ok(manifest)
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(value: &U256) -> Result<f64> {
    let small = u128::try_from(*value).map_err(|_| Error::validation("score overflows u128"))?;
    Ok(small as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::api::{Method, MockTransport};
    use crate::error::ApiError;
    use serde_json::json;
    use std::sync::Arc;

    const IDENTITY: &str = "erd1qqqqqqqqqqqqqpgqnhm3mg04703djdn60uh4e8jrz9ndzcpalpzsww8ywc";
    const REPUTATION: &str = "erd1qqqqqqqqqqqqqpgqqkts0uwjyd9rs5v2ys0u6g9va35luyrx3l6szjsurj";
    const VALIDATION: &str = "erd1qqqqqqqqqqqqqpgqyenn0fy4rka0gj7e8kk597y4nzyraeyrpvssw4qgac";

    fn addresses() -> RegistryAddresses {
        RegistryAddresses {
            identity: Address::from_bech32(IDENTITY).unwrap(),
            reputation: Address::from_bech32(REPUTATION).unwrap(),
            validation: Address::from_bech32(VALIDATION).unwrap(),
        }
    }

    fn setup(mock: MockTransport) -> (AgentRegistry, Arc<MockTransport>) {
        let mock = Arc::new(mock);
        (
            AgentRegistry::new(NetworkProvider::new(mock.clone()), addresses()),
            mock,
        )
    }

    fn view(contract: &str, name: &str) -> String {
        format!("accounts/{contract}/vm-values/{name}")
    }

    fn returns(bytes: &[u8]) -> Value {
        json!({ "data": { "data": { "returnData": [BASE64.encode(bytes)] } } })
    }

    mod reputation {
        use super::*;

        #[tokio::test]
        async fn score_is_scaled_and_jobs_decoded() {
            let (registry, mock) = setup(
                MockTransport::new()
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), returns(&[0x21, 0x66]))
                    .on_get(view(REPUTATION, VIEW_TOTAL_JOBS), returns(&[0x7c])),
            );
            let rep = registry.reputation(7).await.unwrap();
            assert!((rep.reputation_score - 85.5).abs() < f64::EPSILON);
            assert_eq!(rep.total_completed_jobs, 124);
            assert_eq!(rep.agent_id, 7);
            assert!(rep.last_sync.ends_with('Z'));

            let request = &mock.requests_to(Method::Get, &view(REPUTATION, VIEW_TOTAL_JOBS))[0];
            assert_eq!(request.query_param("args"), Some("07"));
        }

        #[tokio::test]
        async fn empty_return_is_zero() {
            let (registry, _) = setup(
                MockTransport::new()
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), json!({ "data": { "data": { "returnData": [] } } }))
                    .on_get(view(REPUTATION, VIEW_TOTAL_JOBS), json!({ "data": { "data": { "returnData": [""] } } })),
            );
            let rep = registry.reputation(1).await.unwrap();
            assert!(rep.reputation_score.abs() < f64::EPSILON);
            assert_eq!(rep.total_completed_jobs, 0);
        }

        #[tokio::test]
        async fn varying_width_scores() {
            let (registry, _) = setup(
                MockTransport::new()
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), returns(&[0x00, 0x00, 0x27, 0x10])),
            );
            let score = registry.reputation_score(1).await.unwrap();
            assert!((score - 100.0).abs() < f64::EPSILON);
        }

        #[tokio::test]
        async fn upstream_error_propagates() {
            let (registry, _) = setup(MockTransport::new().on_get_error(
                view(REPUTATION, VIEW_REPUTATION_SCORE),
                ApiError::network("down"),
            ));
            assert!(registry.reputation(1).await.is_err());
        }
    }

    mod jobs {
        use super::*;

        #[tokio::test]
        async fn verified_when_first_byte_is_one() {
            let (registry, mock) = setup(
                MockTransport::new().on_get(view(VALIDATION, VIEW_JOB_VERIFIED), returns(&[1])),
            );
            assert!(registry.is_job_verified("job-1").await.unwrap());
            assert_eq!(
                mock.requests()[0].query_param("args"),
                Some(codec::encode_text("job-1").as_str())
            );
        }

        #[tokio::test]
        async fn not_verified_otherwise() {
            let (registry, _) = setup(
                MockTransport::new()
                    .on_get(view(VALIDATION, VIEW_JOB_VERIFIED), returns(&[0]))
                    .on_get(view(VALIDATION, VIEW_JOB_VERIFIED), json!({})),
            );
            assert!(!registry.is_job_verified("job-1").await.unwrap());
            assert!(!registry.is_job_verified("job-1").await.unwrap());
        }
    }

    mod summary {
        use super::*;

        #[test]
        fn labels() {
            assert_eq!(trust_label(85.5), "highly_trusted");
            assert_eq!(trust_label(80.0), "highly_trusted");
            assert_eq!(trust_label(50.0), "trusted");
            assert_eq!(trust_label(0.5), "emerging");
            assert_eq!(trust_label(0.0), "unrated");
        }

        #[tokio::test]
        async fn aggregates_three_reads() {
            let (registry, _) = setup(
                MockTransport::new()
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), returns(&[0x13, 0x88]))
                    .on_get(view(REPUTATION, VIEW_TOTAL_JOBS), returns(&[3]))
                    .on_get(view(IDENTITY, VIEW_AGENT), returns(b"agent")),
            );
            let summary = registry.trust_summary(4).await.unwrap();
            assert_eq!(summary.status, "trusted");
            assert_eq!(summary.total_completed_jobs, 3);
            assert_eq!(summary.verifications[0].status, "verified");
            assert_eq!(summary.verifications[1].status, "active");
        }

        #[tokio::test]
        async fn unknown_agent_is_unrated() {
            let (registry, _) = setup(
                MockTransport::new()
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), json!({}))
                    .on_get(view(REPUTATION, VIEW_TOTAL_JOBS), json!({}))
                    .on_get(view(IDENTITY, VIEW_AGENT), json!({})),
            );
            let summary = registry.trust_summary(4).await.unwrap();
            assert_eq!(summary.status, "unrated");
            assert_eq!(summary.verifications[0].status, "unregistered");
            assert_eq!(summary.verifications[1].status, "inactive");
        }
    }

    mod discovery {
        use super::*;

        // The mock keys routes by path only, so every agent shares one score
        // route; per-agent scores come from the queue order.
        #[tokio::test]
        async fn top_rated_sorts_descending() {
            let (registry, _) = setup(
                MockTransport::new()
                    .on_get(
                        "nfts",
                        json!([
                            { "identifier": "AGENT-1", "name": "Agent 1", "nonce": 1, "url": "u1" },
                            { "identifier": "AGENT-2", "name": "Agent 2", "nonce": 2, "url": "u2" },
                            { "name": "no id", "nonce": 3 }
                        ]),
                    )
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), returns(&[0x23, 0x28]))
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), returns(&[0x27, 0x10])),
            );
            let top = registry.top_rated("all", 5).await.unwrap();
            assert_eq!(top.len(), 2);
            assert_eq!(top[0].name, "Agent 2");
            assert!((top[0].reputation_score - 100.0).abs() < f64::EPSILON);
            assert_eq!(top[1].name, "Agent 1");

            let limited = registry.top_rated("all", 1).await.unwrap();
            assert_eq!(limited.len(), 1);
        }

        #[tokio::test]
        async fn top_rated_skips_unreadable_scores() {
            let (registry, _) = setup(MockTransport::new().on_get(
                "nfts",
                json!([{ "identifier": "AGENT-1", "name": "Agent 1", "nonce": 1 }]),
            ));
            assert!(registry.top_rated("all", 5).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn category_becomes_search_term() {
            let (registry, mock) = setup(MockTransport::new().on_get("nfts", json!([])));
            registry.top_rated("shopping", 5).await.unwrap();
            registry.top_rated("all", 5).await.unwrap();
            let requests = mock.requests_to(Method::Get, "nfts");
            assert_eq!(requests[0].query_param("search"), Some("shopping"));
            assert_eq!(requests[1].query_param("search"), None);
            assert_eq!(requests[1].query_param("type"), Some("NonFungibleESDT"));
        }

        #[tokio::test]
        async fn search_filters_by_min_trust() {
            let (registry, _) = setup(
                MockTransport::new()
                    .on_get(
                        "nfts",
                        json!([{ "identifier": "AGENT-1", "name": "DeFi Bot", "nonce": 1, "owner": "erd1x" }]),
                    )
                    .on_get(view(REPUTATION, VIEW_REPUTATION_SCORE), returns(&[0x21, 0x34])),
            );
            let found = registry.search_agents("DeFi", None, 5).await.unwrap();
            assert_eq!(found.len(), 1);
            assert!((found[0].reputation_score - 85.0).abs() < f64::EPSILON);
            assert_eq!(found[0].owner.as_deref(), Some("erd1x"));

            assert!(registry.search_agents("DeFi", Some(90.0), 5).await.unwrap().is_empty());
        }
    }

    mod manifest {
        use super::*;

        fn tx(data: &str) -> Value {
            json!({ "txHash": "h", "data": BASE64.encode(data) })
        }

        #[test]
        fn inline_registration_file_is_merged() {
            let file = BASE64.encode(r#"{"description":"shopper","version":"1.0"}"#);
            let uri = format!("{DATA_URI_PREFIX}{file}");
            let data = format!(
                "register_agent@{}@{}@abcd",
                codec::encode_text("Shopper"),
                codec::encode_text(&uri)
            );
            let manifest = parse_manifest(&data).unwrap();
            assert_eq!(manifest["name"], "Shopper");
            assert_eq!(manifest["public_key"], "abcd");
            assert_eq!(manifest["description"], "shopper");
        }

        #[test]
        fn update_names_agent_by_nonce() {
            let data = format!("update_agent@0c@{}@ef", codec::encode_text("ipfs://x"));
            let manifest = parse_manifest(&data).unwrap();
            assert_eq!(manifest["name"], "Agent #12");
            assert_eq!(manifest["uri"], "ipfs://x");
        }

        #[test]
        fn short_data_is_rejected() {
            assert!(matches!(
                parse_manifest("register_agent@61@62"),
                Err(Error::Validation(_))
            ));
        }

        #[tokio::test]
        async fn lookup_outcomes() {
            let path = "transactions";
            let (registry, _) = setup(MockTransport::new().on_get(path, json!([])));
            assert_eq!(registry.manifest(1).await.unwrap(), ManifestLookup::NoTransactions);

            let (registry, _) = setup(MockTransport::new().on_get(
                path,
                json!([tx("transfer@01"), tx(&format!("update_agent@02@{}@ef", codec::encode_text("u")))]),
            ));
            assert_eq!(registry.manifest(1).await.unwrap(), ManifestLookup::NotFound);

            let (registry, mock) = setup(MockTransport::new().on_get(
                path,
                json!([tx(&format!("update_agent@01@{}@ef", codec::encode_text("u")))]),
            ));
            let ManifestLookup::Found(manifest) = registry.manifest(1).await.unwrap() else {
                panic!("expected a manifest");
            };
            assert_eq!(manifest["name"], "Agent #1");
            assert_eq!(mock.requests()[0].query_param("receiver"), Some(IDENTITY));
        }

        #[tokio::test]
        async fn own_update_beats_newer_foreign_registration() {
            let foreign = format!(
                "register_agent@{}@{}@ab",
                codec::encode_text("OtherAgent"),
                codec::encode_text("https://other")
            );
            let own = format!("update_agent@07@{}@cd", codec::encode_text("https://mine"));
            let (registry, _) = setup(MockTransport::new().on_get("transactions", json!([tx(&foreign), tx(&own)])));
            let ManifestLookup::Found(manifest) = registry.manifest(7).await.unwrap() else {
                panic!("expected a manifest");
            };
            assert_eq!(manifest["uri"], "https://mine");
            assert_eq!(manifest["name"], "Agent #7");

            let (registry, _) = setup(MockTransport::new().on_get("transactions", json!([tx(&foreign), tx(&own)])));
            let ManifestLookup::Found(manifest) = registry.manifest(8).await.unwrap() else {
                panic!("expected a manifest");
            };
            assert_eq!(manifest["name"], "OtherAgent");
        }
    }
}
