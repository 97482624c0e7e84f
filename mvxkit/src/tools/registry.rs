//! Agent registry tools.
//!
//! Reads go through [`AgentRegistry`](crate::registry::AgentRegistry). Writes
//! (feedback, proofs, verdicts) are always returned as unsigned plain
//! transactions for the caller to sign.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::{ToolContext, respond};
use crate::error::{Error, Result};
use crate::registry::ManifestLookup;
use crate::search::DEFAULT_SEARCH_LIMIT;
use crate::tool::{Tool, ToolResponse};
use crate::transaction::parse_field_address;

/// Arguments naming one agent.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AgentArgs {
    /// The NFT nonce of the agent.
    pub agent_nonce: u64,
}

/// Arguments naming one job.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobArgs {
    /// The unique job identifier.
    pub job_id: String,
}

/// Reputation score and job count of an agent.
#[derive(Debug)]
pub struct GetAgentReputationTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for GetAgentReputationTool {
    const NAME: &'static str = "get-agent-reputation";
    type Args = AgentArgs;

    fn description(&self) -> String {
        "Get the reputation score and total jobs count for an agent".to_owned()
    }

    async fn call(&self, args: AgentArgs) -> ToolResponse {
        respond(
            "Error fetching reputation",
            self.0
                .registry()
                .reputation(args.agent_nonce)
                .await
                .map(|rep| ToolResponse::json(&rep)),
        )
    }
}

/// Arguments of `submit-agent-feedback`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeedbackArgs {
    /// The NFT nonce of the agent.
    pub agent_nonce: u64,
    /// Rating from 1 to 5.
    pub rating: u8,
    /// Address submitting the feedback.
    #[serde(default)]
    pub sender: Option<String>,
}

/// Unsigned reputation feedback.
#[derive(Debug)]
pub struct SubmitAgentFeedbackTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SubmitAgentFeedbackTool {
    const NAME: &'static str = "submit-agent-feedback";
    type Args = FeedbackArgs;

    fn description(&self) -> String {
        "Create an unsigned transaction to submit feedback/rating for an agent".to_owned()
    }

    async fn call(&self, args: FeedbackArgs) -> ToolResponse {
        respond("Error creating feedback transaction", feedback_template(&self.0, &args))
    }
}

fn feedback_template(context: &ToolContext, args: &FeedbackArgs) -> Result<ToolResponse> {
    let sender = args
        .sender
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_field_address("sender", s))
        .transpose()?;
    let tx = context.builder().submit_feedback(
        context.registry().addresses().reputation,
        sender,
        args.agent_nonce,
        args.rating,
    )?;
    Ok(ToolResponse::json(&tx.to_plain()))
}

/// Whether a job carries a verified proof.
#[derive(Debug)]
pub struct IsJobVerifiedTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for IsJobVerifiedTool {
    const NAME: &'static str = "is-job-verified";
    type Args = JobArgs;

    fn description(&self) -> String {
        "Check if a job ID has been cryptographically verified by an Oracle".to_owned()
    }

    async fn call(&self, args: JobArgs) -> ToolResponse {
        respond(
            "Error checking job status",
            self.0
                .registry()
                .is_job_verified(&args.job_id)
                .await
                .map(|verified| ToolResponse::json(&json!({ "job_id": args.job_id, "verified": verified }))),
        )
    }
}

/// Arguments of `submit-job-proof`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProofArgs {
    /// The unique job identifier.
    pub job_id: String,
    /// Proof hash, hex or text.
    pub proof_hash: String,
}

/// Unsigned job proof submission.
#[derive(Debug)]
pub struct SubmitJobProofTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SubmitJobProofTool {
    const NAME: &'static str = "submit-job-proof";
    type Args = ProofArgs;

    fn description(&self) -> String {
        "Create an unsigned transaction to submit job proof (Agent only)".to_owned()
    }

    async fn call(&self, args: ProofArgs) -> ToolResponse {
        respond(
            "Error creating proof transaction",
            self.0
                .builder()
                .submit_proof(
                    self.0.registry().addresses().validation,
                    None,
                    args.job_id.trim(),
                    args.proof_hash.trim(),
                )
                .map(|tx| ToolResponse::json(&tx.to_plain())),
        )
    }
}

/// Arguments of `verify-job`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyJobArgs {
    /// The unique job identifier.
    pub job_id: String,
    /// Verification verdict.
    pub status: bool,
}

/// Unsigned verdict on a job.
#[derive(Debug)]
pub struct VerifyJobTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for VerifyJobTool {
    const NAME: &'static str = "verify-job";
    type Args = VerifyJobArgs;

    fn description(&self) -> String {
        "Create an unsigned transaction to finalize job verification (Oracle only)".to_owned()
    }

    async fn call(&self, args: VerifyJobArgs) -> ToolResponse {
        respond(
            "Error creating verify transaction",
            self.0
                .builder()
                .verify_job(
                    self.0.registry().addresses().validation,
                    None,
                    args.job_id.trim(),
                    args.status,
                )
                .map(|tx| ToolResponse::json(&tx.to_plain())),
        )
    }
}

/// Aggregated trust view of an agent.
#[derive(Debug)]
pub struct GetAgentTrustSummaryTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for GetAgentTrustSummaryTool {
    const NAME: &'static str = "get-agent-trust-summary";
    type Args = AgentArgs;

    fn description(&self) -> String {
        "Get aggregated trust and reputation summary for an agent".to_owned()
    }

    async fn call(&self, args: AgentArgs) -> ToolResponse {
        respond(
            "Error fetching trust summary",
            self.0
                .registry()
                .trust_summary(args.agent_nonce)
                .await
                .map(|summary| ToolResponse::json(&summary)),
        )
    }
}

/// Arguments of `get-top-rated-agents`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TopRatedArgs {
    /// Category to search in, or 'all'.
    pub category: String,
    /// Number of agents to return (default 5).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Agents ranked by reputation.
#[derive(Debug)]
pub struct GetTopRatedAgentsTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for GetTopRatedAgentsTool {
    const NAME: &'static str = "get-top-rated-agents";
    type Args = TopRatedArgs;

    fn description(&self) -> String {
        "Get the highest rated agents from the registry".to_owned()
    }

    async fn call(&self, args: TopRatedArgs) -> ToolResponse {
        respond(
            "Error fetching top rated agents",
            self.0
                .registry()
                .top_rated(&args.category, args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
                .await
                .map(|agents| ToolResponse::json(&agents)),
        )
    }
}

/// Arguments of `search-agents`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchAgentsArgs {
    /// Search keyword (name, capability or tag).
    pub query: String,
    /// Minimum reputation score (0-100).
    #[serde(default)]
    pub min_trust: Option<f64>,
    /// Maximum number of results (default 5).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Agent text search with scores.
#[derive(Debug)]
pub struct SearchAgentsTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for SearchAgentsTool {
    const NAME: &'static str = "search-agents";
    type Args = SearchAgentsArgs;

    fn description(&self) -> String {
        "Search for agents by name, capability, or keyword".to_owned()
    }

    async fn call(&self, args: SearchAgentsArgs) -> ToolResponse {
        let query = args.query.trim();
        let found = self
            .0
            .registry()
            .search_agents(query, args.min_trust, args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
            .await;
        respond(
            "Error searching for agents",
            found.map(|agents| {
                if agents.is_empty() {
                    ToolResponse::text(format!("No agents found matching query: \"{query}\""))
                } else {
                    ToolResponse::json(&agents)
                }
            }),
        )
    }
}

/// Registration file of an agent.
#[derive(Debug)]
pub struct GetAgentManifestTool(pub Arc<ToolContext>);

#[async_trait]
impl Tool for GetAgentManifestTool {
    const NAME: &'static str = "get-agent-manifest";
    type Args = AgentArgs;

    fn description(&self) -> String {
        "Fetch the Agent Registration File (ARF) manifest".to_owned()
    }

    async fn call(&self, args: AgentArgs) -> ToolResponse {
        match self.0.registry().manifest(args.agent_nonce).await {
            Ok(ManifestLookup::Found(manifest)) => ToolResponse::json(&manifest),
            Ok(ManifestLookup::NoTransactions) => {
                ToolResponse::text("No registration transactions found on network.")
            }
            Ok(ManifestLookup::NotFound) => ToolResponse::text(format!(
                "Manifest for Agent #{} not found in recent history.",
                args.agent_nonce
            )),
            Err(Error::Validation(message)) => ToolResponse::error(message),
            Err(e) => ToolResponse::error(format!("Error fetching agent manifest: {e}")),
        }
    }
}
