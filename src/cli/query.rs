//! Read-only commands: status, proposal, ballot, events.

use super::context::{account, open};
use accord::governance::{
    EventQuery, GovernanceEngine, Proposal, ProposalId, ProposalStatus, WeightedTally,
};
use serde::Serialize;
use std::path::Path;

/// Summary printed by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub phase: String,
    pub price: u64,
    pub producers: u64,
    pub consumers: u64,
    pub administrators: Vec<String>,
    pub proposals: u64,
    pub current_proposal: Option<Proposal>,
}

impl StatusReport {
    pub fn collect(engine: &GovernanceEngine) -> Self {
        let counts = engine.member_counts();
        Self {
            phase: engine.phase().to_string(),
            price: engine.current_price(),
            producers: counts.producers,
            consumers: counts.consumers,
            administrators: engine
                .administrators()
                .map(|id| id.as_str().to_string())
                .collect(),
            proposals: engine.proposals().count() as u64,
            current_proposal: engine.current_proposal().cloned(),
        }
    }
}

pub async fn status(config_path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let report = service.read(StatusReport::collect).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("📊 Accord Status");
    println!();
    println!("  Phase: {}", report.phase);
    println!("  Price: {}", report.price);
    println!(
        "  Members: {} producers, {} consumers",
        report.producers, report.consumers
    );
    println!("  Administrators: {}", report.administrators.join(", "));
    println!("  Proposals: {}", report.proposals);
    match &report.current_proposal {
        Some(proposal) => {
            println!();
            print_proposal(proposal, None);
        }
        None => println!("  No open proposal"),
    }
    Ok(())
}

pub async fn proposal(config_path: &Path, id: ProposalId) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let (proposal, tally) = service
        .read(|e| (e.get_proposal(id).cloned(), e.tally(id)))
        .await;
    let proposal = proposal.ok_or_else(|| format!("Proposal #{} not found", id))?;

    print_proposal(&proposal, tally.as_ref());
    Ok(())
}

pub async fn ballot(
    config_path: &Path,
    proposal_id: ProposalId,
    voter: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let voter = account(voter, "voter")?;

    let choice = service.get_vote(proposal_id, &voter).await;
    println!("Proposal #{}: {} -> {}", proposal_id, voter, choice);
    Ok(())
}

pub async fn events(
    config_path: &Path,
    limit: usize,
    proposal_id: Option<ProposalId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let query = EventQuery {
        proposal_id,
        limit: Some(limit),
        ..EventQuery::default()
    };
    let records = service.query_events(&query).await;

    if records.is_empty() {
        println!("No events");
        return Ok(());
    }
    for record in records {
        println!(
            "#{:<5} {:<14} {}",
            record.sequence,
            record.age_display(),
            record.event
        );
    }
    Ok(())
}

fn print_proposal(proposal: &Proposal, tally: Option<&WeightedTally>) {
    let status = match proposal.status {
        ProposalStatus::Pending => "pending".to_string(),
        ProposalStatus::Active => "voting".to_string(),
        ProposalStatus::Applied { tally, price_changed } => format!(
            "applied ({}{})",
            if tally.passes() { "passed" } else { "failed" },
            if price_changed { ", price changed" } else { "" }
        ),
    };

    println!("  Proposal #{}: price {} [{}]", proposal.id, proposal.value, status);
    println!(
        "    Snapshot: {} producers, {} consumers",
        proposal.snapshot.producers, proposal.snapshot.consumers
    );
    println!(
        "    Votes: producers {}/{}, consumers {}/{} (for/against)",
        proposal.votes.producers_for,
        proposal.votes.producers_against,
        proposal.votes.consumers_for,
        proposal.votes.consumers_against
    );
    if let Some(tally) = tally {
        println!(
            "    Weighted: {} for / {} against",
            tally.total_for, tally.total_against
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::context::test_deployment;
    use crate::cli::{members, workflow};
    use accord::identity::AccountId;
    use tempfile::TempDir;

    #[test]
    fn test_status_report_fresh_engine() {
        let admin = AccountId::new("root").unwrap();
        let engine = GovernanceEngine::new([admin], 100).unwrap();

        let report = StatusReport::collect(&engine);
        assert_eq!(report.phase, engine.phase().to_string());
        assert_eq!(report.price, 100);
        assert_eq!(report.administrators, vec!["root".to_string()]);
        assert_eq!(report.proposals, 0);
        assert!(report.current_proposal.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["price"], 100);
    }

    #[tokio::test]
    async fn test_query_commands() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = test_deployment(temp_dir.path()).await;

        members::add(&config_path, "root", "p1", true).await.unwrap();
        members::add(&config_path, "root", "c1", false).await.unwrap();
        workflow::start_registration(&config_path, "root").await.unwrap();
        workflow::propose(&config_path, "root", 120).await.unwrap();

        status(&config_path, false).await.unwrap();
        status(&config_path, true).await.unwrap();
        proposal(&config_path, 1).await.unwrap();
        assert!(proposal(&config_path, 2).await.is_err());
        ballot(&config_path, 1, "p1").await.unwrap();
        assert!(ballot(&config_path, 1, "").await.is_err());
        events(&config_path, 10, None).await.unwrap();
        events(&config_path, 10, Some(1)).await.unwrap();
    }
}
