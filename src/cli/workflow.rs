//! Workflow phase commands, proposal registration and execution.

use super::context::{account, open};
use accord::governance::ExecutionOutcome;
use std::path::Path;

/// Phase-only transitions, all administrator operations.
#[derive(Debug, Clone, Copy)]
enum Step {
    StartRegistration,
    EndRegistration,
    StartVoting,
    EndVoting,
    Reset,
}

async fn transition(
    config_path: &Path,
    caller: &str,
    step: Step,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let caller = account(caller, "caller")?;
    let previous = service.phase().await;

    match step {
        Step::StartRegistration => service.start_proposal_registration(&caller).await?,
        Step::EndRegistration => service.end_proposal_registration(&caller).await?,
        Step::StartVoting => service.start_voting_session(&caller).await?,
        Step::EndVoting => service.end_voting_session(&caller).await?,
        Step::Reset => service.reset_workflow(&caller).await?,
    }

    println!("✅ Workflow: {} -> {}", previous, service.phase().await);
    Ok(())
}

pub async fn start_registration(
    config_path: &Path,
    caller: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    transition(config_path, caller, Step::StartRegistration).await
}

/// Register a proposal for `value`.
pub async fn propose(
    config_path: &Path,
    caller: &str,
    value: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let caller = account(caller, "caller")?;

    let proposal_id = service.create_proposal(&caller, value).await?;
    let current = service.read(|e| e.current_price()).await;

    println!("✅ Proposal #{} registered", proposal_id);
    println!("   Proposed price: {} (current: {})", value, current);
    Ok(())
}

pub async fn end_registration(
    config_path: &Path,
    caller: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    transition(config_path, caller, Step::EndRegistration).await
}

/// Open voting on the registered proposal. Membership is locked until
/// `end-voting`.
pub async fn start_voting(
    config_path: &Path,
    caller: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    transition(config_path, caller, Step::StartVoting).await
}

pub async fn end_voting(
    config_path: &Path,
    caller: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    transition(config_path, caller, Step::EndVoting).await
}

/// Tally the active proposal and report the outcome.
pub async fn execute(
    config_path: &Path,
    caller: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let caller = account(caller, "caller")?;

    let outcome = service.execute_proposal(&caller).await?;
    print_outcome(&outcome);
    Ok(())
}

pub async fn reset(
    config_path: &Path,
    caller: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    transition(config_path, caller, Step::Reset).await
}

fn print_outcome(outcome: &ExecutionOutcome) {
    let tally = &outcome.tally;
    let verdict = if tally.passes() { "PASSED" } else { "FAILED" };

    println!("🗳️  Proposal #{} {}", outcome.proposal_id, verdict);
    println!();
    println!(
        "   Producers: {} for / {} against",
        tally.producer_for, tally.producer_against
    );
    println!(
        "   Consumers: {} for / {} against",
        tally.consumer_for, tally.consumer_against
    );
    println!(
        "   Weighted:  {} for / {} against",
        tally.total_for, tally.total_against
    );
    println!();
    if outcome.price_changed() {
        println!(
            "   Price: {} -> {}",
            outcome.old_price, outcome.new_price
        );
    } else {
        println!("   Price unchanged: {}", outcome.new_price);
    }
}
