use super::context::{account, open};
use accord::governance::VoteChoice;
use std::path::Path;

/// Cast a ballot on the active proposal
///
/// Ballots are final: a member votes at most once per proposal and cannot
/// change or withdraw the choice. Abstentions are recorded but carry no
/// weight in the tally.
pub async fn execute(
    config_path: &Path,
    caller: &str,
    choice: VoteChoice,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let voter = account(caller, "caller")?;

    service.vote(&voter, choice).await?;

    let proposal_id = service.read(|e| e.current_proposal().map(|p| p.id)).await;
    match proposal_id {
        Some(id) => println!("✅ {} voted {} on proposal #{}", voter, choice, id),
        None => println!("✅ {} voted {}", voter, choice),
    }
    Ok(())
}
