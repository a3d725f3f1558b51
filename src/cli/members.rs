//! Membership and administrator commands.

use super::context::{account, open};
use accord::governance::College;
use std::path::Path;

/// Register `identity` in the producer or consumer college.
pub async fn add(
    config_path: &Path,
    caller: &str,
    identity: &str,
    is_producer: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let caller = account(caller, "caller")?;
    let identity = account(identity, "identity")?;

    service
        .add_member(&caller, identity.clone(), is_producer)
        .await?;

    let counts = service.member_counts().await;
    println!(
        "✅ Added {} to the {} college",
        identity,
        College::from_is_producer(is_producer)
    );
    println!(
        "   Members: {} producers, {} consumers",
        counts.producers, counts.consumers
    );
    Ok(())
}

/// Remove `identity` from its college. Refused while a vote is open.
pub async fn remove(
    config_path: &Path,
    caller: &str,
    identity: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let caller = account(caller, "caller")?;
    let identity = account(identity, "identity")?;

    service.remove_member(&caller, &identity).await?;

    println!("✅ Removed {}", identity);
    Ok(())
}

pub async fn grant_admin(
    config_path: &Path,
    caller: &str,
    identity: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let caller = account(caller, "caller")?;
    let identity = account(identity, "identity")?;

    service
        .grant_administrator(&caller, identity.clone())
        .await?;

    println!("✅ {} is now an administrator", identity);
    Ok(())
}

pub async fn revoke_admin(
    config_path: &Path,
    caller: &str,
    identity: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = open(config_path).await?;
    let caller = account(caller, "caller")?;
    let identity = account(identity, "identity")?;

    service.revoke_administrator(&caller, &identity).await?;

    println!("✅ {} is no longer an administrator", identity);
    Ok(())
}
