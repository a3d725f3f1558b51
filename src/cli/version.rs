use accord::governance::{BASIS_POINTS, COLLEGE_SHARE};
use accord::persistence::SCHEMA_VERSION;

/// Display version information
pub fn execute() {
    println!("accord {}", env!("CARGO_PKG_VERSION"));
    println!("Operator CLI for Accord bi-college price governance");
    println!(
        "Snapshot schema v{}, college share {}/{} bps",
        SCHEMA_VERSION, COLLEGE_SHARE, BASIS_POINTS
    );
}
