//! Entitlement resolution without a running server
//!
//! Useful for checking how directory group names map onto agencies and
//! classification ceilings before they reach production.

use anyhow::Result;
use clap::Args;
use hub_core::{PermissionResolver, UserEntitlements};

/// Arguments for the resolve command
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Directory groups, comma separated or repeated
    #[arg(short, long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// User id to report
    #[arg(short, long, default_value = "cli-user")]
    pub user: String,

    /// Email to report
    #[arg(long, default_value = "")]
    pub email: String,
}

/// Run the resolve command
pub fn run(args: ResolveArgs) -> Result<()> {
    let entitlements = resolve(&args);
    println!("{}", serde_json::to_string_pretty(&entitlements)?);
    Ok(())
}

fn resolve(args: &ResolveArgs) -> UserEntitlements {
    let resolver = PermissionResolver::new();
    let groups: Vec<String> = args
        .groups
        .iter()
        .map(|group| group.trim().to_string())
        .filter(|group| !group.is_empty())
        .collect();

    for group in &groups {
        tracing::debug!(group, grants = ?resolver.grants_for_group(group), "Group grants");
    }

    resolver.resolve(&args.user, &args.email, &groups, None)
}
