use crate::schema::{Account, AccountKind};

/// Display palette assigned to accounts by connection order, cycling when a
/// user connects more sources than there are colors.
pub const ACCOUNT_COLORS: [&str; 5] = ["#696EE3", "#FED88A", "#BAE6F0", "#B6E6B8", "#DFE795"];

pub const TOTAL_ID: &str = "total";
pub const TOTAL_NAME: &str = "Total";
pub const TOTAL_COLOR: &str = "#494A62";

/// An account that passed the connection filter, with its display identity
/// resolved.
#[derive(Debug, Clone)]
pub struct ConnectedAccount {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
    pub color: String,
    pub synced: bool,
}

/// Filters to connected, non-errored accounts and assigns colors.
///
/// The upstream API lists the most recent connection first; the dashboard
/// shows oldest first, so the order is reversed before coloring.
pub fn prepare_accounts(accounts: &[Account]) -> Vec<ConnectedAccount> {
    let mut eligible: Vec<&Account> = accounts
        .iter()
        .filter(|account| account.was_connected && account.status != "error")
        .collect();
    eligible.reverse();

    eligible
        .into_iter()
        .enumerate()
        .map(|(index, account)| ConnectedAccount {
            id: account.id.clone(),
            name: account.link_item_details.name.clone(),
            kind: account.kind(),
            color: ACCOUNT_COLORS[index % ACCOUNT_COLORS.len()].to_string(),
            synced: account.is_synced(),
        })
        .collect()
}

pub fn all_synced(accounts: &[ConnectedAccount]) -> bool {
    accounts.iter().all(|account| account.synced)
}
