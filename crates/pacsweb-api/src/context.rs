//! Data shared by every view, fetched once at startup.

use log::info;
use pacsweb_core::LedgerSnapshot;

use crate::error::Result;
use crate::ledger::LedgerApi;

/// Fetches accounts, currencies and recent transactions concurrently.
/// Fails as soon as any of the three requests fails.
pub async fn fetch_app_context(api: &dyn LedgerApi) -> Result<LedgerSnapshot> {
    let (accounts, currencies, transactions) = tokio::try_join!(
        api.get_accounts(),
        api.get_currencies(),
        api.get_recent_transactions()
    )?;
    info!(
        "Loaded {} accounts, {} currencies and {} transactions",
        accounts.len(),
        currencies.len(),
        transactions.len()
    );
    Ok(LedgerSnapshot::new(accounts, currencies, transactions))
}
