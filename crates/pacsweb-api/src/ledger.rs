//! The data access seam: one async method per ledger endpoint.

use async_trait::async_trait;
use log::{debug, info};
use pacsweb_core::features::{FETCH_EXCHANGERATE_ENDPOINT_V2, TOKEN_IN_EXCHANGE_FETCHER};
use pacsweb_core::forms::{
    AccountSpec, BalanceEvolutionQuery, ExchangeRateQuery, FlowEvolutionQuery, TransactionRequest,
};
use pacsweb_core::{
    Account, AccountFlows, BalanceEvolutionData, Currency, FeatureFlags, JournalPage, Pagination,
    Pk, Transaction,
};
use pacsweb_parser::portfolio::{from_exchange_rates_api, ExchangeRatesHistory};
use pacsweb_parser::PricePortfolio;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::client::HttpClient;
use crate::endpoints;
use crate::error::Result;
use crate::wire::{self, DataResponse};

/// Server side feature toggles, by name
pub type FeatureToggles = BTreeMap<String, bool>;

pub type LedgerApiRef = Arc<dyn LedgerApi>;

/// Everything the views need from the ledger server
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn create_account(&self, spec: &AccountSpec) -> Result<Account>;
    async fn update_account(&self, pk: Pk, spec: &AccountSpec) -> Result<Account>;
    async fn delete_account(&self, pk: Pk) -> Result<()>;
    async fn get_accounts(&self) -> Result<Vec<Account>>;

    async fn create_transaction(&self, request: &TransactionRequest) -> Result<Transaction>;
    async fn update_transaction(&self, pk: Pk, request: &TransactionRequest) -> Result<Transaction>;
    async fn delete_transaction(&self, pk: Pk) -> Result<()>;
    async fn get_transaction(&self, pk: Pk) -> Result<Transaction>;
    async fn get_recent_transactions(&self) -> Result<Vec<Transaction>>;

    async fn get_currencies(&self) -> Result<Vec<Currency>>;

    async fn get_paginated_journal(&self, account: Pk, pagination: &Pagination) -> Result<JournalPage>;

    async fn get_balance_evolution(&self, query: &BalanceEvolutionQuery) -> Result<Vec<BalanceEvolutionData>>;
    async fn get_flows_evolution(&self, query: &FlowEvolutionQuery) -> Result<Vec<AccountFlows>>;

    async fn get_feature_toggles(&self) -> Result<FeatureToggles>;

    /// Exchange rates through the exchangeratesapi.io proxy
    async fn fetch_exchange_rates(&self, query: &ExchangeRateQuery, token: Option<&str>) -> Result<PricePortfolio>;

    /// Exchange rates already shaped as a price portfolio
    async fn fetch_exchange_rates_v2(&self, query: &ExchangeRateQuery, token: Option<&str>) -> Result<PricePortfolio>;

    /// Picks the exchange rate endpoint and whether the token travels in the
    /// query string according to the client feature flags.
    async fn fetch_exchange_rates_with_flags(
        &self,
        flags: &FeatureFlags,
        query: &ExchangeRateQuery,
        token: Option<&str>,
    ) -> Result<PricePortfolio> {
        let token = if flags.is_active(TOKEN_IN_EXCHANGE_FETCHER)? {
            token
        } else {
            None
        };
        if flags.is_active(FETCH_EXCHANGERATE_ENDPOINT_V2)? {
            self.fetch_exchange_rates_v2(query, token).await
        } else {
            self.fetch_exchange_rates(query, token).await
        }
    }
}

#[async_trait]
impl LedgerApi for HttpClient {
    async fn create_account(&self, spec: &AccountSpec) -> Result<Account> {
        spec.validate()?;
        info!("Creating account {}", spec.name);
        self.post(endpoints::ACCOUNTS, &wire::account_spec_to_wire(spec)?).await
    }

    async fn update_account(&self, pk: Pk, spec: &AccountSpec) -> Result<Account> {
        spec.validate()?;
        info!("Updating account {}", pk);
        self.patch(&endpoints::account(pk), &wire::account_spec_to_wire(spec)?).await
    }

    async fn delete_account(&self, pk: Pk) -> Result<()> {
        info!("Deleting account {}", pk);
        self.delete(&endpoints::account(pk)).await
    }

    async fn get_accounts(&self) -> Result<Vec<Account>> {
        self.get(endpoints::ACCOUNTS).await
    }

    async fn create_transaction(&self, request: &TransactionRequest) -> Result<Transaction> {
        info!("Creating transaction {}", request.description);
        self.post(endpoints::TRANSACTIONS, &wire::transaction_request_to_wire(request)?).await
    }

    async fn update_transaction(&self, pk: Pk, request: &TransactionRequest) -> Result<Transaction> {
        info!("Updating transaction {}", pk);
        self.patch(&endpoints::transaction(pk), &wire::transaction_request_to_wire(request)?)
            .await
    }

    async fn delete_transaction(&self, pk: Pk) -> Result<()> {
        info!("Deleting transaction {}", pk);
        self.delete(&endpoints::transaction(pk)).await
    }

    async fn get_transaction(&self, pk: Pk) -> Result<Transaction> {
        self.get(&endpoints::transaction(pk)).await
    }

    async fn get_recent_transactions(&self) -> Result<Vec<Transaction>> {
        self.get(endpoints::TRANSACTIONS).await
    }

    async fn get_currencies(&self) -> Result<Vec<Currency>> {
        self.get(endpoints::CURRENCIES).await
    }

    async fn get_paginated_journal(&self, account: Pk, pagination: &Pagination) -> Result<JournalPage> {
        self.get_with_query(&endpoints::journal(account), &endpoints::journal_query(pagination))
            .await
    }

    async fn get_balance_evolution(&self, query: &BalanceEvolutionQuery) -> Result<Vec<BalanceEvolutionData>> {
        let response: DataResponse<BalanceEvolutionData> = self
            .post(endpoints::BALANCE_EVOLUTION, &wire::balance_evolution_body(query))
            .await?;
        Ok(response.data)
    }

    async fn get_flows_evolution(&self, query: &FlowEvolutionQuery) -> Result<Vec<AccountFlows>> {
        let response: DataResponse<AccountFlows> = self
            .post(endpoints::FLOW_EVOLUTION, &wire::flow_evolution_body(query)?)
            .await?;
        Ok(response.data)
    }

    async fn get_feature_toggles(&self) -> Result<FeatureToggles> {
        self.get(endpoints::FEATURE_TOGGLES).await
    }

    async fn fetch_exchange_rates(&self, query: &ExchangeRateQuery, token: Option<&str>) -> Result<PricePortfolio> {
        let history: ExchangeRatesHistory = self
            .get_with_query(
                endpoints::EXCHANGE_RATES,
                &endpoints::exchange_rates_query(query, token),
            )
            .await?;
        debug!("Received exchange rates for {} days", history.rates.len());
        Ok(from_exchange_rates_api(&history)?)
    }

    async fn fetch_exchange_rates_v2(&self, query: &ExchangeRateQuery, token: Option<&str>) -> Result<PricePortfolio> {
        self.get_with_query(
            endpoints::EXCHANGE_RATES_V2,
            &endpoints::exchange_rates_query(query, token),
        )
        .await
    }
}
