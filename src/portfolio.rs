//! One controller per asset kind, sharing a remote side.

use std::{cell::RefCell, rc::Rc};

use tracing::info;

use crate::{
    domain::common::round_to,
    sync::{
        CashAccounts, Collaborators, CollectionController, FixedAssets, Holdings, Liabilities,
        OtherAssets, RemoteCollection,
    },
};

/// Anything that can serve all five asset collections.
pub trait PortfolioRemote:
    RemoteCollection<CashAccounts>
    + RemoteCollection<Holdings>
    + RemoteCollection<FixedAssets>
    + RemoteCollection<Liabilities>
    + RemoteCollection<OtherAssets>
{
}

impl<T> PortfolioRemote for T where
    T: RemoteCollection<CashAccounts>
        + RemoteCollection<Holdings>
        + RemoteCollection<FixedAssets>
        + RemoteCollection<Liabilities>
        + RemoteCollection<OtherAssets>
{
}

pub struct Portfolio {
    pub cash_accounts: CollectionController<CashAccounts>,
    pub holdings: CollectionController<Holdings>,
    pub fixed_assets: CollectionController<FixedAssets>,
    pub liabilities: CollectionController<Liabilities>,
    pub other_assets: CollectionController<OtherAssets>,
}

/// CNY totals over the records whose value is known.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioTotals {
    pub assets_cny: f64,
    pub liabilities_cny: f64,
    pub net_worth_cny: f64,
    /// Records left out because no exchange rate or price is known yet.
    pub unvalued: usize,
}

impl Portfolio {
    /// Every kind kept in memory only.
    pub fn local() -> Self {
        Self {
            cash_accounts: CollectionController::local(),
            holdings: CollectionController::local(),
            fixed_assets: CollectionController::local(),
            liabilities: CollectionController::local(),
            other_assets: CollectionController::local(),
        }
    }

    pub fn backed_by<R>(remote: Rc<RefCell<R>>) -> Self
    where
        R: PortfolioRemote + 'static,
    {
        Self {
            cash_accounts: CollectionController::new(Collaborators::backed_by(Rc::clone(&remote))),
            holdings: CollectionController::new(Collaborators::backed_by(Rc::clone(&remote))),
            fixed_assets: CollectionController::new(Collaborators::backed_by(Rc::clone(&remote))),
            liabilities: CollectionController::new(Collaborators::backed_by(Rc::clone(&remote))),
            other_assets: CollectionController::new(Collaborators::backed_by(remote)),
        }
    }

    /// Refreshes every kind; true only if all of them loaded.
    pub fn refresh_all(&mut self) -> bool {
        let results = [
            self.cash_accounts.refresh(),
            self.holdings.refresh(),
            self.fixed_assets.refresh(),
            self.liabilities.refresh(),
            self.other_assets.refresh(),
        ];
        let loaded = results.iter().filter(|ok| **ok).count();
        info!("refreshed {} of {} asset kinds", loaded, results.len());
        loaded == results.len()
    }

    pub fn is_busy(&self) -> bool {
        self.cash_accounts.is_submitting()
            || self.cash_accounts.is_refreshing()
            || self.holdings.is_submitting()
            || self.holdings.is_refreshing()
            || self.fixed_assets.is_submitting()
            || self.fixed_assets.is_refreshing()
            || self.liabilities.is_submitting()
            || self.liabilities.is_refreshing()
            || self.other_assets.is_submitting()
            || self.other_assets.is_refreshing()
    }

    /// Sum of the per-kind revisions; changes whenever any controller does.
    pub fn revision(&self) -> u64 {
        self.cash_accounts.revision()
            + self.holdings.revision()
            + self.fixed_assets.revision()
            + self.liabilities.revision()
            + self.other_assets.revision()
    }

    pub fn totals(&self) -> PortfolioTotals {
        let mut unvalued = 0;
        let mut sum = |values: Vec<Option<f64>>| -> f64 {
            values
                .into_iter()
                .filter_map(|value| {
                    if value.is_none() {
                        unvalued += 1;
                    }
                    value
                })
                .sum()
        };

        let assets_cny = sum(self.cash_accounts.items().iter().map(|r| r.value_cny).collect())
            + sum(self.holdings.items().iter().map(|r| r.value_cny).collect())
            + sum(self.fixed_assets.items().iter().map(|r| Some(r.value_cny)).collect())
            + sum(self.other_assets.items().iter().map(|r| Some(r.value_cny)).collect());
        let liabilities_cny = sum(self.liabilities.items().iter().map(|r| r.value_cny).collect());

        PortfolioTotals {
            assets_cny: round_to(assets_cny, 2),
            liabilities_cny: round_to(liabilities_cny, 2),
            net_worth_cny: round_to(assets_cny - liabilities_cny, 2),
            unvalued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{CashAccountInput, FixedAssetInput, HoldingInput, LiabilityInput},
        storage::JsonAssetStore,
    };

    #[test]
    fn store_backed_portfolio_round_trips_through_refresh() {
        let store = Rc::new(RefCell::new(JsonAssetStore::in_memory()));
        let mut portfolio = Portfolio::backed_by(Rc::clone(&store));

        portfolio.cash_accounts.open_create();
        assert!(portfolio
            .cash_accounts
            .submit(&CashAccountInput::new("Wallet", "Alipay", 250.0)));
        portfolio.fixed_assets.open_create();
        assert!(portfolio
            .fixed_assets
            .submit(&FixedAssetInput::new("Flat", 1000.0)));

        let mut reloaded = Portfolio::backed_by(store);
        assert!(reloaded.refresh_all());
        assert_eq!(reloaded.cash_accounts.items().len(), 1);
        assert_eq!(reloaded.fixed_assets.items()[0].name, "Flat");
        assert!(!reloaded.is_busy());
    }

    #[test]
    fn totals_skip_records_without_a_known_value() {
        let mut portfolio = Portfolio::local();
        portfolio.cash_accounts.open_create();
        portfolio
            .cash_accounts
            .submit(&CashAccountInput::new("Wallet", "Alipay", 100.0));
        portfolio.holdings.open_create();
        portfolio
            .holdings
            .submit(&HoldingInput::new("AAPL", "Apple", 3.0));
        portfolio.liabilities.open_create();
        portfolio
            .liabilities
            .submit(&LiabilityInput::new("Card", 40.0));

        let totals = portfolio.totals();
        assert_eq!(totals.assets_cny, 100.0);
        assert_eq!(totals.liabilities_cny, 40.0);
        assert_eq!(totals.net_worth_cny, 60.0);
        assert_eq!(totals.unvalued, 1);
    }
}
