//! Integration Tests - Use Cases over Mocked Ports
//!
//! Exercises the market service, cache, portfolio and transaction
//! flows against mocked `ContractReader` / `WalletSession` ports.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;

use btc_market_client::adapters::metrics::MetricsRegistry;
use btc_market_client::codec::ClarityValue;
use btc_market_client::config::Network;
use btc_market_client::domain::constants::MARKET_CREATION_FEE;
use btc_market_client::domain::{Outcome, OutcomeMask, PositionStatus};
use btc_market_client::ports::clock::Clock;
use btc_market_client::ports::contract_reader::{ContractReader, ReadCallError};
use btc_market_client::ports::wallet::{
    ContractCallRequest, FungibleConditionCode, PostConditionMode, WalletResponse, WalletSession,
};
use btc_market_client::usecases::{
    MarketDataProvider, MarketService, PortfolioService, TransactionBuilder, TransactionOutcome,
    TransactionService,
};

const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
const USER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";

// ---- Mock Definitions ----

mock! {
    pub Reader {}

    #[async_trait::async_trait]
    impl ContractReader for Reader {
        async fn call_read_only(
            &self,
            function: &str,
            args: &[ClarityValue],
        ) -> Result<ClarityValue, ReadCallError>;

        async fn node_burn_height(&self) -> Result<u64, ReadCallError>;
    }
}

mock! {
    pub Wallet {}

    #[async_trait::async_trait]
    impl WalletSession for Wallet {
        fn stx_address(&self) -> Option<String>;

        async fn open_contract_call(&self, request: &ContractCallRequest) -> WalletResponse;
    }
}

// ---- Helpers ----

fn market_value(id: u64, winner: Option<Outcome>) -> ClarityValue {
    ClarityValue::some(ClarityValue::tuple([
        ("creator", ClarityValue::standard_principal(DEPLOYER).unwrap()),
        ("title", ClarityValue::string_utf8(format!("Block {id} hash even?"))),
        ("description", ClarityValue::string_utf8("")),
        ("settlement-burn-height", ClarityValue::uint(900_100)),
        ("possible-outcomes", ClarityValue::uint(3)),
        ("total-pool", ClarityValue::uint(30_000_000)),
        ("outcome-a-pool", ClarityValue::uint(10_000_000)),
        ("outcome-b-pool", ClarityValue::uint(20_000_000)),
        ("outcome-c-pool", ClarityValue::uint(0)),
        ("outcome-d-pool", ClarityValue::uint(0)),
        (
            "winning-outcome",
            winner.map_or(ClarityValue::OptionalNone, |o| {
                ClarityValue::some(ClarityValue::uint(u128::from(o.mask())))
            }),
        ),
        ("settled", ClarityValue::bool(winner.is_some())),
        ("created-at-burn-height", ClarityValue::uint(900_000)),
        ("created-at-stacks-height", ClarityValue::uint(150_000)),
    ]))
}

fn uint_id(args: &[ClarityValue]) -> u64 {
    match args.first() {
        Some(ClarityValue::UInt(id)) => u64::try_from(*id).unwrap(),
        other => panic!("expected uint id, got {other:?}"),
    }
}

/// Reader with `count` open markets and a fixed burn height.
fn mock_reader(count: u128) -> MockReader {
    let mut reader = MockReader::new();
    reader
        .expect_call_read_only()
        .returning(move |function, args| match function {
            "get-market-count" => Ok(ClarityValue::ok(ClarityValue::uint(count))),
            "get-current-burn-height" => Ok(ClarityValue::ok(ClarityValue::uint(900_050))),
            "get-market" => Ok(market_value(uint_id(args), None)),
            other => Err(ReadCallError::Rejected {
                cause: format!("unexpected {other}"),
            }),
        });
    reader.expect_node_burn_height().never();
    reader
}

struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn starting_now() -> Arc<Self> {
        Arc::new(Self(Mutex::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )))
    }

    fn advance_minutes(&self, minutes: i64) {
        *self.0.lock().unwrap() += chrono::Duration::minutes(minutes);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Reader whose `get-market` calls resolve in reverse order within a batch.
#[derive(Default)]
struct SlowReader {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    finished: AtomicUsize,
    /// (id, markets finished when this id started)
    starts: Mutex<Vec<(u64, usize)>>,
}

#[async_trait::async_trait]
impl ContractReader for SlowReader {
    async fn call_read_only(
        &self,
        function: &str,
        args: &[ClarityValue],
    ) -> Result<ClarityValue, ReadCallError> {
        match function {
            "get-market-count" => Ok(ClarityValue::ok(ClarityValue::uint(25))),
            "get-current-burn-height" => Ok(ClarityValue::ok(ClarityValue::uint(900_050))),
            "get-market" => {
                let id = uint_id(args);
                self.starts
                    .lock()
                    .unwrap()
                    .push((id, self.finished.load(Ordering::SeqCst)));
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);

                tokio::time::sleep(Duration::from_millis(2 * (10 - id % 10))).await;

                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                self.finished.fetch_add(1, Ordering::SeqCst);
                Ok(market_value(id, None))
            }
            other => panic!("unexpected call {other}"),
        }
    }

    async fn node_burn_height(&self) -> Result<u64, ReadCallError> {
        Ok(0)
    }
}

// ---- Integration Tests ----

#[tokio::test]
async fn test_batches_of_ten_preserve_id_order() {
    let reader = Arc::new(SlowReader::default());
    let service = MarketService::new(Arc::clone(&reader));

    let markets = service.fetch_markets().await;

    let ids: Vec<u64> = markets.iter().map(|m| m.id).collect();
    assert_eq!(ids, (0..25).collect::<Vec<_>>());
    assert_eq!(reader.peak.load(Ordering::SeqCst), 10);

    // Each batch starts only after the previous one fully resolved.
    for (id, finished_before) in reader.starts.lock().unwrap().iter() {
        let batch_start = usize::try_from(id / 10 * 10).unwrap();
        assert_eq!(*finished_before, batch_start, "market {id} started early");
    }
}

#[tokio::test]
async fn test_markets_normalised_from_mocked_reads() {
    let service = MarketService::new(Arc::new(mock_reader(2)));

    let markets = service.fetch_markets().await;
    assert_eq!(markets.len(), 2);
    let first = &markets[0];
    assert_eq!(first.title, "Block 0 hash even?");
    assert_eq!(first.description, "");
    assert_eq!(first.creator, DEPLOYER);
    assert_eq!(first.current_burn_height, 900_050);
    assert_eq!(first.blocks_until_settlement(), 50);
    assert!(first.pools_consistent());
}

#[tokio::test]
async fn test_cache_ttl_and_force_refresh() {
    let mut reader = MockReader::new();
    reader
        .expect_call_read_only()
        .withf(|function, _| function == "get-market-count")
        .times(3)
        .returning(|_, _| Ok(ClarityValue::ok(ClarityValue::uint(1))));
    reader
        .expect_call_read_only()
        .withf(|function, _| function == "get-current-burn-height")
        .returning(|_, _| Ok(ClarityValue::ok(ClarityValue::uint(900_050))));
    reader
        .expect_call_read_only()
        .withf(|function, _| function == "get-market")
        .returning(|_, args| Ok(market_value(uint_id(args), None)));

    let clock = ManualClock::starting_now();
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let provider = MarketDataProvider::new(
        Arc::new(MarketService::new(Arc::new(reader))),
        clock.clone(),
        Duration::from_secs(300),
    )
    .with_metrics(Arc::clone(&metrics));

    // t=0 populates
    let first = provider.get_markets(false).await;
    // t=4min served from cache
    clock.advance_minutes(4);
    let second = provider.get_markets(false).await;
    assert!(Arc::ptr_eq(&first, &second));
    // t=6min refetches
    clock.advance_minutes(2);
    provider.get_markets(false).await;
    // forced refresh always refetches
    provider.get_markets(true).await;

    let text = metrics.encode().unwrap();
    assert!(text.contains("btc_market_client_cache_lookups_total{result=\"hit\"} 1"));
    assert!(text.contains("btc_market_client_cache_lookups_total{result=\"miss\"} 3"));
}

#[tokio::test]
async fn test_independent_providers_do_not_share_cache() {
    let clock = ManualClock::starting_now();
    let a = MarketDataProvider::new(
        Arc::new(MarketService::new(Arc::new(mock_reader(1)))),
        clock.clone(),
        Duration::from_secs(300),
    );
    let b = MarketDataProvider::new(
        Arc::new(MarketService::new(Arc::new(mock_reader(2)))),
        clock.clone(),
        Duration::from_secs(300),
    );

    assert_eq!(a.get_markets(false).await.len(), 1);
    assert_eq!(b.get_markets(false).await.len(), 2);
    assert!(b.last_refresh().await.is_some());
    a.clear_cache().await;
    assert!(a.last_refresh().await.is_none());
    assert!(b.last_refresh().await.is_some());
}

#[tokio::test]
async fn test_burn_height_node_fallback() {
    let mut reader = MockReader::new();
    reader
        .expect_call_read_only()
        .returning(|_, _| Err(ReadCallError::Http {
            status: 503,
            body: String::new(),
        }));
    reader.expect_node_burn_height().times(1).returning(|| Ok(871_500));

    let service = MarketService::new(Arc::new(reader));
    assert_eq!(service.current_burn_height().await, 871_500);
}

#[tokio::test]
async fn test_portfolio_against_settled_market() {
    let mut reader = MockReader::new();
    reader
        .expect_call_read_only()
        .returning(|function, args| match function {
            "get-market-count" => Ok(ClarityValue::ok(ClarityValue::uint(2))),
            "get-current-burn-height" => Ok(ClarityValue::ok(ClarityValue::uint(900_300))),
            "get-market" => {
                let id = uint_id(args);
                Ok(market_value(id, (id == 0).then_some(Outcome::A)))
            }
            "get-user-position" => Ok(ClarityValue::some(ClarityValue::tuple([
                ("outcome-a-amount", ClarityValue::uint(0)),
                ("outcome-b-amount", ClarityValue::uint(5_000_000)),
                ("outcome-c-amount", ClarityValue::uint(0)),
                ("outcome-d-amount", ClarityValue::uint(0)),
                ("total-invested", ClarityValue::uint(5_000_000)),
                ("claimed", ClarityValue::bool(false)),
            ]))),
            other => panic!("unexpected call {other}"),
        });

    let portfolio = PortfolioService::new(Arc::new(MarketService::new(Arc::new(reader))));
    let report = portfolio.portfolio(USER).await;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.entries[0].status, PositionStatus::Lost);
    assert!(!report.entries[0].can_claim);
    assert_eq!(report.entries[1].status, PositionStatus::Active);
    assert_eq!(report.claimable, 0);
    assert_eq!(report.total_invested, 10_000_000);
    assert!(!portfolio.can_claim_winnings(0, USER).await);
}

fn builder() -> TransactionBuilder {
    TransactionBuilder::new(
        Network::Testnet,
        DEPLOYER.to_string(),
        "btc-prediction-market".to_string(),
    )
}

#[tokio::test]
async fn test_bet_submitted_with_exact_post_condition() {
    let mut wallet = MockWallet::new();
    wallet.expect_stx_address().returning(|| Some(USER.to_string()));
    wallet
        .expect_open_contract_call()
        .withf(|request| {
            request.function_name == "bet-outcome-a"
                && request.post_condition_mode == PostConditionMode::Deny
                && request.post_conditions.len() == 1
                && request.post_conditions[0].amount == 10_000_000
                && request.post_conditions[0].condition_code == FungibleConditionCode::Equal
                && request.post_conditions[0].principal == USER
        })
        .times(1)
        .returning(|_| WalletResponse::Finished {
            tx_id: "0xabc123".to_string(),
        });

    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let service = TransactionService::new(builder(), Arc::new(wallet)).with_metrics(Arc::clone(&metrics));

    let outcome = service.place_bet(0, Outcome::A, 10_000_000).await;
    assert_eq!(
        outcome,
        TransactionOutcome::Submitted {
            tx_id: "0xabc123".to_string()
        }
    );
    assert!(metrics
        .encode()
        .unwrap()
        .contains("action=\"place-bet\",outcome=\"submitted\"} 1"));
}

#[tokio::test]
async fn test_cancel_and_failure_are_reported() {
    let mut wallet = MockWallet::new();
    wallet.expect_stx_address().returning(|| Some(USER.to_string()));
    wallet
        .expect_open_contract_call()
        .withf(|request| request.function_name == "claim-winnings")
        .times(1)
        .returning(|_| WalletResponse::Cancelled);
    wallet
        .expect_open_contract_call()
        .withf(|request| request.function_name == "settle-market")
        .times(1)
        .returning(|_| WalletResponse::Failed {
            reason: "broadcast rejected".to_string(),
        });

    let service = TransactionService::new(builder(), Arc::new(wallet));

    assert_eq!(service.claim_winnings(3).await, TransactionOutcome::Cancelled);
    assert_eq!(
        service.settle_market(3).await,
        TransactionOutcome::Failed {
            error: "broadcast rejected".to_string()
        }
    );
}

#[tokio::test]
async fn test_invalid_input_never_prompts_wallet() {
    let mut wallet = MockWallet::new();
    wallet.expect_stx_address().returning(|| Some(USER.to_string()));
    wallet.expect_open_contract_call().never();

    let service = TransactionService::new(builder(), Arc::new(wallet));

    let small = service.place_bet(0, Outcome::B, 500_000).await;
    assert!(matches!(small, TransactionOutcome::Failed { .. }));
    let untitled = service.create_binary_market("", "", 900_100).await;
    assert!(matches!(untitled, TransactionOutcome::Failed { .. }));
    let single = service
        .create_multi_market("One", "", 900_100, OutcomeMask(4))
        .await;
    assert!(matches!(single, TransactionOutcome::Failed { .. }));
}

#[tokio::test]
async fn test_disconnected_wallet_fails_fast() {
    let mut wallet = MockWallet::new();
    wallet.expect_stx_address().returning(|| None);
    wallet.expect_open_contract_call().never();

    let service = TransactionService::new(builder(), Arc::new(wallet));
    assert_eq!(
        service.claim_winnings(1).await,
        TransactionOutcome::Failed {
            error: "no wallet account connected".to_string()
        }
    );
}

#[tokio::test]
async fn test_market_creation_pays_exact_fee() {
    let mut wallet = MockWallet::new();
    wallet.expect_stx_address().returning(|| Some(USER.to_string()));
    wallet
        .expect_open_contract_call()
        .withf(|request| {
            request.function_name == "create-multi-market"
                && request.function_args.len() == 7
                && request.post_conditions[0].amount == MARKET_CREATION_FEE
                && request.post_conditions[0].condition_code == FungibleConditionCode::Equal
        })
        .times(1)
        .returning(|_| WalletResponse::Finished {
            tx_id: "0xfee".to_string(),
        });

    let service = TransactionService::new(builder(), Arc::new(wallet));
    let outcome = service
        .create_multi_market("Which quarter?", "Hash range quarter", 900_500, OutcomeMask(15))
        .await;
    assert!(matches!(outcome, TransactionOutcome::Submitted { .. }));
}
