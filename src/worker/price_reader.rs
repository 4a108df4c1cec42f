use std::future::IntoFuture;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, ProviderBuilder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use url::Url;

use crate::abis::{IUniswapV3Pool, IERC20};
use crate::config::Settings;
use crate::db::PoolPriceRecord;
use crate::error::{ConfigError, ReadFailure};
use crate::utils::{sqrt_price_x96_to_prices, DEFAULT_TOKEN_DECIMALS};

use super::source::PriceSource;

/// Reads a Uniswap V3 pool's `slot0` straight from a node and converts it to
/// a decimal-adjusted price in both directions.
#[derive(Clone)]
pub struct OnChainPriceReader {
    /// `None` when no pool is configured; every read is then a skip
    target: Option<(DynProvider, Address)>,
    token0_decimals: Option<u8>,
    token1_decimals: Option<u8>,
    timeout: Duration,
}

impl OnChainPriceReader {
    pub fn new(
        provider: DynProvider,
        pool: Address,
        token0_decimals: Option<u8>,
        token1_decimals: Option<u8>,
        timeout: Duration,
    ) -> Self {
        Self {
            target: (!pool.is_zero()).then_some((provider, pool)),
            token0_decimals,
            token1_decimals,
            timeout,
        }
    }

    /// A reader that always skips.
    pub fn disabled() -> Self {
        Self {
            target: None,
            token0_decimals: None,
            token1_decimals: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let Some(pool) = settings.price_pool() else {
            return Ok(Self::disabled());
        };

        let rpc_url = settings
            .rpc
            .url
            .as_deref()
            .ok_or(ConfigError::Missing { key: "rpc.url" })?;
        let url = Url::parse(rpc_url.trim()).map_err(|e| ConfigError::Invalid {
            key: "rpc.url",
            reason: e.to_string(),
        })?;

        let provider = DynProvider::new(ProviderBuilder::new().connect_http(url));

        Ok(Self::new(
            provider,
            pool,
            settings.price.token0_decimals,
            settings.price.token1_decimals,
            settings.rpc_timeout(),
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Reads the pool once. `Ok(None)` when the reader is disabled.
    pub async fn read(&self, now: DateTime<Utc>) -> Result<Option<PoolPriceRecord>, ReadFailure> {
        let Some((provider, pool_address)) = &self.target else {
            return Ok(None);
        };

        let pool = IUniswapV3Pool::new(*pool_address, provider);
        let slot0_call = pool.slot0();
        let token0_call = pool.token0();
        let token1_call = pool.token1();

        let (slot0, token0, token1) = tokio::try_join!(
            self.call("slot0", slot0_call.call()),
            self.call("token0", token0_call.call()),
            self.call("token1", token1_call.call()),
        )?;

        let sqrt_price_x96 = U256::from(slot0.sqrtPriceX96);
        if sqrt_price_x96.is_zero() {
            return Err(ReadFailure::Malformed(format!(
                "pool {} is not initialized (sqrtPriceX96 = 0)",
                pool_address
            )));
        }

        let (token0_decimals, token1_decimals) = tokio::join!(
            self.token_decimals(provider, token0, self.token0_decimals),
            self.token_decimals(provider, token1, self.token1_decimals),
        );

        let prices = sqrt_price_x96_to_prices(sqrt_price_x96, token0_decimals, token1_decimals)
            .ok_or_else(|| {
                ReadFailure::Malformed(format!(
                    "sqrtPriceX96 {} with decimals {}/{} has no finite price",
                    sqrt_price_x96, token0_decimals, token1_decimals
                ))
            })?;

        debug!(
            "Read pool {} (tick {}): sqrtPriceX96={}",
            pool_address, slot0.tick, sqrt_price_x96
        );

        Ok(Some(PoolPriceRecord::new(
            now,
            *pool_address,
            token0,
            token1,
            token0_decimals,
            token1_decimals,
            prices,
        )))
    }

    /// Token decimals: the configured override, else `decimals()`, else 18.
    async fn token_decimals(
        &self,
        provider: &DynProvider,
        token: Address,
        configured: Option<u8>,
    ) -> u8 {
        if let Some(decimals) = configured {
            return decimals;
        }

        let contract = IERC20::new(token, provider);
        match self.call("decimals", contract.decimals().call()).await {
            Ok(decimals) => decimals,
            Err(e) => {
                warn!(
                    "decimals() failed for token {}: {}. Assuming {}",
                    token, e, DEFAULT_TOKEN_DECIMALS
                );
                DEFAULT_TOKEN_DECIMALS
            },
        }
    }

    /// Runs a contract call under the configured timeout.
    async fn call<T, F>(&self, call: &'static str, request: F) -> Result<T, ReadFailure>
    where
        F: IntoFuture<Output = Result<T, alloy::contract::Error>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(ReadFailure::Call { call, source }),
            Err(_) => Err(ReadFailure::Timeout {
                call,
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl PriceSource for OnChainPriceReader {
    async fn read_price(&self, now: DateTime<Utc>) -> Result<Option<PoolPriceRecord>, ReadFailure> {
        self.read(now).await
    }
}
