//! Unsigned `MsgSend` transactions with computed gas and fees.

use std::sync::Arc;

use crate::chain::ChainProfile;
use crate::coins::{Coin, CoinError, Coins, Dec, DecCoins, Int};
use crate::keys::address::decode_address;
use crate::node::FeeOracle;
use crate::tx::model::{AuthInfo, Fee, ModeInfo, Msg, MsgSend, SignerInfo, Tx, TxBody};
use crate::tx::{codec, TxError};

/// Fields of a bank send. Empty strings mean "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendRequest {
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub memo: String,
    pub fees: String,
    pub gas: String,
    pub gas_prices: String,
    pub gas_adjustment: String,
}

fn supplied(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_gas_adjustment(value: &str) -> Result<f64, TxError> {
    let adjustment: f64 = value
        .parse()
        .map_err(|_| TxError::InvalidGasAdjustment(value.to_string()))?;
    if !adjustment.is_finite() || adjustment < 0.0 {
        return Err(TxError::InvalidGasAdjustment(value.to_string()));
    }
    Ok(adjustment)
}

/// Builds unsigned send transactions against the node's fee parameters.
#[derive(Clone)]
pub struct TxAssembler {
    oracle: FeeOracle,
    profile: Arc<ChainProfile>,
}

impl TxAssembler {
    pub fn new(oracle: FeeOracle, profile: Arc<ChainProfile>) -> Self {
        Self { oracle, profile }
    }

    fn placeholder_signer(&self) -> SignerInfo {
        SignerInfo {
            public_key: None,
            mode_info: ModeInfo::single(self.profile.sign_mode),
            sequence: 0,
        }
    }

    fn assemble(&self, body: TxBody, fee: Coins, gas_limit: u64) -> Tx {
        Tx {
            body,
            auth_info: AuthInfo {
                signer_infos: vec![self.placeholder_signer()],
                fee: Fee {
                    amount: fee.into_vec(),
                    gas_limit,
                    payer: String::new(),
                    granter: String::new(),
                },
            },
            signatures: vec![String::new()],
        }
    }

    pub async fn build_send(&self, request: &SendRequest) -> Result<Tx, TxError> {
        let fees = supplied(&request.fees);
        let gas_prices = supplied(&request.gas_prices);
        if fees.is_some() && gas_prices.is_some() {
            return Err(TxError::FeesAndGasPrices);
        }

        let amount = Coins::parse(&request.amount)?;
        let Some(first) = amount.first().cloned() else {
            return Err(CoinError::Empty.into());
        };

        let account_hrp = &self.profile.account.address;
        decode_address(request.sender.trim(), account_hrp)?;
        decode_address(request.receiver.trim(), account_hrp)?;

        let explicit_fees = match fees {
            Some(fees) => Some(Coins::parse(fees)?),
            None => None,
        };

        let body = TxBody {
            messages: vec![Msg::Send(MsgSend {
                from_address: request.sender.trim().to_string(),
                to_address: request.receiver.trim().to_string(),
                amount: amount.clone().into_vec(),
            })],
            memo: request.memo.clone(),
            timeout_height: 0,
        };

        let mut gas = match supplied(&request.gas) {
            Some(gas) => gas
                .parse::<u64>()
                .map_err(|_| TxError::InvalidGas(gas.to_string()))?,
            None => {
                let sim_fee = match &explicit_fees {
                    Some(fees) => fees.clone(),
                    None => Coins::from_coins([Coin::new(first.denom.clone(), 1u64)])?,
                };
                let sim_tx = self.assemble(body.clone(), sim_fee, self.profile.default_gas_limit);
                self.oracle.simulate_gas(codec::encode(&sim_tx)?).await?
            }
        };

        if let Some(adjustment) = supplied(&request.gas_adjustment) {
            let adjustment = parse_gas_adjustment(adjustment)?;
            if gas != 0 {
                gas = (adjustment * gas as f64) as u64;
            }
        }

        let mut fee = explicit_fees.clone().unwrap_or_default();

        if let Some(prices) = gas_prices {
            for price in DecCoins::parse(prices)?.iter() {
                let due = price.amount.mul_int(Int::from_u64(gas))?.ceil()?.truncate_int();
                fee.add_coin(Coin::new(price.denom.clone(), due))?;
            }
        }

        if explicit_fees.is_none() {
            let mut tax_rate: Option<Dec> = None;
            for coin in amount.iter() {
                if coin.denom == self.profile.native_denom {
                    continue;
                }
                let rate = match tax_rate {
                    Some(rate) => rate,
                    None => {
                        let rate = self.oracle.current_tax_rate().await?;
                        tax_rate = Some(rate);
                        rate
                    }
                };
                let cap = self.oracle.tax_cap(&coin.denom).await?;
                let due = rate.mul_int(coin.amount)?.truncate_int().min(cap);
                fee.add_coin(Coin::new(coin.denom.clone(), due))?;
            }
        }

        tracing::debug!(gas, fee = %fee, "Assembled send transaction");

        Ok(self.assemble(body, fee, gas))
    }
}
