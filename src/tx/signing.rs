//! Signing a transaction with a stored key.
//!
//! A transaction moves through three states: unsigned as received,
//! [`PendingSignature`] once the signer slot is installed and the sign bytes
//! are fixed, and signed once the signature replaces the placeholder.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use prost::Message;
use secrecy::SecretString;

use crate::chain::SignMode;
use crate::keys::KeyRegistry;
use crate::tx::model::{ModeInfo, PublicKey, SignerInfo, Tx, SECP256K1_PUBKEY_TYPE_URL};
use crate::tx::{amino, codec, proto, TxError};

/// Caller-supplied signer metadata plus the transaction JSON.
#[derive(Debug)]
pub struct SignRequest {
    pub tx: serde_json::Value,
    pub name: String,
    pub passphrase: SecretString,
    pub chain_id: String,
    pub account_number: String,
    pub sequence: String,
}

/// A transaction whose signer slot is final; only the signature is missing.
#[derive(Debug)]
pub struct PendingSignature {
    tx: Tx,
    sign_bytes: Vec<u8>,
}

impl PendingSignature {
    /// Install the single signer info and compute the sign bytes for `mode`.
    pub fn prepare(
        mut tx: Tx,
        public_key: &[u8],
        mode: SignMode,
        chain_id: &str,
        account_number: u64,
        sequence: u64,
    ) -> Result<Self, TxError> {
        tx.auth_info.signer_infos = vec![SignerInfo {
            public_key: Some(PublicKey {
                type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
                key: B64.encode(public_key),
            }),
            mode_info: ModeInfo::single(mode),
            sequence,
        }];
        tx.signatures = vec![String::new()];

        let sign_bytes = match mode {
            SignMode::Direct => proto::SignDoc {
                body_bytes: codec::body_to_proto(&tx.body).encode_to_vec(),
                auth_info_bytes: codec::auth_info_to_proto(&tx.auth_info)?.encode_to_vec(),
                chain_id: chain_id.to_string(),
                account_number,
            }
            .encode_to_vec(),
            SignMode::LegacyAminoJson => amino::sign_bytes(&tx, chain_id, account_number, sequence),
        };

        Ok(Self { tx, sign_bytes })
    }

    pub fn sign_bytes(&self) -> &[u8] {
        &self.sign_bytes
    }

    pub fn finish(mut self, signature: &[u8]) -> Tx {
        self.tx.signatures = vec![B64.encode(signature)];
        self.tx
    }
}

/// Signs transactions with keys from a [`KeyRegistry`].
///
/// Blocking: each call opens the keyring twice (public key, then signature).
#[derive(Debug, Clone)]
pub struct SigningEngine {
    registry: KeyRegistry,
    mode: SignMode,
}

impl SigningEngine {
    pub fn new(registry: KeyRegistry, mode: SignMode) -> Self {
        Self { registry, mode }
    }

    pub fn sign(&self, request: SignRequest) -> Result<Tx, TxError> {
        let account_number: u64 = request
            .account_number
            .trim()
            .parse()
            .map_err(|_| TxError::InvalidAccountNumber(request.account_number.clone()))?;
        let sequence: u64 = request
            .sequence
            .trim()
            .parse()
            .map_err(|_| TxError::InvalidSequence(request.sequence.clone()))?;
        let tx: Tx =
            serde_json::from_value(request.tx).map_err(|e| TxError::InvalidTx(e.to_string()))?;

        let public_key = self.registry.public_key(&request.passphrase, &request.name)?;
        let pending = PendingSignature::prepare(
            tx,
            &public_key,
            self.mode,
            &request.chain_id,
            account_number,
            sequence,
        )?;
        let signature = self
            .registry
            .sign(&request.passphrase, &request.name, pending.sign_bytes())?;

        tracing::info!(
            name = %request.name,
            chain_id = %request.chain_id,
            account_number,
            sequence,
            mode = %self.mode,
            "Signed transaction"
        );

        Ok(pending.finish(&signature))
    }
}
