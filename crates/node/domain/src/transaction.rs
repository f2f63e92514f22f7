//! Transactions

use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error as CodecError, RangeCfg, Read, ReadExt, Write};
use evt_primitives::keccak256;
use serde::{Deserialize, Serialize};

use crate::{Action, ActionCfg, TxId};

/// Default maximum number of actions decoded per action list.
const DEFAULT_MAX_ACTIONS: usize = 64;

#[derive(Clone, Copy, Debug)]
/// Configuration used when decoding transactions from bytes.
pub struct TransactionCfg {
    /// Maximum number of actions in each action list.
    pub max_actions: usize,
    /// Per-action codec configuration.
    pub action: ActionCfg,
}

impl Default for TransactionCfg {
    fn default() -> Self {
        Self { max_actions: DEFAULT_MAX_ACTIONS, action: ActionCfg::default() }
    }
}

/// A transaction: header fields plus its context-free and input actions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Expiration time in seconds since the epoch.
    pub expiration: u32,
    /// Low 16 bits of the referenced block number.
    pub ref_block_num: u16,
    /// Prefix of the referenced block id.
    pub ref_block_prefix: u32,
    /// Upper bound on billed network usage, in 8-byte words.
    pub max_net_usage_words: u32,
    /// Requested execution delay in seconds.
    pub delay_sec: u32,
    /// Actions that may not read or write state.
    pub context_free_actions: Vec<Action>,
    /// Actions applied against state, in order.
    pub actions: Vec<Action>,
}

impl Transaction {
    /// Create a transaction holding the given input actions.
    pub fn with_actions(actions: Vec<Action>) -> Self {
        Self { actions, ..Default::default() }
    }

    /// Compute the transaction identifier from its encoded contents.
    pub fn id(&self) -> TxId {
        TxId(keccak256(self.encode()))
    }
}

impl Write for Transaction {
    fn write(&self, buf: &mut impl BufMut) {
        self.expiration.write(buf);
        self.ref_block_num.write(buf);
        self.ref_block_prefix.write(buf);
        self.max_net_usage_words.write(buf);
        self.delay_sec.write(buf);
        self.context_free_actions.write(buf);
        self.actions.write(buf);
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.expiration.encode_size()
            + self.ref_block_num.encode_size()
            + self.ref_block_prefix.encode_size()
            + self.max_net_usage_words.encode_size()
            + self.delay_sec.encode_size()
            + self.context_free_actions.encode_size()
            + self.actions.encode_size()
    }
}

impl Read for Transaction {
    type Cfg = TransactionCfg;

    fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, CodecError> {
        let expiration = u32::read(buf)?;
        let ref_block_num = u16::read(buf)?;
        let ref_block_prefix = u32::read(buf)?;
        let max_net_usage_words = u32::read(buf)?;
        let delay_sec = u32::read(buf)?;
        let actions_cfg = (RangeCfg::new(0..=cfg.max_actions), cfg.action);
        let context_free_actions = Vec::<Action>::read_cfg(buf, &actions_cfg)?;
        let actions = Vec::<Action>::read_cfg(buf, &actions_cfg)?;
        Ok(Self {
            expiration,
            ref_block_num,
            ref_block_prefix,
            max_net_usage_words,
            delay_sec,
            context_free_actions,
            actions,
        })
    }
}
