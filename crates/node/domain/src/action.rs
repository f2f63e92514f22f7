//! Actions and their declared authorizations.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error as CodecError, FixedSize, RangeCfg, Read, Write};
use evt_primitives::{AccountName, ActionName, Bytes, DomainKey, DomainName};
use serde::{Deserialize, Serialize};

/// Default maximum number of authorizations decoded per action.
const DEFAULT_MAX_AUTHORIZATIONS: usize = 16;

/// Default maximum payload size decoded per action.
const DEFAULT_MAX_DATA_BYTES: usize = 64 * 1024;

/// Configuration used when decoding actions from bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionCfg {
    /// Maximum number of declared authorizations.
    pub max_authorizations: usize,
    /// Maximum payload size in bytes.
    pub max_data_bytes: usize,
}

impl Default for ActionCfg {
    fn default() -> Self {
        Self {
            max_authorizations: DEFAULT_MAX_AUTHORIZATIONS,
            max_data_bytes: DEFAULT_MAX_DATA_BYTES,
        }
    }
}

/// A domain/key authorization pair: the protected resource and the key
/// claimed to act on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuthorizerRef {
    /// Protected domain.
    pub domain: DomainName,
    /// Claimed key.
    pub key: DomainKey,
}

impl AuthorizerRef {
    /// Create a new authorization pair.
    pub const fn new(domain: DomainName, key: DomainKey) -> Self {
        Self { domain, key }
    }
}

impl FixedSize for AuthorizerRef {
    const SIZE: usize = 16;
}

impl Write for AuthorizerRef {
    fn write(&self, buf: &mut impl BufMut) {
        self.domain.write(buf);
        self.key.write(buf);
    }
}

impl Read for AuthorizerRef {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &Self::Cfg) -> Result<Self, CodecError> {
        let domain = DomainName::read_cfg(buf, &())?;
        let key = DomainKey::read_cfg(buf, &())?;
        Ok(Self { domain, key })
    }
}

/// One operation addressed to a receiver account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Account whose handler receives the action first.
    pub account: AccountName,
    /// Operation name.
    pub name: ActionName,
    /// Declared authorizations.
    pub authorization: Vec<AuthorizerRef>,
    /// Opaque payload.
    pub data: Bytes,
}

impl Action {
    /// Create an action without authorizations.
    pub const fn new(account: AccountName, name: ActionName, data: Bytes) -> Self {
        Self { account, name, authorization: Vec::new(), data }
    }

    /// Append a declared authorization.
    #[must_use]
    pub fn with_authorization(mut self, authorizer: AuthorizerRef) -> Self {
        self.authorization.push(authorizer);
        self
    }

    /// Size of the encoded action in bytes.
    pub fn packed_size(&self) -> usize {
        self.encode_size()
    }
}

impl Write for Action {
    fn write(&self, buf: &mut impl BufMut) {
        self.account.write(buf);
        self.name.write(buf);
        self.authorization.write(buf);
        self.data.as_ref().write(buf);
    }
}

impl EncodeSize for Action {
    fn encode_size(&self) -> usize {
        self.account.encode_size()
            + self.name.encode_size()
            + self.authorization.encode_size()
            + self.data.as_ref().encode_size()
    }
}

impl Read for Action {
    type Cfg = ActionCfg;

    fn read_cfg(buf: &mut impl Buf, cfg: &Self::Cfg) -> Result<Self, CodecError> {
        let account = AccountName::read_cfg(buf, &())?;
        let name = ActionName::read_cfg(buf, &())?;
        let authorization = Vec::<AuthorizerRef>::read_cfg(
            buf,
            &(RangeCfg::new(0..=cfg.max_authorizations), ()),
        )?;
        let data = Vec::<u8>::read_cfg(buf, &(RangeCfg::new(0..=cfg.max_data_bytes), ()))?;
        Ok(Self { account, name, authorization, data: Bytes::from(data) })
    }
}
