//! Declared-authorization checks.

use evt_domain::AuthorizerRef;
use evt_primitives::{DomainKey, DomainName, Name};
use serde::{Deserialize, Serialize};

use crate::ApplyError;

/// One weighted entry of a [`Permission`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerWeight {
    /// The domain/key pair.
    pub authorizer: AuthorizerRef,
    /// Weight contributed when the pair is declared.
    pub weight: u16,
}

/// A weighted threshold over domain/key pairs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Permission name.
    pub name: Name,
    /// Weight required.
    pub threshold: u32,
    /// Contributing pairs.
    pub authorizers: Vec<AuthorizerWeight>,
}

impl Permission {
    /// A permission with no authorizers.
    pub const fn new(name: Name, threshold: u32) -> Self {
        Self { name, threshold, authorizers: Vec::new() }
    }

    /// Add a weighted authorizer.
    #[must_use]
    pub fn with_authorizer(mut self, authorizer: AuthorizerRef, weight: u16) -> Self {
        self.authorizers.push(AuthorizerWeight { authorizer, weight });
        self
    }
}

/// Checks claims against an action's declared authorizations and tracks
/// which declarations were consumed.
#[derive(Clone, Debug)]
pub struct AuthorizationChecker<'a> {
    declared: &'a [AuthorizerRef],
    used: Vec<bool>,
}

impl<'a> AuthorizationChecker<'a> {
    /// Create a checker over the declared authorizations.
    pub fn new(declared: &'a [AuthorizerRef]) -> Self {
        Self { declared, used: vec![false; declared.len()] }
    }

    /// Exact membership of `(domain, key)`.
    pub fn has_authorized(&self, domain: DomainName, key: DomainKey) -> bool {
        self.declared.contains(&AuthorizerRef::new(domain, key))
    }

    /// Require `(domain, key)` to be declared.
    pub fn require(&mut self, domain: DomainName, key: DomainKey) -> Result<(), ApplyError> {
        let wanted = AuthorizerRef::new(domain, key);
        let mut found = false;
        for (declared, used) in self.declared.iter().zip(self.used.iter_mut()) {
            if *declared == wanted {
                *used = true;
                found = true;
            }
        }
        if found { Ok(()) } else { Err(ApplyError::AuthorizationFailure { domain, key }) }
    }

    /// Total weight the declared authorizations contribute to `permission`.
    pub fn weight_of(&self, permission: &Permission) -> u32 {
        permission
            .authorizers
            .iter()
            .filter(|entry| self.declared.contains(&entry.authorizer))
            .fold(0u32, |acc, entry| acc.saturating_add(u32::from(entry.weight)))
    }

    /// Require `permission`'s threshold to be met. Returns the reached weight.
    ///
    /// A zero threshold is never satisfied.
    pub fn satisfy(&mut self, permission: &Permission) -> Result<u32, ApplyError> {
        let weight = self.weight_of(permission);
        if permission.threshold == 0 || weight < permission.threshold {
            return Err(ApplyError::InsufficientAuthority {
                permission: permission.name,
                weight,
                threshold: permission.threshold,
            });
        }
        for (declared, used) in self.declared.iter().zip(self.used.iter_mut()) {
            if permission.authorizers.iter().any(|entry| entry.authorizer == *declared) {
                *used = true;
            }
        }
        Ok(weight)
    }

    /// Declarations no successful check has consumed, in declaration order.
    pub fn unused(&self) -> Vec<AuthorizerRef> {
        self.declared
            .iter()
            .zip(&self.used)
            .filter(|(_, used)| !**used)
            .map(|(declared, _)| *declared)
            .collect()
    }
}
