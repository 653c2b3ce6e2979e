//! Session
//!
//! The identity collaborator. The view layer only cares whether a
//! principal is present; how it got there is the provider's business.

use std::sync::RwLock;

use async_trait::async_trait;

use askbook_backend::domain::{DomainResult, Principal};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn current_principal(&self) -> Option<Principal>;
    async fn sign_in(&self) -> DomainResult<Principal>;
    async fn sign_out(&self) -> DomainResult<()>;
}

/// Signs in as one fixed profile. Used offline and in tests.
pub struct LocalIdentity {
    profile: Principal,
    current: RwLock<Option<Principal>>,
}

impl LocalIdentity {
    /// Starts signed out
    pub fn new(profile: Principal) -> Self {
        Self {
            profile,
            current: RwLock::new(None),
        }
    }

    pub fn signed_in(profile: Principal) -> Self {
        Self {
            current: RwLock::new(Some(profile.clone())),
            profile,
        }
    }

    fn set(&self, principal: Option<Principal>) {
        *self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = principal;
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    fn current_principal(&self) -> Option<Principal> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn sign_in(&self) -> DomainResult<Principal> {
        self.set(Some(self.profile.clone()));
        log::info!("Signed in as {}", self.profile.uid);
        Ok(self.profile.clone())
    }

    async fn sign_out(&self) -> DomainResult<()> {
        self.set(None);
        log::info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let identity = LocalIdentity::new(Principal::new("u1"));
        assert!(identity.current_principal().is_none());

        let principal = identity.sign_in().await.unwrap();
        assert_eq!(principal.uid, "u1");
        assert_eq!(identity.current_principal(), Some(principal));

        identity.sign_out().await.unwrap();
        assert!(identity.current_principal().is_none());
    }
}
