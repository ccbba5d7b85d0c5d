//! Role capability for administrative operations.
//!
//! Instead of ambient global admin addresses, each component is constructed
//! with the role capability it needs and checks callers against it. Role
//! setters are themselves role-gated.

use serde::{Deserialize, Serialize};

use crate::{AccountId, ZERO_ACCOUNT};

/// Error type for role checks.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoleError {
    /// Caller is not the pool admin.
    #[error("not admin")]
    NotAdmin,

    /// Caller is not the pauser.
    #[error("not pauser")]
    NotPauser,

    /// Caller is not the fee manager.
    #[error("not fee manager")]
    NotFeeManager,

    /// Caller is not the keeper.
    #[error("not keeper")]
    NotKeeper,

    /// A role cannot be assigned to the zero account.
    #[error("zero address")]
    ZeroAddress,
}

/// Convenience result type for role checks.
pub type Result<T> = std::result::Result<T, RoleError>;

/// Administrative roles held by the factory and facade.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminRoles {
    pool_admin: AccountId,
    pauser: AccountId,
    fee_manager: AccountId,
}

impl AdminRoles {
    /// Create the role set with every role held by `initial`.
    pub fn new(initial: AccountId) -> Self {
        Self {
            pool_admin: initial,
            pauser: initial,
            fee_manager: initial,
        }
    }

    pub fn pool_admin(&self) -> AccountId {
        self.pool_admin
    }

    pub fn pauser(&self) -> AccountId {
        self.pauser
    }

    pub fn fee_manager(&self) -> AccountId {
        self.fee_manager
    }

    /// Check that `caller` holds the pool-admin role.
    pub fn require_admin(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.pool_admin {
            return Err(RoleError::NotAdmin);
        }
        Ok(())
    }

    /// Check that `caller` holds the pauser role.
    pub fn require_pauser(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.pauser {
            return Err(RoleError::NotPauser);
        }
        Ok(())
    }

    /// Check that `caller` holds the fee-manager role.
    pub fn require_fee_manager(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.fee_manager {
            return Err(RoleError::NotFeeManager);
        }
        Ok(())
    }

    /// Reassign the pool-admin role. Admin-gated.
    pub fn set_pool_admin(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.require_admin(caller)?;
        if new == ZERO_ACCOUNT {
            return Err(RoleError::ZeroAddress);
        }
        self.pool_admin = new;
        Ok(())
    }

    /// Reassign the pauser role. Pauser-gated.
    pub fn set_pauser(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.require_pauser(caller)?;
        if new == ZERO_ACCOUNT {
            return Err(RoleError::ZeroAddress);
        }
        self.pauser = new;
        Ok(())
    }

    /// Reassign the fee-manager role. Fee-manager-gated.
    pub fn set_fee_manager(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.require_fee_manager(caller)?;
        if new == ZERO_ACCOUNT {
            return Err(RoleError::ZeroAddress);
        }
        self.fee_manager = new;
        Ok(())
    }
}

/// A single keeper role, used by the voter and minter.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeeperRole {
    admin: AccountId,
    keeper: AccountId,
}

impl KeeperRole {
    /// Create the role with `admin` holding both admin and keeper.
    pub fn new(admin: AccountId) -> Self {
        Self {
            admin,
            keeper: admin,
        }
    }

    pub fn keeper(&self) -> AccountId {
        self.keeper
    }

    /// Check that `caller` is the keeper.
    pub fn require_keeper(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.keeper {
            return Err(RoleError::NotKeeper);
        }
        Ok(())
    }

    /// Reassign the keeper. Admin-gated.
    pub fn set_keeper(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        if *caller != self.admin {
            return Err(RoleError::NotAdmin);
        }
        if new == ZERO_ACCOUNT {
            return Err(RoleError::ZeroAddress);
        }
        self.keeper = new;
        Ok(())
    }
}
