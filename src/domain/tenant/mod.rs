//! Tenant module - who is acting, and on behalf of which company.
//!
//! Every request is resolved to an [`Actor`] before it touches a session:
//! either an operator (bearer credential) or a visitor holding a company's
//! access key. Both carry the company they act for, which is the only tenant
//! boundary the rest of the domain needs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::foundation::{AccessKeyId, CompanyId, OperatorId, OperatorRole};

/// Operator resolved from a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIdentity {
    pub operator_id: OperatorId,
    pub company_id: CompanyId,
    pub role: OperatorRole,
}

impl OperatorIdentity {
    pub fn new(operator_id: OperatorId, company_id: CompanyId, role: OperatorRole) -> Self {
        Self {
            operator_id,
            company_id,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Visitor-facing access key resolved to its company and issuing operator.
///
/// Sessions opened through a key are owned by the operator who issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeyGrant {
    pub key_id: AccessKeyId,
    pub company_id: CompanyId,
    pub issuing_operator: OperatorId,
}

impl AccessKeyGrant {
    /// Owner assigned to sessions a visitor opens with this key.
    pub fn session_owner(&self) -> SessionOwner {
        SessionOwner::new(self.issuing_operator, self.company_id)
    }
}

/// Owning operator of a session together with the operator's company.
///
/// Keeping both together means a session's company always equals its
/// owner's company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionOwner {
    pub operator_id: OperatorId,
    pub company_id: CompanyId,
}

impl SessionOwner {
    pub fn new(operator_id: OperatorId, company_id: CompanyId) -> Self {
        Self {
            operator_id,
            company_id,
        }
    }
}

impl From<&OperatorIdentity> for SessionOwner {
    fn from(identity: &OperatorIdentity) -> Self {
        Self::new(identity.operator_id, identity.company_id)
    }
}

/// Authenticated party acting on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Operator(OperatorIdentity),
    Visitor(AccessKeyGrant),
}

impl Actor {
    /// Company the actor is acting for.
    pub fn company_id(&self) -> CompanyId {
        match self {
            Actor::Operator(identity) => identity.company_id,
            Actor::Visitor(grant) => grant.company_id,
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Actor::Operator(_))
    }
}

impl From<OperatorIdentity> for Actor {
    fn from(identity: OperatorIdentity) -> Self {
        Actor::Operator(identity)
    }
}

impl From<AccessKeyGrant> for Actor {
    fn from(grant: AccessKeyGrant) -> Self {
        Actor::Visitor(grant)
    }
}

/// Digest under which access keys are stored.
///
/// Raw keys never reach storage; lookups hash the presented token first.
pub fn access_key_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator(role: OperatorRole) -> OperatorIdentity {
        OperatorIdentity::new(OperatorId::new(1), CompanyId::new(10), role)
    }

    #[test]
    fn actor_reports_company_for_both_kinds() {
        let grant = AccessKeyGrant {
            key_id: AccessKeyId::new(5),
            company_id: CompanyId::new(20),
            issuing_operator: OperatorId::new(2),
        };

        assert_eq!(Actor::from(operator(OperatorRole::Operator)).company_id(), CompanyId::new(10));
        assert_eq!(Actor::from(grant).company_id(), CompanyId::new(20));
    }

    #[test]
    fn access_key_session_owner_is_issuing_operator() {
        let grant = AccessKeyGrant {
            key_id: AccessKeyId::new(5),
            company_id: CompanyId::new(20),
            issuing_operator: OperatorId::new(2),
        };

        let owner = grant.session_owner();
        assert_eq!(owner.operator_id, OperatorId::new(2));
        assert_eq!(owner.company_id, CompanyId::new(20));
    }

    #[test]
    fn admin_flag_follows_role() {
        assert!(operator(OperatorRole::Admin).is_admin());
        assert!(!operator(OperatorRole::Operator).is_admin());
    }

    #[test]
    fn access_key_digest_is_stable_hex() {
        let digest = access_key_digest("pk_live_abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, access_key_digest("  pk_live_abc "));
        assert_ne!(digest, access_key_digest("pk_live_abd"));
    }
}
