use common_auth::Claims;

use crate::error::{ClientError, ClientResult};

/// Which branches a fetch covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchScope {
    AllBranches,
    Branch(String),
}

impl FetchScope {
    /// Super admins and managers may ask for every branch; everyone else, and
    /// they too when not in view-all mode, is limited to the token's branch.
    pub fn for_claims(claims: &Claims, view_all: bool) -> ClientResult<Self> {
        let may_view_all = claims
            .role
            .as_ref()
            .is_some_and(|role| role.can_view_all_branches());
        if view_all && may_view_all {
            return Ok(FetchScope::AllBranches);
        }

        claims
            .branch_id
            .clone()
            .map(FetchScope::Branch)
            .ok_or(ClientError::NoBranch)
    }

    pub fn includes(&self, branch_id: &str) -> bool {
        match self {
            FetchScope::AllBranches => true,
            FetchScope::Branch(own) => own == branch_id,
        }
    }

    pub fn branch_id(&self) -> Option<&str> {
        match self {
            FetchScope::AllBranches => None,
            FetchScope::Branch(own) => Some(own),
        }
    }
}
