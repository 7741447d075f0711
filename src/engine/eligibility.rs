use crate::error::RunError;
use crate::partner::types::StatusReply;
use crate::partner::PartnerApi;

pub const CODE_OK: i64 = 200;
/// Returned by the membership query for accounts outside the partner program.
pub const CODE_NOT_A_PARTNER: i64 = 703;
pub const STATUS_ELIMINATED: &str = "ELIMINATED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountStatus {
    Eligible,
    NotAPartner,
    Eliminated,
    OtherError(i64),
}

impl AccountStatus {
    /// Only the documented `ELIMINATED` literal blocks a member; every other
    /// status string is treated as eligible.
    pub fn classify(reply: &StatusReply) -> Self {
        match reply.code {
            CODE_NOT_A_PARTNER => AccountStatus::NotAPartner,
            CODE_OK if reply.status == STATUS_ELIMINATED => AccountStatus::Eliminated,
            CODE_OK => AccountStatus::Eligible,
            code => AccountStatus::OtherError(code),
        }
    }
}

/// Verify the session may evaluate works. Read-only.
pub async fn check<A: PartnerApi + ?Sized>(api: &A) -> Result<(), RunError> {
    if api.needs_login().await {
        return Err(RunError::NotLoggedIn);
    }

    let reply = api.account_status().await.map_err(|e| RunError::StatusQueryFailed {
        code: 0,
        message: format!("{:#}", e),
    })?;

    match AccountStatus::classify(&reply) {
        AccountStatus::Eligible => {
            tracing::info!(status = %reply.status, "partner account eligible");
            Ok(())
        }
        AccountStatus::NotAPartner => Err(RunError::NotAPartner {
            code: reply.code,
            message: reply.message,
        }),
        AccountStatus::Eliminated => Err(RunError::Ineligible(reply.status)),
        AccountStatus::OtherError(code) => Err(RunError::StatusQueryFailed {
            code,
            message: reply.message,
        }),
    }
}
