use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller lacks the administrator capability.
    #[error("Operation restricted to the administrator")]
    OwnerOnly,

    /// Referenced applicant, policy, or claim does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    /// Caller is neither the required policy holder nor the administrator.
    #[error("Caller '{caller}' is not authorized for this operation")]
    Unauthorized { caller: String },

    /// Value outside its validated domain, or operation invoked in the
    /// wrong state (e.g. resolving an already-resolved claim).
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Premium payment below the required premium.
    #[error("Payment {paid} below required premium {required}")]
    InsufficientFunds { paid: u64, required: u64 },

    /// Policy is not Active, or the claim falls past its end height.
    #[error("Policy {policy_id} is expired or inactive")]
    PolicyExpired { policy_id: u64 },

    /// Duplicate applicant identity or holder→policy binding.
    #[error("{entity} '{key}' already exists")]
    AlreadyExists { entity: &'static str, key: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedgerError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        LedgerError::InvalidInput { reason: reason.into() }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
