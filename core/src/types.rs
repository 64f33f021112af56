//! Shared primitive types used across the entire ledger.

/// Logical height. A monotonically increasing counter supplied by the
/// caller of every operation — the ledger never reads a real clock.
pub type Height = u64;

/// A caller or holder identity, as delivered by the (external)
/// authentication layer.
pub type Identity = String;

/// Monotonic policy identifier, allocated by the ledger.
pub type PolicyId = u64;

/// Monotonic claim identifier, allocated by the ledger.
pub type ClaimId = u64;

/// An integer amount of the single ledger currency. All premium and
/// claim arithmetic is integer math with truncating division.
pub type Amount = u64;
