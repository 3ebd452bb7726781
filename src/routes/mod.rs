/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// The split keeps access control explicit: public reads, session-guarded
/// user routes, and admin-gated content mutations each live in their own
/// router, and the three are merged and nested under `/api/v1`.

/// Routes accessible to everyone. Some responses still adapt their shape to
/// an optional caller identity (artwork listing, single-artist fetch).
pub mod public;

/// Routes protected by the auth middleware; any logged-in user qualifies.
pub mod authenticated;

/// Gallery-content mutations. Every handler here enforces the admin role
/// itself, before doing anything else.
pub mod admin;
