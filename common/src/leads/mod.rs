//! Lead reconciliation: merging external rows with stored leads and deciding
//! which write an assignment or status change turns into.

pub mod promote;
pub mod reconcile;

pub use promote::{change_status, change_status_at, import_at, promote, promote_at};
pub use reconcile::{find_match, reconcile, status_counts, LeadFilter, LeadMatch, MatchKey};
