//! Member resolution for the Giftwire dispatcher.
//!
//! Fetches a guild roster snapshot over the Discord REST API, builds the
//! normalized alias index, and resolves the pairing table into the ordered
//! assignment list the dispatch loop consumes.

pub mod alias_index;
pub mod pairing_table;
pub mod roster_client;
pub mod roster_contract;

pub use alias_index::AliasIndex;
pub use pairing_table::{
    parse_pairing_rows, read_pairing_rows, resolve_assignments, PairingLoadReport,
    PairingLoadStats, PairingRow, ResolvedAssignment,
};
pub use roster_client::{RosterClient, RosterClientConfig};
pub use roster_contract::{GuildSummary, RosterMember};
