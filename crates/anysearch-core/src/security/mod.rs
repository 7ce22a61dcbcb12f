//! Authorization: realm scoping of every search.

mod realm_filter;

pub use realm_filter::{build_effective_cond, RealmFilterBuilder, RealmScopeFilter};
