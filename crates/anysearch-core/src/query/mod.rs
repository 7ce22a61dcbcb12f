//! Search condition compilation and query assembly.
//!
//! - [`lower`] turns leaf predicates into key-selecting subqueries
//! - [`compiler`] composes them along the condition tree
//! - [`order`] plans ORDER BY joins
//! - [`engine`] assembles COUNT and SELECT statements and runs them

pub mod compiler;
pub mod dialect;
pub mod engine;
pub mod fragment;
pub mod lower;
pub mod order;
pub mod value;

pub use compiler::{compile, Compiled};
pub use dialect::{Dialect, DialectCache};
pub use engine::{SearchEngine, SearchPage, Statement};
pub use fragment::SqlFragment;
pub use lower::{Lowered, Lowering};
pub use order::{OrderBySupport, OrderItem};
pub use value::SqlValue;
