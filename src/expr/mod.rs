//! Expression grammars used inside flow definitions.
//!
//! Two small closed grammars are parsed once, when a flow is resolved, into
//! typed values and evaluated against an [`ExecutionContext`] just before a
//! step runs:
//!
//! - [`OptionExpr`]: an option value that is a literal, a `$` path into the
//!   external configuration, or a `^^` backreference to an earlier step
//! - [`Condition`]: a `when:` gating expression
//!
//! # Example
//!
//! ```
//! use orgflow::context::{ExecutionContext, StepPath};
//! use orgflow::expr::Condition;
//!
//! let config = serde_yaml::from_str("org: { scratch: true }").unwrap();
//! let ctx = ExecutionContext::new(config);
//! let condition = Condition::parse("org.scratch and org_config.edition != 'Enterprise'").unwrap();
//! assert!(condition.evaluate(&ctx, &StepPath::root()).is_err());
//!
//! let condition = Condition::parse("org.scratch or org.edition == 'Enterprise'").unwrap();
//! assert!(condition.evaluate(&ctx, &StepPath::root()).unwrap());
//! ```
//!
//! [`ExecutionContext`]: crate::context::ExecutionContext

pub mod condition;
pub mod option;
pub mod path;
pub mod reference;

pub use condition::Condition;
pub use option::OptionExpr;
pub use path::AttributePath;
pub use reference::{Backreference, BoundTarget, ReferenceCandidate};
