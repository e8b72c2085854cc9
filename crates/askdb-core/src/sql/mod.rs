//! SQL text handling: phrase templates, model-output extraction, and the
//! read-only guard.

mod extract;
mod guard;
mod templates;

pub use extract::{NO_MATCH_PREFIX, extract_sql};
pub use guard::check_read_only;
pub use templates::{EXAMPLE_QUESTIONS, match_template};
