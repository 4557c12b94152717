//! Schema-driven form.
//!
//! - `field.rs`  : field kinds, archetypes, per-field rules
//! - `schema.rs` : ordered field list + structural checks
//! - `state.rs`  : values and inline errors of an open form
//! - `engine.rs` : headless open / change / validate-and-submit
//! - `path.rs`   : dot-path access for nested submissions
//! - `popup.rs`  : interactive terminal popup around the engine
//! - `render.rs` : drawing of the popup

mod engine;
mod field;
pub mod path;
mod popup;
mod render;
mod schema;
mod state;
mod value;

pub use engine::{Form, Submission};
pub use field::{Archetype, FieldKind, FormField, REQUIRED_MESSAGE, SelectOption, Validator};
pub use popup::FormPopup;
pub use render::compute_scrollbar_thumb;
pub use schema::{FormSchema, SchemaError};
pub use state::FormState;
pub use value::{FieldValue, FormValues, RawInput, parse_number};
