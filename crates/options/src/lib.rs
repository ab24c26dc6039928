//! Configuration values and the defaults merger.
//!
//! A [`Config`] is a small insertion-ordered mapping from option name to
//! [`Value`]. Values are plain data or shared [`Callback`]s taking
//! `(datum, context)`.
//!
//! [`merge`] fills missing options on a target from a chain of fallbacks:
//!
//! ```
//! use options::{Config, Value, merge};
//! use serde_json::json;
//!
//! let mut target = Config::from_json(json!({ "fills": null })).unwrap();
//! let defaults = Config::from_json(json!({ "fills": { "defaultFill": "#ABDDA4" } })).unwrap();
//! merge(&mut target, &[Some(&defaults)]);
//! assert_eq!(
//!     target.get_object("fills").and_then(|f| f.get_str("defaultFill")),
//!     Some("#ABDDA4")
//! );
//! ```

pub mod callback;
pub mod config;
pub mod merge;
pub mod value;

pub use callback::Callback;
pub use config::Config;
pub use merge::{merge, merge_deep, merge_value};
pub use value::{Value, format_number};
