//! Validation framework for Armature
//!
//! Declarative, per-field validation of request records with localized,
//! deduplicated error messages.
//!
//! - **Declared constraints**: each field carries a tag such as
//!   `"required,min=8"`, resolved once per record type
//! - **Custom rules**: register predicates next to the built-in library
//! - **Field naming**: report errors under structural or JSON names, so
//!   form and JSON payloads share one vocabulary
//! - **First-write-wins errors**: one message per field, in the bound locale
//!
//! # Examples
//!
//! ## Validating a record
//!
//! ```
//! use armature_validation::{Field, Record, Validator};
//!
//! struct SignUp {
//!     email: String,
//!     password: String,
//!     name: String,
//! }
//!
//! impl Record for SignUp {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Self::field("Email", |r| (&r.email).into()).rules("required,email"),
//!             Self::field("Password", |r| (&r.password).into())
//!                 .rules("required,min=8,containsany=!@#?*"),
//!             Self::field("Name", |r| (&r.name).into()).rules("omitempty,min=4"),
//!         ]
//!     }
//! }
//!
//! let mut validator = Validator::new().unwrap();
//! let payload = SignUp {
//!     email: "ok@example.com".to_string(),
//!     password: "longpass1!".to_string(),
//!     name: String::new(),
//! };
//!
//! assert!(validator.validate_struct(&payload).is_ok());
//! assert!(validator.valid());
//! ```
//!
//! ## Custom rules and JSON field names
//!
//! ```
//! use armature_validation::{Field, Record, Validator};
//!
//! struct Team {
//!     name: String,
//!     internal_code: String,
//! }
//!
//! impl Record for Team {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Self::field("Name", |r| (&r.name).into())
//!                 .rules("required,alpha_space")
//!                 .json("team_name"),
//!             Self::field("InternalCode", |r| (&r.internal_code).into())
//!                 .rules("required")
//!                 .json_skip(),
//!         ]
//!     }
//! }
//!
//! let mut validator = Validator::builder()
//!     .wire_field_names()
//!     .alpha_space()
//!     .build()
//!     .unwrap();
//!
//! let team = Team {
//!     name: "Team 7".to_string(),
//!     internal_code: String::new(),
//! };
//! let err = validator.validate_struct(&team).unwrap_err();
//!
//! assert!(err.is_invalid());
//! assert!(validator.errors().contains("team_name"));
//! assert_eq!(validator.errors().len(), 1);
//! ```

mod aggregator;
pub mod builtin;
mod config;
mod errors;
mod evaluator;
mod naming;
mod record;
mod rules;
pub mod translation;
mod validator;
mod value;

pub use aggregator::*;
pub use config::*;
pub use errors::*;
pub use evaluator::*;
pub use naming::*;
pub use record::*;
pub use rules::*;
pub use translation::{Translate, Translator};
pub use validator::*;
pub use value::*;
