//! formguard core
//!
//! Declarative form validation: field rules are parsed once into typed
//! [`RuleToken`]s, checked against input values on submit and on change, and
//! the verdicts are rendered back onto the form through a [`FormAdapter`].
//!
//! The engine never touches the DOM itself. The browser binding lives in the
//! `formguard-wasm` crate; [`MemoryForm`] is an in-memory adapter for headless
//! use and tests.
//!
//! ## Quick Start
//!
//! ```rust
//! use formguard_core::{FormOptions, MemoryForm, Validation};
//!
//! let mut form = MemoryForm::new();
//! form.add_text("username", "ada");
//! form.add_checkboxes("terms", &[false, true]);
//!
//! let options = FormOptions::from_json_str(r#"{
//!     "fields": [
//!         { "name": "username", "rule": { "type": "minLength:3" } },
//!         { "name": "terms", "rule": { "type": "checked", "prompt": "Please accept" } }
//!     ]
//! }"#).unwrap();
//!
//! let mut validation = Validation::new(form, options).unwrap();
//! assert!(validation.validate_all().is_valid());
//! assert_eq!(validation.adapter().submit_count(), 1);
//! ```

pub mod adapter;
pub mod checker;
pub mod config;
pub mod error;
pub mod memory;
pub mod presenter;
pub mod rule;
pub mod validation;

// Re-export main types
pub use adapter::{FormAdapter, GroupId, InputKind, InputSnapshot, LifecycleEvent};
pub use checker::{check, is_valid_date, is_valid_email, DateMode, FieldChecker, FieldValue};
pub use config::{FieldConfig, FieldSpec, FormOptions, RuleConfig, RuleSpec};
pub use error::FormError;
pub use memory::MemoryForm;
pub use presenter::{FeedbackPresenter, SUMMARY_ID};
pub use rule::RuleToken;
pub use validation::{FieldResult, FormState, Signal, Validation, ValidationReport};
