//! formguard WASM
//!
//! WebAssembly bindings for formguard.
//! Attaches the validation engine to a `<form>` in the page and exposes the
//! rule checks to JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use formguard_core::{self as engine, FieldValue, FormOptions, LifecycleEvent, RuleToken, Validation};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlFormElement};

pub mod dom;

pub use dom::DomForm;

type Session = Rc<RefCell<Validation<DomForm>>>;

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// An event listener that is removed again when dropped
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

/// Validation attached to a form
///
/// Dropping it (or calling `detach`) removes every listener it installed.
#[wasm_bindgen]
pub struct FormValidator {
    session: Session,
    form_listeners: Vec<Listener>,
    field_listeners: Vec<Listener>,
}

/// Attach validation to a form
///
/// # Example (JavaScript)
/// ```javascript
/// const validator = attach(document.querySelector('#signup'), {
///     fields: [
///         { name: 'email', rule: { type: 'email', prompt: 'Enter a valid email' } },
///         { name: 'terms', rule: { type: 'checked' } }
///     ],
///     submitOnValid: true
/// });
/// form.addEventListener('is-invalid', () => console.log('fix the form'));
/// ```
#[wasm_bindgen]
pub fn attach(form: HtmlFormElement, options: JsValue) -> Result<FormValidator, JsValue> {
    let options: FormOptions = serde_wasm_bindgen::from_value(options).map_err(|e| {
        let msg = format!("Options have to be a valid object: {}", e);
        web_sys::console::warn_1(&JsValue::from_str(&msg));
        JsValue::from_str(&msg)
    })?;

    let adapter = DomForm::new(form.clone())?;
    let validation = Validation::new(adapter, options).map_err(|e| {
        let msg = e.to_string();
        web_sys::console::warn_1(&JsValue::from_str(&msg));
        JsValue::from_str(&msg)
    })?;
    let session: Session = Rc::new(RefCell::new(validation));

    let target: EventTarget = form.into();
    let on_submit = {
        let session = Rc::clone(&session);
        move |event: Event| {
            event.prevent_default();
            with_session(&session, |v| {
                v.on_submit();
            });
        }
    };
    let on_reset = {
        let session = Rc::clone(&session);
        move |event: Event| {
            event.prevent_default();
            with_session(&session, |v| v.on_reset());
        }
    };

    let form_listeners = vec![
        Listener::attach(target.clone(), "submit", on_submit)?,
        Listener::attach(target, "reset", on_reset)?,
    ];

    let field_listeners = wire_fields(&session)?;

    Ok(FormValidator {
        session,
        form_listeners,
        field_listeners,
    })
}

/// Install change/input listeners on every control of every watched group
///
/// A checkbox or radio group gets a listener per box, so ticking any of
/// them re-validates the field.
fn wire_fields(session: &Session) -> Result<Vec<Listener>, JsValue> {
    let targets: Vec<(EventTarget, String)> = {
        let validation = session.borrow();
        validation
            .watched()
            .iter()
            .flat_map(|(group, name)| {
                validation
                    .adapter()
                    .input_elements(*group)
                    .into_iter()
                    .map(move |el| (el.unchecked_into::<EventTarget>(), name.clone()))
            })
            .collect()
    };

    let mut listeners = Vec::with_capacity(targets.len() * 2);
    for (target, name) in targets {
        for event in ["change", "input"] {
            let session = Rc::clone(session);
            let name = name.clone();
            let handler = move |_: Event| {
                with_session(&session, |v| {
                    v.on_field_change(&name);
                });
            };
            listeners.push(Listener::attach(target.clone(), event, handler)?);
        }
    }
    Ok(listeners)
}

/// Run against the session unless it is already busy (re-entrant event)
fn with_session<R>(session: &Session, f: impl FnOnce(&mut Validation<DomForm>) -> R) -> Option<R> {
    match session.try_borrow_mut() {
        Ok(mut validation) => Some(f(&mut validation)),
        Err(_) => {
            web_sys::console::warn_1(&JsValue::from_str(
                "formguard: event ignored while a validation cycle is running",
            ));
            None
        }
    }
}

fn busy() -> JsValue {
    JsValue::from_str("validation cycle already running")
}

#[wasm_bindgen]
impl FormValidator {
    /// Validate every field; returns true when the form is valid
    pub fn validate(&self) -> Result<bool, JsValue> {
        with_session(&self.session, |v| v.validate_all().is_valid()).ok_or_else(busy)
    }

    /// Re-check one field; returns true when it is invalid, undefined when not checked
    #[wasm_bindgen(js_name = validateField)]
    pub fn validate_field(&self, name: &str) -> Result<Option<bool>, JsValue> {
        with_session(&self.session, |v| v.on_field_change(name)).ok_or_else(busy)
    }

    /// Clear values and feedback
    pub fn reset(&self) -> Result<(), JsValue> {
        with_session(&self.session, |v| v.reset()).ok_or_else(busy)
    }

    /// Watch inputs enabled since the validator was attached
    pub fn rewire(&mut self) -> Result<usize, JsValue> {
        let count = with_session(&self.session, |v| v.rewire()).ok_or_else(busy)?;
        self.field_listeners.clear();
        self.field_listeners = wire_fields(&self.session)?;
        Ok(count)
    }

    /// `"is-valid"` / `"is-invalid"` for the last full cycle
    #[wasm_bindgen(js_name = lastEvent)]
    pub fn last_event(&self) -> Option<String> {
        let event = self.session.try_borrow().ok()?.last_event()?;
        Some(event.event_name().to_string())
    }

    /// Remove every listener installed by `attach`
    pub fn detach(mut self) {
        self.field_listeners.clear();
        self.form_listeners.clear();
    }
}

/// Check a single value against a rule token
///
/// Returns true when the value is invalid. Checkbox groups are not covered
/// here; `checked` is always satisfied by a plain value.
///
/// # Example (JavaScript)
/// ```javascript
/// checkValue('12345', 'maxLength:5'); // false
/// checkValue('', 'maxLength:5');      // true
/// ```
#[wasm_bindgen(js_name = checkValue)]
pub fn check_value(value: &str, rule: &str) -> Result<bool, JsValue> {
    let token = RuleToken::parse(rule).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(engine::check(&FieldValue::text(value), &token))
}

/// Quick email validation
#[wasm_bindgen(js_name = isValidEmail)]
pub fn is_valid_email_js(email: &str) -> bool {
    engine::is_valid_email(email.trim())
}

/// Name of the DOM event fired for a verdict
#[wasm_bindgen(js_name = lifecycleEventName)]
pub fn lifecycle_event_name(valid: bool) -> String {
    let event = if valid {
        LifecycleEvent::Valid
    } else {
        LifecycleEvent::Invalid
    };
    event.event_name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_email_validation() {
        assert!(is_valid_email_js("user@example.com"));
        assert!(!is_valid_email_js("invalid-email"));
    }

    #[wasm_bindgen_test]
    fn test_check_value() {
        assert_eq!(check_value("", "required").unwrap(), true);
        assert_eq!(check_value("ada", "minLength:3").unwrap(), false);
        assert_eq!(check_value("123456", "maxLength:5").unwrap(), true);
        assert!(check_value("x", "phone").is_err());
    }

    #[wasm_bindgen_test]
    fn test_lifecycle_event_name() {
        assert_eq!(lifecycle_event_name(true), "is-valid");
        assert_eq!(lifecycle_event_name(false), "is-invalid");
    }
}
