// File: src/validation.rs
// Purpose: Form orchestrator - runs field checks, aggregates verdicts, drives the lifecycle

use std::collections::HashMap;

use crate::adapter::{FormAdapter, GroupId, InputSnapshot, LifecycleEvent};
use crate::checker::{FieldChecker, FieldValue};
use crate::config::{FieldSpec, FormOptions};
use crate::error::Result;
use crate::presenter::FeedbackPresenter;

/// Where the session is in its validation cycle
///
/// `Valid` and `Invalid` are held only from the verdict until the cycle
/// returns, while feedback is rendered and the lifecycle event dispatched.
/// Between calls `state()` is always `Idle`; the verdict of the last full
/// cycle is kept in `last_event()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Validating,
    Valid,
    Invalid,
}

/// Something the session reports to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A single group was checked
    FieldChecked {
        group: GroupId,
        field: String,
        invalid: bool,
    },
    /// A full validation cycle finished
    Lifecycle(LifecycleEvent),
}

/// Verdict for one checked group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldResult {
    pub group: GroupId,
    pub field: String,
    pub invalid: bool,
}

/// Outcome of a full validation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub results: Vec<FieldResult>,
}

impl ValidationReport {
    /// Whether any checked group failed
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|r| r.invalid)
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Names of failing fields, in check order, without repeats
    pub fn invalid_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for result in self.results.iter().filter(|r| r.invalid) {
            if !names.contains(&result.field.as_str()) {
                names.push(&result.field);
            }
        }
        names
    }

    pub fn event(&self) -> LifecycleEvent {
        if self.has_errors() {
            LifecycleEvent::Invalid
        } else {
            LifecycleEvent::Valid
        }
    }
}

/// Callback for field and lifecycle signals
pub type Listener = Box<dyn FnMut(&Signal)>;

/// A validation session bound to one form
///
/// # Example
///
/// ```
/// use formguard_core::{FieldConfig, FormOptions, MemoryForm, RuleConfig, Validation};
///
/// let mut form = MemoryForm::new();
/// form.add_text("email", "not-an-email");
///
/// let options = FormOptions::with_fields(vec![FieldConfig::new(
///     "email",
///     RuleConfig::new("email").with_prompt("Enter a valid email"),
/// )]);
///
/// let mut validation = Validation::new(form, options).unwrap();
/// let report = validation.validate_all();
/// assert!(report.has_errors());
/// assert_eq!(validation.adapter().submit_count(), 0);
/// ```
pub struct Validation<A: FormAdapter> {
    adapter: A,
    options: FormOptions,
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
    checker: FieldChecker,
    presenter: FeedbackPresenter,
    state: FormState,
    last_event: Option<LifecycleEvent>,
    watched: Vec<(GroupId, String)>,
    listeners: Vec<Listener>,
}

impl<A: FormAdapter> Validation<A> {
    /// Start a session: compile rules, suppress default submit, watch enabled fields
    pub fn new(mut adapter: A, options: FormOptions) -> Result<Self> {
        let fields = options.compile().map_err(|e| {
            tracing::warn!(error = %e, "form options rejected, validation inactive");
            e
        })?;

        let index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();

        adapter.intercept_submit();

        let mut validation = Self {
            checker: FieldChecker::new(options.date_mode),
            presenter: FeedbackPresenter::new(&options),
            adapter,
            options,
            fields,
            index,
            state: FormState::Idle,
            last_event: None,
            watched: Vec::new(),
            listeners: Vec::new(),
        };
        validation.rewire();

        for field in &validation.fields {
            if !validation.watched.iter().any(|(_, name)| name == &field.name) {
                tracing::debug!(field = %field.name, "no enabled input for field");
            }
        }

        Ok(validation)
    }

    /// Start a session from a JSON options object
    pub fn from_json(adapter: A, options: &str) -> Result<Self> {
        Self::new(adapter, FormOptions::from_json_str(options)?)
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    /// Event raised by the most recent full cycle
    pub fn last_event(&self) -> Option<LifecycleEvent> {
        self.last_event
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Groups re-validated on change, with their field names
    pub fn watched(&self) -> &[(GroupId, String)] {
        &self.watched
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Register a listener for field and lifecycle signals
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Signal) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Re-scan the form for enabled inputs of configured fields
    ///
    /// Fields enabled after the session started are only re-validated on
    /// change once this has been called. Returns the number of watched groups.
    pub fn rewire(&mut self) -> usize {
        self.watched = self
            .adapter
            .groups()
            .into_iter()
            .filter_map(|group| {
                let input = self.adapter.input(group)?;
                (!input.disabled && self.index.contains_key(&input.name))
                    .then(|| (group, input.name))
            })
            .collect();
        self.watched.len()
    }

    /// Handle the form's submit event
    pub fn on_submit(&mut self) -> ValidationReport {
        self.validate_all()
    }

    /// Handle the form's reset event
    pub fn on_reset(&mut self) {
        self.reset();
    }

    /// Run every configured field and finish the cycle with `is-valid` or `is-invalid`
    pub fn validate_all(&mut self) -> ValidationReport {
        self.transition(FormState::Validating);

        let groups = self.adapter.groups();
        let mut report = ValidationReport::default();

        for field_idx in 0..self.fields.len() {
            for &group in &groups {
                let Some(input) = self.adapter.input(group) else {
                    continue;
                };
                if input.disabled || input.name != self.fields[field_idx].name {
                    continue;
                }

                let invalid = self.check_input(&input, field_idx);
                self.field_checked(group, field_idx, invalid);
                report.results.push(FieldResult {
                    group,
                    field: input.name,
                    invalid,
                });
            }
        }

        let event = report.event();
        self.transition(match event {
            LifecycleEvent::Valid => FormState::Valid,
            LifecycleEvent::Invalid => FormState::Invalid,
        });
        self.last_event = Some(event);

        self.presenter.form_checked(&mut self.adapter, event);
        self.adapter.dispatch(event);
        self.notify(&Signal::Lifecycle(event));

        if event == LifecycleEvent::Valid && self.options.submit_on_valid {
            tracing::debug!("form valid, submitting");
            self.adapter.submit();
        }

        self.transition(FormState::Idle);
        report
    }

    /// Re-check a single field after its input changed
    ///
    /// Only watched, still-enabled groups are checked and no lifecycle event
    /// fires. Returns `None` when nothing was checked.
    pub fn on_field_change(&mut self, name: &str) -> Option<bool> {
        let Some(&field_idx) = self.index.get(name) else {
            tracing::debug!(field = name, "change on unconfigured field ignored");
            return None;
        };

        let groups: Vec<GroupId> = self
            .watched
            .iter()
            .filter(|(_, watched)| watched == name)
            .map(|(group, _)| *group)
            .collect();

        let mut verdict = None;
        for group in groups {
            let Some(input) = self.adapter.input(group) else {
                continue;
            };
            if input.disabled || input.name != name {
                continue;
            }

            let invalid = self.check_input(&input, field_idx);
            self.field_checked(group, field_idx, invalid);
            verdict = Some(verdict.unwrap_or(false) || invalid);
        }
        verdict
    }

    /// Clear every input and all feedback; does not validate
    pub fn reset(&mut self) {
        for group in self.adapter.groups() {
            if self.adapter.input(group).is_none() {
                continue;
            }
            self.adapter.clear_input(group);
            self.presenter.remove_error(&mut self.adapter, group);
            self.presenter.remove_success(&mut self.adapter, group);
            self.presenter.remove_prompt(&mut self.adapter, group);
        }
        self.presenter.remove_error_message(&mut self.adapter);
        tracing::debug!("form reset");
    }

    fn check_input(&self, input: &InputSnapshot, field_idx: usize) -> bool {
        let value = if input.kind.is_checkable() {
            FieldValue::Checked(self.adapter.any_checked(&input.name))
        } else {
            FieldValue::text(&input.value)
        };
        self.checker.check(&value, &self.fields[field_idx].rule.token)
    }

    fn field_checked(&mut self, group: GroupId, field_idx: usize, invalid: bool) {
        let spec = &self.fields[field_idx];
        tracing::debug!(field = %spec.name, %group, rule = %spec.rule.token, invalid, "field verdict");

        self.presenter
            .field_checked(&mut self.adapter, group, &spec.rule, invalid);

        let signal = Signal::FieldChecked {
            group,
            field: spec.name.clone(),
            invalid,
        };
        self.notify(&signal);
    }

    fn notify(&mut self, signal: &Signal) {
        for listener in &mut self.listeners {
            listener(signal);
        }
    }

    fn transition(&mut self, next: FormState) {
        tracing::trace!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, RuleConfig};
    use crate::error::FormError;
    use crate::memory::MemoryForm;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn options(fields: &[(&str, &str)]) -> FormOptions {
        FormOptions::with_fields(
            fields
                .iter()
                .map(|(name, kind)| FieldConfig::new(*name, RuleConfig::new(*kind)))
                .collect(),
        )
    }

    #[test]
    fn test_new_intercepts_submit() {
        let validation = Validation::new(MemoryForm::new(), options(&[])).unwrap();
        assert!(validation.adapter().submit_intercepted());
        assert_eq!(validation.state(), FormState::Idle);
    }

    #[test]
    fn test_new_rejects_bad_rule() {
        let result = Validation::new(MemoryForm::new(), options(&[("x", "zip")]));
        assert!(matches!(result, Err(FormError::UnrecognizedRule(_))));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let result = Validation::from_json(MemoryForm::new(), "\"fields\"");
        assert!(matches!(result, Err(FormError::Configuration(_))));
    }

    #[test]
    fn test_unmatched_field_is_inert() {
        let mut form = MemoryForm::new();
        form.add_text("name", "Ada");
        let mut validation =
            Validation::new(form, options(&[("name", "required"), ("ghost", "required")])).unwrap();

        let report = validation.validate_all();
        assert!(report.is_valid());
        assert_eq!(report.results.len(), 1);
        assert_eq!(validation.on_field_change("ghost"), None);
    }

    #[test]
    fn test_fields_checked_in_option_order() {
        let mut form = MemoryForm::new();
        form.add_text("b", "");
        form.add_text("a", "");
        let mut validation = Validation::new(form, options(&[("a", "required"), ("b", "required")])).unwrap();

        let report = validation.validate_all();
        assert_eq!(report.invalid_fields(), vec!["a", "b"]);
    }

    #[test]
    fn test_state_seen_by_listeners() {
        let mut form = MemoryForm::new();
        form.add_text("name", "");
        let mut validation = Validation::new(form, options(&[("name", "required")])).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        validation.subscribe(move |signal| sink.borrow_mut().push(signal.clone()));

        validation.validate_all();
        assert_eq!(validation.state(), FormState::Idle);
        assert_eq!(validation.last_event(), Some(LifecycleEvent::Invalid));
        assert_eq!(
            *seen.borrow(),
            vec![
                Signal::FieldChecked {
                    group: GroupId(0),
                    field: "name".to_string(),
                    invalid: true,
                },
                Signal::Lifecycle(LifecycleEvent::Invalid),
            ]
        );
    }

    #[test]
    fn test_state_is_idle_between_cycles() {
        let mut form = MemoryForm::new();
        let group = form.add_text("name", "");
        let mut validation = Validation::new(form, options(&[("name", "required")])).unwrap();
        assert_eq!(validation.state(), FormState::Idle);
        assert_eq!(validation.last_event(), None);

        validation.adapter_mut().set_value(group, "Ada");
        assert!(validation.validate_all().is_valid());
        assert_eq!(validation.state(), FormState::Idle);
        assert_eq!(validation.last_event(), Some(LifecycleEvent::Valid));

        validation.on_field_change("name");
        validation.reset();
        assert_eq!(validation.state(), FormState::Idle);
    }

    #[test]
    fn test_rewire_picks_up_enabled_fields() {
        let mut form = MemoryForm::new();
        let group = form.add_text("nick", "");
        form.set_disabled(group, true);
        let mut validation = Validation::new(form, options(&[("nick", "required")])).unwrap();
        assert!(validation.watched().is_empty());

        validation.adapter_mut().set_disabled(group, false);
        assert_eq!(validation.on_field_change("nick"), None);

        assert_eq!(validation.rewire(), 1);
        assert_eq!(validation.on_field_change("nick"), Some(true));
    }
}
