// File: src/presenter.rs
// Purpose: Render field and form verdicts onto the markup through the adapter

use crate::adapter::{FormAdapter, GroupId, LifecycleEvent};
use crate::config::{FormOptions, RuleSpec};

/// Element id of the summary alert
pub const SUMMARY_ID: &str = "validationErrorMsg";

/// Decides which classes, prompts and summary alert are visible
#[derive(Debug, Clone)]
pub struct FeedbackPresenter {
    error_class: String,
    success_class: String,
    show_error_message: bool,
    error_message_text: String,
}

impl FeedbackPresenter {
    pub fn new(options: &FormOptions) -> Self {
        Self {
            error_class: options.error_group_class.clone(),
            success_class: options.success_group_class.clone(),
            show_error_message: options.show_error_message,
            error_message_text: options.error_message_text.clone(),
        }
    }

    /// React to one field verdict
    pub fn field_checked<A: FormAdapter + ?Sized>(
        &self,
        adapter: &mut A,
        group: GroupId,
        rule: &RuleSpec,
        invalid: bool,
    ) {
        if invalid {
            self.show_error(adapter, group);
            if let Some(prompt) = &rule.prompt {
                self.show_prompt(adapter, group, prompt);
            }
        } else {
            self.remove_error(adapter, group);
            self.remove_prompt(adapter, group);
            if rule.show_success {
                self.show_success(adapter, group);
            }
        }
    }

    /// React to the end of a validation cycle
    pub fn form_checked<A: FormAdapter + ?Sized>(&self, adapter: &mut A, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Valid => self.remove_error_message(adapter),
            LifecycleEvent::Invalid if self.show_error_message => self.show_error_message(adapter),
            LifecycleEvent::Invalid => {}
        }
    }

    pub fn show_error<A: FormAdapter + ?Sized>(&self, adapter: &mut A, group: GroupId) {
        adapter.remove_class(group, &self.success_class);
        adapter.add_class(group, &self.error_class);
    }

    pub fn remove_error<A: FormAdapter + ?Sized>(&self, adapter: &mut A, group: GroupId) {
        adapter.remove_class(group, &self.error_class);
    }

    pub fn show_success<A: FormAdapter + ?Sized>(&self, adapter: &mut A, group: GroupId) {
        adapter.remove_class(group, &self.error_class);
        adapter.add_class(group, &self.success_class);
    }

    pub fn remove_success<A: FormAdapter + ?Sized>(&self, adapter: &mut A, group: GroupId) {
        adapter.remove_class(group, &self.success_class);
    }

    /// Show a validation prompt, hiding (not replacing) existing help text
    ///
    /// A previous validation prompt is dropped first so repeated failures
    /// never stack prompts.
    pub fn show_prompt<A: FormAdapter + ?Sized>(&self, adapter: &mut A, group: GroupId, prompt: &str) {
        adapter.remove_prompts(group);
        if adapter.has_help_text(group) {
            adapter.set_help_text_visible(group, false);
        }
        adapter.append_prompt(group, prompt);
    }

    /// Remove the validation prompt and bring back the original help text
    ///
    /// No-op when no prompt is shown.
    pub fn remove_prompt<A: FormAdapter + ?Sized>(&self, adapter: &mut A, group: GroupId) {
        if adapter.remove_prompts(group) > 0 && adapter.has_help_text(group) {
            adapter.set_help_text_visible(group, true);
        }
    }

    pub fn show_error_message<A: FormAdapter + ?Sized>(&self, adapter: &mut A) {
        if !adapter.has_summary(SUMMARY_ID) {
            adapter.prepend_summary(SUMMARY_ID, &self.error_message_text);
        }
    }

    pub fn remove_error_message<A: FormAdapter + ?Sized>(&self, adapter: &mut A) {
        adapter.remove_summary(SUMMARY_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryForm;
    use crate::rule::RuleToken;

    fn rule(prompt: Option<&str>, show_success: bool) -> RuleSpec {
        RuleSpec {
            token: RuleToken::Required,
            prompt: prompt.map(str::to_string),
            show_success,
        }
    }

    fn setup() -> (FeedbackPresenter, MemoryForm, GroupId) {
        let mut form = MemoryForm::new();
        let group = form.add_text("name", "");
        form.set_help_text(group, "Your full name");
        (FeedbackPresenter::new(&FormOptions::default()), form, group)
    }

    #[test]
    fn test_invalid_field_with_prompt() {
        let (presenter, mut form, group) = setup();
        form.add_class(group, "has-success");

        presenter.field_checked(&mut form, group, &rule(Some("Required"), true), true);

        let g = form.group(group);
        assert!(g.has_class("has-error"));
        assert!(!g.has_class("has-success"));
        assert_eq!(g.prompts, vec!["Required".to_string()]);
        assert!(!g.help_visible);
    }

    #[test]
    fn test_prompts_do_not_stack() {
        let (presenter, mut form, group) = setup();
        let spec = rule(Some("Required"), true);

        presenter.field_checked(&mut form, group, &spec, true);
        presenter.field_checked(&mut form, group, &spec, true);

        assert_eq!(form.group(group).prompts.len(), 1);
    }

    #[test]
    fn test_valid_field_restores_help() {
        let (presenter, mut form, group) = setup();
        let spec = rule(Some("Required"), true);

        presenter.field_checked(&mut form, group, &spec, true);
        presenter.field_checked(&mut form, group, &spec, false);

        let g = form.group(group);
        assert!(!g.has_class("has-error"));
        assert!(g.has_class("has-success"));
        assert!(g.prompts.is_empty());
        assert!(g.help_visible);
        assert_eq!(g.help_text.as_deref(), Some("Your full name"));
    }

    #[test]
    fn test_show_success_disabled() {
        let (presenter, mut form, group) = setup();
        presenter.field_checked(&mut form, group, &rule(None, false), false);
        assert!(form.group(group).classes.is_empty());
    }

    #[test]
    fn test_remove_prompt_idempotent() {
        let (presenter, mut form, group) = setup();
        presenter.show_prompt(&mut form, group, "Required");

        presenter.remove_prompt(&mut form, group);
        let after_first = form.group(group).clone();
        let toggles = form.help_toggles();

        presenter.remove_prompt(&mut form, group);
        assert_eq!(form.group(group), &after_first);
        assert_eq!(form.help_toggles(), toggles);
    }

    #[test]
    fn test_summary_is_deduplicated() {
        let (presenter, mut form, _) = setup();
        presenter.form_checked(&mut form, LifecycleEvent::Invalid);
        presenter.form_checked(&mut form, LifecycleEvent::Invalid);
        assert_eq!(form.summaries().len(), 1);
        assert_eq!(form.summaries()[0].1, "Please check the fields below.");

        presenter.form_checked(&mut form, LifecycleEvent::Valid);
        assert!(form.summaries().is_empty());
    }

    #[test]
    fn test_summary_can_be_disabled() {
        let options = FormOptions {
            show_error_message: false,
            ..FormOptions::default()
        };
        let presenter = FeedbackPresenter::new(&options);
        let mut form = MemoryForm::new();
        presenter.form_checked(&mut form, LifecycleEvent::Invalid);
        assert!(form.summaries().is_empty());
    }
}
