// File: src/adapter.rs
// Purpose: The UI adapter boundary between the engine and the markup it drives

use std::fmt;

/// Identifies one field group within a form
///
/// Groups are numbered in document order by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Kind of control found in a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Select,
    Checkbox,
    Radio,
}

impl InputKind {
    /// Map an input `type` attribute (or `select`) to a kind
    pub fn from_type_attr(attr: &str) -> Self {
        match attr.to_ascii_lowercase().as_str() {
            "checkbox" => InputKind::Checkbox,
            "radio" => InputKind::Radio,
            "select" | "select-one" | "select-multiple" => InputKind::Select,
            _ => InputKind::Text,
        }
    }

    /// Checkbox and radio inputs are validated as a same-named group
    pub fn is_checkable(self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Radio)
    }
}

/// What the engine needs to know about a group's input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSnapshot {
    pub name: String,
    pub kind: InputKind,
    pub disabled: bool,
    pub value: String,
}

/// Form-level lifecycle event raised after a full validation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Valid,
    Invalid,
}

impl LifecycleEvent {
    /// DOM event name fired on the form
    pub fn event_name(self) -> &'static str {
        match self {
            LifecycleEvent::Valid => "is-valid",
            LifecycleEvent::Invalid => "is-invalid",
        }
    }
}

/// Everything the engine asks of the surrounding markup
///
/// Mutations are assumed to succeed; an implementation that can fail should
/// log and carry on, the engine has no retry model.
pub trait FormAdapter {
    /// All field groups of the form, in document order
    fn groups(&self) -> Vec<GroupId>;

    /// The first input or select inside the group, if any
    fn input(&self, group: GroupId) -> Option<InputSnapshot>;

    /// Whether any input in the form named `name` is checked, disabled ones included
    fn any_checked(&self, name: &str) -> bool;

    /// Clear the group's input value and checked state
    fn clear_input(&mut self, group: GroupId);

    fn add_class(&mut self, group: GroupId, class: &str);

    fn remove_class(&mut self, group: GroupId, class: &str);

    /// Whether the group carries help text that is not a validation prompt
    fn has_help_text(&self, group: GroupId) -> bool;

    /// Hide or show the group's non-validation help text
    fn set_help_text_visible(&mut self, group: GroupId, visible: bool);

    /// Append a validation prompt to the group
    fn append_prompt(&mut self, group: GroupId, prompt: &str);

    /// Remove every validation prompt from the group, returning how many were removed
    fn remove_prompts(&mut self, group: GroupId) -> usize;

    fn has_summary(&self, id: &str) -> bool;

    /// Insert the summary alert at the top of the form
    fn prepend_summary(&mut self, id: &str, message: &str);

    fn remove_summary(&mut self, id: &str);

    /// Suppress the platform's default submit action
    fn intercept_submit(&mut self);

    /// Run the platform's submit action
    fn submit(&mut self);

    /// Notify outside listeners of a lifecycle event
    fn dispatch(&mut self, _event: LifecycleEvent) {}
}
