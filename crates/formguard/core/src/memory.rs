// File: src/memory.rs
// Purpose: In-memory form adapter for headless use and tests

use std::collections::BTreeSet;

use crate::adapter::{FormAdapter, GroupId, InputKind, InputSnapshot, LifecycleEvent};

/// One control inside a memory group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryInput {
    pub name: String,
    pub kind: InputKind,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
}

/// A field group: its controls plus the feedback rendered on it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryGroup {
    pub inputs: Vec<MemoryInput>,
    pub classes: BTreeSet<String>,
    pub help_text: Option<String>,
    pub help_visible: bool,
    pub prompts: Vec<String>,
}

impl MemoryGroup {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// A form held entirely in memory
///
/// Records submits, lifecycle events and help-text toggles so callers can
/// assert on what the engine did.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    groups: Vec<MemoryGroup>,
    summaries: Vec<(String, String)>,
    intercepted: bool,
    submits: usize,
    events: Vec<LifecycleEvent>,
    help_toggles: usize,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group with no input at all
    pub fn add_empty_group(&mut self) -> GroupId {
        self.groups.push(MemoryGroup {
            help_visible: true,
            ..MemoryGroup::default()
        });
        GroupId(self.groups.len() - 1)
    }

    /// Add a group holding the given controls
    pub fn add_group(&mut self, inputs: Vec<MemoryInput>) -> GroupId {
        let id = self.add_empty_group();
        self.groups[id.0].inputs = inputs;
        id
    }

    pub fn add_text(&mut self, name: &str, value: &str) -> GroupId {
        self.add_group(vec![input(name, InputKind::Text, value, false)])
    }

    pub fn add_select(&mut self, name: &str, value: &str) -> GroupId {
        self.add_group(vec![input(name, InputKind::Select, value, false)])
    }

    pub fn add_checkbox(&mut self, name: &str, checked: bool) -> GroupId {
        self.add_group(vec![input(name, InputKind::Checkbox, "on", checked)])
    }

    /// One group holding several same-named checkboxes
    pub fn add_checkboxes(&mut self, name: &str, checked: &[bool]) -> GroupId {
        let inputs = checked
            .iter()
            .map(|&c| input(name, InputKind::Checkbox, "on", c))
            .collect();
        self.add_group(inputs)
    }

    /// One group holding a radio per value
    pub fn add_radios(&mut self, name: &str, values: &[&str], selected: Option<usize>) -> GroupId {
        let inputs = values
            .iter()
            .enumerate()
            .map(|(i, v)| input(name, InputKind::Radio, v, selected == Some(i)))
            .collect();
        self.add_group(inputs)
    }

    pub fn set_help_text(&mut self, group: GroupId, text: &str) {
        let g = &mut self.groups[group.0];
        g.help_text = Some(text.to_string());
        g.help_visible = true;
    }

    /// Set the value of the group's first control
    pub fn set_value(&mut self, group: GroupId, value: &str) {
        if let Some(input) = self.groups[group.0].inputs.first_mut() {
            input.value = value.to_string();
        }
    }

    /// Set the checked state of the `index`th control in the group
    pub fn set_checked(&mut self, group: GroupId, index: usize, checked: bool) {
        if let Some(input) = self.groups[group.0].inputs.get_mut(index) {
            input.checked = checked;
        }
    }

    /// Enable or disable every control in the group
    pub fn set_disabled(&mut self, group: GroupId, disabled: bool) {
        for input in &mut self.groups[group.0].inputs {
            input.disabled = disabled;
        }
    }

    pub fn group(&self, group: GroupId) -> &MemoryGroup {
        &self.groups[group.0]
    }

    /// Summary alerts as `(id, message)` in display order
    pub fn summaries(&self) -> &[(String, String)] {
        &self.summaries
    }

    pub fn submit_intercepted(&self) -> bool {
        self.intercepted
    }

    pub fn submit_count(&self) -> usize {
        self.submits
    }

    pub fn events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    /// How many times help text visibility was changed
    pub fn help_toggles(&self) -> usize {
        self.help_toggles
    }
}

fn input(name: &str, kind: InputKind, value: &str, checked: bool) -> MemoryInput {
    MemoryInput {
        name: name.to_string(),
        kind,
        value: value.to_string(),
        checked,
        disabled: false,
    }
}

impl FormAdapter for MemoryForm {
    fn groups(&self) -> Vec<GroupId> {
        (0..self.groups.len()).map(GroupId).collect()
    }

    fn input(&self, group: GroupId) -> Option<InputSnapshot> {
        let input = self.groups.get(group.0)?.inputs.first()?;
        Some(InputSnapshot {
            name: input.name.clone(),
            kind: input.kind,
            disabled: input.disabled,
            value: input.value.clone(),
        })
    }

    fn any_checked(&self, name: &str) -> bool {
        self.groups
            .iter()
            .flat_map(|g| g.inputs.iter())
            .any(|input| input.name == name && input.checked)
    }

    fn clear_input(&mut self, group: GroupId) {
        for input in &mut self.groups[group.0].inputs {
            input.value.clear();
            input.checked = false;
        }
    }

    fn add_class(&mut self, group: GroupId, class: &str) {
        self.groups[group.0].classes.insert(class.to_string());
    }

    fn remove_class(&mut self, group: GroupId, class: &str) {
        self.groups[group.0].classes.remove(class);
    }

    fn has_help_text(&self, group: GroupId) -> bool {
        self.groups[group.0].help_text.is_some()
    }

    fn set_help_text_visible(&mut self, group: GroupId, visible: bool) {
        self.groups[group.0].help_visible = visible;
        self.help_toggles += 1;
    }

    fn append_prompt(&mut self, group: GroupId, prompt: &str) {
        self.groups[group.0].prompts.push(prompt.to_string());
    }

    fn remove_prompts(&mut self, group: GroupId) -> usize {
        let prompts = &mut self.groups[group.0].prompts;
        let removed = prompts.len();
        prompts.clear();
        removed
    }

    fn has_summary(&self, id: &str) -> bool {
        self.summaries.iter().any(|(sid, _)| sid == id)
    }

    fn prepend_summary(&mut self, id: &str, message: &str) {
        self.summaries.insert(0, (id.to_string(), message.to_string()));
    }

    fn remove_summary(&mut self, id: &str) {
        self.summaries.retain(|(sid, _)| sid != id);
    }

    fn intercept_submit(&mut self) {
        self.intercepted = true;
    }

    fn submit(&mut self) {
        self.submits += 1;
    }

    fn dispatch(&mut self, event: LifecycleEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_input_is_reported() {
        let mut form = MemoryForm::new();
        let group = form.add_radios("size", &["s", "m", "l"], Some(1));
        let snapshot = form.input(group).unwrap();
        assert_eq!(snapshot.name, "size");
        assert_eq!(snapshot.kind, InputKind::Radio);
        assert_eq!(snapshot.value, "s");
        assert!(form.any_checked("size"));
    }

    #[test]
    fn test_empty_group_has_no_input() {
        let mut form = MemoryForm::new();
        let group = form.add_empty_group();
        assert!(form.input(group).is_none());
    }

    #[test]
    fn test_clear_input() {
        let mut form = MemoryForm::new();
        let text = form.add_text("name", "Ada");
        let boxes = form.add_checkboxes("tags", &[true, false, true]);
        form.clear_input(text);
        form.clear_input(boxes);
        assert_eq!(form.group(text).inputs[0].value, "");
        assert!(!form.any_checked("tags"));
    }
}
