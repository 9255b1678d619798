// File: src/dom.rs
// Purpose: FormAdapter over a live <form> (Bootstrap-style .form-group markup)

use std::cell::RefCell;

use formguard_core::{FormAdapter, GroupId, InputKind, InputSnapshot, LifecycleEvent};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlSelectElement, NodeList,
};

const GROUP_SELECTOR: &str = ".form-group";
const INPUT_SELECTOR: &str = "input, select";
const HELP_SELECTOR: &str = "div.help-block:not([data-validation])";
const PROMPT_SELECTOR: &str = "div.help-block[data-validation]";

/// A form in the page
///
/// Group elements are snapshotted whenever `groups()` runs (at the start of
/// every validate, reset and rewire), and `GroupId`s index that snapshot.
/// Markup added after the session started is picked up by the next cycle.
pub struct DomForm {
    form: HtmlFormElement,
    document: Document,
    groups: RefCell<Vec<Element>>,
}

impl DomForm {
    pub fn new(form: HtmlFormElement) -> Result<Self, JsValue> {
        let document = form
            .owner_document()
            .ok_or_else(|| JsValue::from_str("form is not attached to a document"))?;
        let dom = Self {
            form,
            document,
            groups: RefCell::new(Vec::new()),
        };
        dom.refresh_groups();
        Ok(dom)
    }

    pub fn form(&self) -> &HtmlFormElement {
        &self.form
    }

    /// The first input or select of a group
    pub fn input_element(&self, group: GroupId) -> Option<Element> {
        self.group(group)?.query_selector(INPUT_SELECTOR).ok().flatten()
    }

    /// Every input and select of a group (all boxes of a checkbox group)
    pub fn input_elements(&self, group: GroupId) -> Vec<Element> {
        self.group(group)
            .and_then(|el| el.query_selector_all(INPUT_SELECTOR).ok())
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn refresh_groups(&self) -> usize {
        let found = match self.form.query_selector_all(GROUP_SELECTOR) {
            Ok(list) => elements(&list),
            Err(err) => {
                warn("querying field groups failed", &err);
                Vec::new()
            }
        };
        let count = found.len();
        *self.groups.borrow_mut() = found;
        count
    }

    fn group(&self, group: GroupId) -> Option<Element> {
        self.groups.borrow().get(group.0).cloned()
    }

    fn help_blocks(&self, group: &Element) -> Vec<HtmlElement> {
        group
            .query_selector_all(HELP_SELECTOR)
            .map(|list| {
                elements(&list)
                    .into_iter()
                    .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn build_prompt(&self, prompt: &str) -> Result<Element, JsValue> {
        let block = self.document.create_element("div")?;
        block.set_class_name("help-block");
        block.set_attribute("data-validation", "")?;
        block.set_text_content(Some(prompt));
        Ok(block)
    }

    fn build_summary(&self, id: &str, message: &str) -> Result<Element, JsValue> {
        let alert = self.document.create_element("div")?;
        alert.set_class_name("alert alert-danger");
        alert.set_id(id);
        let text = self.document.create_element("p")?;
        text.set_text_content(Some(message));
        alert.append_child(&text)?;
        Ok(alert)
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn warn(what: &str, err: &JsValue) {
    web_sys::console::warn_2(&JsValue::from_str(what), err);
}

fn check(result: Result<(), JsValue>, what: &str) {
    if let Err(err) = result {
        warn(what, &err);
    }
}

impl FormAdapter for DomForm {
    fn groups(&self) -> Vec<GroupId> {
        (0..self.refresh_groups()).map(GroupId).collect()
    }

    fn input(&self, group: GroupId) -> Option<InputSnapshot> {
        let el = self.input_element(group)?;
        let name = el.get_attribute("name").unwrap_or_default();
        let disabled = el.has_attribute("disabled");

        let (kind, value) = if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
            (InputKind::Select, select.value())
        } else if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            (InputKind::from_type_attr(&input.type_()), input.value())
        } else {
            (InputKind::Text, String::new())
        };

        Some(InputSnapshot {
            name,
            kind,
            disabled,
            value,
        })
    }

    fn any_checked(&self, name: &str) -> bool {
        let list = self.document.get_elements_by_name(name);
        elements(&list)
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlInputElement>().ok())
            .any(|input| input.checked())
    }

    fn clear_input(&mut self, group: GroupId) {
        for el in self.input_elements(group) {
            if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                input.set_value("");
                input.set_checked(false);
            } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
                select.set_value("");
            }
        }
    }

    fn add_class(&mut self, group: GroupId, class: &str) {
        if let Some(el) = self.group(group) {
            check(el.class_list().add_1(class), "adding class failed");
        }
    }

    fn remove_class(&mut self, group: GroupId, class: &str) {
        if let Some(el) = self.group(group) {
            check(el.class_list().remove_1(class), "removing class failed");
        }
    }

    fn has_help_text(&self, group: GroupId) -> bool {
        self.group(group)
            .map(|el| !self.help_blocks(&el).is_empty())
            .unwrap_or(false)
    }

    fn set_help_text_visible(&mut self, group: GroupId, visible: bool) {
        let Some(el) = self.group(group) else {
            return;
        };
        for block in self.help_blocks(&el) {
            let style = block.style();
            let result = if visible {
                style.remove_property("display").map(|_| ())
            } else {
                style.set_property("display", "none")
            };
            check(result, "toggling help text failed");
        }
    }

    fn append_prompt(&mut self, group: GroupId, prompt: &str) {
        let Some(el) = self.group(group) else {
            return;
        };
        let result = self
            .build_prompt(prompt)
            .and_then(|block| el.append_child(&block).map(|_| ()));
        check(result, "appending prompt failed");
    }

    fn remove_prompts(&mut self, group: GroupId) -> usize {
        let Some(el) = self.group(group) else {
            return 0;
        };
        let prompts = el
            .query_selector_all(PROMPT_SELECTOR)
            .map(|list| elements(&list))
            .unwrap_or_default();
        for prompt in &prompts {
            prompt.remove();
        }
        prompts.len()
    }

    fn has_summary(&self, id: &str) -> bool {
        self.form
            .query_selector(&format!("#{}", id))
            .ok()
            .flatten()
            .is_some()
    }

    fn prepend_summary(&mut self, id: &str, message: &str) {
        let result = self
            .build_summary(id, message)
            .and_then(|alert| self.form.prepend_with_node_1(&alert));
        check(result, "showing error message failed");
    }

    fn remove_summary(&mut self, id: &str) {
        if let Some(alert) = self.document.get_element_by_id(id) {
            alert.remove();
        }
    }

    fn intercept_submit(&mut self) {
        // The submit listener installed by `attach` calls preventDefault
    }

    fn submit(&mut self) {
        check(self.form.submit(), "submitting form failed");
    }

    fn dispatch(&mut self, event: LifecycleEvent) {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        let result = CustomEvent::new_with_event_init_dict(event.event_name(), &init)
            .and_then(|ev| self.form.dispatch_event(&ev).map(|_| ()));
        check(result, "dispatching lifecycle event failed");
    }
}
