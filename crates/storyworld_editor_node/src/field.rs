// SPDX-License-Identifier: MIT OR Apache-2.0
//! Leaf sub-controls composed by a node: text fields, buttons and the
//! kind selectors.

use crate::events::Listeners;
use crate::object::ObjectKind;

/// Single-line text input
#[derive(Debug)]
pub struct TextField {
    /// Locator inside the node fragment
    pub locator: &'static str,
    value: String,
    on_input: Listeners<str>,
}

impl TextField {
    /// Create an empty field
    pub fn new(locator: &'static str) -> Self {
        Self {
            locator,
            value: String::new(),
            on_input: Listeners::new(),
        }
    }

    /// Current text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the text without notifying input listeners
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Subscribe to user edits
    pub fn on_input(&mut self, callback: impl FnMut(&str) + 'static) -> &mut Self {
        self.on_input.add(callback);
        self
    }

    /// A user edit: store the text and notify input listeners
    pub fn input(&mut self, text: impl Into<String>) {
        self.value = text.into();
        self.on_input.notify(&self.value);
    }
}

/// Clickable affordance with no state of its own
#[derive(Debug)]
pub struct Button {
    /// Locator inside the node fragment
    pub locator: &'static str,
    on_activate: Listeners<()>,
}

impl Button {
    /// Create a button
    pub fn new(locator: &'static str) -> Self {
        Self {
            locator,
            on_activate: Listeners::new(),
        }
    }

    /// Subscribe to activation
    pub fn on_activate(&mut self, callback: impl FnMut(&()) + 'static) -> &mut Self {
        self.on_activate.add(callback);
        self
    }

    /// Activate the button
    pub fn activate(&mut self) {
        self.on_activate.notify(&());
    }
}

/// Highlightable selector for one object kind
#[derive(Debug)]
pub struct KindSelector {
    /// The kind this selector stands for
    pub kind: ObjectKind,
    selected: bool,
    on_activate: Listeners<ObjectKind>,
}

impl KindSelector {
    /// Create an unselected selector
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            selected: false,
            on_activate: Listeners::new(),
        }
    }

    /// Whether this selector is highlighted
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Set the highlight
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Subscribe to activation
    pub fn on_activate(&mut self, callback: impl FnMut(&ObjectKind) + 'static) -> &mut Self {
        self.on_activate.add(callback);
        self
    }

    /// Activate the selector. Highlighting is left to the owning
    /// [`KindSelection`].
    pub fn activate(&mut self) {
        self.on_activate.notify(&self.kind);
    }
}

/// The three kind selectors driven from a single selected kind.
///
/// Highlights are never set one by one; [`KindSelection::select`] recomputes
/// all three so exactly one is highlighted.
#[derive(Debug)]
pub struct KindSelection {
    current: ObjectKind,
    selectors: [KindSelector; 3],
}

impl KindSelection {
    /// Create a selection with `initial` highlighted
    pub fn new(initial: ObjectKind) -> Self {
        let mut selection = Self {
            current: initial,
            selectors: [
                KindSelector::new(ObjectKind::Actor),
                KindSelector::new(ObjectKind::Item),
                KindSelector::new(ObjectKind::Scenery),
            ],
        };
        selection.select(initial);
        selection
    }

    /// Select a kind and recompute every highlight
    pub fn select(&mut self, kind: ObjectKind) {
        self.current = kind;
        for selector in &mut self.selectors {
            selector.set_selected(selector.kind == kind);
        }
    }

    /// The highlighted kind
    pub fn current(&self) -> ObjectKind {
        self.current
    }

    /// Selector for a kind
    pub fn selector(&self, kind: ObjectKind) -> &KindSelector {
        &self.selectors[Self::index(kind)]
    }

    /// Mutable selector for a kind
    pub fn selector_mut(&mut self, kind: ObjectKind) -> &mut KindSelector {
        &mut self.selectors[Self::index(kind)]
    }

    /// All selectors in display order
    pub fn selectors(&self) -> impl Iterator<Item = &KindSelector> {
        self.selectors.iter()
    }

    /// Number of highlighted selectors
    pub fn highlighted_count(&self) -> usize {
        self.selectors.iter().filter(|s| s.selected()).count()
    }

    fn index(kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::Actor => 0,
            ObjectKind::Item => 1,
            ObjectKind::Scenery => 2,
        }
    }
}

impl Default for KindSelection {
    fn default() -> Self {
        Self::new(ObjectKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_set_value_is_silent_but_input_notifies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();

        let mut field = TextField::new("name");
        field.on_input(move |text| log.borrow_mut().push(text.to_string()));

        field.set_value("Torch");
        field.input("Lit Torch");
        field.input("");

        assert_eq!(field.value(), "");
        assert_eq!(*seen.borrow(), vec!["Lit Torch".to_string(), String::new()]);
    }

    #[test]
    fn test_selection_is_exclusive_for_every_transition() {
        for &from in ObjectKind::all() {
            for &to in ObjectKind::all() {
                let mut selection = KindSelection::new(from);
                selection.select(to);
                assert_eq!(selection.current(), to);
                assert_eq!(selection.highlighted_count(), 1);
                assert!(selection.selector(to).selected());
            }
        }
    }
}
