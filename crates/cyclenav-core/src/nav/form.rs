//! Form state for panels and the wizard progress gate.

use std::collections::BTreeMap;

use crate::nav::panel::FieldSpec;

/// The kind of control a field is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Input,
    Select,
    TextArea,
    /// A row of mutually exclusive choices; the value is the active choice.
    SegmentedControl,
}

/// A single form control and its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    value: String,
}

impl Field {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the field holds something other than whitespace.
    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// The ordered set of fields inside one panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormScope {
    fields: Vec<Field>,
}

impl FormScope {
    /// Builds an empty form from field declarations.
    pub fn from_specs(specs: &[FieldSpec]) -> Self {
        let fields = specs
            .iter()
            .map(|spec| Field {
                name: spec.name.to_string(),
                kind: spec.kind,
                required: spec.required,
                value: String::new(),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Current value of `name`, or `""` when the field is unknown.
    pub fn value(&self, name: &str) -> &str {
        self.field(name).map_or("", Field::value)
    }

    /// Sets the value of `name`. Returns `false` if no such field exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Empties every field.
    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
    }

    /// Non-empty values keyed by field name.
    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter(|f| f.is_filled())
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Returns `true` iff every required field in `scope` has a non-empty value.
///
/// A scope without required fields can always progress.
pub fn can_progress(scope: &FormScope) -> bool {
    scope
        .fields
        .iter()
        .filter(|f| f.required)
        .all(Field::is_filled)
}
