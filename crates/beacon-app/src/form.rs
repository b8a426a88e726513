// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::{ComponentKind, DotPath, DotPathSource, Field, FieldValue, FormSchema, FormValues};

/// Messages a control sends to its owning controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Seed { id: String, value: FieldValue },
    Changed { id: String, value: FieldValue },
}

impl FormMessage {
    pub fn id(&self) -> &str {
        match self {
            Self::Seed { id, .. } | Self::Changed { id, .. } => id,
        }
    }

    pub fn value(&self) -> &FieldValue {
        match self {
            Self::Seed { value, .. } | Self::Changed { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(char),
    Backspace,
    SetText(String),
    Clear,
    /// Moves the dotted-path source or the selected resource.
    Cycle(isize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextControl {
    pub id: String,
    pub label: String,
    pub text: String,
    pub multiline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberControl {
    pub id: String,
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotPathControl {
    pub id: String,
    pub label: String,
    pub value: DotPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceControl {
    pub id: String,
    pub label: String,
    pub selected: String,
    pub options: Vec<ResourceOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldControl {
    Text(TextControl),
    Number(NumberControl),
    DotPath(DotPathControl),
    Resource(ResourceControl),
}

impl FieldControl {
    /// Builds the control for `field` along with its one-time seed message.
    /// Unknown component kinds have no control.
    pub fn build(field: &Field, initial: Option<&FieldValue>) -> Option<(Self, FormMessage)> {
        let id = field.id.clone();
        let label = field.label().to_owned();
        let initial_text = initial.map(ToString::to_string).unwrap_or_default();

        let (control, seed) = match field.kind() {
            ComponentKind::Text | ComponentKind::TextArea => (
                Self::Text(TextControl {
                    id: id.clone(),
                    label,
                    text: initial_text,
                    multiline: field.kind() == ComponentKind::TextArea,
                }),
                initial.cloned().unwrap_or_else(|| FieldValue::text("")),
            ),
            ComponentKind::Number => (
                Self::Number(NumberControl {
                    id: id.clone(),
                    label,
                    text: initial_text,
                }),
                initial.cloned().unwrap_or(FieldValue::Unset),
            ),
            ComponentKind::DotPath => (
                Self::DotPath(DotPathControl {
                    id: id.clone(),
                    label,
                    value: DotPath::decode(&initial_text),
                }),
                initial.cloned().unwrap_or_else(|| FieldValue::text("")),
            ),
            ComponentKind::Resources => (
                Self::Resource(ResourceControl {
                    id: id.clone(),
                    label,
                    selected: initial_text,
                    options: Vec::new(),
                }),
                initial.cloned().unwrap_or_else(|| FieldValue::text("")),
            ),
            ComponentKind::Unknown => return None,
        };

        Some((control, FormMessage::Seed { id, value: seed }))
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Text(control) => &control.id,
            Self::Number(control) => &control.id,
            Self::DotPath(control) => &control.id,
            Self::Resource(control) => &control.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Text(control) => &control.label,
            Self::Number(control) => &control.label,
            Self::DotPath(control) => &control.label,
            Self::Resource(control) => &control.label,
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Text(control) => control.text.clone(),
            Self::Number(control) => control.text.clone(),
            Self::DotPath(control) => {
                let source = match control.value.source {
                    DotPathSource::Empty => "-",
                    source => source.as_str(),
                };
                format!("[{source}] {}", control.value.path)
            }
            Self::Resource(control) => control
                .options
                .iter()
                .find(|option| option.id == control.selected)
                .map_or_else(|| control.selected.clone(), |option| option.name.clone()),
        }
    }

    /// Applies a user edit. Returns the change to report upward, or `None`
    /// when the edit was dropped.
    pub fn edit(&mut self, edit: FieldEdit) -> Option<FormMessage> {
        match self {
            Self::Text(control) => {
                control.text = edit_text(&control.text, edit)?;
                Some(changed(&control.id, FieldValue::text(control.text.clone())))
            }
            Self::Number(control) => {
                let backspace = edit == FieldEdit::Backspace;
                let mut candidate = edit_text(&control.text, edit)?;
                // Backspace trims to the longest prefix that still parses.
                while backspace && parse_number(&candidate).is_none() {
                    candidate.pop();
                }
                let value = parse_number(&candidate)?;
                control.text = match value {
                    FieldValue::Integer(parsed) => parsed.to_string(),
                    _ => candidate,
                };
                Some(changed(&control.id, value))
            }
            Self::DotPath(control) => {
                match edit {
                    FieldEdit::Cycle(delta) => {
                        control.value.source = control.value.source.rotate(delta);
                    }
                    other => {
                        control.value.path = edit_text(&control.value.path, other)?;
                    }
                }
                Some(changed(&control.id, FieldValue::text(control.value.encode())))
            }
            Self::Resource(control) => {
                let FieldEdit::Cycle(delta) = edit else {
                    return None;
                };
                if control.options.is_empty() {
                    return None;
                }
                let len = control.options.len() as isize;
                let next = match control
                    .options
                    .iter()
                    .position(|option| option.id == control.selected)
                {
                    Some(current) => (current as isize + delta).rem_euclid(len),
                    None if delta < 0 => len - 1,
                    None => 0,
                };
                control.selected = control.options[next as usize].id.clone();
                Some(changed(&control.id, FieldValue::text(control.selected.clone())))
            }
        }
    }
}

fn changed(id: &str, value: FieldValue) -> FormMessage {
    FormMessage::Changed {
        id: id.to_owned(),
        value,
    }
}

/// Empty text and a lone `-` are in-progress states that report `Unset`.
fn parse_number(text: &str) -> Option<FieldValue> {
    match text {
        "" | "-" => Some(FieldValue::Unset),
        _ => text.parse().ok().map(FieldValue::Integer),
    }
}

fn edit_text(current: &str, edit: FieldEdit) -> Option<String> {
    let mut text = current.to_owned();
    match edit {
        FieldEdit::Insert(ch) => text.push(ch),
        FieldEdit::Backspace => {
            text.pop()?;
        }
        FieldEdit::SetText(value) => text = value,
        FieldEdit::Clear => text.clear(),
        FieldEdit::Cycle(_) => return None,
    }
    Some(text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutItem {
    Title(String),
    GroupHeading(String),
    GroupDescription(String),
    FieldHeading { text: String, emphasized: bool },
    FieldDescription(String),
    Control { index: usize },
}

/// Owns the value map for one mounted form. Controls never touch the map
/// directly; they hand `FormMessage`s to [`FormController::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormController {
    schema: FormSchema,
    controls: Vec<FieldControl>,
    values: FormValues,
}

impl FormController {
    pub fn new(schema: FormSchema, initial: &FormValues) -> Self {
        let mut controller = Self {
            schema,
            controls: Vec::new(),
            values: FormValues::new(),
        };

        let mut seeds = Vec::new();
        for field in controller.schema.groups.iter().flat_map(|group| &group.fields) {
            if let Some((control, seed)) = FieldControl::build(field, initial.get(&field.id)) {
                controller.controls.push(control);
                seeds.push(seed);
            }
        }
        for seed in seeds {
            controller.apply(seed);
        }
        controller
    }

    pub fn apply(&mut self, message: FormMessage) {
        match message {
            FormMessage::Seed { id, value } | FormMessage::Changed { id, value } => {
                self.values.insert(id, value);
            }
        }
    }

    pub fn edit(&mut self, index: usize, edit: FieldEdit) -> bool {
        let Some(message) = self
            .controls
            .get_mut(index)
            .and_then(|control| control.edit(edit))
        else {
            return false;
        };
        self.apply(message);
        true
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn controls(&self) -> &[FieldControl] {
        &self.controls
    }

    pub fn control(&self, index: usize) -> Option<&FieldControl> {
        self.controls.get(index)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn needs_resources(&self) -> bool {
        self.controls
            .iter()
            .any(|control| matches!(control, FieldControl::Resource(_)))
    }

    pub fn set_resource_options(&mut self, options: &[ResourceOption]) {
        for control in &mut self.controls {
            if let FieldControl::Resource(resource) = control {
                resource.options = options.to_vec();
            }
        }
    }

    /// Hands the accumulated values to `on_submit`, once, unchanged.
    pub fn submit<F, T>(&self, on_submit: F) -> T
    where
        F: FnOnce(&FormValues) -> T,
    {
        on_submit(&self.values)
    }

    pub fn layout(&self) -> Vec<LayoutItem> {
        let mut items = Vec::new();
        if let Some(title) = &self.schema.title {
            items.push(LayoutItem::Title(title.clone()));
        }

        let mut control_index = 0;
        for group in &self.schema.groups {
            if let Some(name) = group.name.as_ref().filter(|name| !name.is_empty()) {
                items.push(LayoutItem::GroupHeading(name.clone()));
            }
            if let Some(description) = group.description.as_ref().filter(|d| !d.is_empty()) {
                items.push(LayoutItem::GroupDescription(description.clone()));
            }
            for field in &group.fields {
                if field.kind() == ComponentKind::Unknown {
                    continue;
                }
                if let Some(name) = &field.name {
                    items.push(LayoutItem::FieldHeading {
                        text: name.clone(),
                        emphasized: control_index == 0,
                    });
                }
                if let Some(description) = &field.description {
                    items.push(LayoutItem::FieldDescription(description.clone()));
                }
                items.push(LayoutItem::Control {
                    index: control_index,
                });
                control_index += 1;
            }
        }
        items
    }
}
