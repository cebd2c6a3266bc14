//! Ordered multipart payload built fresh for every submission.

use std::collections::BTreeMap;

use shared::{
    domain::{FieldId, InputRef},
    protocol::ActionKind,
};
use uuid::Uuid;

use crate::registry::SelectedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(SelectedFile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopePart {
    pub name: &'static str,
    pub source: InputRef,
    pub value: PartValue,
}

#[derive(Debug)]
pub struct SubmissionEnvelope {
    id: Uuid,
    action: ActionKind,
    parts: Vec<EnvelopePart>,
}

impl SubmissionEnvelope {
    pub fn new(action: ActionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            parts: Vec::new(),
        }
    }

    pub fn push_text(&mut self, field: FieldId, value: impl Into<String>) {
        self.parts.push(EnvelopePart {
            name: field.wire_name(),
            source: InputRef::Field(field),
            value: PartValue::Text(value.into()),
        });
    }

    pub fn push_file(&mut self, name: &'static str, source: InputRef, file: SelectedFile) {
        self.parts.push(EnvelopePart {
            name,
            source,
            value: PartValue::File(file),
        });
    }

    /// Log correlation only; never sent.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn parts(&self) -> &[EnvelopePart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<EnvelopePart> {
        self.parts
    }

    pub fn part_names(&self) -> Vec<&'static str> {
        self.parts.iter().map(|part| part.name).collect()
    }

    /// Text values as entered, keyed by the field they came from.
    pub fn entered_values(&self) -> BTreeMap<FieldId, String> {
        self.parts
            .iter()
            .filter_map(|part| match (&part.source, &part.value) {
                (InputRef::Field(field), PartValue::Text(value)) => Some((*field, value.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn payload_bytes(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match &part.value {
                PartValue::Text(value) => value.len(),
                PartValue::File(file) => file.bytes.len(),
            })
            .sum()
    }
}
