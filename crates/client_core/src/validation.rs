//! Completeness checks that gate every submission.

use shared::domain::{FieldId, FileArity, InputRef};

use crate::{
    actions::{ActionDescriptor, Requirement},
    envelope::SubmissionEnvelope,
    error::UploadError,
    reducer::ModeFlags,
    registry::{ElementRegistry, SelectedFile},
};

#[derive(Debug)]
pub struct Validation {
    /// Every input that was inspected, in requirement order.
    pub checked: Vec<InputRef>,
    pub missing: Vec<InputRef>,
    envelope: SubmissionEnvelope,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn into_envelope(self) -> Result<SubmissionEnvelope, UploadError> {
        if self.missing.is_empty() {
            Ok(self.envelope)
        } else {
            Err(UploadError::Validation {
                missing: self.missing,
            })
        }
    }
}

/// Checks the inputs `descriptor` requires under `modes` and packages the
/// ones that pass, in wire order.
pub fn validate<R: ElementRegistry + ?Sized>(
    descriptor: &ActionDescriptor,
    modes: ModeFlags,
    registry: &R,
) -> Validation {
    let mut validation = Validation {
        checked: Vec::new(),
        missing: Vec::new(),
        envelope: SubmissionEnvelope::new(descriptor.kind),
    };

    for requirement in descriptor.requirements(modes) {
        let input = requirement.input();
        validation.checked.push(input);
        match requirement {
            Requirement::Text(field) => match accepted_text(field, &registry.text(field)) {
                Some(value) => validation.envelope.push_text(field, value),
                None => validation.missing.push(input),
            },
            Requirement::File {
                input: file_input,
                parts,
            } => {
                let files = registry.files(file_input);
                if !files_complete(file_input.arity(), files) || files.len() != parts.len() {
                    validation.missing.push(input);
                    continue;
                }
                for (name, file) in parts.iter().zip(files) {
                    validation.envelope.push_file(*name, input, file.clone());
                }
            }
        }
    }

    validation
}

fn accepted_text(field: FieldId, raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if field == FieldId::ImagesCount {
        return match value.parse::<u32>() {
            Ok(count) if count > 0 => Some(value.to_string()),
            _ => None,
        };
    }
    Some(value.to_string())
}

fn files_complete(arity: FileArity, files: &[SelectedFile]) -> bool {
    match arity {
        FileArity::Single => files.len() == 1,
        FileArity::Pair => files.len() == 2 && files[0].name != files[1].name,
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
