//! Registration form state and live field feedback.

use crate::sanitize::{sanitize_digits, DigitField};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A registration form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TaxId,
    FullName,
    Email,
    PhoneNumber,
    Passphrase,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::TaxId,
        Field::FullName,
        Field::Email,
        Field::PhoneNumber,
        Field::Passphrase,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::TaxId => "tax_id",
            Field::FullName => "full_name",
            Field::Email => "email",
            Field::PhoneNumber => "phone_number",
            Field::Passphrase => "passphrase",
        }
    }

    /// The digit-only counterpart, if this field is sanitized per keystroke.
    pub fn digit_field(self) -> Option<DigitField> {
        match self {
            Field::TaxId => Some(DigitField::TaxId),
            Field::PhoneNumber => Some(DigitField::PhoneNumber),
            Field::Passphrase => Some(DigitField::Passphrase),
            Field::FullName | Field::Email => None,
        }
    }
}

impl From<DigitField> for Field {
    fn from(field: DigitField) -> Self {
        match field {
            DigitField::TaxId => Field::TaxId,
            DigitField::PhoneNumber => Field::PhoneNumber,
            DigitField::Passphrase => Field::Passphrase,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field: {}", s))
    }
}

/// The values entered for one registration attempt.
///
/// Digit-only fields are expected to be written through [`FormState::edit`],
/// which keeps them free of non-digit characters.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub tax_id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub passphrase: SecretString,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            tax_id: String::new(),
            full_name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            passphrase: SecretString::new(String::new()),
        }
    }
}

impl RegistrationForm {
    /// Current content of a field.
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::TaxId => &self.tax_id,
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::PhoneNumber => &self.phone_number,
            Field::Passphrase => self.passphrase.expose_secret(),
        }
    }

    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::TaxId => self.tax_id = value,
            Field::FullName => self.full_name = value,
            Field::Email => self.email = value,
            Field::PhoneNumber => self.phone_number = value,
            Field::Passphrase => self.passphrase = SecretString::new(value),
        }
    }
}

/// Current live error per digit-only field. An empty string means no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrorSet {
    pub tax_id: String,
    pub phone_number: String,
    pub passphrase: String,
}

impl FieldErrorSet {
    pub fn get(&self, field: DigitField) -> &str {
        match field {
            DigitField::TaxId => &self.tax_id,
            DigitField::PhoneNumber => &self.phone_number,
            DigitField::Passphrase => &self.passphrase,
        }
    }

    /// Replace the error of a field, returning whether it changed.
    pub fn set(&mut self, field: DigitField, error: String) -> bool {
        let slot = match field {
            DigitField::TaxId => &mut self.tax_id,
            DigitField::PhoneNumber => &mut self.phone_number,
            DigitField::Passphrase => &mut self.passphrase,
        };
        if *slot == error {
            return false;
        }
        *slot = error;
        true
    }

    pub fn has_errors(&self) -> bool {
        DigitField::ALL.iter().any(|f| !self.get(*f).is_empty())
    }
}

/// Change notification emitted by [`FormState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// A field's stored content changed.
    ValueChanged(Field),
    /// A digit-only field's live error was set or cleared.
    ErrorChanged { field: DigitField, error: String },
}

impl FormEvent {
    pub fn field(&self) -> Field {
        match self {
            FormEvent::ValueChanged(field) => *field,
            FormEvent::ErrorChanged { field, .. } => Field::from(*field),
        }
    }
}

/// Result of applying a single raw edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub field: Field,
    pub changed: bool,
    /// Live error for digit-only fields, empty otherwise.
    pub error: String,
}

type Listener = Box<dyn Fn(&FormEvent) + Send + Sync>;

/// Form holder with per-field and whole-form subscriptions.
#[derive(Default)]
pub struct FormState {
    form: RegistrationForm,
    errors: FieldErrorSet,
    form_listeners: Vec<Listener>,
    field_listeners: Vec<(Field, Listener)>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrorSet {
        &self.errors
    }

    /// Receive every event of the form.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&FormEvent) + Send + Sync + 'static,
    {
        self.form_listeners.push(Box::new(listener));
    }

    /// Receive only events concerning `field`.
    pub fn subscribe_field<F>(&mut self, field: Field, listener: F)
    where
        F: Fn(&FormEvent) + Send + Sync + 'static,
    {
        self.field_listeners.push((field, Box::new(listener)));
    }

    /// Apply one raw edit. Digit-only fields are sanitized first.
    pub fn edit(&mut self, field: Field, raw: &str) -> FieldEdit {
        let Some(digit_field) = field.digit_field() else {
            let changed = self.form.value(field) != raw;
            if changed {
                self.form.set(field, raw.to_string());
                self.emit(FormEvent::ValueChanged(field));
            }
            return FieldEdit {
                field,
                changed,
                error: String::new(),
            };
        };

        let sanitized = sanitize_digits(raw, self.form.value(field), digit_field);
        if !sanitized.error.is_empty() {
            debug!(field = %field, "Rejected non-digit input");
        }

        if sanitized.changed {
            self.form.set(field, sanitized.value);
            self.emit(FormEvent::ValueChanged(field));
        }

        if self.errors.set(digit_field, sanitized.error.clone()) {
            self.emit(FormEvent::ErrorChanged {
                field: digit_field,
                error: sanitized.error.clone(),
            });
        }

        FieldEdit {
            field,
            changed: sanitized.changed,
            error: sanitized.error,
        }
    }

    fn emit(&self, event: FormEvent) {
        for listener in &self.form_listeners {
            listener(&event);
        }
        let field = event.field();
        for (_, listener) in self.field_listeners.iter().filter(|(f, _)| *f == field) {
            listener(&event);
        }
    }
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("form", &self.form)
            .field("errors", &self.errors)
            .field("listeners", &(self.form_listeners.len() + self.field_listeners.len()))
            .finish()
    }
}
