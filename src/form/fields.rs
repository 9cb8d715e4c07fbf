//! The photo form: text inputs plus the hidden image field.

use super::FormError;

/// Name of the hidden field that carries the captured image.
pub const IMAGE_FIELD: &str = "image-data";

#[derive(Debug, Clone)]
struct Input {
    name: String,
    value: String,
    required: bool,
    invalid: bool,
}

/// What a successful submit hands to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Text inputs in declaration order.
    pub fields: Vec<(String, String)>,
    /// The captured image as a data URL.
    pub image_data: String,
}

/// Form state around a photo capture.
#[derive(Debug, Clone, Default)]
pub struct PhotoForm {
    inputs: Vec<Input>,
    image_data: Option<String>,
    loading: bool,
}

impl PhotoForm {
    /// Creates a form with no inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text input.
    pub fn with_input(mut self, name: &str, required: bool) -> Self {
        self.inputs.push(Input {
            name: name.to_string(),
            value: String::new(),
            required,
            invalid: false,
        });
        self
    }

    /// Sets an input's value. Typing clears its error mark.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let input = self
            .inputs
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        input.value = value.to_string();
        input.invalid = false;
        Ok(())
    }

    /// Current value of an input.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.value.as_str())
    }

    /// Whether an input is marked as failing validation.
    pub fn is_invalid(&self, name: &str) -> bool {
        self.inputs.iter().any(|i| i.name == name && i.invalid)
    }

    /// Stores the captured image in the hidden field.
    pub fn set_image_data(&mut self, data_url: String) {
        self.image_data = Some(data_url);
    }

    /// Empties the hidden field.
    pub fn clear_image_data(&mut self) {
        self.image_data = None;
    }

    /// The hidden field's value.
    pub fn image_data(&self) -> Option<&str> {
        self.image_data.as_deref()
    }

    /// Marks every empty required input and reports them.
    pub fn validate(&mut self) -> Result<(), FormError> {
        let mut missing = Vec::new();
        for input in &mut self.inputs {
            input.invalid = input.required && input.value.trim().is_empty();
            if input.invalid {
                missing.push(input.name.clone());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormError::MissingFields(missing))
        }
    }

    /// Validates and, if everything is filled in, shows the loading state
    /// and returns what should be sent.
    pub fn submit(&mut self) -> Result<Submission, FormError> {
        self.validate()?;
        let image_data = self.image_data.clone().ok_or(FormError::MissingImage)?;

        self.loading = true;
        tracing::debug!(fields = self.inputs.len(), "Submitting photo form");

        Ok(Submission {
            fields: self
                .inputs
                .iter()
                .map(|i| (i.name.clone(), i.value.clone()))
                .collect(),
            image_data,
        })
    }

    /// Whether the loading indicator is shown.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Hides the loading indicator after the server answered.
    pub fn finish_loading(&mut self) {
        self.loading = false;
    }
}
