use std::time::{Duration, Instant};

use store::model::contact::ContactDraft;
use store::model::validate::{self, Field, FieldError, FieldErrors};

const SUCCESS_BANNER_DURATION: Duration = Duration::from_secs(3);

pub const SUCCESS_BANNER: &str = "Contact added successfully! ✓";

/// State behind the add-contact surface: current field values, the failures
/// from the last refused submit, and a short-lived success banner.
#[derive(Default)]
pub struct ContactForm {
    name: String,
    email: String,
    phone: String,
    message: String,
    errors: FieldErrors,
    submit_error: Option<String>,
    in_flight: bool,
    success_shown_at: Option<Instant>,
}

impl ContactForm {
    pub fn new() -> ContactForm {
        ContactForm::default()
    }

    /// Editing a field clears that field's standing error, the way an input
    /// stops flagging once the user starts correcting it.
    pub fn set_name(&mut self, value: String) {
        self.name = value;
        self.clear_field_error(Field::Name);
    }

    pub fn set_email(&mut self, value: String) {
        self.email = value;
        self.clear_field_error(Field::Email);
    }

    pub fn set_phone(&mut self, value: String) {
        self.phone = value;
        self.clear_field_error(Field::Phone);
    }

    pub fn set_message(&mut self, value: String) {
        self.message = value;
    }

    fn clear_field_error(&mut self, field: Field) {
        self.errors.0.retain(|error| error.field != field);
    }

    pub fn draft(&self) -> ContactDraft {
        ContactDraft::new(
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.message.clone(),
        )
    }

    /// Recomputed from the current values on every call, never cached.
    #[allow(dead_code)]
    pub fn is_submittable(&self) -> bool {
        !self.in_flight && validate::validate(&self.name, &self.email, &self.phone).is_ok()
    }

    /// Starts a submission: reruns every rule and hands back the draft to
    /// send. Refuses while a submission is already in flight, or when the
    /// rules fail, leaving the failures behind for rendering.
    pub fn begin_submit(&mut self) -> Option<ContactDraft> {
        if self.in_flight {
            return None;
        }

        self.success_shown_at = None;
        self.submit_error = None;

        match validate::validate_draft(&self.draft()) {
            Err(errors) => {
                self.errors = errors;

                None
            }
            Ok(()) => {
                self.errors = FieldErrors::default();
                self.in_flight = true;

                Some(self.draft())
            }
        }
    }

    /// Lands the API outcome of the submission started by
    /// [`ContactForm::begin_submit`]. Success clears the fields and raises
    /// the banner; failure keeps the fields so the user can retry.
    pub fn complete_submit<T>(&mut self, result: Result<T, String>) {
        self.in_flight = false;

        match result {
            Ok(_) => {
                self.name.clear();
                self.email.clear();
                self.phone.clear();
                self.message.clear();
                self.success_shown_at = Some(Instant::now());
            }
            Err(message) => {
                self.submit_error = Some(message);
            }
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[allow(dead_code)]
    pub fn field_error(&self, field: Field) -> Option<&FieldError> {
        self.errors.for_field(field)
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    #[allow(dead_code)]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The banner auto-expires three seconds after a successful submit.
    pub fn success_banner(&self, now: Instant) -> Option<&'static str> {
        let shown_at = self.success_shown_at?;

        if now.saturating_duration_since(shown_at) < SUCCESS_BANNER_DURATION {
            Some(SUCCESS_BANNER)
        } else {
            None
        }
    }

    #[allow(dead_code)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[allow(dead_code)]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[allow(dead_code)]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[allow(dead_code)]
    pub fn message(&self) -> &str {
        &self.message
    }
}
