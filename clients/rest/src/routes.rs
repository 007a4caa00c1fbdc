use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use store::{
    consts::consts::ContactId,
    model::{
        contact::ContactDraft,
        validate::{Field, FieldErrors, Reason},
    },
    store::handle::{StoreError, StoreHandle},
};

/// Response envelope every endpoint shares. Fields an endpoint does not use
/// stay out of the payload entirely.
#[derive(Serialize, Deserialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn failure(message: &str) -> Envelope<()> {
    Envelope {
        success: false,
        message: Some(message.to_string()),
        count: None,
        data: None,
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(failure("Contact not found"))
}

/// The caller's fault goes in the response, the store's fault goes in the log
fn internal_error(error: StoreError, message: &str) -> HttpResponse {
    log::error!("Store failure: {}", error);

    HttpResponse::InternalServerError().json(failure(message))
}

/// Mirrors the priority a user sees filling in the form top to bottom,
/// missing fields win over format problems.
fn validation_message(errors: &FieldErrors) -> String {
    if errors.contains(Reason::Required) {
        return "Please provide name, email, and phone".to_string();
    }

    if let Some(name_error) = errors.for_field(Field::Name) {
        return name_error.to_string();
    }

    if errors.for_field(Field::Email).is_some() {
        return "Please provide a valid email".to_string();
    }

    "Please provide a valid phone number (10 digits)".to_string()
}

/// Fields arrive as options so a missing field and an empty field fall into
/// the same required rule.
#[derive(Deserialize, Debug)]
pub struct CreateContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

impl CreateContactRequest {
    fn into_draft(self) -> ContactDraft {
        ContactDraft::new(
            self.name.unwrap_or_default(),
            self.email.unwrap_or_default(),
            self.phone.unwrap_or_default(),
            self.message.unwrap_or_default(),
        )
    }
}

#[post("/api/contacts")]
async fn create_contact(
    handle: web::Data<StoreHandle>,
    request: web::Json<CreateContactRequest>,
) -> HttpResponse {
    match handle.insert(request.into_inner().into_draft()) {
        Ok(contact) => HttpResponse::Created().json(Envelope {
            success: true,
            message: Some("Contact created successfully".to_string()),
            count: None,
            data: Some(contact),
        }),
        Err(StoreError::ValidationFailed(errors)) => {
            HttpResponse::BadRequest().json(failure(&validation_message(&errors)))
        }
        Err(error) => internal_error(error, "Failed to add contact"),
    }
}

#[get("/api/contacts")]
async fn list_contacts(handle: web::Data<StoreHandle>) -> HttpResponse {
    match handle.list() {
        Ok(contacts) => HttpResponse::Ok().json(Envelope {
            success: true,
            message: None,
            count: Some(contacts.len()),
            data: Some(contacts),
        }),
        Err(error) => internal_error(error, "Failed to fetch contacts"),
    }
}

#[get("/api/contacts/{id}")]
async fn get_contact(handle: web::Data<StoreHandle>, path: web::Path<String>) -> HttpResponse {
    match handle.get(ContactId(path.into_inner())) {
        Ok(contact) => HttpResponse::Ok().json(Envelope {
            success: true,
            message: None,
            count: None,
            data: Some(contact),
        }),
        Err(StoreError::NotFound(_)) => not_found(),
        Err(error) => internal_error(error, "Failed to fetch contact"),
    }
}

#[delete("/api/contacts/{id}")]
async fn delete_contact(handle: web::Data<StoreHandle>, path: web::Path<String>) -> HttpResponse {
    match handle.delete(ContactId(path.into_inner())) {
        Ok(contact) => HttpResponse::Ok().json(Envelope {
            success: true,
            message: Some("Contact deleted successfully".to_string()),
            count: None,
            data: Some(contact),
        }),
        Err(StoreError::NotFound(_)) => not_found(),
        Err(error) => internal_error(error, "Failed to delete contact"),
    }
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(Envelope::<()> {
        success: true,
        message: Some("contactdb is running".to_string()),
        count: None,
        data: None,
    })
}

pub fn configure(config: &mut web::ServiceConfig) {
    config
        .service(create_contact)
        .service(list_contacts)
        .service(get_contact)
        .service(delete_contact)
        .service(health);
}
