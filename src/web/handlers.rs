//! Route handlers.
//!
//! Each handler maps one route to a page render or a redirect. Form
//! submissions are validated by [`ContactService`](crate::ContactService);
//! a rejected form is re-rendered with the values exactly as submitted.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};

use crate::models::{Contact, ContactId, NewContact};
use crate::rendering::Page;
use crate::services::{SubmitOutcome, ValidationErrors};

use super::AppState;
use super::error::AppError;
use super::flash::{Session, redirect_with_flash};

/// Flash shown after a contact is added.
pub const FLASH_ADDED: &str = "Contact added.";
/// Flash shown after a contact is edited.
pub const FLASH_EDITED: &str = "Contact edited.";
/// Flash shown after a delete, whether or not a contact matched.
pub const FLASH_DELETED: &str = "Contact deleted.";

const CONTACTS_PATH: &str = "/contact";
const STYLESHEET: &str = include_str!("../../public/style.css");

/// A person on the landing page's sample listing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SamplePerson {
    name: &'static str,
    email: &'static str,
}

/// Sample listing shown on the landing page. Not read from the store.
pub const SAMPLE_PEOPLE: [SamplePerson; 3] = [
    SamplePerson {
        name: "Agung",
        email: "agung@gmail.com",
    },
    SamplePerson {
        name: "peter",
        email: "peter@gmail.com",
    },
    SamplePerson {
        name: "deeez",
        email: "deeez@gmail.com",
    },
];

/// Add form fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddContactForm {
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Mobile phone.
    pub phone: String,
}

impl From<&AddContactForm> for NewContact {
    fn from(form: &AddContactForm) -> Self {
        Self::new(&form.name, &form.email, &form.phone)
    }
}

/// Edit form fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditContactForm {
    /// Identity of the contact being edited.
    #[serde(alias = "_id")]
    pub id: String,
    /// Name the contact had when the form was rendered.
    #[serde(alias = "oldName")]
    pub old_name: String,
    /// New name.
    pub name: String,
    /// New email.
    pub email: String,
    /// New mobile phone.
    pub phone: String,
}

impl From<&Contact> for EditContactForm {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id.to_string(),
            old_name: contact.name.clone(),
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
        }
    }
}

impl From<&EditContactForm> for NewContact {
    fn from(form: &EditContactForm) -> Self {
        Self::new(&form.name, &form.email, &form.phone)
    }
}

/// Delete form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteContactForm {
    /// Name of the contact to delete.
    pub name: String,
}

#[derive(Serialize)]
struct TitleOnly {
    title: &'static str,
}

#[derive(Serialize)]
struct HomePayload {
    title: &'static str,
    people: &'static [SamplePerson],
}

#[derive(Serialize)]
struct ListPayload {
    title: &'static str,
    contacts: Vec<Contact>,
    msg: Option<String>,
}

#[derive(Serialize)]
struct FormPayload<'a, T> {
    title: &'static str,
    contact: &'a T,
    errors: &'a ValidationErrors,
}

#[derive(Serialize)]
struct DetailPayload {
    title: &'static str,
    contact: Contact,
}

fn render<S: Serialize>(state: &AppState, page: Page, data: &S) -> Result<Html<String>, AppError> {
    Ok(Html(state.renderer.render(page, data)?))
}

/// `GET /`
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(
        &state,
        Page::Index,
        &HomePayload {
            title: "Home",
            people: &SAMPLE_PEOPLE,
        },
    )
}

/// `GET /about`
pub async fn about(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, Page::About, &TitleOnly { title: "About" })
}

/// `GET /contact`
///
/// Consumes the session's pending flash message.
pub async fn list_contacts(
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let contacts = state.contacts.list().await?;
    let msg = state.flash.take(&session);
    render(
        &state,
        Page::ContactList,
        &ListPayload {
            title: "Contact",
            contacts,
            msg,
        },
    )
}

/// `GET /contact/add`
pub async fn add_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render_add_form(&state, &AddContactForm::default(), &ValidationErrors::new())
}

fn render_add_form(
    state: &AppState,
    form: &AddContactForm,
    errors: &ValidationErrors,
) -> Result<Html<String>, AppError> {
    render(
        state,
        Page::AddContact,
        &FormPayload {
            title: "Add Contact",
            contact: form,
            errors,
        },
    )
}

/// `POST /contact`
pub async fn create_contact(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddContactForm>,
) -> Result<Response, AppError> {
    match state.contacts.create(NewContact::from(&form)).await? {
        SubmitOutcome::Saved(_) => Ok(redirect_with_flash(
            &state.flash,
            &session,
            CONTACTS_PATH,
            FLASH_ADDED,
        )),
        SubmitOutcome::Invalid(errors) => {
            Ok(render_add_form(&state, &form, &errors)?.into_response())
        },
    }
}

/// `GET /contact/edit/{name}`
pub async fn edit_form(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, AppError> {
    let contact = state
        .contacts
        .find_by_name(name.clone())
        .await?
        .ok_or_else(|| missing_contact(&name))?;

    render_edit_form(&state, &EditContactForm::from(&contact), &ValidationErrors::new())
}

fn render_edit_form(
    state: &AppState,
    form: &EditContactForm,
    errors: &ValidationErrors,
) -> Result<Html<String>, AppError> {
    render(
        state,
        Page::EditContact,
        &FormPayload {
            title: "Edit Contact",
            contact: form,
            errors,
        },
    )
}

/// `PUT /contact`
pub async fn update_contact(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<EditContactForm>,
) -> Result<Response, AppError> {
    let outcome = state
        .contacts
        .update(
            ContactId::new(form.id.as_str()),
            &form.old_name,
            NewContact::from(&form),
        )
        .await?;

    match outcome {
        SubmitOutcome::Saved(_) => Ok(redirect_with_flash(
            &state.flash,
            &session,
            CONTACTS_PATH,
            FLASH_EDITED,
        )),
        SubmitOutcome::Invalid(errors) => {
            Ok(render_edit_form(&state, &form, &errors)?.into_response())
        },
    }
}

/// `DELETE /contact`
///
/// Deleting a name with no contact still redirects with the flash.
pub async fn delete_contact(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DeleteContactForm>,
) -> Result<Response, AppError> {
    state.contacts.delete_by_name(form.name).await?;
    Ok(redirect_with_flash(
        &state.flash,
        &session,
        CONTACTS_PATH,
        FLASH_DELETED,
    ))
}

/// `GET /contact/{name}`
pub async fn contact_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, AppError> {
    let contact = state
        .contacts
        .find_by_name(name.clone())
        .await?
        .ok_or_else(|| missing_contact(&name))?;

    render(
        &state,
        Page::Details,
        &DetailPayload {
            title: "Contact Detail",
            contact,
        },
    )
}

/// `GET /public/style.css`
pub async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        STYLESHEET,
    )
}

fn missing_contact(name: &str) -> AppError {
    AppError::not_found(format!("No contact named '{name}'."))
}
