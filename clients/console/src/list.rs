use store::consts::consts::ContactId;
use store::model::contact::Contact;
use strum_macros::{Display, EnumString};

#[derive(Display, EnumString, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    Date,
    Name,
    Email,
}

/// Reorders a fetched snapshot for display. `Date` keeps newest first, the
/// other keys compare their field ascending, ignoring case. The sort is
/// stable, records with equal keys keep their server order.
pub fn sort_contacts(contacts: &mut [Contact], sort_key: SortKey) {
    match sort_key {
        SortKey::Date => contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Name => contacts.sort_by_key(|contact| contact.name.to_lowercase()),
        SortKey::Email => contacts.sort_by_key(|contact| contact.email.to_lowercase()),
    }
}

/// State behind the contacts listing: the fetched records, the last fetch or
/// delete failure, and the active sort key.
pub struct ContactList {
    contacts: Vec<Contact>,
    loading: bool,
    error: Option<String>,
    sort_key: SortKey,
    seen_trigger: Option<u64>,
}

impl ContactList {
    pub fn new() -> ContactList {
        ContactList {
            contacts: Vec::new(),
            loading: false,
            error: None,
            sort_key: SortKey::Date,
            seen_trigger: None,
        }
    }

    /// Fetches when the refresh signal moves, a repeat of the last seen
    /// signal is a no-op. A failed fetch keeps the previous records.
    pub fn sync<F>(&mut self, refresh_trigger: u64, fetch: F)
    where
        F: FnOnce() -> Result<Vec<Contact>, String>,
    {
        if self.seen_trigger == Some(refresh_trigger) {
            return;
        }

        self.loading = true;
        self.error = None;

        match fetch() {
            Ok(contacts) => self.contacts = contacts,
            Err(message) => self.error = Some(message),
        }

        self.loading = false;
        self.seen_trigger = Some(refresh_trigger);
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// The records in display order.
    pub fn sorted(&self) -> Vec<Contact> {
        let mut contacts = self.contacts.clone();

        sort_contacts(&mut contacts, self.sort_key);

        contacts
    }

    pub fn visible_count(&self) -> usize {
        self.contacts.len()
    }

    /// Drops a deleted record locally, no refetch.
    pub fn remove_local(&mut self, id: &ContactId) {
        self.contacts.retain(|contact| &contact.id != id);
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
