//! Wire shape of the `info` object and its children.

use crate::marshal::macros::{core_object, core_required};

core_object! {
    /// Metadata about the API: title and version are the only hard
    /// requirements of the specification.
    pub struct Info, model = "info" {
        title: String, key = "title", required;
        description: String, key = "description";
        terms_of_service: String, key = "termsOfService";
        contact: Contact, key = "contact";
        license: License, key = "license";
        version: String, key = "version", required;
    }
}

core_object! {
    /// Contact information for the exposed API.
    pub struct Contact, model = "contact" {
        name: String, key = "name";
        url: String, key = "url";
        email: String, key = "email";
    }
}

core_object! {
    /// License information for the exposed API.
    pub struct License, model = "license" {
        name: String, key = "name", required;
        url: String, key = "url";
    }
}
