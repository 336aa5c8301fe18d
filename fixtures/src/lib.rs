//! Sample models whose typed API is generated by `build.rs` from
//! `models.yaml`.

pub mod models;

/// Local tables `users` and `posts`.
pub mod app_database {
    include!(concat!(env!("OUT_DIR"), "/app_database.rs"));
}

/// Content-style table `Contacts`.
pub mod contacts_provider {
    include!(concat!(env!("OUT_DIR"), "/contacts_provider.rs"));
}

pub use models::{Contact, Post, User};
