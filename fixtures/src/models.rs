//! Hand-written structs; their `Model` impls are generated.

use model_query_core::Uri;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub age: i32,
    pub timestamp: i64,
    pub is_registered: bool,
    pub rating: f32,
    pub avatar: Option<Vec<u8>>,
    pub homepage: Option<Uri>,
    pub nickname: Option<String>,
    /// Not stored; filled in after loading.
    pub display_name: String,
}

impl User {
    pub fn new(username: &str, age: i32) -> Self {
        Self {
            username: username.to_string(),
            age,
            ..Self::default()
        }
    }

    pub(crate) fn on_loaded(&mut self) {
        self.display_name = format!("@{}", self.username);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub slug: String,
    pub user_id: i64,
    pub title: String,
    pub body: Option<String>,
}

impl Post {
    pub fn new(slug: &str, user_id: i64, title: &str) -> Self {
        Self {
            slug: slug.to_string(),
            user_id,
            title: title.to_string(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub id: i64,
    pub display_name: Option<String>,
    pub starred: bool,
}
