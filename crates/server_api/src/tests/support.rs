use shared::domain::Role;
use storage::{seed, MemoryStore, Storage};

use crate::{ApiContext, Directory, Session, SessionKeys};

pub fn session(role: Role, email: &str, name: &str) -> Session {
    Session {
        authenticated: true,
        role: Some(role),
        email: Some(email.to_string()),
        display_name: Some(name.to_string()),
    }
}

pub fn faculty() -> Session {
    session(Role::Faculty, "faculty@nitandhra.ac.in", "Prof. Sunita Mishra")
}

pub fn hod() -> Session {
    session(Role::Hod, "hod@nitandhra.ac.in", "Dr. Venkat Rao")
}

pub fn student() -> Session {
    session(Role::Student, "student@student.nitandhra.ac.in", "Rahul Sharma")
}

pub fn keys() -> SessionKeys {
    SessionKeys::new("test-secret", 3600)
}

pub fn memory_ctx() -> ApiContext {
    let store = MemoryStore::from_seed(seed::demo().expect("seed")).expect("store");
    ApiContext::with_backend(store, Directory::default(), keys())
}

pub async fn sqlite_ctx() -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .apply_seed(&seed::demo().expect("seed"))
        .await
        .expect("apply seed");
    ApiContext::with_backend(storage, Directory::default(), keys())
}
