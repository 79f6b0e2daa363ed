mod manager;

pub use manager::{LibraryError, LibraryManager};

use std::sync::Arc;

/// Cheaply clonable handle to the library, shared across request handlers
#[derive(Debug, Clone)]
pub struct SharedLibraryManager {
    inner: Arc<LibraryManager>,
}

impl PartialEq for SharedLibraryManager {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl SharedLibraryManager {
    pub fn new(library_manager: LibraryManager) -> Self {
        SharedLibraryManager {
            inner: Arc::new(library_manager),
        }
    }

    pub fn get(&self) -> &LibraryManager {
        &self.inner
    }
}
