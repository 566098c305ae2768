//! Per-entity view state.
//!
//! Each controller owns a [`ViewState`] and refreshes it through the
//! services when its key (sort order, post id) changes. Fetches are tagged
//! with a [`Generation`] so a slow response for an old key cannot overwrite
//! the state of a newer one.

mod comments;
mod post;
mod posts;

pub use comments::CommentsController;
pub use post::PostController;
pub use posts::PostsController;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::BoardError;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<BoardError>,
}

impl<T: Default> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            loading: true,
            error: None,
        }
    }
}

impl<T> ViewState<T> {
    fn settle(&mut self, result: Result<T, BoardError>) {
        match result {
            Ok(data) => {
                self.data = data;
                self.error = None;
            }
            Err(err) => self.error = Some(err),
        }
        self.loading = false;
    }
}

#[derive(Debug, Default)]
struct Generation(AtomicU64);

impl Generation {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.0.load(Ordering::SeqCst) == generation
    }
}
