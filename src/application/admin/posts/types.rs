use thiserror::Error;

use crate::application::repos::RepoError;

#[derive(Debug, Error)]
pub enum AdminPostError {
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}
