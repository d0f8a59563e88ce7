//! Core identifier types shared by the webhook pipeline and the GitHub client.

pub mod ids;

pub use ids::{InvalidRepoId, RepoId, Sha};
