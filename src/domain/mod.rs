pub mod anthology;
pub mod document;
pub mod link;

pub use anthology::{Anthology, BookMeta};
pub use document::{untitled_from_url, Document};
pub use link::CandidateLink;
