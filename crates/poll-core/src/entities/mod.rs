//! Domain entities - core business objects

mod answer;
mod credential;
mod peer;
mod question;

pub use answer::Answer;
pub use credential::AdminCredential;
pub use peer::PeerInfo;
pub use question::{normalize_options, AnswerOption, AudienceQuestion, Question};
