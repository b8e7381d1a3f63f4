//! Personalized outreach: hook sentence, two-stage email drafting and SMTP
//! delivery.

pub mod drafter;
pub mod handlers;
pub mod hook;
pub mod prompts;
pub mod transport;
