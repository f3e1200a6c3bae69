pub mod human;
pub mod mailer;
pub mod render;
pub mod report;
