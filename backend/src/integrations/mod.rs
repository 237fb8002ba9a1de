//! Outbound integrations
//!
//! Mail delivery and avatar image storage, each behind a trait so the
//! services can be exercised without network access.

pub mod avatar;
pub mod mail;

pub use avatar::{AvatarUploader, CloudinaryUploader};
pub use mail::{LogMailer, MailMessage, Mailer, SmtpMailer};
