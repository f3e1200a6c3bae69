use crate::config::EmailConfig;
use anyhow::{Context, Result};
use lettre::{Message, SmtpTransport, Transport};

/// Send the finished report as one plain-text digest through the
/// configured relay. Port 25, no auth, no TLS, no retry — the relay is
/// assumed to sit on a trusted network segment.
pub fn send_digest(email: &EmailConfig, subject: &str, body: &str) -> Result<()> {
    let mut builder = Message::builder().from(
        email
            .from
            .parse()
            .with_context(|| format!("invalid From address '{}'", email.from))?,
    );
    for addr in email.recipients() {
        builder = builder.to(addr
            .parse()
            .with_context(|| format!("invalid To address '{addr}'"))?);
    }
    let message = builder
        .subject(subject)
        .body(body.to_string())
        .context("building report email")?;

    let mailer = SmtpTransport::builder_dangerous(&email.smtp_server).build();
    mailer
        .send(&message)
        .with_context(|| format!("sending report via {}", email.smtp_server))?;
    Ok(())
}
