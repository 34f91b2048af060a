//! IMAP mailbox collaborator.
//!
//! The imap crate is synchronous, so every session runs on the blocking
//! thread pool. A session is opened per call: login, one INBOX operation,
//! logout. Connection failures are recovered by callers as empty results.

use crate::config::Config;
use crate::errors::AppError;
use crate::models::EmailMessage;
use chrono::{DateTime, Utc};
use mailparse::MailHeaderMap;
use native_tls::TlsStream;
use std::net::TcpStream;

const IMAP_PORT: u16 = 993;
const SNIPPET_MAX_CHARS: usize = 500;

type ImapSession = imap::Session<TlsStream<TcpStream>>;

/// An unread message as fetched from the mailbox, headers still raw.
#[derive(Debug, Clone)]
pub struct RawEmail {
    /// IMAP sequence number.
    pub id: String,
    /// Decoded subject line.
    pub subject: String,
    /// Full From header, display name included.
    pub sender_header: String,
    /// Parsed Date header, when present and well-formed.
    pub date: Option<DateTime<Utc>>,
    /// Plain-text body, truncated to 500 characters.
    pub snippet: String,
}

#[derive(Clone)]
pub struct MailboxService {
    email_address: String,
    app_password: String,
    imap_host: String,
}

impl MailboxService {
    pub fn new(config: &Config) -> Self {
        Self {
            email_address: config.email_address.clone(),
            app_password: config.app_password.clone(),
            imap_host: config.imap_host.clone(),
        }
    }

    /// Attempts an IMAP login and reports the outcome without raising.
    pub async fn connect(&self) -> (bool, String) {
        let service = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            service.login_blocking().map(|mut session| {
                session.logout().ok();
            })
        })
        .await;

        match result {
            Ok(Ok(())) => {
                tracing::info!("Connected to IMAP server {}", self.imap_host);
                (true, "Connected successfully".to_string())
            }
            Ok(Err(e)) => {
                tracing::error!("Mailbox connection error: {}", e);
                (false, e.to_string())
            }
            Err(e) => {
                tracing::error!("Mailbox connect task failed: {}", e);
                (false, "Mailbox connect task failed".to_string())
            }
        }
    }

    /// Fetches all unread messages from INBOX.
    pub async fn fetch_unread(&self) -> Result<Vec<RawEmail>, AppError> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.fetch_unread_blocking())
            .await
            .map_err(|e| AppError::InternalError(format!("Mailbox fetch task failed: {}", e)))?
    }

    fn login_blocking(&self) -> Result<ImapSession, AppError> {
        let tls = native_tls::TlsConnector::builder()
            .build()
            .map_err(|e| AppError::MailboxError(format!("TLS setup failed: {}", e)))?;

        let client = imap::connect(
            (self.imap_host.as_str(), IMAP_PORT),
            self.imap_host.as_str(),
            &tls,
        )
        .map_err(|e| {
            AppError::MailboxError(format!("IMAP connect to {} failed: {}", self.imap_host, e))
        })?;

        client
            .login(&self.email_address, &self.app_password)
            .map_err(|(e, _)| AppError::MailboxError(format!("IMAP login failed: {}", e)))
    }

    fn fetch_unread_blocking(&self) -> Result<Vec<RawEmail>, AppError> {
        let mut session = self.login_blocking()?;

        session
            .select("INBOX")
            .map_err(|e| AppError::MailboxError(format!("INBOX select failed: {}", e)))?;

        let unread = session
            .search("UNSEEN")
            .map_err(|e| AppError::MailboxError(format!("UNSEEN search failed: {}", e)))?;

        let mut ids: Vec<u32> = unread.into_iter().collect();
        ids.sort_unstable();

        let mut emails = Vec::with_capacity(ids.len());
        for id in ids {
            let fetches = match session.fetch(id.to_string(), "RFC822") {
                Ok(fetches) => fetches,
                Err(e) => {
                    tracing::warn!("Fetch of message {} failed, skipping: {}", id, e);
                    continue;
                }
            };

            for fetch in fetches.iter() {
                let Some(body) = fetch.body() else {
                    tracing::warn!("Message {} has no body, skipping", id);
                    continue;
                };
                match parse_raw_email(&id.to_string(), body) {
                    Some(email) => emails.push(email),
                    None => tracing::warn!("Message {} could not be parsed, skipping", id),
                }
            }
        }

        session.logout().ok();
        tracing::info!("Fetched {} unread messages", emails.len());
        Ok(emails)
    }
}

/// Parses one RFC822 message into a [`RawEmail`].
fn parse_raw_email(id: &str, body: &[u8]) -> Option<RawEmail> {
    let parsed = mailparse::parse_mail(body).ok()?;

    let subject = parsed
        .headers
        .get_first_value("Subject")
        .unwrap_or_default();
    let sender_header = parsed.headers.get_first_value("From").unwrap_or_default();
    let date = parsed
        .headers
        .get_first_value("Date")
        .and_then(|d| mailparse::dateparse(&d).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));
    let snippet = truncate_chars(
        &first_text_body(&parsed).unwrap_or_default(),
        SNIPPET_MAX_CHARS,
    );

    Some(RawEmail {
        id: id.to_string(),
        subject,
        sender_header,
        date,
        snippet,
    })
}

/// Returns the first text/plain body found, walking multipart trees.
fn first_text_body(parsed: &mailparse::ParsedMail<'_>) -> Option<String> {
    if parsed.subparts.is_empty() {
        return parsed.get_body().ok();
    }
    for part in &parsed.subparts {
        if part.ctype.mimetype == "text/plain" {
            if let Ok(body) = part.get_body() {
                return Some(body);
            }
        }
    }
    for part in &parsed.subparts {
        if let Some(body) = first_text_body(part) {
            return Some(body);
        }
    }
    None
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Converts fetched messages into the API shape: bare sender address,
/// defaulted date.
pub fn parse_emails(raw_emails: Vec<RawEmail>) -> Vec<EmailMessage> {
    raw_emails
        .into_iter()
        .map(|raw| EmailMessage {
            id: raw.id,
            subject: raw.subject,
            sender: sender_address(&raw.sender_header),
            date: raw.date.unwrap_or_else(Utc::now),
            snippet: raw.snippet,
        })
        .collect()
}

/// Extracts the bare address from a From header, falling back to the raw
/// header text when it does not parse.
fn sender_address(header: &str) -> String {
    match mailparse::addrparse(header) {
        Ok(list) => {
            for addr in list.iter() {
                if let mailparse::MailAddr::Single(info) = addr {
                    return info.addr.clone();
                }
            }
            header.trim().to_string()
        }
        Err(_) => header.trim().to_string(),
    }
}
