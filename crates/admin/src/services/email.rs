//! Email service for customer notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and text templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::db::{CustomerRepository, RepositoryError};
use crate::models::AdminProduct;

/// Subject of the new product announcement.
pub const NEW_PRODUCT_SUBJECT: &str = "New Product Added!";

/// Most recipients per message; larger lists are split.
const MAX_RECIPIENTS_PER_MESSAGE: usize = 50;

/// Template fields of the new product announcement.
#[derive(Debug, Clone)]
pub struct NewProductEmail {
    pub name: String,
    pub price: String,
    pub description: String,
    pub image_url: String,
    pub shop_url: String,
}

impl NewProductEmail {
    /// Build the announcement for a newly created product.
    #[must_use]
    pub fn for_product(product: &AdminProduct, storefront_url: &str, currency: &str) -> Self {
        Self {
            name: product.display_name(),
            price: product.price.display_with(currency),
            description: product.description.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
            shop_url: format!("{storefront_url}/shop/"),
        }
    }
}

/// HTML template for the new product email.
#[derive(Template)]
#[template(path = "email/new_product_added.html")]
struct NewProductEmailHtml<'a> {
    product: &'a NewProductEmail,
}

/// Plain text template for the new product email.
#[derive(Template)]
#[template(path = "email/new_product_added.txt")]
struct NewProductEmailText<'a> {
    product: &'a NewProductEmail,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Recipient lookup failed.
    #[error("Recipient lookup failed: {0}")]
    Recipients(#[from] RepositoryError),
}

/// Email service for sending notifications.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Announce a new product to `recipients`.
    ///
    /// Recipients are blind-copied in batches; unparseable addresses are
    /// skipped with a warning. Returns the number of addresses mailed.
    ///
    /// # Errors
    ///
    /// Returns error if a template fails to render or a batch fails to send.
    pub async fn send_new_product(
        &self,
        recipients: &[String],
        product: &NewProductEmail,
    ) -> Result<usize, EmailError> {
        let html = NewProductEmailHtml { product }.render()?;
        let text = NewProductEmailText { product }.render()?;
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?;

        let mailboxes = parse_recipients(recipients);
        for batch in mailboxes.chunks(MAX_RECIPIENTS_PER_MESSAGE) {
            self.send_multipart_email(&from, batch, NEW_PRODUCT_SUBJECT, &text, &html)
                .await?;
        }

        Ok(mailboxes.len())
    }

    /// Send one multipart message to `from`, blind-copying `bcc`.
    async fn send_multipart_email(
        &self,
        from: &Mailbox,
        bcc: &[Mailbox],
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let builder = bcc.iter().fold(
            Message::builder()
                .from(from.clone())
                .to(from.clone())
                .subject(subject),
            |builder, mailbox| builder.bcc(mailbox.clone()),
        );

        let email = builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text_body.to_string()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body.to_string()),
                ),
        )?;

        self.mailer.send(email).await?;

        tracing::info!(recipients = bcc.len(), subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn parse_recipients(recipients: &[String]) -> Vec<Mailbox> {
    recipients
        .iter()
        .filter_map(|address| match address.parse::<Mailbox>() {
            Ok(mailbox) => Some(mailbox),
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Skipping invalid recipient");
                None
            }
        })
        .collect()
}

/// Email every customer about a newly created product.
///
/// Never fails: errors are logged, and without SMTP configuration the
/// notification is skipped.
pub async fn notify_product_added(
    mailer: Option<EmailService>,
    pool: PgPool,
    product: NewProductEmail,
) {
    let Some(mailer) = mailer else {
        tracing::info!(product = %product.name, "SMTP not configured; skipping new product email");
        return;
    };

    match deliver_new_product(&mailer, &pool, &product).await {
        Ok(sent) => tracing::info!(product = %product.name, sent, "New product email delivered"),
        Err(e) => tracing::error!(product = %product.name, error = %e, "New product email failed"),
    }
}

async fn deliver_new_product(
    mailer: &EmailService,
    pool: &PgPool,
    product: &NewProductEmail,
) -> Result<usize, EmailError> {
    let recipients = CustomerRepository::new(pool).notification_emails().await?;
    if recipients.is_empty() {
        return Ok(0);
    }
    mailer.send_new_product(&recipients, product).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use marketstall_core::{Money, ProductId};

    use super::*;

    fn product() -> AdminProduct {
        AdminProduct {
            id: ProductId::new(9),
            name: Some("Adire scarf".to_string()),
            product_type_id: None,
            category_id: None,
            product_type_name: None,
            category_name: None,
            description: Some("Indigo <dyed> cotton".to_string()),
            original_price: Money::parse("9000").unwrap(),
            price: Money::parse("7500").unwrap(),
            shipping: Money::ZERO,
            digital: Some(false),
            image_url: None,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn announcement_uses_grouped_price_and_shop_link() {
        let email = NewProductEmail::for_product(&product(), "https://shop.test", "₦");
        assert_eq!(email.price, "₦7,500.00");
        assert_eq!(email.shop_url, "https://shop.test/shop/");
        assert_eq!(email.name, "Adire scarf");
    }

    #[test]
    fn html_body_escapes_description() {
        let email = NewProductEmail::for_product(&product(), "https://shop.test", "₦");
        let html = NewProductEmailHtml { product: &email }.render().unwrap();
        assert!(html.contains("Adire scarf"));
        assert!(html.contains("&#60;dyed&#62;") || html.contains("&lt;dyed&gt;"));

        let text = NewProductEmailText { product: &email }.render().unwrap();
        assert!(text.contains("https://shop.test/shop/"));
    }

    #[test]
    fn invalid_recipients_are_skipped() {
        let parsed = parse_recipients(&["ada@shop.test".to_string(), "not an email".to_string()]);
        assert_eq!(parsed.len(), 1);
    }
}
