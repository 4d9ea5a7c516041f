use crate::contract::{ContactRequest, EmailMessage, MailAddresses, EMAIL_SUBJECT};

/// Builds the outbound message for a validated submission. Replies go to the
/// submitter; the envelope addresses are fixed per deployment.
pub fn compose_email(request: &ContactRequest, addresses: &MailAddresses) -> EmailMessage {
    EmailMessage {
        from: addresses.from.clone(),
        to: addresses.to.clone(),
        subject: EMAIL_SUBJECT.to_string(),
        reply_to: request.from.clone(),
        html: request.html.clone(),
        text: request.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_goes_to_submitter() {
        let request = ContactRequest {
            from: "jane@example.com".to_string(),
            text: "Hello".to_string(),
            html: String::new(),
            recaptcha_token: "token".to_string(),
        };
        let addresses = MailAddresses {
            from: "noreply@site.test".to_string(),
            to: "office@site.test".to_string(),
        };

        let message = compose_email(&request, &addresses);

        assert_eq!(message.from, "noreply@site.test");
        assert_eq!(message.to, "office@site.test");
        assert_eq!(message.subject, "From contact page");
        assert_eq!(message.reply_to, "jane@example.com");
        assert_eq!(message.html, "");
        assert_eq!(message.text, "Hello");
    }
}
