use crate::domain::subscriber::Subscriber;

pub const EMAIL_PLACEHOLDER: &str = "{email}";
pub const HOST_DOMAIN_PLACEHOLDER: &str = "{hostDomain}";

/// Fills in the two literal placeholders of a newsletter body.
///
/// `{email}` becomes `<email>|<category>`, the key the unsubscribe landing
/// page expects, and `{hostDomain}` becomes `unsubscribe_base_url`. Any other
/// brace-delimited text is left untouched.
pub fn personalize(
    content: &str,
    subscriber: &Subscriber,
    unsubscribe_base_url: &str,
) -> String {
    let subscription_key = format!("{}|{}", subscriber.email, subscriber.category);
    content
        .replace(EMAIL_PLACEHOLDER, &subscription_key)
        .replace(HOST_DOMAIN_PLACEHOLDER, unsubscribe_base_url)
}
