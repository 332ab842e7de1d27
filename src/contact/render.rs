//! Notification email rendering
//!
//! Produces the dark card-style HTML body sent to the site owner.

use super::ContactForm;

/// Placeholder rendered when no phone number was given
pub const PHONE_PLACEHOLDER: &str = "N/A";

/// Render the notification HTML for a validated submission.
///
/// Every `\n` in the message becomes `<br/>`. Values are embedded verbatim
/// unless `escape` is set, in which case HTML metacharacters are escaped
/// first.
pub fn render_notification(form: &ContactForm, escape: bool) -> String {
    let embed = |value: &str| {
        if escape {
            escape_html(value)
        } else {
            value.to_string()
        }
    };

    let name = embed(&form.name);
    let email = embed(&form.email);
    let phone = embed(form.phone.as_deref().unwrap_or(PHONE_PLACEHOLDER));
    let message = embed(&form.message).replace('\n', "<br/>");

    format!(
        r##"
<div style="background:#09090b;padding:40px 20px;font-family:Arial;">
  <div style="max-width:600px;margin:auto;background:#18181b;border:1px solid rgba(220,38,38,.35);border-radius:16px;padding:32px;color:#ffffff;">
    <h1 style="letter-spacing:3px;margin:0">CONTACT REQUEST</h1>
    <div style="width:60px;height:2px;background:#dc2626;margin:16px 0"></div>

    <p><strong>NAME</strong><br/>{name}</p>
    <p><strong>EMAIL</strong><br/>{email}</p>
    <p><strong>PHONE</strong><br/>{phone}</p>

    <p><strong>MESSAGE</strong></p>
    <div style="background:#09090b;padding:16px;border-radius:12px;margin-top:8px;">
      {message}
    </div>

    <p style="margin-top:32px;font-size:11px;color:#71717a;text-align:center;letter-spacing:2px;">
      CINEDOT • NEW FORM SUBMISSION
    </p>
  </div>
</div>
"##
    )
}

/// Escape the five HTML metacharacters
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
