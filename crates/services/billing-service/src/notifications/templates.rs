//! Email templates.
//!
//! Plain `format!` rendering with HTML-escaped substitutions. Every
//! message carries an HTML body and a plain-text alternative.

use super::mailer::Email;

/// Product name and login link shown in every message.
#[derive(Debug, Clone)]
pub struct Branding {
    pub app_name: String,
    pub login_url: String,
}

impl Branding {
    pub fn new(app_name: impl Into<String>, login_url: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            login_url: login_url.into(),
        }
    }
}

/// Account created by an administrator, with its temporary password.
pub fn welcome_email(brand: &Branding, name: &str, email: &str, password: &str) -> Email {
    let app = escape_html(&brand.app_name);
    let url = escape_html(&brand.login_url);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Welcome to {app}</title></head>
<body style="font-family: Arial, sans-serif; color: #333; background-color: #f4f4f4;">
  <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff;">
    <div style="background-color: #16a34a; color: #ffffff; padding: 32px; text-align: center;">
      <h1>Welcome to {app}</h1>
    </div>
    <div style="padding: 32px;">
      <p>Hello <strong>{name}</strong>,</p>
      <p>Your account has been created.</p>
      <div style="background-color: #f0fdf4; border-left: 4px solid #16a34a; padding: 16px;">
        <h3>Your Login Credentials</h3>
        <p>Email: <code>{email}</code></p>
        <p>Temporary Password: <code>{password}</code></p>
      </div>
      <p><strong>Important:</strong> this is a temporary password. Please change it after your first login.</p>
      <p><a href="{url}" style="background-color: #16a34a; color: #ffffff; padding: 12px 28px; text-decoration: none;">Sign in to {app}</a></p>
      <p style="color: #6b7280;">If you did not expect this account, please contact support.</p>
    </div>
  </div>
</body>
</html>"#,
        app = app,
        name = escape_html(name),
        email = escape_html(email),
        password = escape_html(password),
        url = url,
    );

    let text = format!(
        "Hello {name},\n\n\
         Your {app} account has been created.\n\n\
         Email: {email}\n\
         Temporary password: {password}\n\n\
         Please change this password after your first login: {url}\n",
        name = name,
        app = brand.app_name,
        email = email,
        password = password,
        url = brand.login_url,
    );

    Email {
        to: email.to_string(),
        subject: format!("Welcome to {} - Your Account Details", brand.app_name),
        html,
        text,
        from: None,
    }
}

/// New temporary password issued by an administrator.
pub fn password_reset_email(brand: &Branding, name: &str, email: &str, password: &str) -> Email {
    let app = escape_html(&brand.app_name);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Password Reset - {app}</title></head>
<body style="font-family: Arial, sans-serif; color: #333; background-color: #f4f4f4;">
  <div style="max-width: 600px; margin: 0 auto; background-color: #ffffff;">
    <div style="background-color: #dc2626; color: #ffffff; padding: 32px; text-align: center;">
      <h1>Password Reset</h1>
    </div>
    <div style="padding: 32px;">
      <p>Hello <strong>{name}</strong>,</p>
      <p>Your {app} password has been reset. Your new temporary password is:</p>
      <div style="font-family: monospace; font-size: 24px; border: 2px solid #dc2626; padding: 16px; text-align: center;">{password}</div>
      <p><strong>Important:</strong> change this password after signing in. If you did not request a reset, contact support.</p>
      <p><a href="{url}" style="background-color: #dc2626; color: #ffffff; padding: 12px 28px; text-decoration: none;">Sign in to {app}</a></p>
    </div>
  </div>
</body>
</html>"#,
        app = app,
        name = escape_html(name),
        password = escape_html(password),
        url = escape_html(&brand.login_url),
    );

    let text = format!(
        "Hello {name},\n\n\
         Your {app} password has been reset.\n\n\
         New temporary password: {password}\n\n\
         Sign in and change it: {url}\n",
        name = name,
        app = brand.app_name,
        password = password,
        url = brand.login_url,
    );

    Email {
        to: email.to_string(),
        subject: format!("{} - Password Reset", brand.app_name),
        html,
        text,
        from: None,
    }
}

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
