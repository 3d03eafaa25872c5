//! Escaping and validation for values spliced into SOQL, and redaction of
//! credentials in messages.
//!
//! ## SOQL Injection Prevention
//!
//! Values placed inside SOQL string literals MUST go through
//! [`soql::escape_string`]. Identifiers (object, field and relationship
//! names) cannot be escaped, so they are validated instead.
//!
//! ```rust
//! use sobject_browser_client::security::soql;
//!
//! let name = soql::escape_string("O'Brien__c");
//! let query = format!(
//!     "SELECT Id FROM FieldDefinition WHERE EntityDefinition.QualifiedApiName = '{}'",
//!     name
//! );
//! assert!(query.ends_with("'O\\'Brien__c'"));
//! ```

use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+").expect("static token pattern")
});

static SESSION_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").expect("static session pattern")
});

/// Strip access tokens and session ids from a message and cap its length.
///
/// Used for Salesforce error bodies and for `sf` CLI output before either
/// ends up in an error message.
#[must_use]
pub fn sanitize_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let sanitized = TOKEN_PATTERN.replace_all(message, "[REDACTED_TOKEN]");
    let mut sanitized = SESSION_PATTERN
        .replace_all(&sanitized, "sid=[REDACTED]")
        .into_owned();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}

/// SOQL escaping utilities for injection prevention.
pub mod soql {
    /// Escape a string value for use inside a SOQL string literal.
    ///
    /// Escapes `'`, `\`, newline, carriage return and tab.
    ///
    /// ```rust
    /// use sobject_browser_client::security::soql;
    ///
    /// assert_eq!(soql::escape_string("O'Brien"), "O\\'Brien");
    /// ```
    ///
    /// Without escaping, an attacker could manipulate queries:
    /// ```text
    /// Input:  "Account' OR QualifiedApiName != '"
    /// Unsafe: ... WHERE EntityDefinition.QualifiedApiName = 'Account' OR QualifiedApiName != ''
    /// Safe:   ... WHERE EntityDefinition.QualifiedApiName = 'Account\' OR QualifiedApiName != \''
    /// ```
    #[must_use]
    pub fn escape_string(value: &str) -> String {
        let mut escaped = String::with_capacity(value.len() + 16);
        for ch in value.chars() {
            match ch {
                '\'' => escaped.push_str("\\'"),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                _ => escaped.push(ch),
            }
        }
        escaped
    }

    /// Validate that a name is a plain API identifier.
    ///
    /// Must start with an ASCII letter; the rest may be ASCII letters, digits
    /// and underscores. This covers `Account`, `Custom_Field__c`,
    /// `ns__Widget__mdt` and `Account__Share`.
    ///
    /// ```rust
    /// use sobject_browser_client::security::soql;
    ///
    /// assert!(soql::is_safe_field_name("Custom_Field__c"));
    /// assert!(!soql::is_safe_field_name("Bad'; DROP--"));
    /// ```
    #[must_use]
    pub fn is_safe_field_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
            }
            _ => false,
        }
    }

    /// Validate a dotted relationship path such as
    /// `EntityDefinition.QualifiedApiName`.
    #[must_use]
    pub fn is_safe_field_path(path: &str) -> bool {
        path.split('.').all(is_safe_field_name)
    }

    /// Validate that a SObject name is safe.
    #[must_use]
    pub fn is_safe_sobject_name(name: &str) -> bool {
        is_safe_field_name(name)
    }
}
