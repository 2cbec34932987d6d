//! Shared macros for the bootstrap crate.

/// Generate a `fmt::Debug` implementation that redacts credential fields.
///
/// Two field kinds are supported, specified as a keyword before the field name:
///
/// - `show field_name` - prints the field value normally
/// - `redact field_name` - prints `"[REDACTED]"` instead of the value
///
/// # Example
///
/// ```ignore
/// redacted_debug!(DbConfig {
///     show host,
///     show user,
///     redact password,
/// });
/// ```
macro_rules! redacted_debug {
    ($name:ident { $( $kind:ident $field:ident ),* $(,)? }) => {
        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut s = f.debug_struct(stringify!($name));
                $( redacted_debug!(@add_field s, self, $kind, $field); )*
                s.finish_non_exhaustive()
            }
        }
    };
    (@add_field $s:ident, $self:ident, show, $field:ident) => {
        $s.field(stringify!($field), &$self.$field);
    };
    (@add_field $s:ident, $self:ident, redact, $field:ident) => {
        $s.field(stringify!($field), &"[REDACTED]");
    };
}

#[cfg(test)]
mod tests {
    #[allow(dead_code)]
    struct TestCredentials {
        pub user: String,
        pub password: String,
    }

    redacted_debug!(TestCredentials {
        show user,
        redact password,
    });

    #[test]
    fn test_redacted_debug_hides_password_field() {
        let creds = TestCredentials {
            user: "appuser".to_string(),
            password: "super-secret-value".to_string(),
        };
        let output = format!("{:?}", creds);
        assert!(output.contains("appuser"), "should show normal fields");
        assert!(
            !output.contains("super-secret-value"),
            "should not leak password"
        );
        assert!(
            output.contains("[REDACTED]"),
            "should contain redaction marker"
        );
    }
}
