//! Audit logging for security events
//!
//! Authentication and authorization outcomes are emitted as structured
//! tracing events on the `audit` target, so they can be routed to a separate
//! sink with an `EnvFilter` directive such as `audit=info`.

use axum::http::header::{AsHeaderName, USER_AGENT};
use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Security-relevant events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Owner logged in and received a session token
    LoginSuccess {
        owner_id: Uuid,
        username: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Login attempt rejected
    LoginFailure {
        username: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Session token revoked through logout
    Logout {
        subject_id: Uuid,
        ip_address: Option<String>,
    },

    /// Bearer token failed validation
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Bearer token found in the revocation store
    RevokedTokenUsed {
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Authenticated caller's role is not permitted on a route
    AccessDenied {
        subject_id: Uuid,
        role: String,
        allowed: Vec<String>,
        resource: String,
        ip_address: Option<String>,
    },

    /// Revocation store could not answer; request rejected
    StoreUnavailable {
        reason: String,
        ip_address: Option<String>,
    },
}

/// Log an audit event
///
/// Failures and denials are logged at `warn`, store outages at `error`,
/// everything else at `info`.
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();
    let event_json = serde_json::to_string(event).unwrap_or_else(|_| format!("{event:?}"));

    match event {
        AuditEvent::LoginSuccess {
            owner_id,
            username,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                owner_id = %owner_id,
                username = %username,
                ip_address = ?ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            username,
            reason,
            ip_address,
            ..
        } => {
            warn!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                reason = %reason,
                ip_address = ?ip_address,
                "Login failed"
            );
        }
        AuditEvent::Logout {
            subject_id,
            ip_address,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                subject_id = %subject_id,
                ip_address = ?ip_address,
                "Session revoked"
            );
        }
        AuditEvent::InvalidToken {
            reason, ip_address, ..
        } => {
            warn!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                reason = %reason,
                ip_address = ?ip_address,
                "Invalid token"
            );
        }
        AuditEvent::RevokedTokenUsed { ip_address, .. } => {
            warn!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                ip_address = ?ip_address,
                "Revoked token presented"
            );
        }
        AuditEvent::AccessDenied {
            subject_id,
            role,
            resource,
            ip_address,
            ..
        } => {
            warn!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                subject_id = %subject_id,
                role = %role,
                resource = %resource,
                ip_address = ?ip_address,
                "Access denied"
            );
        }
        AuditEvent::StoreUnavailable { reason, ip_address } => {
            error!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                reason = %reason,
                ip_address = ?ip_address,
                "Revocation store unavailable, request rejected"
            );
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Client address as reported by a fronting proxy
///
/// The first hop of `X-Forwarded-For` wins over `X-Real-IP`.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').map(str::trim).find(|hop| !hop.is_empty()))
        .or_else(|| header_str(headers, "x-real-ip").map(str::trim))
        .map(str::to_owned)
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    header_str(headers, USER_AGENT).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginSuccess {
            owner_id: Uuid::new_v4(),
            username: "bu-sri".to_string(),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("login_success"));
        assert!(json.contains("bu-sri"));
    }

    #[test]
    fn test_audit_log_does_not_panic() {
        audit_log(&AuditEvent::AccessDenied {
            subject_id: Uuid::new_v4(),
            role: "Owner".to_string(),
            allowed: vec!["Admin".to_string()],
            resource: "/api/v1/shops".to_string(),
            ip_address: None,
        });
        audit_log(&AuditEvent::StoreUnavailable {
            reason: "timeout".to_string(),
            ip_address: Some("10.0.0.1".to_string()),
        });
    }

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_missing_headers() {
        let headers = axum::http::HeaderMap::new();

        assert_eq!(extract_ip_address(&headers), None);
        assert_eq!(extract_user_agent(&headers), None);
    }
}
