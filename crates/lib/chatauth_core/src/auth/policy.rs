//! Route access policy: ordered `pattern → requirement` rules.
//!
//! Rules are evaluated top to bottom; the first matching pattern decides.
//! Paths no rule matches fall back to the policy default, which is
//! [`Requirement::RequireAuthenticated`].

use crate::models::auth::{AuthenticatedPrincipal, Role};

/// Ant-style path pattern.
///
/// `*` matches exactly one segment; a trailing `/**` matches the prefix itself
/// and anything below it. Empty segments are ignored, so `/a/b/` matches `/a/b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    /// Pattern ended in `/**`.
    tail: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        let mut parts: Vec<&str> = split_path(pattern).collect();
        let tail = parts.last() == Some(&"**");
        if tail {
            parts.pop();
        }
        let segments = parts
            .into_iter()
            .map(|p| match p {
                "*" => Segment::Any,
                lit => Segment::Literal(lit.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            segments,
            tail,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = split_path(path);
        for segment in &self.segments {
            match (segment, parts.next()) {
                (Segment::Any, Some(_)) => {}
                (Segment::Literal(lit), Some(part)) if lit == part => {}
                _ => return false,
            }
        }
        self.tail || parts.next().is_none()
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// What a request must carry to reach a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PublicAccess,
    RequireAuthenticated,
    RequireRole(Role),
}

/// Outcome of evaluating the policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// No valid principal where one was required (401).
    Unauthenticated,
    /// Principal present but lacking the required role (403).
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    pub pattern: RoutePattern,
    pub requirement: Requirement,
}

impl AccessRule {
    pub fn new(pattern: &str, requirement: Requirement) -> Self {
        Self {
            pattern: RoutePattern::parse(pattern),
            requirement,
        }
    }
}

/// Ordered rule table with a fallback requirement.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    default: Requirement,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self {
            rules,
            default: Requirement::RequireAuthenticated,
        }
    }

    /// The service's route table.
    pub fn standard() -> Self {
        Self::new(vec![
            AccessRule::new("/auth/**", Requirement::PublicAccess),
            AccessRule::new("/api/hello", Requirement::PublicAccess),
            AccessRule::new("/api/test/**", Requirement::PublicAccess),
            AccessRule::new("/api/admin/**", Requirement::RequireRole(Role::Admin)),
        ])
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Requirement governing `path`: first matching rule, else the default.
    pub fn requirement_for(&self, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.default)
    }

    pub fn evaluate(
        &self,
        path: &str,
        principal: Option<&AuthenticatedPrincipal>,
    ) -> AccessDecision {
        match (self.requirement_for(path), principal) {
            (Requirement::PublicAccess, _) => AccessDecision::Allow,
            (_, None) => AccessDecision::Unauthenticated,
            (Requirement::RequireAuthenticated, Some(_)) => AccessDecision::Allow,
            (Requirement::RequireRole(role), Some(p)) if p.has_role(*role) => {
                AccessDecision::Allow
            }
            (Requirement::RequireRole(_), Some(_)) => AccessDecision::Forbidden,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::{Duration, Utc};

    use super::*;

    fn principal(roles: &[Role]) -> AuthenticatedPrincipal {
        let now = Utc::now();
        AuthenticatedPrincipal {
            subject: "alice".into(),
            roles: roles.iter().copied().collect::<BTreeSet<_>>(),
            issued_at: now,
            expires_at: now + Duration::minutes(15),
        }
    }

    #[test]
    fn exact_pattern() {
        let p = RoutePattern::parse("/api/hello");
        assert!(p.matches("/api/hello"));
        assert!(p.matches("/api/hello/"));
        assert!(!p.matches("/api/hello/world"));
        assert!(!p.matches("/api"));
        assert!(!p.matches("/api/hellooo"));
    }

    #[test]
    fn double_star_matches_prefix_and_below() {
        let p = RoutePattern::parse("/auth/**");
        assert!(p.matches("/auth"));
        assert!(p.matches("/auth/login"));
        assert!(p.matches("/auth/a/b/c"));
        assert!(!p.matches("/authx/login"));
        assert!(!p.matches("/api/auth/login"));

        assert!(RoutePattern::parse("/**").matches("/anything/at/all"));
    }

    #[test]
    fn single_star_matches_one_segment() {
        let p = RoutePattern::parse("/api/*/profile");
        assert!(p.matches("/api/42/profile"));
        assert!(!p.matches("/api/profile"));
        assert!(!p.matches("/api/1/2/profile"));
    }

    #[test]
    fn first_match_wins() {
        let policy = AccessPolicy::new(vec![
            AccessRule::new("/api/open/**", Requirement::PublicAccess),
            AccessRule::new("/api/**", Requirement::RequireRole(Role::Admin)),
        ]);
        assert_eq!(policy.evaluate("/api/open/x", None), AccessDecision::Allow);
        assert_eq!(
            policy.evaluate("/api/closed", Some(&principal(&[Role::User]))),
            AccessDecision::Forbidden
        );
    }

    #[test]
    fn default_requires_authentication() {
        let policy = AccessPolicy::new(Vec::new());
        assert_eq!(
            policy.requirement_for("/whatever"),
            &Requirement::RequireAuthenticated
        );
        assert_eq!(
            policy.evaluate("/whatever", None),
            AccessDecision::Unauthenticated
        );
        assert_eq!(
            policy.evaluate("/whatever", Some(&principal(&[]))),
            AccessDecision::Allow
        );
    }

    #[test]
    fn standard_table() {
        let policy = AccessPolicy::standard();
        let user = principal(&[Role::User]);
        let admin = principal(&[Role::User, Role::Admin]);

        assert_eq!(policy.evaluate("/auth/login", None), AccessDecision::Allow);
        assert_eq!(policy.evaluate("/auth/register", None), AccessDecision::Allow);
        assert_eq!(policy.evaluate("/api/hello", None), AccessDecision::Allow);
        assert_eq!(policy.evaluate("/api/me", None), AccessDecision::Unauthenticated);
        assert_eq!(policy.evaluate("/api/me", Some(&user)), AccessDecision::Allow);
        assert_eq!(
            policy.evaluate("/api/admin/status", None),
            AccessDecision::Unauthenticated
        );
        assert_eq!(
            policy.evaluate("/api/admin/status", Some(&user)),
            AccessDecision::Forbidden
        );
        assert_eq!(
            policy.evaluate("/api/admin/status", Some(&admin)),
            AccessDecision::Allow
        );
    }
}
