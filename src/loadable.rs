use serde::Serialize;

/// State container carried by live query results on their way to the UI.
///
/// Exactly one variant is active at a time and consumers are expected to
/// handle all four. A value never goes back to `Idle` once a subscription
/// has moved it to `Loading`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Loadable<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Loadable<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Loadable::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Loadable::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Loadable::Error(_))
    }

    /// Unchecked accessor: panics unless the value is `Success`.
    pub fn success(&self) -> &T {
        match self {
            Loadable::Success(data) => data,
            other => panic!("expected success, got {}", other.state_name()),
        }
    }

    /// Safe accessor: `None` for every variant but `Success`.
    pub fn success_opt(&self) -> Option<&T> {
        match self {
            Loadable::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Unchecked accessor: panics unless the value is `Error`.
    pub fn error_message(&self) -> &str {
        match self {
            Loadable::Error(message) => message,
            other => panic!("expected error, got {}", other.state_name()),
        }
    }

    /// Safe accessor: `None` for every variant but `Error`.
    pub fn error_message_opt(&self) -> Option<&str> {
        match self {
            Loadable::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Loadable::Idle => "idle",
            Loadable::Loading => "loading",
            Loadable::Success(_) => "success",
            Loadable::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_inspection() {
        let success: Loadable<Vec<i64>> = Loadable::Success(vec![1, 2]);
        let error: Loadable<Vec<i64>> = Loadable::Error("x".into());

        assert!(success.is_success());
        assert!(!success.is_error());
        assert!(error.is_error());
        assert!(!error.is_success());
        assert!(Loadable::<()>::Idle.is_idle());
        assert!(Loadable::<()>::Loading.is_loading());
    }

    #[test]
    fn unchecked_accessors_return_payloads() {
        let success: Loadable<Vec<i64>> = Loadable::Success(vec![1, 2]);
        assert_eq!(success.success(), &vec![1, 2]);

        let error: Loadable<Vec<i64>> = Loadable::Error("boom".into());
        assert_eq!(error.error_message(), "boom");
    }

    #[test]
    #[should_panic(expected = "expected success, got error")]
    fn success_on_error_panics() {
        let error: Loadable<Vec<i64>> = Loadable::Error("x".into());
        error.success();
    }

    #[test]
    #[should_panic(expected = "expected error, got loading")]
    fn error_message_on_loading_panics() {
        Loadable::<()>::Loading.error_message();
    }

    #[test]
    fn safe_accessors_never_panic() {
        let error: Loadable<Vec<i64>> = Loadable::Error("x".into());
        assert_eq!(error.success_opt(), None);
        assert_eq!(error.error_message_opt(), Some("x"));

        let success: Loadable<Vec<i64>> = Loadable::Success(vec![3]);
        assert_eq!(success.success_opt(), Some(&vec![3]));
        assert_eq!(success.error_message_opt(), None);
    }

    #[test]
    fn serializes_with_state_tag() {
        let success: Loadable<Vec<i64>> = Loadable::Success(vec![1]);
        let json = serde_json::to_value(&success).expect("serialize");
        assert_eq!(json.get("state").and_then(|v| v.as_str()), Some("success"));
        assert_eq!(json.get("data").and_then(|v| v.as_array()).map(Vec::len), Some(1));

        let loading: Loadable<Vec<i64>> = Loadable::Loading;
        let json = serde_json::to_value(&loading).expect("serialize");
        assert_eq!(json.get("state").and_then(|v| v.as_str()), Some("loading"));
    }
}
