//! Integration tests for events

#[cfg(test)]
mod tests {
    use repro_errors::{SandboxError, UserFacingError};
    use repro_events::*;
    use repro_types::Outcome;

    struct PackageScoped {
        tx: EventSender,
    }

    impl EventEmitter for PackageScoped {
        fn event_sender(&self) -> Option<&EventSender> {
            Some(&self.tx)
        }

        fn scoped_package(&self) -> Option<&str> {
            Some("coreutils")
        }
    }

    #[tokio::test]
    async fn test_emit_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_warning_with_context("slow mirror", "took 12s");
        tx.emit_debug("test debug");

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first.event,
            AppEvent::General(GeneralEvent::Warning { context: Some(_), .. })
        ));
        assert_eq!(first.meta.level, EventLevel::Warn);

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second.event,
            AppEvent::General(GeneralEvent::Debug { .. })
        ));
        assert_eq!(second.meta.source, EventSource::General);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // must not panic
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_no_sender_is_silent() {
        let none: Option<EventSender> = None;
        none.emit_warning("nobody listens");
    }

    #[tokio::test]
    async fn test_scoped_package_is_stamped() {
        let (tx, mut rx) = channel();
        let emitter = PackageScoped { tx };

        emitter.emit(AppEvent::Verification(VerificationEvent::Classified {
            package: "coreutils".into(),
            outcome: Outcome::Match,
            expected: "ab".into(),
            computed: "ab".into(),
        }));

        let message = rx.recv().await.unwrap();
        assert_eq!(message.package(), Some("coreutils"));
        assert_eq!(message.meta.source, EventSource::Verification);
    }

    #[test]
    fn test_log_levels() {
        let insufficient = AppEvent::Snapshot(SnapshotEvent::Insufficient {
            package: "acl".into(),
            found: 2,
        });
        assert_eq!(insufficient.level(), EventLevel::Warn);

        let command = AppEvent::Sandbox(SandboxEvent::CommandStarted {
            sandbox: "repro-acl-1".into(),
            command: "apt-get update".into(),
        });
        assert_eq!(command.level(), EventLevel::Debug);
        assert_eq!(command.source(), EventSource::Sandbox);
        let meta = EventMeta::new(command.level(), command.source()).for_package("acl");
        assert_eq!(meta.tracing_level(), tracing::Level::DEBUG);
        assert_eq!(meta.package.as_deref(), Some("acl"));
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = SandboxError::Timeout {
            sandbox: "repro-acl-1".into(),
            command: "apt-get update".into(),
            seconds: 30,
        };
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), err.user_code());
        assert_eq!(failure.message, err.user_message());
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AppEvent::Build(BuildEvent::StepStarted {
            package: "acl".into(),
            step: BuildStep::Compile,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "build");
        assert_eq!(json["event"]["type"], "StepStarted");
        assert_eq!(json["event"]["step"], "compile");
    }
}
