//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use repro_errors::{Error, NetworkError};
    use repro_events::{channel, AppEvent, GeneralEvent};
    use repro_net::*;
    use std::time::Duration;

    fn fast_client() -> NetClient {
        NetClient::new(NetConfig {
            retry: RetryPolicy {
                retries: 1,
                backoff: Duration::from_millis(10),
            },
            ..NetConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/archive/debian/");
            then.status(200).body("<html>listing</html>");
        });

        let client = fast_client();
        let body = fetch_text(&client, &server.url("/archive/debian/"), &tx)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(body, "<html>listing</html>");

        let message = rx.try_recv().unwrap();
        assert!(matches!(
            message.event,
            AppEvent::General(GeneralEvent::Debug { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_text_http_error() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let client = fast_client();
        let err = fetch_text(&client, &server.url("/missing"), &tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        server.mock(|when, then| {
            when.method(GET).path("/busy");
            then.status(429).header("retry-after", "30");
        });

        let client = fast_client();
        let err = fetch_text(&client, &server.url("/busy"), &tx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::RateLimited { seconds: 30 })
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        });

        let client = fast_client();
        let err = fetch_text(&client, &server.url("/flaky"), &tx)
            .await
            .unwrap_err();

        mock.assert_hits(2);
        assert!(matches!(
            err,
            Error::Network(NetworkError::HttpError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let (tx, _rx) = channel();
        let client = fast_client();
        let err = fetch_text(&client, "snapshot without scheme", &tx)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::InvalidUrl(_))));
    }

    #[test]
    fn test_config_conversion() {
        let mut network = repro_config::NetworkConfig::default();
        network.timeout = 5;
        network.retries = 0;
        let config = NetConfig::from(&network);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry, RetryPolicy { retries: 0, backoff: Duration::from_secs(network.retry_delay) });
    }
}
