//! HTTP uplink over a WiFi modem
//!
//! Telemetry goes out as a form POST over plain TCP; notifications as a
//! GET over TLS. Each request opens its own connection and the server
//! closes it (`Connection: close`).

use thawbox_core::config::{NetworkConfig, TimingConfig};
use thawbox_core::traits::{Uplink, UplinkError};
use thawbox_protocol::{
    Notification, NotificationEndpoint, TelemetryEndpoint, TelemetryRow,
};

use super::esp_at::{Drain, Link, Modem, ModemError, Response};

/// Telemetry server port
pub const HTTP_PORT: u16 = 80;

/// Notification server port
pub const HTTPS_PORT: u16 = 443;

/// [`Uplink`] built on a [`Modem`]
pub struct HttpUplink<M> {
    modem: M,
    network: NetworkConfig,
    telemetry_drain: Drain,
    notification_drain: Drain,
    joined: bool,
}

impl<M: Modem> HttpUplink<M> {
    pub fn new(modem: M, network: NetworkConfig, timing: &TimingConfig) -> Self {
        Self {
            modem,
            network,
            telemetry_drain: Drain {
                timeout_ms: timing.telemetry_timeout_ms,
                restart_on_data: false,
            },
            notification_drain: Drain {
                timeout_ms: timing.notification_timeout_ms,
                restart_on_data: true,
            },
            joined: false,
        }
    }

    /// Join the configured network if not done yet
    pub fn connect(&mut self) -> Result<(), UplinkError> {
        if !self.network.is_online() {
            return Err(UplinkError::NotConnected);
        }
        if !self.joined {
            self.modem
                .join(&self.network.wifi_ssid, &self.network.wifi_password)
                .map_err(|_| UplinkError::JoinFailed)?;
            self.joined = true;
        }
        Ok(())
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn modem_mut(&mut self) -> &mut M {
        &mut self.modem
    }

    /// One request/response exchange on a fresh connection
    fn exchange(
        &mut self,
        link: Link,
        host: &str,
        port: u16,
        request: &[u8],
        drain: Drain,
    ) -> Result<(), UplinkError> {
        self.connect()?;

        if let Err(e) = self.modem.connect(link, host, port) {
            // Association may have dropped; check it again next time
            self.joined = false;
            return Err(match e {
                ModemError::Timeout => UplinkError::Timeout,
                _ => UplinkError::ConnectFailed,
            });
        }

        let result = self
            .modem
            .send(request)
            .map_err(|_| UplinkError::SendFailed)
            .and_then(|()| self.modem.drain(drain).map_err(|_| UplinkError::Timeout));

        let closed = matches!(result, Ok(Response { closed: true, .. }));
        if !closed {
            let _ = self.modem.close();
        }

        match result? {
            Response {
                status: Some(status),
                ..
            } if !(200..300).contains(&status) => Err(UplinkError::Rejected(status)),
            _ => Ok(()),
        }
    }
}

impl<M: Modem> Uplink for HttpUplink<M> {
    fn push_telemetry(&mut self, row: &TelemetryRow) -> Result<(), UplinkError> {
        let form = row.encode_form()?;
        let endpoint = TelemetryEndpoint {
            host: &self.network.telemetry_host,
            path: &self.network.telemetry_path,
            api_key: &self.network.telemetry_api_key,
        };
        let request = endpoint.request(&form)?.encode()?;
        let host = self.network.telemetry_host.clone();

        self.exchange(
            Link::Tcp,
            &host,
            HTTP_PORT,
            request.as_bytes(),
            self.telemetry_drain,
        )
    }

    fn push_notification(
        &mut self,
        author: &str,
        secret: &str,
        message: &str,
    ) -> Result<(), UplinkError> {
        if !self.network.notifications_enabled() {
            return Err(UplinkError::NotConnected);
        }
        let note = Notification {
            author,
            secret,
            message,
        };
        let endpoint = NotificationEndpoint {
            host: &self.network.notify_host,
            path: &self.network.notify_path,
        };
        let request = endpoint.request(&note)?.encode()?;
        let host = self.network.notify_host.clone();

        self.exchange(
            Link::Ssl,
            &host,
            HTTPS_PORT,
            request.as_bytes(),
            self.notification_drain,
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::String as StdString;
    use std::vec::Vec as StdVec;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Join,
        Connect(Link, StdString, u16),
        Send(StdString),
        Drain(Drain),
        Close,
    }

    struct MockModem {
        calls: StdVec<Call>,
        join: Result<(), ModemError>,
        connect: Result<(), ModemError>,
        response: Result<Response, ModemError>,
    }

    impl MockModem {
        fn answering(status: u16) -> Self {
            Self {
                calls: StdVec::new(),
                join: Ok(()),
                connect: Ok(()),
                response: Ok(Response {
                    status: Some(status),
                    closed: true,
                }),
            }
        }

        fn sent(&self) -> &str {
            self.calls
                .iter()
                .find_map(|c| match c {
                    Call::Send(s) => Some(s.as_str()),
                    _ => None,
                })
                .unwrap_or("")
        }
    }

    impl Modem for MockModem {
        fn join(&mut self, _: &str, _: &str) -> Result<(), ModemError> {
            self.calls.push(Call::Join);
            self.join
        }

        fn connect(&mut self, link: Link, host: &str, port: u16) -> Result<(), ModemError> {
            self.calls.push(Call::Connect(link, host.into(), port));
            self.connect
        }

        fn send(&mut self, data: &[u8]) -> Result<(), ModemError> {
            self.calls
                .push(Call::Send(StdString::from_utf8_lossy(data).into_owned()));
            Ok(())
        }

        fn drain(&mut self, drain: Drain) -> Result<Response, ModemError> {
            self.calls.push(Call::Drain(drain));
            self.response
        }

        fn close(&mut self) -> Result<(), ModemError> {
            self.calls.push(Call::Close);
            Ok(())
        }
    }

    fn network() -> NetworkConfig {
        let mut network = NetworkConfig::default();
        network.wifi_ssid = heapless::String::try_from("lab").unwrap();
        network.telemetry_api_key = heapless::String::try_from("KEY123").unwrap();
        network.notify_host = heapless::String::try_from("box.example.org").unwrap();
        network.notify_path = heapless::String::try_from("/notify.php").unwrap();
        network
    }

    fn uplink(modem: MockModem) -> HttpUplink<MockModem> {
        HttpUplink::new(modem, network(), &TimingConfig::default())
    }

    fn row() -> TelemetryRow {
        TelemetryRow::from_values([20.0, -2.0, -5.5, 5.0, 12.5, 37.5, 60.0, 1.0])
    }

    #[test]
    fn test_telemetry_post() {
        let mut up = uplink(MockModem::answering(200));
        up.push_telemetry(&row()).unwrap();

        let calls = &up.modem.calls;
        assert_eq!(calls[0], Call::Join);
        assert_eq!(
            calls[1],
            Call::Connect(Link::Tcp, "api.thingspeak.com".into(), 80)
        );
        assert_eq!(
            calls[3],
            Call::Drain(Drain {
                timeout_ms: 5000,
                restart_on_data: false
            })
        );
        // Server closed the link itself
        assert!(!calls.contains(&Call::Close));

        let sent = up.modem.sent();
        assert!(sent.starts_with("POST /update HTTP/1.1\r\n"));
        assert!(sent.contains("X-THINGSPEAKAPIKEY: KEY123\r\n"));
        assert!(sent.ends_with("field7=60.00&field8=1.00"));
    }

    #[test]
    fn test_join_once() {
        let mut up = uplink(MockModem::answering(200));
        up.push_telemetry(&row()).unwrap();
        up.push_telemetry(&row()).unwrap();
        let joins = up.modem.calls.iter().filter(|c| **c == Call::Join).count();
        assert_eq!(joins, 1);
    }

    #[test]
    fn test_offline_without_ssid() {
        let mut up = HttpUplink::new(
            MockModem::answering(200),
            NetworkConfig::default(),
            &TimingConfig::default(),
        );
        assert_eq!(up.push_telemetry(&row()), Err(UplinkError::NotConnected));
        assert!(up.modem.calls.is_empty());
    }

    #[test]
    fn test_join_failure() {
        let mut modem = MockModem::answering(200);
        modem.join = Err(ModemError::Rejected);
        let mut up = uplink(modem);
        assert_eq!(up.push_telemetry(&row()), Err(UplinkError::JoinFailed));
        assert!(!up.is_joined());
    }

    #[test]
    fn test_connect_failure_forces_rejoin() {
        let mut modem = MockModem::answering(200);
        modem.connect = Err(ModemError::Rejected);
        let mut up = uplink(modem);
        assert_eq!(up.push_telemetry(&row()), Err(UplinkError::ConnectFailed));
        assert!(!up.is_joined());
    }

    #[test]
    fn test_rejected_status() {
        let mut up = uplink(MockModem::answering(401));
        assert_eq!(up.push_telemetry(&row()), Err(UplinkError::Rejected(401)));
    }

    #[test]
    fn test_timeout_closes_link() {
        let mut modem = MockModem::answering(200);
        modem.response = Err(ModemError::Timeout);
        let mut up = uplink(modem);
        assert_eq!(up.push_telemetry(&row()), Err(UplinkError::Timeout));
        assert_eq!(up.modem.calls.last(), Some(&Call::Close));
    }

    #[test]
    fn test_notification_get_over_tls() {
        let mut up = uplink(MockModem::answering(200));
        up.push_notification("thawbox", "s3cret", "Ice melted after 95 min")
            .unwrap();

        assert_eq!(
            up.modem.calls[1],
            Call::Connect(Link::Ssl, "box.example.org".into(), 443)
        );
        assert_eq!(
            up.modem.calls[3],
            Call::Drain(Drain {
                timeout_ms: 10_000,
                restart_on_data: true
            })
        );
        let sent = up.modem.sent();
        assert!(sent.starts_with(
            "GET /notify.php?author=thawbox&secretkey=s3cret&message=Ice+melted+after+95+min HTTP/1.1\r\n"
        ));
        assert!(sent.contains("Host: box.example.org\r\n"));
    }

    #[test]
    fn test_notification_disabled() {
        let mut network = network();
        network.notify_host.clear();
        let mut up = HttpUplink::new(
            MockModem::answering(200),
            network,
            &TimingConfig::default(),
        );
        assert_eq!(
            up.push_notification("a", "b", "c"),
            Err(UplinkError::NotConnected)
        );
    }
}
