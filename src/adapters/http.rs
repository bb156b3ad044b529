//! Collector uplink: blocking HTTP PUT with a bounded timeout.
//!
//! One reading per request, JSON body, optional `Authorization: Bearer`
//! header. Success is any of the accepted 2xx codes (200/201/202); every
//! other status, timeout, or transport error folds into `false` — the
//! forwarder retries on its next natural trigger and never sees an error
//! type cross this boundary.

use std::time::Duration;

use log::debug;

use crate::app::ports::UplinkPort;
use crate::config::RelayConfig;
use crate::reading::Reading;

pub struct HttpUplink {
    agent: ureq::Agent,
    url: String,
    auth_header: Option<String>,
}

impl HttpUplink {
    pub fn new(config: &RelayConfig) -> Self {
        let timeout = Duration::from_secs(config.send_timeout_secs);
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout(timeout)
            .build();
        Self {
            agent,
            url: config.endpoint_url.clone(),
            auth_header: config.auth_token.as_ref().map(|t| format!("Bearer {t}")),
        }
    }
}

impl UplinkPort for HttpUplink {
    fn send(&mut self, reading: &Reading) -> bool {
        let mut request = self.agent.put(&self.url);
        if let Some(auth) = &self.auth_header {
            request = request.set("Authorization", auth);
        }

        match request.send_json(reading) {
            Ok(response) => matches!(response.status(), 200 | 201 | 202),
            Err(e) => {
                debug!("delivery failed: {e}");
                false
            }
        }
    }
}
