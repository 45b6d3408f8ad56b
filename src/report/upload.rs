//! Remote JSON telemetry.
//!
//! Uploads run on a dedicated task, fed through a single slot channel:
//! when the previous upload is still pending, the new reading is dropped.
//! Failed uploads are never retried.
use log::{debug, error, info, warn};

use reqwest::{Client, Url, header::CONTENT_TYPE};

use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};

use crate::{
    error::Error,
    report::{Sink, payload::Payload},
    settings::UploadSettings,
    snapshot::Snapshot,
};

/// Pending uploads
const SLOTS: usize = 1;

pub struct Uploader {
    tx: Sender<String>,
}

impl Uploader {
    /// Provisions the HTTP client and deploys the upload task.
    /// Must be called from within the tokio runtime.
    pub fn deploy(settings: &UploadSettings) -> Result<Self, Error> {
        let (url, client) = provision(settings)?;

        let (tx, rx) = mpsc::channel(SLOTS);

        tokio::spawn(async move {
            info!("uploading to {}", url);
            run(client, url, rx).await;
        });

        Ok(Self { tx })
    }
}

fn provision(settings: &UploadSettings) -> Result<(Url, Client), Error> {
    let url = Url::parse(&settings.url)
        .map_err(|e| Error::Provisioning(format!("invalid url \"{}\": {}", settings.url, e)))?;

    let client = Client::builder()
        .timeout(settings.timeout)
        .build()
        .map_err(|e| Error::Provisioning(format!("http client: {}", e)))?;

    Ok((url, client))
}

async fn run(client: Client, url: Url, mut rx: Receiver<String>) {
    while let Some(body) = rx.recv().await {
        let response = client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    info!("upload: HTTP {}", status);
                } else {
                    warn!("upload: HTTP {}", status);
                }
            },
            Err(e) => {
                error!("upload failed: {}", e);
            },
        }
    }

    debug!("upload task terminated");
}

impl Sink for Uploader {
    fn consume(&mut self, snapshot: &Snapshot) {
        let body = match Payload::from(snapshot).to_json() {
            Ok(body) => body,
            Err(e) => {
                error!("#{} - payload serialization: {}", snapshot.sequence, e);
                return;
            },
        };

        match self.tx.try_send(body) {
            Ok(_) => {
                debug!("#{} - upload scheduled", snapshot.sequence);
            },
            Err(TrySendError::Full(_)) => {
                warn!(
                    "#{} - previous upload still pending: reading dropped",
                    snapshot.sequence
                );
            },
            Err(TrySendError::Closed(_)) => {
                error!("#{} - upload task is not running", snapshot.sequence);
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Uploader, provision};
    use crate::{
        error::Error,
        fix::FixStatus,
        report::Sink,
        settings::UploadSettings,
        snapshot::{SessionId, Snapshot},
        table::SatelliteTable,
    };
    use hifitime::prelude::Epoch;
    use serde_json::Value;
    use std::{str::FromStr, time::Duration};
    use tokio::sync::mpsc::{self, error::TryRecvError};

    fn snapshot(sequence: u64) -> Snapshot {
        let session = SessionId::new("test", Epoch::from_str("2024-03-09T00:00:00 UTC").unwrap());
        Snapshot::build(&SatelliteTable::default(), &FixStatus::default(), sequence, &session)
    }

    #[test]
    fn pending_upload_drops_reading() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut uploader = Uploader { tx };

        uploader.consume(&snapshot(1));
        uploader.consume(&snapshot(2));

        let body = rx.try_recv().unwrap();
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["session_id"], "test-18E20826400");
        assert!(value["timestamp"].is_null());

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        // slot is free again
        uploader.consume(&snapshot(3));
        assert!(rx.try_recv().is_ok());

        // upload task is gone
        drop(rx);
        uploader.consume(&snapshot(4));
    }

    #[test]
    fn provisioning() {
        let settings = UploadSettings {
            url: "http://127.0.0.1:8080/api/telemetry".to_string(),
            timeout: Duration::from_secs(5),
        };

        let (url, _) = provision(&settings).unwrap();
        assert_eq!(url.path(), "/api/telemetry");
    }

    #[test]
    fn provisioning_failure() {
        let settings = UploadSettings {
            url: "not a url".to_string(),
            timeout: Duration::from_secs(5),
        };

        match provision(&settings) {
            Err(Error::Provisioning(_)) => {},
            _ => panic!("invalid url should not be provisioned"),
        }
    }
}
