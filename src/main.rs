#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * GNSS-LOGGER is a GNSS telemetry aggregator.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al,
 * This framework is shipped under Mozilla Public V2 license.
 */

use env_logger::{Builder, Target};

use log::{error, info, trace};

use tokio::{signal, sync::watch};

use hifitime::prelude::{Epoch, TimeScale};

use std::time::{Duration, Instant};

mod aggregator;
mod cli;
mod device;
mod error;
mod fix;
mod format;
mod nmea;
mod report;
mod runtime;
mod scheduler;
mod settings;
mod snapshot;
mod table;

use crate::{
    cli::Cli,
    device::Device,
    report::{
        Reporter,
        console::Console,
        display::{Display, FrameBuffer},
        payload::JsonLines,
    },
    runtime::Runtime,
    scheduler::Scheduler,
    snapshot::SessionId,
};

/// Dead time in between two passes, in passive mode
const PASSIVE_DEAD_TIME: Duration = Duration::from_millis(50);

/// Dead time when the receiver had nothing for us
const IDLE_DEAD_TIME: Duration = Duration::from_millis(10);

/// Delay before we exit on provisioning failure
#[cfg(feature = "upload")]
const PROVISIONING_FAILURE_DELAY: Duration = Duration::from_secs(5);

#[cfg(feature = "upload")]
async fn deploy_uploader(reporter: Reporter, settings: &settings::Settings) -> Reporter {
    use crate::report::upload::Uploader;

    let upload = match &settings.upload {
        Some(upload) => upload,
        None => return reporter,
    };

    match Uploader::deploy(upload) {
        Ok(uploader) => reporter.with_sink(uploader),
        Err(e) => {
            error!("{}", e);
            tokio::time::sleep(PROVISIONING_FAILURE_DELAY).await;
            std::process::exit(1);
        },
    }
}

fn open_device(cli: &Cli) -> Device {
    if let Some(serial) = cli.serial_port() {
        // active mode (GNSS module)
        let baud_rate = cli
            .baud_rate()
            .unwrap_or_else(|e| panic!("invalid command line: {}", e));

        Device::open_serial_port(serial, baud_rate)
            .unwrap_or_else(|e| panic!("Failed to open {} port: {}", serial, e))
    } else {
        // passive mode (input files)
        let user_files = cli.filepaths();

        assert!(
            !user_files.is_empty(),
            "invalid command line: requires either serial port or at least, one input file"
        );

        let mut device = Device::open_file(user_files[0]).unwrap_or_else(|e| {
            panic!("Failed to open {}: {}", user_files[0], e);
        });

        for fp in user_files.iter().skip(1) {
            device.stack_file(fp).unwrap_or_else(|e| {
                panic!("Failed to open {}: {}", fp, e);
            });
        }

        device
    }
}

#[tokio::main]
pub async fn main() {
    let mut builder = Builder::from_default_env();

    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    // init
    let mut buffer = [0; 4096];

    let t_utc = Epoch::now()
        .unwrap_or_else(|e| panic!("Failed to determine system time: {}", e))
        .to_time_scale(TimeScale::UTC);

    // cli
    let cli = Cli::new();

    let settings = cli
        .settings()
        .unwrap_or_else(|e| panic!("invalid command line: {}", e));

    // Input interface
    let mut device = open_device(&cli);
    let passive = device.interface.is_read_only();

    // Sinks
    let reporter = if settings.json {
        Reporter::default().with_sink(JsonLines::new(std::io::stdout()))
    } else {
        let mut console = Console::new(std::io::stdout());

        if let Err(e) = console.header() {
            error!("console: {}", e);
        }

        Reporter::default().with_sink(console)
    };

    let mut display = Display::new(FrameBuffer::new(settings.display));
    display.splash();

    let reporter = reporter.with_sink(display);

    #[cfg(feature = "upload")]
    let reporter = deploy_uploader(reporter, &settings).await;

    let mut reporter = reporter;

    // shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        signal::ctrl_c()
            .await
            .unwrap_or_else(|e| panic!("Tokio signal handling error: {}", e));

        shutdown_tx
            .send(true)
            .unwrap_or_else(|e| panic!("Tokio: signaling error: {}", e));
    });

    // main task
    let session = SessionId::new(&settings.hardware_id, t_utc);
    let mut rtm = Runtime::new(t_utc, session, settings.require_fix);
    let mut scheduler = Scheduler::new(settings.std_interval(), Instant::now());

    info!(
        "{} - session {} deployed (reporting every {})",
        t_utc.round(hifitime::prelude::Duration::from_seconds(1.0)),
        rtm.session(),
        settings.interval
    );

    loop {
        if *shutdown_rx.borrow() {
            info!("shutting down");
            break;
        }

        let consumed = device.consume_all_cb(&mut buffer, |batch| {
            rtm.ingest(batch);
        });

        match consumed {
            Ok(0) => {
                // in active mode, the receiver has nothing for us.
                // in passive mode, we have consumed all content: we should exit.
                if passive {
                    info!("consumed all content");
                    rtm.tick(device.fix(), &mut reporter);
                    break;
                }
                tokio::time::sleep(IDLE_DEAD_TIME).await;
            },
            Ok(size) => {
                trace!(
                    "consumed {} bytes - {} satellites in view",
                    size,
                    rtm.table().active().count()
                );
            },
            Err(e) => {
                error!("I/O error: {}", e);
                tokio::time::sleep(IDLE_DEAD_TIME).await;
            },
        }

        if scheduler.is_due(Instant::now()) {
            rtm.tick(device.fix(), &mut reporter);
            scheduler.rearm(Instant::now());
        }

        if passive {
            // no hardware acting as a throttle
            tokio::time::sleep(PASSIVE_DEAD_TIME).await;
        }
    }

    if let Ok(now) = Epoch::now() {
        info!(
            "{} reports in {}",
            rtm.sequence(),
            rtm.uptime(now.to_time_scale(TimeScale::UTC))
        );
    }
}
