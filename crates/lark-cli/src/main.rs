//! LarkXR CLI: run the streaming tick loop, inspect configuration.

#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use lark_common::config::{load_json_or_default, to_pretty_json};
use lark_common::helpers::{now_us, tick_interval};
use lark_vr::mock::MockNative;
use lark_vr::{
    ClientConfig, DecodedTexture, NativeSession, SessionListener, TickStats, TrackingFrame,
    XrClient,
};
use lark_vr_native::LarkNative;

#[derive(Parser, Debug)]
#[command(name = "lark")]
#[command(about = "LarkXR streaming client tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive the streaming tick loop
    Run {
        /// JSON config file
        #[arg(short, long, env = "LARK_CONFIG")]
        config: Option<PathBuf>,

        /// Use the in-process mock instead of the native library
        #[arg(long, env = "LARK_MOCK", default_value_t = false)]
        mock: bool,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Path to the lark_xr shared library
        #[arg(long, env = "LARK_LIBRARY")]
        library: Option<PathBuf>,

        /// Enable the render queue with this many slots
        #[arg(long, env = "LARK_RENDER_QUEUE")]
        render_queue: Option<u32>,
    },

    /// Print the effective configuration as JSON
    Config {
        /// JSON config file
        #[arg(short, long, env = "LARK_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Logs session events; stands in for the engine-side consumers.
struct LogListener;

impl SessionListener for LogListener {
    fn on_connected(&self) {
        info!("session connected");
    }

    fn on_close(&self) {
        info!("session closed");
    }

    fn on_texture_2d(&self, texture: &DecodedTexture) {
        info!(width = texture.width, height = texture.height, "multiview texture ready");
    }

    fn on_texture_2d_stereo(&self, texture: &DecodedTexture) {
        info!(width = texture.width, height = texture.height, "stereo textures ready");
    }

    fn on_media_ready(&self) {
        info!("media ready");
    }

    fn on_tracking_frame(&self, frame: &TrackingFrame) {
        if frame.available {
            debug!(frame_index = frame.frame_index, received_us = now_us(), "tracking frame");
        }
    }
}

fn main() -> Result<()> {
    lark_common::init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Run {
            config,
            mock,
            ticks,
            library,
            render_queue,
        } => {
            let mut config: ClientConfig = load_json_or_default(config.as_deref())?;
            if let Some(size) = render_queue {
                config.render_queue.enabled = true;
                config.render_queue.size = size;
            }

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;

            let stats = if mock {
                let client = XrClient::new(MockNative::streaming_stereo(3664, 1920), config)?;
                rt.block_on(drive(client, ticks))?
            } else {
                let native = LarkNative::load(library.as_deref())?;
                let client = XrClient::new(native, config)?;
                rt.block_on(drive(client, ticks))?
            };

            println!("{}", to_pretty_json(&stats)?);
        }
        Command::Config { config } => {
            let config: ClientConfig = load_json_or_default(config.as_deref())?;
            println!("{}", to_pretty_json(&config)?);
        }
        Command::Version => {
            println!("lark {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

async fn drive<N: NativeSession>(mut client: XrClient<N>, max_ticks: Option<u64>) -> Result<TickStats> {
    client.add_listener(Arc::new(LogListener));
    if client.authorize().is_err() {
        warn!("continuing unauthorized");
    }
    client.apply_stream_settings();

    let mut interval = tokio::time::interval(tick_interval(client.config().target_tick_rate));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let started_us = now_us();
    let mut count = 0u64;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            _ = interval.tick() => {
                let outcome = client.update();
                debug!(?outcome, "tick");
                count += 1;
                if max_ticks.is_some_and(|max| count >= max) {
                    break;
                }
            }
        }
    }

    info!(
        ticks = count,
        elapsed_ms = now_us().saturating_sub(started_us) / 1000,
        "tick loop stopped"
    );
    Ok(client.stats())
}
