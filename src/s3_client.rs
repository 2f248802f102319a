// src/s3_client.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
//! Thread-safe, blocking wrapper around the async AWS Rust SDK.
//! Owns a single global multi-thread Tokio runtime and the global S3 client.
//!
//! The client is configured for **anonymous** access: the probe targets
//! publicly readable objects and must not require credentials.

use anyhow::{Context, Result};
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::{config::Region, Client};
use aws_smithy_http_client::tls;
use aws_smithy_http_client::tls::rustls_provider::CryptoMode;
use std::path::Path;
use std::sync::mpsc;
use std::{env, fs, thread};
use tokio::runtime::{Builder as TokioBuilder, Handle};
use tokio::sync::{oneshot, OnceCell};
use tracing::debug;

use crate::constants::{DEFAULT_REGION, ENV_AWS_CA_BUNDLE_PATH, ENV_AWS_ENDPOINT_URL, ENV_AWS_REGION, ENV_RT_THREADS};

// -----------------------------------------------------------------------------
// Global runtime + S3 client (lazy, thread-safe)
// -----------------------------------------------------------------------------
static RT_HANDLE: once_cell::sync::OnceCell<Handle> = once_cell::sync::OnceCell::new();
static CLIENT: OnceCell<Client> = OnceCell::const_new();

// Create (once) a background multi-thread Tokio runtime and return its Handle.
fn global_rt_handle() -> &'static Handle {
    RT_HANDLE.get_or_init(|| {
        let (tx, rx) = mpsc::sync_channel(1);
        thread::Builder::new()
            .name("fitscut-rt".to_string())
            .spawn(move || {
                let threads = get_runtime_threads();
                debug!("Creating Tokio runtime with {} worker threads", threads);

                let rt = TokioBuilder::new_multi_thread()
                    .enable_io()
                    .enable_time()
                    .worker_threads(threads)
                    .thread_name("fitscut-rt-worker")
                    .build()
                    .expect("failed to build global tokio runtime");

                // Send a Handle clone back to the creator, then park the runtime forever.
                let handle = rt.handle().clone();
                tx.send(handle).expect("send runtime handle");
                rt.block_on(async { std::future::pending::<()>().await });
            })
            .expect("failed to spawn fitscut runtime thread");

        rx.recv().expect("receive runtime handle")
    })
}

/// Get number of runtime threads with environment override
fn get_runtime_threads() -> usize {
    std::env::var(ENV_RT_THREADS)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            let cores = num_cpus::get();
            // The probe is strictly sequential; a handful of workers is plenty.
            std::cmp::min(std::cmp::max(4, cores), 8)
        })
}

/// Run an async `fut` on the global runtime and block the **current** thread
/// until it completes. Handles both runtime and non-runtime contexts.
pub fn run_on_global_rt<F, T>(fut: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(_) => {
            // Already inside a runtime: still execute on our global runtime,
            // and use a blocking receive that works from within a runtime context.
            let handle = global_rt_handle().clone();
            let (tx, rx) = std::sync::mpsc::channel();

            handle.spawn(async move {
                let result = fut.await;
                let _ = tx.send(result);
            });

            rx.recv()
                .map_err(|_| anyhow::anyhow!("global runtime task crashed: RecvError(())"))?
        }
        Err(_) => {
            // Plain OS thread: park on a oneshot until the async result arrives.
            let handle = global_rt_handle().clone();
            let (tx, rx) = oneshot::channel();

            handle.spawn(async move {
                let _ = tx.send(fut.await);
            });

            rx.blocking_recv()
                .map_err(|_| anyhow::anyhow!("global runtime task crashed: RecvError(())"))?
        }
    }
}

// -----------------------------------------------------------------------------
// TLS helper, for CA bundle
// -----------------------------------------------------------------------------

/// Create a TLS context using a CA bundle file
fn tls_context_from_pem(filename: impl AsRef<Path>) -> Result<tls::TlsContext> {
    let pem_contents = fs::read(&filename)
        .with_context(|| format!("Failed to read CA bundle file: {}", filename.as_ref().display()))?;

    let trust_store = tls::TrustStore::empty().with_pem_certificate(pem_contents.as_slice());

    tls::TlsContext::builder()
        .with_trust_store(trust_store)
        .build()
        .with_context(|| format!("Failed to build TLS context from PEM {}", filename.as_ref().display()))
}

// -----------------------------------------------------------------------------
// Client factory (built on the global runtime)
// -----------------------------------------------------------------------------

/// Synchronous wrapper for places that are not async (e.g. the CLI).
/// Internally hops onto the global runtime via `run_on_global_rt`.
pub fn anonymous_s3_client() -> Result<Client> {
    run_on_global_rt(async { anonymous_s3_client_async().await })
}

/// Async getter for the global anonymous S3 client.
/// Safe to call from any async context; initializes once without blocking.
pub async fn anonymous_s3_client_async() -> Result<Client> {
    let client_ref = CLIENT
        .get_or_try_init(|| async {
            dotenvy::dotenv().ok();

            // Custom CA bundle takes priority; otherwise the SDK default
            // Rustls client with the system trust roots is used.
            let http_client = match env::var(ENV_AWS_CA_BUNDLE_PATH) {
                Ok(ca_bundle_path) if !ca_bundle_path.is_empty() => {
                    debug!("Loading CA bundle from: {}", ca_bundle_path);
                    let tls_context = tls_context_from_pem(&ca_bundle_path)?;

                    Some(
                        aws_smithy_http_client::Builder::new()
                            .tls_provider(tls::Provider::Rustls(CryptoMode::AwsLc))
                            .tls_context(tls_context)
                            .build_https(),
                    )
                }
                _ => None,
            };

            // Region & optional endpoint
            let region =
                RegionProviderChain::first_try(env::var(ENV_AWS_REGION).ok().map(Region::new))
                    .or_default_provider()
                    .or_else(Region::new(DEFAULT_REGION));

            // Anonymous access: the target objects are public, so no
            // credential chain is consulted and requests go out unsigned.
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(region)
                .no_credentials();

            let mut custom_endpoint = false;
            if let Ok(endpoint) = env::var(ENV_AWS_ENDPOINT_URL) {
                if !endpoint.is_empty() {
                    loader = loader.endpoint_url(endpoint);
                    custom_endpoint = true;
                }
            }

            let mut config_builder = loader;
            if let Some(client) = http_client {
                config_builder = config_builder.http_client(client);
            }

            let cfg = config_builder.load().await;

            // Path-style addressing for S3-compatible endpoints (MinIO, Ceph).
            // Virtual-hosted style (bucket.endpoint) doesn't resolve there.
            let s3_config = aws_sdk_s3::config::Builder::from(&cfg)
                .force_path_style(custom_endpoint)
                .build();
            Ok::<_, anyhow::Error>(Client::from_conf(s3_config))
        })
        .await?;

    Ok(client_ref.clone())
}
