// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Green Pass — keep your health certificate QR code on your device.
//
// Entry point. Initialises logging, backend services, app state, and launches
// the Dioxus UI. The screen shown follows the acquisition mode.

mod pages;
mod services;
mod state;

use dioxus::prelude::*;
use greenpass_core::AcquisitionMode;

use pages::chooser::Chooser;
use pages::pass::PassView;
use pages::scanner::Scanner;

use services::app_services::AppServices;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Green Pass starting");

    let (width, height) = services::render::WINDOW_SIZE;
    let window = dioxus::desktop::WindowBuilder::new()
        .with_title("Green Pass")
        .with_inner_size(dioxus::desktop::LogicalSize::new(f64::from(width), f64::from(height)));

    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::desktop::Config::new().with_window(window))
        .launch(app);
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(|| match AppServices::init() {
        Ok(s) => {
            tracing::info!("backend services initialised");
            s
        }
        Err(e) => {
            tracing::error!(error = %e, "persistent storage failed, using in-memory fallback");
            AppServices::fallback().expect("even fallback init failed")
        }
    });

    use_context_provider(|| svc.clone());
    let state = use_context_provider(|| Signal::new(state::AppState::new(&svc)));

    let mode = state.read().snapshot.mode;
    let message = state.read().message.clone();

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; min-height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            if let Some(err) = message {
                div { style: "margin: 12px; padding: 12px; border-radius: 8px; background: #fff3e0;",
                    strong { "{err.message}" }
                    p { style: "margin: 4px 0 0; color: #555;", "{err.suggestion}" }
                }
            }

            match mode {
                AcquisitionMode::Idle => rsx! { Chooser {} },
                AcquisitionMode::CameraScanning => rsx! { Scanner {} },
                AcquisitionMode::ResultDisplayed => rsx! { PassView {} },
            }
        }
    }
}
