// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pass view — the held certificate rendered as a QR code.

use dioxus::prelude::*;

use crate::services::app_services::AppServices;
use crate::services::render::{edge_for, qr_svg};
use crate::state::AppState;

#[component]
pub fn PassView() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let snapshot = state.read().snapshot.clone();
    let Some(payload) = snapshot.payload else {
        return rsx! {};
    };
    let edge = edge_for(&snapshot.layout);
    let quiet = snapshot.layout.quiet_zone;
    let svg = match qr_svg(&payload, edge) {
        Ok(svg) => svg,
        Err(e) => {
            tracing::error!(error = %e, "cannot render pass");
            String::new()
        }
    };

    rsx! {
        div { style: "display: flex; flex-direction: column; align-items: center; gap: 16px; padding: 8px;",
            div {
                style: "background: white; padding: {quiet}px; width: {edge}px; height: {edge}px;",
                dangerous_inner_html: "{svg}",
            }

            div { style: "display: flex; gap: 8px;",
                button {
                    style: "padding: 12px 24px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            #[cfg(not(any(target_os = "ios", target_os = "android")))]
                            {
                                if let Some(path) = rfd::FileDialog::new()
                                    .set_file_name("green-pass.pdf")
                                    .add_filter("PDF", &["pdf"])
                                    .save_file()
                                {
                                    match svc.export_pass(&path) {
                                        Ok(()) => tracing::info!(path = %path.display(), "pass exported"),
                                        Err(e) => state.write().report(&e),
                                    }
                                }
                            }
                        }
                    },
                    "Save as PDF"
                }
                button {
                    style: "padding: 12px 24px; border-radius: 8px; border: none; background: #c62828; color: white;",
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            if let Err(e) = svc.reset() {
                                state.write().report(&e);
                            }
                            state.write().refresh(&svc);
                        }
                    },
                    "Reset"
                }
            }
        }
    }
}
