// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner — the camera is live; every captured frame is offered to the
// validator until one is a certificate or the user cancels.

use dioxus::prelude::*;
use greenpass_acquire::FrameOutcome;

use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Scanner() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut hint = use_signal(|| None::<&'static str>);
    let busy = state.read().busy;

    rsx! {
        div { style: "display: flex; flex-direction: column; gap: 16px; padding: 24px;",
            h1 { "Scan" }
            p { style: "color: #666;", "Point the camera at the QR code on your certificate." }

            button {
                style: "padding: 16px; border-radius: 12px; border: 2px dashed #2e7d32; color: #2e7d32; background: white; font-size: 16px;",
                disabled: busy,
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let svc = svc.clone();
                        state.write().busy = true;
                        spawn(async move {
                            match svc.scan_once().await {
                                Ok(Some(FrameOutcome::Accepted)) => hint.set(None),
                                Ok(Some(FrameOutcome::Rejected)) => {
                                    hint.set(Some("That code isn't a certificate. Keep scanning."));
                                }
                                Ok(Some(FrameOutcome::Discarded)) => {}
                                Ok(None) => hint.set(Some("No QR code seen. Try again.")),
                                Err(e) => state.write().report(&e),
                            }
                            let mut s = state.write();
                            s.busy = false;
                            s.refresh(&svc);
                        });
                    }
                },
                "Capture"
            }

            if let Some(text) = hint() {
                p { style: "color: #8a6d00;", "{text}" }
            }

            button {
                style: "padding: 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        if let Err(e) = svc.cancel_scan() {
                            state.write().report(&e);
                        }
                        state.write().refresh(&svc);
                    }
                },
                "Cancel"
            }
        }
    }
}
