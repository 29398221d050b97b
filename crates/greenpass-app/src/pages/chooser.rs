// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Import chooser — shown while no pass is held.

use dioxus::prelude::*;
use greenpass_acquire::ImportOutcome;

use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Chooser() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let busy = state.read().busy;

    rsx! {
        div { style: "display: flex; flex-direction: column; gap: 16px; padding: 24px;",
            h1 { "Green Pass" }
            p { style: "color: #666;", "Add your health certificate to keep its QR code at hand." }

            if state.read().camera_available {
                button {
                    style: "padding: 16px; border-radius: 12px; border: none; background: #2e7d32; color: white; font-size: 16px;",
                    disabled: busy,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            state.write().message = None;
                            if let Err(e) = svc.start_scan() {
                                state.write().report(&e);
                            }
                            state.write().refresh(&svc);
                        }
                    },
                    "Scan QR code"
                }
            }

            button {
                style: "padding: 16px; border-radius: 12px; border: 2px solid #2e7d32; color: #2e7d32; background: white; font-size: 16px;",
                disabled: busy,
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let svc = svc.clone();
                        state.write().message = None;
                        state.write().busy = true;
                        spawn(async move {
                            match svc.import_pdf().await {
                                Ok(Some(ImportOutcome::Displayed)) => {
                                    tracing::info!("pass imported from PDF");
                                }
                                // A code that isn't a certificate is ignored.
                                Ok(Some(ImportOutcome::Unrecognized)) | Ok(None) => {}
                                Err(e) => state.write().report(&e),
                            }
                            let mut s = state.write();
                            s.busy = false;
                            s.refresh(&svc);
                        });
                    }
                },
                "Import PDF"
            }

            if busy {
                div { style: "display: flex; align-items: center; gap: 12px;",
                    span { style: "color: #666;", "Reading document..." }
                    button {
                        style: "padding: 8px 16px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                        onclick: {
                            let svc = svc.clone();
                            move |_| svc.cancel_import()
                        },
                        "Cancel"
                    }
                }
            }
        }
    }
}
