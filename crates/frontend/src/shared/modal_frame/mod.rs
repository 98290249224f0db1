use gloo_timers::future::TimeoutFuture;
use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// Overlay plus modal surface. Header and actions belong to the caller.
#[component]
pub fn ModalFrame(
    on_close: Callback<()>,
    /// Extra class for `div.modal`
    #[prop(optional, into)]
    modal_class: Option<String>,
    children: Children,
) -> impl IntoView {
    let overlay_mouse_down = RwSignal::new(false);

    let on_overlay = |ev: &ev::MouseEvent| -> bool {
        match (ev.target(), ev.current_target()) {
            (Some(t), Some(ct)) => t == ct,
            _ => false,
        }
    };

    // press and release must both land on the overlay
    let handle_mouse_down = move |ev: ev::MouseEvent| {
        overlay_mouse_down.set(on_overlay(&ev));
    };

    let handle_click = move |ev: ev::MouseEvent| {
        let should_close = overlay_mouse_down.get() && on_overlay(&ev);
        overlay_mouse_down.set(false);
        if should_close {
            // next tick: the overlay is removed by its own click handler
            spawn_local(async move {
                TimeoutFuture::new(0).await;
                on_close.run(());
            });
        }
    };

    let class = match modal_class {
        Some(extra) => format!("modal {extra}"),
        None => "modal".to_string(),
    };

    view! {
        <div
            class="modal-overlay"
            style="z-index: 1000;"
            on:mousedown=handle_mouse_down
            on:click=handle_click
        >
            <div class=class style="position: relative;" on:click=|ev: ev::MouseEvent| ev.stop_propagation()>
                {children()}
            </div>
        </div>
    }
}
