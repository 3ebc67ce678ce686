//! What the user sees when the platform cannot render.

/// Tells the user that rendering is unavailable.
///
/// On the web the message is appended to the page body, elsewhere it goes to
/// the log and to stderr.
pub fn show_fallback_message(reason: &str) {
    log::error!("rendering is unavailable: {reason}");

    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("Your graphics card does not seem to support the required features ({reason}).");

    #[cfg(target_arch = "wasm32")]
    {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let (Some(body), Ok(message)) = (document.body(), document.create_element("div")) else {
            return;
        };
        message.set_id("webgpu-message");
        message.set_text_content(Some(&format!(
            "Your browser or graphics card does not seem to support WebGPU or WebGL2 ({reason})."
        )));
        let _ = body.append_child(&message);
    }
}
