use crate::appearance::AppearancePair;
use crate::schedule::Window;

const APP_NAME: &str = "daynight";
const TOGGLE_ICON: &str = "weather-clear-night-symbolic";

pub fn send(body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary("Day and Night")
        .icon(TOGGLE_ICON)
        .body(&body)
        .show()
    {
        tracing::warn!("system notification failed: {err}");
    }
}

pub fn send_toggled(window: Window, pair: &AppearancePair) {
    send(toggled_body(window, pair));
}

fn toggled_body(window: Window, pair: &AppearancePair) -> String {
    format!("Toggled theme to {window}: {pair}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggled_body_names_window_and_pair() {
        let body = toggled_body(
            Window::Night,
            &AppearancePair::new("Adwaita-dark", "prefer-dark"),
        );
        assert_eq!(body, "Toggled theme to night: Adwaita-dark / prefer-dark");
    }
}
