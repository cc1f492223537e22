use shortly_core::AppViewModel;

/// Screen lines for the current view.
pub fn render(view: &AppViewModel, site_key: &str) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(match (&view.principal, view.login_pending) {
        (Some(principal), _) if principal.avatar_url.is_empty() => {
            format!("Signed in as {} <{}>", principal.display_name, principal.email)
        }
        (Some(principal), _) => format!(
            "Signed in as {} <{}> [{}]",
            principal.display_name, principal.email, principal.avatar_url
        ),
        (None, true) => "Signing in...".to_string(),
        (None, false) => "Not signed in (type `login`)".to_string(),
    });

    lines.push(format!("URL: {}", view.input));
    lines.push(if view.has_token {
        "Verification: ready".to_string()
    } else {
        format!("Verification: complete the challenge for site key {site_key}, then `token <value>`")
    });

    if view.loading {
        lines.push("Loading...".to_string());
    } else if view.can_submit {
        lines.push("Ready: type `submit`".to_string());
    }

    if let Some(message) = &view.error_message {
        lines.push(format!("Error: {message}"));
    }
    if let Some(short_url) = &view.result_short_url {
        lines.push(format!("Result: {short_url}"));
    }

    if !view.history.is_empty() {
        lines.push("History:".to_string());
        for (index, row) in view.history.iter().enumerate() {
            lines.push(format!(
                "  {}. {} -> {}",
                index + 1,
                row.original_url,
                row.short_url
            ));
        }
    }

    lines
}
