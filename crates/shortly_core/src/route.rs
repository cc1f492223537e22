use crate::{join_url, ClientConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Root path: show the shorten form.
    Form,
    /// Any other path is handed to the backend in full.
    Redirect { target: String },
}

pub fn resolve_route(config: &ClientConfig, path: &str) -> Route {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        Route::Form
    } else {
        Route::Redirect {
            target: join_url(&config.redirect_base_url, path),
        }
    }
}
