//! Route fragments: `add`, `edit/<id>`, and everything else as the list.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Add,
    Edit(String),
    List,
}

impl Route {
    /// Parse a fragment such as `#edit/42`. Unknown fragments are the list.
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.trim().trim_start_matches('#').trim_matches('/');

        if fragment == "add" {
            return Route::Add;
        }
        match fragment.strip_prefix("edit/") {
            Some(id) if !id.is_empty() && !id.contains('/') => Route::Edit(id.to_string()),
            _ => Route::List,
        }
    }

    pub fn fragment(&self) -> String {
        match self {
            Route::Add => "add".to_string(),
            Route::Edit(id) => format!("edit/{}", id),
            Route::List => String::new(),
        }
    }
}

/// Records where the app has navigated. The app pushes to it; nothing
/// listens to it.
#[derive(Debug, Default)]
pub struct Router {
    history: Vec<String>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate(&mut self, fragment: impl Into<String>) {
        let fragment = fragment.into();
        if self.history.last() != Some(&fragment) {
            tracing::debug!(%fragment, "navigate");
            self.history.push(fragment);
        }
    }

    pub fn current(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or("")
    }

    pub fn current_route(&self) -> Route {
        Route::parse(self.current())
    }
}
