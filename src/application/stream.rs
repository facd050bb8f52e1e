//! Datastar server-sent event responses for the admin area.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements, PatchSignals};

/// Ordered batch of Datastar events flushed as one SSE response.
#[derive(Default)]
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch `html` into the element matched by `selector`.
    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    pub fn push_script(&mut self, script: String) -> &mut Self {
        let event = ExecuteScript::new(script).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Merge a JSON object into the page's signals.
    pub fn push_signals(&mut self, payload: &str) -> &mut Self {
        let event = PatchSignals::new(payload).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Send the browser to `path` once the preceding patches have applied.
    pub fn push_redirect(&mut self, path: &str) -> &mut Self {
        let target = serde_json::to_string(path).unwrap_or_else(|_| "\"/\"".to_string());
        self.push_script(format!("window.location.assign({target});"))
    }

    /// Rewrite the address bar without navigating.
    pub fn push_history(&mut self, path: &str) -> &mut Self {
        let target = serde_json::to_string(path).unwrap_or_else(|_| "\"/\"".to_string());
        self.push_script(format!("window.history.replaceState(null, '', {target});"))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_response(self) -> Response {
        let stream = stream! {
            for event in self.events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_events_in_order() {
        let mut stream = StreamBuilder::new();
        assert!(stream.is_empty());
        stream
            .push_patch("<p>hi</p>".into(), "#target", ElementPatchMode::Replace)
            .push_redirect("/posts");
        assert_eq!(stream.events.len(), 2);
    }
}
